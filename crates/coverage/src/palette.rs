use crate::{Error, Result, Rgb, SampleType};
use std::collections::HashMap;

/// Ordered color table attached to palette rasters, at most 256 entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    pub fn new(entries: Vec<Rgb>) -> Result<Self> {
        if entries.is_empty() || entries.len() > 256 {
            return Err(Error::InvalidArgument(format!(
                "A palette holds between 1 and 256 entries, got {}",
                entries.len()
            )));
        }

        Ok(Palette { entries })
    }

    /// The two entry palette promoted monochrome rasters use: 0 maps to white,
    /// 1 maps to black.
    pub fn monochrome() -> Self {
        Palette {
            entries: vec![Rgb::white(), Rgb::black()],
        }
    }

    /// 256 entry identity palette synthesized for grayscale sources.
    pub fn identity_gray() -> Self {
        Palette {
            entries: (0..=255u8).map(|v| Rgb::new(v, v, v)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.entries.get(index).copied()
    }

    pub fn is_gray(&self) -> bool {
        self.entries.iter().all(Rgb::is_gray)
    }

    /// Whether the table fits the index width of `sample_type`.
    pub fn fits_sample_type(&self, sample_type: SampleType) -> bool {
        match sample_type {
            SampleType::OneBit => self.entries.len() <= 2,
            SampleType::TwoBit => self.entries.len() <= 4,
            SampleType::FourBit => self.entries.len() <= 16,
            SampleType::UInt8 => true,
            _ => false,
        }
    }

    pub fn index_of(&self, color: Rgb) -> Option<usize> {
        self.entries.iter().position(|&c| c == color)
    }

    /// Collects the distinct colors of interleaved RGB data in scan order and
    /// returns the palette plus the index buffer. More than 256 distinct
    /// colors is an error.
    pub fn from_rgb_exact(rgb: &[u8]) -> Result<(Self, Vec<u8>)> {
        if rgb.len() % 3 != 0 {
            return Err(Error::InvalidArgument("RGB data length is not a multiple of 3".to_string()));
        }

        let mut entries = Vec::new();
        let mut lookup: HashMap<(u8, u8, u8), u8> = HashMap::new();
        let mut indexes = Vec::with_capacity(rgb.len() / 3);

        for px in rgb.chunks_exact(3) {
            let key = (px[0], px[1], px[2]);
            let index = match lookup.get(&key) {
                Some(&index) => index,
                None => {
                    if entries.len() == 256 {
                        return Err(Error::UnsupportedFormat(
                            "RGB image holds more than 256 distinct colors".to_string(),
                        ));
                    }

                    let index = entries.len() as u8;
                    entries.push(Rgb::new(px[0], px[1], px[2]));
                    lookup.insert(key, index);
                    index
                }
            };

            indexes.push(index);
        }

        Ok((Palette::new(entries)?, indexes))
    }

    /// Table padded to the next power of two (minimum 2). Padding repeats the
    /// last real entry instead of black so out of range indexes stay plausible.
    pub fn padded_to_pow2(&self) -> Vec<Rgb> {
        let size = self.entries.len().next_power_of_two().max(2);
        let mut padded = self.entries.clone();
        let last = *padded.last().unwrap_or(&Rgb::black());
        padded.resize(size, last);
        padded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow2_padding_sizes() {
        for (real, expected) in [(1, 2), (3, 4), (5, 8), (9, 16), (17, 32), (33, 64), (65, 128), (129, 256)] {
            let entries: Vec<Rgb> = (0..real).map(|i| Rgb::new(i as u8, 0, 0)).collect();
            let palette = Palette::new(entries).unwrap();
            let padded = palette.padded_to_pow2();

            assert_eq!(padded.len(), expected, "padding {} entries", real);
            let last = Rgb::new((real - 1) as u8, 0, 0);
            for slot in &padded[real..] {
                assert_eq!(*slot, last);
            }
        }
    }

    #[test]
    fn exact_pow2_is_not_padded() {
        let palette = Palette::new(vec![Rgb::black(); 16]).unwrap();
        assert_eq!(palette.padded_to_pow2().len(), 16);
    }

    #[test]
    fn distinct_color_collection_keeps_scan_order() {
        let rgb = [10, 0, 0, 20, 0, 0, 10, 0, 0, 30, 0, 0];
        let (palette, indexes) = Palette::from_rgb_exact(&rgb).unwrap();

        assert_eq!(palette.len(), 3);
        assert_eq!(palette.get(0), Some(Rgb::new(10, 0, 0)));
        assert_eq!(palette.get(1), Some(Rgb::new(20, 0, 0)));
        assert_eq!(palette.get(2), Some(Rgb::new(30, 0, 0)));
        assert_eq!(indexes, vec![0, 1, 0, 2]);
    }

    #[test]
    fn too_many_colors_is_an_error() {
        let mut rgb = Vec::new();
        for i in 0..257u16 {
            rgb.extend_from_slice(&[(i & 0xff) as u8, (i >> 8) as u8, 0]);
        }

        assert!(Palette::from_rgb_exact(&rgb).is_err());
    }

    #[test]
    fn synthesized_palettes() {
        let mono = Palette::monochrome();
        assert_eq!(mono.get(0), Some(Rgb::white()));
        assert_eq!(mono.get(1), Some(Rgb::black()));
        assert!(mono.fits_sample_type(SampleType::OneBit));

        let gray = Palette::identity_gray();
        assert_eq!(gray.len(), 256);
        assert!(gray.is_gray());
        assert_eq!(gray.get(128), Some(Rgb::new(128, 128, 128)));
        assert!(!gray.fits_sample_type(SampleType::FourBit));
    }
}
