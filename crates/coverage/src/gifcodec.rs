//! GIF exchange for palette rasters.
//!
//! Encoding emits a single frame with a global color table padded to a
//! power of two by repeating the last entry. Decoding takes the first
//! frame of the stream and keeps its indices untouched.

use std::borrow::Cow;
use std::sync::Arc;

use crate::{Error, MemoryStream, Palette, PixelType, Raster, Result, Rgb, SampleBuffer, SampleType};

/// Encodes a raster as a single frame GIF. Palette rasters bring their own
/// color table; Monochrome gets a white/black pair and UInt8 Grayscale an
/// identity gray table.
pub fn encode(raster: &Raster) -> Result<Vec<u8>> {
    if raster.width() > u16::MAX as u32 || raster.height() > u16::MAX as u32 {
        return Err(Error::InvalidArgument(format!(
            "{}x{} does not fit the GIF size field",
            raster.width(),
            raster.height()
        )));
    }

    let palette = match raster.pixel_type() {
        PixelType::Palette => raster
            .palette()
            .ok_or_else(|| Error::InvalidArgument("Palette raster carries no color table".to_string()))?
            .as_ref()
            .clone(),
        PixelType::Monochrome => Palette::monochrome(),
        PixelType::Grayscale if raster.sample_type() == SampleType::UInt8 => Palette::identity_gray(),
        other => {
            return Err(Error::InvalidArgument(format!(
                "GIF encoding does not cover {} {} pixels",
                raster.sample_type(),
                other
            )));
        }
    };
    let table: Vec<u8> = palette
        .padded_to_pow2()
        .iter()
        .flat_map(|color| [color.r, color.g, color.b])
        .collect();

    let mut stream = MemoryStream::new();
    {
        let mut encoder = gif::Encoder::new(&mut stream, raster.width() as u16, raster.height() as u16, &table)?;

        let mut frame = gif::Frame::default();
        frame.width = raster.width() as u16;
        frame.height = raster.height() as u16;
        frame.buffer = Cow::Borrowed(raster.typed_data::<u8>()?);
        encoder.write_frame(&frame)?;
    }

    Ok(stream.into_vec())
}

/// Decodes the first image of a GIF stream. The local color table wins over
/// the global one, and the table size decides the sample width.
pub fn decode(encoded: &[u8]) -> Result<Raster> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(encoded)?;

    let (width, height, data, local_table) = {
        let frame = decoder
            .read_next_frame()?
            .ok_or_else(|| Error::TruncatedData("GIF stream holds no image".to_string()))?;
        (
            u32::from(frame.width),
            u32::from(frame.height),
            frame.buffer.to_vec(),
            frame.palette.clone(),
        )
    };

    let table = match &local_table {
        Some(table) => table.as_slice(),
        None => decoder
            .global_palette()
            .ok_or_else(|| Error::UnsupportedFormat("GIF without a color table".to_string()))?,
    };

    let entries: Vec<Rgb> = table
        .chunks_exact(3)
        .map(|rgb| Rgb::new(rgb[0], rgb[1], rgb[2]))
        .collect();
    let palette = Palette::new(entries)?;

    if let Some(&bad) = data.iter().find(|&&index| usize::from(index) >= palette.len()) {
        return Err(Error::UnsupportedFormat(format!(
            "Pixel index {} outside the {} entry color table",
            bad,
            palette.len()
        )));
    }

    let sample_type = match palette.len() {
        0..=2 => SampleType::OneBit,
        3..=4 => SampleType::TwoBit,
        5..=16 => SampleType::FourBit,
        _ => SampleType::UInt8,
    };

    Raster::new(width, height, sample_type, PixelType::Palette, 1, SampleBuffer::U8(data))?
        .with_palette(Arc::new(palette))
}
