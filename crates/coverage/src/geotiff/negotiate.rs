use crate::{
    Error, Palette, PixelType, Raster, RasterNum, Result, Rgb, SampleBuffer, SampleType, dispatch_sampletype,
    dispatch_sampletype_nowrap,
};
use std::sync::Arc;

/// PhotometricInterpretation values this pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Photometric {
    MinIsWhite,
    MinIsBlack,
    Rgb,
    Palette,
}

impl Photometric {
    pub fn from_tag(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::MinIsWhite),
            1 => Ok(Self::MinIsBlack),
            2 => Ok(Self::Rgb),
            3 => Ok(Self::Palette),
            other => Err(Error::UnsupportedFormat(format!(
                "Photometric interpretation {} is not supported",
                other
            ))),
        }
    }

    pub fn tag_value(&self) -> u16 {
        match self {
            Self::MinIsWhite => 0,
            Self::MinIsBlack => 1,
            Self::Rgb => 2,
            Self::Palette => 3,
        }
    }
}

/// SampleFormat values this pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormatKind {
    UnsignedInt,
    SignedInt,
    Float,
}

impl SampleFormatKind {
    pub fn from_tag(value: u16) -> Result<Self> {
        match value {
            1 => Ok(Self::UnsignedInt),
            2 => Ok(Self::SignedInt),
            3 => Ok(Self::Float),
            other => Err(Error::UnsupportedFormat(format!("Sample format {} is not supported", other))),
        }
    }

    pub fn tag_value(&self) -> u16 {
        match self {
            Self::UnsignedInt => 1,
            Self::SignedInt => 2,
            Self::Float => 3,
        }
    }
}

/// The storage layout tuple a TIFF directory declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffLayout {
    pub bits_per_sample: u16,
    pub sample_format: SampleFormatKind,
    pub photometric: Photometric,
    pub samples_per_pixel: u16,
}

/// The raster model triple a layout maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterLayout {
    pub sample_type: SampleType,
    pub pixel_type: PixelType,
    pub bands: usize,
}

impl RasterLayout {
    pub const fn new(sample_type: SampleType, pixel_type: PixelType, bands: usize) -> Self {
        RasterLayout {
            sample_type,
            pixel_type,
            bands,
        }
    }
}

/// The conversion a forced negotiation settles on. Every variant names a
/// dedicated per pixel transform; `Grid` covers all numeric retyping with
/// saturating truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    MonochromeToPalette,
    PaletteToMonochrome,
    GrayscaleToPalette,
    PaletteToGrayscale,
    MonochromeToGrayscale,
    GrayscaleToMonochrome,
    PaletteToRgb,
    GrayscaleToRgb,
    RgbToGrayscale,
    RgbToPalette,
    Grid { from: SampleType, to: SampleType },
}

impl Conversion {
    /// Applies the conversion to a natively decoded raster. The transparency
    /// mask is carried over unchanged; palettes are attached or dropped as the
    /// target model requires.
    pub fn apply(self, raster: Raster) -> Result<Raster> {
        let width = raster.width();
        let height = raster.height();

        match self {
            Conversion::None => Ok(raster),

            Conversion::MonochromeToPalette => {
                let (data, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::OneBit, PixelType::Palette, 1, data)?;
                reattach(raster, mask, Some(Palette::monochrome()))
            }

            Conversion::PaletteToMonochrome => {
                let palette = required_palette(&raster)?;
                if palette.entries() != [Rgb::white(), Rgb::black()] {
                    return Err(Error::UnsupportedFormat(
                        "Only a white/black palette maps onto monochrome".to_string(),
                    ));
                }

                let (data, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::OneBit, PixelType::Monochrome, 1, data)?;
                reattach(raster, mask, None)
            }

            Conversion::GrayscaleToPalette => {
                let (data, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::UInt8, PixelType::Palette, 1, data)?;
                reattach(raster, mask, Some(Palette::identity_gray()))
            }

            Conversion::PaletteToGrayscale => {
                let palette = required_palette(&raster)?;
                let gray = raster
                    .typed_data::<u8>()?
                    .iter()
                    .map(|&index| entry(&palette, index).map(|c| c.luminance()))
                    .collect::<Result<Vec<u8>>>()?;

                let (_, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::UInt8, PixelType::Grayscale, 1, SampleBuffer::U8(gray))?;
                reattach(raster, mask, None)
            }

            Conversion::MonochromeToGrayscale => raster.promote_monochrome_to_grayscale(),

            Conversion::GrayscaleToMonochrome => {
                let bits: Vec<u8> = raster.typed_data::<u8>()?.iter().map(|&v| u8::from(v < 128)).collect();
                let (_, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::OneBit, PixelType::Monochrome, 1, SampleBuffer::U8(bits))?;
                reattach(raster, mask, None)
            }

            Conversion::PaletteToRgb => {
                let palette = required_palette(&raster)?;
                let mut rgb = Vec::with_capacity(raster.pixel_count() * 3);
                for &index in raster.typed_data::<u8>()? {
                    let color = entry(&palette, index)?;
                    rgb.extend_from_slice(&[color.r, color.g, color.b]);
                }

                let (_, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::UInt8, PixelType::Rgb, 3, SampleBuffer::U8(rgb))?;
                reattach(raster, mask, None)
            }

            Conversion::GrayscaleToRgb => {
                let mut rgb = Vec::with_capacity(raster.pixel_count() * 3);
                for &v in raster.typed_data::<u8>()? {
                    rgb.extend_from_slice(&[v, v, v]);
                }

                let (_, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::UInt8, PixelType::Rgb, 3, SampleBuffer::U8(rgb))?;
                reattach(raster, mask, None)
            }

            Conversion::RgbToGrayscale => {
                let gray: Vec<u8> = raster
                    .typed_data::<u8>()?
                    .chunks_exact(3)
                    .map(|px| Rgb::new(px[0], px[1], px[2]).luminance())
                    .collect();

                let (_, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::UInt8, PixelType::Grayscale, 1, SampleBuffer::U8(gray))?;
                reattach(raster, mask, None)
            }

            Conversion::RgbToPalette => {
                let (palette, indexes) = Palette::from_rgb_exact(raster.typed_data::<u8>()?)?;
                let (_, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, SampleType::UInt8, PixelType::Palette, 1, SampleBuffer::U8(indexes))?;
                reattach(raster, mask, Some(palette))
            }

            Conversion::Grid { from, to } => {
                if raster.sample_type() != from {
                    return Err(Error::InvalidArgument(format!(
                        "Grid conversion expects {} samples, raster holds {}",
                        from,
                        raster.sample_type()
                    )));
                }

                let bands = raster.bands();
                let pixel_type = raster.pixel_type();
                let converted = dispatch_sampletype_nowrap!(from, S, {
                    let source = raster.typed_data::<S>()?;
                    dispatch_sampletype!(to, D, source.iter().map(|&v| D::truncate_from_f64(v.as_f64())).collect())
                });

                let (_, mask, _) = raster.into_parts();
                let raster = Raster::new(width, height, to, pixel_type, bands, converted)?;
                reattach(raster, mask, None)
            }
        }
    }
}

fn reattach(raster: Raster, mask: Option<Vec<u8>>, palette: Option<Palette>) -> Result<Raster> {
    let mut raster = raster;
    if let Some(mask) = mask {
        raster = raster.with_mask(mask)?;
    }
    if let Some(palette) = palette {
        raster = raster.with_palette(Arc::new(palette))?;
    }
    Ok(raster)
}

fn required_palette(raster: &Raster) -> Result<Arc<Palette>> {
    raster
        .palette()
        .cloned()
        .ok_or_else(|| Error::InvalidArgument("The palette raster carries no color table".to_string()))
}

fn entry(palette: &Palette, index: u8) -> Result<Rgb> {
    palette.get(index as usize).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "Pixel index {} outside the {} entry color table",
            index,
            palette.len()
        ))
    })
}

/// Maps a TIFF layout onto the raster model. First match wins; layouts
/// without a table entry are unsupported.
pub fn detect(layout: &TiffLayout) -> Result<RasterLayout> {
    use PixelType::*;
    use Photometric as P;
    use SampleFormatKind as F;
    use SampleType::*;

    let (sample_type, pixel_type, bands) = match (
        layout.photometric,
        layout.sample_format,
        layout.bits_per_sample,
        layout.samples_per_pixel,
    ) {
        (P::Palette, F::UnsignedInt, 1, 1) => (OneBit, Palette, 1),
        (P::Palette, F::UnsignedInt, 2, 1) => (TwoBit, Palette, 1),
        (P::Palette, F::UnsignedInt, 4, 1) => (FourBit, Palette, 1),
        (P::Palette, F::UnsignedInt, 8, 1) => (UInt8, Palette, 1),
        (P::MinIsWhite | P::MinIsBlack, F::UnsignedInt, 1, 1) => (OneBit, Monochrome, 1),
        (P::MinIsWhite | P::MinIsBlack, F::UnsignedInt, 2, 1) => (TwoBit, Grayscale, 1),
        (P::MinIsWhite | P::MinIsBlack, F::UnsignedInt, 4, 1) => (FourBit, Grayscale, 1),
        (P::MinIsWhite | P::MinIsBlack, F::UnsignedInt, 8, 1) => (UInt8, Grayscale, 1),
        (P::MinIsWhite | P::MinIsBlack, F::UnsignedInt, 16, 1) => (UInt16, Grayscale, 1),
        (P::MinIsWhite | P::MinIsBlack, F::SignedInt, 8, 1) => (Int8, DataGrid, 1),
        (P::MinIsWhite | P::MinIsBlack, F::SignedInt, 16, 1) => (Int16, DataGrid, 1),
        (P::MinIsWhite | P::MinIsBlack, F::SignedInt, 32, 1) => (Int32, DataGrid, 1),
        (P::MinIsWhite | P::MinIsBlack, F::UnsignedInt, 32, 1) => (UInt32, DataGrid, 1),
        (P::MinIsWhite | P::MinIsBlack, F::Float, 32, 1) => (Float32, DataGrid, 1),
        (P::MinIsWhite | P::MinIsBlack, F::Float, 64, 1) => (Float64, DataGrid, 1),
        (P::Rgb, F::UnsignedInt, 8, 3) => (UInt8, Rgb, 3),
        (P::Rgb, F::UnsignedInt, 16, 3) => (UInt16, Rgb, 3),
        (P::Rgb, F::UnsignedInt, 8 | 16, 4) => {
            return Err(Error::UnsupportedFormat("Alpha channels are not supported".to_string()));
        }
        (P::MinIsBlack, F::UnsignedInt, 8, n) if n >= 2 => (UInt8, Multiband, n as usize),
        (P::MinIsBlack, F::UnsignedInt, 16, n) if n >= 2 => (UInt16, Multiband, n as usize),
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "No raster model for photometric {:?}, {} bits, {:?}, {} samples per pixel",
                layout.photometric, layout.bits_per_sample, layout.sample_format, layout.samples_per_pixel
            )));
        }
    };

    Ok(RasterLayout::new(sample_type, pixel_type, bands))
}

/// Resolves a layout against an optional requested target. Without a target
/// the detected layout is used as is; with one, the table below picks the
/// conversion or refuses the combination.
pub fn negotiate(layout: &TiffLayout, target: Option<&RasterLayout>) -> Result<(RasterLayout, Conversion)> {
    let source = detect(layout)?;

    let Some(target) = target else {
        return Ok((source, Conversion::None));
    };

    target.pixel_type.validate(target.sample_type, target.bands)?;

    if source == *target {
        return Ok((source, Conversion::None));
    }

    let conversion = conversion_for(&source, target)?;
    log::debug!(
        "Negotiated {:?} from {} {} to {} {}",
        conversion,
        source.sample_type,
        source.pixel_type,
        target.sample_type,
        target.pixel_type
    );

    Ok((*target, conversion))
}

fn conversion_for(source: &RasterLayout, target: &RasterLayout) -> Result<Conversion> {
    use PixelType::*;
    use SampleType::{OneBit, UInt8};

    let unsupported = || {
        Err(Error::UnsupportedFormat(format!(
            "Cannot convert {} {} to {} {}",
            source.sample_type, source.pixel_type, target.sample_type, target.pixel_type
        )))
    };

    match (source.pixel_type, target.pixel_type) {
        (Monochrome, Palette) if target.sample_type == OneBit => Ok(Conversion::MonochromeToPalette),
        (Palette, Monochrome) if source.sample_type == OneBit => Ok(Conversion::PaletteToMonochrome),
        (Grayscale, Palette) if source.sample_type == UInt8 && target.sample_type == UInt8 => {
            Ok(Conversion::GrayscaleToPalette)
        }
        (Palette, Grayscale) if target.sample_type == UInt8 => Ok(Conversion::PaletteToGrayscale),
        (Monochrome, Grayscale) if target.sample_type == UInt8 => Ok(Conversion::MonochromeToGrayscale),
        (Grayscale, Monochrome) if source.sample_type == UInt8 => Ok(Conversion::GrayscaleToMonochrome),
        (Palette, Rgb) if target.sample_type == UInt8 => Ok(Conversion::PaletteToRgb),
        (Grayscale, Rgb) if source.sample_type == UInt8 && target.sample_type == UInt8 => {
            Ok(Conversion::GrayscaleToRgb)
        }
        (Rgb, Grayscale) if source.sample_type == UInt8 && target.sample_type == UInt8 => {
            Ok(Conversion::RgbToGrayscale)
        }
        (Rgb, Palette) if source.sample_type == UInt8 && target.sample_type == UInt8 => Ok(Conversion::RgbToPalette),
        (Grayscale, Grayscale) | (Rgb, Rgb) | (DataGrid, DataGrid) | (Multiband, Multiband) => {
            if source.bands != target.bands || source.sample_type == target.sample_type {
                return unsupported();
            }
            if source.sample_type.is_sub_byte() || target.sample_type.is_sub_byte() {
                return unsupported();
            }

            Ok(Conversion::Grid {
                from: source.sample_type,
                to: target.sample_type,
            })
        }
        _ => unsupported(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(photometric: Photometric, format: SampleFormatKind, bits: u16, spp: u16) -> TiffLayout {
        TiffLayout {
            bits_per_sample: bits,
            sample_format: format,
            photometric,
            samples_per_pixel: spp,
        }
    }

    #[test]
    fn detection_table() -> Result {
        use Photometric as P;
        use SampleFormatKind as F;

        let cases = [
            (layout(P::Palette, F::UnsignedInt, 4, 1), (SampleType::FourBit, PixelType::Palette, 1)),
            (layout(P::MinIsWhite, F::UnsignedInt, 1, 1), (SampleType::OneBit, PixelType::Monochrome, 1)),
            (layout(P::MinIsBlack, F::UnsignedInt, 8, 1), (SampleType::UInt8, PixelType::Grayscale, 1)),
            (layout(P::MinIsBlack, F::UnsignedInt, 16, 1), (SampleType::UInt16, PixelType::Grayscale, 1)),
            (layout(P::MinIsBlack, F::SignedInt, 16, 1), (SampleType::Int16, PixelType::DataGrid, 1)),
            (layout(P::MinIsBlack, F::Float, 64, 1), (SampleType::Float64, PixelType::DataGrid, 1)),
            (layout(P::Rgb, F::UnsignedInt, 8, 3), (SampleType::UInt8, PixelType::Rgb, 3)),
            (layout(P::MinIsBlack, F::UnsignedInt, 16, 6), (SampleType::UInt16, PixelType::Multiband, 6)),
        ];

        for (tiff_layout, (sample, pixel, bands)) in cases {
            assert_eq!(detect(&tiff_layout)?, RasterLayout::new(sample, pixel, bands));
        }
        Ok(())
    }

    #[test]
    fn alpha_is_rejected() {
        let result = detect(&layout(Photometric::Rgb, SampleFormatKind::UnsignedInt, 8, 4));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn unknown_layouts_are_rejected() {
        assert!(detect(&layout(Photometric::Palette, SampleFormatKind::UnsignedInt, 16, 1)).is_err());
        assert!(detect(&layout(Photometric::MinIsBlack, SampleFormatKind::SignedInt, 1, 1)).is_err());
        assert!(detect(&layout(Photometric::Rgb, SampleFormatKind::UnsignedInt, 8, 2)).is_err());
    }

    #[test]
    fn matching_target_needs_no_conversion() -> Result {
        let tiff_layout = layout(Photometric::MinIsBlack, SampleFormatKind::UnsignedInt, 8, 1);
        let target = RasterLayout::new(SampleType::UInt8, PixelType::Grayscale, 1);
        assert_eq!(negotiate(&tiff_layout, Some(&target))?, (target, Conversion::None));
        Ok(())
    }

    #[test]
    fn forced_conversions() -> Result {
        use Conversion as C;
        use Photometric as P;
        use SampleFormatKind as F;

        let cases = [
            (
                layout(P::MinIsWhite, F::UnsignedInt, 1, 1),
                RasterLayout::new(SampleType::OneBit, PixelType::Palette, 1),
                C::MonochromeToPalette,
            ),
            (
                layout(P::MinIsWhite, F::UnsignedInt, 1, 1),
                RasterLayout::new(SampleType::UInt8, PixelType::Grayscale, 1),
                C::MonochromeToGrayscale,
            ),
            (
                layout(P::MinIsBlack, F::UnsignedInt, 8, 1),
                RasterLayout::new(SampleType::OneBit, PixelType::Monochrome, 1),
                C::GrayscaleToMonochrome,
            ),
            (
                layout(P::MinIsBlack, F::UnsignedInt, 8, 1),
                RasterLayout::new(SampleType::UInt8, PixelType::Palette, 1),
                C::GrayscaleToPalette,
            ),
            (
                layout(P::Palette, F::UnsignedInt, 8, 1),
                RasterLayout::new(SampleType::UInt8, PixelType::Rgb, 3),
                C::PaletteToRgb,
            ),
            (
                layout(P::Rgb, F::UnsignedInt, 8, 3),
                RasterLayout::new(SampleType::UInt8, PixelType::Grayscale, 1),
                C::RgbToGrayscale,
            ),
            (
                layout(P::Rgb, F::UnsignedInt, 8, 3),
                RasterLayout::new(SampleType::UInt8, PixelType::Palette, 1),
                C::RgbToPalette,
            ),
            (
                layout(P::MinIsBlack, F::SignedInt, 16, 1),
                RasterLayout::new(SampleType::UInt8, PixelType::DataGrid, 1),
                C::Grid {
                    from: SampleType::Int16,
                    to: SampleType::UInt8,
                },
            ),
            (
                layout(P::MinIsBlack, F::UnsignedInt, 16, 1),
                RasterLayout::new(SampleType::UInt8, PixelType::Grayscale, 1),
                C::Grid {
                    from: SampleType::UInt16,
                    to: SampleType::UInt8,
                },
            ),
        ];

        for (tiff_layout, target, expected) in cases {
            let (resolved, conversion) = negotiate(&tiff_layout, Some(&target))?;
            assert_eq!(resolved, target);
            assert_eq!(conversion, expected, "converting to {:?}", target);
        }
        Ok(())
    }

    #[test]
    fn palette_expansion_walks_the_table() -> Result {
        let palette = Palette::new(vec![Rgb::new(10, 20, 30), Rgb::new(200, 100, 0)])?;
        let raster = Raster::new(
            2,
            2,
            SampleType::UInt8,
            PixelType::Palette,
            1,
            SampleBuffer::U8(vec![0, 1, 1, 0]),
        )?
        .with_mask(vec![1, 0, 1, 1])?
        .with_palette(Arc::new(palette))?;

        let rgb = Conversion::PaletteToRgb.apply(raster.clone())?;
        assert_eq!(rgb.pixel_type(), PixelType::Rgb);
        assert_eq!(
            rgb.typed_data::<u8>()?,
            &[10, 20, 30, 200, 100, 0, 200, 100, 0, 10, 20, 30]
        );
        assert_eq!(rgb.mask(), Some([1, 0, 1, 1].as_slice()));

        let gray = Conversion::PaletteToGrayscale.apply(raster)?;
        assert_eq!(gray.pixel_type(), PixelType::Grayscale);
        assert_eq!(gray.typed_data::<u8>()?[0], Rgb::new(10, 20, 30).luminance());
        Ok(())
    }

    #[test]
    fn palette_collection_roundtrips() -> Result {
        let rgb = Raster::new(
            2,
            1,
            SampleType::UInt8,
            PixelType::Rgb,
            3,
            SampleBuffer::U8(vec![5, 5, 5, 9, 9, 9]),
        )?;

        let indexed = Conversion::RgbToPalette.apply(rgb)?;
        assert_eq!(indexed.typed_data::<u8>()?, &[0, 1]);
        let palette = indexed.palette().expect("palette attached");
        assert_eq!(palette.get(0), Some(Rgb::new(5, 5, 5)));
        assert_eq!(palette.get(1), Some(Rgb::new(9, 9, 9)));

        let back = Conversion::PaletteToRgb.apply(indexed)?;
        assert_eq!(back.typed_data::<u8>()?, &[5, 5, 5, 9, 9, 9]);
        Ok(())
    }

    #[test]
    fn monochrome_conversions() -> Result {
        let mono = Raster::new(
            4,
            1,
            SampleType::OneBit,
            PixelType::Monochrome,
            1,
            SampleBuffer::U8(vec![0, 1, 1, 0]),
        )?;

        let indexed = Conversion::MonochromeToPalette.apply(mono.clone())?;
        assert_eq!(indexed.pixel_type(), PixelType::Palette);
        assert_eq!(indexed.palette().map(|p| p.len()), Some(2));
        assert_eq!(indexed.typed_data::<u8>()?, &[0, 1, 1, 0]);

        let back = Conversion::PaletteToMonochrome.apply(indexed)?;
        assert_eq!(back.pixel_type(), PixelType::Monochrome);
        assert_eq!(back.typed_data::<u8>()?, &[0, 1, 1, 0]);

        let gray = Conversion::MonochromeToGrayscale.apply(mono)?;
        assert_eq!(gray.typed_data::<u8>()?, &[255, 0, 0, 255]);

        let thresholded = Conversion::GrayscaleToMonochrome.apply(gray)?;
        assert_eq!(thresholded.typed_data::<u8>()?, &[0, 1, 1, 0]);
        Ok(())
    }

    #[test]
    fn colorful_palettes_do_not_collapse_to_monochrome() -> Result {
        let palette = Palette::new(vec![Rgb::new(0, 0, 255), Rgb::black()])?;
        let raster = Raster::new(1, 1, SampleType::OneBit, PixelType::Palette, 1, SampleBuffer::U8(vec![0]))?
            .with_palette(Arc::new(palette))?;
        assert!(Conversion::PaletteToMonochrome.apply(raster).is_err());
        Ok(())
    }

    #[test]
    fn grid_conversion_saturates() -> Result {
        let grid = Raster::new(
            3,
            1,
            SampleType::Int16,
            PixelType::DataGrid,
            1,
            SampleBuffer::I16(vec![-5, 200, 300]),
        )?;

        let converted = Conversion::Grid {
            from: SampleType::Int16,
            to: SampleType::UInt8,
        }
        .apply(grid)?;

        assert_eq!(converted.sample_type(), SampleType::UInt8);
        assert_eq!(converted.pixel_type(), PixelType::DataGrid);
        assert_eq!(converted.typed_data::<u8>()?, &[0, 200, 255]);
        Ok(())
    }

    #[test]
    fn impossible_targets_are_refused() {
        let gray16 = layout(Photometric::MinIsBlack, SampleFormatKind::UnsignedInt, 16, 1);
        let rgb8 = RasterLayout::new(SampleType::UInt8, PixelType::Rgb, 3);
        assert!(negotiate(&gray16, Some(&rgb8)).is_err());

        let multi = layout(Photometric::MinIsBlack, SampleFormatKind::UnsignedInt, 8, 4);
        let fewer_bands = RasterLayout::new(SampleType::UInt8, PixelType::Multiband, 3);
        assert!(negotiate(&multi, Some(&fewer_bands)).is_err());

        // invalid target triples never negotiate
        let bad_target = RasterLayout::new(SampleType::Float32, PixelType::Rgb, 3);
        assert!(negotiate(&gray16, Some(&bad_target)).is_err());
    }
}
