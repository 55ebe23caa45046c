use coverage::{
    Error, Georeference, Palette, Pixel, PixelType, Raster, RasterNum, Result, Rgb, SampleBuffer, SampleType,
    dispatch_sampletype_nowrap,
};

use crate::colormap::BucketColorMap;
use crate::contrast::ContrastCurve;
use crate::symbolizer::BandStyle;

/// Destination pixels of a render.
#[derive(Debug, Clone)]
pub enum Surface {
    /// Samples of the source layout, copied through unstyled.
    Raw {
        buffer: SampleBuffer,
        sample_type: SampleType,
        pixel_type: PixelType,
        bands: usize,
    },
    /// One luminance byte per pixel.
    Gray(Vec<u8>),
    /// Interleaved RGB bytes.
    Rgb(Vec<u8>),
}

/// The styling strategy the merge loop runs per pixel.
#[derive(Debug, Clone)]
pub enum Styling {
    /// Copy raw samples onto a matching `Raw` surface.
    PassThrough,
    /// One band through a curve (gray surface) or a map (RGB surface).
    Mono { band: usize, style: BandStyle },
    /// Three bands through three curves onto RGB.
    Triple {
        bands: [usize; 3],
        curves: Box<[ContrastCurve; 3]>,
    },
    /// `(nir - red) / (nir + red)` in f64 through a [-1, 1] map onto RGB.
    /// A zero denominator yields NaN, which falls to the map default.
    Ndvi {
        red: usize,
        nir: usize,
        map: BucketColorMap,
    },
    /// Palette index expansion onto RGB.
    PaletteExpand,
}

/// Destination grid of a render: a pre filled surface, an optional 0/1
/// opacity mask and the placement source tiles are positioned against.
///
/// Each source cell lands in the destination cell containing its center,
/// `out_y = floor((dest_max_y - geo_y) / dest_y_res)` and
/// `out_x = floor((geo_x - dest_min_x) / dest_x_res)`. Cells outside the
/// canvas, transparent cells and NODATA matches are skipped, leaving the
/// void background in place.
#[derive(Debug, Clone)]
pub struct Canvas {
    surface: Surface,
    mask: Option<Vec<u8>>,
    width: u32,
    height: u32,
    georeference: Georeference,
}

impl Canvas {
    /// Raw surface taking unstyled samples; the void pixel decides the
    /// sample layout and the background value.
    pub fn raw(georeference: Georeference, width: u32, height: u32, void: &Pixel) -> Result<Self> {
        let template = Raster::filled(width, height, void)?;
        let (buffer, _, _) = template.into_parts();

        Ok(Canvas {
            surface: Surface::Raw {
                buffer,
                sample_type: void.sample_type(),
                pixel_type: void.pixel_type(),
                bands: void.bands(),
            },
            mask: None,
            width,
            height,
            georeference,
        })
    }

    /// Gray byte surface pre filled with the given background.
    pub fn gray(georeference: Georeference, width: u32, height: u32, void: u8) -> Self {
        Canvas {
            surface: Surface::Gray(vec![void; width as usize * height as usize]),
            mask: None,
            width,
            height,
            georeference,
        }
    }

    /// RGB surface pre filled with the given background color.
    pub fn rgb(georeference: Georeference, width: u32, height: u32, void: Rgb) -> Self {
        let mut bytes = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            bytes.extend_from_slice(&[void.r, void.g, void.b]);
        }

        Canvas {
            surface: Surface::Rgb(bytes),
            mask: None,
            width,
            height,
            georeference,
        }
    }

    /// Adds an output mask, initially all transparent; merged pixels flip
    /// their byte to 1.
    pub fn with_mask(mut self) -> Self {
        self.mask = Some(vec![0; self.width as usize * self.height as usize]);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn georeference(&self) -> &Georeference {
        &self.georeference
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }

    /// Merges one source tile onto the canvas. An optional NODATA pixel is
    /// matched per band by exact equality; a declaration that does not fit
    /// the tile's typing is silently ignored, and monochrome tiles never
    /// match NODATA at all.
    pub fn merge(&mut self, tile: &Raster, placement: &Georeference, styling: &Styling, nodata: Option<&Pixel>) -> Result<()> {
        self.check_compatible(tile, styling)?;

        // monochrome merges never honor NODATA and promote to grayscale
        // before a gray merge
        let nodata = if tile.pixel_type() == PixelType::Monochrome {
            None
        } else {
            nodata
        };
        let promoted;
        let tile = if tile.pixel_type() == PixelType::Monochrome && matches!(self.surface, Surface::Gray(_)) {
            promoted = tile.promote_monochrome_to_grayscale()?;
            &promoted
        } else {
            tile
        };

        dispatch_sampletype_nowrap!(tile.sample_type(), T, {
            self.merge_typed::<T>(tile, placement, styling, nodata)
        })
    }

    /// Converts the finished canvas into a raster carrying the canvas mask.
    pub fn into_raster(self) -> Result<Raster> {
        let (width, height) = (self.width, self.height);
        let raster = match self.surface {
            Surface::Raw {
                buffer,
                sample_type,
                pixel_type,
                bands,
            } => Raster::new(width, height, sample_type, pixel_type, bands, buffer)?,
            Surface::Gray(bytes) => Raster::new(
                width,
                height,
                SampleType::UInt8,
                PixelType::Grayscale,
                1,
                SampleBuffer::U8(bytes),
            )?,
            Surface::Rgb(bytes) => Raster::new(width, height, SampleType::UInt8, PixelType::Rgb, 3, SampleBuffer::U8(bytes))?,
        };

        match self.mask {
            Some(mask) => raster.with_mask(mask),
            None => Ok(raster),
        }
    }

    fn check_compatible(&self, tile: &Raster, styling: &Styling) -> Result<()> {
        let band_in_range = |band: usize| -> Result<()> {
            if band < tile.bands() {
                Ok(())
            } else {
                Err(Error::InvalidArgument(format!(
                    "Styling band {} out of range, the tile has {}",
                    band,
                    tile.bands()
                )))
            }
        };

        match (styling, &self.surface) {
            (Styling::PassThrough, Surface::Raw { buffer, pixel_type, bands, .. }) => {
                if *bands != tile.bands()
                    || *pixel_type != tile.pixel_type()
                    || buffer.storage_type() != tile.data().storage_type()
                {
                    return Err(Error::InvalidArgument(
                        "Pass through merges need a matching raw surface".to_string(),
                    ));
                }
                Ok(())
            }
            (
                Styling::Mono {
                    band,
                    style: BandStyle::Curve(_),
                },
                Surface::Gray(_),
            ) => band_in_range(*band),
            (
                Styling::Mono {
                    band,
                    style: BandStyle::Map(_),
                },
                Surface::Rgb(_),
            ) => band_in_range(*band),
            (Styling::Triple { bands, .. }, Surface::Rgb(_)) => bands.iter().try_for_each(|&band| band_in_range(band)),
            (Styling::Ndvi { red, nir, .. }, Surface::Rgb(_)) => {
                band_in_range(*red)?;
                band_in_range(*nir)
            }
            (Styling::PaletteExpand, Surface::Rgb(_)) => {
                if tile.pixel_type() != PixelType::Palette {
                    return Err(Error::InvalidArgument(
                        "Palette expansion needs a palette tile".to_string(),
                    ));
                }
                if tile.palette().is_none() {
                    return Err(Error::InvalidArgument(
                        "The palette tile carries no color table".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Err(Error::InvalidArgument(
                "The styling does not fit the canvas surface".to_string(),
            )),
        }
    }

    fn merge_typed<T: RasterNum>(
        &mut self,
        tile: &Raster,
        placement: &Georeference,
        styling: &Styling,
        nodata: Option<&Pixel>,
    ) -> Result<()> {
        let samples = tile.typed_data::<T>()?;
        let bands = tile.bands();
        let tile_mask = tile.mask();
        let palette = tile.palette().cloned();

        let nodata_values: Option<Vec<T>> = nodata.and_then(|pixel| {
            let values = pixel.typed_values::<T>().filter(|v| v.len() == bands);
            if values.is_none() {
                log::debug!("NODATA declaration does not match the tile, ignoring it");
            }
            values
        });

        let dest = self.georeference.clone();
        let width = i64::from(self.width);
        let height = i64::from(self.height);
        let src_width = tile.width() as usize;
        let src_height = tile.height() as usize;

        for row in 0..src_height {
            let geo_y = placement.max_y - (row as f64 + 0.5) * placement.y_res;
            let out_y = ((dest.max_y - geo_y) / dest.y_res).floor() as i64;
            if out_y < 0 || out_y >= height {
                continue;
            }

            for col in 0..src_width {
                let geo_x = placement.min_x + (col as f64 + 0.5) * placement.x_res;
                let out_x = ((geo_x - dest.min_x) / dest.x_res).floor() as i64;
                if out_x < 0 || out_x >= width {
                    continue;
                }

                let src = row * src_width + col;
                if tile_mask.is_some_and(|mask| mask[src] == 0) {
                    continue;
                }
                let pixel = &samples[src * bands..(src + 1) * bands];
                if let Some(nodata) = &nodata_values {
                    if pixel == nodata.as_slice() {
                        continue;
                    }
                }

                let dst = (out_y * width + out_x) as usize;
                self.write_pixel(dst, pixel, styling, palette.as_deref())?;
                if let Some(mask) = &mut self.mask {
                    mask[dst] = 1;
                }
            }
        }

        Ok(())
    }

    fn write_pixel<T: RasterNum>(&mut self, dst: usize, pixel: &[T], styling: &Styling, palette: Option<&Palette>) -> Result<()> {
        match (styling, &mut self.surface) {
            (Styling::PassThrough, Surface::Raw { buffer, bands, .. }) => {
                let out = buffer.typed_slice_mut::<T>()?;
                out[dst * *bands..(dst + 1) * *bands].copy_from_slice(pixel);
            }
            (
                Styling::Mono {
                    band,
                    style: BandStyle::Curve(curve),
                },
                Surface::Gray(gray),
            ) => {
                gray[dst] = curve.apply(pixel[*band].as_f64());
            }
            (
                Styling::Mono {
                    band,
                    style: BandStyle::Map(map),
                },
                Surface::Rgb(rgb),
            ) => {
                write_rgb(rgb, dst, map.color_of(pixel[*band].as_f64()));
            }
            (Styling::Triple { bands, curves }, Surface::Rgb(rgb)) => {
                let color = Rgb::new(
                    curves[0].apply(pixel[bands[0]].as_f64()),
                    curves[1].apply(pixel[bands[1]].as_f64()),
                    curves[2].apply(pixel[bands[2]].as_f64()),
                );
                write_rgb(rgb, dst, color);
            }
            (Styling::Ndvi { red, nir, map }, Surface::Rgb(rgb)) => {
                let red = pixel[*red].as_f64();
                let nir = pixel[*nir].as_f64();
                let ndvi = (nir - red) / (nir + red);
                write_rgb(rgb, dst, map.color_of(ndvi));
            }
            (Styling::PaletteExpand, Surface::Rgb(rgb)) => {
                let palette = palette.ok_or_else(|| {
                    Error::InvalidArgument("The palette tile carries no color table".to_string())
                })?;
                let index = pixel[0].as_f64() as usize;
                let color = palette.get(index).ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "Pixel index {} outside the {} entry color table",
                        index,
                        palette.len()
                    ))
                })?;
                write_rgb(rgb, dst, color);
            }
            _ => {
                return Err(Error::InvalidArgument(
                    "The styling does not fit the canvas surface".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn write_rgb(rgb: &mut [u8], dst: usize, color: Rgb) {
    rgb[dst * 3] = color.r;
    rgb[dst * 3 + 1] = color.g;
    rgb[dst * 3 + 2] = color.b;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContrastEnhancement, RasterSymbolizer};
    use coverage::{PixelValue, band_statistics};
    use rand::prelude::*;
    use std::sync::Arc;

    fn grid_tile(samples: Vec<i16>, width: u32, height: u32) -> Result<Raster> {
        Raster::new(width, height, SampleType::Int16, PixelType::DataGrid, 1, SampleBuffer::I16(samples))
    }

    fn unit_geo(width: u32, height: u32) -> Georeference {
        Georeference::with_origin(0.0, f64::from(height), 1.0, 1.0, width, height)
    }

    fn gray_curve(tile: &Raster) -> Result<Styling> {
        let stats = band_statistics(tile, 0, None)?;
        RasterSymbolizer::MonoGray {
            band: 0,
            contrast: ContrastEnhancement::None,
        }
        .compile(&[stats])
    }

    #[test_log::test]
    fn merging_is_deterministic() -> Result {
        let mut rng = StdRng::seed_from_u64(99);
        let tile = grid_tile((0..32 * 32).map(|_| rng.random_range(-500..500)).collect(), 32, 32)?;
        let styling = gray_curve(&tile)?;

        let render = || -> Result<Canvas> {
            let mut canvas = Canvas::gray(unit_geo(32, 32), 32, 32, 0).with_mask();
            canvas.merge(&tile, &unit_geo(32, 32), &styling, None)?;
            Ok(canvas)
        };

        let first = render()?;
        let second = render()?;
        let (Surface::Gray(a), Surface::Gray(b)) = (first.surface(), second.surface()) else {
            unreachable!()
        };
        assert_eq!(a, b);
        assert_eq!(first.mask(), second.mask());
        assert!(first.mask().expect("mask requested").iter().all(|&m| m == 1));
        Ok(())
    }

    #[test_log::test]
    fn tiles_outside_the_canvas_are_clipped() -> Result {
        let tile = grid_tile((0..16).collect(), 4, 4)?;
        let styling = gray_curve(&tile)?;

        // tile spans x [-2, 2), y [6, 10) against a 4x4 canvas at [0, 4) x [4, 8)
        let placement = Georeference::with_origin(-2.0, 10.0, 1.0, 1.0, 4, 4);
        let canvas_geo = Georeference::with_origin(0.0, 8.0, 1.0, 1.0, 4, 4);
        let mut canvas = Canvas::gray(canvas_geo, 4, 4, 255).with_mask();
        canvas.merge(&tile, &placement, &styling, None)?;

        // only the tile's lower right quadrant lands on the canvas
        let mask = canvas.mask().expect("mask requested");
        let Surface::Gray(gray) = canvas.surface() else { unreachable!() };

        // tile rows 2..4 map to canvas rows 0..2, tile cols 2..4 to canvas cols 0..2
        assert_eq!(mask, [1, 1, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(gray[0], 10);
        assert_eq!(gray[1], 11);
        assert_eq!(gray[4], 14);
        assert_eq!(gray[2], 255);
        Ok(())
    }

    #[test_log::test]
    fn transparent_and_nodata_pixels_keep_the_void() -> Result {
        let tile = grid_tile(vec![100, -9999, 300, 400], 2, 2)?.with_mask(vec![1, 1, 0, 1])?;
        let styling = gray_curve(&tile)?;
        let nodata = Pixel::grid(-9999i16)?;

        let mut canvas = Canvas::gray(unit_geo(2, 2), 2, 2, 77).with_mask();
        canvas.merge(&tile, &unit_geo(2, 2), &styling, Some(&nodata))?;

        let Surface::Gray(gray) = canvas.surface() else { unreachable!() };
        // nodata at (1,0) and transparency at (0,1) leave the void byte
        assert_eq!(gray[1], 77);
        assert_eq!(gray[2], 77);
        assert_ne!(gray[0], 77);
        assert_ne!(gray[3], 77);
        assert_eq!(canvas.mask().expect("mask requested"), [1, 0, 0, 1]);
        Ok(())
    }

    #[test_log::test]
    fn mismatched_nodata_is_silently_ignored() -> Result {
        let tile = grid_tile(vec![5, 6, 7, 8], 2, 2)?;
        let styling = gray_curve(&tile)?;
        // declared as int32, the tile is int16
        let nodata = Pixel::grid(5i32)?;

        let mut canvas = Canvas::gray(unit_geo(2, 2), 2, 2, 0).with_mask();
        canvas.merge(&tile, &unit_geo(2, 2), &styling, Some(&nodata))?;
        assert_eq!(canvas.mask().expect("mask requested"), [1, 1, 1, 1]);
        Ok(())
    }

    #[test_log::test]
    fn monochrome_promotes_onto_gray() -> Result {
        let tile = Raster::new(
            2,
            2,
            SampleType::OneBit,
            PixelType::Monochrome,
            1,
            SampleBuffer::U8(vec![0, 1, 1, 0]),
        )?;
        let styling = Styling::Mono {
            band: 0,
            style: BandStyle::Curve(ContrastCurve::identity()),
        };

        let mut canvas = Canvas::gray(unit_geo(2, 2), 2, 2, 128);
        canvas.merge(&tile, &unit_geo(2, 2), &styling, None)?;

        let Surface::Gray(gray) = canvas.surface() else { unreachable!() };
        assert_eq!(gray, &[255, 0, 0, 255]);
        Ok(())
    }

    #[test_log::test]
    fn ndvi_zero_denominator_takes_the_default() -> Result {
        let soil = Rgb::new(120, 60, 10);
        let plants = Rgb::new(0, 160, 0);
        let undefined = Rgb::new(1, 2, 3);
        let map = BucketColorMap::interpolate(&[(-1.0, soil), (1.0, plants)], undefined, (-1.0, 1.0))?;

        let mut samples = Vec::new();
        for (red, nir) in [(10u8, 30), (0, 0), (30, 10)] {
            samples.extend_from_slice(&[red, nir]);
        }
        let tile = Raster::new(3, 1, SampleType::UInt8, PixelType::Multiband, 2, SampleBuffer::U8(samples))?;

        let styling = RasterSymbolizer::Ndvi { red: 0, nir: 1, map }.compile(&[])?;
        let mut canvas = Canvas::rgb(unit_geo(3, 1), 3, 1, Rgb::black());
        canvas.merge(&tile, &unit_geo(3, 1), &styling, None)?;

        let Surface::Rgb(bytes) = canvas.surface() else { unreachable!() };
        // ndvi 0.5 maps into the gradient, 0/0 falls to the default color
        assert_eq!(&bytes[3..6], &[undefined.r, undefined.g, undefined.b]);
        assert_ne!(&bytes[0..3], &bytes[3..6]);
        Ok(())
    }

    #[test_log::test]
    fn styling_must_fit_the_surface() -> Result {
        let tile = grid_tile(vec![1, 2, 3, 4], 2, 2)?;
        let styling = gray_curve(&tile)?;

        // a gray styling cannot write an RGB surface
        let mut canvas = Canvas::rgb(unit_geo(2, 2), 2, 2, Rgb::black());
        assert!(canvas.merge(&tile, &unit_geo(2, 2), &styling, None).is_err());

        // pass through needs the same sample layout
        let void = Pixel::grid(0u8)?;
        let mut canvas = Canvas::raw(unit_geo(2, 2), 2, 2, &void)?;
        assert!(canvas.merge(&tile, &unit_geo(2, 2), &Styling::PassThrough, None).is_err());
        Ok(())
    }

    fn blocky_palette_tile() -> Result<Raster> {
        let palette = Palette::new((0..256).map(|i| Rgb::new(i as u8, (255 - i) as u8, (i / 2) as u8)).collect())?;

        let mut indexes = vec![0u8; 1024 * 768];
        for y in 16..24 {
            for x in 16..24 {
                indexes[y * 1024 + x] = 10;
            }
        }
        for y in 504..512 {
            for x in 720..728 {
                indexes[y * 1024 + x] = 96;
            }
        }

        Raster::new(1024, 768, SampleType::UInt8, PixelType::Palette, 1, SampleBuffer::U8(indexes))?
            .with_palette(Arc::new(palette))
    }

    #[test_log::test]
    fn palette_scene_survives_rescaling() -> Result {
        let tile = blocky_palette_tile()?;
        let src_geo = Georeference::with_origin(0.0, 768.0, 1.0, 1.0, 1024, 768);

        for scale in [1u32, 2, 4, 8] {
            let out_w = 1024 / scale;
            let out_h = 768 / scale;
            let dest_geo = Georeference::with_origin(0.0, 768.0, f64::from(scale), f64::from(scale), out_w, out_h);

            // raw merge keeps the palette indexes
            let void = Pixel::new(SampleType::UInt8, PixelType::Palette, vec![PixelValue::U8(0)])?;
            let mut canvas = Canvas::raw(dest_geo.clone(), out_w, out_h, &void)?;
            canvas.merge(&tile, &src_geo, &Styling::PassThrough, None)?;

            let Surface::Raw { buffer, .. } = canvas.surface() else { unreachable!() };
            let indexes = buffer.typed_slice::<u8>()?;
            let at = |x: u32, y: u32| indexes[(y * out_w + x) as usize];
            assert_eq!(at(20 / scale, 20 / scale), 10, "scale {}", scale);
            assert_eq!(at(720 / scale, 510 / scale), 96, "scale {}", scale);
            assert_eq!(at(8 / scale, 8 / scale), 0, "scale {}", scale);

            // palette expansion resolves the same cells to their colors
            let mut canvas = Canvas::rgb(dest_geo, out_w, out_h, Rgb::black());
            canvas.merge(&tile, &src_geo, &Styling::PaletteExpand, None)?;
            let Surface::Rgb(bytes) = canvas.surface() else { unreachable!() };
            let at = |x: u32, y: u32| {
                let base = ((y * out_w + x) * 3) as usize;
                Rgb::new(bytes[base], bytes[base + 1], bytes[base + 2])
            };
            assert_eq!(at(20 / scale, 20 / scale), Rgb::new(10, 245, 5), "scale {}", scale);
            assert_eq!(at(720 / scale, 510 / scale), Rgb::new(96, 159, 48), "scale {}", scale);
            assert_eq!(at(8 / scale, 8 / scale), Rgb::new(0, 255, 0), "scale {}", scale);
        }

        Ok(())
    }

    #[test]
    fn finished_canvases_convert_to_rasters() -> Result {
        let tile = grid_tile(vec![1, 2, 3, 4], 2, 2)?;
        let styling = gray_curve(&tile)?;

        let mut canvas = Canvas::gray(unit_geo(2, 2), 2, 2, 0).with_mask();
        canvas.merge(&tile, &unit_geo(2, 2), &styling, None)?;

        let raster = canvas.into_raster()?;
        assert_eq!(raster.pixel_type(), PixelType::Grayscale);
        assert_eq!(raster.sample_type(), SampleType::UInt8);
        assert_eq!(raster.mask(), Some([1u8, 1, 1, 1].as_slice()));
        assert_eq!(raster.typed_data::<u8>()?, &[1, 2, 3, 4]);
        Ok(())
    }
}
