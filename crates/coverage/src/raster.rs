use crate::{
    Error, Palette, Pixel, PixelType, RasterNum, Result, SampleBuffer, SampleType, dispatch_sampletype_nowrap,
};
use std::sync::Arc;

/// In memory raster: band interleaved samples, an optional transparency mask
/// (one byte per pixel, 0 means transparent) and an optional shared palette.
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    sample_type: SampleType,
    pixel_type: PixelType,
    bands: usize,
    data: SampleBuffer,
    mask: Option<Vec<u8>>,
    palette: Option<Arc<Palette>>,
}

impl Raster {
    pub fn new(
        width: u32,
        height: u32,
        sample_type: SampleType,
        pixel_type: PixelType,
        bands: usize,
        data: SampleBuffer,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!("Empty raster: {}x{}", width, height)));
        }

        pixel_type.validate(sample_type, bands)?;

        let expected = width as usize * height as usize * bands;
        if data.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "Sample buffer holds {} samples, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                bands,
                expected
            )));
        }

        let storage = match sample_type {
            SampleType::OneBit | SampleType::TwoBit | SampleType::FourBit => SampleType::UInt8,
            other => other,
        };
        if data.storage_type() != storage {
            return Err(Error::InvalidArgument(format!(
                "Sample buffer stores {}, {} samples need {}",
                data.storage_type(),
                sample_type,
                storage
            )));
        }

        if let (Some(max), SampleBuffer::U8(samples)) = (sample_type.sub_byte_max(), &data) {
            if samples.iter().any(|&v| v > max) {
                return Err(Error::InvalidArgument(format!(
                    "Sample exceeds the {} value range",
                    sample_type
                )));
            }
        }

        Ok(Raster {
            width,
            height,
            sample_type,
            pixel_type,
            bands,
            data,
            mask: None,
            palette: None,
        })
    }

    pub fn zeroed(width: u32, height: u32, sample_type: SampleType, pixel_type: PixelType, bands: usize) -> Result<Self> {
        let len = width as usize * height as usize * bands;
        Raster::new(width, height, sample_type, pixel_type, bands, SampleBuffer::zeroed(sample_type, len))
    }

    /// Raster pre-filled with `fill`, which also decides the typing.
    pub fn filled(width: u32, height: u32, fill: &Pixel) -> Result<Self> {
        let mut raster = Raster::zeroed(width, height, fill.sample_type(), fill.pixel_type(), fill.bands())?;
        raster.fill(fill)?;
        Ok(raster)
    }

    pub fn fill(&mut self, value: &Pixel) -> Result {
        if value.sample_type() != self.sample_type || value.bands() != self.bands {
            return Err(Error::InvalidArgument(format!(
                "Fill pixel is {} x{}, raster is {} x{}",
                value.sample_type(),
                value.bands(),
                self.sample_type,
                self.bands
            )));
        }

        let bands = self.bands;
        dispatch_sampletype_nowrap!(self.sample_type, T, {
            let fill: Vec<T> = value
                .typed_values()
                .ok_or_else(|| Error::InvalidArgument("Fill pixel does not match the sample type".to_string()))?;
            for pixel in self.data.typed_slice_mut::<T>()?.chunks_exact_mut(bands) {
                pixel.copy_from_slice(&fill);
            }
        });

        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &SampleBuffer {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SampleBuffer {
        &mut self.data
    }

    pub fn typed_data<T: RasterNum>(&self) -> Result<&[T]> {
        self.data.typed_slice()
    }

    pub fn typed_data_mut<T: RasterNum>(&mut self) -> Result<&mut [T]> {
        self.data.typed_slice_mut()
    }

    pub fn mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }

    pub fn palette(&self) -> Option<&Arc<Palette>> {
        self.palette.as_ref()
    }

    pub fn with_mask(mut self, mask: Vec<u8>) -> Result<Self> {
        if mask.len() != self.pixel_count() {
            return Err(Error::SizeMismatch {
                size1: (self.width as usize, self.height as usize),
                size2: (mask.len(), 1),
            });
        }

        self.mask = Some(mask);
        Ok(self)
    }

    pub fn with_palette(mut self, palette: Arc<Palette>) -> Result<Self> {
        if self.pixel_type != PixelType::Palette {
            return Err(Error::InvalidArgument(format!(
                "A palette cannot be attached to {} pixels",
                self.pixel_type
            )));
        }

        if !palette.fits_sample_type(self.sample_type) {
            return Err(Error::InvalidArgument(format!(
                "A {} entry palette does not fit {} indexes",
                palette.len(),
                self.sample_type
            )));
        }

        self.palette = Some(palette);
        Ok(self)
    }

    /// Decomposes the raster into its buffers, for retyping paths that keep
    /// the sample data but change the model around it.
    pub fn into_parts(self) -> (SampleBuffer, Option<Vec<u8>>, Option<Arc<Palette>>) {
        (self.data, self.mask, self.palette)
    }

    /// Pure promotion of a monochrome raster to 8 bit grayscale: 0 becomes
    /// white (255), 1 becomes black (0). The mask is carried over.
    pub fn promote_monochrome_to_grayscale(&self) -> Result<Raster> {
        if self.pixel_type != PixelType::Monochrome {
            return Err(Error::InvalidArgument(format!(
                "Cannot promote {} pixels to grayscale",
                self.pixel_type
            )));
        }

        let bits = self.typed_data::<u8>()?;
        let gray: Vec<u8> = bits.iter().map(|&v| if v == 0 { 255 } else { 0 }).collect();

        let mut promoted = Raster::new(
            self.width,
            self.height,
            SampleType::UInt8,
            PixelType::Grayscale,
            1,
            SampleBuffer::U8(gray),
        )?;
        promoted.mask = self.mask.clone();
        Ok(promoted)
    }
}
