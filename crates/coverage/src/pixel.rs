use crate::{PixelType, RasterNum, Result, SampleType, dispatch_sampletype_nowrap};

/// Single sample value, one variant per storage type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
}

macro_rules! pixelvalue_from_impl {
    ($t:ty, $variant:ident) => {
        impl From<$t> for PixelValue {
            fn from(v: $t) -> Self {
                PixelValue::$variant(v)
            }
        }
    };
}

pixelvalue_from_impl!(i8, I8);
pixelvalue_from_impl!(u8, U8);
pixelvalue_from_impl!(i16, I16);
pixelvalue_from_impl!(u16, U16);
pixelvalue_from_impl!(i32, I32);
pixelvalue_from_impl!(u32, U32);
pixelvalue_from_impl!(f32, F32);
pixelvalue_from_impl!(f64, F64);

impl PixelValue {
    /// Builds the variant matching `sample_type` from a f64, truncating C style.
    pub fn from_f64(sample_type: SampleType, v: f64) -> PixelValue {
        dispatch_sampletype_nowrap!(sample_type, T, PixelValue::from(T::truncate_from_f64(v)))
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::I8(v) => f64::from(v),
            Self::U8(v) => f64::from(v),
            Self::I16(v) => f64::from(v),
            Self::U16(v) => f64::from(v),
            Self::I32(v) => f64::from(v),
            Self::U32(v) => f64::from(v),
            Self::F32(v) => f64::from(v),
            Self::F64(v) => v,
        }
    }

    pub fn storage_type(&self) -> SampleType {
        match self {
            Self::I8(_) => SampleType::Int8,
            Self::U8(_) => SampleType::UInt8,
            Self::I16(_) => SampleType::Int16,
            Self::U16(_) => SampleType::UInt16,
            Self::I32(_) => SampleType::Int32,
            Self::U32(_) => SampleType::UInt32,
            Self::F32(_) => SampleType::Float32,
            Self::F64(_) => SampleType::Float64,
        }
    }

    /// The value as `T` when the storage types line up, `None` otherwise.
    /// NaN survives the float paths.
    pub fn typed<T: RasterNum>(&self) -> Option<T> {
        let storage = match T::TYPE {
            SampleType::OneBit | SampleType::TwoBit | SampleType::FourBit => SampleType::UInt8,
            other => other,
        };

        if self.storage_type() != storage {
            return None;
        }

        num::NumCast::from(self.as_f64())
    }
}

/// Scratch pixel: per band sample values plus their raster typing. Used for
/// NODATA declarations and destination fill values.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    sample_type: SampleType,
    pixel_type: PixelType,
    values: Vec<PixelValue>,
}

impl Pixel {
    pub fn new(sample_type: SampleType, pixel_type: PixelType, values: Vec<PixelValue>) -> Result<Self> {
        pixel_type.validate(sample_type, values.len())?;
        if let Some(max) = sample_type.sub_byte_max() {
            for value in &values {
                if !matches!(value, PixelValue::U8(v) if *v <= max) {
                    return Err(crate::Error::InvalidArgument(format!(
                        "Value {:?} does not fit a {} sample",
                        value, sample_type
                    )));
                }
            }
        }

        Ok(Pixel {
            sample_type,
            pixel_type,
            values,
        })
    }

    pub fn monochrome(black: bool) -> Self {
        Pixel {
            sample_type: SampleType::OneBit,
            pixel_type: PixelType::Monochrome,
            values: vec![PixelValue::U8(u8::from(black))],
        }
    }

    pub fn grayscale(value: u8) -> Self {
        Pixel {
            sample_type: SampleType::UInt8,
            pixel_type: PixelType::Grayscale,
            values: vec![PixelValue::U8(value)],
        }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Pixel {
            sample_type: SampleType::UInt8,
            pixel_type: PixelType::Rgb,
            values: vec![PixelValue::U8(r), PixelValue::U8(g), PixelValue::U8(b)],
        }
    }

    pub fn grid<T: RasterNum>(value: T) -> Result<Self> {
        Pixel::new(T::TYPE, PixelType::DataGrid, vec![PixelValue::from_f64(T::TYPE, value.as_f64())])
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn bands(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[PixelValue] {
        &self.values
    }

    /// Per band values as `T`, `None` when the declared sample type does not
    /// store as `T`. Callers treat `None` as "no declaration".
    pub fn typed_values<T: RasterNum>(&self) -> Option<Vec<T>> {
        self.values.iter().map(PixelValue::typed).collect()
    }
}
