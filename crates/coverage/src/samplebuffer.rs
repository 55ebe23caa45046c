use crate::{Error, RasterNum, Result, SampleType, dispatch_samplebuffer, dispatch_sampletype};
use num::Zero;

/// Type erased sample storage. Sub byte sample types share the `U8` variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl SampleBuffer {
    /// Allocates a zero filled buffer for `len` samples of `sample_type`.
    pub fn zeroed(sample_type: SampleType, len: usize) -> Self {
        dispatch_sampletype!(sample_type, T, vec![T::zero(); len])
    }

    pub fn len(&self) -> usize {
        dispatch_samplebuffer!(self, buf, buf.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch_samplebuffer!(self, buf, buf.is_empty())
    }

    pub fn byte_len(&self) -> usize {
        dispatch_samplebuffer!(self, buf, std::mem::size_of_val(buf.as_slice()))
    }

    /// Storage type of the variant. Sub byte samples report as `UInt8`, their
    /// nominal type lives on the raster.
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

    fn type_check<T: RasterNum>(&self) -> Result {
        let storage = match T::TYPE {
            SampleType::OneBit | SampleType::TwoBit | SampleType::FourBit => SampleType::UInt8,
            other => other,
        };

        if self.storage_type() != storage {
            return Err(Error::InvalidArgument(format!(
                "Buffer holds {} samples, {} was requested",
                self.storage_type(),
                T::TYPE
            )));
        }

        Ok(())
    }

    pub fn typed_slice<T: RasterNum>(&self) -> Result<&[T]> {
        self.type_check::<T>()?;
        Ok(dispatch_samplebuffer!(self, buf, bytemuck::cast_slice(buf.as_slice())))
    }

    pub fn typed_slice_mut<T: RasterNum>(&mut self) -> Result<&mut [T]> {
        self.type_check::<T>()?;
        Ok(dispatch_samplebuffer!(self, buf, bytemuck::cast_slice_mut(buf.as_mut_slice())))
    }

    /// Native order byte view of the samples.
    pub fn as_bytes(&self) -> &[u8] {
        dispatch_samplebuffer!(self, buf, bytemuck::cast_slice(buf.as_slice()))
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        dispatch_samplebuffer!(self, buf, bytemuck::cast_slice_mut(buf.as_mut_slice()))
    }

    /// Sample at `index` widened to f64, for paths that do not care about the
    /// storage type (statistics reporting, debug output).
    pub fn sample_as_f64(&self, index: usize) -> Option<f64> {
        if index >= self.len() {
            return None;
        }

        Some(dispatch_samplebuffer!(self, buf, buf[index].as_f64()))
    }
}
