use crate::{Error, Result};

/// Per band storage type. Sub byte samples are kept unpacked in memory, one
/// sample per byte; bit level packing only happens inside the codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SampleType {
    OneBit = 0,
    TwoBit = 1,
    FourBit = 2,
    Int8 = 3,
    UInt8 = 4,
    Int16 = 5,
    UInt16 = 6,
    Int32 = 7,
    UInt32 = 8,
    Float32 = 9,
    Float64 = 10,
}

impl SampleType {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::OneBit => "1-bit",
            Self::TwoBit => "2-bit",
            Self::FourBit => "4-bit",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Nominal bit width as stored on disk.
    pub fn bits(&self) -> u16 {
        match self {
            Self::OneBit => 1,
            Self::TwoBit => 2,
            Self::FourBit => 4,
            Self::Int8 | Self::UInt8 => 8,
            Self::Int16 | Self::UInt16 => 16,
            Self::Int32 | Self::UInt32 | Self::Float32 => 32,
            Self::Float64 => 64,
        }
    }

    /// In-memory width of one sample in bytes (sub byte types occupy a full byte).
    pub fn byte_width(&self) -> usize {
        match self {
            Self::OneBit | Self::TwoBit | Self::FourBit | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    pub fn is_sub_byte(&self) -> bool {
        matches!(self, Self::OneBit | Self::TwoBit | Self::FourBit)
    }

    /// Largest value a sub byte sample may hold, `None` for whole byte types.
    pub fn sub_byte_max(&self) -> Option<u8> {
        match self {
            Self::OneBit => Some(1),
            Self::TwoBit => Some(3),
            Self::FourBit => Some(15),
            _ => None,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Float32 | Self::Float64)
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Semantic interpretation of a raster's bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelType {
    Monochrome = 0,
    Palette = 1,
    Grayscale = 2,
    Rgb = 3,
    Multiband = 4,
    DataGrid = 5,
}

impl PixelType {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Monochrome => "monochrome",
            Self::Palette => "palette",
            Self::Grayscale => "grayscale",
            Self::Rgb => "rgb",
            Self::Multiband => "multiband",
            Self::DataGrid => "datagrid",
        }
    }

    /// Checks the (sample type, band count) combination against the model rules.
    pub fn validate(&self, sample_type: SampleType, bands: usize) -> Result {
        use SampleType::*;

        let sample_ok = match self {
            Self::Monochrome => sample_type == OneBit,
            Self::Palette => matches!(sample_type, OneBit | TwoBit | FourBit | UInt8),
            Self::Grayscale => matches!(sample_type, TwoBit | FourBit | UInt8 | UInt16),
            Self::Rgb | Self::Multiband => matches!(sample_type, UInt8 | UInt16),
            Self::DataGrid => {
                matches!(sample_type, Int8 | UInt8 | Int16 | UInt16 | Int32 | UInt32 | Float32 | Float64)
            }
        };

        let bands_ok = match self {
            Self::Rgb => bands == 3,
            Self::Multiband => bands >= 2,
            _ => bands == 1,
        };

        if !sample_ok {
            return Err(Error::InvalidArgument(format!(
                "Sample type {} is not valid for {} pixels",
                sample_type, self
            )));
        }

        if !bands_ok {
            return Err(Error::InvalidArgument(format!(
                "Band count {} is not valid for {} pixels",
                bands, self
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
