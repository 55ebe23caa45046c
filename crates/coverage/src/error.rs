use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Raster dimensions do not match ({}x{}) <-> ({}x{})", .size1.0, .size1.1, .size2.0, .size2.1)]
    SizeMismatch {
        size1: (usize, usize),
        size2: (usize, usize),
    },
    #[error("Invalid path: '{}'", .0.to_string_lossy())]
    InvalidPath(PathBuf),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Truncated data: {0}")]
    TruncatedData(String),
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Tiff error: {0}")]
    TiffError(#[from] tiff::TiffError),
    #[error("Gif decode error: {0}")]
    GifDecodeError(#[from] gif::DecodingError),
    #[error("Gif encode error: {0}")]
    GifEncodeError(#[from] gif::EncodingError),
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Error::InvalidNumber(err.to_string())
    }
}

impl From<ParseFloatError> for Error {
    fn from(err: ParseFloatError) -> Self {
        Error::InvalidNumber(err.to_string())
    }
}
