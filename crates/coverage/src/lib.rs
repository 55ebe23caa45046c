#![warn(clippy::unwrap_used)]

pub type Result<T = ()> = std::result::Result<T, Error>;

mod color;
mod error;
mod georeference;
mod memstream;
mod palette;
mod pixel;
mod raster;
mod rasternum;
mod samplebuffer;
mod samplebuffer_macros;
mod sampletype;
mod statistics;

pub mod geotiff;
pub mod gifcodec;
pub mod worldfile;

#[doc(inline)]
pub use color::Rgb;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use georeference::Georeference;
#[doc(inline)]
pub use memstream::MemoryStream;
#[doc(inline)]
pub use palette::Palette;
pub use pixel::Pixel;
pub use pixel::PixelValue;
#[doc(inline)]
pub use raster::Raster;
pub use rasternum::RasterNum;
pub use samplebuffer::SampleBuffer;
pub use sampletype::PixelType;
pub use sampletype::SampleType;
pub use statistics::BandStatistics;
pub use statistics::HISTOGRAM_BINS;
pub use statistics::band_statistics;
