#![warn(clippy::unwrap_used)]

mod canvas;
mod colormap;
mod contrast;
mod relief;
mod symbolizer;

pub use canvas::Canvas;
pub use canvas::Styling;
pub use canvas::Surface;
pub use colormap::BucketColorMap;
pub use colormap::ColorRule;
pub use contrast::ContrastCurve;
pub use relief::NumThreads;
pub use relief::ShadedReliefOptions;
pub use relief::shaded_relief;
pub use symbolizer::BandStyle;
pub use symbolizer::ContrastEnhancement;
pub use symbolizer::RasterSymbolizer;

pub type Error = coverage::Error;
pub type Result<T> = coverage::Result<T>;
