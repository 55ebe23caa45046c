//! Umbrella crate bundling the raster [`coverage`] model with the [`render`]
//! pipeline, so a single dependency pulls in the whole stack.

pub use coverage;
pub use render;

pub use coverage::{Error, Result};
