use coverage::{BandStatistics, Error, Result};

use crate::canvas::Styling;
use crate::colormap::BucketColorMap;
use crate::contrast::ContrastCurve;

/// Contrast enhancement selector for one band.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ContrastEnhancement {
    /// Identity over the band's own range.
    #[default]
    None,
    /// Linear stretch between the 2nd and 98th percentile.
    Normalize,
    /// Power law with the given gamma.
    Gamma(f64),
    /// Histogram equalization.
    Histogram,
}

impl ContrastEnhancement {
    /// Compiles the enhancement into a curve for a band with the given
    /// statistics.
    pub fn curve(self, stats: &BandStatistics) -> Result<ContrastCurve> {
        match self {
            ContrastEnhancement::None => Ok(ContrastCurve::none(stats)),
            ContrastEnhancement::Normalize => Ok(ContrastCurve::normalize(stats)),
            ContrastEnhancement::Gamma(gamma) => {
                if !gamma.is_finite() || gamma <= 0.0 {
                    return Err(Error::InvalidArgument(format!("Gamma must be positive, got {}", gamma)));
                }
                Ok(ContrastCurve::gamma(stats, gamma))
            }
            ContrastEnhancement::Histogram => Ok(ContrastCurve::histogram(stats)),
        }
    }
}

/// Compiled styling of one band: a curve producing gray bytes or a map
/// producing colors.
#[derive(Debug, Clone, PartialEq)]
pub enum BandStyle {
    Curve(ContrastCurve),
    Map(BucketColorMap),
}

/// Which bands a render picks and how each one is stretched or mapped.
/// Compiling against per band statistics yields the strategy the canvas
/// merge loop runs.
#[derive(Debug, Clone)]
pub enum RasterSymbolizer {
    /// One band through a contrast curve onto a gray canvas.
    MonoGray {
        band: usize,
        contrast: ContrastEnhancement,
    },
    /// One band through a color map onto an RGB canvas.
    MonoMapped { band: usize, map: BucketColorMap },
    /// False color composition of three bands onto an RGB canvas.
    Triple {
        red: usize,
        green: usize,
        blue: usize,
        contrast: ContrastEnhancement,
    },
    /// NDVI from a red and a near infrared band through a [-1, 1] map.
    Ndvi {
        red: usize,
        nir: usize,
        map: BucketColorMap,
    },
}

impl RasterSymbolizer {
    pub fn compile(&self, stats: &[BandStatistics]) -> Result<Styling> {
        let stat = |band: usize| -> Result<&BandStatistics> {
            stats
                .get(band)
                .ok_or_else(|| Error::InvalidArgument(format!("No statistics for band {}, {} available", band, stats.len())))
        };

        Ok(match self {
            RasterSymbolizer::MonoGray { band, contrast } => Styling::Mono {
                band: *band,
                style: BandStyle::Curve(contrast.curve(stat(*band)?)?),
            },
            RasterSymbolizer::MonoMapped { band, map } => Styling::Mono {
                band: *band,
                style: BandStyle::Map(map.clone()),
            },
            RasterSymbolizer::Triple {
                red,
                green,
                blue,
                contrast,
            } => Styling::Triple {
                bands: [*red, *green, *blue],
                curves: Box::new([
                    contrast.curve(stat(*red)?)?,
                    contrast.curve(stat(*green)?)?,
                    contrast.curve(stat(*blue)?)?,
                ]),
            },
            RasterSymbolizer::Ndvi { red, nir, map } => Styling::Ndvi {
                red: *red,
                nir: *nir,
                map: map.clone(),
            },
        })
    }
}
