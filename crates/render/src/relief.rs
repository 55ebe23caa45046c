//! Hillshading of elevation grids with a Sobel style 3x3 kernel.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::num::NonZero;

use coverage::{Error, Georeference, PixelType, Raster, RasterNum, Result, dispatch_sampletype_nowrap};

const MAX_RELIEF_THREADS: usize = 64;

/// Worker count for the row parallel shading phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumThreads {
    AllCpus,
    Count(usize),
}

impl NumThreads {
    fn resolved(self) -> usize {
        let count = match self {
            NumThreads::AllCpus => std::thread::available_parallelism().map(NonZero::get).unwrap_or(1),
            NumThreads::Count(count) => count,
        };

        count.clamp(1, MAX_RELIEF_THREADS)
    }
}

/// Knobs of the hillshading model.
#[derive(Debug, Clone)]
pub struct ShadedReliefOptions {
    /// Vertical exaggeration, normalized against the customary 55.0.
    pub relief_factor: f64,
    /// Elevation units per ground unit, multiplies the per axis resolution.
    pub scale: f64,
    /// Sun elevation above the horizon in radians.
    pub altitude: f64,
    /// Sun direction in radians, clockwise from north.
    pub azimuth: f64,
    /// Elevation value marking holes in the grid.
    pub nodata: f64,
    /// Worker threads splitting the output rows.
    pub num_threads: NumThreads,
}

impl Default for ShadedReliefOptions {
    fn default() -> Self {
        ShadedReliefOptions {
            relief_factor: 55.0,
            scale: 1.0,
            altitude: FRAC_PI_4,
            azimuth: 315.0 * PI / 180.0,
            nodata: -9999.0,
            num_threads: NumThreads::AllCpus,
        }
    }
}

/// Computes one hillshade value in [0, 1] per input cell, or -1.0 where the
/// 3x3 neighborhood touches a NODATA cell. Cells on the outer edge always
/// shade to -1.0 since their neighborhood reaches into the padding.
///
/// Rows are striped across the workers (worker k takes rows k, k+n, k+2n and
/// so on); every worker writes disjoint rows of the output and reads the
/// shared padded grid, so the result does not depend on the thread count.
pub fn shaded_relief(raster: &Raster, georeference: &Georeference, options: &ShadedReliefOptions) -> Result<Vec<f32>> {
    if !matches!(raster.pixel_type(), PixelType::DataGrid | PixelType::Grayscale) {
        return Err(Error::InvalidArgument(format!(
            "Shaded relief needs a grayscale or data grid band, got {}",
            raster.pixel_type()
        )));
    }
    if !georeference.is_valid() {
        return Err(Error::InvalidArgument(
            "Shaded relief needs a valid georeference".to_string(),
        ));
    }
    if !(options.relief_factor.is_finite() && options.relief_factor > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "Relief factor must be positive, got {}",
            options.relief_factor
        )));
    }
    if !(options.scale.is_finite() && options.scale > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "Relief scale must be positive, got {}",
            options.scale
        )));
    }

    let width = raster.width() as usize;
    let height = raster.height() as usize;
    let padded = padded_grid(raster, options.nodata)?;

    let zf = options.relief_factor / 55.0;
    let params = ShadeParams {
        x_denominator: 8.0 * georeference.x_res * options.scale / zf,
        y_denominator: 8.0 * georeference.y_res * options.scale / zf,
        sin_altitude: options.altitude.sin(),
        cos_altitude: options.altitude.cos(),
        azimuth: options.azimuth,
        nodata: options.nodata,
    };

    let mut output = vec![-1.0f32; width * height];
    let threads = options.num_threads.resolved().min(height.max(1));

    if threads <= 1 {
        for (row_index, row) in output.chunks_mut(width).enumerate() {
            shade_row(&padded, &params, row_index, row);
        }
    } else {
        let padded = &padded;
        let params = &params;
        std::thread::scope(|scope| {
            let mut stripes: Vec<Vec<(usize, &mut [f32])>> = (0..threads).map(|_| Vec::new()).collect();
            for (row_index, row) in output.chunks_mut(width).enumerate() {
                stripes[row_index % threads].push((row_index, row));
            }

            for stripe in stripes {
                scope.spawn(move || {
                    for (row_index, row) in stripe {
                        shade_row(padded, params, row_index, row);
                    }
                });
            }
        });
    }

    Ok(output)
}

/// Elevations in f64 with a one cell NODATA border; transparent cells of a
/// masked raster count as NODATA too.
struct PaddedGrid {
    values: Vec<f64>,
    width: usize,
}

fn padded_grid(raster: &Raster, nodata: f64) -> Result<PaddedGrid> {
    let width = raster.width() as usize;
    let height = raster.height() as usize;
    let padded_width = width + 2;
    let mut values = vec![nodata; padded_width * (height + 2)];

    dispatch_sampletype_nowrap!(raster.sample_type(), T, {
        let samples = raster.typed_data::<T>()?;
        for row in 0..height {
            let offset = (row + 1) * padded_width + 1;
            for (dst, src) in values[offset..offset + width].iter_mut().zip(&samples[row * width..]) {
                *dst = src.as_f64();
            }
        }
    });

    if let Some(mask) = raster.mask() {
        for row in 0..height {
            for col in 0..width {
                if mask[row * width + col] == 0 {
                    values[(row + 1) * padded_width + col + 1] = nodata;
                }
            }
        }
    }

    Ok(PaddedGrid {
        values,
        width: padded_width,
    })
}

struct ShadeParams {
    x_denominator: f64,
    y_denominator: f64,
    sin_altitude: f64,
    cos_altitude: f64,
    azimuth: f64,
    nodata: f64,
}

fn shade_row(grid: &PaddedGrid, params: &ShadeParams, row_index: usize, row: &mut [f32]) {
    let stride = grid.width;
    for (col, out) in row.iter_mut().enumerate() {
        // output cell (row, col) sits at padded (row + 1, col + 1)
        let top = row_index * stride + col;
        let window = [
            grid.values[top],
            grid.values[top + 1],
            grid.values[top + 2],
            grid.values[top + stride],
            grid.values[top + stride + 1],
            grid.values[top + stride + 2],
            grid.values[top + 2 * stride],
            grid.values[top + 2 * stride + 1],
            grid.values[top + 2 * stride + 2],
        ];

        *out = shade_cell(&window, params);
    }
}

fn shade_cell(z: &[f64; 9], params: &ShadeParams) -> f32 {
    if z.iter().any(|&v| v == params.nodata) {
        return -1.0;
    }

    let dx = ((z[0] + 2.0 * z[3] + z[6]) - (z[2] + 2.0 * z[5] + z[8])) / params.x_denominator;
    let dy = ((z[6] + 2.0 * z[7] + z[8]) - (z[0] + 2.0 * z[1] + z[2])) / params.y_denominator;

    let slope = FRAC_PI_2 - (dx * dx + dy * dy).sqrt().atan();
    let aspect = dx.atan2(dy);
    let value = params.sin_altitude * slope.sin()
        + params.cos_altitude * slope.cos() * (params.azimuth - FRAC_PI_2 - aspect).cos();

    value.clamp(0.0, 1.0) as f32
}
