use crate::{Error, Pixel, Raster, RasterNum, Result, dispatch_sampletype_nowrap};
use itertools::Itertools;

pub const HISTOGRAM_BINS: usize = 256;

/// Per band summary feeding the contrast enhancement modes. The histogram is
/// binned with the same affine the styling lookup uses: byte valued bands bin
/// by value, everything else by `(v - min) / coeff` with `coeff = range / 254`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
    pub count: u64,
    pub histogram: [f64; HISTOGRAM_BINS],
}

impl BandStatistics {
    /// Total weight of the histogram; equals `count` as f64.
    pub fn histogram_total(&self) -> f64 {
        self.histogram.iter().sum()
    }

    /// Whether the value range fits direct byte indexing.
    pub fn byte_range(&self) -> bool {
        self.min >= 0.0 && self.max <= 255.0
    }
}

/// Computes the statistics of one band, skipping NODATA matches, NaN samples
/// and mask-transparent pixels. A NODATA declaration that does not match the
/// raster typing is ignored.
pub fn band_statistics(raster: &Raster, band: usize, nodata: Option<&Pixel>) -> Result<BandStatistics> {
    if band >= raster.bands() {
        return Err(Error::InvalidArgument(format!(
            "Band {} out of range, raster has {}",
            band,
            raster.bands()
        )));
    }

    let byte_binned = raster.sample_type().byte_width() == 1 && !raster.sample_type().is_signed();

    dispatch_sampletype_nowrap!(raster.sample_type(), T, {
        let samples = raster.typed_data::<T>()?;
        let nodata_value = nodata.and_then(|p| {
            let values = p.typed_values::<T>();
            if values.is_none() {
                log::debug!("NODATA declaration does not match the raster, ignoring it");
            }
            values.filter(|v| v.len() == raster.bands()).map(|v| v[band])
        });

        Ok(collect_band::<T>(
            samples,
            raster.bands(),
            band,
            raster.mask(),
            nodata_value,
            byte_binned,
        ))
    })
}

fn collect_band<T: RasterNum>(
    samples: &[T],
    bands: usize,
    band: usize,
    mask: Option<&[u8]>,
    nodata: Option<T>,
    byte_binned: bool,
) -> BandStatistics {
    let valid = |(index, value): (usize, &T)| -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        if let Some(nodata) = nodata {
            if *value == nodata {
                return None;
            }
        }
        if let Some(mask) = mask {
            if mask[index] == 0 {
                return None;
            }
        }
        Some(value.as_f64())
    };

    let band_values = || {
        samples
            .iter()
            .skip(band)
            .step_by(bands)
            .enumerate()
            .filter_map(valid)
    };

    let mut stats = BandStatistics {
        min: 0.0,
        max: 0.0,
        mean: 0.0,
        stddev: 0.0,
        count: 0,
        histogram: [0.0; HISTOGRAM_BINS],
    };

    let Some((min, max)) = band_values().minmax().into_option() else {
        return stats;
    };

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut count = 0u64;
    for v in band_values() {
        sum += v;
        sum_sq += v * v;
        count += 1;
    }

    let mean = sum / count as f64;
    stats.min = min;
    stats.max = max;
    stats.mean = mean;
    stats.stddev = (sum_sq / count as f64 - mean * mean).max(0.0).sqrt();
    stats.count = count;

    let coeff = if byte_binned || max == min {
        1.0
    } else {
        (max - min) / 254.0
    };
    let base = if byte_binned { 0.0 } else { min };

    for v in band_values() {
        let bin = (((v - base) / coeff) as usize).min(HISTOGRAM_BINS - 1);
        stats.histogram[bin] += 1.0;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PixelType, SampleBuffer, SampleType};
    use approx::assert_abs_diff_eq;

    #[test]
    fn byte_band_bins_by_value() -> Result {
        let raster = Raster::new(
            4,
            1,
            SampleType::UInt8,
            PixelType::Grayscale,
            1,
            SampleBuffer::U8(vec![0, 10, 10, 255]),
        )?;

        let stats = band_statistics(&raster, 0, None)?;
        assert_abs_diff_eq!(stats.min, 0.0);
        assert_abs_diff_eq!(stats.max, 255.0);
        assert_eq!(stats.count, 4);
        assert_abs_diff_eq!(stats.histogram[10], 2.0);
        assert_abs_diff_eq!(stats.histogram[255], 1.0);
        assert_abs_diff_eq!(stats.histogram_total(), 4.0);
        Ok(())
    }

    #[test]
    fn nodata_and_mask_are_skipped() -> Result {
        let raster = Raster::new(
            4,
            1,
            SampleType::Int16,
            PixelType::DataGrid,
            1,
            SampleBuffer::I16(vec![-9999, 100, 200, 300]),
        )?
        .with_mask(vec![1, 1, 1, 0])?;

        let nodata = Pixel::grid(-9999i16)?;
        let stats = band_statistics(&raster, 0, Some(&nodata))?;

        assert_eq!(stats.count, 2);
        assert_abs_diff_eq!(stats.min, 100.0);
        assert_abs_diff_eq!(stats.max, 200.0);
        assert_abs_diff_eq!(stats.mean, 150.0);
        Ok(())
    }

    #[test]
    fn mismatched_nodata_is_ignored() -> Result {
        let raster = Raster::new(
            2,
            1,
            SampleType::Int16,
            PixelType::DataGrid,
            1,
            SampleBuffer::I16(vec![5, 6]),
        )?;

        // declared as int32, does not match the int16 band
        let nodata = Pixel::grid(5i32)?;
        let stats = band_statistics(&raster, 0, Some(&nodata))?;
        assert_eq!(stats.count, 2);
        Ok(())
    }

    #[test]
    fn wide_band_uses_the_affine() -> Result {
        let raster = Raster::new(
            3,
            1,
            SampleType::Float32,
            PixelType::DataGrid,
            1,
            SampleBuffer::F32(vec![0.0, 127.0, 254.0]),
        )?;

        let stats = band_statistics(&raster, 0, None)?;
        assert_abs_diff_eq!(stats.histogram[0], 1.0);
        assert_abs_diff_eq!(stats.histogram[127], 1.0);
        assert_abs_diff_eq!(stats.histogram[254], 1.0);
        Ok(())
    }

    #[test]
    fn band_out_of_range_errors() -> Result {
        let raster = Raster::zeroed(2, 2, SampleType::UInt8, PixelType::Grayscale, 1)?;
        assert!(band_statistics(&raster, 1, None).is_err());
        Ok(())
    }
}
