use coverage::{BandStatistics, HISTOGRAM_BINS};

/// Byte mapper for one band: an affine turning a raw sample into a lookup
/// index, `idx = clamp(trunc((v - min) / coeff), 0, 255)`, and a table
/// mapping the index onto the output byte. Bands whose range already fits
/// 0..255 index directly with min 0 and coeff 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastCurve {
    lut: [u8; HISTOGRAM_BINS],
    min: f64,
    coeff: f64,
}

impl ContrastCurve {
    /// Identity over the direct byte domain.
    pub fn identity() -> Self {
        let mut lut = [0u8; HISTOGRAM_BINS];
        for (i, v) in lut.iter_mut().enumerate() {
            *v = i as u8;
        }

        ContrastCurve { lut, min: 0.0, coeff: 1.0 }
    }

    /// Identity table over the band's own range.
    pub fn none(stats: &BandStatistics) -> Self {
        let (min, coeff) = affine_for(stats);
        ContrastCurve {
            min,
            coeff,
            ..Self::identity()
        }
    }

    /// Linear stretch between the 2nd and 98th percentile onto [0, 254].
    pub fn normalize(stats: &BandStatistics) -> Self {
        let (min, coeff) = affine_for(stats);
        let total = stats.histogram_total();
        let low_mark = total * 0.02;
        let high_mark = total * 0.98;

        let mut low = 0;
        let mut high = HISTOGRAM_BINS - 1;
        let mut cum = 0.0;
        for (i, weight) in stats.histogram.iter().enumerate() {
            let before = cum;
            cum += weight;
            if before < low_mark && cum >= low_mark {
                low = i;
            }
            if before < high_mark && cum >= high_mark {
                high = i;
                break;
            }
        }

        let span = high.saturating_sub(low).max(1) as f64;
        let mut lut = [0u8; HISTOGRAM_BINS];
        for (i, v) in lut.iter_mut().enumerate() {
            let stretched = 254.0 * (i as f64 - low as f64) / span;
            *v = stretched.clamp(0.0, 254.0).round() as u8;
        }

        ContrastCurve { lut, min, coeff }
    }

    /// Power law table, `lut[i] = round(254 * (i / 254)^(1 / gamma))` with
    /// the endpoints pinned to 0 and 255.
    pub fn gamma(stats: &BandStatistics, gamma: f64) -> Self {
        let (min, coeff) = affine_for(stats);
        let exponent = 1.0 / gamma;

        let mut lut = [0u8; HISTOGRAM_BINS];
        for (i, v) in lut.iter_mut().enumerate() {
            *v = match i {
                0 => 0,
                255 => 255,
                _ => (254.0 * (i as f64 / 254.0).powf(exponent)).round().min(255.0) as u8,
            };
        }

        ContrastCurve { lut, min, coeff }
    }

    /// Histogram equalization, `lut[i] = round(254 * cum(i) / total)`.
    pub fn histogram(stats: &BandStatistics) -> Self {
        let (min, coeff) = affine_for(stats);
        let total = stats.histogram_total().max(1.0);

        let mut lut = [0u8; HISTOGRAM_BINS];
        let mut cum = 0.0;
        for (i, v) in lut.iter_mut().enumerate() {
            cum += stats.histogram[i];
            *v = (254.0 * cum / total).round().min(255.0) as u8;
        }

        ContrastCurve { lut, min, coeff }
    }

    /// Lookup index of a raw sample. Values below the domain saturate to 0,
    /// values above it to 255.
    pub fn index_of(&self, value: f64) -> usize {
        (((value - self.min) / self.coeff) as usize).min(HISTOGRAM_BINS - 1)
    }

    /// Output byte for a raw sample.
    pub fn apply(&self, value: f64) -> u8 {
        self.lut[self.index_of(value)]
    }

    pub fn table(&self) -> &[u8; HISTOGRAM_BINS] {
        &self.lut
    }
}

fn affine_for(stats: &BandStatistics) -> (f64, f64) {
    if stats.byte_range() {
        (0.0, 1.0)
    } else if stats.max > stats.min {
        (stats.min, (stats.max - stats.min) / 254.0)
    } else {
        (stats.min, 1.0)
    }
}
