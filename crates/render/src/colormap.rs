use coverage::{Error, HISTOGRAM_BINS, Result, Rgb};

/// One styling rule: a half open value range `[min, max)` and the color it
/// resolves to, optionally fading towards a second color across the range.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRule {
    pub min: f64,
    pub max: f64,
    color: Rgb,
    fade_to: Option<Rgb>,
}

impl ColorRule {
    pub fn solid(min: f64, max: f64, color: Rgb) -> Self {
        ColorRule {
            min,
            max,
            color,
            fade_to: None,
        }
    }

    pub fn gradient(min: f64, max: f64, from: Rgb, to: Rgb) -> Self {
        ColorRule {
            min,
            max,
            color: from,
            fade_to: Some(to),
        }
    }

    /// Half open match; false for NaN on either comparison.
    fn matches(&self, value: f64) -> bool {
        self.min <= value && value < self.max
    }

    fn color_at(&self, value: f64) -> Rgb {
        match self.fade_to {
            None => self.color,
            Some(to) => {
                let t = if self.max > self.min {
                    (value - self.min) / (self.max - self.min)
                } else {
                    0.0
                };
                Rgb::new(
                    lerp_channel(self.color.r, to.r, t),
                    lerp_channel(self.color.g, to.g, t),
                    lerp_channel(self.color.b, to.b, t),
                )
            }
        }
    }
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * t).round() as u8
}

/// Color rules bucketed by lookup index. Every bucket lists, in insertion
/// order, the rules whose value range overlaps the bucket's value span, so
/// stacked rules keep their declaration priority; lookup walks the bucket and
/// the first `min <= v < max` match wins. Values matching nothing, NaN
/// included, resolve to the default color.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketColorMap {
    rules: Vec<ColorRule>,
    buckets: Vec<Vec<usize>>,
    default_color: Rgb,
    min: f64,
    coeff: f64,
}

impl BucketColorMap {
    /// Buckets the rules over the given value domain.
    pub fn new(rules: Vec<ColorRule>, default_color: Rgb, domain: (f64, f64)) -> Self {
        let (domain_min, domain_max) = domain;
        let coeff = if domain_max > domain_min {
            (domain_max - domain_min) / 254.0
        } else {
            1.0
        };

        let mut buckets = vec![Vec::new(); HISTOGRAM_BINS];
        for (bin, bucket) in buckets.iter_mut().enumerate() {
            let lo = domain_min + bin as f64 * coeff;
            let hi = lo + coeff;
            for (index, rule) in rules.iter().enumerate() {
                if rule.min < hi && rule.max > lo {
                    bucket.push(index);
                }
            }
        }

        BucketColorMap {
            rules,
            buckets,
            default_color,
            min: domain_min,
            coeff,
        }
    }

    /// Threshold classification. Values below the first threshold take the
    /// base color, each `thresholds[i] <= v < thresholds[i + 1]` span takes
    /// `colors[i]`, and the final span is open ended.
    pub fn categorize(
        base: Rgb,
        thresholds: &[f64],
        colors: &[Rgb],
        default_color: Rgb,
        domain: (f64, f64),
    ) -> Result<Self> {
        if thresholds.is_empty() || colors.len() != thresholds.len() {
            return Err(Error::InvalidArgument(format!(
                "Categorize needs one color per threshold, got {} thresholds and {} colors",
                thresholds.len(),
                colors.len()
            )));
        }
        if !thresholds.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(Error::InvalidArgument(
                "Categorize thresholds must be strictly increasing".to_string(),
            ));
        }

        let mut rules = Vec::with_capacity(thresholds.len() + 1);
        rules.push(ColorRule::solid(f64::MIN, thresholds[0], base));
        for (i, &threshold) in thresholds.iter().enumerate() {
            let max = thresholds.get(i + 1).copied().unwrap_or(f64::MAX);
            rules.push(ColorRule::solid(threshold, max, colors[i]));
        }

        Ok(Self::new(rules, default_color, domain))
    }

    /// Piecewise linear gradient through sorted control points. Each adjacent
    /// pair becomes one gradient rule; values outside the covered span fall
    /// to the default color.
    pub fn interpolate(points: &[(f64, Rgb)], default_color: Rgb, domain: (f64, f64)) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::InvalidArgument(
                "Interpolation needs at least two control points".to_string(),
            ));
        }
        if !points.windows(2).all(|pair| pair[0].0 < pair[1].0) {
            return Err(Error::InvalidArgument(
                "Interpolation points must be strictly increasing".to_string(),
            ));
        }

        let rules = points
            .windows(2)
            .map(|pair| ColorRule::gradient(pair[0].0, pair[1].0, pair[0].1, pair[1].1))
            .collect();

        Ok(Self::new(rules, default_color, domain))
    }

    /// Resolves a raw value to its color.
    pub fn color_of(&self, value: f64) -> Rgb {
        let bin = (((value - self.min) / self.coeff) as usize).min(HISTOGRAM_BINS - 1);
        for &index in &self.buckets[bin] {
            let rule = &self.rules[index];
            if rule.matches(value) {
                return rule.color_at(value);
            }
        }

        self.default_color
    }

    pub fn default_color(&self) -> Rgb {
        self.default_color
    }
}
