/// Geospatial placement of a raster: extent, per axis resolution and the
/// optional EPSG code carried through the GeoTIFF tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Georeference {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub x_res: f64,
    pub y_res: f64,
    pub epsg: Option<u32>,
}

impl Georeference {
    /// Builds the extent from the top left corner, the resolutions and the
    /// raster dimensions.
    pub fn with_origin(min_x: f64, max_y: f64, x_res: f64, y_res: f64, width: u32, height: u32) -> Self {
        Georeference {
            min_x,
            min_y: max_y - y_res * f64::from(height),
            max_x: min_x + x_res * f64::from(width),
            max_y,
            x_res,
            y_res,
            epsg: None,
        }
    }

    /// Derives the resolutions from a bounding extent and the raster
    /// dimensions.
    pub fn with_extent(min_x: f64, min_y: f64, max_x: f64, max_y: f64, width: u32, height: u32) -> Self {
        Georeference {
            min_x,
            min_y,
            max_x,
            max_y,
            x_res: (max_x - min_x) / f64::from(width),
            y_res: (max_y - min_y) / f64::from(height),
            epsg: None,
        }
    }

    pub fn with_epsg(mut self, epsg: u32) -> Self {
        self.epsg = Some(epsg);
        self
    }

    pub fn extent_width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn extent_height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_valid(&self) -> bool {
        self.x_res > 0.0 && self.y_res > 0.0 && self.max_x > self.min_x && self.max_y > self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_constructor_derives_the_extent() {
        let geo = Georeference::with_origin(100.0, 50.0, 0.5, 0.25, 200, 80);

        assert_abs_diff_eq!(geo.max_x, 200.0);
        assert_abs_diff_eq!(geo.min_y, 30.0);
        assert_abs_diff_eq!(geo.extent_width(), 100.0);
        assert_abs_diff_eq!(geo.extent_height(), 20.0);
        assert!(geo.is_valid());
        assert_eq!(geo.epsg, None);
    }

    #[test]
    fn extent_constructor_derives_the_resolutions() {
        let geo = Georeference::with_extent(100.0, 30.0, 200.0, 50.0, 200, 80);

        assert_abs_diff_eq!(geo.x_res, 0.5);
        assert_abs_diff_eq!(geo.y_res, 0.25);
        assert_eq!(geo, Georeference::with_origin(100.0, 50.0, 0.5, 0.25, 200, 80));
    }

    #[test]
    fn negative_resolution_is_invalid() {
        let geo = Georeference::with_origin(0.0, 0.0, -1.0, 1.0, 10, 10);
        assert!(!geo.is_valid());
    }
}
