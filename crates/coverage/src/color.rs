/// 24 bit RGB color, the only color depth that survives this pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn black() -> Self {
        Rgb::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Rgb::new(255, 255, 255)
    }

    /// ITU-R 601 luminance, truncated rather than rounded.
    pub fn luminance(&self) -> u8 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)) as u8
    }

    pub fn is_gray(&self) -> bool {
        self.r == self.g && self.g == self.b
    }
}
