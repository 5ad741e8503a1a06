use crate::models::ImageSize;

/// Minimum pixel dimensions for a printed recipe image.
///
/// Defaults to an 8.5x10 inch page at 300 ppi, i.e. 2550x3000 pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintRequirements {
    /// Short edge of the page, in inches
    pub short_edge_in: f64,
    /// Long edge of the page, in inches
    pub long_edge_in: f64,
    pub ppi: u32,
}

impl Default for PrintRequirements {
    fn default() -> Self {
        Self {
            short_edge_in: 8.5,
            long_edge_in: 10.0,
            ppi: 300,
        }
    }
}

impl PrintRequirements {
    pub fn short_edge_min(&self) -> u32 {
        (self.short_edge_in * self.ppi as f64).round() as u32
    }

    pub fn long_edge_min(&self) -> u32 {
        (self.long_edge_in * self.ppi as f64).round() as u32
    }

    /// An image is printable when it covers the page in either orientation.
    /// Equal to the minimum counts as covering.
    pub fn is_satisfied_by(&self, size: ImageSize) -> bool {
        let short_min = self.short_edge_min();
        let long_min = self.long_edge_min();

        let meets_landscape = size.width >= long_min && size.height >= short_min;
        let meets_portrait = size.width >= short_min && size.height >= long_min;
        meets_landscape || meets_portrait
    }

    pub fn needs_upscale(&self, size: ImageSize) -> bool {
        !self.is_satisfied_by(size)
    }

    /// Effective pixels per inch when printed on the portrait page.
    /// Used for diagnostics only.
    pub fn effective_ppi(&self, size: ImageSize) -> f64 {
        let ppi_width = size.width as f64 / self.short_edge_in;
        let ppi_height = size.height as f64 / self.long_edge_in;
        ppi_width.min(ppi_height)
    }
}
