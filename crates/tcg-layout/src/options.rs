/// Export-time switches for a card sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOptions {
    /// Insert a fixed gap between adjacent cards
    pub enable_spacing: bool,
    /// Draw registration lines at each card's corners
    pub enable_crop_marks: bool,
}

impl LayoutOptions {
    pub fn new(enable_spacing: bool, enable_crop_marks: bool) -> Self {
        Self {
            enable_spacing,
            enable_crop_marks,
        }
    }

    /// Gap between adjacent cards in millimeters
    pub fn gap_mm(&self) -> f32 {
        if self.enable_spacing {
            crate::constants::CARD_GAP_MM
        } else {
            0.0
        }
    }
}
