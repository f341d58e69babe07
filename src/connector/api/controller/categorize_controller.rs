use anyhow::Result;

use crate::domain::CategoryIcon;

/// Prints the icon hint the classification view would show for a label.
pub struct CategorizeController;

impl CategorizeController {
    pub fn new() -> Self {
        Self
    }

    pub fn categorize(&self, label: String) -> Result<String> {
        let icon = CategoryIcon::for_label(&label);
        Ok(format!("{} {} ({})", icon.glyph(), label, icon.as_str()))
    }
}

impl Default for CategorizeController {
    fn default() -> Self {
        Self::new()
    }
}
