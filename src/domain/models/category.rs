use serde::{Deserialize, Serialize};

/// Icon hint shown next to a classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryIcon {
    Finance,
    Legal,
    People,
    Technical,
    Customer,
    Default,
}

/// Checked in order; the first keyword found in the label wins.
const CATEGORY_KEYWORDS: &[(&[&str], CategoryIcon)] = &[
    (&["financial"], CategoryIcon::Finance),
    (&["legal"], CategoryIcon::Legal),
    (&["hr", "human resources"], CategoryIcon::People),
    (&["technical"], CategoryIcon::Technical),
    (&["customer"], CategoryIcon::Customer),
];

impl CategoryIcon {
    pub fn for_label(label: &str) -> Self {
        let label = label.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| label.contains(k)))
            .map(|(_, icon)| *icon)
            .unwrap_or(CategoryIcon::Default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryIcon::Finance => "finance",
            CategoryIcon::Legal => "legal",
            CategoryIcon::People => "people",
            CategoryIcon::Technical => "technical",
            CategoryIcon::Customer => "customer",
            CategoryIcon::Default => "document",
        }
    }

    /// Terminal glyph used by the text renderer.
    pub fn glyph(&self) -> &'static str {
        match self {
            CategoryIcon::Finance => "💰",
            CategoryIcon::Legal => "🏛",
            CategoryIcon::People => "👥",
            CategoryIcon::Technical => "⚙",
            CategoryIcon::Customer => "💬",
            CategoryIcon::Default => "📋",
        }
    }
}
