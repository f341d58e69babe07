use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel the model uses for "no secondary classification / no alternative route".
pub const NOT_APPLICABLE: &str = "N/A";

/// Priority assigned by the model.
///
/// The four documented levels are matched case-insensitively; anything else
/// is kept verbatim so the record round-trips without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
    Critical,
    Unspecified(String),
}

impl PriorityLevel {
    pub fn as_str(&self) -> &str {
        match self {
            PriorityLevel::Low => "Low",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::High => "High",
            PriorityLevel::Critical => "Critical",
            PriorityLevel::Unspecified(raw) => raw,
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, PriorityLevel::High | PriorityLevel::Critical)
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        PriorityLevel::Unspecified(String::new())
    }
}

impl From<String> for PriorityLevel {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "low" => PriorityLevel::Low,
            "medium" => PriorityLevel::Medium,
            "high" => PriorityLevel::High,
            "critical" => PriorityLevel::Critical,
            _ => PriorityLevel::Unspecified(raw),
        }
    }
}

impl From<PriorityLevel> for String {
    fn from(level: PriorityLevel) -> Self {
        level.as_str().to_string()
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification/routing result, produced fresh per analysis call.
///
/// `human_review_required` and `sensitive_content_detected` stay in their wire
/// form: the literal strings `"true"`/`"false"`, sometimes followed by an
/// explanation. Use [`ClassificationOutput::requires_human_review`] and
/// [`ClassificationOutput::has_sensitive_content`] for the boolean reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutput {
    pub document_id: String,
    pub primary_classification: String,
    #[serde(default = "not_applicable")]
    pub secondary_classification: String,
    #[serde(default)]
    pub confidence_score: i64,
    #[serde(default)]
    pub routing_destination: String,
    #[serde(default = "not_applicable")]
    pub alternative_routing: String,
    #[serde(default)]
    pub priority_level: PriorityLevel,
    #[serde(default)]
    pub processing_notes: String,
    #[serde(default)]
    pub required_actions: Vec<String>,
    #[serde(default = "false_flag", deserialize_with = "flag_string")]
    pub human_review_required: String,
    #[serde(default = "false_flag", deserialize_with = "flag_string")]
    pub sensitive_content_detected: String,
    #[serde(default)]
    pub estimated_processing_time: String,
}

impl ClassificationOutput {
    pub fn requires_human_review(&self) -> bool {
        flag_is_true(&self.human_review_required)
    }

    pub fn has_sensitive_content(&self) -> bool {
        flag_is_true(&self.sensitive_content_detected)
    }

    pub fn has_secondary_classification(&self) -> bool {
        is_present(&self.secondary_classification)
    }

    pub fn has_alternative_routing(&self) -> bool {
        is_present(&self.alternative_routing)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} -> {} ({}% confidence, {} priority)",
            self.primary_classification,
            self.routing_destination,
            self.confidence_score,
            self.priority_level
        )
    }
}

/// Reads a wire flag such as `"true"` or `"true, confidence score below 70%"`.
pub fn flag_is_true(flag: &str) -> bool {
    flag.trim_start().to_lowercase().starts_with("true")
}

fn is_present(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != NOT_APPLICABLE
}

fn not_applicable() -> String {
    NOT_APPLICABLE.to_string()
}

fn false_flag() -> String {
    "false".to_string()
}

/// Keeps flags string-typed even when the model emits a JSON boolean.
fn flag_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Text(String),
        Bool(bool),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Text(text) => text,
        Flag::Bool(value) => value.to_string(),
    })
}
