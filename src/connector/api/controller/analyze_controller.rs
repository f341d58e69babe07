use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;

use crate::cli::OutputFormat;
use crate::domain::{CategoryIcon, ClassificationOutput, DomainError};

use super::super::Container;

pub const EMPTY_DOCUMENT_MESSAGE: &str = "Document content cannot be empty.";

const LABEL_WIDTH: usize = 29;

pub struct AnalyzeController<'a> {
    container: &'a Container,
}

impl<'a> AnalyzeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Reads the document from `path` (standard input when absent or `-`)
    /// and renders the classification in the requested format.
    pub async fn analyze(&self, path: Option<String>, format: OutputFormat) -> Result<String> {
        let document = read_document(path.as_deref()).await?;
        self.analyze_text(&document, format).await
    }

    pub async fn analyze_text(&self, document: &str, format: OutputFormat) -> Result<String> {
        if document.trim().is_empty() {
            return Err(DomainError::invalid_input(EMPTY_DOCUMENT_MESSAGE).into());
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        spinner.set_message("Analyzing document, please wait...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.container.analyze_use_case().execute(document).await;
        spinner.finish_and_clear();
        let output = result?;

        Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(&output)?,
            OutputFormat::Text => render_classification(&output),
        })
    }
}

async fn read_document(path: Option<&str>) -> Result<String> {
    match path {
        None | Some("-") => {
            let mut document = String::new();
            tokio::io::stdin()
                .read_to_string(&mut document)
                .await
                .context("Failed to read document from standard input")?;
            Ok(document)
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read document from {}", path)),
    }
}

/// Labelled text view of a classification record. The `"N/A"` secondary
/// classification and alternative routing rows are left out.
pub fn render_classification(output: &ClassificationOutput) -> String {
    let mut out = String::from("Classification Analysis\n=======================\n");

    push_row(&mut out, "Document ID", &output.document_id);
    push_row(
        &mut out,
        "Primary Classification",
        &with_icon(&output.primary_classification),
    );
    if output.has_secondary_classification() {
        push_row(
            &mut out,
            "Secondary Classification",
            &with_icon(&output.secondary_classification),
        );
    }
    push_row(&mut out, "Confidence Score", &format!("{}%", output.confidence_score));
    push_row(&mut out, "Routing Destination", &output.routing_destination);
    if output.has_alternative_routing() {
        push_row(&mut out, "Alternative Routing", &output.alternative_routing);
    }
    let priority = if output.priority_level.is_urgent() {
        format!("{} (urgent)", output.priority_level)
    } else {
        output.priority_level.to_string()
    };
    push_row(&mut out, "Priority Level", &priority);
    push_row(
        &mut out,
        "Estimated Processing Time",
        &output.estimated_processing_time,
    );
    push_row(&mut out, "Human Review Required", yes_no(output.requires_human_review()));
    push_row(
        &mut out,
        "Sensitive Content Detected",
        yes_no(output.has_sensitive_content()),
    );
    push_row(&mut out, "Processing Notes", &output.processing_notes);

    if !output.required_actions.is_empty() {
        out.push_str("Required Actions:\n");
        for action in &output.required_actions {
            out.push_str(&format!("  - {}\n", action));
        }
    }

    out
}

fn push_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "{:<width$}{}\n",
        format!("{}:", label),
        value,
        width = LABEL_WIDTH
    ));
}

fn with_icon(label: &str) -> String {
    format!("{} {}", CategoryIcon::for_label(label).glyph(), label)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
