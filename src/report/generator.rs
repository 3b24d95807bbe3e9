//! Markdown and JSON report generation.

use crate::feed::{ALL_CATEGORIES, PAGE_SIZE_INCREMENT};
use crate::orders::OrderSummary;
use crate::report::{ActivityEntry, ActivityReport, OrderReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Rendering knobs taken from `[report]` config.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Wrap each record in `<details>`.
    pub collapsible: bool,
    /// chrono format string for event dates.
    pub date_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            collapsible: true,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl From<&crate::config::ReportConfig> for RenderOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            collapsible: config.collapsible,
            date_format: config.date_format.clone(),
        }
    }
}

/// Generate the activity log as Markdown.
pub fn generate_activity_markdown(report: &ActivityReport, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Activity Log\n\n");
    output.push_str(&generate_activity_metadata(report));

    if report.loaded_records == 0 {
        output.push_str("No data available.\n\n");
    } else if report.entries.is_empty() {
        output.push_str(&format!(
            "No events match the `{}` filter.\n\n",
            report.filter
        ));
    } else {
        for entry in &report.entries {
            output.push_str(&generate_entry_block(entry, options));
        }
    }

    if report.has_more {
        output.push_str(&generate_load_more_hint(report));
    }

    output.push_str(&generate_footer());

    output
}

fn generate_activity_metadata(report: &ActivityReport) -> String {
    let mut section = String::new();

    section.push_str(&format!("- **Profile:** {}\n", report.profile_id));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Loaded:** {} of {} events\n",
        report.loaded_records, report.total_records
    ));
    if report.filter != ALL_CATEGORIES {
        section.push_str(&format!(
            "- **Filter:** {} ({} shown)\n",
            report.filter,
            report.entries.len()
        ));
    }
    if report.categories.len() > 1 {
        section.push_str(&format!(
            "- **Categories:** {}\n",
            report.categories[1..].join(", ")
        ));
    }
    section.push('\n');

    section
}

/// Format an event date; a format chrono cannot render falls back to RFC 3339.
fn format_date(timestamp: Option<DateTime<Utc>>, date_format: &str) -> String {
    let Some(ts) = timestamp else {
        return "N/A".to_string();
    };

    let mut rendered = String::new();
    match write!(rendered, "{}", ts.format(date_format)) {
        Ok(()) => rendered,
        Err(_) => ts.to_rfc3339(),
    }
}

/// Render one event, collapsible or as a plain section.
fn generate_entry_block(entry: &ActivityEntry, options: &RenderOptions) -> String {
    let mut block = String::new();

    let heading = format!(
        "✅ {} · {}",
        entry.category,
        format_date(entry.timestamp, &options.date_format)
    );

    if options.collapsible {
        block.push_str(&format!("<details>\n<summary>{}</summary>\n\n", heading));
    } else {
        block.push_str(&format!("### {}\n\n", heading));
    }

    if let Some(ref value) = entry.value {
        block.push_str(&format!("- **Value:** {}\n", value));
    }
    for property in &entry.properties {
        block.push_str(&format!("- **{}:** {}\n", property.label, property.value));
    }
    if entry.value.is_none() && entry.properties.is_empty() {
        block.push_str("_No details._\n");
    }

    if options.collapsible {
        block.push_str("\n</details>\n\n");
    } else {
        block.push('\n');
    }

    block
}

fn generate_load_more_hint(report: &ActivityReport) -> String {
    let next_pages = report.page_size / PAGE_SIZE_INCREMENT + 1;
    format!(
        "_{} more events available. Re-run with `--pages {}` or `--all` to load them._\n\n",
        report.remaining(),
        next_pages
    )
}

/// Generate the order history as Markdown.
pub fn generate_orders_markdown(report: &OrderReport) -> String {
    let mut output = String::new();

    output.push_str("# Order History\n\n");
    output.push_str(&format!("- **Profile:** {}\n", report.profile_id));
    output.push_str(&format!(
        "- **Generated:** {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.orders.is_empty() {
        output.push_str("No order history available.\n\n");
    } else {
        for (i, order) in report.orders.iter().enumerate() {
            output.push_str(&generate_order_block(i + 1, order));
        }
    }

    output.push_str(&generate_footer());

    output
}

fn generate_order_block(number: usize, order: &OrderSummary) -> String {
    let mut block = String::new();

    block.push_str(&format!("### Order {}\n\n", number));
    block.push_str(&format!("- **Product Name:** {}\n", order.product_name));
    block.push_str(&format!("- **Variant Name:** {}\n", order.variant_name));
    block.push_str(&format!("- **Quantity:** {}\n", order.quantity));
    block.push_str(&format!("- **Value:** {}\n", order.value));
    block.push_str(&format!("- **Date:** {}\n\n", order.date));
    block.push_str("---\n\n");

    block
}

fn generate_footer() -> String {
    format!(
        "*Report generated by profile-feed v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered output to `target`, or stdout when it is `-`.
pub fn write_output(content: &str, target: &str) -> Result<()> {
    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .context("Failed to write report to stdout")?;
        return Ok(());
    }

    let path = Path::new(target);
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
