//! CLI output formatting — human-readable summaries of pipeline results.
//!
//! Formatting functions return strings so they can be asserted on in tests;
//! the `print_*` wrappers are what `main` calls.

use crate::content::Site;
use crate::write::WriteReport;
use std::path::Path;

/// Summary of what generation discovered, pages listed in date order.
pub fn format_generation(site: &Site) -> Vec<String> {
    let mut lines = vec![format!(
        "Discovered {} layouts, {} pages, {} assets",
        site.layouts().len(),
        site.pages().len(),
        site.assets().len()
    )];
    for page in site.pages() {
        let url = page.front_matter.get_str("url").unwrap_or("-");
        lines.push(format!("  {}  {}  {}", page.post_date, page.name, url));
    }
    lines
}

pub fn format_write(report: &WriteReport, output_dir: &Path) -> String {
    format!(
        "Wrote {} pages and {} assets to {}",
        report.pages_written,
        report.assets_written,
        output_dir.display()
    )
}

pub fn print_generation(site: &Site) {
    for line in format_generation(site) {
        println!("{line}");
    }
}

pub fn print_write(report: &WriteReport, output_dir: &Path) {
    println!("{}", format_write(report, output_dir));
}
