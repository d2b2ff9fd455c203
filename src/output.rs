//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! ==> Categories
//!     warning: category 9 skipped: category 9 is part of a parent cycle
//! ==> Products
//!
//! Pages
//!     categories: 4 written, 0 unchanged
//!     products: 3 written, 0 unchanged
//!     options: 3 written, 0 unchanged
//!     values: 5 written, 0 unchanged
//! Assets
//!     images: 12 cached, 3 copied, 2 encoded (17 total)
//!     files: 2 published
//!     transports: 1 published
//! Warnings: 1
//! Rendered in 0.42s
//! ```
//!
//! ## Check
//!
//! ```text
//! Categories
//! 001 living-areas
//! 002 dining-room
//!     error: category 2 is part of a parent cycle
//!
//! 4 categories, 1 broken
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::breadcrumbs::{BreadcrumbError, CategoryTree};
use crate::render::{PageCounts, RenderEvent, RenderReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn pages_line(kind: &str, counts: PageCounts) -> String {
    format!(
        "{}{}: {} written, {} unchanged",
        indent(1),
        kind,
        counts.written,
        counts.skipped
    )
}

// ============================================================================
// Render
// ============================================================================

/// Lines for one progress event.
pub fn format_render_event(event: &RenderEvent) -> Vec<String> {
    match event {
        RenderEvent::StageStarted(stage) => vec![format!("==> {}", stage)],
        RenderEvent::Warning(message) => vec![format!("{}warning: {}", indent(1), message)],
    }
}

pub fn format_render_output(report: &RenderReport) -> Vec<String> {
    let mut lines = vec![String::new(), "Pages".to_string()];
    lines.push(pages_line("categories", report.categories));
    lines.push(pages_line("products", report.products));
    lines.push(pages_line("options", report.options));
    lines.push(pages_line("values", report.values));

    lines.push("Assets".to_string());
    lines.push(format!("{}images: {}", indent(1), report.images));
    lines.push(format!("{}files: {} published", indent(1), report.files));
    lines.push(format!(
        "{}transports: {} published",
        indent(1),
        report.transports
    ));

    if report.has_warnings() {
        lines.push(format!("Warnings: {}", report.warnings.len()));
    }
    lines.push(format!(
        "Rendered in {:.2}s",
        report.elapsed.as_secs_f64()
    ));
    lines
}

pub fn print_render_output(report: &RenderReport) {
    for line in format_render_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(tree: &CategoryTree, failures: &[(i64, BreadcrumbError)]) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];
    for (pos, category) in tree.categories().enumerate() {
        lines.push(format!("{} {}", format_index(pos + 1), category.name));
        for (_, error) in failures.iter().filter(|(id, _)| *id == category.id) {
            lines.push(format!("{}error: {}", indent(1), error));
        }
    }
    lines.push(String::new());
    if failures.is_empty() {
        lines.push(format!("{} categories, all resolve", tree.len()));
    } else {
        lines.push(format!(
            "{} categories, {} broken",
            tree.len(),
            failures.len()
        ));
    }
    lines
}

pub fn print_check_output(tree: &CategoryTree, failures: &[(i64, BreadcrumbError)]) {
    for line in format_check_output(tree, failures) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::render::Stage;
    use crate::test_helpers::category;
    use std::time::Duration;

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    // =========================================================================
    // Render
    // =========================================================================

    #[test]
    fn render_events() {
        assert_eq!(
            format_render_event(&RenderEvent::StageStarted(Stage::Products)),
            vec!["==> Products"]
        );
        assert_eq!(
            format_render_event(&RenderEvent::Warning("value 3 thumbnail: gone".into())),
            vec!["    warning: value 3 thumbnail: gone"]
        );
    }

    #[test]
    fn render_report_clean_run() {
        let mut report = RenderReport::default();
        report.categories = PageCounts {
            written: 4,
            skipped: 0,
        };
        report.images = CacheStats {
            hits: 0,
            copies: 0,
            misses: 3,
        };
        report.files = 2;
        report.elapsed = Duration::from_millis(420);
        let lines = format_render_output(&report);
        assert_eq!(lines[1], "Pages");
        assert_eq!(lines[2], "    categories: 4 written, 0 unchanged");
        assert!(lines.contains(&"    images: 3 encoded".to_string()));
        assert!(lines.contains(&"    files: 2 published".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Warnings")));
        assert_eq!(lines.last().unwrap(), "Rendered in 0.42s");
    }

    #[test]
    fn render_report_counts_warnings() {
        let mut report = RenderReport::default();
        report.warn("one");
        report.warn("two");
        let lines = format_render_output(&report);
        assert!(lines.contains(&"Warnings: 2".to_string()));
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_output_lists_errors_under_category() {
        let tree = CategoryTree::new(
            vec![
                category(1, "living-areas", None, None),
                category(2, "loop", Some(2), None),
            ],
            "",
        );
        let failures = tree.check_all();
        let lines = format_check_output(&tree, &failures);
        assert_eq!(
            lines,
            vec![
                "Categories",
                "001 living-areas",
                "002 loop",
                "    error: category 2 is part of a parent cycle",
                "",
                "2 categories, 1 broken",
            ]
        );
    }

    #[test]
    fn check_output_clean() {
        let tree = CategoryTree::new(vec![category(1, "kitchen", None, None)], "");
        let lines = format_check_output(&tree, &[]);
        assert_eq!(lines.last().unwrap(), "1 categories, all resolve");
    }
}
