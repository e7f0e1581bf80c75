//! Console summary of a run

use console::Style;

use crate::report::{AggregateReport, Tally};

/// "N% (x of y)", with 0% for an empty denominator
pub fn percentage(numerator: usize, denominator: usize) -> String {
    let percent = if denominator == 0 {
        0
    } else {
        (numerator * 100 + denominator / 2) / denominator
    };
    format!("{percent}% ({numerator} of {denominator})")
}

fn render_tally(tally: &Tally) -> String {
    format!(
        "  - {} packages had either only a default export in CommonJS and therefore also in ESM \
         ({} packages) or all named exports detected in CommonJS were also detected in ESM \
         ({} packages).\n  \
         - {} packages had either some but not all CommonJS exports detected in ESM \
         ({} packages) or no CommonJS exports detected in ESM ({} packages).\n    \
         Of these, {} had a readme showing named exports but nothing was detected.\n",
        percentage(tally.compatible(), tally.count),
        tally.default_only,
        tally.all_detected,
        percentage(tally.incompatible(), tally.count),
        tally.some_detected(),
        tally.none_detected(),
        tally.expected_but_none_detected,
    )
}

/// Render the whole report as plain or styled text
pub fn render(report: &AggregateReport) -> String {
    let heading = Style::new().bold();
    let sections = [
        (
            format!(
                "Of all {} packages installed and tested:",
                report.overall.count
            ),
            &report.overall,
        ),
        (
            format!(
                "Of {} packages that had a readme encouraging the use of named exports:",
                report.readme_signaled.count
            ),
            &report.readme_signaled,
        ),
        (
            format!(
                "Of {} packages generated via transpilation:",
                report.transpiled.count
            ),
            &report.transpiled,
        ),
    ];

    sections
        .iter()
        .map(|(title, tally)| format!("{}\n\n{}", heading.apply_to(title), render_tally(tally)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the report to stdout
pub fn print(report: &AggregateReport) {
    println!("{}", render(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Bucket;

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(1, 3), "33% (1 of 3)");
        assert_eq!(percentage(2, 3), "67% (2 of 3)");
        assert_eq!(percentage(0, 0), "0% (0 of 0)");
    }

    #[test]
    fn test_render_mentions_every_section() {
        let mut report = AggregateReport::default();
        report.overall.add(Bucket::DefaultOnly);
        report.overall.add(Bucket::PartialNoSignal);
        report.transpiled.add(Bucket::PartialNoSignal);

        let text = console::strip_ansi_codes(&render(&report)).into_owned();
        assert!(text.contains("Of all 2 packages installed and tested:"));
        assert!(text.contains("50% (1 of 2)"));
        assert!(text.contains("Of 0 packages that had a readme"));
        assert!(text.contains("Of 1 packages generated via transpilation:"));
    }
}
