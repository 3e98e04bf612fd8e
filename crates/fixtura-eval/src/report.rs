use crate::metrics::MetricsReport;
use crate::model::Violation;

/// Render a deterministic markdown report from metrics and violations.
pub fn render_report(
    metrics: &MetricsReport,
    violations: &[Violation],
    max_examples: usize,
) -> String {
    let mut lines = Vec::new();

    lines.push("# Fixtura Evaluation Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- run_id: {}", metrics.run_id));
    lines.push(format!(
        "- seed: {}",
        metrics
            .seed
            .map(|seed| seed.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!(
        "- reference_date: {}",
        metrics.reference_date.as_deref().unwrap_or("-")
    ));
    lines.push(String::new());

    lines.push("## Datasets and row counts".to_string());
    lines.push("| dataset | rows_expected | rows_found |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    for dataset in &metrics.datasets {
        let expected = dataset
            .rows_expected
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "| {} | {} | {} |",
            dataset.dataset, expected, dataset.rows_found
        ));
    }
    lines.push(String::new());

    lines.push("## Check summary".to_string());
    lines.push("| check | checked | violations |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    for (name, stats) in metrics.checks.rows() {
        lines.push(format!(
            "| {} | {} | {} |",
            name, stats.checked, stats.violations
        ));
    }
    lines.push(String::new());

    lines.push("## Frequencies".to_string());
    for table in &metrics.frequencies {
        lines.push(format!(
            "### {} (n={}, chi2={:.2}, df={})",
            table.field, table.total, table.chi_square, table.degrees_of_freedom
        ));
        lines.push("| value | observed | observed_share | expected_share |".to_string());
        lines.push("| --- | --- | --- | --- |".to_string());
        for category in &table.categories {
            lines.push(format!(
                "| {} | {} | {:.4} | {:.4} |",
                category.label, category.observed, category.observed_share, category.expected_share
            ));
        }
        lines.push(String::new());
    }

    if !metrics.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        for warning in &metrics.warnings {
            let hint = warning
                .hint
                .as_ref()
                .map(|hint| format!(" (hint: {hint})"))
                .unwrap_or_default();
            lines.push(format!("- {}: {}{}", warning.path, warning.message, hint));
        }
        lines.push(String::new());
    }

    if !violations.is_empty() {
        lines.push("## Top violations".to_string());
        for violation in violations.iter().take(max_examples) {
            let row = violation
                .row_index
                .map(|row| format!(" row {row}"))
                .unwrap_or_default();
            let example = violation
                .example
                .as_ref()
                .map(|value| format!(" example={value}"))
                .unwrap_or_default();
            lines.push(format!(
                "- {}{}: {}{}",
                violation.path, row, violation.message, example
            ));
        }
        if violations.len() > max_examples {
            lines.push(format!(
                "- ... {} more",
                violations.len() - max_examples
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(metrics, violations));
    lines.join("\n")
}

fn recommendations(metrics: &MetricsReport, violations: &[Violation]) -> Vec<String> {
    let checks = &metrics.checks;
    let mut lines = Vec::new();
    if checks.unique.violations > 0 {
        lines.push("- raise the national id retry bound or lower the registry count.".to_string());
    }
    if checks.foreign_key.violations > 0 || checks.delivery.violations > 0 {
        lines.push("- regenerate orders from the registry set they are evaluated against.".to_string());
    }
    if checks.date_window.violations > 0 {
        lines.push("- evaluate with the reference date used at generation time.".to_string());
    }
    if metrics.frequencies.iter().any(|table| !table.consistent) {
        lines.push("- compare categorical weights with the generator's tables.".to_string());
    }
    if violations.is_empty() {
        lines.push("- no violations detected; compare metrics across runs for drift.".to_string());
    }
    lines
}
