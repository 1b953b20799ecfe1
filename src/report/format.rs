//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the regression/controller code stays clean and testable
//! - every table and summary formats numbers the same way

use crate::domain::{AxisLabels, CoefficientSource, FitView, PeerResidual, RegressionCoefficients};
use crate::fit::diagnostics::{DropOneSensitivity, PeerInfluence};
use crate::report::Rankings;

/// `12.3%`
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// `1.269x`
pub fn format_multiple(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}x")
}

/// `+0.068x`, `-0.068x`
pub fn format_signed(value: f64, decimals: usize, suffix: &str) -> String {
    // Normalise -0.0 so it prints with a plus sign.
    let value = value + 0.0;
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.decimals$}{suffix}")
}

/// `+5.2%`
pub fn format_signed_percent(value: f64, decimals: usize) -> String {
    format_signed(value, decimals, "%")
}

/// Axis label without its unit suffix: `"ROTE (%)"` → `"ROTE"`.
pub fn short_label(label: &str) -> &str {
    match label.find(" (") {
        Some(idx) => &label[..idx],
        None => label,
    }
}

/// One-line regression summary, e.g.
/// `y = 0.124 × ROTE + -0.15 (R² = 0.96; n = 3); Refit on current selection`.
pub fn format_regression_summary(view: &FitView, fixed: &RegressionCoefficients, labels: &AxisLabels) -> String {
    let coeffs = &view.coefficients;
    let r_squared = match (coeffs.r_squared, view.source) {
        (Some(r2), _) => format!("{r2:.2}"),
        (None, CoefficientSource::Fixed) => fixed
            .r_squared
            .map(|r2| format!("{r2:.2}"))
            .unwrap_or_else(|| "n/a".to_string()),
        (None, _) => "n/a".to_string(),
    };

    let detail = match view.source {
        CoefficientSource::Refit => "Refit on current selection",
        CoefficientSource::RefitFallback => "Refit unavailable (<2 peers); showing fixed coefficients",
        CoefficientSource::Fixed => "Fixed coefficients",
    };

    format!(
        "y = {:.3} × {} + {:.2} (R² = {r_squared}; n = {}); {detail}",
        coeffs.slope,
        short_label(&labels.x),
        coeffs.intercept,
        view.selected.len(),
    )
}

/// Target annotation, e.g.
/// `CATY actual 1.269x vs fit 1.338x → residual -0.069x (-5.2%).`
pub fn format_target_annotation(view: &FitView) -> String {
    let r = &view.target_record;
    let pct = r
        .residual_pct
        .map(|p| format_signed_percent(p, 1))
        .unwrap_or_default();
    format!(
        "{} actual {} vs fit {} → residual {} ({pct}).",
        view.target.id,
        format_multiple(view.target.y, 3),
        format_multiple(r.predicted, 3),
        format_signed(r.residual, 3, "x"),
    )
}

/// Full run summary: regression line, target annotation, peer table.
pub fn format_run_summary(
    view: &FitView,
    fixed: &RegressionCoefficients,
    labels: &AxisLabels,
    sigma: f64,
) -> String {
    let mut out = String::new();

    out.push_str("=== peerfit - Peer Regression ===\n");
    out.push_str(&format!("{} vs {}\n", labels.y, labels.x));
    out.push_str(&format!(
        "Mode: {:?} | Source: {} | Peers: {}/{}\n",
        view.mode,
        view.source.label(),
        view.selected.len(),
        view.peers.len(),
    ));
    if view.using_fallback {
        out.push_str("! Fit unavailable for the current selection; showing fixed coefficients.\n");
    }
    out.push_str(&format!("{}\n", format_regression_summary(view, fixed, labels)));
    out.push_str(&format!("Residual std error: {sigma:.4}\n"));
    out.push_str(&format!("{}\n\n", format_target_annotation(view)));

    out.push_str(&format_peer_table(view, labels));
    out
}

/// Peer table with the target appended as an overlay row.
pub fn format_peer_table(view: &FitView, labels: &AxisLabels) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>8} {:<8}\n",
            "id",
            short_label(&labels.x),
            short_label(&labels.y),
            "fit",
            "residual",
            "resid%",
            "included"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<12} {:-<10} {:-<10} {:-<10} {:-<10} {:-<8} {:-<8}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for p in &view.peers {
        let included = if p.included { "Yes" } else { "No" };
        out.push_str(&table_row(p, included));
    }
    let overlay = PeerResidual {
        peer: view.target.clone(),
        included: false,
        record: view.target_record,
    };
    out.push_str(&table_row(&overlay, "Overlay"));
    out
}

fn table_row(p: &PeerResidual, included: &str) -> String {
    let pct = p
        .record
        .residual_pct
        .map(|v| format_signed_percent(v, 1))
        .unwrap_or_else(|| "n/a".to_string());
    let mut row = format!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>8} {:<8}",
        truncate(&p.peer.id, 12),
        format_percent(p.peer.x, 2),
        format_multiple(p.peer.y, 3),
        format_multiple(p.record.predicted, 3),
        format_signed(p.record.residual, 3, "x"),
        pct,
        included,
    )
    .trim_end()
    .to_string();
    row.push('\n');
    row
}

/// Format the rich/cheap leader lists.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Top rich (above fit):\n");
    out.push_str(&format_leaders(&rankings.rich));
    out.push('\n');

    out.push_str("Top cheap (below fit):\n");
    out.push_str(&format_leaders(&rankings.cheap));

    out
}

fn format_leaders(rows: &[PeerResidual]) -> String {
    if rows.is_empty() {
        return "  (none)\n".to_string();
    }
    let mut out = String::new();
    for p in rows {
        out.push_str(&format!(
            "  {:<12} {}\n",
            truncate(&p.peer.id, 12),
            format_signed(p.record.residual, 3, "x")
        ));
    }
    out
}

/// Cook's distance and drop-one refits side by side.
pub fn format_sensitivity(influence: &[PeerInfluence], drops: &[DropOneSensitivity], target_id: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>10} {:>10} {:>12} {:>14}\n",
        "dropped", "cooks_d", "slope", "intercept", format!("{target_id} Δfit")
    ));
    for d in drops {
        let cooks = influence
            .iter()
            .find(|i| i.id == d.dropped)
            .and_then(|i| i.cooks_distance)
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<12} {:>10} {:>10.4} {:>12.4} {:>14}\n",
            truncate(&d.dropped, 12),
            cooks,
            d.slope,
            d.intercept,
            format_signed(d.target_delta, 3, "x"),
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
