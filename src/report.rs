//! Plain-text rendering of a [`Recommendation`] for the terminal

use std::fmt::Write;

use crate::models::Recommendation;

/// Format an amount as rupees with thousands separators, e.g. `₹1,234,567.89`
#[must_use]
pub fn format_rupees(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}₹{grouped}.{fraction}")
}

/// Multi-line report listing location, weather, ranking and the estimate
#[must_use]
pub fn render(rec: &Recommendation, loan_to_cost_ratio: f64) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "AgriProfit estimate");
    let _ = writeln!(out, "===================");
    let _ = writeln!(
        out,
        "Location: {} (pincode {}, {})",
        rec.location.display_name(),
        rec.location.pincode,
        rec.location.format_coordinates()
    );
    let _ = writeln!(out, "Land area: {:.2} ha", rec.land_area);
    let _ = writeln!(out, "Weather: {}", rec.weather.format_summary());
    let _ = writeln!(out);

    let _ = writeln!(out, "Top crops:");
    for (i, score) in rec.ranked_crops.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<16} {}",
            i + 1,
            score.crop_name,
            score.format_percentage()
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Crop ratio: {}", rec.ratio_display());
    for a in &rec.allocations {
        let _ = writeln!(
            out,
            "  {:<16} {:>5.1}%  {:.2} ha  cost {}  profit {}",
            a.crop_name,
            a.fraction * 100.0,
            a.allocated_area,
            format_rupees(a.cost),
            format_rupees(a.profit)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Estimated Cost of Production: {}",
        format_rupees(rec.estimated_cost)
    );
    let _ = writeln!(
        out,
        "Estimated Total Profit: {}",
        format_rupees(rec.estimated_profit)
    );
    let _ = writeln!(
        out,
        "Estimated Loan Amount ({:.0}% of cost): {}",
        loan_to_cost_ratio * 100.0,
        format_rupees(rec.estimated_loan)
    );

    out
}
