use serde::Serialize;

/// Share of paid duties that can be reclaimed on re-export.
pub const RECOVERY_RATE: f64 = 0.99;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DrawbackEstimate {
    pub duties_paid: f64,
    pub potential_drawback: f64,
}

/// Estimates the duty drawback on `import_value` at `duty_rate_percent`.
///
/// Inputs that are not positive finite numbers give an all-zero estimate.
pub fn estimate(import_value: f64, duty_rate_percent: f64) -> DrawbackEstimate {
    let usable = |value: f64| value.is_finite() && value > 0.0;
    if !usable(import_value) || !usable(duty_rate_percent) {
        return DrawbackEstimate::default();
    }

    let duties_paid = import_value * (duty_rate_percent / 100.0);
    DrawbackEstimate {
        duties_paid,
        potential_drawback: duties_paid * RECOVERY_RATE,
    }
}

/// Formats as US dollars, e.g. `$3,712.50`.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
