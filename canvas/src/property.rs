//! Property data snapshot and the number formatting used on the story card.

#[cfg(test)]
#[path = "property_test.rs"]
mod property_test;

use serde::{Deserialize, Serialize};

use crate::config::Labels;

/// Read-only snapshot of the form. Financial figures arrive precomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyData {
    pub address: String,
    /// Key into [`Labels::property_types`].
    pub property_type: String,
    /// Floor area in square meters.
    pub area: f64,
    /// Key into [`Labels::banks`].
    pub bank: String,
    /// Annual interest rate in percent.
    pub interest_rate: f64,
    pub monthly_payment: f64,
    pub initial_payment: f64,
    pub total_cost: f64,
}

impl PropertyData {
    /// Parse from the form's JSON. Missing fields default to empty/zero.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Largest cent count an `f64` holds exactly.
const EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// Format `value` with grouped thousands and at most two fraction digits.
///
/// Trailing fraction zeros are dropped, so `1500000.0` renders as
/// `1 500 000` and `7.5` as `7,5` with the default separators.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_number(value: f64, thousands: &str, decimal: &str) -> String {
    if !value.is_finite() {
        return "0".into();
    }

    let scaled = (value.abs() * 100.0).round();
    // Past 2^53 cents are no longer exact, and `u64` would saturate; print
    // the whole part from the float instead.
    let (digits, frac) = if scaled < EXACT_CENTS {
        let cents = scaled as u64;
        ((cents / 100).to_string(), cents % 100)
    } else {
        (format!("{:.0}", value.abs()), 0)
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * thousands.len() + 4);
    if value < 0.0 && scaled > 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(thousands);
        }
        out.push(ch);
    }

    if frac > 0 {
        out.push_str(decimal);
        if frac % 10 == 0 {
            out.push_str(&(frac / 10).to_string());
        } else {
            out.push_str(&format!("{frac:02}"));
        }
    }
    out
}

impl Labels {
    /// A currency amount with the configured punctuation and suffix.
    #[must_use]
    pub fn money(&self, value: f64) -> String {
        format!("{}{}", self.number(value), self.currency_suffix)
    }

    /// A plain number with the configured punctuation.
    #[must_use]
    pub fn number(&self, value: f64) -> String {
        format_number(value, &self.thousands_separator, &self.decimal_separator)
    }
}
