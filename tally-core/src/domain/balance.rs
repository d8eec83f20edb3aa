//! Balance-update policy
//!
//! Decides which numeric inputs may reach the store. Amounts must be present
//! and finite; sign is irrelevant, balances are allowed to go negative.

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// A requested balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum BalanceChange {
    /// Relative adjustment added to the current balance
    Adjust(f64),
    /// Absolute value replacing the current balance
    Set(f64),
}

impl BalanceChange {
    /// New balance after applying this change to `current`
    ///
    /// Finite inputs can still overflow; a non-finite outcome is rejected so
    /// it never reaches storage.
    pub fn apply(self, current: f64) -> Result<f64> {
        let next = match self {
            Self::Adjust(delta) => current + delta,
            Self::Set(value) => value,
        };
        if next.is_finite() {
            Ok(next)
        } else {
            Err(Error::validation(format!(
                "resulting balance is out of range ({})",
                next
            )))
        }
    }
}

/// Require a present, finite amount for `field`
pub fn require_finite(field: &str, value: Option<f64>) -> Result<f64> {
    match value {
        None => Err(Error::validation(format!("{} is required", field))),
        Some(v) if v.is_nan() => Err(Error::validation(format!("{} must be a number", field))),
        Some(v) if !v.is_finite() => {
            Err(Error::validation(format!("{} must be a finite number", field)))
        }
        Some(v) => Ok(v),
    }
}

/// Parse a textual amount (CLI arguments, query strings)
///
/// Missing or blank text counts as missing; anything `f64` can't parse is
/// rejected as non-numeric.
pub fn parse_amount(field: &str, raw: Option<&str>) -> Result<f64> {
    let value = match raw.map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(
            s.parse::<f64>()
                .map_err(|_| Error::validation(format!("{} must be a number", field)))?,
        ),
    };
    require_finite(field, value)
}
