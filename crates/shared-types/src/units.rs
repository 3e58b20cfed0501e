//! # Value Units
//!
//! Conversion between human-readable amounts and integer wei.

use primitive_types::U256;
use std::fmt;
use std::str::FromStr;

use crate::errors::CodecError;

/// Denominations accepted by [`to_wei`] and [`from_wei`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    Wei,
    Kwei,
    Mwei,
    Gwei,
    Szabo,
    Finney,
    #[default]
    Ether,
}

impl Unit {
    /// Number of decimal places between this unit and wei.
    pub const fn decimals(self) -> usize {
        match self {
            Unit::Wei => 0,
            Unit::Kwei => 3,
            Unit::Mwei => 6,
            Unit::Gwei => 9,
            Unit::Szabo => 12,
            Unit::Finney => 15,
            Unit::Ether => 18,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Unit::Wei => "wei",
            Unit::Kwei => "kwei",
            Unit::Mwei => "mwei",
            Unit::Gwei => "gwei",
            Unit::Szabo => "szabo",
            Unit::Finney => "finney",
            Unit::Ether => "ether",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wei" => Ok(Unit::Wei),
            "kwei" => Ok(Unit::Kwei),
            "mwei" => Ok(Unit::Mwei),
            "gwei" => Ok(Unit::Gwei),
            "szabo" => Ok(Unit::Szabo),
            "finney" => Ok(Unit::Finney),
            "ether" => Ok(Unit::Ether),
            other => Err(CodecError::InvalidAmount(format!("unknown unit {}", other))),
        }
    }
}

/// Convert a decimal amount in `unit` to wei.
///
/// `"1.5"` ether is `1500000000000000000` wei. Fractional digits beyond the
/// unit's precision are rejected rather than truncated.
pub fn to_wei(amount: &str, unit: Unit) -> Result<U256, CodecError> {
    let invalid = || CodecError::InvalidAmount(amount.to_string());
    let amount_trimmed = amount.trim();

    let (int_part, frac_part) = match amount_trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount_trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    let frac_significant = frac_part.trim_end_matches('0');
    if frac_significant.len() > unit.decimals() {
        return Err(invalid());
    }

    let combined = format!(
        "{}{:0<width$}",
        int_part,
        frac_significant,
        width = unit.decimals()
    );
    let combined = combined.trim_start_matches('0');
    if combined.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_dec_str(combined).map_err(|_| invalid())
}

/// Render a wei value in `unit`, without trailing fractional zeros.
pub fn from_wei(value: U256, unit: Unit) -> String {
    let digits = value.to_string();
    let decimals = unit.decimals();
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
