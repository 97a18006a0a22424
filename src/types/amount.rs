//! Exact human-readable token amounts.
//!
//! An [`Amount`] is `mantissa * 10^exponent` with an integer mantissa, so any
//! positive finite input can be quoted, including values outside the range
//! of `rust_decimal::Decimal`.

use std::fmt;

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::error::{AppError, Result};

/// Significant digits kept from the input. Later digits are dropped.
pub const MAX_SIGNIFICANT_DIGITS: usize = 38;

/// Largest power of ten that fits in a `U256`.
const MAX_POW10: u64 = 77;

/// A strictly positive decimal amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    mantissa: U256,
    exponent: i64,
}

impl Amount {
    /// Parse a decimal or scientific-notation string.
    ///
    /// # Errors
    /// `InvalidAmount` unless the input is a finite number greater than zero
    /// when read as a double.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || AppError::InvalidAmount(raw.to_string());
        let trimmed = raw.trim();

        let approx: f64 = trimmed.parse().map_err(|_| invalid())?;
        if !approx.is_finite() || approx <= 0.0 {
            return Err(invalid());
        }

        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let (digits_part, exponent) = match unsigned.find(['e', 'E']) {
            Some(index) => {
                let exponent = unsigned[index + 1..].parse::<i64>().map_err(|_| invalid())?;
                (&unsigned[..index], exponent)
            }
            None => (unsigned, 0),
        };

        let (integer, fraction) = digits_part.split_once('.').unwrap_or((digits_part, ""));
        let digits = format!("{}{}", integer, fraction);
        let mut exponent = exponent - fraction.len() as i64;

        let significant = digits.trim_start_matches('0');
        let without_trailing = significant.trim_end_matches('0');
        exponent += (significant.len() - without_trailing.len()) as i64;

        let kept = if without_trailing.len() > MAX_SIGNIFICANT_DIGITS {
            exponent += (without_trailing.len() - MAX_SIGNIFICANT_DIGITS) as i64;
            &without_trailing[..MAX_SIGNIFICANT_DIGITS]
        } else {
            without_trailing
        };

        let mantissa = kept.parse::<U256>().map_err(|_| invalid())?;
        if mantissa.is_zero() {
            return Err(invalid());
        }
        Ok(Self { mantissa, exponent }.normalized())
    }

    /// Multiply by a non-negative decimal, exactly.
    ///
    /// # Errors
    /// `Parse` for a negative factor, `NumericOverflow` if the mantissa
    /// leaves 256 bits.
    pub fn checked_mul(&self, factor: Decimal) -> Result<Self> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(AppError::Parse(format!("Negative factor: {}", factor)));
        }
        let mantissa = self
            .mantissa
            .checked_mul(U256::from(factor.mantissa().unsigned_abs()))
            .ok_or_else(|| AppError::NumericOverflow(format!("{} * {}", self, factor)))?;

        Ok(Self { mantissa, exponent: self.exponent - i64::from(factor.scale()) }.normalized())
    }

    /// Value in smallest units for a token with `decimals`, truncating
    /// excess fractional digits.
    ///
    /// # Errors
    /// `NumericOverflow` when the result does not fit in a uint256.
    pub fn to_units(&self, decimals: u8) -> Result<U256> {
        let shift = self.exponent + i64::from(decimals);
        if shift >= 0 {
            pow10(shift)
                .and_then(|scale| self.mantissa.checked_mul(scale))
                .ok_or_else(|| {
                    AppError::NumericOverflow(format!(
                        "{} with {} decimals exceeds uint256",
                        self, decimals
                    ))
                })
        } else {
            Ok(pow10(-shift).map(|divisor| self.mantissa / divisor).unwrap_or(U256::ZERO))
        }
    }

    /// Render with exactly `dp` fractional digits, rounding half away from zero.
    pub fn to_fixed(&self, dp: u32) -> String {
        let shift = self.exponent + i64::from(dp);
        let scaled = if self.mantissa.is_zero() {
            "0".to_string()
        } else if shift >= 0 {
            format!("{}{}", self.mantissa, "0".repeat(shift as usize))
        } else {
            match pow10(-shift) {
                Some(divisor) => {
                    let quotient = self.mantissa / divisor;
                    let remainder = self.mantissa % divisor;
                    let rounded = if remainder >= divisor / U256::from(2u8) {
                        quotient + U256::from(1u8)
                    } else {
                        quotient
                    };
                    rounded.to_string()
                }
                // mantissa < 10^78, so the value is below half a unit
                None => "0".to_string(),
            }
        };
        insert_point(scaled, dp as usize)
    }

    fn normalized(mut self) -> Self {
        let ten = U256::from(10u8);
        while !self.mantissa.is_zero() && (self.mantissa % ten).is_zero() {
            self.mantissa /= ten;
            self.exponent += 1;
        }
        self
    }
}

impl fmt::Display for Amount {
    /// Plain decimal notation without trailing zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent >= 0 {
            write!(f, "{}{}", self.mantissa, "0".repeat(self.exponent as usize))
        } else {
            let dp = self.exponent.unsigned_abs() as usize;
            f.write_str(&insert_point(self.mantissa.to_string(), dp))
        }
    }
}

fn pow10(exponent: i64) -> Option<U256> {
    if !(0..=MAX_POW10 as i64).contains(&exponent) {
        return None;
    }
    let ten = U256::from(10u8);
    (0..exponent).try_fold(U256::from(1u8), |acc, _| acc.checked_mul(ten))
}

fn insert_point(digits: String, dp: usize) -> String {
    if dp == 0 {
        return digits;
    }
    let padded = if digits.len() <= dp {
        format!("{}{}", "0".repeat(dp + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (integer, fraction) = padded.split_at(padded.len() - dp);
    format!("{}.{}", integer, fraction)
}
