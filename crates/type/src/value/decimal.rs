// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{Display, Formatter},
	hash::{Hash, Hasher},
	str::FromStr,
};

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Digits kept by decimal division, matching a decimal128 context.
pub const DIVISION_PRECISION: u64 = 34;

/// A decimal number `sign * coefficient * 10^exponent`.
///
/// Several triples can denote the same number (`100e0 == 10e1`); equality,
/// ordering and hashing are mathematical. [`Triple::rescale`] and
/// [`Triple::reduce`] pick a canonical representative.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Triple {
	sign: i8,
	coefficient: u128,
	exponent: i32,
}

impl Triple {
	pub fn new(sign: i8, coefficient: u128, exponent: i32) -> Self {
		let sign = match (coefficient, sign) {
			(0, _) => 0,
			(_, s) if s < 0 => -1,
			_ => 1,
		};
		Self {
			sign,
			coefficient,
			exponent,
		}
	}

	pub fn zero() -> Self {
		Self {
			sign: 0,
			coefficient: 0,
			exponent: 0,
		}
	}

	/// Builds `value * 10^exponent`.
	pub fn from_i128(value: i128, exponent: i32) -> Self {
		Self::new(value.signum() as i8, value.unsigned_abs(), exponent)
	}

	pub fn from_i64(value: i64) -> Self {
		Self::from_i128(value as i128, 0)
	}

	#[inline]
	pub fn sign(&self) -> i8 {
		self.sign
	}

	#[inline]
	pub fn coefficient(&self) -> u128 {
		self.coefficient
	}

	#[inline]
	pub fn exponent(&self) -> i32 {
		self.exponent
	}

	pub fn is_zero(&self) -> bool {
		self.coefficient == 0
	}

	pub fn is_negative(&self) -> bool {
		self.sign < 0
	}

	/// The signed coefficient when it fits into an `i128`.
	pub fn signed_coefficient(&self) -> Option<i128> {
		if self.sign < 0 {
			if self.coefficient == 1u128 << 127 {
				Some(i128::MIN)
			} else {
				i128::try_from(self.coefficient).ok().map(|c| -c)
			}
		} else {
			i128::try_from(self.coefficient).ok()
		}
	}

	/// Number of decimal digits of the coefficient; zero has one digit.
	pub fn digits(&self) -> u32 {
		if self.coefficient == 0 {
			1
		} else {
			self.coefficient.ilog10() + 1
		}
	}

	/// Returns the representative whose exponent is `-scale`, failing when
	/// digits would be dropped or the coefficient would overflow.
	pub fn rescale(&self, scale: i32) -> Result<Triple, TypeError> {
		let target = scale.checked_neg().ok_or_else(|| self.out_of_range())?;
		if self.coefficient == 0 {
			return Ok(Triple::new(0, 0, target));
		}
		match self.exponent.cmp(&target) {
			Ordering::Equal => Ok(*self),
			Ordering::Greater => {
				let shift = (self.exponent as i64 - target as i64) as u32;
				let coefficient = pow10(shift)
					.and_then(|factor| self.coefficient.checked_mul(factor))
					.ok_or_else(|| self.out_of_range())?;
				Ok(Triple::new(self.sign, coefficient, target))
			}
			Ordering::Less => {
				let shift = (target as i64 - self.exponent as i64) as u32;
				let Some(divisor) = pow10(shift) else {
					return Err(self.precision_lost(scale));
				};
				if self.coefficient % divisor != 0 {
					return Err(self.precision_lost(scale));
				}
				Ok(Triple::new(self.sign, self.coefficient / divisor, target))
			}
		}
	}

	/// Strips trailing zeros from the coefficient.
	pub fn reduce(&self) -> Triple {
		if self.coefficient == 0 {
			return Triple::zero();
		}
		let mut coefficient = self.coefficient;
		let mut exponent = self.exponent;
		while coefficient % 10 == 0 && exponent < i32::MAX {
			coefficient /= 10;
			exponent += 1;
		}
		Triple::new(self.sign, coefficient, exponent)
	}

	/// Checks the value against a declared `DECIMAL(precision, scale)` and
	/// returns its representative at that scale.
	pub fn fit(&self, precision: u8, scale: u8) -> Result<Triple, TypeError> {
		let rescaled = self.rescale(scale as i32)?;
		if rescaled.coefficient != 0 && rescaled.digits() > precision as u32 {
			return Err(TypeError::DecimalPrecisionExceeded {
				value: self.to_string(),
				precision,
			});
		}
		Ok(rescaled)
	}

	pub fn negate(&self) -> Triple {
		Triple::new(-self.sign, self.coefficient, self.exponent)
	}

	pub fn checked_add(&self, other: &Triple) -> Result<Triple, TypeError> {
		let sum = self.to_bigdecimal() + other.to_bigdecimal();
		Triple::try_from(&sum)
	}

	/// Divides by an integer count, rounding to [`DIVISION_PRECISION`]
	/// significant digits.
	pub fn divide(&self, divisor: i64) -> Result<Triple, TypeError> {
		if divisor == 0 {
			return Err(TypeError::DecimalOutOfRange {
				value: format!("{} / 0", self),
			});
		}
		let quotient = (self.to_bigdecimal() / BigDecimal::from(divisor)).with_prec(DIVISION_PRECISION);
		Ok(Triple::try_from(&quotient.normalized())?.reduce())
	}

	pub fn to_bigdecimal(&self) -> BigDecimal {
		let magnitude = BigInt::from(self.coefficient);
		let signed = if self.sign < 0 {
			-magnitude
		} else {
			magnitude
		};
		BigDecimal::new(signed, -(self.exponent as i64))
	}

	pub fn to_f64(&self) -> f64 {
		self.to_bigdecimal().to_f64().unwrap_or(f64::NAN)
	}

	fn out_of_range(&self) -> TypeError {
		TypeError::DecimalOutOfRange {
			value: self.to_string(),
		}
	}

	fn precision_lost(&self, scale: i32) -> TypeError {
		TypeError::DecimalPrecisionLost {
			value: self.to_string(),
			scale,
		}
	}
}

pub(crate) fn pow10(exponent: u32) -> Option<u128> {
	10u128.checked_pow(exponent)
}

impl Default for Triple {
	fn default() -> Self {
		Self::zero()
	}
}

impl TryFrom<&BigDecimal> for Triple {
	type Error = TypeError;

	fn try_from(value: &BigDecimal) -> Result<Self, Self::Error> {
		let (digits, scale) = value.as_bigint_and_exponent();
		let out_of_range = || TypeError::DecimalOutOfRange {
			value: value.to_string(),
		};
		let exponent = i32::try_from(-scale).map_err(|_| out_of_range())?;
		let (sign, magnitude) = digits.into_parts();
		let coefficient = magnitude.to_u128().ok_or_else(out_of_range)?;
		let sign = match sign {
			Sign::Minus => -1,
			Sign::NoSign => 0,
			Sign::Plus => 1,
		};
		Ok(Triple::new(sign, coefficient, exponent))
	}
}

impl From<i64> for Triple {
	fn from(value: i64) -> Self {
		Triple::from_i64(value)
	}
}

impl FromStr for Triple {
	type Err = TypeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		if trimmed.is_empty() {
			return Err(TypeError::InvalidDecimalLiteral {
				literal: s.to_string(),
			});
		}
		let parsed = BigDecimal::from_str(trimmed).map_err(|_| TypeError::InvalidDecimalLiteral {
			literal: s.to_string(),
		})?;
		if parsed.is_zero() {
			return Ok(Triple::zero());
		}
		Triple::try_from(&parsed)
	}
}

impl PartialEq for Triple {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Triple {}

impl PartialOrd for Triple {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Triple {
	fn cmp(&self, other: &Self) -> Ordering {
		match self.sign.cmp(&other.sign) {
			Ordering::Equal if self.sign == 0 => Ordering::Equal,
			Ordering::Equal if self.exponent == other.exponent => {
				let magnitude = self.coefficient.cmp(&other.coefficient);
				if self.sign < 0 {
					magnitude.reverse()
				} else {
					magnitude
				}
			}
			Ordering::Equal => self.to_bigdecimal().cmp(&other.to_bigdecimal()),
			unequal => unequal,
		}
	}
}

impl Hash for Triple {
	fn hash<H: Hasher>(&self, state: &mut H) {
		let reduced = self.reduce();
		reduced.sign.hash(state);
		reduced.coefficient.hash(state);
		reduced.exponent.hash(state);
	}
}

impl Display for Triple {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if self.sign < 0 {
			f.write_str("-")?;
		}
		let digits = self.coefficient.to_string();
		if self.exponent >= 0 {
			f.write_str(&digits)?;
			for _ in 0..self.exponent {
				f.write_str("0")?;
			}
			return Ok(());
		}
		let fraction = self.exponent.unsigned_abs() as usize;
		if digits.len() > fraction {
			let (integer, rest) = digits.split_at(digits.len() - fraction);
			write!(f, "{}.{}", integer, rest)
		} else {
			write!(f, "0.{}{}", "0".repeat(fraction - digits.len()), digits)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dec(s: &str) -> Triple {
		s.parse().unwrap()
	}

	mod rescale {
		use super::*;

		#[test]
		fn test_widen() {
			let value = Triple::from_i64(-100).rescale(3).unwrap();
			assert_eq!(value.coefficient(), 100_000);
			assert_eq!(value.exponent(), -3);
			assert_eq!(value.sign(), -1);
		}

		#[test]
		fn test_narrow_exact() {
			let value = dec("1.500").rescale(1).unwrap();
			assert_eq!(value.coefficient(), 15);
			assert_eq!(value.exponent(), -1);
		}

		#[test]
		fn test_narrow_loses_digits() {
			let err = dec("1.25").rescale(1).unwrap_err();
			assert!(matches!(err, TypeError::DecimalPrecisionLost { .. }));
		}

		#[test]
		fn test_overflow() {
			let err = Triple::new(1, u128::MAX, 0).rescale(1).unwrap_err();
			assert!(matches!(err, TypeError::DecimalOutOfRange { .. }));
		}
	}

	#[test]
	fn test_equivalent_triples_are_equal() {
		let a = Triple::new(1, 100, 0);
		let b = Triple::new(1, 10, 1);
		assert_eq!(a, b);
		assert_eq!(a.reduce().coefficient(), 1);
		assert_eq!(a.reduce().exponent(), 2);
	}

	#[test]
	fn test_ordering() {
		let mut values = vec![dec("10"), dec("-0.5"), dec("0"), dec("-100"), dec("0.001")];
		values.sort();
		let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
		assert_eq!(rendered, vec!["-100", "-0.5", "0", "0.001", "10"]);
	}

	#[test]
	fn test_fit_precision() {
		assert!(dec("999.999").fit(6, 3).is_ok());
		let err = dec("1000").fit(6, 3).unwrap_err();
		assert!(matches!(err, TypeError::DecimalPrecisionExceeded { .. }));
	}

	#[test]
	fn test_add_and_divide() {
		let sum = dec("10.5").checked_add(&dec("19.5")).unwrap();
		assert_eq!(sum, dec("30"));
		assert_eq!(sum.divide(2).unwrap(), dec("15"));
		assert_eq!(dec("1").divide(3).unwrap().digits(), DIVISION_PRECISION as u32);
	}

	#[test]
	fn test_display() {
		assert_eq!(Triple::new(-1, 5, -3).to_string(), "-0.005");
		assert_eq!(Triple::new(1, 12345, -2).to_string(), "123.45");
		assert_eq!(Triple::new(1, 12, 2).to_string(), "1200");
		assert_eq!(Triple::zero().to_string(), "0");
	}

	#[test]
	fn test_invalid_literal() {
		assert!(matches!("abc".parse::<Triple>(), Err(TypeError::InvalidDecimalLiteral { .. })));
	}
}
