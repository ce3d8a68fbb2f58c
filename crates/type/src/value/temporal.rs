// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;
pub const NANOS_PER_DAY: u64 = 86_400 * NANOS_PER_SECOND;

/// A calendar date stored as days since 1970-01-01.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Date {
	days_since_epoch: i64,
}

impl Date {
	pub fn from_days(days_since_epoch: i64) -> Self {
		Self {
			days_since_epoch,
		}
	}

	pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
		if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
			return None;
		}
		// civil-from-days inverse, eras of 400 years starting in March
		let y = if month <= 2 {
			year as i64 - 1
		} else {
			year as i64
		};
		let m = if month <= 2 {
			month as i64 + 9
		} else {
			month as i64 - 3
		};
		let era = y.div_euclid(400);
		let yoe = y - era * 400;
		let doy = (153 * m + 2) / 5 + day as i64 - 1;
		let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
		Some(Self::from_days(era * 146_097 + doe - 719_468))
	}

	#[inline]
	pub fn days(&self) -> i64 {
		self.days_since_epoch
	}

	pub fn ymd(&self) -> (i64, u32, u32) {
		let z = self.days_since_epoch + 719_468;
		let era = z.div_euclid(146_097);
		let doe = z - era * 146_097;
		let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
		let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
		let mp = (5 * doy + 2) / 153;
		let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
		let month = if mp < 10 {
			mp + 3
		} else {
			mp - 9
		} as u32;
		let year = yoe + era * 400 + if month <= 2 {
			1
		} else {
			0
		};
		(year, month, day)
	}
}

fn days_in_month(year: i32, month: u32) -> u32 {
	match month {
		1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
		4 | 6 | 9 | 11 => 30,
		2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
		2 => 28,
		_ => 0,
	}
}

impl Display for Date {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let (year, month, day) = self.ymd();
		write!(f, "{:04}-{:02}-{:02}", year, month, day)
	}
}

/// Nanoseconds since midnight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay {
	nanos: u64,
}

impl TimeOfDay {
	pub fn from_nanos(nanos: u64) -> Option<Self> {
		(nanos < NANOS_PER_DAY).then_some(Self {
			nanos,
		})
	}

	pub fn new(hour: u32, minute: u32, second: u32, nanos: u32) -> Option<Self> {
		if hour > 23 || minute > 59 || second > 59 || nanos as u64 >= NANOS_PER_SECOND {
			return None;
		}
		let seconds = hour as u64 * 3600 + minute as u64 * 60 + second as u64;
		Self::from_nanos(seconds * NANOS_PER_SECOND + nanos as u64)
	}

	#[inline]
	pub fn nanos(&self) -> u64 {
		self.nanos
	}
}

impl Display for TimeOfDay {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let seconds = self.nanos / NANOS_PER_SECOND;
		let fraction = self.nanos % NANOS_PER_SECOND;
		write!(f, "{:02}:{:02}:{:02}", seconds / 3600, (seconds / 60) % 60, seconds % 60)?;
		if fraction != 0 {
			write!(f, ".{:09}", fraction)?;
		}
		Ok(())
	}
}

/// An instant as seconds since the epoch plus subsecond nanoseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimePoint {
	seconds: i64,
	nanos: u32,
}

impl TimePoint {
	pub fn new(seconds: i64, nanos: u32) -> Option<Self> {
		((nanos as u64) < NANOS_PER_SECOND).then_some(Self {
			seconds,
			nanos,
		})
	}

	#[inline]
	pub fn seconds(&self) -> i64 {
		self.seconds
	}

	#[inline]
	pub fn nanos(&self) -> u32 {
		self.nanos
	}
}

impl Display for TimePoint {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let date = Date::from_days(self.seconds.div_euclid(86_400));
		let seconds_of_day = self.seconds.rem_euclid(86_400) as u64;
		let time = TimeOfDay {
			nanos: seconds_of_day * NANOS_PER_SECOND + self.nanos as u64,
		};
		write!(f, "{}T{}", date, time)
	}
}

/// A time zone offset in seconds east of UTC.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneOffset(pub i32);

impl ZoneOffset {
	pub fn from_minutes(minutes: i32) -> Self {
		Self(minutes * 60)
	}

	#[inline]
	pub fn seconds(&self) -> i32 {
		self.0
	}
}

impl Display for ZoneOffset {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let sign = if self.0 < 0 {
			'-'
		} else {
			'+'
		};
		let abs = self.0.unsigned_abs();
		write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs / 60) % 60)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_date_round_trip() {
		for (y, m, d) in [(1970, 1, 1), (2000, 2, 29), (1969, 12, 31), (1, 1, 1), (2024, 12, 31)] {
			let date = Date::new(y, m, d).unwrap();
			assert_eq!(date.ymd(), (y as i64, m, d));
		}
		assert_eq!(Date::new(1970, 1, 1).unwrap().days(), 0);
		assert_eq!(Date::new(1969, 12, 31).unwrap().days(), -1);
		assert!(Date::new(2023, 2, 29).is_none());
	}

	#[test]
	fn test_time_of_day() {
		let time = TimeOfDay::new(13, 5, 9, 500).unwrap();
		assert_eq!(time.to_string(), "13:05:09.000000500");
		assert!(TimeOfDay::from_nanos(NANOS_PER_DAY).is_none());
	}

	#[test]
	fn test_time_point_display() {
		let point = TimePoint::new(-1, 0).unwrap();
		assert_eq!(point.to_string(), "1969-12-31T23:59:59");
		assert!(TimePoint::new(0, 1_000_000_000).is_none());
	}

	#[test]
	fn test_zone_offset_display() {
		assert_eq!(ZoneOffset::from_minutes(-330).to_string(), "-05:30");
		assert_eq!(ZoneOffset(3600).to_string(), "+01:00");
	}
}
