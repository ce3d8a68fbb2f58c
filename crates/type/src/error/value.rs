// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::{Diagnostic, ErrorCode, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
	#[error("decimal value {value} does not fit the supported coefficient range")]
	DecimalOutOfRange {
		value: String,
	},

	#[error("decimal value {value} exceeds precision {precision}")]
	DecimalPrecisionExceeded {
		value: String,
		precision: u8,
	},

	#[error("decimal value {value} cannot be represented with scale {scale} without losing digits")]
	DecimalPrecisionLost {
		value: String,
		scale: i32,
	},

	#[error("invalid decimal literal '{literal}'")]
	InvalidDecimalLiteral {
		literal: String,
	},

	#[error("character data is not valid UTF-8")]
	InvalidCharacterData,

	#[error("{length} bytes exceed the declared length {declared}")]
	ValueTooLong {
		length: usize,
		declared: u32,
	},
}

impl IntoDiagnostic for TypeError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			TypeError::DecimalOutOfRange {
				..
			}
			| TypeError::DecimalPrecisionExceeded {
				..
			} => ErrorCode::DecimalOutOfRange,
			TypeError::DecimalPrecisionLost {
				..
			} => ErrorCode::PrecisionLost,
			TypeError::InvalidDecimalLiteral {
				..
			} => ErrorCode::InvalidArgument,
			TypeError::InvalidCharacterData => ErrorCode::UnrecognizedEntry,
			TypeError::ValueTooLong {
				..
			} => ErrorCode::ValueTooLong,
		};
		Diagnostic::new(code, self.to_string())
	}
}
