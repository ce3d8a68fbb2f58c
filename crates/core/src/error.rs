// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_type::{Diagnostic, ErrorCode, IntoDiagnostic, Kind, TypeError};

/// Failures raised while encoding or decoding keys and values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
	#[error("buffer underflow: {required} bytes required, {available} available")]
	BufferUnderflow {
		required: usize,
		available: usize,
	},

	#[error("buffer overflow: {required} bytes required, capacity {capacity}")]
	BufferOverflow {
		required: usize,
		capacity: usize,
	},

	#[error("unrecognized entry type 0x{tag:02X}")]
	UnrecognizedEntry {
		tag: u8,
	},

	#[error("unsupported entry type {entry}")]
	UnsupportedEntry {
		entry: String,
	},

	#[error("value {value} is out of range for a 32-bit integer")]
	IntegerOverflow {
		value: i64,
	},

	#[error("decimal coefficient of {bytes} bytes exceeds the supported window")]
	DecimalOutOfRange {
		bytes: usize,
	},

	#[error("size {size} is out of range")]
	SizeOutOfRange {
		size: u64,
	},

	#[error("{kind} payload contains a NUL byte and cannot be used as a key")]
	InvalidKeyPayload {
		kind: Kind,
	},

	#[error("expected {expected}, found {found}")]
	TypeMismatch {
		expected: String,
		found: String,
	},

	#[error("unexpected null for non-nullable {kind} field")]
	UnexpectedNull {
		kind: Kind,
	},

	#[error(transparent)]
	Type(#[from] TypeError),
}

impl CodecError {
	pub fn unsupported(entry: impl ToString) -> Self {
		CodecError::UnsupportedEntry {
			entry: entry.to_string(),
		}
	}

	pub fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
		CodecError::TypeMismatch {
			expected: expected.to_string(),
			found: found.to_string(),
		}
	}
}

impl IntoDiagnostic for CodecError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			CodecError::BufferUnderflow {
				..
			} => ErrorCode::BufferUnderflow,
			CodecError::BufferOverflow {
				..
			} => ErrorCode::BufferOverflow,
			CodecError::UnrecognizedEntry {
				..
			} => ErrorCode::UnrecognizedEntry,
			CodecError::UnsupportedEntry {
				..
			} => ErrorCode::UnsupportedEntry,
			CodecError::IntegerOverflow {
				..
			} => ErrorCode::IntegerOverflow,
			CodecError::DecimalOutOfRange {
				..
			} => ErrorCode::DecimalOutOfRange,
			CodecError::SizeOutOfRange {
				..
			} => ErrorCode::SizeOutOfRange,
			CodecError::InvalidKeyPayload {
				..
			} => ErrorCode::InvalidKeyPayload,
			CodecError::TypeMismatch {
				..
			} => ErrorCode::InvalidArgument,
			CodecError::UnexpectedNull {
				..
			} => ErrorCode::IntegrityConstraintViolation,
			CodecError::Type(err) => return err.clone().into_diagnostic(),
		};
		Diagnostic::new(code, self.to_string())
	}
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
