// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Coarse classification of every [`ErrorCode`]. The class decides how a
/// failure propagates: whether the row, the statement or the transaction is
/// affected, and whether a retry can help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
	InvalidInput,
	Integrity,
	Concurrency,
	TransactionLifecycle,
	Encoding,
	Resource,
	Unexpected,
}

impl Display for ErrorClass {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorClass::InvalidInput => f.write_str("invalid input"),
			ErrorClass::Integrity => f.write_str("integrity"),
			ErrorClass::Concurrency => f.write_str("concurrency"),
			ErrorClass::TransactionLifecycle => f.write_str("transaction lifecycle"),
			ErrorClass::Encoding => f.write_str("encoding"),
			ErrorClass::Resource => f.write_str("resource"),
			ErrorClass::Unexpected => f.write_str("unexpected"),
		}
	}
}

/// The closed set of user-visible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
	// invalid input
	InvalidArgument,
	NotFound,
	TargetNotFound,
	MismatchedKeyLength,

	// integrity
	AlreadyExists,
	IntegrityConstraintViolation,
	UniqueConstraintViolation,

	// concurrency
	SerializationFailure,
	ConflictOnWritePreserve,
	BlockedByConcurrentOperation,
	RetryableAbort,
	ReadAreaViolation,

	// transaction lifecycle
	InactiveTransaction,
	WriteOperationByReadOnlyTransaction,
	WriteWithoutWritePreserve,
	TransactionAborted,

	// encoding
	BufferUnderflow,
	BufferOverflow,
	UnrecognizedEntry,
	UnsupportedEntry,
	IntegerOverflow,
	DecimalOutOfRange,
	SizeOutOfRange,
	ValueTooLong,
	PrecisionLost,
	InvalidKeyPayload,

	// resource
	ResourceLimitReached,
	InvalidKeyLength,
	OutOfMemory,

	// unexpected
	Unknown,
	Io,
	NotImplemented,
	Cancelled,
}

impl ErrorCode {
	pub fn class(&self) -> ErrorClass {
		match self {
			ErrorCode::InvalidArgument
			| ErrorCode::NotFound
			| ErrorCode::TargetNotFound
			| ErrorCode::MismatchedKeyLength => ErrorClass::InvalidInput,

			ErrorCode::AlreadyExists
			| ErrorCode::IntegrityConstraintViolation
			| ErrorCode::UniqueConstraintViolation => ErrorClass::Integrity,

			ErrorCode::SerializationFailure
			| ErrorCode::ConflictOnWritePreserve
			| ErrorCode::BlockedByConcurrentOperation
			| ErrorCode::RetryableAbort
			| ErrorCode::ReadAreaViolation => ErrorClass::Concurrency,

			ErrorCode::InactiveTransaction
			| ErrorCode::WriteOperationByReadOnlyTransaction
			| ErrorCode::WriteWithoutWritePreserve
			| ErrorCode::TransactionAborted => ErrorClass::TransactionLifecycle,

			ErrorCode::BufferUnderflow
			| ErrorCode::BufferOverflow
			| ErrorCode::UnrecognizedEntry
			| ErrorCode::UnsupportedEntry
			| ErrorCode::IntegerOverflow
			| ErrorCode::DecimalOutOfRange
			| ErrorCode::SizeOutOfRange
			| ErrorCode::ValueTooLong
			| ErrorCode::PrecisionLost
			| ErrorCode::InvalidKeyPayload => ErrorClass::Encoding,

			ErrorCode::ResourceLimitReached | ErrorCode::InvalidKeyLength | ErrorCode::OutOfMemory => {
				ErrorClass::Resource
			}

			ErrorCode::Unknown | ErrorCode::Io | ErrorCode::NotImplemented | ErrorCode::Cancelled => {
				ErrorClass::Unexpected
			}
		}
	}

	/// Whether re-running the whole transaction may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			ErrorCode::SerializationFailure
				| ErrorCode::ConflictOnWritePreserve
				| ErrorCode::BlockedByConcurrentOperation
				| ErrorCode::RetryableAbort
		)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorCode::InvalidArgument => "INPUT_001",
			ErrorCode::NotFound => "INPUT_002",
			ErrorCode::TargetNotFound => "INPUT_003",
			ErrorCode::MismatchedKeyLength => "INPUT_004",

			ErrorCode::AlreadyExists => "INTEGRITY_001",
			ErrorCode::IntegrityConstraintViolation => "INTEGRITY_002",
			ErrorCode::UniqueConstraintViolation => "INTEGRITY_003",

			ErrorCode::SerializationFailure => "CONCURRENCY_001",
			ErrorCode::ConflictOnWritePreserve => "CONCURRENCY_002",
			ErrorCode::BlockedByConcurrentOperation => "CONCURRENCY_003",
			ErrorCode::RetryableAbort => "CONCURRENCY_004",
			ErrorCode::ReadAreaViolation => "CONCURRENCY_005",

			ErrorCode::InactiveTransaction => "TX_001",
			ErrorCode::WriteOperationByReadOnlyTransaction => "TX_002",
			ErrorCode::WriteWithoutWritePreserve => "TX_003",
			ErrorCode::TransactionAborted => "TX_004",

			ErrorCode::BufferUnderflow => "ENCODING_001",
			ErrorCode::BufferOverflow => "ENCODING_002",
			ErrorCode::UnrecognizedEntry => "ENCODING_003",
			ErrorCode::UnsupportedEntry => "ENCODING_004",
			ErrorCode::IntegerOverflow => "ENCODING_005",
			ErrorCode::DecimalOutOfRange => "ENCODING_006",
			ErrorCode::SizeOutOfRange => "ENCODING_007",
			ErrorCode::ValueTooLong => "ENCODING_008",
			ErrorCode::PrecisionLost => "ENCODING_009",
			ErrorCode::InvalidKeyPayload => "ENCODING_010",

			ErrorCode::ResourceLimitReached => "RESOURCE_001",
			ErrorCode::InvalidKeyLength => "RESOURCE_002",
			ErrorCode::OutOfMemory => "RESOURCE_003",

			ErrorCode::Unknown => "INTERNAL_001",
			ErrorCode::Io => "INTERNAL_002",
			ErrorCode::NotImplemented => "INTERNAL_003",
			ErrorCode::Cancelled => "INTERNAL_004",
		}
	}
}

impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retryable_codes_are_concurrency() {
		for code in [
			ErrorCode::SerializationFailure,
			ErrorCode::ConflictOnWritePreserve,
			ErrorCode::BlockedByConcurrentOperation,
			ErrorCode::RetryableAbort,
		] {
			assert!(code.is_retryable());
			assert_eq!(code.class(), ErrorClass::Concurrency);
		}
		assert!(!ErrorCode::ReadAreaViolation.is_retryable());
	}

	#[test]
	fn test_classes() {
		assert_eq!(ErrorCode::NotFound.class(), ErrorClass::InvalidInput);
		assert_eq!(ErrorCode::IntegrityConstraintViolation.class(), ErrorClass::Integrity);
		assert_eq!(ErrorCode::InactiveTransaction.class(), ErrorClass::TransactionLifecycle);
		assert_eq!(ErrorCode::BufferUnderflow.class(), ErrorClass::Encoding);
		assert_eq!(ErrorCode::OutOfMemory.class(), ErrorClass::Resource);
		assert_eq!(ErrorCode::NotImplemented.class(), ErrorClass::Unexpected);
	}

	#[test]
	fn test_codes_display() {
		assert_eq!(ErrorCode::UniqueConstraintViolation.to_string(), "INTEGRITY_003");
		assert_eq!(ErrorCode::Cancelled.to_string(), "INTERNAL_004");
	}
}
