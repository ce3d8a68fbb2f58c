// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::kv::TransactionId;
use tessera_type::{Diagnostic, ErrorCode, IntoDiagnostic, Kind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WriteError {
	#[error("null value for non-nullable column {column} of {storage}")]
	NotNullViolation {
		storage: String,
		column: usize,
	},

	#[error("duplicate key in {storage}")]
	UniqueViolation {
		storage: String,
		key_hex: String,
	},

	#[error("row not found in {storage}")]
	RowNotFound {
		storage: String,
		key_hex: String,
	},

	#[error("secondary entry of {storage} refers to a missing primary row")]
	DanglingSecondary {
		storage: String,
		key_hex: String,
	},

	#[error("host variable {index} is not bound")]
	MissingHostVariable {
		index: usize,
	},

	#[error("column {column} is not part of table {table}")]
	UnknownColumn {
		table: String,
		column: usize,
	},

	#[error("request cancelled")]
	Cancelled,
}

impl IntoDiagnostic for WriteError {
	fn into_diagnostic(self) -> Diagnostic {
		let (code, supplemental) = match &self {
			WriteError::NotNullViolation {
				..
			} => (ErrorCode::IntegrityConstraintViolation, None),
			WriteError::UniqueViolation {
				key_hex,
				..
			} => (ErrorCode::UniqueConstraintViolation, Some(format!("key={key_hex}"))),
			WriteError::RowNotFound {
				key_hex,
				..
			} => (ErrorCode::NotFound, Some(format!("key={key_hex}"))),
			WriteError::DanglingSecondary {
				key_hex,
				..
			} => (ErrorCode::Unknown, Some(format!("primary key={key_hex}"))),
			WriteError::MissingHostVariable {
				..
			}
			| WriteError::UnknownColumn {
				..
			} => (ErrorCode::InvalidArgument, None),
			WriteError::Cancelled => (ErrorCode::Cancelled, None),
		};
		let diagnostic = Diagnostic::new(code, self.to_string());
		match supplemental {
			Some(text) => diagnostic.with_supplemental(text),
			None => diagnostic,
		}
	}
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
	#[error("unknown aggregate function id {id}")]
	UnknownFunction {
		id: u32,
	},

	#[error("aggregate {name} does not accept {kind} arguments")]
	UnsupportedArgument {
		name: &'static str,
		kind: Kind,
	},

	#[error("aggregate {name} expects {expected} arguments, got {actual}")]
	ArgumentCount {
		name: &'static str,
		expected: usize,
		actual: usize,
	},

	#[error("{operation} is undefined for {kind}")]
	Arithmetic {
		operation: &'static str,
		kind: Kind,
	},
}

impl IntoDiagnostic for AggregateError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			AggregateError::UnknownFunction {
				..
			} => ErrorCode::NotFound,
			AggregateError::UnsupportedArgument {
				..
			}
			| AggregateError::ArgumentCount {
				..
			} => ErrorCode::InvalidArgument,
			AggregateError::Arithmetic {
				..
			} => ErrorCode::NotImplemented,
		};
		Diagnostic::new(code, self.to_string())
	}
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransactionError {
	#[error("transaction {id} is no longer active")]
	Inactive {
		id: TransactionId,
	},

	#[error("invalid transaction options: {reason}")]
	InvalidOptions {
		reason: String,
	},

	#[error("transaction {id} commit was not reported")]
	CommitLost {
		id: TransactionId,
	},
}

impl IntoDiagnostic for TransactionError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			TransactionError::Inactive {
				..
			} => ErrorCode::InactiveTransaction,
			TransactionError::InvalidOptions {
				..
			} => ErrorCode::InvalidArgument,
			TransactionError::CommitLost {
				..
			} => ErrorCode::Unknown,
		};
		Diagnostic::new(code, self.to_string())
	}
}

#[cfg(test)]
mod tests {
	use tessera_type::{Error, ErrorClass};

	use super::*;

	#[test]
	fn test_unique_violation_is_integrity() {
		let err: Error = WriteError::UniqueViolation {
			storage: "T".to_string(),
			key_hex: "8000000001".to_string(),
		}
		.into();
		assert_eq!(err.code(), ErrorCode::UniqueConstraintViolation);
		assert_eq!(err.class(), ErrorClass::Integrity);
		assert_eq!(err.diagnostic().supplemental.as_deref(), Some("key=8000000001"));
	}

	#[test]
	fn test_inactive_is_lifecycle() {
		let err: Error = TransactionError::Inactive {
			id: 7,
		}
		.into();
		assert_eq!(err.class(), ErrorClass::TransactionLifecycle);
		assert!(!err.code().is_retryable());
	}
}
