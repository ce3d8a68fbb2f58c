// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::kv::TransactionId;
use tessera_type::{Diagnostic, ErrorCode, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
	#[error("storage {name} already exists")]
	StorageAlreadyExists {
		name: String,
	},

	#[error("storage {name} not found")]
	StorageNotFound {
		name: String,
	},

	#[error("transaction {id} conflicts with a concurrent commit")]
	SerializationFailure {
		id: TransactionId,
	},

	#[error("transaction {id} writes storage {storage} preserved by long transaction {owner}")]
	ConflictOnWritePreserve {
		id: TransactionId,
		storage: String,
		owner: TransactionId,
	},

	#[error("transaction {id} did not declare a write preserve on {storage}")]
	WriteWithoutWritePreserve {
		id: TransactionId,
		storage: String,
	},

	#[error("transaction {id} is read only")]
	WriteByReadOnly {
		id: TransactionId,
	},

	#[error("transaction {id} is no longer active")]
	InactiveTransaction {
		id: TransactionId,
	},

	#[error("transaction {id} reads storage {storage} outside its read area")]
	ReadAreaViolation {
		id: TransactionId,
		storage: String,
	},

	#[error("invalid transaction options: {reason}")]
	InvalidOptions {
		reason: String,
	},

	#[error("sequence {id} not found")]
	SequenceNotFound {
		id: u64,
	},

	#[error("large object {id} not registered")]
	LobNotFound {
		id: u64,
	},

	#[error("database is closed")]
	Closed,
}

impl IntoDiagnostic for StoreError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			StoreError::StorageAlreadyExists {
				..
			} => ErrorCode::AlreadyExists,
			StoreError::StorageNotFound {
				..
			}
			| StoreError::SequenceNotFound {
				..
			}
			| StoreError::LobNotFound {
				..
			} => ErrorCode::NotFound,
			StoreError::SerializationFailure {
				..
			} => ErrorCode::SerializationFailure,
			StoreError::ConflictOnWritePreserve {
				..
			} => ErrorCode::ConflictOnWritePreserve,
			StoreError::WriteWithoutWritePreserve {
				..
			} => ErrorCode::WriteWithoutWritePreserve,
			StoreError::WriteByReadOnly {
				..
			} => ErrorCode::WriteOperationByReadOnlyTransaction,
			StoreError::InactiveTransaction {
				..
			} => ErrorCode::InactiveTransaction,
			StoreError::ReadAreaViolation {
				..
			} => ErrorCode::ReadAreaViolation,
			StoreError::InvalidOptions {
				..
			} => ErrorCode::InvalidArgument,
			StoreError::Closed => ErrorCode::Io,
		};
		let diagnostic = Diagnostic::new(code, self.to_string());
		if code.is_retryable() {
			diagnostic.with_help("retry the transaction")
		} else {
			diagnostic
		}
	}
}
