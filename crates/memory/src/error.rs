// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_type::{Diagnostic, ErrorCode, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MemoryError {
	#[error("allocation of {requested} bytes exceeds the page size {page_size}")]
	AllocationTooLarge {
		requested: usize,
		page_size: usize,
	},

	#[error("the operating system refused a mapping of {size} bytes (errno {errno})")]
	MapFailed {
		size: usize,
		errno: i32,
	},

	#[error("alignment {alignment} is not a power of two")]
	InvalidAlignment {
		alignment: usize,
	},

	#[error("block size {block_size} must be at least 16 and divide the page size {page_size}")]
	InvalidBlockSize {
		block_size: usize,
		page_size: usize,
	},
}

impl IntoDiagnostic for MemoryError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			MemoryError::AllocationTooLarge {
				..
			}
			| MemoryError::MapFailed {
				..
			} => ErrorCode::OutOfMemory,
			MemoryError::InvalidAlignment {
				..
			}
			| MemoryError::InvalidBlockSize {
				..
			} => ErrorCode::InvalidArgument,
		};
		let diagnostic = Diagnostic::new(code, self.to_string());
		match self {
			MemoryError::MapFailed {
				..
			} => diagnostic.with_help("check the memory limits of the process"),
			_ => diagnostic,
		}
	}
}
