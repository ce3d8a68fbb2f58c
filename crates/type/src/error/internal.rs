// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::{Diagnostic, ErrorCode};

/// Creates an internal error diagnostic carrying the source location of the
/// violated invariant.
pub fn internal_with_context(reason: impl Into<String>, file: &str, line: u32, module_path: &str) -> Diagnostic {
	let file_name = file.rsplit('/').next().unwrap_or(file);
	Diagnostic::new(ErrorCode::Unknown, format!("Internal error: {}", reason.into()))
		.with_supplemental(format!("{}:{} in {}", file_name, line, module_path))
		.with_help("This indicates an internal inconsistency and should never happen in normal operation.")
}

/// Creates an internal error diagnostic with automatic source location capture
#[macro_export]
macro_rules! internal_error {
	($reason:expr) => {
		$crate::error::internal_with_context($reason, file!(), line!(), module_path!())
	};
	($fmt:expr, $($arg:tt)*) => {
		$crate::error::internal_with_context(format!($fmt, $($arg)*), file!(), line!(), module_path!())
	};
}

/// Returns early with an internal error result
#[macro_export]
macro_rules! return_internal_error {
	($reason:expr) => {
		return Err($crate::error::Error(Box::new($crate::internal_error!($reason))))
	};
	($fmt:expr, $($arg:tt)*) => {
		return Err($crate::error::Error(Box::new($crate::internal_error!($fmt, $($arg)*))))
	};
}

#[cfg(test)]
mod tests {
	use crate::error::{ErrorCode, Result};

	#[test]
	fn test_internal_error_location() {
		fn broken() -> Result<()> {
			return_internal_error!("slot {} missing", 3);
		}
		let err = broken().unwrap_err();
		assert_eq!(err.code(), ErrorCode::Unknown);
		assert_eq!(err.diagnostic().message, "Internal error: slot 3 missing");
		assert!(err.diagnostic().supplemental.as_ref().unwrap().starts_with("internal.rs:"));
	}
}
