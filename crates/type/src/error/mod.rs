// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

mod code;
mod internal;
mod value;

pub use code::{ErrorClass, ErrorCode};
pub use internal::internal_with_context;
pub use value::TypeError;

pub type Result<T> = std::result::Result<T, Error>;

/// User-visible description of a failure: a stable code, a short message and
/// optional engine-internal detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: ErrorCode,
	pub message: String,
	pub supplemental: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
	pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			supplemental: None,
			help: None,
			notes: vec![],
			cause: None,
		}
	}

	pub fn with_supplemental(mut self, supplemental: impl Into<String>) -> Self {
		self.supplemental = Some(supplemental.into());
		self
	}

	pub fn with_help(mut self, help: impl Into<String>) -> Self {
		self.help = Some(help.into());
		self
	}

	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.notes.push(note.into());
		self
	}

	pub fn with_cause(mut self, cause: Diagnostic) -> Self {
		self.cause = Some(Box::new(cause));
		self
	}
}

impl Display for Diagnostic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}] {}", self.code, self.message)?;
		if let Some(supplemental) = &self.supplemental {
			write!(f, " ({})", supplemental)?;
		}
		Ok(())
	}
}

pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
	fn into_diagnostic(self) -> Diagnostic {
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Box<Diagnostic>);

impl Error {
	pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
		Self(Box::new(Diagnostic::new(code, message)))
	}

	#[inline]
	pub fn code(&self) -> ErrorCode {
		self.0.code
	}

	#[inline]
	pub fn class(&self) -> ErrorClass {
		self.0.code.class()
	}

	#[inline]
	pub fn is(&self, code: ErrorCode) -> bool {
		self.0.code == code
	}

	pub fn diagnostic(&self) -> &Diagnostic {
		&self.0
	}

	pub fn into_diagnostic(self) -> Diagnostic {
		*self.0
	}

	pub fn with_supplemental(mut self, supplemental: impl Into<String>) -> Self {
		self.0.supplemental = Some(supplemental.into());
		self
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl std::error::Error for Error {}

impl<T: IntoDiagnostic> From<T> for Error {
	fn from(err: T) -> Self {
		Error(Box::new(err.into_diagnostic()))
	}
}

/// Builds an [`Error`] with the given code and a formatted message.
#[macro_export]
macro_rules! error {
	($code:expr, $($arg:tt)*) => {
		$crate::error::Error::new($code, format!($($arg)*))
	};
}

/// Returns early with an [`Error`] carrying the given code.
#[macro_export]
macro_rules! return_error {
	($code:expr, $($arg:tt)*) => {
		return Err($crate::error!($code, $($arg)*))
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_includes_code_and_supplemental() {
		let err = Error::new(ErrorCode::NotFound, "key not found").with_supplemental("storage=T");
		assert_eq!(err.to_string(), "[INPUT_002] key not found (storage=T)");
	}

	#[test]
	fn test_from_diagnostic() {
		let err: Error = Diagnostic::new(ErrorCode::Io, "disk gone").with_note("retry later").into();
		assert!(err.is(ErrorCode::Io));
		assert_eq!(err.diagnostic().notes, vec!["retry later".to_string()]);
	}

	#[test]
	fn test_error_macro() {
		fn fails() -> Result<()> {
			return_error!(ErrorCode::InvalidArgument, "bad value {}", 42);
		}
		let err = fails().unwrap_err();
		assert_eq!(err.code(), ErrorCode::InvalidArgument);
		assert_eq!(err.diagnostic().message, "bad value 42");
	}

	#[test]
	fn test_diagnostic_serializes() {
		let diagnostic = Diagnostic::new(ErrorCode::OutOfMemory, "page exhausted");
		let json = serde_json::to_string(&diagnostic).unwrap();
		let back: Diagnostic = serde_json::from_str(&json).unwrap();
		assert_eq!(back, diagnostic);
	}
}
