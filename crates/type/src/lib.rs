// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod error;
pub mod util;
pub mod value;

pub use error::{Diagnostic, Error, ErrorClass, ErrorCode, IntoDiagnostic, Result, TypeError};
pub use value::{
	Value,
	decimal::Triple,
	kind::{DecimalOption, FieldOption, FieldType, Kind, Length, VarlenOption},
	lob::{LobLocator, LobReference, LobValue},
	temporal::{Date, TimeOfDay, TimePoint, ZoneOffset},
};
