// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod context;
mod insert;
mod lob;
mod partial;
mod primary;
mod secondary;

pub use context::WriteContext;
pub(crate) use context::encode_growing;
pub use insert::{InsertKind, WriteCreate};
pub use lob::resolve_locators;
pub use partial::{RowStage, UpdateColumn, UpdateSource, WritePartial};
pub use primary::WritePrimaryTarget;
pub use secondary::WriteSecondaryTarget;

/// Outcome of a write target operation that is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
	Ok,
	NotFound,
	AlreadyExists,
}
