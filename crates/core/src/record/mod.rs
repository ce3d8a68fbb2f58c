// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod buffer;
mod layout;

pub use buffer::RecordBuffer;
pub use layout::{FieldLayout, RecordLayout, RecordLayoutInner};
