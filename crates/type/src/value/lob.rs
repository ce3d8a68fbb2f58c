// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A large object already registered with the storage engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LobReference {
	pub provider: u64,
	pub object_id: u64,
}

impl LobReference {
	pub const PROVIDER_DATASTORE: u64 = 1;

	pub fn new(provider: u64, object_id: u64) -> Self {
		Self {
			provider,
			object_id,
		}
	}
}

/// A large object that still lives outside the storage engine, named by a
/// channel and a path local to that channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LobLocator {
	pub channel: Option<String>,
	pub path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LobValue {
	Reference(LobReference),
	Locator(LobLocator),
}

impl LobValue {
	pub fn reference(&self) -> Option<LobReference> {
		match self {
			LobValue::Reference(reference) => Some(*reference),
			LobValue::Locator(_) => None,
		}
	}
}

impl From<LobReference> for LobValue {
	fn from(reference: LobReference) -> Self {
		LobValue::Reference(reference)
	}
}

impl Display for LobValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			LobValue::Reference(reference) => {
				write!(f, "lob({}, {})", reference.provider, reference.object_id)
			}
			LobValue::Locator(LobLocator {
				channel: Some(channel),
				path,
			}) => write!(f, "lob({}:{})", channel, path),
			LobValue::Locator(LobLocator {
				channel: None,
				path,
			}) => write!(f, "lob({})", path),
		}
	}
}
