// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::Database;
use tessera_type::{LobValue, Value};
use tracing::debug;

/// Replaces every large object locator in `values` with the reference the
/// store registers for it. Records only hold references.
pub fn resolve_locators<D: Database>(db: &D, values: &mut [Value]) -> tessera_type::Result<()> {
	for value in values.iter_mut() {
		let (Value::Blob(lob) | Value::Clob(lob)) = value else {
			continue;
		};
		if let LobValue::Locator(locator) = lob {
			let reference = db.register_lob(locator)?;
			debug!(path = %locator.path, object_id = reference.object_id, "large object registered");
			*lob = LobValue::Reference(reference);
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use tessera_store::MemoryDatabase;
	use tessera_type::LobLocator;

	use super::*;

	#[test]
	fn test_locators_become_references() {
		let db = MemoryDatabase::default();
		let locator = LobLocator {
			channel: None,
			path: "/tmp/blob.bin".to_string(),
		};
		let mut values = vec![
			Value::Int4(1),
			Value::Blob(LobValue::Locator(locator.clone())),
			Value::Clob(LobValue::Locator(locator.clone())),
			Value::Null,
		];
		resolve_locators(&db, &mut values).unwrap();

		let Value::Blob(blob) = &values[1] else {
			panic!("blob expected");
		};
		let Value::Clob(clob) = &values[2] else {
			panic!("clob expected");
		};
		let (blob, clob) = (blob.reference().unwrap(), clob.reference().unwrap());
		assert_ne!(blob.object_id, clob.object_id);
		assert_eq!(db.lob_locator(blob), Some(locator));
		assert_eq!(values[0], Value::Int4(1));
		assert!(values[3].is_null());
	}
}
