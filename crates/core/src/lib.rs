// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod codec;
pub mod datum;
pub mod error;
pub mod index;
pub mod kv;
pub mod mapping;
pub mod record;

pub use codec::{CodingSpec, Order, ReadableStream, WritableStream};
pub use datum::Datum;
pub use error::{CodecError, CodecResult};
pub use index::{Column, ColumnPosition, KeyColumn, PrimaryIndex, SecondaryField, SecondaryIndex, Table};
pub use kv::{
	Database, EndPoint, EndPointKind, PutOption, PutStatus, ScanIterator, ScanRange, StorageHandle, StorageOptions,
	TransactionControl, TransactionOptions, TransactionState, TransactionType,
};
pub use mapping::{FieldInfo, FieldMapping};
pub use record::{FieldLayout, RecordBuffer, RecordLayout};
