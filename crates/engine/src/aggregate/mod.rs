// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod aggregator;
mod catalog;
mod group;

pub use aggregator::{Aggregator, AggregatorInfo, EmptyValue};
pub use catalog::{AggregateCatalog, AggregateFunction, AggregateKind, FUNCTION_ID_BASE};
pub use group::{AggregateCall, GroupAggregator, GroupState};
