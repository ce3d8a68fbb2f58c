// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod aggregate;
pub mod config;
mod engine;
pub mod error;
pub mod operator;
pub mod request;
pub mod scan;
pub mod scheduler;
pub mod transaction;
pub mod write;

pub use config::{EngineConfig, SchedulerConfig};
pub use engine::Engine;
pub use error::{AggregateError, TransactionError, WriteError};
pub use operator::{Operator, WriteTask};
pub use request::RequestContext;
pub use scan::{IndexCursor, IndexScan, ScanBound};
pub use scheduler::{Task, TaskResult, TaskScheduler};
pub use transaction::{CommitStatus, PendingCommit, TransactionContext};
