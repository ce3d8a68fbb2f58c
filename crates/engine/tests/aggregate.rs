// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Grouped aggregation through pre, shuffle, mid and post.

use tessera_core::RecordBuffer;
use tessera_engine::aggregate::{AggregateCall, AggregateCatalog, AggregateKind, GroupAggregator};
use tessera_memory::MemoryResource;
use tessera_testing::{GroupFixture, arena, test_pool};
use tessera_type::{Kind, Result, Value};

const ALL_KINDS: [AggregateKind; 6] = [
	AggregateKind::CountRows,
	AggregateKind::Count,
	AggregateKind::Sum,
	AggregateKind::Avg,
	AggregateKind::Max,
	AggregateKind::Min,
];

fn call(catalog: &AggregateCatalog, kind: AggregateKind) -> AggregateCall {
	if kind == AggregateKind::CountRows {
		let function = *catalog.resolve("count_rows", &[]).expect("count_rows");
		return AggregateCall::new(function, vec![]);
	}
	let function = *catalog.find(kind, Some(Kind::Int4)).expect("int4 signature");
	AggregateCall::new(function, vec![1])
}

/// `SELECT G, count(*), sum(X), avg(X), max(X), min(X) FROM R GROUP BY G`
fn select(partitions: usize) -> Result<GroupAggregator> {
	let catalog = AggregateCatalog::new();
	let calls = [
		AggregateKind::CountRows,
		AggregateKind::Sum,
		AggregateKind::Avg,
		AggregateKind::Max,
		AggregateKind::Min,
	]
	.map(|kind| call(&catalog, kind));
	GroupAggregator::new(&GroupFixture::new().layout, &[0], &calls, partitions)
}

fn sorted(rows: &[RecordBuffer<'_>]) -> Vec<Vec<Value>> {
	let mut values: Vec<Vec<Value>> = rows.iter().map(|r| r.values()).collect();
	values.sort_by(|l, r| l[0].compare(&r[0]).expect("group keys comparable"));
	values
}

fn expected() -> Vec<Vec<Value>> {
	vec![
		vec![Value::Int4(1), Value::Int8(2), Value::Int4(30), Value::Int4(15), Value::Int4(20), Value::Int4(10)],
		vec![Value::Int4(2), Value::Int8(1), Value::Int4(30), Value::Int4(30), Value::Int4(30), Value::Int4(30)],
	]
}

#[test]
fn test_group_by_single_chunk() -> Result<()> {
	let pool = test_pool();
	let arena = arena(&pool);
	let fixture = GroupFixture::new();
	let rows = select(1)?.run(&[fixture.records(&arena)], &arena)?;
	assert_eq!(sorted(&rows), expected());
	Ok(())
}

#[test]
fn test_group_split_across_workers() -> Result<()> {
	let pool = test_pool();
	let arena = arena(&pool);
	let fixture = GroupFixture::new();
	let records = fixture.records(&arena);
	let chunks = vec![vec![records[0].clone()], vec![records[1].clone(), records[2].clone()]];

	for partitions in [1, 2, 3] {
		let aggregator = select(partitions)?;
		assert_eq!(aggregator.partitions(), partitions);
		let rows = aggregator.run(&chunks, &arena)?;
		assert_eq!(sorted(&rows), expected());
	}
	Ok(())
}

#[test]
fn test_manual_phases_match_run() -> Result<()> {
	let pool = test_pool();
	let arena = arena(&pool);
	let fixture = GroupFixture::new();
	let records = fixture.records(&arena);
	let aggregator = select(2)?;

	let partials = vec![aggregator.pre(&records[..2], &arena)?, aggregator.pre(&records[2..], &arena)?];
	let mut rows = Vec::new();
	for partition in aggregator.shuffle(partials) {
		let merged = aggregator.merge(partition, &arena)?;
		rows.extend(aggregator.finish(&merged, &arena)?);
	}
	assert_eq!(sorted(&rows), expected());
	assert_eq!(aggregator.result_layout().len(), 6);
	Ok(())
}

#[test]
fn test_every_kind_on_empty_input() -> Result<()> {
	let pool = test_pool();
	let arena = arena(&pool);
	let catalog = AggregateCatalog::new();
	let fixture = GroupFixture::empty();
	for kind in ALL_KINDS {
		let aggregator = GroupAggregator::new(&fixture.layout, &[], &[call(&catalog, kind)], 2)?;
		let rows = aggregator.run(&[fixture.records(&arena)], &arena)?;
		assert_eq!(rows.len(), 1, "{kind}");
		let expected = match kind {
			AggregateKind::Count | AggregateKind::CountRows => Value::Int8(0),
			_ => Value::Null,
		};
		assert_eq!(rows[0].values(), vec![expected], "{kind}");
		assert_eq!(aggregator.empty_row(&arena)?.values(), rows[0].values(), "{kind}");
	}
	Ok(())
}

fn chunked<'a>(fixture: &GroupFixture, sizes: &[usize], arena: &'a dyn MemoryResource) -> Vec<Vec<RecordBuffer<'a>>> {
	let mut records = fixture.records(arena).into_iter();
	sizes.iter().map(|size| records.by_ref().take(*size).collect()).collect()
}

#[test]
fn test_any_chunking_gives_same_result() -> Result<()> {
	let pool = test_pool();
	let arena = arena(&pool);
	let catalog = AggregateCatalog::new();
	let fixture = GroupFixture::from_rows(vec![
		(1, Some(5)),
		(2, None),
		(1, Some(-3)),
		(3, Some(7)),
		(2, Some(4)),
		(1, None),
		(3, Some(7)),
		(2, Some(-8)),
	]);
	let calls: Vec<_> = ALL_KINDS.iter().map(|kind| call(&catalog, *kind)).collect();

	let whole = GroupAggregator::new(&fixture.layout, &[0], &calls, 1)?;
	let reference = sorted(&whole.run(&chunked(&fixture, &[8], &arena), &arena)?);
	assert_eq!(reference.len(), 3);

	for (partitions, sizes) in [(2, vec![4, 4]), (3, vec![1, 2, 5]), (4, vec![0, 3, 0, 5]), (2, vec![1; 8])] {
		let aggregator = GroupAggregator::new(&fixture.layout, &[0], &calls, partitions)?;
		let rows = aggregator.run(&chunked(&fixture, &sizes, &arena), &arena)?;
		assert_eq!(sorted(&rows), reference, "chunks {sizes:?}");
	}
	Ok(())
}

#[test]
fn test_null_group_key_forms_its_own_group() -> Result<()> {
	let pool = test_pool();
	let arena = arena(&pool);
	let catalog = AggregateCatalog::new();
	let fixture = GroupFixture::from_rows(vec![(1, Some(1)), (2, Some(2))]);
	let mut records = fixture.records(&arena);
	records[1].set_null(0, true)?;

	let aggregator = GroupAggregator::new(&fixture.layout, &[0], &[call(&catalog, AggregateKind::CountRows)], 2)?;
	let rows = sorted(&aggregator.run(&[records], &arena)?);
	assert_eq!(rows, vec![vec![Value::Null, Value::Int8(1)], vec![Value::Int4(1), Value::Int8(1)]]);
	Ok(())
}
