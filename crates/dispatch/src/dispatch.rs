// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! The versioned dispatch table.
//!
//! A fixed set of entry points the engine drives a virtual table through.
//! Each slot is a plain `fn` that unwraps the engine-level handle, invokes
//! the corresponding capability method and folds the result back into the
//! status-plus-error-slot channel. Slots never reinterpret a status code a
//! capability returns; they forward it unchanged.

use tablekit_sdk::{
	ModuleError,
	module::{Instantiation, InstantiationKind, VirtualCursor},
	plan::{IndexPlan, PlanRequest, PlanTag},
	sink::ValueSink,
	status::{STATUS_MISUSE, STATUS_OK},
};
use tablekit_type::{RowId, Value};
use tracing::debug;

use crate::{
	handle::{CursorHandle, CursorState, TableHandle, TableState, set_table_error},
	registry::RegisteredModule,
};

/// Dispatch-table version this host implements: create/connect through
/// rowid-read. No transactional hooks, no rename, no savepoints.
pub const DISPATCH_VERSION: u32 = 1;

pub type CreateOrConnectFn =
	fn(&RegisteredModule, &[String], InstantiationKind) -> (i32, Option<Instantiation>, Option<String>);
pub type PlanIndexFn = fn(&mut TableHandle, &PlanRequest, &mut IndexPlan) -> i32;
pub type ReleaseTableFn = fn(&mut TableHandle) -> i32;
pub type OpenFn = fn(&mut TableHandle) -> (i32, Option<Box<dyn VirtualCursor>>);
pub type CloseFn = fn(&mut TableHandle, &mut CursorHandle) -> i32;
pub type FilterFn = fn(&mut TableHandle, &mut CursorHandle, &PlanTag, &[Value]) -> i32;
pub type AdvanceFn = fn(&mut TableHandle, &mut CursorHandle) -> i32;
pub type AtEndFn = fn(&CursorHandle) -> bool;
pub type ReadColumnFn = fn(&mut TableHandle, &mut CursorHandle, &mut ValueSink, usize) -> i32;
pub type ReadRowIdFn = fn(&mut TableHandle, &mut CursorHandle, &mut RowId) -> i32;

/// The fixed, versioned set of entry points bound to every module
/// registration. The registry rejects a table whose version the host does
/// not support.
#[derive(Clone, Copy)]
pub struct DispatchTable {
	pub version: u32,
	pub create_or_connect: CreateOrConnectFn,
	pub plan_index: PlanIndexFn,
	pub disconnect: ReleaseTableFn,
	pub destroy: ReleaseTableFn,
	pub open: OpenFn,
	pub close: CloseFn,
	pub filter: FilterFn,
	pub advance: AdvanceFn,
	pub at_end: AtEndFn,
	pub read_column: ReadColumnFn,
	pub read_rowid: ReadRowIdFn,
}

/// Version-1 dispatch table.
pub static DISPATCH_V1: DispatchTable = DispatchTable {
	version: DISPATCH_VERSION,
	create_or_connect,
	plan_index,
	disconnect,
	destroy,
	open,
	close,
	filter,
	advance,
	at_end,
	read_column,
	read_rowid,
};

/// Store a capability failure into the handle's error slot and hand the
/// status code back unchanged.
fn fail(handle: &mut TableHandle, err: ModuleError) -> i32 {
	let status = err.status;
	set_table_error(Some(handle), err.message);
	status
}

/// A call arrived on a handle whose implementation object was already
/// released. The engine contract promises this never happens; answer with
/// a misuse status instead of crashing.
fn stale(handle: &mut TableHandle) -> i32 {
	set_table_error(Some(handle), "table handle already released");
	STATUS_MISUSE
}

fn create_or_connect(
	entry: &RegisteredModule,
	args: &[String],
	kind: InstantiationKind,
) -> (i32, Option<Instantiation>, Option<String>) {
	match entry.module().create_or_connect(entry.context(), args, kind) {
		Ok(instantiation) => (STATUS_OK, Some(instantiation), None),
		Err(err) => {
			debug!(module = entry.name(), ?kind, status = err.status, "instantiation failed");
			(err.status, None, Some(err.message))
		}
	}
}

fn plan_index(handle: &mut TableHandle, request: &PlanRequest, plan: &mut IndexPlan) -> i32 {
	let Some(table) = handle.table.as_ref() else {
		return stale(handle);
	};
	match table.plan_index(request, plan) {
		Ok(()) => STATUS_OK,
		Err(err) => fail(handle, err),
	}
}

fn disconnect(handle: &mut TableHandle) -> i32 {
	let Some(table) = handle.table.take() else {
		return stale(handle);
	};
	handle.state = TableState::Disconnected;
	match table.disconnect() {
		Ok(()) => STATUS_OK,
		Err(err) => fail(handle, err),
	}
}

fn destroy(handle: &mut TableHandle) -> i32 {
	if !handle.created {
		set_table_error(Some(handle), "table was connected, not created; destroy is unreachable");
		return STATUS_MISUSE;
	}
	let Some(table) = handle.table.take() else {
		return stale(handle);
	};
	handle.state = TableState::Destroyed;
	match table.destroy() {
		Ok(()) => STATUS_OK,
		Err(err) => fail(handle, err),
	}
}

fn open(handle: &mut TableHandle) -> (i32, Option<Box<dyn VirtualCursor>>) {
	let Some(table) = handle.table.as_ref() else {
		return (stale(handle), None);
	};
	match table.open() {
		Ok(cursor) => (STATUS_OK, Some(cursor)),
		Err(err) => (fail(handle, err), None),
	}
}

fn close(handle: &mut TableHandle, cursor: &mut CursorHandle) -> i32 {
	let Some(inner) = cursor.cursor.take() else {
		return stale(handle);
	};
	cursor.state = CursorState::Closed;
	match inner.close() {
		Ok(()) => STATUS_OK,
		Err(err) => fail(handle, err),
	}
}

fn filter(handle: &mut TableHandle, cursor: &mut CursorHandle, tag: &PlanTag, args: &[Value]) -> i32 {
	let Some(inner) = cursor.cursor.as_mut() else {
		return stale(handle);
	};
	match inner.filter(tag, args) {
		Ok(()) => {
			cursor.state = CursorState::Positioned;
			STATUS_OK
		}
		Err(err) => fail(handle, err),
	}
}

fn advance(handle: &mut TableHandle, cursor: &mut CursorHandle) -> i32 {
	let Some(inner) = cursor.cursor.as_mut() else {
		return stale(handle);
	};
	match inner.advance() {
		Ok(()) => STATUS_OK,
		Err(err) => fail(handle, err),
	}
}

fn at_end(cursor: &CursorHandle) -> bool {
	// A released cursor has no current row.
	cursor.cursor.as_ref().map(|c| c.at_end()).unwrap_or(true)
}

fn read_column(handle: &mut TableHandle, cursor: &mut CursorHandle, sink: &mut ValueSink, column: usize) -> i32 {
	let Some(inner) = cursor.cursor.as_ref() else {
		return stale(handle);
	};
	match inner.read_column(sink, column) {
		Ok(()) => STATUS_OK,
		Err(err) => fail(handle, err),
	}
}

fn read_rowid(handle: &mut TableHandle, cursor: &mut CursorHandle, out: &mut RowId) -> i32 {
	let Some(inner) = cursor.cursor.as_ref() else {
		return stale(handle);
	};
	match inner.row_id() {
		Ok(id) => {
			*out = id;
			STATUS_OK
		}
		Err(err) => fail(handle, err),
	}
}
