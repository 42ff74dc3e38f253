// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Engine-visible handles and their side-table ids.
//!
//! One logical table (or cursor) has two views: the header fields the
//! engine tracks (error slot, lifecycle state) and the strongly-typed
//! implementation object. Both live in one tagged wrapper owned by the
//! connection's side-table, so no struct-layout aliasing is involved and
//! a stale id can never reach a released object.

use std::{
	fmt::{self, Display, Formatter},
	sync::Arc,
};

use tablekit_sdk::{
	context::ModuleContext,
	module::{Instantiation, InstantiationKind, VirtualCursor, VirtualTable},
};

use crate::dispatch::DispatchTable;

/// Id of a live table handle within one connection. Ids are monotonically
/// increasing and never reused, so an id that outlives its handle is
/// detected instead of aliasing a newer table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableId(pub(crate) u64);

impl Display for TableId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "table#{}", self.0)
	}
}

/// Id of a live cursor handle within one connection. Same non-reuse
/// guarantee as [`TableId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CursorId(pub(crate) u64);

impl Display for CursorId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "cursor#{}", self.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableState {
	Connected,
	Disconnected,
	Destroyed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
	/// Created but not yet positioned on a row.
	Open,
	/// A filter has run; the cursor is on a row or at end-of-data.
	Positioned,
	Closed,
}

/// One instantiated virtual table bound to a schema name.
///
/// Owns the implementation object for its whole lifetime and releases it
/// exactly once, in disconnect or destroy.
pub struct TableHandle {
	pub(crate) module: String,
	pub(crate) declaration: String,
	pub(crate) error: Option<String>,
	pub(crate) state: TableState,
	/// Whether the table was created (schema-defining) rather than merely
	/// connected; destroy is only reachable when set.
	pub(crate) created: bool,
	pub(crate) table: Option<Box<dyn VirtualTable>>,
	pub(crate) context: Arc<ModuleContext>,
	pub(crate) dispatch: &'static DispatchTable,
	pub(crate) open_cursors: usize,
}

impl TableHandle {
	pub(crate) fn new(
		module: &str,
		instantiation: Instantiation,
		context: Arc<ModuleContext>,
		dispatch: &'static DispatchTable,
		kind: InstantiationKind,
	) -> Self {
		Self {
			module: module.to_string(),
			declaration: instantiation.declaration,
			error: None,
			state: TableState::Connected,
			created: kind == InstantiationKind::Create,
			table: Some(instantiation.table),
			context,
			dispatch,
			open_cursors: 0,
		}
	}

	/// Name of the module this table was instantiated from.
	pub fn module(&self) -> &str {
		&self.module
	}

	/// Schema declaration the factory produced.
	pub fn declaration(&self) -> &str {
		&self.declaration
	}

	/// The message attached by the most recent failing operation, if any.
	pub fn last_error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn state(&self) -> TableState {
		self.state
	}

	/// Shared module context this table was instantiated with.
	pub fn context(&self) -> &Arc<ModuleContext> {
		&self.context
	}
}

/// One open iteration over a table.
///
/// Holds a non-owning back-reference to the owning table's id; the
/// connection guarantees the referenced handle outlives the cursor.
pub struct CursorHandle {
	pub(crate) table: TableId,
	pub(crate) state: CursorState,
	pub(crate) cursor: Option<Box<dyn VirtualCursor>>,
}

impl CursorHandle {
	pub(crate) fn new(table: TableId, cursor: Box<dyn VirtualCursor>) -> Self {
		Self {
			table,
			state: CursorState::Open,
			cursor: Some(cursor),
		}
	}

	/// Id of the owning table handle.
	pub fn table(&self) -> TableId {
		self.table
	}

	pub fn state(&self) -> CursorState {
		self.state
	}
}

/// Attach `message` to a table handle's error slot, replacing whatever was
/// there. Tolerates a missing handle: some failure paths occur before a
/// handle exists, and those must not fault.
pub fn set_table_error(handle: Option<&mut TableHandle>, message: impl Into<String>) {
	if let Some(handle) = handle {
		handle.error = Some(message.into());
	}
}
