// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! The capability set a pluggable table implementation provides.

use std::sync::Arc;

use tablekit_type::{RowId, Value};

use crate::{
	Result,
	context::ModuleContext,
	plan::{IndexPlan, PlanRequest, PlanTag},
	sink::ValueSink,
};

/// Whether a factory invocation defines new schema or re-attaches to
/// schema that already exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstantiationKind {
	/// The table is being defined for the first time; `destroy` becomes
	/// reachable for the resulting instance.
	Create,
	/// The table already exists in the catalog and is being re-attached.
	Connect,
}

/// Result of a successful factory invocation.
pub struct Instantiation {
	pub table: Box<dyn VirtualTable>,
	/// Schema declaration the engine records for the table, e.g.
	/// `CREATE TABLE x(a,b)`.
	pub declaration: String,
}

/// A named virtual-table kind.
///
/// One factory serves both create and connect, disambiguated by
/// [`InstantiationKind`]; both paths must produce an equally valid table.
pub trait TableModule: Send + Sync + 'static {
	/// Instantiate a table of this kind.
	///
	/// `args` are the declaration arguments from the schema statement:
	/// module name, catalog name, table name, then any module-specific
	/// arguments, in that order.
	fn create_or_connect(
		&self,
		context: &Arc<ModuleContext>,
		args: &[String],
		kind: InstantiationKind,
	) -> Result<Instantiation>;
}

/// One instantiated virtual table.
///
/// Cursors opened from the same table may be interleaved by the engine, so
/// whatever state `open` shares into its cursors must tolerate concurrent
/// read access.
pub trait VirtualTable: Send {
	/// Answer a planning request by refining `plan` in place. Fields left
	/// untouched keep the engine-provided defaults.
	fn plan_index(&self, request: &PlanRequest, plan: &mut IndexPlan) -> Result<()>;

	/// Open a new cursor over this table's rows.
	fn open(&self) -> Result<Box<dyn VirtualCursor>>;

	/// Release the in-memory binding. Consumes the table; the dispatch
	/// layer calls this exactly once.
	fn disconnect(self: Box<Self>) -> Result<()>;

	/// Release the in-memory binding and discard any persistent backing
	/// state. Only reachable for tables that were created, not merely
	/// connected. Defaults to `disconnect` for implementations without
	/// persistent state.
	fn destroy(self: Box<Self>) -> Result<()> {
		self.disconnect()
	}
}

/// One open iteration over a virtual table.
///
/// Calls arrive strictly in the order `filter` then any number of
/// `advance`/`at_end`/`read_column`/`row_id`, with no concurrent calls on
/// the same cursor.
pub trait VirtualCursor: Send {
	/// Reposition the cursor to the first row matching the plan identified
	/// by `tag`. The tag is byte-identical to what `plan_index` produced;
	/// `args` hold the constraint values in the argument order the plan
	/// assigned.
	fn filter(&mut self, tag: &PlanTag, args: &[Value]) -> Result<()>;

	/// Move to the next row. The engine never calls this past end-of-data.
	fn advance(&mut self) -> Result<()>;

	/// True when the cursor has no current row. Pure query.
	fn at_end(&self) -> bool;

	/// Write the current row's value for `column` into the engine-provided
	/// sink. Bounds checking is the implementation's responsibility; an
	/// out-of-range index is reported as a recoverable error.
	fn read_column(&self, sink: &mut ValueSink, column: usize) -> Result<()>;

	/// Row identifier of the current row.
	fn row_id(&self) -> Result<RowId>;

	/// Release the cursor. Consumes it; the dispatch layer calls this
	/// exactly once, after which the engine issues no further calls.
	fn close(self: Box<Self>) -> Result<()> {
		Ok(())
	}
}
