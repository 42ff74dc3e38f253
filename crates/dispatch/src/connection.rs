// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! The engine-visible boundary object.
//!
//! A connection owns the module registry and the side-tables of live
//! handles, and routes every operation through the owning module's
//! dispatch table. It also enforces the lifecycle discipline the engine
//! contract promises: stale ids and duplicate releases answer with a
//! misuse status instead of reaching a released object.

use std::{collections::HashMap, sync::Arc};

use tablekit_sdk::{
	context::ModuleContext,
	module::{InstantiationKind, TableModule},
	plan::{IndexPlan, PlanRequest, PlanTag},
	sink::ValueSink,
	status::{STATUS_ERROR, STATUS_MISUSE, STATUS_OK},
};
use tablekit_type::{RowId, Value};
use tracing::{debug, instrument};

use crate::{
	dispatch::{DISPATCH_V1, DispatchTable},
	error::RegistrationError,
	handle::{CursorHandle, CursorId, TableHandle, TableId, set_table_error},
	registry::ModuleRegistry,
};

/// Failure of an operation that would have produced a handle: the status
/// code plus the error string attached to the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("status {status}: {}", .message.as_deref().unwrap_or("no error message attached"))]
pub struct DispatchFailure {
	pub status: i32,
	pub message: Option<String>,
}

/// One engine connection: registry plus live handles.
#[derive(Default)]
pub struct Connection {
	registry: ModuleRegistry,
	tables: HashMap<TableId, TableHandle>,
	cursors: HashMap<CursorId, CursorHandle>,
	next_table: u64,
	next_cursor: u64,
	/// Message of the most recent failing operation, kept readable after
	/// the failing handle itself is retired.
	last_error: Option<String>,
}

impl Connection {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn registry(&self) -> &ModuleRegistry {
		&self.registry
	}

	/// Bind `name` to a module factory plus shared context under the
	/// current dispatch table.
	pub fn register_module(
		&mut self,
		name: &str,
		module: Arc<dyn TableModule>,
		context: ModuleContext,
	) -> Result<(), RegistrationError> {
		self.register_module_with(name, module, context, &DISPATCH_V1)
	}

	/// Same as [`register_module`](Self::register_module) with an explicit
	/// dispatch table; the registry rejects unsupported versions.
	pub fn register_module_with(
		&mut self,
		name: &str,
		module: Arc<dyn TableModule>,
		context: ModuleContext,
		dispatch: &'static DispatchTable,
	) -> Result<(), RegistrationError> {
		self.registry.register(name, module, Arc::new(context), dispatch)
	}

	/// Remove the binding for `name` and run its context teardown.
	///
	/// Refused while table instances of the module are live; the teardown
	/// hook must never observe a live table.
	#[instrument(level = "debug", skip(self))]
	pub fn unregister_module(&mut self, name: &str) -> Result<(), RegistrationError> {
		if !self.registry.contains(name) {
			return Err(RegistrationError::UnknownModule {
				name: name.to_string(),
			});
		}
		let live = self.tables.values().filter(|table| table.module == name).count();
		if live > 0 {
			return Err(RegistrationError::ModuleInUse {
				name: name.to_string(),
				tables: live,
			});
		}
		if let Some(entry) = self.registry.remove(name) {
			entry.context().run_teardown();
			debug!(name, "module unregistered");
		}
		Ok(())
	}

	/// Instantiate a table of module `name`, defining new schema.
	pub fn create_table(&mut self, name: &str, args: &[String]) -> Result<TableId, DispatchFailure> {
		self.instantiate(name, args, InstantiationKind::Create)
	}

	/// Re-attach to schema that already exists in the catalog.
	pub fn connect_table(&mut self, name: &str, args: &[String]) -> Result<TableId, DispatchFailure> {
		self.instantiate(name, args, InstantiationKind::Connect)
	}

	#[instrument(level = "debug", skip(self, args))]
	fn instantiate(
		&mut self,
		name: &str,
		args: &[String],
		kind: InstantiationKind,
	) -> Result<TableId, DispatchFailure> {
		let Some(entry) = self.registry.get(name) else {
			return Err(self.fail_without_handle(STATUS_MISUSE, format!("no module named `{}`", name)));
		};
		let dispatch = entry.dispatch();
		let context = Arc::clone(entry.context());

		let (status, instantiation, message) = (dispatch.create_or_connect)(entry, args, kind);
		if status != STATUS_OK {
			self.last_error = message.clone();
			return Err(DispatchFailure {
				status,
				message,
			});
		}
		let Some(instantiation) = instantiation else {
			return Err(self.fail_without_handle(STATUS_ERROR, format!("module `{}` produced no table", name)));
		};

		let id = TableId(self.next_table);
		self.next_table += 1;
		self.tables.insert(id, TableHandle::new(name, instantiation, context, dispatch, kind));
		debug!(%id, module = name, ?kind, "table instantiated");
		Ok(id)
	}

	/// Ask the table how it would serve a scan described by `request`.
	/// The plan starts out at engine defaults; the implementation refines
	/// whatever it decides and the rest stays untouched.
	pub fn plan_index(&mut self, table: TableId, request: &PlanRequest) -> (i32, IndexPlan) {
		let mut plan = IndexPlan::for_request(request);
		let status = self.with_table(table, |handle| {
			let dispatch = handle.dispatch;
			(dispatch.plan_index)(handle, request, &mut plan)
		});
		(status, plan)
	}

	/// Open a cursor over `table`.
	pub fn open_cursor(&mut self, table: TableId) -> Result<CursorId, DispatchFailure> {
		let Some(handle) = self.tables.get_mut(&table) else {
			return Err(self.fail_without_handle(STATUS_MISUSE, format!("{} is not a live table handle", table)));
		};
		let dispatch = handle.dispatch;

		let (status, cursor) = (dispatch.open)(handle);
		if status != STATUS_OK {
			let message = handle.error.clone();
			self.last_error = message.clone();
			return Err(DispatchFailure {
				status,
				message,
			});
		}
		let Some(cursor) = cursor else {
			return Err(self.fail_without_handle(STATUS_ERROR, format!("{} produced no cursor", table)));
		};

		handle.open_cursors += 1;
		let id = CursorId(self.next_cursor);
		self.next_cursor += 1;
		self.cursors.insert(id, CursorHandle::new(table, cursor));
		debug!(%id, %table, "cursor opened");
		Ok(id)
	}

	/// Reposition `cursor` to the first row matching the plan identified
	/// by `tag`. The tag travels back exactly as planning produced it.
	pub fn filter(&mut self, cursor: CursorId, tag: &PlanTag, args: &[Value]) -> i32 {
		self.with_cursor(cursor, |table, cursor| {
			let dispatch = table.dispatch;
			(dispatch.filter)(table, cursor, tag, args)
		})
	}

	/// Move `cursor` to the next row.
	pub fn advance(&mut self, cursor: CursorId) -> i32 {
		self.with_cursor(cursor, |table, cursor| {
			let dispatch = table.dispatch;
			(dispatch.advance)(table, cursor)
		})
	}

	/// Whether `cursor` has no current row. A released or unknown cursor
	/// has none.
	pub fn at_end(&self, cursor: CursorId) -> bool {
		let Some(cursor_handle) = self.cursors.get(&cursor) else {
			return true;
		};
		let Some(table_handle) = self.tables.get(&cursor_handle.table) else {
			return true;
		};
		(table_handle.dispatch.at_end)(cursor_handle)
	}

	/// Read the current row's value for `column` into `sink`.
	pub fn read_column(&mut self, cursor: CursorId, sink: &mut ValueSink, column: usize) -> i32 {
		self.with_cursor(cursor, |table, cursor| {
			let dispatch = table.dispatch;
			(dispatch.read_column)(table, cursor, sink, column)
		})
	}

	/// Read the current row's identifier into `out`.
	pub fn read_rowid(&mut self, cursor: CursorId, out: &mut RowId) -> i32 {
		self.with_cursor(cursor, |table, cursor| {
			let dispatch = table.dispatch;
			(dispatch.read_rowid)(table, cursor, out)
		})
	}

	/// Release `cursor`. The handle is retired even when the capability
	/// reports a failure; a half-released cursor must not stay reachable.
	pub fn close_cursor(&mut self, cursor: CursorId) -> i32 {
		let Some(mut cursor_handle) = self.cursors.remove(&cursor) else {
			self.last_error = Some(format!("{} is not a live cursor handle", cursor));
			return STATUS_MISUSE;
		};
		let Some(table_handle) = self.tables.get_mut(&cursor_handle.table) else {
			self.last_error = Some(format!("{} lost its owning table", cursor));
			return STATUS_MISUSE;
		};

		let dispatch = table_handle.dispatch;
		let status = (dispatch.close)(table_handle, &mut cursor_handle);
		table_handle.open_cursors = table_handle.open_cursors.saturating_sub(1);
		if status != STATUS_OK {
			self.last_error = table_handle.error.clone();
		}
		debug!(%cursor, status, "cursor closed");
		status
	}

	/// Release the in-memory binding of `table`.
	pub fn disconnect_table(&mut self, table: TableId) -> i32 {
		self.release_table(table, false)
	}

	/// Release `table` and discard any persistent backing state. Only
	/// reachable for tables that were created, not merely connected.
	pub fn destroy_table(&mut self, table: TableId) -> i32 {
		self.release_table(table, true)
	}

	fn release_table(&mut self, table: TableId, destroy: bool) -> i32 {
		let Some(handle) = self.tables.get_mut(&table) else {
			self.last_error = Some(format!("{} is not a live table handle", table));
			return STATUS_MISUSE;
		};
		if handle.open_cursors > 0 {
			let msg = format!("{} cursor(s) still open", handle.open_cursors);
			set_table_error(Some(handle), msg);
			self.last_error = handle.error.clone();
			return STATUS_MISUSE;
		}

		let dispatch = handle.dispatch;
		let status = if destroy {
			(dispatch.destroy)(handle)
		} else {
			(dispatch.disconnect)(handle)
		};
		if status != STATUS_OK {
			self.last_error = handle.error.clone();
		}
		let released = handle.table.is_none();
		if released {
			self.tables.remove(&table);
			debug!(%table, destroy, status, "table released");
		}
		status
	}

	/// A live table handle, if `table` refers to one.
	pub fn table(&self, table: TableId) -> Option<&TableHandle> {
		self.tables.get(&table)
	}

	/// A live cursor handle, if `cursor` refers to one.
	pub fn cursor(&self, cursor: CursorId) -> Option<&CursorHandle> {
		self.cursors.get(&cursor)
	}

	/// Message of the most recent failing operation on this connection.
	pub fn last_error(&self) -> Option<&str> {
		self.last_error.as_deref()
	}

	pub fn table_count(&self) -> usize {
		self.tables.len()
	}

	pub fn cursor_count(&self) -> usize {
		self.cursors.len()
	}

	fn fail_without_handle(&mut self, status: i32, message: String) -> DispatchFailure {
		// No handle exists to carry the message; the no-op error setter
		// documents that, and the connection keeps the text readable.
		set_table_error(None, message.as_str());
		self.last_error = Some(message.clone());
		DispatchFailure {
			status,
			message: Some(message),
		}
	}

	fn with_table(&mut self, table: TableId, op: impl FnOnce(&mut TableHandle) -> i32) -> i32 {
		let Some(handle) = self.tables.get_mut(&table) else {
			self.last_error = Some(format!("{} is not a live table handle", table));
			return STATUS_MISUSE;
		};
		let status = op(handle);
		if status != STATUS_OK {
			self.last_error = handle.error.clone();
		}
		status
	}

	fn with_cursor(&mut self, cursor: CursorId, op: impl FnOnce(&mut TableHandle, &mut CursorHandle) -> i32) -> i32 {
		let Some(cursor_handle) = self.cursors.get_mut(&cursor) else {
			self.last_error = Some(format!("{} is not a live cursor handle", cursor));
			return STATUS_MISUSE;
		};
		let Some(table_handle) = self.tables.get_mut(&cursor_handle.table) else {
			self.last_error = Some(format!("{} lost its owning table", cursor));
			return STATUS_MISUSE;
		};
		let status = op(table_handle, cursor_handle);
		if status != STATUS_OK {
			self.last_error = table_handle.error.clone();
		}
		status
	}
}
