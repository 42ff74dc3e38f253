// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Error-injecting and lifecycle-observing modules.

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use tablekit_sdk::{
	ModuleError, Result,
	context::ModuleContext,
	module::{Instantiation, InstantiationKind, TableModule, VirtualCursor, VirtualTable},
	plan::{IndexPlan, PlanRequest, PlanTag},
	sink::ValueSink,
};
use tablekit_type::{RowId, Value};

/// Factory that always fails with a fixed status and message.
pub struct FailingModule {
	status: i32,
	message: String,
}

impl FailingModule {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			status: tablekit_sdk::status::STATUS_ERROR,
			message: message.into(),
		}
	}

	pub fn with_status(status: i32, message: impl Into<String>) -> Self {
		Self {
			status,
			message: message.into(),
		}
	}
}

impl TableModule for FailingModule {
	fn create_or_connect(
		&self,
		_context: &Arc<ModuleContext>,
		_args: &[String],
		_kind: InstantiationKind,
	) -> Result<Instantiation> {
		Err(ModuleError::with_status(self.status, self.message.clone()))
	}
}

/// Counters observed by [`ProbeModule`] instances.
#[derive(Clone, Default)]
pub struct LifecycleProbe {
	pub instantiations: Arc<AtomicUsize>,
	pub disconnects: Arc<AtomicUsize>,
	pub destroys: Arc<AtomicUsize>,
	pub closes: Arc<AtomicUsize>,
}

impl LifecycleProbe {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn instantiations(&self) -> usize {
		self.instantiations.load(Ordering::SeqCst)
	}

	pub fn disconnects(&self) -> usize {
		self.disconnects.load(Ordering::SeqCst)
	}

	pub fn destroys(&self) -> usize {
		self.destroys.load(Ordering::SeqCst)
	}

	pub fn closes(&self) -> usize {
		self.closes.load(Ordering::SeqCst)
	}
}

/// Module whose tables and cursors count their lifecycle events. The
/// table exposes no rows; every cursor starts at end-of-data.
pub struct ProbeModule {
	probe: LifecycleProbe,
}

impl ProbeModule {
	pub fn new(probe: LifecycleProbe) -> Self {
		Self {
			probe,
		}
	}
}

impl TableModule for ProbeModule {
	fn create_or_connect(
		&self,
		_context: &Arc<ModuleContext>,
		_args: &[String],
		_kind: InstantiationKind,
	) -> Result<Instantiation> {
		self.probe.instantiations.fetch_add(1, Ordering::SeqCst);
		Ok(Instantiation {
			table: Box::new(ProbeTable {
				probe: self.probe.clone(),
			}),
			declaration: "CREATE TABLE x(a)".to_string(),
		})
	}
}

struct ProbeTable {
	probe: LifecycleProbe,
}

impl VirtualTable for ProbeTable {
	fn plan_index(&self, _request: &PlanRequest, _plan: &mut IndexPlan) -> Result<()> {
		Ok(())
	}

	fn open(&self) -> Result<Box<dyn VirtualCursor>> {
		Ok(Box::new(ProbeCursor {
			probe: self.probe.clone(),
		}))
	}

	fn disconnect(self: Box<Self>) -> Result<()> {
		self.probe.disconnects.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	fn destroy(self: Box<Self>) -> Result<()> {
		self.probe.destroys.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

struct ProbeCursor {
	probe: LifecycleProbe,
}

impl VirtualCursor for ProbeCursor {
	fn filter(&mut self, _tag: &PlanTag, _args: &[Value]) -> Result<()> {
		Ok(())
	}

	fn advance(&mut self) -> Result<()> {
		Err(ModuleError::new("probe table has no rows to advance over"))
	}

	fn at_end(&self) -> bool {
		true
	}

	fn read_column(&self, _sink: &mut ValueSink, _column: usize) -> Result<()> {
		Err(ModuleError::new("probe table has no current row"))
	}

	fn row_id(&self) -> Result<RowId> {
		Err(ModuleError::new("probe table has no current row"))
	}

	fn close(self: Box<Self>) -> Result<()> {
		self.probe.closes.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

/// Module that reads its schema declaration out of the shared context,
/// proving the registry hands the registered context to every factory
/// invocation unchanged.
pub struct ContextDeclarationModule;

impl TableModule for ContextDeclarationModule {
	fn create_or_connect(
		&self,
		context: &Arc<ModuleContext>,
		_args: &[String],
		_kind: InstantiationKind,
	) -> Result<Instantiation> {
		let declaration = context
			.get::<String>()
			.ok_or_else(|| ModuleError::new("context does not carry a declaration"))?;
		Ok(Instantiation {
			table: Box::new(EmptyTable),
			declaration: declaration.clone(),
		})
	}
}

struct EmptyTable;

impl VirtualTable for EmptyTable {
	fn plan_index(&self, _request: &PlanRequest, _plan: &mut IndexPlan) -> Result<()> {
		Ok(())
	}

	fn open(&self) -> Result<Box<dyn VirtualCursor>> {
		Err(ModuleError::new("empty table has nothing to iterate"))
	}

	fn disconnect(self: Box<Self>) -> Result<()> {
		Ok(())
	}
}

/// Module whose cursors position fine but fail on advance, for exercising
/// the scan-failure path: the cursor must still accept a close afterwards.
pub struct ScanFailModule {
	message: String,
}

impl ScanFailModule {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

impl TableModule for ScanFailModule {
	fn create_or_connect(
		&self,
		_context: &Arc<ModuleContext>,
		_args: &[String],
		_kind: InstantiationKind,
	) -> Result<Instantiation> {
		Ok(Instantiation {
			table: Box::new(ScanFailTable {
				message: self.message.clone(),
			}),
			declaration: "CREATE TABLE x(a)".to_string(),
		})
	}
}

struct ScanFailTable {
	message: String,
}

impl VirtualTable for ScanFailTable {
	fn plan_index(&self, _request: &PlanRequest, _plan: &mut IndexPlan) -> Result<()> {
		Ok(())
	}

	fn open(&self) -> Result<Box<dyn VirtualCursor>> {
		Ok(Box::new(ScanFailCursor {
			message: self.message.clone(),
		}))
	}

	fn disconnect(self: Box<Self>) -> Result<()> {
		Ok(())
	}
}

struct ScanFailCursor {
	message: String,
}

impl VirtualCursor for ScanFailCursor {
	fn filter(&mut self, _tag: &PlanTag, _args: &[Value]) -> Result<()> {
		Ok(())
	}

	fn advance(&mut self) -> Result<()> {
		Err(ModuleError::new(self.message.clone()))
	}

	fn at_end(&self) -> bool {
		false
	}

	fn read_column(&self, sink: &mut ValueSink, _column: usize) -> Result<()> {
		sink.set_undefined();
		Ok(())
	}

	fn row_id(&self) -> Result<RowId> {
		Ok(RowId(0))
	}
}
