// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Name-to-factory registry.
//!
//! Binds a module name to its factory, shared context and the dispatch
//! table the engine will drive instances through. One registry per
//! connection; collisions within a connection are rejected.

use std::{collections::HashMap, sync::Arc};

use tablekit_sdk::{context::ModuleContext, module::TableModule};
use tracing::{debug, instrument};

use crate::{
	dispatch::DispatchTable,
	error::RegistrationError,
	host,
};

/// One registry entry: everything needed to instantiate and drive tables
/// of this kind.
pub struct RegisteredModule {
	name: String,
	module: Arc<dyn TableModule>,
	context: Arc<ModuleContext>,
	dispatch: &'static DispatchTable,
}

impl RegisteredModule {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn module(&self) -> &Arc<dyn TableModule> {
		&self.module
	}

	pub fn context(&self) -> &Arc<ModuleContext> {
		&self.context
	}

	pub fn dispatch(&self) -> &'static DispatchTable {
		self.dispatch
	}
}

/// Registry of virtual-table modules for one connection.
#[derive(Default)]
pub struct ModuleRegistry {
	entries: HashMap<String, RegisteredModule>,
}

impl ModuleRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind `name` to a module factory, its shared context and `dispatch`.
	///
	/// Fails if the host API is not initialized, the dispatch-table
	/// version is unsupported, or `name` is already bound.
	#[instrument(level = "debug", skip(self, module, context, dispatch))]
	pub fn register(
		&mut self,
		name: &str,
		module: Arc<dyn TableModule>,
		context: Arc<ModuleContext>,
		dispatch: &'static DispatchTable,
	) -> Result<(), RegistrationError> {
		if !host::is_ready() {
			return Err(RegistrationError::HostNotReady);
		}
		let supported = host::initialize().dispatch_version();
		if dispatch.version != supported {
			return Err(RegistrationError::UnsupportedVersion {
				version: dispatch.version,
				supported,
			});
		}
		if self.entries.contains_key(name) {
			return Err(RegistrationError::NameInUse {
				name: name.to_string(),
			});
		}

		self.entries.insert(name.to_string(), RegisteredModule {
			name: name.to_string(),
			module,
			context,
			dispatch,
		});
		debug!(name, "module registered");
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&RegisteredModule> {
		self.entries.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Registered module names, unordered.
	pub fn names(&self) -> Vec<&str> {
		self.entries.keys().map(String::as_str).collect()
	}

	pub(crate) fn remove(&mut self, name: &str) -> Option<RegisteredModule> {
		self.entries.remove(name)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use tablekit_sdk::{
		Result,
		context::ModuleContext,
		module::{Instantiation, InstantiationKind, TableModule},
	};

	use super::ModuleRegistry;
	use crate::{
		dispatch::{DISPATCH_V1, DISPATCH_VERSION, DispatchTable},
		error::RegistrationError,
		host,
	};

	struct NeverInstantiated;

	impl TableModule for NeverInstantiated {
		fn create_or_connect(
			&self,
			_context: &Arc<ModuleContext>,
			_args: &[String],
			_kind: InstantiationKind,
		) -> Result<Instantiation> {
			unreachable!("registry tests never instantiate")
		}
	}

	fn registry_with(name: &str) -> ModuleRegistry {
		host::initialize();
		let mut registry = ModuleRegistry::new();
		registry
			.register(name, Arc::new(NeverInstantiated), Arc::new(ModuleContext::new(())), &DISPATCH_V1)
			.unwrap();
		registry
	}

	#[test]
	fn test_register_then_lookup() {
		let registry = registry_with("rows");
		assert!(registry.contains("rows"));
		assert_eq!(registry.get("rows").unwrap().name(), "rows");
		assert_eq!(registry.names(), vec!["rows"]);
	}

	#[test]
	fn test_name_collision_rejected() {
		let mut registry = registry_with("rows");
		let err = registry
			.register("rows", Arc::new(NeverInstantiated), Arc::new(ModuleContext::new(())), &DISPATCH_V1)
			.unwrap_err();
		assert_eq!(err, RegistrationError::NameInUse {
			name: "rows".to_string(),
		});
	}

	#[test]
	fn test_unsupported_dispatch_version_rejected() {
		host::initialize();
		let future: &'static DispatchTable = Box::leak(Box::new(DispatchTable {
			version: DISPATCH_VERSION + 1,
			..DISPATCH_V1
		}));
		let mut registry = ModuleRegistry::new();
		let err = registry
			.register("rows", Arc::new(NeverInstantiated), Arc::new(ModuleContext::new(())), future)
			.unwrap_err();
		assert_eq!(err, RegistrationError::UnsupportedVersion {
			version: DISPATCH_VERSION + 1,
			supported: DISPATCH_VERSION,
		});
	}
}
