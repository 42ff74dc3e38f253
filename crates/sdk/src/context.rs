// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

use std::any::Any;

use parking_lot::Mutex;

type Teardown = Box<dyn FnOnce() + Send>;

/// Module-scoped shared state.
///
/// Handed unchanged to every factory invocation for tables of the owning
/// module. The optional teardown hook runs exactly once: when the registry
/// entry is removed, or at the latest when the context itself is dropped
/// during connection shutdown. The registry refuses to remove an entry
/// while table instances still reference it, so the hook never observes a
/// live table.
pub struct ModuleContext {
	data: Box<dyn Any + Send + Sync>,
	teardown: Mutex<Option<Teardown>>,
}

impl ModuleContext {
	pub fn new<T: Any + Send + Sync>(data: T) -> Self {
		Self {
			data: Box::new(data),
			teardown: Mutex::new(None),
		}
	}

	pub fn with_teardown<T, F>(data: T, teardown: F) -> Self
	where
		T: Any + Send + Sync,
		F: FnOnce() + Send + 'static,
	{
		Self {
			data: Box::new(data),
			teardown: Mutex::new(Some(Box::new(teardown))),
		}
	}

	/// Downcast the shared state to its concrete type.
	pub fn get<T: Any>(&self) -> Option<&T> {
		self.data.downcast_ref::<T>()
	}

	/// Run the teardown hook if it has not run yet.
	pub fn run_teardown(&self) {
		let hook = self.teardown.lock().take();
		if let Some(hook) = hook {
			hook();
		}
	}
}

impl Drop for ModuleContext {
	fn drop(&mut self) {
		self.run_teardown();
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	use super::ModuleContext;

	#[test]
	fn test_get_downcasts() {
		let context = ModuleContext::new(42u32);
		assert_eq!(context.get::<u32>(), Some(&42));
		assert_eq!(context.get::<String>(), None);
	}

	#[test]
	fn test_teardown_runs_exactly_once() {
		let calls = Arc::new(AtomicUsize::new(0));
		let probe = Arc::clone(&calls);
		let context = ModuleContext::with_teardown((), move || {
			probe.fetch_add(1, Ordering::SeqCst);
		});

		context.run_teardown();
		context.run_teardown();
		drop(context);

		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_drop_runs_pending_teardown() {
		let calls = Arc::new(AtomicUsize::new(0));
		let probe = Arc::clone(&calls);
		drop(ModuleContext::with_teardown((), move || {
			probe.fetch_add(1, Ordering::SeqCst);
		}));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
