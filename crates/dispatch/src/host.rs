// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Process-wide host API gate.
//!
//! Registration requires the host API to be initialized first. The gate is
//! a lazily-initialized singleton: `initialize` is idempotent, and readers
//! ask `is_ready` instead of poking a flag.

use std::sync::OnceLock;

use tracing::debug;

use crate::dispatch::DISPATCH_VERSION;

static HOST: OnceLock<Host> = OnceLock::new();

/// Host API state shared by every connection in the process.
pub struct Host {
	dispatch_version: u32,
}

impl Host {
	/// Highest dispatch-table version this host accepts at registration.
	pub fn dispatch_version(&self) -> u32 {
		self.dispatch_version
	}
}

/// Initialize the host API, or return the existing instance. Safe to call
/// from any thread, any number of times.
pub fn initialize() -> &'static Host {
	HOST.get_or_init(|| {
		debug!(dispatch_version = DISPATCH_VERSION, "host API initialized");
		Host {
			dispatch_version: DISPATCH_VERSION,
		}
	})
}

/// Whether [`initialize`] has run.
pub fn is_ready() -> bool {
	HOST.get().is_some()
}
