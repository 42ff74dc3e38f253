// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Host init gate. Lives in its own test binary: the gate is process-wide,
//! and this is the one process that must observe the not-ready state.

use std::sync::Arc;

use tablekit_dispatch::{Connection, RegistrationError, host};
use tablekit_sdk::context::ModuleContext;
use tablekit_testing::{LifecycleProbe, ProbeModule};

#[test]
fn test_registration_requires_initialized_host() {
	assert!(!host::is_ready());

	let mut connection = Connection::new();
	let err = connection
		.register_module(
			"probe",
			Arc::new(ProbeModule::new(LifecycleProbe::new())),
			ModuleContext::new(()),
		)
		.unwrap_err();
	assert_eq!(err, RegistrationError::HostNotReady);

	host::initialize();
	assert!(host::is_ready());
	// Idempotent: a second initialize hands back the same host.
	host::initialize();

	connection
		.register_module(
			"probe",
			Arc::new(ProbeModule::new(LifecycleProbe::new())),
			ModuleContext::new(()),
		)
		.unwrap();
}
