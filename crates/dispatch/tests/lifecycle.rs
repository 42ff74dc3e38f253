// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Handle lifecycle discipline: exactly-once release, stale-id rejection,
//! teardown ordering.

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use tablekit_dispatch::{Connection, RegistrationError, STATUS_MISUSE, STATUS_OK, TableState, host};
use tablekit_sdk::context::ModuleContext;
use tablekit_testing::{ContextDeclarationModule, LifecycleProbe, ProbeModule};

fn declaration_args() -> Vec<String> {
	vec!["probe".to_string(), "main".to_string(), "probe".to_string()]
}

fn probe_connection() -> (Connection, LifecycleProbe) {
	host::initialize();
	let probe = LifecycleProbe::new();
	let mut connection = Connection::new();
	connection
		.register_module("probe", Arc::new(ProbeModule::new(probe.clone())), ModuleContext::new(()))
		.unwrap();
	(connection, probe)
}

#[test]
fn test_disconnect_releases_exactly_once() {
	let (mut connection, probe) = probe_connection();
	let table = connection.create_table("probe", &declaration_args()).unwrap();

	assert_eq!(connection.disconnect_table(table), STATUS_OK);
	assert_eq!(probe.disconnects(), 1);

	// A second disconnect is an engine-side accounting bug: rejected,
	// counted nowhere, and it must not crash.
	assert_eq!(connection.disconnect_table(table), STATUS_MISUSE);
	assert_eq!(probe.disconnects(), 1);
	assert!(connection.last_error().unwrap().contains("not a live table handle"));
}

#[test]
fn test_close_releases_exactly_once() {
	let (mut connection, probe) = probe_connection();
	let table = connection.create_table("probe", &declaration_args()).unwrap();
	let cursor = connection.open_cursor(table).unwrap();

	assert_eq!(connection.close_cursor(cursor), STATUS_OK);
	assert_eq!(probe.closes(), 1);

	assert_eq!(connection.close_cursor(cursor), STATUS_MISUSE);
	assert_eq!(probe.closes(), 1);

	assert_eq!(connection.disconnect_table(table), STATUS_OK);
}

#[test]
fn test_disconnect_refused_while_cursors_open() {
	let (mut connection, probe) = probe_connection();
	let table = connection.create_table("probe", &declaration_args()).unwrap();
	let cursor = connection.open_cursor(table).unwrap();

	assert_eq!(connection.disconnect_table(table), STATUS_MISUSE);
	assert_eq!(probe.disconnects(), 0);
	assert!(connection.table(table).unwrap().last_error().unwrap().contains("cursor(s) still open"));

	assert_eq!(connection.close_cursor(cursor), STATUS_OK);
	assert_eq!(connection.disconnect_table(table), STATUS_OK);
	assert_eq!(probe.disconnects(), 1);
}

#[test]
fn test_destroy_only_reachable_for_created_tables() {
	let (mut connection, probe) = probe_connection();

	let connected = connection.connect_table("probe", &declaration_args()).unwrap();
	assert_eq!(connection.destroy_table(connected), STATUS_MISUSE);
	assert_eq!(probe.destroys(), 0);
	assert_eq!(connection.table(connected).unwrap().state(), TableState::Connected);
	assert_eq!(connection.disconnect_table(connected), STATUS_OK);

	let created = connection.create_table("probe", &declaration_args()).unwrap();
	assert_eq!(connection.destroy_table(created), STATUS_OK);
	assert_eq!(probe.destroys(), 1);
	assert_eq!(probe.disconnects(), 1);
}

#[test]
fn test_unregister_refused_while_tables_live() {
	let (mut connection, _probe) = probe_connection();
	let table = connection.create_table("probe", &declaration_args()).unwrap();

	assert_eq!(connection.unregister_module("probe").unwrap_err(), RegistrationError::ModuleInUse {
		name: "probe".to_string(),
		tables: 1,
	});

	assert_eq!(connection.disconnect_table(table), STATUS_OK);
	connection.unregister_module("probe").unwrap();
	assert_eq!(connection.unregister_module("probe").unwrap_err(), RegistrationError::UnknownModule {
		name: "probe".to_string(),
	});
}

#[test]
fn test_context_teardown_runs_once_at_unregister() {
	host::initialize();
	let teardowns = Arc::new(AtomicUsize::new(0));
	let observer = Arc::clone(&teardowns);

	let probe = LifecycleProbe::new();
	let mut connection = Connection::new();
	connection
		.register_module(
			"probe",
			Arc::new(ProbeModule::new(probe.clone())),
			ModuleContext::with_teardown((), move || {
				observer.fetch_add(1, Ordering::SeqCst);
			}),
		)
		.unwrap();

	let table = connection.create_table("probe", &declaration_args()).unwrap();
	assert_eq!(teardowns.load(Ordering::SeqCst), 0);

	// Refused while the table is live; the hook must not have run.
	connection.unregister_module("probe").unwrap_err();
	assert_eq!(teardowns.load(Ordering::SeqCst), 0);

	assert_eq!(connection.disconnect_table(table), STATUS_OK);
	connection.unregister_module("probe").unwrap();
	assert_eq!(teardowns.load(Ordering::SeqCst), 1);

	drop(connection);
	assert_eq!(teardowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_context_teardown_runs_at_connection_shutdown() {
	host::initialize();
	let teardowns = Arc::new(AtomicUsize::new(0));
	let observer = Arc::clone(&teardowns);

	let mut connection = Connection::new();
	connection
		.register_module(
			"probe",
			Arc::new(ProbeModule::new(LifecycleProbe::new())),
			ModuleContext::with_teardown((), move || {
				observer.fetch_add(1, Ordering::SeqCst);
			}),
		)
		.unwrap();

	drop(connection);
	assert_eq!(teardowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_receives_registered_context() {
	host::initialize();
	let mut connection = Connection::new();
	connection
		.register_module(
			"ctx",
			Arc::new(ContextDeclarationModule),
			ModuleContext::new("CREATE TABLE x(a,b)".to_string()),
		)
		.unwrap();

	let table = connection.create_table("ctx", &declaration_args()).unwrap();
	assert_eq!(connection.table(table).unwrap().declaration(), "CREATE TABLE x(a,b)");
	assert_eq!(connection.disconnect_table(table), STATUS_OK);
}

#[test]
fn test_factory_invoked_once_per_instantiation() {
	let (mut connection, probe) = probe_connection();
	let table = connection.create_table("probe", &declaration_args()).unwrap();
	assert_eq!(probe.instantiations(), 1);
	assert_eq!(connection.disconnect_table(table), STATUS_OK);
}
