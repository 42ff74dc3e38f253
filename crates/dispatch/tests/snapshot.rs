// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Snapshot stand-ins compiled in when the engine build lacks the feature.

#![cfg(not(feature = "engine-snapshot"))]

use tablekit_dispatch::{Connection, STATUS_UNSUPPORTED, snapshot};

#[test]
fn test_stubs_fail_and_never_hand_out_a_handle() {
	let mut connection = Connection::new();

	let mut out = None;
	assert_eq!(snapshot::snapshot_get(&connection, "main", &mut out), STATUS_UNSUPPORTED);
	assert!(out.is_none(), "out-handle must be the no-handle sentinel");

	assert_eq!(snapshot::snapshot_open(&mut connection, "main", None), STATUS_UNSUPPORTED);
	assert_eq!(snapshot::snapshot_cmp(None, None), STATUS_UNSUPPORTED);

	// Free accepts the sentinel and does nothing.
	snapshot::snapshot_free(None);
}
