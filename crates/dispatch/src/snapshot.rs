// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Stand-ins for the engine's optional snapshot facility.
//!
//! Compiled in when the `engine-snapshot` feature is absent, purely so
//! dependent code links against either engine build. Every call fails with
//! [`STATUS_UNSUPPORTED`], no state is touched, and out-handle parameters
//! are set to the explicit no-handle sentinel.

use tablekit_sdk::status::STATUS_UNSUPPORTED;

use crate::connection::Connection;

/// Opaque snapshot handle. The stubs never construct one.
pub struct Snapshot {
	_opaque: (),
}

/// Capture a snapshot of `schema` on `connection`.
pub fn snapshot_get(_connection: &Connection, _schema: &str, out: &mut Option<Snapshot>) -> i32 {
	*out = None;
	STATUS_UNSUPPORTED
}

/// Re-open a previously captured snapshot.
pub fn snapshot_open(_connection: &mut Connection, _schema: &str, _snapshot: Option<&Snapshot>) -> i32 {
	STATUS_UNSUPPORTED
}

/// Release a snapshot handle.
pub fn snapshot_free(_snapshot: Option<Snapshot>) {}

/// Order two snapshots by age.
pub fn snapshot_cmp(_a: Option<&Snapshot>, _b: Option<&Snapshot>) -> i32 {
	STATUS_UNSUPPORTED
}
