// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Engine boundary for pluggable virtual tables.
//!
//! A [`Connection`] owns the [`ModuleRegistry`] binding module names to
//! factories, plus the side-tables of live table and cursor handles. Every
//! operation the engine issues goes through the registered module's
//! [`DispatchTable`], whose slots unwrap the engine-level handle, invoke
//! the capability method and translate the result back into the engine's
//! status-plus-error-slot channel.

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod host;
pub mod registry;
#[cfg(not(feature = "engine-snapshot"))]
pub mod snapshot;

pub use connection::{Connection, DispatchFailure};
pub use dispatch::{DISPATCH_V1, DISPATCH_VERSION, DispatchTable};
pub use error::RegistrationError;
pub use handle::{CursorHandle, CursorId, CursorState, TableHandle, TableId, TableState, set_table_error};
pub use registry::{ModuleRegistry, RegisteredModule};
// The status vocabulary is part of this boundary's surface.
pub use tablekit_sdk::status::{STATUS_ERROR, STATUS_MISUSE, STATUS_OK, STATUS_UNSUPPORTED};
