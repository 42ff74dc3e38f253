// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

/// Failure while (un)registering a module. Reported synchronously to the
/// caller; nothing is retried at this layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
	#[error("host API is not initialized")]
	HostNotReady,

	#[error("module `{name}` is already registered on this connection")]
	NameInUse { name: String },

	#[error("dispatch table version {version} is not supported by this host (supported: {supported})")]
	UnsupportedVersion { version: u32, supported: u32 },

	#[error("module `{name}` still has {tables} live table instance(s)")]
	ModuleInUse { name: String, tables: usize },

	#[error("module `{name}` is not registered")]
	UnknownModule { name: String },
}
