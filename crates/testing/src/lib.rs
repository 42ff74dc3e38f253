// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Reference table modules for exercising the dispatch boundary.

pub mod probes;
pub mod static_rows;

pub use probes::{ContextDeclarationModule, FailingModule, LifecycleProbe, ProbeModule, ScanFailModule};
pub use static_rows::StaticRowsModule;
