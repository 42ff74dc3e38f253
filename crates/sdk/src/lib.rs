// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Capability interfaces a pluggable table implementation must satisfy.
//!
//! The dispatch layer forwards every engine entry point into one of the
//! traits defined here. Implementations never see the engine directly;
//! they receive plan requests, filter arguments and value sinks, and they
//! report failures as a status code plus a human-readable message.

pub mod context;
pub mod error;
pub mod module;
pub mod plan;
pub mod sink;
pub mod status;

pub use context::ModuleContext;
pub use error::ModuleError;
pub use module::{Instantiation, InstantiationKind, TableModule, VirtualCursor, VirtualTable};
pub use plan::{ConstraintOp, ConstraintUsage, IndexPlan, OrderTerm, PlanConstraint, PlanRequest, PlanTag};
pub use sink::ValueSink;

pub type Result<T> = std::result::Result<T, ModuleError>;
