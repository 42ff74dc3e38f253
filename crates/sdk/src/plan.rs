// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! Index planning model.
//!
//! Before every scan the engine describes the candidate constraints and
//! orderings it could supply, and the table implementation answers with an
//! [`IndexPlan`]: which constraints it wants as filter arguments, what the
//! scan is estimated to cost, and an opaque tag that is echoed back
//! unchanged when the scan actually starts.

/// Cost the engine assumes for an unconstrained full scan.
pub const DEFAULT_ESTIMATED_COST: f64 = 5e98;

/// Row count the engine assumes when the implementation gives no estimate.
pub const DEFAULT_ESTIMATED_ROWS: i64 = 25;

/// Comparison operator of one candidate constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
	Eq,
	Gt,
	Ge,
	Lt,
	Le,
}

/// One candidate constraint the engine could push down.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanConstraint {
	/// Column the constraint applies to; `-1` addresses the row id.
	pub column: i32,
	pub op: ConstraintOp,
	/// Whether the engine can actually supply this constraint's value for
	/// the scan under consideration. Unusable constraints must not be
	/// assigned a filter argument.
	pub usable: bool,
}

/// One term of the ordering the engine would like to consume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderTerm {
	pub column: i32,
	pub descending: bool,
}

/// Everything the engine knows before a scan: candidate constraints plus
/// the requested ordering. Recomputed for every query-plan candidate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanRequest {
	pub constraints: Vec<PlanConstraint>,
	pub order_by: Vec<OrderTerm>,
}

/// How the implementation wants one candidate constraint delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstraintUsage {
	/// Position of this constraint's value in the filter argument list,
	/// or `None` if the constraint is not used by the chosen plan.
	pub argument: Option<usize>,
	/// When set, the engine may skip re-checking the constraint itself.
	pub omit: bool,
}

/// Opaque scan tag chosen by the implementation at planning time.
///
/// The engine stores the tag with the query plan and replays it verbatim
/// to `filter`; neither half is interpreted or mutated on the way.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlanTag {
	pub number: i32,
	pub text: String,
}

impl PlanTag {
	pub fn new(number: i32, text: impl Into<String>) -> Self {
		Self {
			number,
			text: text.into(),
		}
	}
}

/// The implementation's answer to a [`PlanRequest`].
///
/// The engine pre-fills the plan with defaults before calling
/// `plan_index`; the implementation overwrites only what it decides.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexPlan {
	/// One entry per constraint in the request, same order.
	pub usage: Vec<ConstraintUsage>,
	pub tag: PlanTag,
	/// True when the scan will already deliver rows in the requested order.
	pub order_by_consumed: bool,
	pub estimated_cost: f64,
	pub estimated_rows: i64,
}

impl IndexPlan {
	/// The engine-provided default plan for `request`: no constraint used,
	/// ordering not consumed, full-scan cost, empty tag.
	pub fn for_request(request: &PlanRequest) -> Self {
		Self {
			usage: vec![ConstraintUsage::default(); request.constraints.len()],
			tag: PlanTag::default(),
			order_by_consumed: false,
			estimated_cost: DEFAULT_ESTIMATED_COST,
			estimated_rows: DEFAULT_ESTIMATED_ROWS,
		}
	}
}
