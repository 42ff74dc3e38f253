// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

//! In-memory row source with a point-lookup plan.
//!
//! The module serves a fixed set of rows. Planning recognizes one pushdown
//! shape, an equality constraint on column 0, and answers it with plan tag
//! `(1, "eq0")`; everything else falls back to a full scan under the empty
//! tag. The cursor validates the tag it receives against exactly those two
//! shapes, which makes any mutation of the tag on its way through the
//! engine visible as a scan failure.

use std::sync::Arc;

use tablekit_sdk::{
	ModuleError, Result,
	context::ModuleContext,
	module::{Instantiation, InstantiationKind, TableModule, VirtualCursor, VirtualTable},
	plan::{ConstraintOp, IndexPlan, PlanRequest, PlanTag},
	sink::ValueSink,
};
use tablekit_type::{RowId, Value};

pub type Row = Vec<Value>;

/// Factory for static in-memory tables.
///
/// Declaration arguments are `[module, catalog, table]`; an optional
/// fourth argument carries a JSON array of rows overriding the module's
/// built-in row set, e.g. `[[1, "alpha"], [2, "beta"]]`.
pub struct StaticRowsModule {
	declaration: String,
	rows: Arc<Vec<Row>>,
}

impl StaticRowsModule {
	pub fn new(declaration: impl Into<String>, rows: Vec<Row>) -> Self {
		Self {
			declaration: declaration.into(),
			rows: Arc::new(rows),
		}
	}
}

impl TableModule for StaticRowsModule {
	fn create_or_connect(
		&self,
		_context: &Arc<ModuleContext>,
		args: &[String],
		_kind: InstantiationKind,
	) -> Result<Instantiation> {
		if args.len() < 3 {
			return Err(ModuleError::new(format!(
				"expected at least 3 declaration arguments (module, catalog, table), got {}",
				args.len()
			)));
		}
		let rows = match args.get(3) {
			Some(document) => Arc::new(parse_rows(document)?),
			None => Arc::clone(&self.rows),
		};
		Ok(Instantiation {
			table: Box::new(StaticRowsTable {
				rows,
			}),
			declaration: self.declaration.clone(),
		})
	}
}

fn parse_rows(document: &str) -> Result<Vec<Row>> {
	let parsed: Vec<Vec<serde_json::Value>> = serde_json::from_str(document)
		.map_err(|err| ModuleError::new(format!("malformed row document: {}", err)))?;
	parsed.into_iter().map(|row| row.into_iter().map(value_from_json).collect()).collect()
}

fn value_from_json(value: serde_json::Value) -> Result<Value> {
	match value {
		serde_json::Value::Null => Ok(Value::Undefined),
		serde_json::Value::Bool(v) => Ok(Value::Boolean(v)),
		serde_json::Value::Number(v) => {
			if let Some(int) = v.as_i64() {
				Ok(Value::Int(int))
			} else if let Some(float) = v.as_f64() {
				Ok(Value::Float(float))
			} else {
				Err(ModuleError::new(format!("unrepresentable number: {}", v)))
			}
		}
		serde_json::Value::String(v) => Ok(Value::Utf8(v)),
		other => Err(ModuleError::new(format!("unsupported cell: {}", other))),
	}
}

struct StaticRowsTable {
	rows: Arc<Vec<Row>>,
}

impl VirtualTable for StaticRowsTable {
	fn plan_index(&self, request: &PlanRequest, plan: &mut IndexPlan) -> Result<()> {
		for (position, constraint) in request.constraints.iter().enumerate() {
			if constraint.usable && constraint.column == 0 && constraint.op == ConstraintOp::Eq {
				plan.usage[position].argument = Some(0);
				plan.usage[position].omit = true;
				plan.tag = PlanTag::new(1, "eq0");
				plan.estimated_cost = 10.0;
				plan.estimated_rows = 1;
				return Ok(());
			}
		}
		plan.tag = PlanTag::new(0, "");
		plan.estimated_cost = self.rows.len() as f64;
		plan.estimated_rows = self.rows.len() as i64;
		Ok(())
	}

	fn open(&self) -> Result<Box<dyn VirtualCursor>> {
		Ok(Box::new(StaticRowsCursor {
			rows: Arc::clone(&self.rows),
			position: 0,
			key: None,
		}))
	}

	fn disconnect(self: Box<Self>) -> Result<()> {
		Ok(())
	}
}

struct StaticRowsCursor {
	rows: Arc<Vec<Row>>,
	position: usize,
	/// Equality key on column 0 when the plan chose the point lookup.
	key: Option<Value>,
}

impl StaticRowsCursor {
	fn skip_unmatched(&mut self) {
		if let Some(key) = &self.key {
			while self.position < self.rows.len() && self.rows[self.position].first() != Some(key) {
				self.position += 1;
			}
		}
	}

	fn current(&self) -> Result<&Row> {
		self.rows.get(self.position).ok_or_else(|| ModuleError::new("cursor is past end-of-data"))
	}
}

impl VirtualCursor for StaticRowsCursor {
	fn filter(&mut self, tag: &PlanTag, args: &[Value]) -> Result<()> {
		self.key = match (tag.number, tag.text.as_str()) {
			(0, "") => None,
			(1, "eq0") => {
				let key = args
					.first()
					.ok_or_else(|| ModuleError::new("plan `eq0` expects one filter argument"))?;
				Some(key.clone())
			}
			_ => {
				return Err(ModuleError::new(format!(
					"unknown plan tag ({}, {:?})",
					tag.number, tag.text
				)));
			}
		};
		self.position = 0;
		self.skip_unmatched();
		Ok(())
	}

	fn advance(&mut self) -> Result<()> {
		self.position += 1;
		self.skip_unmatched();
		Ok(())
	}

	fn at_end(&self) -> bool {
		self.position >= self.rows.len()
	}

	fn read_column(&self, sink: &mut ValueSink, column: usize) -> Result<()> {
		let row = self.current()?;
		let value = row
			.get(column)
			.ok_or_else(|| ModuleError::new(format!("column {} out of range ({} columns)", column, row.len())))?;
		sink.set(value.clone());
		Ok(())
	}

	fn row_id(&self) -> Result<RowId> {
		self.current()?;
		Ok(RowId(self.position as i64))
	}
}

#[cfg(test)]
mod tests {
	use tablekit_type::Value;

	use super::parse_rows;

	#[test]
	fn test_parse_rows_from_json() {
		let rows = parse_rows(r#"[[1, "alpha", null], [2.5, true]]"#).unwrap();
		assert_eq!(rows, vec![
			vec![Value::Int(1), Value::Utf8("alpha".to_string()), Value::Undefined],
			vec![Value::Float(2.5), Value::Boolean(true)],
		]);
	}

	#[test]
	fn test_parse_rows_rejects_nested_documents() {
		let err = parse_rows(r#"[[{"nested": 1}]]"#).unwrap_err();
		assert!(err.message.contains("unsupported cell"));
	}
}
