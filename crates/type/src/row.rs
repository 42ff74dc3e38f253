// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// 64-bit identifier of a row within one virtual table.
///
/// The dispatch layer never interprets row ids; they are produced by the
/// table implementation and handed back to the engine verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub i64);

impl Display for RowId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<i64> for RowId {
	fn from(v: i64) -> Self {
		RowId(v)
	}
}
