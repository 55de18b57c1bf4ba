// SPDX-License-Identifier: Apache-2.0

//! Bitvector and boolean SMT formulas with eager simplification, plus solving
//! sessions that hand SMT-LIB queries to an external decision procedure and
//! cache what comes back.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bvsmt::{BitVec, ExternalSolver, Session};
//!
//! let mut session = Session::new(Arc::new(ExternalSolver::z3()));
//! let x = BitVec::symbol(8, "x");
//! let root = session.root();
//! session.add(root, x.add(&BitVec::constant(8, 1)).equal(&BitVec::constant(8, 0)));
//! let model = session.model(root, None).unwrap().unwrap();
//! assert_eq!(model.get("x").and_then(|v| v.as_u64()), Some(0xff));
//! ```

pub mod bits;
pub mod bitvector;
pub mod boolean;
pub mod bvsmt_error;
pub mod cache;
pub mod decision_procedure;
mod memo;
pub mod model;
pub mod ops;
pub mod query;
pub mod response_parser;
pub mod session;
pub mod test_utils;

pub use bitvector::{BitVec, BitVecKind};
pub use boolean::{Bool, BoolKind};
pub use bvsmt_error::{BvsmtError, SolverError};
pub use cache::{CacheStats, SolverCache};
pub use decision_procedure::{DecisionProcedure, ExternalSolver, SolverConfig};
pub use memo::{ContentHash, Sort, SymbolDecl};
pub use model::{Model, ModelValue};
pub use ops::{BinaryOperator, ExtensionKind, UnaryOperator};
pub use query::{Query, QueryKind};
pub use response_parser::Outcome;
pub use session::{ContextId, Decision, Session};
