// SPDX-License-Identifier: Apache-2.0

//! Solving sessions: a tree of assertion contexts backed by a decision
//! procedure and a shared result cache.
//!
//! Contexts live in an arena owned by the session and are addressed by
//! [`ContextId`]. A context's effective assertions (its roots) are its own
//! assertions followed by those of each ancestor up to the root context.

use std::sync::Arc;
use std::time::Duration;

use crate::boolean::Bool;
use crate::bvsmt_error::{BvsmtError, SolverError};
use crate::cache::SolverCache;
use crate::decision_procedure::DecisionProcedure;
use crate::model::{Model, ModelValue};
use crate::query::{Query, QueryKind};
use crate::response_parser::{self, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(usize);

#[derive(Debug, Default)]
struct ContextNode {
    parent: Option<ContextId>,
    assertions: Vec<Bool>,
}

/// Result of deciding a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Unsat,
    /// The model is present for [`QueryKind::Model`] queries.
    Sat(Option<Model>),
}

impl Decision {
    pub fn is_sat(&self) -> bool {
        matches!(self, Decision::Sat(_))
    }
}

pub struct Session {
    contexts: Vec<ContextNode>,
    procedure: Arc<dyn DecisionProcedure>,
    cache: Arc<SolverCache>,
    solve_time: Duration,
}

impl Session {
    /// A session sharing the process-wide cache.
    pub fn new(procedure: Arc<dyn DecisionProcedure>) -> Self {
        Session::with_cache(procedure, SolverCache::global())
    }

    pub fn with_cache(procedure: Arc<dyn DecisionProcedure>, cache: Arc<SolverCache>) -> Self {
        Session {
            contexts: vec![ContextNode::default()],
            procedure,
            cache,
            solve_time: Duration::ZERO,
        }
    }

    /// The context every session starts with.
    pub fn root(&self) -> ContextId {
        ContextId(0)
    }

    pub fn cache(&self) -> &Arc<SolverCache> {
        &self.cache
    }

    /// Duration of the most recent decision procedure run.
    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    fn node(&self, ctx: ContextId) -> &ContextNode {
        self.contexts
            .get(ctx.0)
            .unwrap_or_else(|| panic!("{:?} does not belong to this session", ctx))
    }

    fn node_mut(&mut self, ctx: ContextId) -> &mut ContextNode {
        self.contexts
            .get_mut(ctx.0)
            .unwrap_or_else(|| panic!("{:?} does not belong to this session", ctx))
    }

    pub fn parent(&self, ctx: ContextId) -> Option<ContextId> {
        self.node(ctx).parent
    }

    /// The context's own assertions, excluding inherited ones.
    pub fn assertions(&self, ctx: ContextId) -> &[Bool] {
        &self.node(ctx).assertions
    }

    pub fn add(&mut self, ctx: ContextId, assertion: Bool) {
        log::trace!("{:?} += {}", ctx, assertion);
        self.node_mut(ctx).assertions.push(assertion);
    }

    /// Own assertions first, then each ancestor's, nearest first.
    pub fn roots(&self, ctx: ContextId) -> Vec<Bool> {
        let mut roots = Vec::new();
        let mut current = Some(ctx);
        while let Some(id) = current {
            let node = self.node(id);
            roots.extend(node.assertions.iter().cloned());
            current = node.parent;
        }
        roots
    }

    /// Two empty children of `ctx`. Later additions to a child are invisible
    /// to `ctx` and to the sibling.
    pub fn fork(&mut self, ctx: ContextId) -> (ContextId, ContextId) {
        let _ = self.node(ctx);
        let mut child = || {
            self.contexts.push(ContextNode {
                parent: Some(ctx),
                assertions: Vec::new(),
            });
            ContextId(self.contexts.len() - 1)
        };
        let left = child();
        let right = child();
        log::debug!("fork {:?} -> {:?}, {:?}", ctx, left, right);
        (left, right)
    }

    /// Copies the inherited assertions into `ctx` and detaches it.
    pub fn flatten(&mut self, ctx: ContextId) {
        let roots = self.roots(ctx);
        let node = self.node_mut(ctx);
        node.assertions = roots;
        node.parent = None;
    }

    /// Replaces the context's assertions with one equality per symbol of a
    /// satisfying model and detaches it. Returns `false`, leaving the context
    /// untouched, when it is unsatisfiable.
    pub fn concretise(&mut self, ctx: ContextId) -> Result<bool, BvsmtError> {
        let Some(model) = self.model(ctx, None)? else {
            log::info!("{:?} is unsatisfiable; nothing to concretise", ctx);
            return Ok(false);
        };
        let pinned: Vec<Bool> = model
            .iter()
            .map(|(name, value)| value.pin(name))
            .collect();
        let node = self.node_mut(ctx);
        node.assertions = pinned;
        node.parent = None;
        Ok(true)
    }

    /// Whether the roots of `ctx` together with `extra` are satisfiable.
    pub fn check(&mut self, ctx: ContextId, extra: Option<&Bool>) -> Result<bool, BvsmtError> {
        if let Some(value) = extra.and_then(Bool::value) {
            return Ok(value);
        }
        let query = Query::build(QueryKind::Check, &self.roots(ctx), extra);
        Ok(self.decide(&query)?.is_sat())
    }

    /// A satisfying assignment for the roots of `ctx` together with `extra`,
    /// or `None` when there is none.
    pub fn model(
        &mut self,
        ctx: ContextId,
        extra: Option<&Bool>,
    ) -> Result<Option<Model>, BvsmtError> {
        let query = Query::build(QueryKind::Model, &self.roots(ctx), extra);
        match self.decide(&query)? {
            Decision::Sat(model) => Ok(Some(model.unwrap_or_default())),
            Decision::Unsat => Ok(None),
        }
    }

    /// Decides an already rendered query, consulting the caches first.
    pub fn decide(&mut self, query: &Query) -> Result<Decision, BvsmtError> {
        log::trace!("query {}:\n{}", query.hash(), query.text());
        match query.kind() {
            QueryKind::Check => {
                if let Some(sat) = self.cache.outcome(&query.hash()) {
                    return Ok(if sat { Decision::Sat(None) } else { Decision::Unsat });
                }
            }
            QueryKind::Model => {
                if let Some(model) = self.cache.model(&query.hash()) {
                    return Ok(match model {
                        Some(model) => Decision::Sat(Some(model)),
                        None => Decision::Unsat,
                    });
                }
            }
        }

        let raw = self.cache.raw_output(query, self.procedure.as_ref())?;
        if let Some(elapsed) = raw.solve_time {
            self.solve_time = elapsed;
        }
        let decision = match response_parser::parse_outcome(&raw.text) {
            Some(Outcome::Unsat) => Decision::Unsat,
            Some(Outcome::Sat) if query.kind() == QueryKind::Check => Decision::Sat(None),
            Some(Outcome::Sat) => match response_parser::parse_model(&raw.text) {
                Ok(bindings) => Decision::Sat(Some(complete_model(query, bindings))),
                Err(e) => {
                    self.discard(query);
                    return Err(e.into());
                }
            },
            None => {
                self.discard(query);
                let first_line = raw.text.lines().next().unwrap_or_default();
                return Err(SolverError::new(first_line, query.text()).into());
            }
        };
        log::debug!("{} -> {}", query.hash(), if decision.is_sat() { "sat" } else { "unsat" });

        match (query.kind(), &decision) {
            (QueryKind::Check, _) => self.cache.store_outcome(query.hash(), decision.is_sat()),
            (QueryKind::Model, Decision::Sat(model)) => {
                self.cache.store_model(query.hash(), model.clone())
            }
            (QueryKind::Model, Decision::Unsat) => self.cache.store_model(query.hash(), None),
        }
        Ok(decision)
    }

    fn discard(&self, query: &Query) {
        if let Err(e) = self.cache.discard_artifact(query) {
            log::warn!("could not remove artifact for {}: {}", query.hash(), e);
        }
    }
}

/// Parsed bindings plus placeholder values for declared symbols the solver
/// left out.
fn complete_model(query: &Query, bindings: Vec<(String, ModelValue)>) -> Model {
    let mut model = Model::new();
    for (name, value) in bindings {
        model.insert(name, value);
    }
    for decl in query.symbols() {
        if !model.contains(&decl.name) {
            log::debug!("{} unconstrained; using placeholder", decl.name);
            model.insert(decl.name.clone(), ModelValue::unconstrained(decl));
        }
    }
    model
}
