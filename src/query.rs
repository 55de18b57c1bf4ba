// SPDX-License-Identifier: Apache-2.0

//! SMT-LIB text submitted to a decision procedure.

use std::collections::BTreeSet;

use crate::boolean::Bool;
use crate::memo::{ContentHash, SymbolDecl};

pub const LOGIC_HEADER: &str = "(set-logic QF_BV)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Satisfiability only.
    Check,
    /// Satisfiability followed by `(get-model)`.
    Model,
}

impl QueryKind {
    /// File extension of the cached solver output for this kind of query.
    pub fn artifact_extension(self) -> &'static str {
        match self {
            QueryKind::Check => "check",
            QueryKind::Model => "model",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    kind: QueryKind,
    text: String,
    hash: ContentHash,
    symbols: BTreeSet<SymbolDecl>,
}

impl Query {
    /// Renders `roots` plus the optional `extra` assertion, which goes last.
    pub fn build(kind: QueryKind, roots: &[Bool], extra: Option<&Bool>) -> Query {
        let assertions: Vec<&Bool> = roots.iter().chain(extra).collect();
        let mut symbols = BTreeSet::new();
        for assertion in &assertions {
            symbols.extend(assertion.free_symbols().iter().cloned());
        }

        let mut lines = vec![LOGIC_HEADER.to_string()];
        lines.extend(symbols.iter().map(SymbolDecl::declaration));
        lines.extend(
            assertions
                .iter()
                .map(|assertion| format!("(assert {})", assertion.serialize())),
        );
        let text = Query::with_directives(kind, lines.join("\n") + "\n");
        Query::from_parts(kind, text, symbols)
    }

    /// Wraps caller-provided SMT-LIB text, appending `(check-sat)` and
    /// `(get-model)` when they are missing.
    pub fn from_text(kind: QueryKind, text: &str) -> Query {
        let mut text = text.to_string();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        Query::from_parts(kind, Query::with_directives(kind, text), BTreeSet::new())
    }

    fn with_directives(kind: QueryKind, mut text: String) -> String {
        if !text.contains("(check-sat)") {
            text.push_str("(check-sat)\n");
        }
        if kind == QueryKind::Model && !text.contains("(get-model)") {
            text.push_str("(get-model)\n");
        }
        text
    }

    fn from_parts(kind: QueryKind, text: String, symbols: BTreeSet<SymbolDecl>) -> Query {
        let hash = ContentHash::of_text(&text);
        Query {
            kind,
            text,
            hash,
            symbols,
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Free symbols declared by the query. Empty for queries built with
    /// [`Query::from_text`].
    pub fn symbols(&self) -> &BTreeSet<SymbolDecl> {
        &self.symbols
    }
}
