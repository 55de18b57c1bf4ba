// SPDX-License-Identifier: Apache-2.0

//! Per-node memoized data: canonical text, content hash and free symbols.
//!
//! Nodes are immutable once built, so each value is computed at most once and
//! then shared by every holder of the node.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

/// blake3 digest of a canonical SMT-LIB rendering.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct ContentHash(pub blake3::Hash);

impl ContentHash {
    pub fn of_text(text: &str) -> Self {
        ContentHash(blake3::hash(text.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sort {
    Bool,
    BitVec(usize),
}

/// A free symbol together with the sort it must be declared with.
///
/// Ordered by name first so that declarations come out in a stable order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolDecl {
    pub name: String,
    pub sort: Sort,
}

impl SymbolDecl {
    pub fn bool(name: impl Into<String>) -> Self {
        SymbolDecl {
            name: name.into(),
            sort: Sort::Bool,
        }
    }

    pub fn bitvec(name: impl Into<String>, size: usize) -> Self {
        SymbolDecl {
            name: name.into(),
            sort: Sort::BitVec(size),
        }
    }

    pub fn declaration(&self) -> String {
        match self.sort {
            Sort::Bool => format!("(declare-fun {} () Bool)", self.name),
            Sort::BitVec(size) => format!("(declare-fun {} () (_ BitVec {}))", self.name, size),
        }
    }
}

#[derive(Default)]
pub(crate) struct Memo {
    serialized: OnceCell<String>,
    hash: OnceCell<ContentHash>,
    symbols: OnceCell<Arc<BTreeSet<SymbolDecl>>>,
}

impl Memo {
    pub(crate) fn serialized(&self, render: impl FnOnce() -> String) -> &str {
        self.serialized.get_or_init(render)
    }

    pub(crate) fn content_hash(&self, text: &str) -> ContentHash {
        *self.hash.get_or_init(|| ContentHash::of_text(text))
    }

    pub(crate) fn symbols(
        &self,
        collect: impl FnOnce() -> BTreeSet<SymbolDecl>,
    ) -> Arc<BTreeSet<SymbolDecl>> {
        Arc::clone(self.symbols.get_or_init(|| Arc::new(collect())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_computes_once() {
        let memo = Memo::default();
        let mut calls = 0;
        assert_eq!(
            memo.serialized(|| {
                calls += 1;
                "x".to_string()
            }),
            "x"
        );
        assert_eq!(memo.serialized(|| unreachable!()), "x");
        assert_eq!(calls, 1);
        assert_eq!(memo.content_hash("x"), ContentHash::of_text("x"));
    }

    #[test]
    fn test_declarations_sort_by_name() {
        let mut decls = BTreeSet::new();
        decls.insert(SymbolDecl::bitvec("y", 8));
        decls.insert(SymbolDecl::bool("a"));
        decls.insert(SymbolDecl::bitvec("b", 32));
        let rendered: Vec<String> = decls.iter().map(SymbolDecl::declaration).collect();
        assert_eq!(
            rendered,
            vec![
                "(declare-fun a () Bool)",
                "(declare-fun b () (_ BitVec 32))",
                "(declare-fun y () (_ BitVec 8))",
            ]
        );
    }
}
