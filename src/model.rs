// SPDX-License-Identifier: Apache-2.0

//! Satisfying assignments returned by a decision procedure.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::bits;
use crate::bitvector::BitVec;
use crate::boolean::Bool;
use crate::memo::{Sort, SymbolDecl};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelValue {
    Bool(bool),
    BitVec { size: usize, value: BigUint },
}

impl ModelValue {
    pub fn bitvec(size: usize, value: impl Into<BigUint>) -> Self {
        ModelValue::BitVec {
            size,
            value: bits::truncate(&value.into(), size),
        }
    }

    /// Value reported for a symbol the solver left out of its model.
    ///
    /// Booleans default to `true`; bitvectors get the `0x23` byte pattern so
    /// that the placeholder is easy to spot.
    pub fn unconstrained(decl: &SymbolDecl) -> Self {
        match decl.sort {
            Sort::Bool => ModelValue::Bool(true),
            Sort::BitVec(size) => ModelValue::BitVec {
                size,
                value: bits::filler(size),
            },
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ModelValue::Bool(value) => Some(*value),
            ModelValue::BitVec { .. } => None,
        }
    }

    pub fn as_biguint(&self) -> Option<&BigUint> {
        match self {
            ModelValue::BitVec { value, .. } => Some(value),
            ModelValue::Bool(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_biguint().and_then(ToPrimitive::to_u64)
    }

    /// The equality that pins symbol `name` to this value.
    pub fn pin(&self, name: &str) -> Bool {
        match self {
            ModelValue::Bool(value) => Bool::symbol(name).equal(&Bool::constant(*value)),
            ModelValue::BitVec { size, value } => {
                BitVec::symbol(*size, name).equal(&BitVec::from_biguint(*size, value))
            }
        }
    }
}

impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelValue::Bool(value) => write!(f, "{}", value),
            ModelValue::BitVec { size, value } => {
                write!(f, "{}", BitVec::from_biguint(*size, value))
            }
        }
    }
}

/// Symbol name to value, iterated in name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    bindings: BTreeMap<String, ModelValue>,
}

impl Model {
    pub fn new() -> Self {
        Model::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ModelValue) -> Option<ModelValue> {
        self.bindings.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&ModelValue> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ModelValue::as_bool)
    }

    pub fn bitvec_value(&self, name: &str) -> Option<&BigUint> {
        self.get(name).and_then(ModelValue::as_biguint)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ModelValue> {
        self.bindings.iter()
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = (&'a String, &'a ModelValue);
    type IntoIter = btree_map::Iter<'a, String, ModelValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.bindings {
            writeln!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}
