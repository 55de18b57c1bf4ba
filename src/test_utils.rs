// SPDX-License-Identifier: Apache-2.0

//! Helpers for exercising sessions without a real solver.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::decision_procedure::DecisionProcedure;

type Responder = Box<dyn Fn(&str) -> io::Result<String> + Send + Sync>;

/// A decision procedure that answers from a script and counts how many
/// times it was asked.
pub struct ScriptedProcedure {
    respond: Responder,
    invocations: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedProcedure {
    /// `respond` maps query text to the solver output.
    pub fn new(respond: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        ScriptedProcedure {
            respond: Box::new(move |query| Ok(respond(query))),
            invocations: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Gives the same output for every query.
    pub fn constant(output: &str) -> Self {
        let output = output.to_string();
        ScriptedProcedure::new(move |_| output.clone())
    }

    /// Fails every run as though the solver could not be started.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        ScriptedProcedure {
            respond: Box::new(move |_| Err(io::Error::new(io::ErrorKind::Other, message.clone()))),
            invocations: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Text of every query received, oldest first.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl DecisionProcedure for ScriptedProcedure {
    fn run(&self, query_path: &Path, output_path: &Path) -> io::Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let query = std::fs::read_to_string(query_path)?;
        self.queries.lock().unwrap().push(query.clone());
        let output = (self.respond)(&query)?;
        std::fs::write(output_path, output)
    }
}
