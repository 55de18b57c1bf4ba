// SPDX-License-Identifier: Apache-2.0

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::response_parser::ParseError;

static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"line (\d+) column (\d+): ([^\n]+)").expect("location pattern is valid")
});

/// The decision procedure produced neither `sat` nor `unsat`.
#[derive(Debug)]
pub struct SolverError {
    error: String,
    query: String,
}

/// Position reported by the solver, 1-based, with its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverErrorLocation {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SolverError {
    pub fn new(error: impl Into<String>, query: impl Into<String>) -> Self {
        SolverError {
            error: error.into(),
            query: query.into(),
        }
    }

    /// First line of the solver's output.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Full text of the query that was submitted.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn location(&self) -> Option<SolverErrorLocation> {
        let captures = LOCATION_RE.captures(&self.error)?;
        Some(SolverErrorLocation {
            line: captures[1].parse().ok()?,
            column: captures[2].parse().ok()?,
            message: captures[3].trim_end_matches(['"', ')']).to_string(),
        })
    }

    fn highlighted_line(&self, location: &SolverErrorLocation) -> Option<String> {
        let line = self.query.lines().nth(location.line.checked_sub(1)?)?;
        let chars: Vec<char> = line.chars().collect();
        let at = location.column.saturating_sub(1).min(chars.len());
        let before: String = chars[..at].iter().collect();
        let (marked, after) = match chars.get(at) {
            Some(c) => (c.to_string(), chars[at + 1..].iter().collect::<String>()),
            None => (String::new(), String::new()),
        };
        Some(format!(
            "{}{}{}",
            before.blue(),
            marked.red().bold(),
            after.blue()
        ))
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.location() {
            Some(location) => {
                write!(
                    f,
                    "solver error at line {} column {}: {}",
                    location.line, location.column, location.message
                )?;
                if let Some(line) = self.highlighted_line(&location) {
                    write!(f, "\n  {}", line)?;
                }
                Ok(())
            }
            None => write!(f, "solver error: {}", self.error),
        }
    }
}

impl std::error::Error for SolverError {}

#[derive(Debug)]
pub enum BvsmtError {
    /// A node was built with an operator tag that its sort does not accept.
    InvalidExpression(String),
    Solver(SolverError),
    Parse(ParseError),
    Io(std::io::Error),
}

impl std::fmt::Display for BvsmtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BvsmtError::InvalidExpression(msg) => write!(f, "invalid expression: {}", msg),
            BvsmtError::Solver(e) => write!(f, "{}", e),
            BvsmtError::Parse(e) => write!(f, "{}", e),
            BvsmtError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for BvsmtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BvsmtError::InvalidExpression(_) => None,
            BvsmtError::Solver(e) => Some(e),
            BvsmtError::Parse(e) => Some(e),
            BvsmtError::Io(e) => Some(e),
        }
    }
}

impl From<SolverError> for BvsmtError {
    fn from(e: SolverError) -> Self {
        BvsmtError::Solver(e)
    }
}

impl From<ParseError> for BvsmtError {
    fn from(e: ParseError) -> Self {
        BvsmtError::Parse(e)
    }
}

impl From<std::io::Error> for BvsmtError {
    fn from(e: std::io::Error) -> Self {
        BvsmtError::Io(e)
    }
}
