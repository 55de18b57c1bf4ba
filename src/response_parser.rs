// SPDX-License-Identifier: Apache-2.0

//! Parser for decision procedure output.
//!
//! The output starts with an outcome token. Model queries follow a `sat`
//! outcome with the assignment:
//!
//! ```text
//! model    := "(" "model"? binding* ")"
//! binding  := "(" "define-fun" symbol "(" ")" sort value ")"
//! sort     := "Bool" | "(" "_" "BitVec" numeral ")"
//! value    := "true" | "false" | "#x" hex+ | "#b" bin+ | "(" "_" "bv" numeral numeral ")"
//! ```
//!
//! Definitions that take arguments or have other sorts are skipped.

use num_bigint::BigUint;

use crate::model::ModelValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sat,
    Unsat,
}

/// Reads the outcome token at the very start of `output`.
///
/// Anything else (an `(error ...)` line, `unknown`, an empty file) yields
/// `None`. The check is case sensitive.
pub fn parse_outcome(output: &str) -> Option<Outcome> {
    if output.starts_with("unsat") {
        Some(Outcome::Unsat)
    } else if output.starts_with("sat") {
        Some(Outcome::Sat)
    } else {
        None
    }
}

/// Parses the bindings that follow a `sat` outcome.
pub fn parse_model(output: &str) -> Result<Vec<(String, ModelValue)>, ParseError> {
    let mut parser = Parser::new(output);
    parser.drop_keyword_or_error("sat", "model response")?;
    parser.parse_bindings()
}

#[derive(Debug)]
pub struct ParseError {
    msg: String,
}

impl ParseError {
    fn new(msg: String) -> Self {
        Self { msg }
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseError: {}", self.msg)
    }
}

impl std::error::Error for ParseError {}

pub struct Parser {
    chars: Vec<char>,
    offset: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            offset: 0,
        }
    }

    fn current_line(&self) -> String {
        let offset = self.offset.min(self.chars.len());
        let start = self.chars[..offset]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1);
        let end = self.chars[offset..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(self.chars.len(), |i| offset + i);
        self.chars[start..end].iter().collect()
    }

    fn line_number(&self) -> usize {
        let offset = self.offset.min(self.chars.len());
        self.chars[..offset].iter().filter(|&&c| c == '\n').count() + 1
    }

    fn error(&self, msg: String) -> ParseError {
        ParseError::new(format!(
            "{} at line {}: {:?}",
            msg,
            self.line_number(),
            self.current_line()
        ))
    }

    fn at_eof(&mut self) -> bool {
        self.drop_whitespace_and_comments();
        self.offset >= self.chars.len()
    }

    fn drop_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peekc() {
            if c.is_ascii_whitespace() {
                self.offset += 1;
            } else if c == ';' {
                while let Some(c) = self.popc() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peekc(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    fn popc(&mut self) -> Option<char> {
        let c = self.peekc();
        if c.is_some() {
            self.offset += 1;
        }
        c
    }

    fn peek_is(&self, s: &str) -> bool {
        let mut index = self.offset;
        for c in s.chars() {
            if self.chars.get(index) != Some(&c) {
                return false;
            }
            index += 1;
        }
        true
    }

    fn is_symbol_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || "~!@$%^&*_-+=<>.?/".contains(c)
    }

    fn peek_keyword_is(&self, kw: &str) -> bool {
        self.peek_is(kw)
            && self
                .chars
                .get(self.offset + kw.chars().count())
                .map_or(true, |&c| !Self::is_symbol_char(c))
    }

    fn try_drop_keyword(&mut self, kw: &str) -> bool {
        self.drop_whitespace_and_comments();
        if self.peek_keyword_is(kw) {
            self.offset += kw.chars().count();
            true
        } else {
            false
        }
    }

    fn drop_keyword_or_error(&mut self, kw: &str, ctx: &str) -> Result<(), ParseError> {
        if self.try_drop_keyword(kw) {
            Ok(())
        } else {
            Err(self.error(format!("expected keyword {:?} in {}", kw, ctx)))
        }
    }

    fn try_drop(&mut self, s: &str) -> bool {
        self.drop_whitespace_and_comments();
        if self.peek_is(s) {
            self.offset += s.chars().count();
            true
        } else {
            false
        }
    }

    fn drop_or_error(&mut self, s: &str, ctx: &str) -> Result<(), ParseError> {
        if self.try_drop(s) {
            Ok(())
        } else {
            Err(self.error(format!("expected {:?} in {}", s, ctx)))
        }
    }

    /// Plain symbols and `|quoted|` symbols; quotes are stripped.
    fn pop_symbol_or_error(&mut self, ctx: &str) -> Result<String, ParseError> {
        self.drop_whitespace_and_comments();
        let mut symbol = String::new();
        if self.try_drop("|") {
            loop {
                match self.popc() {
                    Some('|') => return Ok(symbol),
                    Some(c) => symbol.push(c),
                    None => return Err(self.error(format!("unterminated |symbol| in {}", ctx))),
                }
            }
        }
        while let Some(c) = self.peekc() {
            if !Self::is_symbol_char(c) {
                break;
            }
            symbol.push(c);
            self.offset += 1;
        }
        if symbol.is_empty() {
            return Err(self.error(format!("expected symbol in {}", ctx)));
        }
        Ok(symbol)
    }

    fn pop_digits(&mut self, radix: u32) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peekc() {
            if !c.is_digit(radix) {
                break;
            }
            digits.push(c);
            self.offset += 1;
        }
        digits
    }

    fn pop_number_usize_or_error(&mut self, ctx: &str) -> Result<usize, ParseError> {
        self.drop_whitespace_and_comments();
        let digits = self.pop_digits(10);
        digits
            .parse::<usize>()
            .map_err(|e| self.error(format!("in {} expected numeral, got {:?}: {}", ctx, digits, e)))
    }

    /// Skips one balanced s-expression or atom.
    fn skip_sexpr(&mut self) -> Result<(), ParseError> {
        self.drop_whitespace_and_comments();
        if !self.try_drop("(") {
            self.pop_symbol_or_error("skipped term")?;
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.popc() {
                Some('(') => depth += 1,
                Some(')') => depth -= 1,
                Some('|') => {
                    while !matches!(self.popc(), Some('|') | None) {}
                }
                Some(_) => {}
                None => return Err(self.error("unbalanced parentheses".to_string())),
            }
        }
        Ok(())
    }

    pub fn parse_bindings(&mut self) -> Result<Vec<(String, ModelValue)>, ParseError> {
        let mut bindings = Vec::new();
        if self.at_eof() {
            return Ok(bindings);
        }
        self.drop_or_error("(", "model")?;
        self.try_drop_keyword("model");
        while !self.try_drop(")") {
            if self.at_eof() {
                return Err(self.error("unterminated model".to_string()));
            }
            if let Some(binding) = self.parse_binding()? {
                bindings.push(binding);
            }
        }
        Ok(bindings)
    }

    fn parse_binding(&mut self) -> Result<Option<(String, ModelValue)>, ParseError> {
        self.drop_whitespace_and_comments();
        let start = self.offset;
        if !self.try_drop("(") || !self.try_drop_keyword("define-fun") {
            self.offset = start;
            self.skip_sexpr()?;
            return Ok(None);
        }
        let name = self.pop_symbol_or_error("define-fun name")?;
        self.drop_or_error("(", "define-fun arguments")?;
        if !self.try_drop(")") {
            log::trace!("skipping model function {} that takes arguments", name);
            self.offset = start;
            self.skip_sexpr()?;
            return Ok(None);
        }

        let value = if self.try_drop_keyword("Bool") {
            let value = if self.try_drop_keyword("true") {
                true
            } else if self.try_drop_keyword("false") {
                false
            } else {
                return Err(self.error(format!("expected boolean value for {}", name)));
            };
            ModelValue::Bool(value)
        } else if self.peek_is("(") {
            self.drop_or_error("(", "sort")?;
            self.drop_keyword_or_error("_", "sort")?;
            if !self.try_drop_keyword("BitVec") {
                self.offset = start;
                self.skip_sexpr()?;
                return Ok(None);
            }
            let size = self.pop_number_usize_or_error("BitVec width")?;
            self.drop_or_error(")", "sort")?;
            let value = self.pop_bitvec_literal_or_error(&name)?;
            ModelValue::bitvec(size, value)
        } else {
            self.offset = start;
            self.skip_sexpr()?;
            return Ok(None);
        };
        self.drop_or_error(")", "define-fun")?;
        Ok(Some((name, value)))
    }

    fn pop_bitvec_literal_or_error(&mut self, name: &str) -> Result<BigUint, ParseError> {
        self.drop_whitespace_and_comments();
        let (radix, digits) = if self.try_drop("#x") {
            (16, self.pop_digits(16))
        } else if self.try_drop("#b") {
            (2, self.pop_digits(2))
        } else if self.try_drop("(") {
            self.drop_keyword_or_error("_", "bitvector literal")?;
            self.drop_whitespace_and_comments();
            if !self.peek_is("bv") {
                return Err(self.error(format!("expected bvN literal for {}", name)));
            }
            self.offset += 2;
            let digits = self.pop_digits(10);
            self.pop_number_usize_or_error("bitvector literal width")?;
            self.drop_or_error(")", "bitvector literal")?;
            (10, digits)
        } else {
            return Err(self.error(format!("expected bitvector literal for {}", name)));
        };
        BigUint::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| self.error(format!("malformed bitvector literal for {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_outcome() {
        assert_eq!(parse_outcome("sat\n"), Some(Outcome::Sat));
        assert_eq!(parse_outcome("unsat\n"), Some(Outcome::Unsat));
        assert_eq!(parse_outcome("unknown\n"), None);
        assert_eq!(parse_outcome("SAT\n"), None);
        assert_eq!(parse_outcome(""), None);
        assert_eq!(
            parse_outcome("(error \"line 1 column 2: unknown constant\")\n"),
            None
        );
    }

    #[test]
    fn test_parse_model_z3_layout() {
        let output = "sat\n(\n  (define-fun y () Bool\n    false)\n  (define-fun x () (_ BitVec 8)\n    #xff)\n)\n";
        let bindings = parse_model(output).unwrap();
        assert_eq!(
            bindings,
            vec![
                ("y".to_string(), ModelValue::Bool(false)),
                ("x".to_string(), ModelValue::bitvec(8, 0xffu32)),
            ]
        );
    }

    #[test]
    fn test_parse_model_legacy_layout_and_literals() {
        let output = "sat\n(model\n  (define-fun a () (_ BitVec 3) #b101)\n  (define-fun |odd name| () (_ BitVec 16) (_ bv258 16))\n  (define-fun p () Bool true)\n)\n";
        let bindings = parse_model(output).unwrap();
        assert_eq!(
            bindings,
            vec![
                ("a".to_string(), ModelValue::bitvec(3, 5u32)),
                ("odd name".to_string(), ModelValue::bitvec(16, 258u32)),
                ("p".to_string(), ModelValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_parse_model_skips_other_definitions() {
        let output = "sat\n(\n  ; comment\n  (define-fun f ((x!0 (_ BitVec 8))) (_ BitVec 8) (bvadd x!0 #x01))\n  (define-fun r () Real 1.0)\n  (define-fun x () (_ BitVec 4) #xa)\n)\n";
        let bindings = parse_model(output).unwrap();
        assert_eq!(bindings, vec![("x".to_string(), ModelValue::bitvec(4, 0xau32))]);
    }

    #[test]
    fn test_parse_model_empty() {
        assert_eq!(parse_model("sat\n(\n)\n").unwrap(), vec![]);
        assert_eq!(parse_model("sat\n").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_model_errors() {
        let err = parse_model("sat\n(\n  (define-fun x () (_ BitVec 8) #xzz)\n)\n").unwrap_err();
        assert!(err.message().contains("x"), "{}", err);
        assert!(parse_model("sat\n(\n  (define-fun p () Bool maybe)\n)\n").is_err());
        assert!(parse_model("sat\n(\n  (define-fun p () Bool true)\n").is_err());
        assert!(parse_model("unsat\n").is_err());
    }
}
