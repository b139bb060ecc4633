//! Test doubles for the script execution seam.
//!
//! [`WriteEngine`] is a deliberately tiny interpreter — just enough
//! language to exercise the write-capture pipeline without a real script
//! engine. It understands a sequence of statements:
//!
//! ```text
//! write("literal");            // emit through the write sink
//! write('<scr' + 'ipt>');      // literals concatenate with +
//! sleep(25);                   // hold the session for N milliseconds
//! fail("reason");              // raise an eval error
//! ```
//!
//! String literals take single or double quotes and the usual backslash
//! escapes. Anything else is an eval error, which the pipeline is expected
//! to swallow.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use script::{Engine, EvalError, Loader, sink};

pub struct WriteEngine;

impl Engine for WriteEngine {
    fn eval(&self, code: &str) -> Result<(), EvalError> {
        let mut parser = Parser::new(code);
        parser.skip_ws();
        while !parser.at_end() {
            let name = parser.ident()?;
            parser.expect('(')?;
            parser.skip_ws();
            match name.as_str() {
                "write" => {
                    let text = if parser.peek() == Some(')') {
                        String::new()
                    } else {
                        parser.string_expr()?
                    };
                    parser.expect(')')?;
                    sink::write(&text);
                }
                "sleep" => {
                    let millis = parser.number()?;
                    parser.expect(')')?;
                    std::thread::sleep(Duration::from_millis(millis));
                }
                "fail" => {
                    let message = if parser.peek() == Some(')') {
                        "fail()".to_string()
                    } else {
                        parser.string_expr()?
                    };
                    parser.expect(')')?;
                    return Err(EvalError(message));
                }
                other => {
                    return Err(EvalError(format!("unknown function `{other}`")));
                }
            }
            parser.skip_ws();
            if parser.peek() == Some(';') {
                parser.bump();
            }
            parser.skip_ws();
        }
        Ok(())
    }
}

/// A canned in-memory [`Loader`]: URL → script body (or an error string).
/// URLs with no entry fail with "no such url".
#[derive(Default)]
pub struct StaticLoader {
    entries: HashMap<String, Result<String, String>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, url: &str, code: &str) -> Self {
        self.entries.insert(url.to_string(), Ok(code.to_string()));
        self
    }

    pub fn with_failure(mut self, url: &str, error: &str) -> Self {
        self.entries.insert(url.to_string(), Err(error.to_string()));
        self
    }
}

impl Loader for StaticLoader {
    fn fetch(&self, url: &str, done: Arc<dyn Fn(Result<String, String>) + Send + Sync>) {
        let result = self
            .entries
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(format!("no such url: {url}")));
        // Deliver on another thread, like a real fetch would.
        std::thread::spawn(move || done(result));
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(code: &'a str) -> Self {
        Self {
            chars: code.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Result<String, EvalError> {
        let mut out = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            out.push(self.bump().expect("peeked"));
        }
        if out.is_empty() {
            return Err(EvalError(format!(
                "expected identifier, found {:?}",
                self.peek()
            )));
        }
        Ok(out)
    }

    fn expect(&mut self, want: char) -> Result<(), EvalError> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            got => Err(EvalError(format!("expected `{want}`, found {got:?}"))),
        }
    }

    fn number(&mut self) -> Result<u64, EvalError> {
        self.skip_ws();
        let mut out = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            out.push(self.bump().expect("peeked"));
        }
        out.parse()
            .map_err(|_| EvalError("expected a number".to_string()))
    }

    /// One or more string literals joined by `+`.
    fn string_expr(&mut self) -> Result<String, EvalError> {
        let mut out = self.string_literal()?;
        loop {
            self.skip_ws();
            if self.peek() == Some('+') {
                self.bump();
                out.push_str(&self.string_literal()?);
            } else {
                return Ok(out);
            }
        }
    }

    fn string_literal(&mut self) -> Result<String, EvalError> {
        self.skip_ws();
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            got => return Err(EvalError(format!("expected string literal, found {got:?}"))),
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('\\' | '"' | '\'')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(EvalError("unterminated escape".to_string())),
                },
                Some(c) => out.push(c),
                None => return Err(EvalError("unterminated string literal".to_string())),
            }
        }
    }
}
