//! Pattern filtering for -x / -o / -s regular expressions
//!
//! Patterns always match the whole argument, never a substring.
//! Supports:
//! - POSIX basic syntax (default), translated to `regex` crate syntax
//! - Extended syntax with -E
//! - Case-insensitive matching with -i
//!
//! Arguments are matched as raw bytes, so `.` also matches bytes that are
//! not valid UTF-8. Case folding is ASCII only.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use regex::bytes::{Regex, RegexBuilder};

use crate::error::{Result, RrError};

/// Regular expression dialect used for user patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// POSIX basic regular expressions: `\(` `\)` group, `+ ? | ( ) { }` are literal
    #[default]
    Basic,
    /// Extended regular expressions, passed through unchanged
    Extended,
}

/// Compilation attributes shared by every pattern of a run
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternOptions {
    pub syntax: Syntax,
    pub ignore_case: bool,
}

/// An ordered set of compiled whole-string patterns
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one
    pub fn new<S: AsRef<str>>(patterns: &[S], options: PatternOptions) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| compile(p.as_ref(), options))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if `candidate` matches at least one pattern of the set
    pub fn any_match<S: AsRef<OsStr> + ?Sized>(&self, candidate: &S) -> bool {
        let bytes = candidate.as_ref().as_bytes();
        self.patterns.iter().any(|r| r.is_match(bytes))
    }
}

fn compile(pattern: &str, options: PatternOptions) -> Result<Regex> {
    let body = match options.syntax {
        Syntax::Basic => basic_to_extended(pattern),
        Syntax::Extended => pattern.to_string(),
    };
    RegexBuilder::new(&format!("^(?:{})$", body))
        .case_insensitive(options.ignore_case)
        .unicode(false)
        .build()
        .map_err(|source| RrError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Translate a POSIX basic regular expression into `regex` crate syntax.
///
/// Unsupported constructs (back-references) are passed through and rejected
/// by the regex compiler.
pub fn basic_to_extended(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    // a `*` here is a literal star
    let mut at_start = true;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(e @ ('(' | ')' | '{' | '}')) => {
                    out.push(e);
                    at_start = e == '(';
                    continue;
                }
                Some(e) => {
                    out.push('\\');
                    out.push(e);
                }
                None => out.push('\\'),
            },
            '(' | ')' | '{' | '}' | '+' | '?' | '|' => {
                out.push('\\');
                out.push(c);
            }
            '*' if at_start => out.push_str("\\*"),
            '^' if at_start => {
                out.push('^');
                continue;
            }
            '[' => copy_bracket(&mut chars, &mut out),
            _ => out.push(c),
        }
        at_start = false;
    }
    out
}

/// Copy a bracket expression, escaping what `regex` would treat specially
fn copy_bracket<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>, out: &mut String) {
    out.push('[');
    if chars.peek() == Some(&'^') {
        chars.next();
        out.push('^');
    }
    if chars.peek() == Some(&']') {
        chars.next();
        out.push_str("\\]");
    }
    while let Some(c) = chars.next() {
        match c {
            ']' => {
                out.push(']');
                return;
            }
            '[' if chars.peek() == Some(&':') => {
                // character class name, e.g. [:alpha:]
                out.push('[');
                for n in chars.by_ref() {
                    out.push(n);
                    if n == ']' {
                        break;
                    }
                }
            }
            '\\' | '[' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
}

/// Keep/drop decision over an exclude set and an optional only set
#[derive(Debug, Clone, Default)]
pub struct Filter {
    exclude: PatternSet,
    only: PatternSet,
}

impl Filter {
    pub fn new(exclude: PatternSet, only: PatternSet) -> Self {
        Self { exclude, only }
    }

    /// A filter that keeps everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn exclude(&self) -> &PatternSet {
        &self.exclude
    }

    /// Exclusion wins over inclusion; an empty only set admits everything
    pub fn keep<S: AsRef<OsStr> + ?Sized>(&self, candidate: &S) -> bool {
        if self.exclude.any_match(candidate) {
            return false;
        }
        self.only.is_empty() || self.only.any_match(candidate)
    }
}
