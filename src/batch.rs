//! Size-aware batch partitioning
//!
//! Each batch is `fixed ++ slice_of(variable)`. A word costs its length plus
//! one byte for the terminating NUL of the argv entry. A batch never holds
//! more than `max_count` words and its cost always stays below `max_bytes`.

use std::ffi::{OsStr, OsString};

use crate::assemble::ArgumentPool;
use crate::error::{Result, RrError};

/// Bytes one word occupies in a process argument vector
pub fn word_cost(word: &OsStr) -> usize {
    word.len() + 1
}

/// Total serialized size of an argument vector
pub fn argv_cost<S: AsRef<OsStr>>(argv: &[S]) -> usize {
    argv.iter().map(|w| word_cost(w.as_ref())).sum()
}

/// One full argument vector for a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub argv: Vec<OsString>,
    /// No parameters remain after this batch
    pub exhausted: bool,
}

impl Batch {
    pub fn program(&self) -> &OsStr {
        &self.argv[0]
    }

    pub fn byte_size(&self) -> usize {
        argv_cost(&self.argv)
    }
}

/// Walks the variable pool, producing batches that respect both limits
#[derive(Debug)]
pub struct Batcher {
    fixed: Vec<OsString>,
    fixed_cost: usize,
    variable: Vec<OsString>,
    cursor: usize,
    max_count: usize,
    max_bytes: usize,
    done: bool,
}

impl Batcher {
    /// Fails when the fixed prefix leaves no room for a single parameter
    pub fn new(pool: ArgumentPool, max_count: usize, max_bytes: usize) -> Result<Self> {
        if pool.fixed.len() >= max_count {
            return Err(RrError::PrefixTooLong {
                max_count,
                words: pool.fixed.len(),
            });
        }
        let fixed_cost = argv_cost(&pool.fixed);
        if fixed_cost >= max_bytes {
            return Err(RrError::CommandTooLong {
                len: fixed_cost,
                budget: max_bytes,
            });
        }
        Ok(Self {
            fixed_cost,
            fixed: pool.fixed,
            variable: pool.variable,
            cursor: 0,
            max_count,
            max_bytes,
            done: false,
        })
    }

    /// Position of the next parameter to place
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.variable.len() - self.cursor
    }

    /// Next batch, or `None` once the exhausted batch has been handed out.
    ///
    /// An empty pool still produces one batch holding the fixed prefix.
    pub fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.done {
            return Ok(None);
        }

        let mut argv = self.fixed.clone();
        let mut current = self.fixed_cost;
        while self.cursor < self.variable.len() && argv.len() < self.max_count {
            let word = &self.variable[self.cursor];
            let cost = word_cost(word);
            if current.saturating_add(cost) >= self.max_bytes {
                break;
            }
            current += cost;
            argv.push(word.clone());
            self.cursor += 1;
        }

        if argv.len() == self.fixed.len() && self.cursor < self.variable.len() {
            return Err(RrError::ArgumentTooLong {
                len: word_cost(&self.variable[self.cursor]),
                budget: self.max_bytes.saturating_sub(self.fixed_cost),
            });
        }

        let exhausted = self.cursor == self.variable.len();
        self.done = exhausted;
        Ok(Some(Batch { argv, exhausted }))
    }
}
