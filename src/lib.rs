//! rr - run a command over a shuffled, filtered list of arguments
//!
//! This library provides the core of the `rr` tool: argument assembly and
//! filtering, randomization, size-aware batching against the host command
//! line limit, and sequential supervision of the launched commands.

pub mod assemble;
pub mod batch;
pub mod budget;
pub mod cli;
pub mod config;
pub mod error;
pub mod expand;
pub mod filter;
pub mod listfile;
pub mod randomize;
pub mod runner;
pub mod supervisor;

pub use error::{Result, RrError};
