//! Argument assembly: fixed command prefix plus the variable pool

use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::{Result, RrError};
use crate::expand::{expand, ExpandMode};

/// Separates command options from the parameters to batch through
pub const SEPARATOR: &str = "--";

/// The full argument set of a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentPool {
    /// Command name and options, identical in every batch
    pub fixed: Vec<OsString>,
    /// Parameters to filter, randomize and batch
    pub variable: Vec<OsString>,
}

/// Split raw tokens into command prefix and parameters.
///
/// Without a separator the prefix is the command name alone. With one, the
/// prefix runs up to the first `--`, which is kept only if `keep_separator`.
pub fn split_command(
    mut tokens: Vec<OsString>,
    keep_separator: bool,
) -> (Vec<OsString>, Vec<OsString>) {
    if tokens.is_empty() {
        return (tokens, Vec::new());
    }
    match tokens[1..].iter().position(|t| t == SEPARATOR) {
        Some(pos) => {
            let sep = pos + 1;
            let rest = tokens.split_off(sep + 1);
            if !keep_separator {
                tokens.pop();
            }
            (tokens, rest)
        }
        None => {
            let rest = tokens.split_off(1);
            (tokens, rest)
        }
    }
}

/// Build the argument pool from positional tokens and list-file lines.
///
/// Order of operations on the parameters: directory expansion, start
/// marker cutoff, filtering, replication.
pub fn assemble(tokens: Vec<OsString>, config: &Config) -> Result<ArgumentPool> {
    let (fixed, params) = if config.dry_run {
        (Vec::new(), tokens)
    } else {
        if tokens.is_empty() {
            return Err(RrError::MissingCommand);
        }
        split_command(tokens, config.keep_separator)
    };

    let mut params = if config.expand == ExpandMode::None {
        params
    } else {
        expand_all(params, config)?
    };

    if !config.start.is_empty() {
        if let Some(last) = params.iter().rposition(|p| config.start.any_match(p)) {
            debug!("start marker {:?} at position {}", params[last], last);
            params.drain(..last);
        }
    }

    params.retain(|p| config.filter.keep(p));

    let mut variable = Vec::with_capacity(params.len() * config.replicate);
    for _ in 0..config.replicate {
        variable.extend_from_slice(&params);
    }

    if variable.is_empty() {
        if config.just_one {
            return Err(RrError::NoArguments { mode: "-1" });
        }
        if config.mode.needs_arguments() {
            return Err(RrError::NoArguments {
                mode: config.mode.name(),
            });
        }
    }

    debug!(
        "assembled {} fixed and {} variable arguments",
        fixed.len(),
        variable.len()
    );
    Ok(ArgumentPool { fixed, variable })
}

fn expand_all(params: Vec<OsString>, config: &Config) -> Result<Vec<OsString>> {
    let mut out = Vec::with_capacity(params.len());
    for p in params {
        if Path::new(&p).is_dir() {
            // excluded directories are not even looked into
            if config.filter.exclude().any_match(&p) {
                debug!("skipping excluded directory {:?}", p);
                continue;
            }
            out.extend(expand(&p, config.expand)?);
        } else {
            out.push(p);
        }
    }
    Ok(out)
}
