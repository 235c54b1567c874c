//! Command line byte budget of the host
//!
//! `ARG_MAX` covers argv and envp together, and the kernel may resolve
//! argv[0] through `PATH`, so the usable room for arguments is:
//!
//! `ARG_MAX - PATH_MAX - sum(len(env entry) + 1) - margin`

use nix::unistd::{pathconf, sysconf, PathconfVar, SysconfVar};
use tracing::debug;

use crate::error::{Result, RrError};

/// Source of the maximum serialized argv size for one command
pub trait ByteBudget {
    fn available(&self) -> Result<usize>;
}

/// Budget derived from the running system and environment
#[derive(Debug, Clone, Copy, Default)]
pub struct HostBudget {
    /// Extra bytes kept in reserve
    pub margin: usize,
}

impl HostBudget {
    pub fn new(margin: usize) -> Self {
        Self { margin }
    }
}

impl ByteBudget for HostBudget {
    fn available(&self) -> Result<usize> {
        let arg_max = sysconf(SysconfVar::ARG_MAX)
            .map_err(|e| RrError::Budget(format!("sysconf(ARG_MAX): {}", e)))?
            .ok_or_else(|| RrError::Budget("ARG_MAX is indeterminate".to_string()))?;
        let path_max = pathconf("/", PathconfVar::PATH_MAX)
            .map_err(|e| RrError::Budget(format!("pathconf(PATH_MAX): {}", e)))?
            .unwrap_or(0);

        let env_size = environment_size();
        let budget = usable(arg_max as usize, path_max as usize, env_size, self.margin);
        debug!(
            "byte budget {} (ARG_MAX {}, PATH_MAX {}, env {}, margin {})",
            budget, arg_max, path_max, env_size, self.margin
        );
        Ok(budget)
    }
}

/// Bytes used by the environment block, one terminator per `KEY=VALUE`
pub fn environment_size() -> usize {
    std::env::vars_os()
        .map(|(k, v)| k.len() + 1 + v.len() + 1)
        .sum()
}

fn usable(arg_max: usize, path_max: usize, env_size: usize, margin: usize) -> usize {
    arg_max
        .saturating_sub(path_max)
        .saturating_sub(env_size)
        .saturating_sub(margin)
}
