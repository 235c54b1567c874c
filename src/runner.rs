//! Top-level driver: assemble, randomize, partition, supervise

use std::ffi::OsString;
use std::io::Write;

use rand::Rng;
use tracing::debug;

use crate::assemble::assemble;
use crate::batch::Batcher;
use crate::config::Config;
use crate::error::Result;
use crate::randomize::randomize;
use crate::supervisor::{Executor, Exit, Supervisor};

/// Run every batch of `tokens` (command line plus list-file lines).
///
/// Configuration errors surface before anything is launched.
pub fn run<R, E, W>(
    tokens: Vec<OsString>,
    config: &Config,
    rng: &mut R,
    executor: &mut E,
    out: W,
) -> Result<Exit>
where
    R: Rng + ?Sized,
    E: Executor,
    W: Write,
{
    let mut pool = assemble(tokens, config)?;

    randomize(&mut pool.variable, config.mode, rng);
    if config.just_one {
        pool.variable.truncate(1);
    }
    debug!("randomized pool ({:?}): {:?}", config.mode, pool.variable);

    let batcher = Batcher::new(pool, config.max_count, config.max_bytes)?;
    Supervisor::new(config, executor, out).run(batcher)
}
