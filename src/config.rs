//! Run configuration, resolved once from the command line

use anyhow::{bail, Result};

use crate::budget::ByteBudget;
use crate::cli::Cli;
use crate::expand::ExpandMode;
use crate::filter::{Filter, PatternOptions, PatternSet, Syntax};
use crate::randomize::RandomMode;

/// Sentinel for "no limit" on argument count or byte size
pub const UNBOUNDED: usize = usize::MAX;

/// Everything the core needs to run, read-only once built
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum words per command line, fixed prefix included
    pub max_count: usize,
    /// Serialized argv size every batch must stay below
    pub max_bytes: usize,
    pub filter: Filter,
    pub start: PatternSet,
    pub mode: RandomMode,
    /// Run a single element of the pool
    pub just_one: bool,
    /// Run only the first batch
    pub once: bool,
    pub stop_on_error: bool,
    /// Print batches instead of running them
    pub dry_run: bool,
    pub verbose: bool,
    /// How many copies of the pool to batch through
    pub replicate: usize,
    pub expand: ExpandMode,
    /// Keep a `--` separator as the last word of the fixed prefix
    pub keep_separator: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_count: UNBOUNDED,
            max_bytes: UNBOUNDED,
            filter: Filter::all(),
            start: PatternSet::default(),
            mode: RandomMode::Shuffle,
            just_one: false,
            once: false,
            stop_on_error: false,
            dry_run: false,
            verbose: false,
            replicate: 1,
            expand: ExpandMode::None,
            keep_separator: true,
        }
    }
}

impl Config {
    /// Build the configuration, compiling every pattern up front.
    ///
    /// The byte budget is only consulted when commands will actually run.
    pub fn from_cli(cli: &Cli, budget: &dyn ByteBudget) -> Result<Self> {
        if cli.repeat == 0 {
            bail!("Invalid value for --repeat: 0 (must be >= 1)");
        }

        let options = PatternOptions {
            syntax: if cli.extended {
                Syntax::Extended
            } else {
                Syntax::Basic
            },
            ignore_case: cli.ignore_case,
        };
        let filter = Filter::new(
            PatternSet::new(&cli.exclude, options)?,
            PatternSet::new(&cli.only, options)?,
        );
        let start = PatternSet::new(&cli.start, options)?;

        let mode = if cli.no_randomize {
            RandomMode::None
        } else if cli.rotate || cli.rotate_steps.is_some() {
            RandomMode::Rotate(cli.rotate_steps)
        } else if cli.just_one {
            RandomMode::SinglePick
        } else {
            RandomMode::Shuffle
        };

        let expand = if cli.leaf_dirs {
            ExpandMode::LeafDirs
        } else if cli.recursive {
            ExpandMode::Files
        } else {
            ExpandMode::None
        };

        let max_bytes = if cli.print_only {
            UNBOUNDED
        } else {
            budget.available()?
        };

        Ok(Self {
            max_count: cli.max_args.unwrap_or(UNBOUNDED),
            max_bytes,
            filter,
            start,
            mode,
            just_one: cli.just_one,
            once: cli.once,
            stop_on_error: cli.exit_on_error,
            dry_run: cli.print_only,
            verbose: cli.verbose || cli.print_only,
            replicate: cli.repeat,
            expand,
            keep_separator: !cli.drop_separator,
        })
    }
}
