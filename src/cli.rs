//! CLI argument parsing for rr

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rr")]
#[command(version)]
#[command(
    about = "Run a command over a shuffled, filtered list of arguments",
    long_about = None
)]
pub struct Cli {
    /// Run the command on a single (random) argument
    #[arg(short = '1', long = "just-one")]
    pub just_one: bool,

    /// Don't keep `--` as part of the fixed command
    #[arg(short = 'd', long = "drop-separator")]
    pub drop_separator: bool,

    /// Replace directories with their leaf subdirectories (implies -r)
    #[arg(short = 'D', long = "leaf-dirs")]
    pub leaf_dirs: bool,

    /// Use extended regular expressions
    #[arg(short = 'E', long = "extended")]
    pub extended: bool,

    /// Stop at the first failing command, propagating its status
    #[arg(short = 'e', long = "exit-on-error")]
    pub exit_on_error: bool,

    /// Case-insensitive regular expressions
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Read extra arguments from FILE, one per line (`-` for stdin)
    #[arg(short = 'l', long = "list", value_name = "FILE")]
    pub list: Vec<PathBuf>,

    /// Safety margin in bytes subtracted from the command line size limit
    #[arg(short = 'm', long = "margin", value_name = "BYTES", default_value = "0")]
    pub margin: usize,

    /// Maximum number of words per command, command included
    #[arg(short = 'n', long = "max-args", value_name = "N")]
    pub max_args: Option<usize>,

    /// Don't randomize the argument list
    #[arg(short = 'N', long = "no-randomize")]
    pub no_randomize: bool,

    /// Only keep arguments matching REGEX
    #[arg(short = 'o', long = "only", value_name = "REGEX")]
    pub only: Vec<String>,

    /// Run a single batch
    #[arg(short = 'O', long = "once")]
    pub once: bool,

    /// Print the batches instead of running a command (implies -v)
    #[arg(short = 'p', long = "print-only")]
    pub print_only: bool,

    /// Replace directories with the files they contain
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Rotate the argument list by a random amount instead of shuffling
    #[arg(short = 'R', long = "rotate")]
    pub rotate: bool,

    /// Rotate by exactly N positions (implies -R)
    #[arg(long = "rotate-steps", value_name = "N")]
    pub rotate_steps: Option<usize>,

    /// Batch through N copies of the argument list
    #[arg(long = "repeat", value_name = "N", default_value = "1")]
    pub repeat: usize,

    /// Start from the last argument matching REGEX
    #[arg(short = 's', long = "start", value_name = "REGEX")]
    pub start: Vec<String>,

    /// Echo each command before running it
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Exclude arguments (and directories) matching REGEX
    #[arg(short = 'x', long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,

    /// cmd [flags --] params...
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<OsString>,
}
