//! Process supervision: one command per batch, strictly sequential
//!
//! Every batch but the final one is forked and waited for. The final batch
//! replaces the current process image, so the last command inherits our pid
//! and its exit status becomes ours.

use std::ffi::OsString;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::CommandExt;
use std::process::Command;

use nix::sys::signal::{raise, signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::batch::Batcher;
use crate::config::Config;
use crate::error::{Result, RrError};

/// How a finished child ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exited(i32),
    Signaled(Signal),
}

/// How the whole run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Code(i32),
    Signal(Signal),
}

impl From<Outcome> for Exit {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Exited(code) => Exit::Code(code),
            Outcome::Signaled(sig) => Exit::Signal(sig),
        }
    }
}

impl Exit {
    /// End the current process the same way the child ended
    pub fn terminate(self) -> ! {
        match self {
            Exit::Code(code) => std::process::exit(code),
            Exit::Signal(sig) => {
                // the runtime ignores SIGPIPE, which would make raise a no-op
                if let Err(e) = unsafe { signal(sig, SigHandler::SigDfl) } {
                    warn!("failed to restore default action for {}: {}", sig, e);
                }
                if let Err(e) = raise(sig) {
                    warn!("failed to raise {}: {}", sig, e);
                }
                // in case we didn't die
                std::process::exit(1)
            }
        }
    }
}

/// Per-batch launch decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    ForkAndWait,
    ReplaceSelf,
}

impl Dispatch {
    pub fn for_batch(is_final: bool) -> Self {
        if is_final {
            Dispatch::ReplaceSelf
        } else {
            Dispatch::ForkAndWait
        }
    }
}

/// What to do after a forked child finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Stop(Exit),
}

/// Report failures on stderr and decide whether the run goes on
pub fn apply_policy(outcome: Outcome, stop_on_error: bool) -> Verdict {
    match outcome {
        Outcome::Exited(0) => Verdict::Continue,
        Outcome::Exited(code) => {
            eprintln!("Command exited with {}", code);
            if stop_on_error {
                Verdict::Stop(Exit::Code(code))
            } else {
                Verdict::Continue
            }
        }
        Outcome::Signaled(sig) => {
            eprintln!("Command exited on signal #{}", sig as i32);
            if stop_on_error {
                Verdict::Stop(Exit::Signal(sig))
            } else {
                Verdict::Continue
            }
        }
    }
}

/// Launches commands on behalf of the supervisor
pub trait Executor {
    /// Run `argv` in a child process and wait for that child
    fn spawn_and_wait(&mut self, argv: &[OsString]) -> Result<Outcome>;

    /// Replace the current process with `argv`.
    ///
    /// Only returns on failure for real processes; test doubles return the
    /// outcome the replacement would have had.
    fn replace(&mut self, argv: &[OsString]) -> Result<Outcome>;
}

/// Executor backed by the operating system
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn spawn_and_wait(&mut self, argv: &[OsString]) -> Result<Outcome> {
        let program = &argv[0];
        let child = Command::new(program)
            .args(&argv[1..])
            .spawn()
            .map_err(|source| RrError::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;
        let pid = Pid::from_raw(child.id() as i32);

        match waitpid(pid, None).map_err(RrError::Wait)? {
            WaitStatus::Exited(p, code) if p == pid => Ok(Outcome::Exited(code)),
            WaitStatus::Signaled(p, sig, _) if p == pid => Ok(Outcome::Signaled(sig)),
            other => Err(RrError::UnexpectedWaitStatus(format!("{:?}", other))),
        }
    }

    fn replace(&mut self, argv: &[OsString]) -> Result<Outcome> {
        let program = &argv[0];
        let source = Command::new(program).args(&argv[1..]).exec();
        Err(RrError::Exec {
            program: program.to_string_lossy().into_owned(),
            source,
        })
    }
}

/// Drives batches through an executor, echoing them when verbose
pub struct Supervisor<'a, E: Executor, W: Write> {
    executor: &'a mut E,
    out: W,
    verbose: bool,
    dry_run: bool,
    once: bool,
    stop_on_error: bool,
}

impl<'a, E: Executor, W: Write> Supervisor<'a, E, W> {
    pub fn new(config: &Config, executor: &'a mut E, out: W) -> Self {
        Self {
            executor,
            out,
            verbose: config.verbose,
            dry_run: config.dry_run,
            once: config.once,
            stop_on_error: config.stop_on_error,
        }
    }

    pub fn run(&mut self, mut batcher: Batcher) -> Result<Exit> {
        while let Some(batch) = batcher.next_batch()? {
            if self.verbose {
                self.echo(&batch.argv)?;
            }

            let is_final = batch.exhausted || self.once;
            if self.dry_run {
                if is_final {
                    break;
                }
                continue;
            }

            let dispatch = Dispatch::for_batch(is_final);
            debug!(
                "{:?}: {:?} with {} words",
                dispatch,
                batch.program(),
                batch.argv.len()
            );
            match dispatch {
                Dispatch::ForkAndWait => {
                    let outcome = self.executor.spawn_and_wait(&batch.argv)?;
                    if let Verdict::Stop(exit) = apply_policy(outcome, self.stop_on_error) {
                        return Ok(exit);
                    }
                }
                Dispatch::ReplaceSelf => {
                    let outcome = self.executor.replace(&batch.argv)?;
                    return Ok(outcome.into());
                }
            }
        }
        Ok(Exit::Code(0))
    }

    /// Write `argv` space separated, bytes untouched
    fn echo(&mut self, argv: &[OsString]) -> Result<()> {
        for (i, word) in argv.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b" ")?;
            }
            self.out.write_all(word.as_bytes())?;
        }
        self.out.write_all(b"\n")?;
        // the child shares our stdout
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::ArgumentPool;
    use crate::config::UNBOUNDED;
    use std::collections::VecDeque;
    use std::os::unix::ffi::OsStringExt;

    /// Records every launch and plays back scripted outcomes
    #[derive(Default)]
    struct ScriptedExecutor {
        outcomes: VecDeque<Outcome>,
        forked: Vec<Vec<OsString>>,
        replaced: Option<Vec<OsString>>,
    }

    impl ScriptedExecutor {
        fn with(outcomes: &[Outcome]) -> Self {
            Self {
                outcomes: outcomes.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn next(&mut self) -> Outcome {
            self.outcomes.pop_front().unwrap_or(Outcome::Exited(0))
        }
    }

    impl Executor for ScriptedExecutor {
        fn spawn_and_wait(&mut self, argv: &[OsString]) -> Result<Outcome> {
            self.forked.push(argv.to_vec());
            Ok(self.next())
        }

        fn replace(&mut self, argv: &[OsString]) -> Result<Outcome> {
            self.replaced = Some(argv.to_vec());
            Ok(self.next())
        }
    }

    fn batcher(fixed: &[&str], variable: &[&str], max_count: usize) -> Batcher {
        let pool = ArgumentPool {
            fixed: fixed.iter().map(OsString::from).collect(),
            variable: variable.iter().map(OsString::from).collect(),
        };
        Batcher::new(pool, max_count, UNBOUNDED).unwrap()
    }

    fn run(config: &Config, exec: &mut ScriptedExecutor, b: Batcher) -> (Exit, String) {
        let mut out = Vec::new();
        let exit = Supervisor::new(config, exec, &mut out).run(b).unwrap();
        (exit, String::from_utf8(out).unwrap())
    }

    fn argv(words: &[&str]) -> Vec<OsString> {
        words.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_last_batch_replaces_self() {
        let mut exec = ScriptedExecutor::default();
        let (exit, _) = run(
            &Config::default(),
            &mut exec,
            batcher(&["cmd"], &["a", "b", "c", "d"], 3),
        );
        assert_eq!(exit, Exit::Code(0));
        assert_eq!(exec.forked, vec![vec!["cmd", "a", "b"]]);
        assert_eq!(exec.replaced.unwrap(), vec!["cmd", "c", "d"]);
    }

    #[test]
    fn test_final_status_propagates() {
        let mut exec = ScriptedExecutor::with(&[Outcome::Exited(0), Outcome::Exited(7)]);
        let (exit, _) = run(&Config::default(), &mut exec, batcher(&["cmd"], &["a", "b"], 2));
        assert_eq!(exit, Exit::Code(7));
    }

    #[test]
    fn test_failure_continues_without_stop_on_error() {
        let mut exec = ScriptedExecutor::with(&[Outcome::Exited(3), Outcome::Signaled(Signal::SIGTERM)]);
        let (exit, _) = run(
            &Config::default(),
            &mut exec,
            batcher(&["cmd"], &["a", "b", "c"], 2),
        );
        assert_eq!(exit, Exit::Code(0));
        assert_eq!(exec.forked.len(), 2);
        assert_eq!(exec.replaced.unwrap(), vec!["cmd", "c"]);
    }

    #[test]
    fn test_stop_on_error_exit_code() {
        let config = Config {
            stop_on_error: true,
            ..Config::default()
        };
        let mut exec = ScriptedExecutor::with(&[Outcome::Exited(3)]);
        let (exit, _) = run(&config, &mut exec, batcher(&["cmd"], &["a", "b", "c"], 2));
        assert_eq!(exit, Exit::Code(3));
        assert_eq!(exec.forked.len(), 1);
        assert!(exec.replaced.is_none());
    }

    #[test]
    fn test_stop_on_error_signal() {
        let config = Config {
            stop_on_error: true,
            ..Config::default()
        };
        let mut exec = ScriptedExecutor::with(&[Outcome::Signaled(Signal::SIGINT)]);
        let (exit, _) = run(&config, &mut exec, batcher(&["cmd"], &["a", "b"], 2));
        assert_eq!(exit, Exit::Signal(Signal::SIGINT));
    }

    #[test]
    fn test_once_runs_first_batch_only() {
        let config = Config {
            once: true,
            ..Config::default()
        };
        let mut exec = ScriptedExecutor::default();
        run(&config, &mut exec, batcher(&["cmd"], &["a", "b", "c"], 2));
        assert!(exec.forked.is_empty());
        assert_eq!(exec.replaced.unwrap(), vec!["cmd", "a"]);
    }

    #[test]
    fn test_dry_run_prints_and_never_launches() {
        let config = Config {
            dry_run: true,
            verbose: true,
            ..Config::default()
        };
        let mut exec = ScriptedExecutor::default();
        let (exit, out) = run(&config, &mut exec, batcher(&[], &["a", "b", "c"], 2));
        assert_eq!(exit, Exit::Code(0));
        assert_eq!(out, "a b\nc\n");
        assert!(exec.forked.is_empty());
        assert!(exec.replaced.is_none());
    }

    #[test]
    fn test_verbose_echoes_each_batch() {
        let config = Config {
            verbose: true,
            ..Config::default()
        };
        let mut exec = ScriptedExecutor::default();
        let (_, out) = run(&config, &mut exec, batcher(&["cmd", "-x"], &["a", "b"], 3));
        assert_eq!(out, "cmd -x a\ncmd -x b\n");
    }

    #[test]
    fn test_echo_keeps_raw_bytes() {
        let config = Config {
            verbose: true,
            ..Config::default()
        };
        let pool = ArgumentPool {
            fixed: argv(&["cmd"]),
            variable: vec![OsString::from_vec(b"caf\xe9.mp3".to_vec())],
        };
        let mut exec = ScriptedExecutor::default();
        let mut out = Vec::new();
        Supervisor::new(&config, &mut exec, &mut out)
            .run(Batcher::new(pool, UNBOUNDED, UNBOUNDED).unwrap())
            .unwrap();
        assert_eq!(out, b"cmd caf\xe9.mp3\n");
    }

    #[test]
    fn test_policy() {
        assert_eq!(apply_policy(Outcome::Exited(0), true), Verdict::Continue);
        assert_eq!(apply_policy(Outcome::Exited(2), false), Verdict::Continue);
        assert_eq!(
            apply_policy(Outcome::Exited(2), true),
            Verdict::Stop(Exit::Code(2))
        );
        assert_eq!(
            apply_policy(Outcome::Signaled(Signal::SIGKILL), true),
            Verdict::Stop(Exit::Signal(Signal::SIGKILL))
        );
    }

    #[test]
    fn test_dispatch_for_batch() {
        assert_eq!(Dispatch::for_batch(true), Dispatch::ReplaceSelf);
        assert_eq!(Dispatch::for_batch(false), Dispatch::ForkAndWait);
    }

    #[test]
    fn test_system_executor_reports_exit_code() {
        let mut exec = SystemExecutor;
        let cmd = argv(&["sh", "-c", "exit 5"]);
        assert_eq!(exec.spawn_and_wait(&cmd).unwrap(), Outcome::Exited(5));
    }

    #[test]
    fn test_system_executor_reports_signal() {
        let mut exec = SystemExecutor;
        let cmd = argv(&["sh", "-c", "kill -TERM $$"]);
        assert_eq!(
            exec.spawn_and_wait(&cmd).unwrap(),
            Outcome::Signaled(Signal::SIGTERM)
        );
    }

    #[test]
    fn test_system_executor_spawn_failure() {
        let mut exec = SystemExecutor;
        let cmd = argv(&["/nonexistent/rr-test-program"]);
        let err = exec.spawn_and_wait(&cmd).unwrap_err();
        assert!(matches!(err, RrError::Spawn { .. }));
    }
}
