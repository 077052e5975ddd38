use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;
use tracing::info;

use crate::error::{QaError, Result};

/// A fully resolved external command. Nothing about the caller's own
/// process arguments leaks in unless put here explicitly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for a in &self.args {
            write!(f, " {}", shell_quote(a))?;
        }
        Ok(())
    }
}

/// Quote `s` for a POSIX shell when it contains anything unsafe.
pub fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

pub trait Launcher: Send + Sync {
    fn launch(&self, cmd: &LaunchCommand) -> Result<()>;
}

/// Runs commands as child processes and waits for each one.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, cmd: &LaunchCommand) -> Result<()> {
        info!(target: "qahpc", "exec: {cmd}");
        let mut c = Command::new(&cmd.program);
        c.args(&cmd.args);
        if let Some(dir) = &cmd.cwd {
            c.current_dir(dir);
        }
        let status = c.status()?;
        if !status.success() {
            return Err(QaError::Launch {
                program: cmd.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Records commands instead of running them; `--dry-run` prints them.
#[derive(Debug, Default)]
pub struct DryRunLauncher {
    seen: Mutex<Vec<LaunchCommand>>,
    echo: bool,
}

impl DryRunLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            seen: Mutex::default(),
            echo: true,
        }
    }

    pub fn commands(&self) -> Vec<LaunchCommand> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Launcher for DryRunLauncher {
    fn launch(&self, cmd: &LaunchCommand) -> Result<()> {
        if self.echo {
            println!("{cmd}");
        }
        if let Ok(mut v) = self.seen.lock() {
            v.push(cmd.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(shell_quote("-l"), "-l");
        assert_eq!(shell_quote("gscratchio=1,h_vmem=6G"), "gscratchio=1,h_vmem=6G");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn display_quotes_each_argument() {
        let c = LaunchCommand::new("qsub").args(["-S", "/bin/bash"]).arg("my job.sh");
        assert_eq!(c.to_string(), "qsub -S /bin/bash 'my job.sh'");
    }

    #[test]
    fn dry_run_records_in_order() {
        let l = DryRunLauncher::new();
        l.launch(&LaunchCommand::new("a")).unwrap();
        l.launch(&LaunchCommand::new("b")).unwrap();
        let progs: Vec<_> = l.commands().into_iter().map(|c| c.program).collect();
        assert_eq!(progs, ["a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn process_launcher_maps_exit_status() {
        assert!(ProcessLauncher.launch(&LaunchCommand::new("true")).is_ok());
        let err = ProcessLauncher
            .launch(&LaunchCommand::new("false"))
            .unwrap_err();
        assert!(matches!(err, QaError::Launch { program, .. } if program == "false"));
    }

    #[cfg(unix)]
    #[test]
    fn process_launcher_runs_in_cwd() {
        let td = tempfile::tempdir().unwrap();
        let cmd = LaunchCommand::new("sh")
            .args(["-c", "pwd > where.txt"])
            .cwd(td.path());
        ProcessLauncher.launch(&cmd).unwrap();
        let got = std::fs::read_to_string(td.path().join("where.txt")).unwrap();
        let want = td.path().canonicalize().unwrap();
        assert_eq!(std::path::Path::new(got.trim()).canonicalize().unwrap(), want);
    }
}
