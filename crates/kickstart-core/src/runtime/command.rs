//! External commands run after generation: git and the package manager
//!
//! Everything here is best-effort. Failures are collected into a
//! [`FinalizeReport`] and never turned into an error.

use std::future::Future;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Message for the first commit of a generated project
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from kickstart-express";

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Capability for running external programs
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}

/// Runs real processes and waits for them to exit (no timeout)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput> {
        let output = TokioCommand::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Package managers tried for `install`, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Pnpm,
    Npm,
}

impl PackageManager {
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm",
            PackageManager::Npm => "npm",
        }
    }

    /// Command shown to users in "next steps"
    pub fn dev_command(&self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm dev",
            PackageManager::Npm => "npm run dev",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Ok,
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub label: String,
    pub status: StepStatus,
}

/// What happened while finalizing a project
#[derive(Debug, Clone, Default)]
pub struct FinalizeReport {
    pub steps: Vec<StepReport>,
    /// Package manager that installed dependencies, if any did
    pub installed_with: Option<PackageManager>,
}

impl FinalizeReport {
    fn push(&mut self, label: impl Into<String>, status: StepStatus) {
        self.steps.push(StepReport {
            label: label.into(),
            status,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed(_)))
    }
}

/// Which finalization steps to run
#[derive(Debug, Clone, Copy)]
pub struct FinalizeOptions {
    pub git: bool,
    pub install: bool,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            git: true,
            install: true,
        }
    }
}

async fn run_step<R: CommandRunner>(
    runner: &R,
    program: &str,
    args: &[&str],
    cwd: &Path,
) -> StepStatus {
    match runner.run(program, args, cwd).await {
        Ok(out) if out.success => StepStatus::Ok,
        Ok(out) => {
            let detail = if out.stderr.trim().is_empty() {
                format!("exited with code {}", out.code.unwrap_or(-1))
            } else {
                out.stderr.trim().to_string()
            };
            StepStatus::Failed(detail)
        }
        Err(e) => StepStatus::Failed(e.to_string()),
    }
}

/// `git init`, `git add -A`, `git commit`, then install with pnpm, falling back to npm once
pub async fn init_and_install<R: CommandRunner>(
    runner: &R,
    project: &Path,
    options: FinalizeOptions,
) -> FinalizeReport {
    let mut report = FinalizeReport::default();

    if options.git {
        let init = run_step(runner, "git", &["init"], project).await;
        let initialized = init == StepStatus::Ok;
        report.push("git init", init);

        if initialized {
            let add = run_step(runner, "git", &["add", "-A"], project).await;
            report.push("git add", add);
            let commit = run_step(
                runner,
                "git",
                &["commit", "-m", INITIAL_COMMIT_MESSAGE],
                project,
            )
            .await;
            report.push("git commit", commit);
        } else {
            report.push("git add", StepStatus::Skipped);
            report.push("git commit", StepStatus::Skipped);
        }
    }

    if options.install {
        for manager in [PackageManager::Pnpm, PackageManager::Npm] {
            let status = run_step(runner, manager.program(), &["install"], project).await;
            let ok = status == StepStatus::Ok;
            if !ok {
                tracing::warn!(manager = manager.program(), ?status, "install failed");
            }
            report.push(format!("{} install", manager.program()), status);
            if ok {
                report.installed_with = Some(manager);
                break;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records invocations; programs listed in `failing` exit non-zero
    #[derive(Default)]
    struct FakeRunner {
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn failing(commands: &[&str]) -> Self {
            Self {
                failing: commands.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        async fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> io::Result<CommandOutput> {
            let line = format!("{} {}", program, args.join(" "));
            self.calls.lock().unwrap().push(line.clone());
            let fails = self.failing.iter().any(|f| line.starts_with(f.as_str()));
            Ok(CommandOutput {
                success: !fails,
                code: Some(if fails { 1 } else { 0 }),
                stdout: String::new(),
                stderr: if fails { format!("{} failed", program) } else { String::new() },
            })
        }
    }

    #[tokio::test]
    async fn test_happy_path_uses_pnpm_only() {
        let runner = FakeRunner::default();
        let report = init_and_install(&runner, Path::new("/p"), FinalizeOptions::default()).await;

        assert_eq!(
            runner.calls(),
            vec![
                "git init",
                "git add -A",
                "git commit -m Initial commit from kickstart-express",
                "pnpm install",
            ]
        );
        assert_eq!(report.installed_with, Some(PackageManager::Pnpm));
        assert_eq!(report.failures().count(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_npm_once() {
        let runner = FakeRunner::failing(&["pnpm"]);
        let report = init_and_install(&runner, Path::new("/p"), FinalizeOptions::default()).await;

        assert_eq!(report.installed_with, Some(PackageManager::Npm));
        assert_eq!(runner.calls().last().unwrap(), "npm install");
    }

    #[tokio::test]
    async fn test_no_further_cascade_after_npm() {
        let runner = FakeRunner::failing(&["pnpm", "npm"]);
        let report = init_and_install(&runner, Path::new("/p"), FinalizeOptions::default()).await;

        assert_eq!(report.installed_with, None);
        let installs = runner.calls().iter().filter(|c| c.ends_with("install")).count();
        assert_eq!(installs, 2);
        assert_eq!(report.failures().count(), 2);
    }

    #[tokio::test]
    async fn test_failed_commit_still_installs() {
        let runner = FakeRunner::failing(&["git commit"]);
        let report = init_and_install(&runner, Path::new("/p"), FinalizeOptions::default()).await;

        assert_eq!(report.installed_with, Some(PackageManager::Pnpm));
        let commit = report.steps.iter().find(|s| s.label == "git commit").unwrap();
        assert!(matches!(commit.status, StepStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_failed_init_skips_add_and_commit() {
        let runner = FakeRunner::failing(&["git init"]);
        let report = init_and_install(&runner, Path::new("/p"), FinalizeOptions::default()).await;

        assert!(!runner.calls().iter().any(|c| c.starts_with("git add")));
        let skipped = report
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count();
        assert_eq!(skipped, 2);
        assert_eq!(report.installed_with, Some(PackageManager::Pnpm));
    }

    #[tokio::test]
    async fn test_options_disable_steps() {
        let runner = FakeRunner::default();
        let options = FinalizeOptions {
            git: false,
            install: false,
        };
        let report = init_and_install(&runner, Path::new("/p"), options).await;
        assert!(runner.calls().is_empty());
        assert!(report.steps.is_empty());
    }
}
