//! kickstart-express - Scaffold Express.js projects and add database or auth support

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::Colorize;
use kickstart_core::tui::{AddArgs, ScaffoldArgs};
use kickstart_core::{CleanupRegistry, Error};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status after an interrupt
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "kickstart-express")]
#[command(about = "Scaffold Express.js projects and add database or auth support")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub create: CreateFlags,

    /// More diagnostic output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a feature to the project in the current directory
    Add(CliAddArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CreateFlags {
    /// Project name ("." scaffolds into the current directory)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Language: ts or js
    #[arg(short, long)]
    pub language: Option<String>,

    /// Include a Dockerfile
    #[arg(short, long)]
    pub docker: bool,

    /// Put sources in a src/ folder (--src=false for a flat layout)
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub src: Option<bool>,

    /// Use a structured src/ (routes, controllers, services, models)
    #[arg(long)]
    pub structured: bool,

    /// Local directory to use for templates instead of the bundled ones
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Don't initialize a git repository
    #[arg(long = "skip-git")]
    pub skip_git: bool,

    /// Don't install dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,
}

impl From<CreateFlags> for ScaffoldArgs {
    fn from(flags: CreateFlags) -> Self {
        ScaffoldArgs {
            name: flags.name,
            language: flags.language,
            docker: flags.docker.then_some(true),
            src: flags.src,
            structured: flags.structured.then_some(true),
            template_dir: flags.template_dir,
            yes: flags.yes,
            skip_git: flags.skip_git,
            skip_install: flags.skip_install,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliAddArgs {
    /// Feature to add: db (database) or auth (authentication)
    pub feature: String,

    /// Database: mongodb or postgres
    #[arg(long = "db-type")]
    pub db_type: Option<String>,

    /// ORM/ODM: mongoose, prisma or drizzle
    #[arg(long)]
    pub orm: Option<String>,

    /// Authentication: jwt or clerk
    #[arg(long = "auth-type")]
    pub auth_type: Option<String>,

    /// Local directory to use for templates instead of the bundled ones
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliAddArgs> for AddArgs {
    fn from(args: CliAddArgs) -> Self {
        AddArgs {
            feature: args.feature,
            db_type: args.db_type,
            orm: args.orm,
            auth_type: args.auth_type,
            template_dir: args.template_dir,
            yes: args.yes,
        }
    }
}

/// Initialize tracing on stderr; `RUST_LOG` wins over the flags
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Remove a half-generated project, if generation is in progress
fn clean_up(registry: &CleanupRegistry) {
    if !registry.is_armed() {
        return;
    }
    eprintln!("{}", "Cleaning up partially created project...".yellow());
    if let Some(outcome) = registry.cleanup() {
        tracing::debug!(
            removed = outcome.removed.len(),
            failed = outcome.failures.len(),
            "cleanup finished"
        );
        for (path, error) in &outcome.failures {
            tracing::warn!(path = %path.display(), %error, "cleanup failed");
            eprintln!(
                "{} {}: {}",
                "Error during cleanup:".red(),
                path.display(),
                error
            );
        }
    }
}

/// Prompt cancellation (Esc / Ctrl+C inside a cliclack prompt)
fn is_interrupted(err: &anyhow::Error) -> bool {
    let io_err = match err.downcast_ref::<Error>() {
        Some(Error::Prompt(e)) => Some(e),
        _ => err.downcast_ref::<io::Error>(),
    };
    io_err.is_some_and(|e| e.kind() == io::ErrorKind::Interrupted)
}

async fn run(args: Args, registry: CleanupRegistry) -> Result<()> {
    match args.command {
        Some(Command::Add(add_args)) => {
            kickstart_core::run_add(add_args.into(), registry, CLI_VERSION).await
        }
        None => kickstart_core::run_scaffold(args.create.into(), registry, CLI_VERSION).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    let registry = CleanupRegistry::new();

    // Handle Ctrl+C gracefully
    let handler_registry = registry.clone();
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        eprintln!();
        eprintln!("{}", "Operation cancelled by user".yellow());
        clean_up(&handler_registry);
        std::process::exit(i32::from(EXIT_INTERRUPTED));
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    let result = run(args, registry.clone()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_interrupted(&e) => {
            eprintln!("{}", "Operation cancelled by user".yellow());
            clean_up(&registry);
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            if let Some(core) = e.downcast_ref::<Error>() {
                tracing::debug!(kind = ?core.kind(), "command failed");
            }
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_bare_src_means_true() {
        let args = parse(&["kickstart-express", "--src"]);
        assert_eq!(args.create.src, Some(true));
    }

    #[test]
    fn test_src_false_and_unset() {
        let args = parse(&["kickstart-express", "--src=false", "-n", "api"]);
        assert_eq!(args.create.src, Some(false));
        let args = parse(&["kickstart-express"]);
        assert_eq!(args.create.src, None);
    }

    #[test]
    fn test_switches_map_to_explicit_values() {
        let args = parse(&["kickstart-express", "-d", "--structured", "-l", "js"]);
        let scaffold: ScaffoldArgs = args.create.into();
        assert_eq!(scaffold.docker, Some(true));
        assert_eq!(scaffold.structured, Some(true));
        assert_eq!(scaffold.language.as_deref(), Some("js"));

        let scaffold: ScaffoldArgs = parse(&["kickstart-express"]).create.into();
        assert_eq!(scaffold.docker, None);
        assert_eq!(scaffold.structured, None);
    }

    #[test]
    fn test_add_subcommand() {
        let args = parse(&[
            "kickstart-express",
            "add",
            "db",
            "--db-type",
            "postgres",
            "--orm",
            "drizzle",
        ]);
        match args.command {
            Some(Command::Add(add)) => {
                assert_eq!(add.feature, "db");
                assert_eq!(add.db_type.as_deref(), Some("postgres"));
                assert_eq!(add.orm.as_deref(), Some("drizzle"));
            }
            None => panic!("expected add subcommand"),
        }
    }

    #[test]
    fn test_verbosity_is_global() {
        let args = parse(&["kickstart-express", "add", "auth", "-vv"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_clean_up_removes_armed_project_once() {
        let cwd = tempfile::tempdir().unwrap();
        let project = cwd.path().join("orders");
        let registry = CleanupRegistry::new();
        registry.arm(&project).unwrap();
        std::fs::create_dir_all(project.join("src")).unwrap();
        std::fs::write(project.join("src/index.ts"), "").unwrap();

        clean_up(&registry);
        assert!(!project.exists());
        assert!(!registry.is_armed());

        // A second call (signal after normal cleanup) is a no-op
        clean_up(&registry);
    }

    #[test]
    fn test_interrupted_prompt_is_detected() {
        let err = anyhow::Error::from(Error::Prompt(io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_interrupted(&err));
        let err = anyhow::Error::from(Error::MissingOption("orm"));
        assert!(!is_interrupted(&err));
    }
}
