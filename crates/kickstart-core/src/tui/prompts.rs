//! Charm-style CLI prompts using cliclack

use crate::config::{
    resolve_add, resolve_project, AddFeatureRequest, AddFlags, AnswerSource, AuthType, DbType,
    Defaults, Feature, Language, OptionTag, Orm, ProjectConfig, ProjectFlags,
};
use crate::error::{Error, ErrorKind};
use crate::runtime::{FinalizeOptions, FinalizeReport, StepStatus, SystemRunner};
use crate::templates::manifest::ComponentsManifest;
use crate::templates::{check_compatibility, TemplateSet, TemplateSource};
use crate::workflow::add::{feature_location, AddOutcome};
use crate::workflow::{Adder, CleanupRegistry, Generated, Scaffolder};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// CLI arguments for creating a project
#[derive(Debug, Clone, Default)]
pub struct ScaffoldArgs {
    pub name: Option<String>,
    pub language: Option<String>,
    pub docker: Option<bool>,
    pub src: Option<bool>,
    pub structured: Option<bool>,

    /// Local directory to use for templates instead of the bundled ones
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,

    pub skip_git: bool,
    pub skip_install: bool,
}

impl ScaffoldArgs {
    fn flags(&self) -> ProjectFlags {
        ProjectFlags {
            name: self.name.clone(),
            language: self.language.clone(),
            docker: self.docker,
            src: self.src,
            structured: self.structured,
        }
    }
}

/// CLI arguments for the add command
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    /// `db`, `database`, `auth` or `authentication`
    pub feature: String,
    pub db_type: Option<String>,
    pub orm: Option<String>,
    pub auth_type: Option<String>,
    pub template_dir: Option<PathBuf>,
    pub yes: bool,
}

impl AddArgs {
    fn flags(&self) -> AddFlags {
        AddFlags {
            db_type: self.db_type.clone(),
            orm: self.orm.clone(),
            auth_type: self.auth_type.clone(),
        }
    }
}

/// Answers missing options interactively, or from built-in defaults with `--yes`
pub struct PromptAnswers {
    yes: bool,
}

impl PromptAnswers {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }
}

fn select_option<T: OptionTag + Eq>(prompt: &str, options: &[T]) -> crate::Result<T> {
    let mut select = cliclack::select(prompt);
    for option in options {
        select = select.item(*option, option.display_name(), option.tag());
    }
    select.interact().map_err(Error::Prompt)
}

fn confirm(prompt: &str, initial: bool) -> crate::Result<bool> {
    cliclack::confirm(prompt)
        .initial_value(initial)
        .interact()
        .map_err(Error::Prompt)
}

impl AnswerSource for PromptAnswers {
    fn project_name(&mut self, default: &str) -> crate::Result<String> {
        if self.yes {
            return Defaults.project_name(default);
        }
        cliclack::input("Project name?")
            .placeholder(default)
            .default_input(default)
            .interact()
            .map_err(Error::Prompt)
    }

    fn language(&mut self) -> crate::Result<Language> {
        if self.yes {
            return Defaults.language();
        }
        select_option("Which language do you want to use?", Language::ALL)
    }

    fn docker(&mut self) -> crate::Result<bool> {
        if self.yes {
            return Defaults.docker();
        }
        confirm("Include Dockerfile?", false)
    }

    fn src_folder(&mut self) -> crate::Result<bool> {
        if self.yes {
            return Defaults.src_folder();
        }
        confirm("Do you want a src folder?", true)
    }

    fn structured(&mut self) -> crate::Result<bool> {
        if self.yes {
            return Defaults.structured();
        }
        confirm("Use structured src/ (routes, controllers, services)?", false)
    }

    fn database(&mut self) -> crate::Result<(DbType, Orm)> {
        if self.yes {
            return Defaults.database();
        }
        let db: DbType = select_option("Which database do you want to use?", DbType::ALL)?;
        let orm = select_option(
            &format!("Which ORM/ODM do you want to use with {}?", db),
            db.supported_orms(),
        )?;
        Ok((db, orm))
    }

    fn auth_type(&mut self) -> crate::Result<AuthType> {
        if self.yes {
            return Defaults.auth_type();
        }
        select_option("Which authentication method do you want to use?", AuthType::ALL)
    }
}

fn load_templates(template_dir: Option<PathBuf>) -> Result<TemplateSet> {
    let (source, set) = TemplateSource::resolve(template_dir)?;
    match &source {
        TemplateSource::Explicit(path) | TemplateSource::Env(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?;
        }
        TemplateSource::Bundled(_) | TemplateSource::Checkout(_) => {}
    }
    Ok(set)
}

/// Create a new project, prompting for whatever the flags leave open
pub async fn run_scaffold(
    args: ScaffoldArgs,
    registry: CleanupRegistry,
    cli_version: &str,
) -> Result<()> {
    cliclack::intro("kickstart-express")?;

    let templates = load_templates(args.template_dir.clone())?;

    let mut answers = PromptAnswers::new(args.yes);
    let config = resolve_project(&args.flags(), &mut answers)?;
    print_summary(&config)?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut scaffolder = Scaffolder::new(&templates, registry, cli_version);

    let spinner = cliclack::spinner();
    spinner.start("Creating project...");
    let generated = match scaffolder.generate(&config, &cwd).await {
        Ok(generated) => generated,
        Err(e) => {
            spinner.stop("Project creation failed");
            return Err(e.into());
        }
    };
    spinner.stop(format!(
        "Created {} files in {}",
        generated.files.written.len(),
        generated.project_dir.display()
    ));
    report_generated(&generated)?;

    let options = FinalizeOptions {
        git: !args.skip_git,
        install: !args.skip_install,
    };
    let report = if options.git || options.install {
        let spinner = cliclack::spinner();
        spinner.start("Initializing Git and installing dependencies...");
        let report = scaffolder.finalize(&SystemRunner, &generated, options).await;
        spinner.stop("Finished setup");
        report_steps(&report)?;
        report
    } else {
        scaffolder.finalize(&SystemRunner, &generated, options).await
    };

    print_scaffold_next_steps(&config, &generated, &report, options)?;
    Ok(())
}

fn print_summary(config: &ProjectConfig) -> Result<()> {
    let layout = match (config.use_src_folder(), config.use_structured_layout()) {
        (true, true) => "structured src/",
        (true, false) => "src/",
        (false, _) => "flat",
    };
    let docker = if config.include_docker() { ", Docker" } else { "" };
    cliclack::log::info(format!(
        "{} · {} · {} layout{}",
        config.project_name(),
        config.language(),
        layout,
        docker
    ))?;
    Ok(())
}

fn report_generated(generated: &Generated) -> Result<()> {
    for failed in &generated.files.errors {
        cliclack::log::warning(format!("{}: {}", failed.path.display(), failed.error))?;
    }
    for failed in &generated.merge_errors {
        cliclack::log::warning(format!(
            "Could not update {}: {}",
            failed.path.display(),
            failed.error
        ))?;
    }
    Ok(())
}

fn report_steps(report: &FinalizeReport) -> Result<()> {
    for step in &report.steps {
        match &step.status {
            StepStatus::Ok => cliclack::log::success(&step.label)?,
            StepStatus::Failed(reason) => {
                cliclack::log::warning(format!("{} failed: {}", step.label, reason))?
            }
            StepStatus::Skipped => cliclack::log::remark(format!("{} skipped", step.label))?,
        }
    }
    Ok(())
}

fn print_scaffold_next_steps(
    config: &ProjectConfig,
    generated: &Generated,
    report: &FinalizeReport,
    options: FinalizeOptions,
) -> Result<()> {
    let mut steps = Vec::new();
    if !config.uses_current_dir() {
        steps.push(format!("cd {}", config.project_name()));
    }
    let manager = match report.installed_with {
        Some(manager) => manager,
        None => {
            if options.install {
                cliclack::log::warning("Dependencies were not installed")?;
            }
            steps.push("pnpm install".to_string());
            crate::runtime::PackageManager::Pnpm
        }
    };
    steps.push(manager.dev_command().to_string());

    println!();
    println!("  {}", "Next steps".bold());
    println!();
    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step.cyan());
    }

    cliclack::outro(format!(
        "Project {} scaffolded successfully!",
        generated.project_name.green()
    ))?;
    Ok(())
}

/// Add a feature to the project in the current directory
pub async fn run_add(args: AddArgs, registry: CleanupRegistry, cli_version: &str) -> Result<()> {
    cliclack::intro("kickstart-express add")?;

    let feature = Feature::parse(&args.feature)?;
    let templates = load_templates(args.template_dir.clone())?;
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let adder = Adder::new(&templates, cwd);

    let manifest = match adder.load_manifest().await {
        Ok(manifest) => manifest,
        Err(e) if e.kind() == ErrorKind::Precondition => {
            cliclack::log::error(format!("{}", e))?;
            cliclack::log::info("This command only works in a project created with kickstart-express.")?;
            if !args.yes && confirm("Create a new project instead?", false)? {
                let scaffold = ScaffoldArgs {
                    template_dir: args.template_dir,
                    ..ScaffoldArgs::default()
                };
                return run_scaffold(scaffold, registry, cli_version).await;
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(warning) = check_compatibility(cli_version, &manifest.version) {
        cliclack::log::warning(format!(
            "Version warning: {}",
            warning.lines().next().unwrap_or(&warning)
        ))?;
    }
    cliclack::log::info(format!(
        "Adding {} to {} ({})",
        feature.display_name(),
        manifest.name,
        manifest.language
    ))?;

    let mut answers = PromptAnswers::new(args.yes);
    let request = resolve_add(feature, &args.flags(), &mut answers)?;
    warn_if_present(&manifest, &request)?;

    let spinner = cliclack::spinner();
    spinner.start(format!("Adding {}...", describe(&request)));
    let outcome = match adder.add(&manifest, &request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.stop(format!("Could not add {}", feature.display_name()));
            return Err(e.into());
        }
    };
    spinner.stop(format!(
        "Copied {} files ({} already present)",
        outcome.files.written.len(),
        outcome.files.skipped.len()
    ));

    report_add(&outcome)?;
    print_add_next_steps(&manifest, &outcome)?;
    Ok(())
}

fn describe(request: &AddFeatureRequest) -> String {
    match request {
        AddFeatureRequest::Database(choice) => {
            format!("{} with {}", choice.db_type(), choice.orm())
        }
        AddFeatureRequest::Authentication(auth) => format!("{} authentication", auth),
    }
}

fn warn_if_present(manifest: &ComponentsManifest, request: &AddFeatureRequest) -> Result<()> {
    let existing = match request {
        AddFeatureRequest::Database(_) => manifest
            .features
            .database
            .as_ref()
            .map(|db| format!("{} with {}", db.db_type, db.orm)),
        AddFeatureRequest::Authentication(_) => manifest
            .features
            .authentication
            .as_ref()
            .map(|auth| format!("{} authentication", auth.auth_type)),
    };
    if let Some(existing) = existing {
        cliclack::log::warning(format!(
            "Project already has {}; existing files are kept and the record is replaced",
            existing
        ))?;
    }
    Ok(())
}

fn report_add(outcome: &AddOutcome) -> Result<()> {
    for failed in &outcome.files.errors {
        cliclack::log::warning(format!("{}: {}", failed.path.display(), failed.error))?;
    }
    if !outcome.dependencies_changed.is_empty() {
        cliclack::log::success(format!(
            "Updated package.json: {}",
            outcome.dependencies_changed.join(", ")
        ))?;
    }
    if !outcome.env_added.is_empty() {
        cliclack::log::success(format!("Updated .env: {}", outcome.env_added.join(", ")))?;
    }
    for failed in &outcome.merge_errors {
        cliclack::log::warning(format!(
            "Could not update {}: {}",
            failed.path.display(),
            failed.error
        ))?;
    }
    if outcome.manifest.is_some() {
        cliclack::log::success("Updated components.json")?;
    }
    Ok(())
}

fn print_add_next_steps(manifest: &ComponentsManifest, outcome: &AddOutcome) -> Result<()> {
    let configure = match outcome.request {
        AddFeatureRequest::Database(_) => "Configure your database connection in .env",
        AddFeatureRequest::Authentication(_) => "Configure your authentication secrets in .env",
    };
    let steps = [
        "Install dependencies: pnpm install".to_string(),
        configure.to_string(),
        format!(
            "Check the generated files in {} for usage examples",
            feature_location(manifest)
        ),
    ];

    println!();
    println!("  {}", "Next steps".bold());
    println!();
    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    let done = if outcome.is_complete() {
        format!("{} support added successfully!", outcome.request.feature().display_name())
    } else {
        format!(
            "{} support added with warnings",
            outcome.request.feature().display_name()
        )
    };
    cliclack::outro(done)?;
    Ok(())
}
