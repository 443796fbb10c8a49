//! Option resolution: flags first, answers for whatever is missing
//!
//! Resolution is a chain of builder steps. Each step takes the builder by value
//! and returns a new one, so the order in which questions are asked is the order
//! in which the steps are chained in [`resolve_project`].

use super::options::{AuthType, DbType, Feature, Language, OptionTag, Orm};
use crate::error::{Error, Result};

/// Default project name offered by prompts and used by `--yes`
pub const DEFAULT_PROJECT_NAME: &str = "my-express-app";

/// Source of answers for values not supplied on the command line
pub trait AnswerSource {
    fn project_name(&mut self, default: &str) -> Result<String>;
    fn language(&mut self) -> Result<Language>;
    fn docker(&mut self) -> Result<bool>;
    fn src_folder(&mut self) -> Result<bool>;
    fn structured(&mut self) -> Result<bool>;
    /// Database type and ORM are always asked together
    fn database(&mut self) -> Result<(DbType, Orm)>;
    fn auth_type(&mut self) -> Result<AuthType>;
}

/// Answers every question with its default; used for non-interactive runs
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl AnswerSource for Defaults {
    fn project_name(&mut self, default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn language(&mut self) -> Result<Language> {
        Ok(Language::Ts)
    }

    fn docker(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn src_folder(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn structured(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn database(&mut self) -> Result<(DbType, Orm)> {
        Err(Error::MissingOption("db-type"))
    }

    fn auth_type(&mut self) -> Result<AuthType> {
        Err(Error::MissingOption("auth-type"))
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Flag,
    Answer,
    /// Forced by the layout rules, never asked
    Derived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Setting<T> {
    fn flag(value: T) -> Self {
        Self {
            value,
            origin: Origin::Flag,
        }
    }

    fn answer(value: T) -> Self {
        Self {
            value,
            origin: Origin::Answer,
        }
    }

    fn derived(value: T) -> Self {
        Self {
            value,
            origin: Origin::Derived,
        }
    }
}

/// Scaffold options as given on the command line (unparsed)
#[derive(Debug, Clone, Default)]
pub struct ProjectFlags {
    pub name: Option<String>,
    pub language: Option<String>,
    pub docker: Option<bool>,
    pub src: Option<bool>,
    pub structured: Option<bool>,
}

/// Fully resolved scaffold configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    project_name: String,
    language: Language,
    use_src_folder: bool,
    use_structured_layout: bool,
    include_docker: bool,
}

impl ProjectConfig {
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// True when the project is generated into the current directory
    pub fn uses_current_dir(&self) -> bool {
        self.project_name == "."
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn use_src_folder(&self) -> bool {
        self.use_src_folder
    }

    pub fn use_structured_layout(&self) -> bool {
        self.use_structured_layout
    }

    pub fn include_docker(&self) -> bool {
        self.include_docker
    }
}

/// Immutable builder threaded through the resolution steps
#[derive(Debug, Clone, Default)]
pub struct ProjectConfigBuilder {
    name: Option<Setting<String>>,
    language: Option<Setting<Language>>,
    docker: Option<Setting<bool>>,
    src: Option<Setting<bool>>,
    structured: Option<Setting<bool>>,
}

impl ProjectConfigBuilder {
    /// Seed the builder from flags, rejecting invalid values and explicit conflicts
    pub fn from_flags(flags: &ProjectFlags) -> Result<Self> {
        if flags.src == Some(false) && flags.structured == Some(true) {
            return Err(Error::ConflictingLayout);
        }

        let name = match &flags.name {
            Some(name) => Some(Setting::flag(validate_project_name(name)?)),
            None => None,
        };
        let language = match &flags.language {
            Some(value) => Some(Setting::flag(Language::parse_flag("language", value)?)),
            None => None,
        };

        Ok(Self {
            name,
            language,
            docker: flags.docker.map(Setting::flag),
            src: flags.src.map(Setting::flag),
            structured: flags.structured.map(Setting::flag),
        })
    }

    pub fn with_name(self, answers: &mut dyn AnswerSource) -> Result<Self> {
        if self.name.is_some() {
            return Ok(self);
        }
        let name = validate_project_name(&answers.project_name(DEFAULT_PROJECT_NAME)?)?;
        Ok(Self {
            name: Some(Setting::answer(name)),
            ..self
        })
    }

    pub fn with_language(self, answers: &mut dyn AnswerSource) -> Result<Self> {
        if self.language.is_some() {
            return Ok(self);
        }
        Ok(Self {
            language: Some(Setting::answer(answers.language()?)),
            ..self
        })
    }

    pub fn with_docker(self, answers: &mut dyn AnswerSource) -> Result<Self> {
        if self.docker.is_some() {
            return Ok(self);
        }
        Ok(Self {
            docker: Some(Setting::answer(answers.docker()?)),
            ..self
        })
    }

    /// A structured layout lives in `src/`, so `structured=true` answers this step
    pub fn with_src(self, answers: &mut dyn AnswerSource) -> Result<Self> {
        if self.src.is_some() {
            return Ok(self);
        }
        let src = if self.structured_value() == Some(true) {
            Setting::derived(true)
        } else {
            Setting::answer(answers.src_folder()?)
        };
        Ok(Self {
            src: Some(src),
            ..self
        })
    }

    /// Only asked when the project has a src folder
    pub fn with_structured(self, answers: &mut dyn AnswerSource) -> Result<Self> {
        if self.structured.is_some() {
            return Ok(self);
        }
        let structured = if self.src.as_ref().map(|s| s.value) == Some(false) {
            Setting::derived(false)
        } else {
            Setting::answer(answers.structured()?)
        };
        Ok(Self {
            structured: Some(structured),
            ..self
        })
    }

    fn structured_value(&self) -> Option<bool> {
        self.structured.as_ref().map(|s| s.value)
    }

    /// Origin of the src setting, if resolved
    pub fn src_origin(&self) -> Option<Origin> {
        self.src.as_ref().map(|s| s.origin)
    }

    pub fn structured_origin(&self) -> Option<Origin> {
        self.structured.as_ref().map(|s| s.origin)
    }

    pub fn build(self) -> Result<ProjectConfig> {
        let name = self.name.ok_or(Error::MissingOption("name"))?;
        let language = self.language.ok_or(Error::MissingOption("language"))?;
        let docker = self.docker.map(|s| s.value).unwrap_or(false);
        let structured = self.structured.map(|s| s.value).unwrap_or(false);
        let src = self.src.map(|s| s.value).unwrap_or(false) || structured;

        Ok(ProjectConfig {
            project_name: name.value,
            language: language.value,
            use_src_folder: src,
            use_structured_layout: structured && src,
            include_docker: docker,
        })
    }
}

/// Resolve a scaffold configuration, asking for missing values in the fixed order
/// name, language, docker, src, structured
pub fn resolve_project(
    flags: &ProjectFlags,
    answers: &mut dyn AnswerSource,
) -> Result<ProjectConfig> {
    ProjectConfigBuilder::from_flags(flags)?
        .with_name(answers)?
        .with_language(answers)?
        .with_docker(answers)?
        .with_src(answers)?
        .with_structured(answers)?
        .build()
}

fn validate_project_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name == "." {
        return Ok(name.to_string());
    }
    let invalid = name.is_empty()
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(Error::InvalidProjectName(name.to_string()));
    }
    Ok(name.to_string())
}

/// `add` options as given on the command line (unparsed)
#[derive(Debug, Clone, Default)]
pub struct AddFlags {
    pub db_type: Option<String>,
    pub orm: Option<String>,
    pub auth_type: Option<String>,
}

/// A database/ORM pair known to be valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseChoice {
    db_type: DbType,
    orm: Orm,
}

impl DatabaseChoice {
    pub fn new(db_type: DbType, orm: Orm) -> Result<Self> {
        if !db_type.supports(orm) {
            return Err(Error::UnsupportedOrm {
                db: db_type.tag().to_string(),
                orm: orm.tag().to_string(),
                allowed: db_type
                    .supported_orms()
                    .iter()
                    .map(|o| o.tag())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(Self { db_type, orm })
    }

    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    pub fn orm(&self) -> Orm {
        self.orm
    }
}

/// Validated input to the add workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddFeatureRequest {
    Database(DatabaseChoice),
    Authentication(AuthType),
}

impl AddFeatureRequest {
    pub fn feature(&self) -> Feature {
        match self {
            AddFeatureRequest::Database(_) => Feature::Database,
            AddFeatureRequest::Authentication(_) => Feature::Authentication,
        }
    }
}

/// Resolve an add request. Partial database flags are an error, not a prompt.
pub fn resolve_add(
    feature: Feature,
    flags: &AddFlags,
    answers: &mut dyn AnswerSource,
) -> Result<AddFeatureRequest> {
    match feature {
        Feature::Database => {
            if flags.auth_type.is_some() {
                tracing::warn!("--auth-type is ignored when adding a database");
            }
            let (db_type, orm) = match (&flags.db_type, &flags.orm) {
                (Some(db), Some(orm)) => (
                    DbType::parse_flag("db-type", db)?,
                    Orm::parse_flag("orm", orm)?,
                ),
                (Some(_), None) => return Err(Error::IncompleteDatabaseFlags { missing: "orm" }),
                (None, Some(_)) => {
                    return Err(Error::IncompleteDatabaseFlags {
                        missing: "db-type",
                    })
                }
                (None, None) => answers.database()?,
            };
            Ok(AddFeatureRequest::Database(DatabaseChoice::new(db_type, orm)?))
        }
        Feature::Authentication => {
            if flags.db_type.is_some() || flags.orm.is_some() {
                tracing::warn!("--db-type/--orm are ignored when adding authentication");
            }
            let auth_type = match &flags.auth_type {
                Some(value) => AuthType::parse_flag("auth-type", value)?,
                None => answers.auth_type()?,
            };
            Ok(AddFeatureRequest::Authentication(auth_type))
        }
    }
}
