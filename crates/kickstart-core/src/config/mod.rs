//! Option types and resolution of CLI flags plus interactive answers
//! into a complete scaffold configuration or add request

pub mod options;
pub mod resolver;

pub use options::{AuthType, DbType, Feature, Language, OptionTag, Orm};
pub use resolver::{
    resolve_add, resolve_project, AddFeatureRequest, AddFlags, AnswerSource, DatabaseChoice,
    Defaults, ProjectConfig, ProjectFlags, DEFAULT_PROJECT_NAME,
};
