//! Option value types: language, database, ORM, auth provider, feature

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed set of values that can be named on the command line
pub trait OptionTag: Sized + Copy + 'static {
    /// Every value, in the order prompts list them
    const ALL: &'static [Self];

    /// Lowercase tag used on the command line and in components.json
    fn tag(&self) -> &'static str;

    /// Human-readable name
    fn display_name(&self) -> &'static str;

    /// Parse a flag value, failing with the offending flag and the allowed set
    fn parse_flag(flag: &'static str, value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.tag() == wanted)
            .ok_or_else(|| Error::InvalidOption {
                flag,
                value: value.to_string(),
                allowed: Self::allowed(),
            })
    }

    /// Comma-separated list of accepted tags
    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|v| v.tag())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Project language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ts,
    Js,
}

impl Language {
    /// File extension of entry files (`index.ts`, `index.js`)
    pub fn extension(&self) -> &'static str {
        self.tag()
    }
}

impl OptionTag for Language {
    const ALL: &'static [Self] = &[Language::Ts, Language::Js];

    fn tag(&self) -> &'static str {
        match self {
            Language::Ts => "ts",
            Language::Js => "js",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Language::Ts => "TypeScript",
            Language::Js => "JavaScript",
        }
    }
}

/// Database engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    Mongodb,
    Postgres,
}

impl DbType {
    /// ORMs/ODMs that have templates for this database
    pub fn supported_orms(&self) -> &'static [Orm] {
        match self {
            DbType::Mongodb => &[Orm::Mongoose, Orm::Prisma],
            DbType::Postgres => &[Orm::Prisma, Orm::Drizzle],
        }
    }

    pub fn supports(&self, orm: Orm) -> bool {
        self.supported_orms().contains(&orm)
    }
}

impl OptionTag for DbType {
    const ALL: &'static [Self] = &[DbType::Mongodb, DbType::Postgres];

    fn tag(&self) -> &'static str {
        match self {
            DbType::Mongodb => "mongodb",
            DbType::Postgres => "postgres",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            DbType::Mongodb => "MongoDB",
            DbType::Postgres => "PostgreSQL",
        }
    }
}

/// ORM/ODM used to talk to the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orm {
    Mongoose,
    Prisma,
    Drizzle,
}

impl OptionTag for Orm {
    const ALL: &'static [Self] = &[Orm::Mongoose, Orm::Prisma, Orm::Drizzle];

    fn tag(&self) -> &'static str {
        match self {
            Orm::Mongoose => "mongoose",
            Orm::Prisma => "prisma",
            Orm::Drizzle => "drizzle",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Orm::Mongoose => "Mongoose",
            Orm::Prisma => "Prisma",
            Orm::Drizzle => "Drizzle",
        }
    }
}

/// Authentication provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Jwt,
    Clerk,
}

impl OptionTag for AuthType {
    const ALL: &'static [Self] = &[AuthType::Jwt, AuthType::Clerk];

    fn tag(&self) -> &'static str {
        match self {
            AuthType::Jwt => "jwt",
            AuthType::Clerk => "clerk",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            AuthType::Jwt => "JWT",
            AuthType::Clerk => "Clerk",
        }
    }
}

/// Feature that `add` can install into an existing project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Database,
    Authentication,
}

impl Feature {
    /// Parse the positional argument of `add` (`db`, `database`, `auth`, `authentication`)
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "db" | "database" => Ok(Feature::Database),
            "auth" | "authentication" => Ok(Feature::Authentication),
            _ => Err(Error::UnknownFeature(value.to_string())),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Feature::Database => "database",
            Feature::Authentication => "authentication",
        }
    }
}

macro_rules! display_via_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.display_name())
            }
        })*
    };
}

display_via_name!(Language, DbType, Orm, AuthType, Feature);
