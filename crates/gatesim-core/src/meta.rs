//! Scene identity: name, author, description and version.
//!
//! The identity also names a scene when it is embedded as a dependency of
//! another scene, through the `author/name/version` dependency string.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound (exclusive) on the byte length of a scene name.
pub const NAME_LIMIT: usize = 128;
/// Upper bound (exclusive) on the byte length of an author.
pub const AUTHOR_LIMIT: usize = 60;
/// Upper bound (exclusive) on the byte length of a description.
pub const DESCRIPTION_LIMIT: usize = 512;

/// Author recorded in dependency strings of scenes without one.
pub const LOCAL_AUTHOR: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneMeta {
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: i32,
}

impl SceneMeta {
    pub fn new(name: impl Into<String>) -> Self {
        SceneMeta {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Checks every string field against its length bound.
    pub fn validate(&self) -> Result<(), CoreError> {
        check("name", &self.name, NAME_LIMIT)?;
        check("author", &self.author, AUTHOR_LIMIT)?;
        check("description", &self.description, DESCRIPTION_LIMIT)
    }

    /// The `author/name/version` string identifying this scene as a
    /// dependency.
    pub fn to_dependency(&self) -> String {
        let author = if self.author.is_empty() {
            LOCAL_AUTHOR
        } else {
            &self.author
        };
        format!("{author}/{}/{}", self.name, self.version)
    }
}

pub(crate) fn check(field: &'static str, value: &str, limit: usize) -> Result<(), CoreError> {
    if value.len() >= limit {
        return Err(CoreError::InvalidString {
            field,
            len: value.len(),
            max: limit - 1,
        });
    }
    Ok(())
}

/// Splits a dependency string into `(author, name, version)`.
///
/// The name may not contain `/`; author and name must be non-empty.
pub fn parse_dependency(value: &str) -> Result<(String, String, i32), CoreError> {
    let invalid = || CoreError::InvalidDependencyFormat {
        value: value.to_string(),
    };
    let mut parts = value.split('/');
    let (Some(author), Some(name), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if author.is_empty() || name.is_empty() {
        return Err(invalid());
    }
    let version = version.parse::<i32>().map_err(|_| invalid())?;
    Ok((author.to_string(), name.to_string(), version))
}
