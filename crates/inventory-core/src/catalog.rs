//! Locations and projects that items can reference by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// A place where items are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// When the location was registered.
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Create a location, trimming the name.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` if the name is empty.
    pub fn new(name: &str, description: Option<String>) -> Result<Self, InventoryError> {
        Ok(Self {
            name: catalog_name(name)?,
            description: description.filter(|d| !d.trim().is_empty()),
            created_at: Utc::now(),
        })
    }
}

/// A project that items can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// When the project was registered.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a project, trimming the name.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` if the name is empty.
    pub fn new(name: &str, description: Option<String>) -> Result<Self, InventoryError> {
        Ok(Self {
            name: catalog_name(name)?,
            description: description.filter(|d| !d.trim().is_empty()),
            created_at: Utc::now(),
        })
    }
}

fn catalog_name(name: &str) -> Result<String, InventoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InventoryError::validation("name", "must not be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_required() {
        let location = Location::new("  Server Room ", None).unwrap();
        assert_eq!(location.name, "Server Room");
        assert!(Project::new("", None).is_err());
    }

    #[test]
    fn blank_description_is_dropped() {
        let project = Project::new("Migration", Some("  ".into())).unwrap();
        assert!(project.description.is_none());
    }
}
