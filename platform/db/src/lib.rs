//! Document store primitives: connection settings, the MongoDB client and the
//! employee store implementations.

mod memory;
mod mongo;
mod store;

use bson::oid::ObjectId;
use mongodb::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub use memory::MemoryEmployeeStore;
pub use mongo::MongoEmployeeStore;
pub use store::EmployeeStore;

/// Handle to the configured MongoDB database.
pub type DbPool = mongodb::Database;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("store assigned a non-ObjectId identifier")]
    UnexpectedId,
    #[error("document {0} vanished right after insert")]
    MissingAfterInsert(ObjectId),
}

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "employee_db";
const DEFAULT_COLLECTION: &str = "employees";

/// Where the employee collection lives.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl DatabaseSettings {
    /// Reads `MONGODB_URI`, `MONGODB_DATABASE` and `MONGODB_COLLECTION`,
    /// falling back to local defaults.
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let defaults = Self::default();
        let settings = Self {
            uri: non_blank(lookup("MONGODB_URI")).unwrap_or(defaults.uri),
            database: non_blank(lookup("MONGODB_DATABASE")).unwrap_or(defaults.database),
            collection: non_blank(lookup("MONGODB_COLLECTION")).unwrap_or(defaults.collection),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    fn validate(&self) -> DbResult<()> {
        if !(self.uri.starts_with("mongodb://") || self.uri.starts_with("mongodb+srv://")) {
            return Err(DbError::InvalidSettings(format!(
                "MONGODB_URI must use the mongodb:// or mongodb+srv:// scheme, got {}",
                self.uri
            )));
        }
        if self.database.contains(['/', '\\', '.', ' ', '"', '$']) {
            return Err(DbError::InvalidSettings(format!(
                "invalid database name {:?}",
                self.database
            )));
        }
        if self.collection.starts_with("system.") || self.collection.contains('$') {
            return Err(DbError::InvalidSettings(format!(
                "invalid collection name {:?}",
                self.collection
            )));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build a client for `settings` and select its database. The driver connects
/// lazily, so this does not touch the network.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    settings.validate()?;
    let client = Client::with_uri_str(&settings.uri).await?;
    info!(database = %settings.database, "mongodb client ready");
    Ok(client.database(&settings.database))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let settings = DatabaseSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, DatabaseSettings::default());
        assert_eq!(settings.database, "employee_db");
        assert_eq!(settings.collection, "employees");
    }

    #[test]
    fn env_overrides_and_blank_values_fall_back() {
        let settings = DatabaseSettings::from_lookup(lookup(&[
            ("MONGODB_URI", "mongodb+srv://cluster.example.net"),
            ("MONGODB_DATABASE", "  "),
            ("MONGODB_COLLECTION", "staff"),
        ]))
        .unwrap();
        assert_eq!(settings.uri, "mongodb+srv://cluster.example.net");
        assert_eq!(settings.database, "employee_db");
        assert_eq!(settings.collection, "staff");
    }

    #[test]
    fn rejects_foreign_uri_scheme() {
        let err = DatabaseSettings::from_lookup(lookup(&[("MONGODB_URI", "postgres://db")]))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidSettings(_)));
    }

    #[test]
    fn rejects_bad_database_name() {
        let err =
            DatabaseSettings::from_lookup(lookup(&[("MONGODB_DATABASE", "hr.db")])).unwrap_err();
        assert!(err.to_string().contains("hr.db"));
    }
}
