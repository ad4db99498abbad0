use crate::error::ConfigError;
use core_types::FieldNames;
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// PostgreSQL truncates identifiers longer than this.
const MAX_IDENTIFIER_LEN: usize = 63;

/// The root configuration structure for the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Every table exposed over HTTP. Falls back to a single `movies`
    /// resource when the list is absent or empty.
    #[serde(default)]
    pub resources: Vec<ResourceSettings>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Must be an IP literal (`0.0.0.0`, `127.0.0.1`, `::`).
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow any origin. When false only localhost origins are allowed.
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Overridden by `DATABASE_URL` when that is set.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    /// How long a request waits for a free connection before failing.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Run `CREATE TABLE IF NOT EXISTS` for each resource on startup.
    #[serde(default)]
    pub create_tables: bool,
}

/// One table exposed as `/<path>` and `/<path>/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSettings {
    pub path: String,
    /// Defaults to `path`.
    #[serde(default)]
    pub table: Option<String>,
    /// Used in "not found" messages. Defaults to `path` without a trailing `s`.
    #[serde(default)]
    pub singular: Option<String>,
    #[serde(default = "default_label_field")]
    pub label_field: String,
    #[serde(default = "default_flag_field")]
    pub flag_field: String,
    /// Defaults to `label_field`.
    #[serde(default)]
    pub label_column: Option<String>,
    /// Defaults to `flag_field`.
    #[serde(default)]
    pub flag_column: Option<String>,
    /// Answer a non-numeric id with 400 instead of 404.
    #[serde(default)]
    pub strict_ids: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_body_limit() -> usize {
    1024 * 1024
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_label_field() -> String {
    "title".to_string()
}

fn default_flag_field() -> String {
    "watched".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: true,
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: 0,
            acquire_timeout_secs: default_acquire_timeout_secs(),
            create_tables: false,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        };
        raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl ResourceSettings {
    /// The classic movies resource: `/movies` with `title` and `watched`.
    pub fn movies() -> Self {
        Self {
            path: "movies".to_string(),
            table: None,
            singular: None,
            label_field: "title".to_string(),
            flag_field: "watched".to_string(),
            label_column: None,
            flag_column: None,
            strict_ids: false,
        }
    }

    /// A todos resource: `/todos` with `description` and `completed`.
    pub fn todos() -> Self {
        Self {
            path: "todos".to_string(),
            label_field: "description".to_string(),
            flag_field: "completed".to_string(),
            ..Self::movies()
        }
    }

    pub fn table(&self) -> &str {
        self.table.as_deref().unwrap_or(self.path.as_str())
    }

    pub fn label_column(&self) -> &str {
        self.label_column.as_deref().unwrap_or(self.label_field.as_str())
    }

    pub fn flag_column(&self) -> &str {
        self.flag_column.as_deref().unwrap_or(self.flag_field.as_str())
    }

    pub fn singular(&self) -> String {
        match &self.singular {
            Some(name) => name.clone(),
            None => self
                .path
                .strip_suffix('s')
                .filter(|s| !s.is_empty())
                .unwrap_or(self.path.as_str())
                .to_string(),
        }
    }

    pub fn field_names(&self) -> FieldNames {
        FieldNames::new(self.label_field.clone(), self.flag_field.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty()
            || !self
                .path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "resource path '{}' must be a single URL segment of letters, digits, '-' or '_'",
                self.path
            )));
        }
        check_identifier(&format!("{} table", self.path), self.table())?;
        check_identifier(&format!("{} label column", self.path), self.label_column())?;
        check_identifier(&format!("{} flag column", self.path), self.flag_column())?;
        if self.label_column() == "id" || self.flag_column() == "id" {
            return Err(ConfigError::Validation(format!(
                "resource '{}': 'id' is reserved for the primary key",
                self.path
            )));
        }
        if self.label_column() == self.flag_column() {
            return Err(ConfigError::Validation(format!(
                "resource '{}': label and flag columns must differ",
                self.path
            )));
        }
        if self.label_field.is_empty() || self.flag_field.is_empty() {
            return Err(ConfigError::Validation(format!(
                "resource '{}': field names cannot be empty",
                self.path
            )));
        }
        if self.label_field == self.flag_field
            || self.label_field == "id"
            || self.flag_field == "id"
        {
            return Err(ConfigError::Validation(format!(
                "resource '{}': label, flag and id fields must have distinct names",
                self.path
            )));
        }
        Ok(())
    }
}

impl Settings {
    /// Fills in defaults that serde cannot express and checks every value
    /// that later ends up in SQL text or a socket address.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.resources.is_empty() {
            tracing::debug!("No resources configured, serving the default movies resource.");
            self.resources.push(ResourceSettings::movies());
        }

        let mut paths = HashSet::new();
        for resource in &self.resources {
            resource.validate()?;
            if !paths.insert(resource.path.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "resource path '{}' is configured more than once",
                    resource.path
                )));
            }
        }
        if paths.contains("health") {
            return Err(ConfigError::Validation(
                "resource path 'health' is reserved".to_string(),
            ));
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.url is empty; set it in the config file or via DATABASE_URL".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Validation(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        self.server.bind_addr()?;
        Ok(self)
    }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*` up to the PostgreSQL length limit.
pub fn is_sql_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    value.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(what: &str, value: &str) -> Result<(), ConfigError> {
    if is_sql_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            what: what.to_string(),
            value: value.to_string(),
        })
    }
}
