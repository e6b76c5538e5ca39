// src/config.rs

use crate::error::ConfigError;
use crate::process::{ConvertOptions, SchemaPolicy, DEFAULT_BATCH_SIZE};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SNOWFLAKE_ACCOUNT: &str = "SNOWFLAKE_ACCOUNT";
pub const SNOWFLAKE_USER: &str = "SNOWFLAKE_USER";
pub const SNOWFLAKE_PASSWORD: &str = "SNOWFLAKE_PASSWORD";
pub const SNOWFLAKE_ROLE: &str = "SNOWFLAKE_ROLE";
pub const SNOWFLAKE_WAREHOUSE: &str = "SNOWFLAKE_WAREHOUSE";
pub const SNOWFLAKE_DATABASE: &str = "SNOWFLAKE_DATABASE";
pub const SNOWFLAKE_RAW_SCHEMA: &str = "SNOWFLAKE_RAW_SCHEMA";
pub const LOCAL_DATA_PATH: &str = "LOCAL_DATA_PATH";
pub const INGEST_CHUNK_SIZE: &str = "INGEST_CHUNK_SIZE";
pub const INGEST_SCHEMA_POLICY: &str = "INGEST_SCHEMA_POLICY";

const DEFAULT_ROLE: &str = "access";
const DEFAULT_WAREHOUSE: &str = "cal_wh";
const DEFAULT_DATABASE: &str = "musicdata";
const DEFAULT_RAW_SCHEMA: &str = "raw";

/// Settings for one ingest run, built once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub account: String,
    pub user: String,
    pub password: String,
    pub role: String,
    pub warehouse: String,
    pub database: String,
    pub raw_schema: String,
    pub local_data_path: PathBuf,
    pub chunk_size: usize,
    pub schema_policy: SchemaPolicy,
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Validate settings from any key lookup.
    ///
    /// Unset and empty values both count as missing. All missing mandatory
    /// variables are reported together before any optional value is parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let account = get(SNOWFLAKE_ACCOUNT);
        let user = get(SNOWFLAKE_USER);
        let password = get(SNOWFLAKE_PASSWORD);
        let local_data_path = get(LOCAL_DATA_PATH);

        let missing: Vec<&'static str> = [
            (SNOWFLAKE_ACCOUNT, account.is_none()),
            (SNOWFLAKE_USER, user.is_none()),
            (SNOWFLAKE_PASSWORD, password.is_none()),
            (LOCAL_DATA_PATH, local_data_path.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(account), Some(user), Some(password), Some(local_data_path)) =
            (account, user, password, local_data_path)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let chunk_size = match get(INGEST_CHUNK_SIZE) {
            None => DEFAULT_BATCH_SIZE,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        var: INGEST_CHUNK_SIZE,
                        value: raw,
                        reason: "must be greater than zero".into(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: INGEST_CHUNK_SIZE,
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
        };

        let schema_policy = match get(INGEST_SCHEMA_POLICY) {
            None => SchemaPolicy::default(),
            Some(raw) => raw.parse::<SchemaPolicy>().map_err(|reason| ConfigError::Invalid {
                var: INGEST_SCHEMA_POLICY,
                value: raw.clone(),
                reason,
            })?,
        };

        Ok(Config {
            account,
            user,
            password,
            role: get(SNOWFLAKE_ROLE).unwrap_or_else(|| DEFAULT_ROLE.into()),
            warehouse: get(SNOWFLAKE_WAREHOUSE).unwrap_or_else(|| DEFAULT_WAREHOUSE.into()),
            database: get(SNOWFLAKE_DATABASE).unwrap_or_else(|| DEFAULT_DATABASE.into()),
            raw_schema: get(SNOWFLAKE_RAW_SCHEMA).unwrap_or_else(|| DEFAULT_RAW_SCHEMA.into()),
            local_data_path: PathBuf::from(local_data_path),
            chunk_size,
            schema_policy,
        })
    }

    /// `DATABASE.SCHEMA` the raw tables land in.
    pub fn qualified_raw_schema(&self) -> String {
        format!(
            "{}.{}",
            self.database.to_ascii_uppercase(),
            self.raw_schema.to_ascii_uppercase()
        )
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            batch_size: self.chunk_size,
            schema_policy: self.schema_policy,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"***")
            .field("role", &self.role)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("raw_schema", &self.raw_schema)
            .field("local_data_path", &self.local_data_path)
            .field("chunk_size", &self.chunk_size)
            .field("schema_policy", &self.schema_policy)
            .finish()
    }
}

/// Load `KEY=VALUE` pairs from `path` into the environment if the file exists.
/// Variables that are already set keep their values.
///
/// Returns whether a file was loaded.
pub fn load_env_file(path: &Path) -> Result<bool, dotenv::Error> {
    if !path.is_file() {
        debug!(path = %path.display(), "no env file");
        return Ok(false);
    }
    dotenv::from_path(path)?;
    debug!(path = %path.display(), "loaded env file");
    Ok(true)
}
