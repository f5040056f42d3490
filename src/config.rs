// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 7090;
const DEFAULT_WORKERS: usize = 4;
const MIN_JWT_SECRET_CHARS: usize = 32;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: u64,
}

fn default_expiration_hours() -> u64 {
    24
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_file: default_data_file(),
        }
    }
}

fn default_data_file() -> String {
    "data.json".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_search_ttl_seconds")]
    pub search_ttl_seconds: u64,
    #[serde(default = "default_registration_ttl_seconds")]
    pub registration_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            search_ttl_seconds: default_search_ttl_seconds(),
            registration_ttl_seconds: default_registration_ttl_seconds(),
        }
    }
}

fn default_search_ttl_seconds() -> u64 {
    60
}

fn default_registration_ttl_seconds() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration that passed startup validation. Handlers and services only
/// ever see this type.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let config = Self::load(root)?;

        if config.server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }

        let secret = &config.auth.jwt.secret;
        if secret.chars().count() < MIN_JWT_SECRET_CHARS {
            return Err(ConfigError::ValidationError(format!(
                "auth.jwt.secret must be at least {} characters, got: {}",
                MIN_JWT_SECRET_CHARS,
                secret.chars().count()
            )));
        }
        if config.auth.jwt.expiration_hours < 1 {
            return Err(ConfigError::ValidationError(format!(
                "auth.jwt.expiration_hours must be at least 1, got: {}",
                config.auth.jwt.expiration_hours
            )));
        }

        if config.storage.data_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.data_file must not be empty".to_string(),
            ));
        }

        if config.cache.search_ttl_seconds < 1 {
            return Err(ConfigError::ValidationError(format!(
                "cache.search_ttl_seconds must be at least 1, got: {}",
                config.cache.search_ttl_seconds
            )));
        }
        if config.cache.registration_ttl_seconds < 1 {
            return Err(ConfigError::ValidationError(format!(
                "cache.registration_ttl_seconds must be at least 1, got: {}",
                config.cache.registration_ttl_seconds
            )));
        }

        match config.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "logging.level must be one of trace, debug, info, warn, error; got: {}",
                    other
                )));
            }
        }

        Ok(ValidatedConfig {
            server: config.server,
            auth: config.auth,
            storage: config.storage,
            cache: config.cache,
            logging: config.logging,
        })
    }
}

impl ValidatedConfig {
    pub fn data_file_path(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.storage.data_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

/// Create config.yaml with generated defaults if it does not exist yet.
/// Returns true when a new file was written.
pub fn ensure_config(root: &Path) -> Result<bool, ConfigError> {
    let root_path = normalize_root(root)?;
    let config_path = root_path.join("config.yaml");

    if config_path.exists() {
        return Ok(false);
    }

    let jwt_secret = generate_jwt_secret();
    let contents = default_config_yaml(&jwt_secret);

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => {
            return Err(ConfigError::LoadError(format!(
                "Failed to create config file '{}': {}",
                config_path.display(),
                err
            )));
        }
    };

    file.write_all(contents.as_bytes())
        .map_err(|err| ConfigError::LoadError(format!("Failed to write config file: {}", err)))?;
    file.sync_all()
        .map_err(|err| ConfigError::LoadError(format!("Failed to sync config file: {}", err)))?;

    log::info!(
        "Created config.yaml with a generated JWT secret (listening on port {})",
        DEFAULT_PORT
    );

    Ok(true)
}

fn normalize_root(root: &Path) -> Result<PathBuf, ConfigError> {
    let root_path = if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root.to_path_buf()
    };

    if root_path.exists() {
        if !root_path.is_dir() {
            return Err(ConfigError::LoadError(format!(
                "Runtime root is not a directory: {}",
                root_path.display()
            )));
        }
        return Ok(root_path);
    }

    fs::create_dir_all(&root_path).map_err(|err| {
        ConfigError::LoadError(format!(
            "Failed to create runtime root '{}': {}",
            root_path.display(),
            err
        ))
    })?;
    Ok(root_path)
}

fn generate_jwt_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn default_config_yaml(jwt_secret: &str) -> String {
    format!(
        "server:\n  host: \"0.0.0.0\"\n  port: {port}\n  workers: {workers}\n\nauth:\n  jwt:\n    secret: \"{jwt_secret}\"\n    expiration_hours: 24\n\nstorage:\n  data_file: \"data.json\"\n\ncache:\n  search_ttl_seconds: 60\n  registration_ttl_seconds: 3600\n\nlogging:\n  level: \"info\"\n",
        port = DEFAULT_PORT,
        workers = DEFAULT_WORKERS,
        jwt_secret = jwt_secret,
    )
}
