use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LIBRARY_ENV";
const CONFIG_DIR_ENV: &str = "LIBRARY_CONFIG_DIR";
const ENV_PREFIX: &str = "LIBRARY";
const PORT_ENV: &str = "PORT";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    /// Parse the value of `LIBRARY_ENV`.
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub books: BooksSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// `LIBRARY_*` variables and finally the bare `PORT` variable.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join("config"))
                .with_context(|| "unable to resolve current directory")?,
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = Environment::parse(&environment)?;

        if let Ok(port) = std::env::var(PORT_ENV) {
            settings.server.apply_port_override(&port)?;
        }

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        4000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    /// Apply a raw `PORT` value on top of the layered configuration.
    pub fn apply_port_override(&mut self, raw: &str) -> anyhow::Result<()> {
        self.port = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {} value '{}'", PORT_ENV, raw))?;
        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Directive string for the log filter; `RUST_LOG` takes precedence.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info,tower_http=info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// How `PUT /books/{id}` treats a matched record.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Build the replacement and return it, leaving the stored record as is.
    #[default]
    Detached,
    /// Write the replacement back into the collection, keeping the stored id.
    WriteBack,
}

/// Where the identifier of a created record comes from.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdAssignment {
    /// Store whatever id the caller sent, including none at all.
    #[default]
    Caller,
    /// Assign `max(id) + 1` when the caller omits the id.
    Sequential,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BooksSettings {
    #[serde(default = "BooksSettings::default_seed")]
    pub seed: bool,
    #[serde(default)]
    pub update_mode: UpdateMode,
    #[serde(default)]
    pub id_assignment: IdAssignment,
}

impl BooksSettings {
    fn default_seed() -> bool {
        true
    }
}

impl Default for BooksSettings {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            update_mode: UpdateMode::default(),
            id_assignment: IdAssignment::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_port_matches_legacy_service() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.server.bind_address(), "0.0.0.0:4000");
    }

    #[test]
    fn books_defaults_keep_updates_detached() {
        let books = BooksSettings::default();
        assert!(books.seed);
        assert_eq!(books.update_mode, UpdateMode::Detached);
        assert_eq!(books.id_assignment, IdAssignment::Caller);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert_eq!(Environment::parse("staging").unwrap(), Environment::Staging);
        assert!(Environment::parse("qa").is_err());
    }

    #[test]
    fn port_override_parses_and_rejects_garbage() {
        let mut server = ServerSettings::default();
        server.apply_port_override(" 5050 ").unwrap();
        assert_eq!(server.port, 5050);

        assert!(server.apply_port_override("http").is_err());
        assert_eq!(server.port, 5050);
    }

    #[test]
    fn books_section_deserializes_switches() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [books]
                seed = false
                update_mode = "write_back"
                id_assignment = "sequential"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let settings: Settings = cfg.try_deserialize().unwrap();
        assert!(!settings.books.seed);
        assert_eq!(settings.books.update_mode, UpdateMode::WriteBack);
        assert_eq!(settings.books.id_assignment, IdAssignment::Sequential);
        assert_eq!(settings.server.port, 4000);
    }
}
