//! Layered settings: built-in defaults, then the TOML file, then the
//! environment, then command-line flags.

use issuehub_transport::{TOKEN_ENV_VAR, TokenSource, TransportConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

pub const DEFAULT_CONFIG_FILE: &str = "issuehub.toml";
pub const API_URL_ENV: &str = "GITHUB_API_URL";
pub const GRAPHQL_URL_ENV: &str = "GITHUB_GRAPHQL_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk shape. The token itself never lives in the file, only the name
/// of the variable holding it.
///
/// ```toml
/// token_env = "GITHUB_PERSONAL_ACCESS_TOKEN"
///
/// [upstream]
/// api_base = "https://ghe.example/api/v3"
/// graphql_url = "https://ghe.example/api/graphql"
/// timeout_ms = 10000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub token_env: Option<String>,
    pub upstream: TransportConfig,
}

impl ConfigFile {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub transport: TransportConfig,
    pub token: TokenSource,
    pub source: Option<PathBuf>,
}

impl Settings {
    pub fn load(args: &GlobalArgs) -> Result<Self, ConfigError> {
        Self::load_with(args, |var| std::env::var(var).ok())
    }

    /// `env` stands in for the process environment.
    pub fn load_with(
        args: &GlobalArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let (file, source) = match read_file(args.config.as_deref())? {
            Some((path, file)) => (file, Some(path)),
            None => (ConfigFile::default(), None),
        };

        let mut transport = file.upstream;
        let mut token_env = file.token_env.unwrap_or_else(|| TOKEN_ENV_VAR.to_string());

        apply_endpoints(
            &mut transport,
            env(API_URL_ENV).filter(|v| !v.trim().is_empty()),
            env(GRAPHQL_URL_ENV).filter(|v| !v.trim().is_empty()),
        );
        apply_endpoints(&mut transport, args.api_url.clone(), args.graphql_url.clone());

        if let Some(timeout_ms) = args.timeout_ms {
            transport.timeout_ms = timeout_ms;
        }
        if let Some(var) = &args.token_env {
            token_env = var.clone();
        }

        Ok(Self {
            transport,
            token: TokenSource::Env(token_env),
            source,
        })
    }
}

/// An API base alone also moves the graph endpoint to the same host.
fn apply_endpoints(transport: &mut TransportConfig, api: Option<String>, graphql: Option<String>) {
    if let Some(api) = api {
        let derived = TransportConfig::for_host(&api);
        transport.api_base = derived.api_base;
        transport.graphql_url = derived.graphql_url;
    }
    if let Some(graphql) = graphql {
        transport.graphql_url = graphql;
    }
}

fn read_file(explicit: Option<&str>) -> Result<Option<(PathBuf, ConfigFile)>, ConfigError> {
    let path = match explicit {
        Some(path) => PathBuf::from(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let file = ConfigFile::parse(&path, &text)?;
    Ok(Some((path, file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "issuehub-config-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("temp dir should exist");
        let path = dir.join(name);
        fs::write(&path, contents).expect("config should be written");
        path
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn args_with_config(path: &Path) -> GlobalArgs {
        GlobalArgs {
            config: Some(path.display().to_string()),
            ..GlobalArgs::default()
        }
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let args = GlobalArgs {
            config: Some("/nonexistent/issuehub.toml".into()),
            ..GlobalArgs::default()
        };
        let err = Settings::load_with(&args, env_of(&[])).expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_file(
            "issuehub.toml",
            "token_env = \"MY_TOKEN\"\n[upstream]\ntimeout_ms = 5000\n",
        );
        let settings =
            Settings::load_with(&args_with_config(&path), env_of(&[])).expect("settings");
        assert_eq!(settings.transport.timeout_ms, 5000);
        assert_eq!(settings.transport.api_base, "https://api.github.com");
        assert_eq!(settings.token, TokenSource::Env("MY_TOKEN".into()));
        assert_eq!(settings.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let path = temp_file("issuehub.toml", "[upstream]\nretries = 3\n");
        let err = Settings::load_with(&args_with_config(&path), env_of(&[]))
            .expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("retries"), "got: {err}");
    }

    #[test]
    fn environment_overrides_file_and_flags_override_environment() {
        let path = temp_file(
            "issuehub.toml",
            "[upstream]\napi_base = \"https://file.example/api/v3\"\n",
        );
        let env = env_of(&[
            (API_URL_ENV, "https://env.example/api/v3"),
            (GRAPHQL_URL_ENV, "https://env.example/custom/graphql"),
        ]);

        let settings = Settings::load_with(&args_with_config(&path), &env).expect("settings");
        assert_eq!(settings.transport.api_base, "https://env.example/api/v3");
        assert_eq!(settings.transport.graphql_url, "https://env.example/custom/graphql");

        let args = GlobalArgs {
            api_url: Some("https://flag.example/api/v3".into()),
            timeout_ms: Some(1),
            token_env: Some("FLAG_TOKEN".into()),
            ..args_with_config(&path)
        };
        let settings = Settings::load_with(&args, &env).expect("settings");
        assert_eq!(settings.transport.api_base, "https://flag.example/api/v3");
        assert_eq!(settings.transport.graphql_url, "https://flag.example/api/graphql");
        assert_eq!(settings.transport.timeout_ms, 1);
        assert_eq!(settings.token, TokenSource::Env("FLAG_TOKEN".into()));
    }
}
