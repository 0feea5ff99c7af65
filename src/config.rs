use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "signet")]
#[command(about = "Runs the signet bookmarking service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".signet")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    database: String,
    port: i32,
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> i32 {
        self.port
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    #[serde(default = "default_session_ttl_hours")]
    session_ttl_hours: i64,
}

impl Default for Auth {
    fn default() -> Self {
        Auth {
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

fn default_session_ttl_hours() -> i64 {
    24
}

impl Auth {
    pub fn get_session_ttl_hours(&self) -> i64 {
        self.session_ttl_hours
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub auth: Auth,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        let yaml_with_env = Config::substitute_env_vars(&yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // Handle default values like ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_default_when_var_missing() {
        let yaml = "port: ${SIGNET_TEST_MISSING_PORT:-8080}";
        let out = Config::substitute_env_vars(yaml).unwrap();
        assert_eq!(out, "port: 8080");
    }

    #[test]
    fn parses_config_with_defaulted_auth_section() {
        let yaml = "app:\n  database: signet.db\n  port: 3000\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.app.get_port(), 3000);
        assert_eq!(cfg.auth.get_session_ttl_hours(), 24);
    }
}
