use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::paths::expand_tilde;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    /// Shown after setup; also the probe targets.
    #[serde(default = "default_services")]
    pub services: Vec<ServiceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tools: ToolsConfig::default(),
            compose: ComposeConfig::default(),
            readiness: ReadinessConfig::default(),
            services: default_services(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub compose: String,
    pub docker: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            compose: "docker-compose".to_string(),
            docker: "docker".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeConfig {
    /// Passed as `-f <file>` when set.
    pub file: Option<PathBuf>,
    /// Working directory for every command.
    pub project_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStrategy {
    #[default]
    Fixed,
    Probe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessConfig {
    pub strategy: ReadinessStrategy,
    pub wait_secs: u64,
    pub timeout_secs: u64,
    pub host: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            strategy: ReadinessStrategy::Fixed,
            wait_secs: 10,
            timeout_secs: 60,
            host: "localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub name: String,
    pub port: u16,
    /// HTTP path; services with a path are shown as a URL.
    #[serde(default)]
    pub path: Option<String>,
}

impl ServiceConfig {
    fn new(name: &str, port: u16, path: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            port,
            path: path.map(str::to_string),
        }
    }

    pub fn address(&self, host: &str) -> String {
        match &self.path {
            Some(path) => format!("http://{}:{}{}", host, self.port, path),
            None => format!("{}:{}", host, self.port),
        }
    }
}

pub fn default_services() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig::new("API Gateway", 3000, Some("/api/docs")),
        ServiceConfig::new("Auth DB", 5435, None),
        ServiceConfig::new("Payments DB", 5433, None),
        ServiceConfig::new("Orders DB", 5434, None),
    ]
}

impl Config {
    /// Command line invoking the compose tool with `args`.
    pub fn compose_command(&self, args: &[&str]) -> String {
        let mut words = Vec::new();
        if let Some(file) = &self.compose.file {
            words.push("-f".to_string());
            words.push(file.display().to_string());
        }
        words.extend(args.iter().map(|a| a.to_string()));
        command_line(&self.tools.compose, &words)
    }

    /// Command line invoking the docker tool with `args`.
    pub fn docker_command(&self, args: &[&str]) -> String {
        command_line(&self.tools.docker, args)
    }
}

/// The tool is a shell fragment (`docker compose` is two words) and goes in
/// verbatim; arguments are quoted for the shell the runner uses.
fn command_line<S: AsRef<str>>(tool: &str, args: &[S]) -> String {
    if args.is_empty() {
        return tool.trim().to_string();
    }
    format!("{} {}", tool.trim(), join_args(args))
}

#[cfg(unix)]
fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    shell_words::join(args)
}

/// `cmd /C` has no single quotes: arguments with spaces or metacharacters
/// are wrapped in double quotes, and embedded double quotes are doubled.
#[cfg(windows)]
fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| quote_cmd_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(any(windows, test))]
fn quote_cmd_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || "&|<>^()\"%!,;=".contains(c));
    if needs_quotes {
        format!("\"{}\"", arg.replace('"', "\"\""))
    } else {
        arg.to_string()
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", "devenv")
        .context("could not determine config directory")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Load the config from `explicit` if given (it must exist), otherwise from
/// the default location, falling back to built-in defaults when that file is
/// absent.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = default_config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load_config(&path)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(contents).context("failed to parse config TOML")?;

    config.compose.file = config
        .compose
        .file
        .map(|p| expand_tilde(&p.to_string_lossy()));
    config.compose.project_dir = config
        .compose
        .project_dir
        .map(|p| expand_tilde(&p.to_string_lossy()));

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.tools.compose.trim().is_empty() {
        bail!("tools.compose must not be empty");
    }
    if config.tools.docker.trim().is_empty() {
        bail!("tools.docker must not be empty");
    }
    if config.readiness.host.trim().is_empty() {
        bail!("readiness.host must not be empty");
    }
    if config.readiness.strategy == ReadinessStrategy::Probe && config.readiness.timeout_secs == 0 {
        bail!("readiness.timeout_secs must be greater than 0 for the probe strategy");
    }

    let mut names = HashSet::new();
    for service in &config.services {
        if service.name.trim().is_empty() {
            bail!("service has empty name (port: {})", service.port);
        }
        if service.port == 0 {
            bail!("service {} has port 0", service.name);
        }
        if !names.insert(service.name.as_str()) {
            bail!("duplicate service name: {}", service.name);
        }
    }

    Ok(())
}
