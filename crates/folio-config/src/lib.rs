//! Configuration management for folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `site.content_dir`
//! - `site.modules_dir`
//! - `assets.source_dir`
//! - `assets.compiled_dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the site root (content, modules and assets resolve against it).
    pub site_root: Option<PathBuf>,
    /// Override route collision strictness.
    pub strict_routes: Option<bool>,
    /// Override asset pipeline toggle.
    pub assets_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Site layout configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Asset pipeline configuration (paths are relative strings from TOML).
    assets: AssetsConfigRaw,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Resolved asset configuration (set after loading).
    #[serde(skip)]
    pub assets_resolved: AssetsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 30100,
        }
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    content_dir: Option<String>,
    modules_dir: Option<String>,
    global_dir: Option<String>,
    routes_file: Option<String>,
    root_module: Option<String>,
    max_include_depth: Option<usize>,
    strict_routes: Option<bool>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Directory holding content files.
    pub content_dir: PathBuf,
    /// Directory holding module partials.
    pub modules_dir: PathBuf,
    /// Name of the reserved global content folder inside `content_dir`.
    pub global_dir: String,
    /// Name of the route alias file inside `content_dir`.
    pub routes_file: String,
    /// Module rendered at the root of every page.
    pub root_module: String,
    /// Maximum nesting of `include` calls.
    pub max_include_depth: usize,
    /// Treat route collisions as startup errors.
    pub strict_routes: bool,
}

impl SiteConfig {
    /// Default site layout below `base`.
    #[must_use]
    pub fn with_base(base: &Path) -> Self {
        Self {
            content_dir: base.join("content"),
            modules_dir: base.join("modules"),
            global_dir: "_global".to_owned(),
            routes_file: "_routes.yaml".to_owned(),
            root_module: "core".to_owned(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            strict_routes: false,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Default bound on nested `include` calls.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Largest accepted `site.max_include_depth`.
pub const MAX_INCLUDE_DEPTH_LIMIT: usize = 256;

/// Raw asset configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AssetsConfigRaw {
    enabled: Option<bool>,
    source_dir: Option<String>,
    compiled_dir: Option<String>,
    styles_command: Option<Vec<String>>,
    scripts_command: Option<Vec<String>>,
}

/// Resolved asset pipeline configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetsConfig {
    /// Whether the asset pipeline runs before serving.
    pub enabled: bool,
    /// Directory with `vendor/`, `media/`, `styles/` and `scripts/`.
    pub source_dir: PathBuf,
    /// Output directory, also mounted as static files.
    pub compiled_dir: PathBuf,
    /// Command compiling `styles/main.scss`; `{input}`/`{output}` are substituted.
    pub styles_command: Vec<String>,
    /// Command compiling `scripts/main.ts`; `{input}`/`{output}` are substituted.
    pub scripts_command: Vec<String>,
}

impl AssetsConfig {
    /// Default asset layout below `base`.
    #[must_use]
    pub fn with_base(base: &Path) -> Self {
        Self {
            enabled: true,
            source_dir: base.join("assets"),
            compiled_dir: base.join("_compiled"),
            styles_command: default_styles_command(),
            scripts_command: default_scripts_command(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

fn default_styles_command() -> Vec<String> {
    ["sass", "--no-source-map", "--style=compressed", "{input}", "{output}"]
        .map(str::to_owned)
        .to_vec()
}

fn default_scripts_command() -> Vec<String> {
    ["esbuild", "{input}", "--bundle", "--minify", "--outfile={output}"]
        .map(str::to_owned)
        .to_vec()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`FOLIO_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a command to name at least a program.
fn require_command(command: &[String], field: &str) -> Result<(), ConfigError> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "{field} must have at least one element"
        ))),
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(root) = &settings.site_root {
            self.resolve_paths(root)?;
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(strict) = settings.strict_routes {
            self.site_resolved.strict_routes = strict;
        }
        if let Some(enabled) = settings.assets_enabled {
            self.assets_resolved.enabled = enabled;
        }
        self.validate()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            site: SiteConfigRaw::default(),
            assets: AssetsConfigRaw::default(),
            site_resolved: SiteConfig::with_base(base),
            assets_resolved: AssetsConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_site()?;
        self.validate_assets()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 lets the OS pick a port, which is never what a site config wants
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        let site = &self.site_resolved;
        require_non_empty(&site.root_module, "site.root_module")?;
        require_non_empty(&site.global_dir, "site.global_dir")?;
        require_non_empty(&site.routes_file, "site.routes_file")?;

        if site.global_dir.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "site.global_dir must be a folder name, not a path".to_owned(),
            ));
        }
        if site.max_include_depth == 0 {
            return Err(ConfigError::Validation(
                "site.max_include_depth must be greater than 0".to_owned(),
            ));
        }
        if site.max_include_depth > MAX_INCLUDE_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "site.max_include_depth must be at most {MAX_INCLUDE_DEPTH_LIMIT}"
            )));
        }

        Ok(())
    }

    fn validate_assets(&self) -> Result<(), ConfigError> {
        require_command(&self.assets_resolved.styles_command, "assets.styles_command")?;
        require_command(
            &self.assets_resolved.scripts_command,
            "assets.scripts_command",
        )?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let expand_opt = |value: &mut Option<String>, field: &str| -> Result<(), ConfigError> {
            if let Some(raw) = value.as_deref() {
                *value = Some(expand::expand_env(raw, field)?);
            }
            Ok(())
        };
        expand_opt(&mut self.site.content_dir, "site.content_dir")?;
        expand_opt(&mut self.site.modules_dir, "site.modules_dir")?;
        expand_opt(&mut self.assets.source_dir, "assets.source_dir")?;
        expand_opt(&mut self.assets.compiled_dir, "assets.compiled_dir")?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on the given directory.
    fn resolve_paths(&mut self, base: &Path) -> Result<(), ConfigError> {
        let resolve = |path: Option<&str>, default: &str| base.join(path.unwrap_or(default));

        let defaults = SiteConfig::with_base(base);
        self.site_resolved = SiteConfig {
            content_dir: resolve(self.site.content_dir.as_deref(), "content"),
            modules_dir: resolve(self.site.modules_dir.as_deref(), "modules"),
            global_dir: self.site.global_dir.clone().unwrap_or(defaults.global_dir),
            routes_file: self
                .site
                .routes_file
                .clone()
                .unwrap_or(defaults.routes_file),
            root_module: self
                .site
                .root_module
                .clone()
                .unwrap_or(defaults.root_module),
            max_include_depth: self
                .site
                .max_include_depth
                .unwrap_or(defaults.max_include_depth),
            strict_routes: self.site.strict_routes.unwrap_or(defaults.strict_routes),
        };

        self.assets_resolved = AssetsConfig {
            enabled: self.assets.enabled.unwrap_or(true),
            source_dir: resolve(self.assets.source_dir.as_deref(), "assets"),
            compiled_dir: resolve(self.assets.compiled_dir.as_deref(), "_compiled"),
            styles_command: self
                .assets
                .styles_command
                .clone()
                .unwrap_or_else(default_styles_command),
            scripts_command: self
                .assets
                .scripts_command
                .clone()
                .unwrap_or_else(default_scripts_command),
        };

        Ok(())
    }
}
