//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::model::{CODE_BLOCK_PLACEHOLDER, DEFAULT_LANGUAGE, DEFAULT_PATH};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".genparse/config.toml";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub delivery: Delivery,
    #[serde(default)]
    pub report: Report,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extract {
    #[serde(default = "Extract::default_path")]
    pub default_path: String,
    #[serde(default = "Extract::default_language")]
    pub default_language: String,
    #[serde(default = "Extract::default_placeholder")]
    pub placeholder: String,
}

impl Extract {
    fn default_path() -> String {
        DEFAULT_PATH.to_owned()
    }

    fn default_language() -> String {
        DEFAULT_LANGUAGE.to_owned()
    }

    fn default_placeholder() -> String {
        CODE_BLOCK_PLACEHOLDER.to_owned()
    }
}

impl Default for Extract {
    fn default() -> Self {
        Self {
            default_path: Self::default_path(),
            default_language: Self::default_language(),
            placeholder: Self::default_placeholder(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Features {
    /// Also scan extracted file contents, not only the narrative.
    #[serde(default)]
    pub include_file_contents: bool,
}

/// Transport limits of the chat consumer receiving the artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(default = "Delivery::default_max_attachments")]
    pub max_attachments: usize,
    #[serde(default = "Delivery::default_message_limit")]
    pub message_limit: usize,
    #[serde(default = "Delivery::default_preview_limit")]
    pub preview_limit: usize,
    #[serde(default = "Delivery::default_preview_marker")]
    pub preview_marker: String,
    #[serde(default = "Delivery::default_preview_candidates")]
    pub preview_candidates: Vec<String>,
}

impl Delivery {
    fn default_max_attachments() -> usize {
        10
    }

    fn default_message_limit() -> usize {
        2000
    }

    fn default_preview_limit() -> usize {
        1900
    }

    fn default_preview_marker() -> String {
        "...".into()
    }

    fn default_preview_candidates() -> Vec<String> {
        vec!["page.tsx".into(), "index".into()]
    }
}

impl Default for Delivery {
    fn default() -> Self {
        Self {
            max_attachments: Self::default_max_attachments(),
            message_limit: Self::default_message_limit(),
            preview_limit: Self::default_preview_limit(),
            preview_marker: Self::default_preview_marker(),
            preview_candidates: Self::default_preview_candidates(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Report {
    #[serde(default)]
    output_format: Option<String>,
    #[serde(default)]
    template: Option<String>,
}

impl Report {
    fn default_output_format() -> &'static str {
        "markdown"
    }

    fn default_template() -> &'static str {
        "summary"
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(Self::default_output_format())
    }

    pub fn template(&self) -> String {
        self.template
            .clone()
            .unwrap_or_else(|| Self::default_template().to_owned())
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    output_format: Option<String>,
    default_language: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            output_format: env::var("GENPARSE_OUTPUT_FORMAT").ok(),
            default_language: env::var("GENPARSE_DEFAULT_LANGUAGE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(output_format: &str, default_language: &str) -> Self {
        Self {
            output_format: Some(output_format.to_owned()),
            default_language: Some(default_language.to_owned()),
        }
    }
}

/// A single config file. Only the keys it sets override lower layers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    extract: ExtractLayer,
    features: FeaturesLayer,
    delivery: DeliveryLayer,
    report: Report,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractLayer {
    default_path: Option<String>,
    default_language: Option<String>,
    placeholder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeaturesLayer {
    include_file_contents: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeliveryLayer {
    max_attachments: Option<usize>,
    message_limit: Option<usize>,
    preview_limit: Option<usize>,
    preview_marker: Option<String>,
    preview_candidates: Option<Vec<String>>,
}

impl ConfigLayer {
    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("invalid config file: {}", path.display()))
    }
}

impl Config {
    /// Load configuration from defaults, user config, workspace config, an
    /// optional explicit file, and env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        if let Some(path) = explicit
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Self::load_with_layers(
            [global, workspace, explicit.map(Path::to_path_buf)],
            env,
        )
    }

    fn load_with_layers(
        files: [Option<PathBuf>; 3],
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut config = Self::from_str(&DEFAULT_CONFIG)?;

        for path in files.into_iter().flatten().filter(|path| path.exists()) {
            tracing::debug!(path = %path.display(), "loading config layer");
            config = config.apply(ConfigLayer::from_file(&path)?);
        }

        Ok(apply_env_overrides(config, env_overrides))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn apply(mut self, layer: ConfigLayer) -> Self {
        let ConfigLayer {
            extract,
            features,
            delivery,
            report,
        } = layer;

        set(&mut self.extract.default_path, extract.default_path);
        set(&mut self.extract.default_language, extract.default_language);
        set(&mut self.extract.placeholder, extract.placeholder);

        set(
            &mut self.features.include_file_contents,
            features.include_file_contents,
        );

        set(&mut self.delivery.max_attachments, delivery.max_attachments);
        set(&mut self.delivery.message_limit, delivery.message_limit);
        set(&mut self.delivery.preview_limit, delivery.preview_limit);
        set(&mut self.delivery.preview_marker, delivery.preview_marker);
        set(
            &mut self.delivery.preview_candidates,
            delivery.preview_candidates,
        );

        self.report.output_format = report.output_format.or(self.report.output_format);
        self.report.template = report.template.or(self.report.template);
        self
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("genparse/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(output_format) = env.output_format {
        config.report.output_format = Some(output_format);
    }
    if let Some(language) = env.default_language {
        config.extract.default_language = language;
    }
    config
}
