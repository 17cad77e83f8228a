//! Render pipeline artifacts into human or machine readable reports.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::model::{Artifacts, Feature, TreeConflict};
use crate::infra::config::Config;

const PROJECT_ID_LEN: usize = 6;

const INSTALL_STEPS: &[&str] = &[
    "Download the generated files, keeping the directory structure",
    "Install dependencies with `npm install`",
    "Start the development server with `npm run dev`",
    "Open http://localhost:3000 in your browser",
];

const TECH_STACK: &[(&str, &str)] = &[
    ("Framework", "Next.js (App Router)"),
    ("Styling", "Tailwind CSS"),
    ("Components", "shadcn/ui"),
    ("Language", "TypeScript"),
    ("Icons", "Lucide React"),
    ("Deployment", "Vercel"),
];

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Markdown summary rendered from a template.
    Markdown,
    /// Plain text summary rendered from a template.
    Plain,
    /// Pretty-printed JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Built-in template used by templated formats.
    pub fn default_template(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Markdown => Some("summary"),
            OutputFormat::Plain => Some("plain_text"),
            OutputFormat::Json | OutputFormat::Yaml => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "plain" | "text" | "txt" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(OutputFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`OutputFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OutputFormatParseError {
    #[error("unknown output format '{0}'")]
    UnknownFormat(String),
}

/// Runtime options controlling report rendering.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: OutputFormat,
    /// Built-in template name or a path to a template file.
    pub template: String,
    pub output_path: Option<PathBuf>,
}

impl ReportOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        let format = config
            .report
            .output_format()
            .parse()
            .unwrap_or(OutputFormat::Markdown);
        let mut template = config.report.template();
        if template == "summary"
            && let Some(builtin) = format.default_template()
        {
            template = builtin.to_owned();
        }
        Self {
            format,
            template,
            output_path: None,
        }
    }

    /// Switch format, resetting the template to that format's built-in one.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        if let Some(template) = format.default_template() {
            self.template = template.to_owned();
        }
        self
    }
}

/// Per-file statistics shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub language: String,
    pub lines: usize,
    pub characters: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechEntry {
    pub name: &'static str,
    pub value: &'static str,
}

/// Serializable view of one generation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub project_id: String,
    pub prompt: Option<String>,
    pub narrative: String,
    pub files: Vec<FileSummary>,
    pub features: Vec<Feature>,
    pub tree: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tree_conflicts: Vec<TreeConflict>,
    pub install_steps: Vec<&'static str>,
    pub tech_stack: Vec<TechEntry>,
}

impl Report {
    /// Assemble a report for `artifacts` parsed from `raw`.
    pub fn new(raw: &str, artifacts: &Artifacts, prompt: Option<&str>) -> Result<Self> {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("failed to format report timestamp")?;

        let files = artifacts
            .parse
            .files
            .iter()
            .map(|file| FileSummary {
                path: file.path.clone(),
                language: file.language.clone(),
                lines: file.line_count(),
                characters: file.char_count(),
                content: file.content.clone(),
            })
            .collect();

        Ok(Self {
            generated_at,
            project_id: project_id(raw),
            prompt: prompt.map(str::to_owned),
            narrative: artifacts.parse.narrative.clone(),
            files,
            features: artifacts.features.clone(),
            tree: artifacts.tree.clone(),
            tree_conflicts: artifacts.tree_conflicts.clone(),
            install_steps: INSTALL_STEPS.to_vec(),
            tech_stack: TECH_STACK
                .iter()
                .map(|&(name, value)| TechEntry { name, value })
                .collect(),
        })
    }
}

/// Short base36 identifier derived from the raw response.
pub fn project_id(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let mut value = u64::from_be_bytes(prefix);

    let mut id = String::with_capacity(PROJECT_ID_LEN);
    for _ in 0..PROJECT_ID_LEN {
        let digit = (value % 36) as u32;
        id.push(char::from_digit(digit, 36).unwrap_or('0'));
        value /= 36;
    }
    id
}

/// Result of a report operation.
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub rendered: String,
    pub output_path: Option<PathBuf>,
}

/// Renders reports and writes them out.
pub struct Reporter {
    env: Environment<'static>,
}

impl Reporter {
    /// Create a reporter with the built-in templates loaded.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        for &(name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)
                .map_err(|err| anyhow!("failed to register template '{name}': {err}"))?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, report: &Report, options: &ReportOptions) -> Result<String> {
        self.render_all(std::slice::from_ref(report), options)
    }

    /// Render one report, or several as a JSON/YAML array or as separated
    /// template documents.
    pub fn render_all(&self, reports: &[Report], options: &ReportOptions) -> Result<String> {
        match (options.format, reports) {
            (OutputFormat::Json, [report]) => {
                serde_json::to_string_pretty(report).context("failed to serialize report as JSON")
            }
            (OutputFormat::Json, _) => {
                serde_json::to_string_pretty(reports).context("failed to serialize reports as JSON")
            }
            (OutputFormat::Yaml, [report]) => {
                serde_yaml::to_string(report).context("failed to serialize report as YAML")
            }
            (OutputFormat::Yaml, _) => {
                serde_yaml::to_string(reports).context("failed to serialize reports as YAML")
            }
            (OutputFormat::Markdown | OutputFormat::Plain, _) => Ok(reports
                .iter()
                .map(|report| self.render_template(report, &options.template))
                .collect::<Result<Vec<_>>>()?
                .join("\n---\n\n")),
        }
    }

    /// Render and persist the report when an output path is set.
    pub fn write(&self, report: &Report, options: &ReportOptions) -> Result<ReportResult> {
        self.write_all(std::slice::from_ref(report), options)
    }

    pub fn write_all(&self, reports: &[Report], options: &ReportOptions) -> Result<ReportResult> {
        let rendered = self.render_all(reports, options)?;

        if let Some(path) = &options.output_path {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory: {}", parent.display())
                })?;
            }
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), reports = reports.len(), "report written");
        }

        Ok(ReportResult {
            rendered,
            output_path: options.output_path.clone(),
        })
    }

    /// A built-in template name, else a template file on disk.
    fn render_template(&self, report: &Report, name: &str) -> Result<String> {
        if let Ok(template) = self.env.get_template(name) {
            return template
                .render(report)
                .map_err(|err| anyhow!("failed to render template '{name}': {err}"));
        }

        let path = Path::new(name);
        if !path.exists() {
            anyhow::bail!("template '{name}' not found (built-in or filesystem)");
        }
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to load template from {}", path.display()))?;
        self.env
            .render_str(&source, report)
            .map_err(|err| anyhow!("failed to render template '{name}': {err}"))
    }
}

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("summary", DEFAULT_MARKDOWN_TEMPLATE),
    ("plain_text", DEFAULT_PLAIN_TEMPLATE),
];

const DEFAULT_MARKDOWN_TEMPLATE: &str = r#"# App Generated Successfully

Generated at: {{ generated_at }}
Project ID: {{ project_id }}

{% if prompt %}
## Original Prompt
```text
{{ prompt }}
```

{% endif %}
## Project Stats
- {{ files | length }} files generated

## Feature Highlights
{% for feature in features %}
{{ loop.index }}. **{{ feature.name }}**: {{ feature.description }}
{% endfor %}

## Technology Stack
{% for entry in tech_stack %}
- {{ entry.name }}: {{ entry.value }}
{% endfor %}

{% if tree %}
## File Structure
```
{{ tree }}
```

{% endif %}
{% if files %}
## Files
{% for file in files %}
- `{{ file.path }}` ({{ file.language }}, {{ file.lines }} lines, {{ file.characters }} characters)
{% endfor %}

{% endif %}
## Overview
{{ narrative }}

## Installation
{% for step in install_steps %}
{{ loop.index }}. {{ step }}
{% endfor %}
"#;

const DEFAULT_PLAIN_TEMPLATE: &str = r#"App generated at {{ generated_at }} (project {{ project_id }})
{% if prompt %}Prompt: {{ prompt }}
{% endif %}
{{ files | length }} files generated.

Features:
{% for feature in features %}
{{ loop.index }}. {{ feature.name }} - {{ feature.description }}
{% endfor %}
{% if tree %}

File structure:
{{ tree }}
{% endif %}

{{ narrative }}
"#;
