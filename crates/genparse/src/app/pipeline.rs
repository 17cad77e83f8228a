//! Compose extraction, sanitization, feature detection, and tree rendering.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::app::extract::{ExtractOptions, extract_with};
use crate::app::features::detect;
use crate::app::sanitize::sanitize_with;
use crate::app::tree::FileTree;
use crate::domain::model::{Artifacts, CODE_BLOCK_PLACEHOLDER, ParseResult};
use crate::infra::config::Config;

/// Runtime options for a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub extract: ExtractOptions,
    pub placeholder: String,
    /// Feed extracted file contents to feature detection alongside the narrative.
    pub include_file_contents: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            placeholder: CODE_BLOCK_PLACEHOLDER.to_owned(),
            include_file_contents: false,
        }
    }
}

impl PipelineOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        Self {
            extract: ExtractOptions {
                default_path: config.extract.default_path.clone(),
                default_language: config.extract.default_language.clone(),
            },
            placeholder: config.extract.placeholder.clone(),
            include_file_contents: config.features.include_file_contents,
        }
    }
}

/// Turns one generated response into presentation artifacts.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(PipelineOptions::from_config(config))
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Split raw text into narrative and files.
    pub fn parse(&self, raw: &str) -> ParseResult {
        ParseResult {
            narrative: sanitize_with(raw, &self.options.placeholder),
            files: extract_with(raw, &self.options.extract),
        }
    }

    /// Produce every artifact for one response.
    #[instrument(level = "debug", skip_all, fields(bytes = raw.len()))]
    pub fn run(&self, raw: &str) -> Artifacts {
        let parse = self.parse(raw);

        let features = if self.options.include_file_contents {
            let mut corpus = parse.narrative.clone();
            for file in &parse.files {
                corpus.push('\n');
                corpus.push_str(&file.content);
            }
            detect(&corpus)
        } else {
            detect(&parse.narrative)
        };

        let tree = FileTree::from_files(&parse.files);
        let rendered = tree.render();
        debug!(
            files = parse.files.len(),
            features = features.len(),
            conflicts = tree.conflicts().len(),
            "pipeline complete"
        );

        Artifacts {
            parse,
            features,
            tree: rendered,
            tree_conflicts: tree.into_conflicts(),
        }
    }

    /// Process independent responses in parallel, preserving input order.
    pub fn run_many<S: AsRef<str> + Sync>(&self, inputs: &[S]) -> Vec<Artifacts> {
        inputs
            .par_iter()
            .map(|raw| self.run(raw.as_ref()))
            .collect()
    }
}

/// Parse with the built-in defaults.
pub fn parse(raw: &str) -> ParseResult {
    Pipeline::default().parse(raw)
}

/// Run the full pipeline with the built-in defaults.
pub fn run(raw: &str) -> Artifacts {
    Pipeline::default().run(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::features::fallback_features;
    use crate::domain::model::GeneratedFile;

    #[test]
    fn end_to_end_example() {
        let artifacts = run("Here:\n```tsx file=\"app/page.tsx\"\napp code\n```\nDone.");

        assert_eq!(
            artifacts.parse.files,
            vec![GeneratedFile::new("app/page.tsx", "app code", "tsx")]
        );
        assert_eq!(artifacts.parse.narrative, "Here:\n[Code Block]\nDone.");
        assert_eq!(artifacts.tree, "└── app\n    └── page.tsx");
    }

    #[test]
    fn text_without_code_degrades_to_empty_artifacts() {
        let raw = "I could not generate anything this time.";
        let artifacts = run(raw);

        assert!(artifacts.parse.files.is_empty());
        assert_eq!(artifacts.parse.narrative, raw);
        assert_eq!(artifacts.features, fallback_features());
        assert_eq!(artifacts.tree, "");
    }

    #[test]
    fn features_come_from_narrative_by_default() {
        let raw = "A dashboard.\n```tsx file=\"app/login/page.tsx\"\nexport default function Login() {}\n```";
        let artifacts = run(raw);
        assert_eq!(artifacts.features, fallback_features());

        let options = PipelineOptions {
            include_file_contents: true,
            ..PipelineOptions::default()
        };
        let artifacts = Pipeline::new(options).run(raw);
        assert_eq!(artifacts.features[0].name, "Authentication");
    }

    #[test]
    fn run_many_preserves_order() {
        let inputs = vec![
            "```ts file=\"one.ts\"\n1\n```".to_string(),
            "no code".to_string(),
            "```ts file=\"three.ts\"\n3\n```".to_string(),
        ];
        let results = Pipeline::default().run_many(&inputs);

        let counts: Vec<_> = results.iter().map(|a| a.parse.files.len()).collect();
        assert_eq!(counts, vec![1, 0, 1]);
        assert_eq!(results[2].parse.files[0].path, "three.ts");
    }

    #[test]
    fn options_follow_config() {
        let mut config = Config::default();
        config.extract.placeholder = "<snip>".into();
        config.extract.default_path = "main.js".into();

        let parse = Pipeline::from_config(&config).parse("```\nconsole.log(1)\n```");
        assert_eq!(parse.narrative, "<snip>");
        assert_eq!(parse.files[0].path, "main.js");
    }
}
