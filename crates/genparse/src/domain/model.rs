//! Domain models for extracted files, parse results, and detected features.

use serde::{Deserialize, Serialize};

/// Language tag assigned when a fence does not declare one.
pub const DEFAULT_LANGUAGE: &str = "typescript";
/// Path used for the synthetic file built from unnamed fences.
pub const DEFAULT_PATH: &str = "generated-app.tsx";
/// Token substituted for each fenced segment in the narrative.
pub const CODE_BLOCK_PLACEHOLDER: &str = "[Code Block]";

/// A single file recovered from generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Destination path, `/`-separated.
    pub path: String,
    pub content: String,
    pub language: String,
}

impl GeneratedFile {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            language: language.into(),
        }
    }

    /// Number of Unicode scalar values in the content.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Files and narrative derived from one block of generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub narrative: String,
    pub files: Vec<GeneratedFile>,
}

/// A heuristic capability claim about generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
}

impl Feature {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Insertion that could not be placed in the file tree as requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConflict {
    /// Full path of the file whose insertion conflicted.
    pub path: String,
    /// Segment prefix at which the conflict occurred.
    pub segment: String,
    pub resolution: ConflictResolution,
}

/// How a file/directory name clash was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictResolution {
    /// An existing file leaf became a directory.
    LeafPromoted,
    /// A file leaf was dropped because a directory holds the name.
    LeafDropped,
}

/// Everything produced for a single generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    pub parse: ParseResult,
    pub features: Vec<Feature>,
    pub tree: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tree_conflicts: Vec<TreeConflict>,
}
