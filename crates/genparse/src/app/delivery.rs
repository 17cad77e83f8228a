//! Arrange artifacts into messages that respect a chat platform's limits.
//!
//! The pipeline itself never enforces transport limits; this planner does it
//! on behalf of the consumer.

use std::ops::Range;

use serde::Serialize;

use crate::domain::model::{Artifacts, GeneratedFile};
use crate::infra::config::Config;

/// Per-message limits of the receiving platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryLimits {
    pub max_attachments: usize,
    pub message_limit: usize,
    pub preview_limit: usize,
    pub preview_marker: String,
    pub preview_candidates: Vec<String>,
}

impl Default for DeliveryLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DeliveryLimits {
    pub fn from_config(config: &Config) -> Self {
        let delivery = &config.delivery;
        Self {
            max_attachments: delivery.max_attachments.max(1),
            message_limit: delivery.message_limit,
            preview_limit: delivery.preview_limit,
            preview_marker: delivery.preview_marker.clone(),
            preview_candidates: delivery.preview_candidates.clone(),
        }
    }
}

/// Files sent together in one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentBatch {
    /// Indices into the file list.
    pub files: Range<usize>,
    /// Message text accompanying follow-up batches.
    pub caption: Option<String>,
}

/// Fenced excerpt of the main file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePreview {
    pub path: String,
    pub message: String,
    pub truncated: bool,
}

/// Everything a chat consumer needs to send one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryPlan {
    pub batches: Vec<AttachmentBatch>,
    pub preview: Option<CodePreview>,
}

impl DeliveryPlan {
    pub fn build(artifacts: &Artifacts, limits: &DeliveryLimits) -> Self {
        let files = &artifacts.parse.files;
        let preview = select_preview_file(files, &limits.preview_candidates)
            .map(|file| render_preview(file, limits))
            .filter(|preview| {
                let fits = fits_message(&preview.message, limits.message_limit);
                if !fits {
                    tracing::warn!(path = %preview.path, "code preview exceeds message limit, skipped");
                }
                fits
            });

        Self {
            batches: plan_attachments(files.len(), limits.max_attachments),
            preview,
        }
    }
}

/// Split `total` attachments into batches of at most `per_message`.
pub fn plan_attachments(total: usize, per_message: usize) -> Vec<AttachmentBatch> {
    let per_message = per_message.max(1);
    (0..total)
        .step_by(per_message)
        .map(|start| {
            let end = (start + per_message).min(total);
            let caption = (start > 0)
                .then(|| format!("Additional files ({}-{} of {}):", start + 1, end, total));
            AttachmentBatch {
                files: start..end,
                caption,
            }
        })
        .collect()
}

/// First file whose path contains any candidate.
pub fn select_preview_file<'a>(
    files: &'a [GeneratedFile],
    candidates: &[String],
) -> Option<&'a GeneratedFile> {
    files.iter().find(|file| {
        candidates
            .iter()
            .any(|candidate| file.path.contains(candidate.as_str()))
    })
}

/// Cut `content` to `limit` characters, appending `marker` and a newline when shortened.
pub fn truncate_preview(content: &str, limit: usize, marker: &str) -> (String, bool) {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => (format!("{}{marker}\n", &content[..cut]), true),
        None => (content.to_owned(), false),
    }
}

pub fn render_preview(file: &GeneratedFile, limits: &DeliveryLimits) -> CodePreview {
    let (body, truncated) =
        truncate_preview(&file.content, limits.preview_limit, &limits.preview_marker);
    CodePreview {
        path: file.path.clone(),
        message: format!("```{}\n{body}\n```", file.language),
        truncated,
    }
}

pub fn fits_message(text: &str, limit: usize) -> bool {
    text.chars().count() <= limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<GeneratedFile> {
        paths
            .iter()
            .map(|path| GeneratedFile::new(*path, "x", "tsx"))
            .collect()
    }

    #[test]
    fn batches_of_ten_with_captions() {
        let batches = plan_attachments(25, 10);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].files, 0..10);
        assert_eq!(batches[0].caption, None);
        assert_eq!(
            batches[1].caption.as_deref(),
            Some("Additional files (11-20 of 25):")
        );
        assert_eq!(batches[2].files, 20..25);
        assert_eq!(
            batches[2].caption.as_deref(),
            Some("Additional files (21-25 of 25):")
        );
    }

    #[test]
    fn no_files_no_batches() {
        assert!(plan_attachments(0, 10).is_empty());
    }

    #[test]
    fn preview_prefers_first_candidate_match() {
        let files = files(&["components/nav.tsx", "app/page.tsx", "src/index.ts"]);
        let candidates = DeliveryLimits::default().preview_candidates;
        let selected = select_preview_file(&files, &candidates).unwrap();
        assert_eq!(selected.path, "app/page.tsx");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_preview("héllo", 5, "..."), ("héllo".into(), false));
        assert_eq!(truncate_preview("héllo", 2, "..."), ("hé...\n".into(), true));
    }

    #[test]
    fn long_preview_is_cut_to_limit() {
        let file = GeneratedFile::new("app/page.tsx", "a".repeat(2500), "tsx");
        let limits = DeliveryLimits::default();
        let preview = render_preview(&file, &limits);

        assert!(preview.truncated);
        assert!(preview.message.starts_with("```tsx\n"));
        assert!(preview.message.ends_with("...\n\n```"));
        assert!(fits_message(&preview.message, limits.message_limit));
    }

    #[test]
    fn plan_without_candidates_has_no_preview() {
        let artifacts = Artifacts {
            parse: crate::domain::model::ParseResult {
                narrative: String::new(),
                files: files(&["styles.css"]),
            },
            ..Artifacts::default()
        };
        let plan = DeliveryPlan::build(&artifacts, &DeliveryLimits::default());
        assert_eq!(plan.batches.len(), 1);
        assert!(plan.preview.is_none());
    }
}
