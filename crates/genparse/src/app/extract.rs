//! Recover named files from fenced segments.

use tracing::debug;

use crate::app::fence::{self, FencedSegment};
use crate::domain::model::{DEFAULT_LANGUAGE, DEFAULT_PATH, GeneratedFile};

/// Fallback values applied when fences omit a path or language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub default_path: String,
    pub default_language: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            default_path: DEFAULT_PATH.to_owned(),
            default_language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

/// Extract files using the built-in defaults.
pub fn extract(raw: &str) -> Vec<GeneratedFile> {
    extract_with(raw, &ExtractOptions::default())
}

/// Extract files from generated text.
///
/// Fences carrying a `file="..."` attribute each become one file. When none
/// do, the bodies of every fence are joined by a blank line into a single file
/// at [`ExtractOptions::default_path`]. Text without fences yields no files.
pub fn extract_with(raw: &str, options: &ExtractOptions) -> Vec<GeneratedFile> {
    let segments = fence::scan(raw);

    let named = named_files(&segments, options);
    if !named.is_empty() {
        debug!(files = named.len(), "extracted named blocks");
        return named;
    }

    let combined = segments
        .iter()
        .map(|segment| segment.body)
        .collect::<Vec<_>>()
        .join("\n\n");
    let combined = combined.trim();
    if combined.is_empty() {
        debug!(segments = segments.len(), "no code found in response");
        return Vec::new();
    }

    debug!(
        segments = segments.len(),
        path = %options.default_path,
        "combined unnamed blocks into a single file"
    );
    vec![GeneratedFile::new(
        options.default_path.clone(),
        combined,
        options.default_language.clone(),
    )]
}

fn named_files(segments: &[FencedSegment<'_>], options: &ExtractOptions) -> Vec<GeneratedFile> {
    segments
        .iter()
        .filter_map(|segment| {
            let path = segment.path?;
            let language = segment
                .language
                .unwrap_or(options.default_language.as_str());
            Some(GeneratedFile::new(path, segment.body.trim(), language))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_block_is_trimmed_and_tagged() {
        let files = extract("Here:\n```tsx file=\"app/page.tsx\"\n\n  app code  \n\n```\nDone.");
        assert_eq!(
            files,
            vec![GeneratedFile::new("app/page.tsx", "app code", "tsx")]
        );
    }

    #[test]
    fn missing_language_uses_default() {
        let files = extract("``` file=\"styles.css\"\nbody {}\n```");
        assert_eq!(files[0].language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn attribute_ending_in_file_does_not_name_block() {
        let files = extract("```tsx data-file=\"x.ts\"\ncode\n```");
        assert_eq!(
            files,
            vec![GeneratedFile::new(DEFAULT_PATH, "code", DEFAULT_LANGUAGE)]
        );
    }

    #[test]
    fn named_blocks_win_over_unnamed() {
        let raw = "```bash\nnpm install\n```\n```ts file=\"lib/utils.ts\"\nexport {}\n```";
        let files = extract(raw);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "lib/utils.ts");
    }

    #[test]
    fn unnamed_blocks_combine_into_default_file() {
        let raw = "First\n```tsx\nconst a = 1;\n```\nThen\n```css\n.b {}\n```\n";
        let files = extract(raw);
        assert_eq!(
            files,
            vec![GeneratedFile::new(
                DEFAULT_PATH,
                "const a = 1;\n\n.b {}",
                DEFAULT_LANGUAGE
            )]
        );
    }

    #[test]
    fn blank_fences_and_plain_text_yield_nothing() {
        assert!(extract("no code here").is_empty());
        assert!(extract("```\n   \n```").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn repeated_paths_are_kept_in_order() {
        let raw = "```ts file=\"a.ts\"\none\n```\n```ts file=\"a.ts\"\ntwo\n```";
        let contents: Vec<_> = extract(raw).into_iter().map(|f| f.content).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[test]
    fn custom_defaults_apply_to_fallback() {
        let options = ExtractOptions {
            default_path: "main.rs".into(),
            default_language: "rust".into(),
        };
        let files = extract_with("```\nfn main() {}\n```", &options);
        assert_eq!(files[0].path, "main.rs");
        assert_eq!(files[0].language, "rust");
    }
}
