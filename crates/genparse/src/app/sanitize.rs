//! Strip fenced code from generated text for display.

use crate::app::fence;
use crate::domain::model::CODE_BLOCK_PLACEHOLDER;

/// Replace every fenced segment with `[Code Block]`.
pub fn sanitize(raw: &str) -> String {
    sanitize_with(raw, CODE_BLOCK_PLACEHOLDER)
}

/// Replace every fenced segment with `placeholder`, leaving prose untouched.
pub fn sanitize_with(raw: &str, placeholder: &str) -> String {
    let segments = fence::scan(raw);
    if segments.is_empty() {
        return raw.to_owned();
    }

    let mut narrative = String::with_capacity(raw.len());
    let mut cursor = 0;
    for segment in &segments {
        narrative.push_str(&raw[cursor..segment.span.start]);
        narrative.push_str(placeholder);
        cursor = segment.span.end;
    }
    narrative.push_str(&raw[cursor..]);
    narrative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_named_and_unnamed_blocks() {
        let raw = "Here:\n```tsx file=\"app/page.tsx\"\napp code\n```\nand\n```\nmore\n```\nDone.";
        assert_eq!(
            sanitize(raw),
            "Here:\n[Code Block]\nand\n[Code Block]\nDone."
        );
    }

    #[test]
    fn text_without_fences_is_unchanged() {
        let raw = "Just prose with `inline` code.";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn sanitizing_twice_is_stable() {
        let once = sanitize("a\n```js\nx\n```\nb");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn unclosed_fence_stays_in_narrative() {
        let raw = "a\n```js\nnever closed";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn custom_placeholder() {
        assert_eq!(sanitize_with("```\nx\n```", "<code>"), "<code>");
    }
}
