//! Line-oriented scanner locating fenced code segments.
//!
//! A fence opens on a line that starts (after at most three spaces) with a run
//! of three or more backticks followed by an optional header such as
//! `tsx file="app/page.tsx"`. It closes on a line holding nothing but a
//! backtick run at least as long as the opening one. Fence-looking lines with
//! a header inside a body are body text, so a four-backtick block can carry
//! three-backtick examples. A fence that never closes is not a segment.

use std::ops::Range;

const FENCE_CHAR: char = '`';
const MIN_FENCE_RUN: usize = 3;
const MAX_INDENT: usize = 3;
const FILE_ATTRIBUTE: &str = "file=\"";

/// A fenced segment located in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedSegment<'a> {
    /// Byte span from the opening backticks to the end of the closing fence
    /// line, excluding its line break.
    pub span: Range<usize>,
    pub language: Option<&'a str>,
    /// Value of the `file="..."` header attribute.
    pub path: Option<&'a str>,
    /// Lines between the fences, without the final line break.
    pub body: &'a str,
}

impl FencedSegment<'_> {
    /// Whether the header named a destination file.
    pub fn is_named(&self) -> bool {
        self.path.is_some()
    }
}

/// Parsed opening fence header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceHeader<'a> {
    pub language: Option<&'a str>,
    pub path: Option<&'a str>,
}

#[derive(Debug)]
struct OpenFence<'a> {
    start: usize,
    run: usize,
    header: FenceHeader<'a>,
    body_start: usize,
}

#[derive(Debug)]
enum ScanState<'a> {
    Outside,
    InBody(OpenFence<'a>),
}

/// Locate every closed fenced segment, in order of appearance.
pub fn scan(text: &str) -> Vec<FencedSegment<'_>> {
    let mut segments = Vec::new();
    let mut state = ScanState::Outside;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let content = strip_line_break(line);

        state = match state {
            ScanState::Outside => match opening_fence(content) {
                Some((indent, run, info)) => ScanState::InBody(OpenFence {
                    start: line_start + indent,
                    run,
                    header: parse_header(info),
                    body_start: offset,
                }),
                None => ScanState::Outside,
            },
            ScanState::InBody(open) if is_closing_fence(content, open.run) => {
                segments.push(FencedSegment {
                    span: open.start..line_start + content.len(),
                    language: open.header.language,
                    path: open.header.path,
                    body: strip_line_break(&text[open.body_start..line_start]),
                });
                ScanState::Outside
            }
            in_body => in_body,
        };
    }

    segments
}

/// Split an opening fence header into its language tag and file attribute.
pub fn parse_header(info: &str) -> FenceHeader<'_> {
    let info = info.trim();
    let language = info
        .split_whitespace()
        .next()
        .filter(|token| !token.starts_with("file="))
        .filter(|token| is_bareword(token));

    // The attribute must start a whitespace-separated token.
    let path = info
        .match_indices(FILE_ATTRIBUTE)
        .map(|(index, _)| index)
        .find(|&index| {
            info[..index]
                .chars()
                .next_back()
                .is_none_or(char::is_whitespace)
        })
        .and_then(|index| {
            let rest = &info[index + FILE_ATTRIBUTE.len()..];
            rest.find('"')
                .map(|end| &rest[..end])
                .filter(|path| !path.is_empty())
        });

    FenceHeader { language, path }
}

/// Returns `(indent, run length, header)` when the line opens a fence.
fn opening_fence(line: &str) -> Option<(usize, usize, &str)> {
    let (indent, rest) = split_indent(line)?;
    let run = backtick_run(rest);
    if run < MIN_FENCE_RUN {
        return None;
    }
    let info = &rest[run..];
    if info.contains(FENCE_CHAR) {
        return None;
    }
    Some((indent, run, info))
}

fn is_closing_fence(line: &str, open_run: usize) -> bool {
    let Some((_, rest)) = split_indent(line) else {
        return false;
    };
    let run = backtick_run(rest);
    run >= open_run && rest[run..].trim().is_empty()
}

fn split_indent(line: &str) -> Option<(usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    (indent <= MAX_INDENT).then(|| (indent, &line[indent..]))
}

fn backtick_run(text: &str) -> usize {
    text.len() - text.trim_start_matches(FENCE_CHAR).len()
}

fn is_bareword(token: &str) -> bool {
    token
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '+' | '.' | '#'))
}

fn strip_line_break(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
