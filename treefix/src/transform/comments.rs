//! Comment stripping for C-family and JavaScript-like sources.
//!
//! The scanner is a small state machine run line by line. It knows enough
//! about string literals to leave `"see // here"` alone and enough about URLs
//! to leave `https://example.com` alone; it is not a parser.

use super::Transform;
use crate::constants::{
    BLOCK_COMMENT_CLOSE, BLOCK_COMMENT_OPEN, DEFAULT_URL_SCHEMES, LINE_COMMENT_MARKER,
    STRIP_COMMENTS_NAME,
};
use regex::Regex;
use std::borrow::Cow;

/// Scanner position relative to strings and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    SingleQuote,
    DoubleQuote,
    /// Backtick template literal; may span lines.
    Template,
    /// Inside `/* ... */`; may span lines.
    BlockComment,
}

impl ScanState {
    fn closing_quote(self) -> Option<u8> {
        match self {
            Self::SingleQuote => Some(b'\''),
            Self::DoubleQuote => Some(b'"'),
            Self::Template => Some(b'`'),
            Self::Code | Self::BlockComment => None,
        }
    }

    /// State carried into the next line.
    fn at_line_end(self) -> Self {
        match self {
            Self::SingleQuote | Self::DoubleQuote => Self::Code,
            other => other,
        }
    }
}

/// One output line plus what stripping did to it.
#[derive(Debug)]
struct ScannedLine<'a> {
    text: Cow<'a, str>,
    crlf: bool,
    /// The line had content before stripping and is empty now.
    blanked: bool,
}

impl ScannedLine<'_> {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Removes `//` line comments and, optionally, `/* ... */` block comments.
///
/// Lines whose comment was removed are trimmed at the end. Runs of blank
/// lines produced by stripping collapse to one blank line, or disappear at
/// the start and end of the file. Blank lines that were already present are
/// kept as they are, so clean input is returned untouched.
#[derive(Debug, Clone)]
pub struct CommentStripper {
    block_comments: bool,
    /// Matches text that ends in `scheme:` for a known URL scheme.
    scheme_suffix: Option<Regex>,
}

impl Default for CommentStripper {
    fn default() -> Self {
        let schemes: Vec<String> = DEFAULT_URL_SCHEMES()
            .iter()
            .map(|&s| s.to_owned())
            .collect();
        #[allow(clippy::expect_used)]
        Self::new(&schemes, true).expect("Invalid default URL scheme pattern")
    }
}

impl CommentStripper {
    /// Create a stripper that treats `scheme://` as part of a URL for every
    /// scheme in `url_schemes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme pattern cannot be compiled.
    pub fn new(url_schemes: &[String], block_comments: bool) -> Result<Self, regex::Error> {
        let schemes: Vec<String> = url_schemes
            .iter()
            .map(|s| s.trim().trim_end_matches(':'))
            .filter(|s| !s.is_empty())
            .map(regex::escape)
            .collect();

        let scheme_suffix = if schemes.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)(?:^|[^a-z0-9_$+.\-])(?:{}):$",
                schemes.join("|")
            ))?)
        };

        Ok(Self {
            block_comments,
            scheme_suffix,
        })
    }

    /// Whether block comments are stripped too
    #[must_use]
    pub fn strips_block_comments(&self) -> bool {
        self.block_comments
    }

    /// Strip comments from `input`. Returns `None` when nothing changed.
    #[must_use]
    pub fn strip(&self, input: &str) -> Option<String> {
        if !self.has_marker(input) {
            return None;
        }
        match self.strip_with(input, self.block_comments) {
            StripResult::Unterminated => self.strip_with(input, false).into_option(),
            other => other.into_option(),
        }
    }

    fn has_marker(&self, text: &str) -> bool {
        text.contains(LINE_COMMENT_MARKER)
            || (self.block_comments && text.contains(BLOCK_COMMENT_OPEN))
    }

    /// One pass over `input`. Block comments are always tracked so that `//`
    /// inside them is never a line comment; `remove_blocks` decides whether
    /// their text is dropped or kept verbatim.
    fn strip_with(&self, input: &str, remove_blocks: bool) -> StripResult {
        let (body, final_newline) = match input.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (input, false),
        };

        let mut state = ScanState::Code;
        let mut lines = Vec::new();
        let mut edited = false;

        for raw in body.split('\n') {
            let (text, crlf) = match raw.strip_suffix('\r') {
                Some(text) => (text, true),
                None => (raw, false),
            };
            let line = match self.strip_line(text, &mut state, remove_blocks) {
                Some(stripped) => {
                    edited = true;
                    ScannedLine {
                        blanked: stripped.is_empty(),
                        text: Cow::Owned(stripped),
                        crlf,
                    }
                }
                None => ScannedLine {
                    text: Cow::Borrowed(text),
                    crlf,
                    blanked: false,
                },
            };
            lines.push(line);
        }

        if remove_blocks && state == ScanState::BlockComment {
            return StripResult::Unterminated;
        }
        if !edited {
            return StripResult::Unchanged;
        }

        let lines = collapse_blank_runs(lines);
        let mut out = String::with_capacity(input.len());
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text);
            if line.crlf {
                out.push('\r');
            }
        }
        if final_newline && !lines.is_empty() {
            out.push('\n');
        }

        if out == input {
            StripResult::Unchanged
        } else {
            StripResult::Stripped(out)
        }
    }

    /// Scan one line (without its terminator), updating `state`.
    ///
    /// Returns the rewritten line, or `None` if the line is kept verbatim.
    fn strip_line(&self, line: &str, state: &mut ScanState, remove_blocks: bool) -> Option<String> {
        if *state == ScanState::Code
            && !line.contains(LINE_COMMENT_MARKER)
            && !line.contains(BLOCK_COMMENT_OPEN)
            && !line.contains('`')
        {
            return None;
        }

        let bytes = line.as_bytes();
        let mut out = String::with_capacity(line.len());
        // A line that starts inside a block comment loses at least that part.
        let mut edited = remove_blocks && *state == ScanState::BlockComment;
        let mut keep_from = 0;
        // Output length at the point a block comment opened on this line.
        let mut block_opened_at: Option<usize> = None;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();
            match *state {
                ScanState::Code => match b {
                    b'\'' => *state = ScanState::SingleQuote,
                    b'"' => *state = ScanState::DoubleQuote,
                    b'`' => *state = ScanState::Template,
                    b'/' if next == Some(b'/') => {
                        if self.is_url_scheme(&out, &line[keep_from..i]) {
                            i += 2;
                            continue;
                        }
                        out.push_str(&line[keep_from..i]);
                        let kept_len = out.trim_end().len();
                        out.truncate(kept_len);
                        *state = state.at_line_end();
                        return Some(out);
                    }
                    b'/' if next == Some(b'*') => {
                        if remove_blocks {
                            out.push_str(&line[keep_from..i]);
                            block_opened_at = Some(out.len());
                            edited = true;
                        }
                        *state = ScanState::BlockComment;
                        i += BLOCK_COMMENT_OPEN.len();
                        continue;
                    }
                    _ => {}
                },
                ScanState::SingleQuote | ScanState::DoubleQuote | ScanState::Template => {
                    if b == b'\\' {
                        i += 2;
                        continue;
                    }
                    if Some(b) == state.closing_quote() {
                        *state = ScanState::Code;
                    }
                }
                ScanState::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        *state = ScanState::Code;
                        i += BLOCK_COMMENT_CLOSE.len();
                        if !remove_blocks {
                            continue;
                        }
                        keep_from = i;
                        if let Some(opened_at) = block_opened_at.take() {
                            if let Some(resume) = drop_jsx_braces(&mut out, opened_at, line, i) {
                                i = resume;
                                keep_from = resume;
                            }
                        }
                        // `a /* x */ b` becomes `a b`, not `a  b`
                        if out.ends_with(|c: char| c == ' ' || c == '\t') {
                            while matches!(bytes.get(i), Some(b' ' | b'\t')) {
                                i += 1;
                            }
                            keep_from = i;
                        }
                        continue;
                    }
                }
            }
            i += 1;
        }

        if !(remove_blocks && *state == ScanState::BlockComment) {
            out.push_str(&line[keep_from.min(line.len())..]);
        }
        // Trailing whitespace inside an open template literal is content.
        let trim = *state != ScanState::Template;
        *state = state.at_line_end();

        if edited {
            if trim {
                let kept_len = out.trim_end().len();
                out.truncate(kept_len);
            }
            Some(out)
        } else {
            None
        }
    }

    /// Whether the kept text before a `//` ends in `scheme:`.
    ///
    /// The check runs on the output so far, not the raw line, so a removed
    /// block comment cannot separate a scheme from the identifier before it.
    fn is_url_scheme(&self, kept: &str, pending: &str) -> bool {
        let Some(re) = self.scheme_suffix.as_ref() else {
            return false;
        };
        if kept.is_empty() {
            re.is_match(pending)
        } else {
            re.is_match(&format!("{kept}{pending}"))
        }
    }
}

impl Transform for CommentStripper {
    fn name(&self) -> &str {
        STRIP_COMMENTS_NAME
    }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self.strip(input) {
            Some(stripped) => Cow::Owned(stripped),
            None => Cow::Borrowed(input),
        }
    }
}

enum StripResult {
    Unchanged,
    Stripped(String),
    /// A block comment was still open at end of file.
    Unterminated,
}

impl StripResult {
    fn into_option(self) -> Option<String> {
        match self {
            Self::Stripped(text) => Some(text),
            Self::Unchanged | Self::Unterminated => None,
        }
    }
}

/// Remove the braces of a JSX comment expression `{/* ... */}` that opened
/// and closed on this line.
///
/// `out[..opened_at]` is the kept text before the comment and `line[after..]`
/// the text after it. Returns the index in `line` to resume from.
fn drop_jsx_braces(out: &mut String, opened_at: usize, line: &str, after: usize) -> Option<usize> {
    let before_brace = out[..opened_at].trim_end().strip_suffix('{')?;
    let after_brace = line[after..].trim_start().strip_prefix('}')?;

    let lead = before_brace.trim_end();
    let tail = after_brace.trim_start();
    let in_markup = lead.is_empty() || lead.ends_with('>');
    let closes_markup =
        tail.is_empty() || tail.starts_with('<') || tail.starts_with("{/*");
    if !(in_markup && closes_markup) {
        return None;
    }

    let keep = before_brace.len();
    out.truncate(keep);
    Some(line.len() - after_brace.len())
}

/// Collapse runs of blank lines that stripping produced.
fn collapse_blank_runs(lines: Vec<ScannedLine<'_>>) -> Vec<ScannedLine<'_>> {
    let mut out = Vec::with_capacity(lines.len());
    let mut run = Vec::new();
    let mut seen_content = false;

    for line in lines {
        if line.is_blank() {
            run.push(line);
            continue;
        }
        flush_blank_run(&mut out, &mut run, !seen_content);
        seen_content = true;
        out.push(line);
    }
    flush_blank_run(&mut out, &mut run, true);

    out
}

fn flush_blank_run<'a>(out: &mut Vec<ScannedLine<'a>>, run: &mut Vec<ScannedLine<'a>>, at_edge: bool) {
    if run.is_empty() {
        return;
    }
    if !run.iter().any(|line| line.blanked) {
        out.append(run);
        return;
    }
    if !at_edge {
        // Prefer a blank line that was already there, keeping its whitespace.
        let keep = run.iter().position(|line| !line.blanked).unwrap_or(0);
        out.push(run.swap_remove(keep));
    }
    run.clear();
}
