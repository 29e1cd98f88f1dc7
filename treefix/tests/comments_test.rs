//! Tests for the comment stripper on realistic JavaScript/JSX snippets.
#![allow(clippy::unwrap_used, clippy::needless_raw_string_hashes)]

use std::borrow::Cow;
use treefix::transform::{CommentStripper, Transform};

fn strip(source: &str) -> String {
    CommentStripper::default().apply(source).into_owned()
}

fn strip_line_only(source: &str) -> String {
    let schemes: Vec<String> = ["http", "https"].iter().map(|s| (*s).to_owned()).collect();
    CommentStripper::new(&schemes, false)
        .unwrap()
        .apply(source)
        .into_owned()
}

#[test]
fn test_set_x_example() {
    assert_eq!(strip("const x = 5; // set x"), "const x = 5;");
}

#[test]
fn test_clean_source_is_borrowed() {
    let source = "const a = 1;\n\n\nconst b = 'x';\n";
    let stripper = CommentStripper::default();
    assert!(matches!(stripper.apply(source), Cow::Borrowed(_)));
}

#[test]
fn test_string_literals_preserved() {
    let source = r#"const a = "see // not a comment";
const b = 'also // not';
const c = `template // kept`;
"#;
    assert!(CommentStripper::default().strip(source).is_none());
}

#[test]
fn test_urls_preserved_outside_strings() {
    let source = "// docs at https://example.com\nconnect(ws://host:80/feed); // live\n";
    assert_eq!(strip(source), "connect(ws://host:80/feed);\n");
}

#[test]
fn test_uppercase_scheme_preserved() {
    assert!(CommentStripper::default()
        .strip("open(HTTPS://EXAMPLE.COM)\n")
        .is_none());
}

#[test]
fn test_custom_scheme_list() {
    let source = "open(ftp://files); // x\n";
    assert_eq!(strip_line_only(source), "open(ftp:\n");
}

#[test]
fn test_block_comments() {
    let source = "/**\n * Header\n */\nconst a = 1; /* inline */ const b = 2;\n";
    assert_eq!(strip(source), "const a = 1; const b = 2;\n");
}

#[test]
fn test_block_comments_disabled() {
    let source = "/* keep */\nconst a = 1; // drop\n";
    assert_eq!(strip_line_only(source), "/* keep */\nconst a = 1;\n");
}

#[test]
fn test_block_comment_inside_string_preserved() {
    let source = "const glob = 'src/**/*.js'; /* real */\n";
    assert_eq!(strip(source), "const glob = 'src/**/*.js';\n");
}

#[test]
fn test_jsx_comment_removed_with_braces() {
    let source = "<div>\n  {/* todo */}\n  <span>{/* x */}</span>\n</div>\n";
    assert_eq!(strip(source), "<div>\n\n  <span></span>\n</div>\n");
}

#[test]
fn test_unterminated_block_comment_falls_back_to_line_comments() {
    let source = "const a = 1; // one\n/* never closed\nconst b = 2;\n";
    assert_eq!(strip(source), "const a = 1;\n/* never closed\nconst b = 2;\n");
}

#[test]
fn test_comment_only_file_becomes_empty() {
    assert_eq!(strip("// one\n// two\n"), "");
}

#[test]
fn test_crlf_preserved() {
    let source = "const a = 1; // x\r\nconst b = 2;\r\n";
    assert_eq!(strip(source), "const a = 1;\r\nconst b = 2;\r\n");
}

#[test]
fn test_missing_final_newline_preserved() {
    assert_eq!(strip("a(); // x\nb(); // y"), "a();\nb();");
}

#[test]
fn test_leading_and_trailing_comment_blocks_removed() {
    let source = "// header\n\nconst a = 1;\n\n// footer\n";
    assert_eq!(strip(source), "const a = 1;\n");
}

#[test]
fn test_idempotent_on_mixed_source() {
    let source = r#"import x from 'y'; // import

/* block
   comment */
const url = "http://localhost:5000"; // server
const re = /a\/b/; // regex-ish

export default x;
"#;
    let once = strip(source);
    let twice = strip(&once);
    assert_eq!(once, twice);
}
