//! Declarative find-and-replace rules.
//!
//! Rules are data: a name, the files they apply to, a pattern and a
//! replacement. They are compiled once and then run as [`Transform`]s.

use super::Transform;
use crate::constants::RULE_PRESETS;
use fancy_regex::{Expander, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use thiserror::Error;

/// A rule as written in configuration.
///
/// ```toml
/// [[treefix.rules]]
/// name = "login-endpoint"
/// files = ["Login.js"]
/// find = "fetch\\('http://localhost:5000[^']*"
/// replace = "fetch('http://localhost:5000/api/login', {"
/// skip_if_contains = "/api/login"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Name shown in progress lines and reports.
    pub name: String,
    /// File-name globs (`Login.js`, `*.jsx`). Empty means every file.
    #[serde(default)]
    pub files: Vec<String>,
    /// Regular expression (lookaround allowed), or plain text if `literal`.
    pub find: String,
    /// Replacement. Regex rules expand `$1` and `${name}`.
    #[serde(default)]
    pub replace: String,
    /// Treat `find` and `replace` as plain text.
    #[serde(default)]
    pub literal: bool,
    /// Leave a match alone if its text contains this substring.
    #[serde(default)]
    pub skip_if_contains: Option<String>,
}

impl RuleSpec {
    /// Create a regex rule that applies to every file
    #[must_use]
    pub fn new(name: impl Into<String>, find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            find: find.into(),
            replace: replace.into(),
            literal: false,
            skip_if_contains: None,
        }
    }

    /// Restrict the rule to files whose name matches one of `files`
    #[must_use]
    pub fn for_files<S: Into<String>>(mut self, files: impl IntoIterator<Item = S>) -> Self {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Look up a built-in preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownPreset`] if no preset has that name.
    pub fn preset(name: &str) -> Result<Self, RuleError> {
        RULE_PRESETS()
            .iter()
            .find(|(preset, _, _)| *preset == name)
            .map(|(preset, find, replace)| Self::new(*preset, *find, *replace))
            .ok_or_else(|| RuleError::UnknownPreset(name.to_owned()))
    }
}

/// Error compiling a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The `find` pattern is not a valid regular expression.
    #[error("rule '{name}': invalid pattern: {source}")]
    InvalidPattern {
        /// Rule name
        name: String,
        /// Underlying regex error
        #[source]
        source: Box<fancy_regex::Error>,
    },
    /// The replacement refers to a group the pattern does not have.
    #[error("rule '{name}': invalid replacement: {source}")]
    InvalidReplacement {
        /// Rule name
        name: String,
        /// Underlying regex error
        #[source]
        source: Box<fancy_regex::Error>,
    },
    /// A `files` entry is not a valid glob.
    #[error("rule '{name}': invalid file pattern '{pattern}': {source}")]
    InvalidFilePattern {
        /// Rule name
        name: String,
        /// The offending glob
        pattern: String,
        /// Underlying glob error
        #[source]
        source: glob::PatternError,
    },
    /// The rule has an empty `find`.
    #[error("rule '{0}': `find` must not be empty")]
    EmptyPattern(String),
    /// No preset with this name.
    #[error("unknown rule preset '{0}'")]
    UnknownPreset(String),
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal,
    Pattern(Regex),
}

/// A compiled [`RuleSpec`].
#[derive(Debug, Clone)]
pub struct RegexRule {
    spec: RuleSpec,
    files: Vec<glob::Pattern>,
    matcher: Matcher,
}

impl RegexRule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern, replacement or a file glob is invalid.
    pub fn compile(spec: RuleSpec) -> Result<Self, RuleError> {
        if spec.find.is_empty() {
            return Err(RuleError::EmptyPattern(spec.name));
        }

        let files = spec
            .files
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| RuleError::InvalidFilePattern {
                    name: spec.name.clone(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let matcher = if spec.literal {
            Matcher::Literal
        } else {
            let regex = Regex::new(&spec.find).map_err(|e| RuleError::InvalidPattern {
                name: spec.name.clone(),
                source: Box::new(e),
            })?;
            Expander::default()
                .check(&spec.replace, &regex)
                .map_err(|e| RuleError::InvalidReplacement {
                    name: spec.name.clone(),
                    source: Box::new(e),
                })?;
            Matcher::Pattern(regex)
        };

        Ok(Self {
            spec,
            files,
            matcher,
        })
    }

    /// The rule as configured
    #[must_use]
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// Whether the file name of `path` matches the rule's `files` globs.
    #[must_use]
    pub fn matches_file(&self, path: &Path) -> bool {
        if self.files.is_empty() {
            return true;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.files.iter().any(|pattern| pattern.matches(name))
    }

    /// Apply the rule to `input`.
    ///
    /// A regex that fails at match time (e.g. backtracking limit) leaves the
    /// input unchanged.
    #[must_use]
    pub fn rewrite<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match &self.matcher {
            Matcher::Literal => self.rewrite_literal(input),
            Matcher::Pattern(regex) => self.rewrite_pattern(regex, input),
        }
    }

    fn is_skipped(&self, matched: &str) -> bool {
        self.spec
            .skip_if_contains
            .as_deref()
            .is_some_and(|guard| matched.contains(guard))
    }

    fn rewrite_literal<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if !input.contains(&self.spec.find) || self.is_skipped(&self.spec.find) {
            return Cow::Borrowed(input);
        }
        Cow::Owned(input.replace(&self.spec.find, &self.spec.replace))
    }

    fn rewrite_pattern<'a>(&self, regex: &Regex, input: &'a str) -> Cow<'a, str> {
        let expander = Expander::default();
        let mut out = String::new();
        let mut last_end = 0;
        let mut replaced = false;

        for caps in regex.captures_iter(input) {
            let Ok(caps) = caps else {
                return Cow::Borrowed(input);
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if self.is_skipped(whole.as_str()) {
                continue;
            }
            out.push_str(&input[last_end..whole.start()]);
            expander.append_expansion(&mut out, &self.spec.replace, &caps);
            last_end = whole.end();
            replaced = true;
        }

        if !replaced {
            return Cow::Borrowed(input);
        }
        out.push_str(&input[last_end..]);
        Cow::Owned(out)
    }
}

impl Transform for RegexRule {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn applies_to(&self, path: &Path) -> bool {
        self.matches_file(path)
    }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.rewrite(input)
    }
}

/// Ordered list of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<RegexRule>,
}

impl RuleTable {
    /// Compile presets (by name) followed by `specs`, keeping that order.
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails to compile.
    pub fn build<S: AsRef<str>>(
        presets: &[S],
        specs: impl IntoIterator<Item = RuleSpec>,
    ) -> Result<Self, RuleError> {
        let mut rules = Vec::new();
        for name in presets {
            rules.push(RegexRule::compile(RuleSpec::preset(name.as_ref())?)?);
        }
        for spec in specs {
            rules.push(RegexRule::compile(spec)?);
        }
        Ok(Self { rules })
    }

    /// Compile `specs` without presets.
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails to compile.
    pub fn from_specs(specs: impl IntoIterator<Item = RuleSpec>) -> Result<Self, RuleError> {
        Self::build::<&str>(&[], specs)
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the table has no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in execution order
    pub fn iter(&self) -> impl Iterator<Item = &RegexRule> {
        self.rules.iter()
    }
}

impl IntoIterator for RuleTable {
    type Item = RegexRule;
    type IntoIter = std::vec::IntoIter<RegexRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(find: &str, replace: &str) -> RegexRule {
        RegexRule::compile(RuleSpec::new("test", find, replace)).unwrap()
    }

    #[test]
    fn test_api_suffix_rule_is_idempotent() {
        let rule = rule(
            r"'http://localhost:5000(?![\d/])",
            "'http://localhost:5000/api",
        );
        let once = rule.rewrite("fetch('http://localhost:5000')");
        assert_eq!(once, "fetch('http://localhost:5000/api')");
        assert!(matches!(rule.rewrite(&once), Cow::Borrowed(_)));
    }

    #[test]
    fn test_missing_slashes_preset() {
        let rule = RegexRule::compile(RuleSpec::preset("scheme-slashes").unwrap()).unwrap();
        assert_eq!(rule.rewrite("a = 'https:wa.me/1'"), "a = 'https://wa.me/1'");
        assert_eq!(rule.rewrite("a = \"http:x\""), "a = \"http://x\"");
        assert!(matches!(rule.rewrite("a = `https://ok`"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_capture_expansion() {
        let rule = rule(r"(?P<host>localhost):(?P<port>\d+)", "${host}:${port}/api");
        assert_eq!(rule.rewrite("localhost:3000"), "localhost:3000/api");
    }

    #[test]
    fn test_skip_if_contains() {
        let mut spec = RuleSpec::new("approve", r"fetch\(`http://localhost:5000[^`]*", "fetch(`http://localhost:5000/api/trips/${tripId}/approve`");
        spec.skip_if_contains = Some("/approve`".to_owned());
        let rule = RegexRule::compile(spec);
        // `${tripId}` is not a group of the pattern.
        assert!(matches!(rule, Err(RuleError::InvalidReplacement { .. })));

        let mut spec = RuleSpec::new("approve", r"fetch\(`http://localhost:5000[^`]*`", "fetch(`http://localhost:5000/api/approve`");
        spec.skip_if_contains = Some("/approve`".to_owned());
        let rule = RegexRule::compile(spec).unwrap();
        let src = "fetch(`http://localhost:5000/x`); fetch(`http://localhost:5000/api/approve`);";
        assert_eq!(
            rule.rewrite(src),
            "fetch(`http://localhost:5000/api/approve`); fetch(`http://localhost:5000/api/approve`);"
        );
    }

    #[test]
    fn test_literal_rule() {
        let mut spec = RuleSpec::new("lit", "a.b(", "a.c(");
        spec.literal = true;
        let rule = RegexRule::compile(spec).unwrap();
        assert_eq!(rule.rewrite("x = a.b(1)"), "x = a.c(1)");
        assert!(matches!(rule.rewrite("nothing"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_file_scope() {
        let rule = RegexRule::compile(RuleSpec::new("r", "a", "b").for_files(["Login.js", "*.jsx"])).unwrap();
        assert!(rule.matches_file(Path::new("src/components/Login.js")));
        assert!(rule.matches_file(Path::new("App.jsx")));
        assert!(!rule.matches_file(Path::new("src/Signup.js")));
    }

    #[test]
    fn test_unscoped_rule_matches_everything() {
        let rule = rule("a", "b");
        assert!(rule.matches_file(Path::new("anything.ts")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RegexRule::compile(RuleSpec::new("bad", "(unclosed", "")).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
        assert!(err.to_string().contains("rule 'bad'"));
    }

    #[test]
    fn test_invalid_file_glob() {
        let err = RegexRule::compile(RuleSpec::new("bad", "a", "b").for_files(["[oops"])).unwrap_err();
        assert!(matches!(err, RuleError::InvalidFilePattern { .. }));
    }

    #[test]
    fn test_empty_find_rejected() {
        let err = RegexRule::compile(RuleSpec::new("empty", "", "x")).unwrap_err();
        assert!(matches!(err, RuleError::EmptyPattern(_)));
    }

    #[test]
    fn test_unknown_preset() {
        let err = RuleTable::build(&["nope"], Vec::new()).unwrap_err();
        assert!(matches!(err, RuleError::UnknownPreset(_)));
    }

    #[test]
    fn test_table_order() {
        let table = RuleTable::build(
            &["scheme-slashes"],
            vec![RuleSpec::new("second", "a", "b")],
        )
        .unwrap();
        let names: Vec<_> = table.iter().map(|r| r.spec().name.as_str()).collect();
        assert_eq!(names, vec!["scheme-slashes", "second"]);
    }

    #[test]
    fn test_spec_from_toml() {
        let spec: RuleSpec = toml::from_str(
            r#"
name = "login"
files = ["Login.js"]
find = "x"
replace = "y"
"#,
        )
        .unwrap();
        assert_eq!(spec.files, vec!["Login.js"]);
        assert!(!spec.literal);
        assert!(spec.skip_if_contains.is_none());
    }

    #[test]
    fn test_spec_rejects_unknown_keys() {
        let res: Result<RuleSpec, _> = toml::from_str("name = \"a\"\nfind = \"x\"\nreplce = \"y\"\n");
        assert!(res.is_err());
    }
}
