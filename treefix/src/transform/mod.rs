//! Text transforms applied to each file's contents.
//!
//! A [`Transform`] maps input text to output text and may be scoped to a
//! subset of files. A [`Pipeline`] runs transforms in a fixed order and
//! records which of them changed the text.
//!
//! Two families ship with the crate:
//! - [`CommentStripper`]: string- and URL-aware comment removal
//! - [`RegexRule`]: declarative find-and-replace rules loaded as data

mod comments;
mod rules;

pub use comments::CommentStripper;
pub use rules::{RegexRule, RuleError, RuleSpec, RuleTable};

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// A pure text-to-text rewrite.
///
/// Implementations must be idempotent: applying a transform to its own
/// output returns that output unchanged.
pub trait Transform {
    /// Name used in progress lines and reports.
    fn name(&self) -> &str;

    /// Whether this transform runs on the given file. Defaults to all files.
    fn applies_to(&self, _path: &Path) -> bool {
        true
    }

    /// Rewrite `input`, returning it borrowed when nothing changed.
    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// Result of running a [`Pipeline`] over one file's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Final text after every applicable transform.
    pub content: String,
    /// Names of the transforms that changed the text, in pipeline order.
    pub applied: Vec<String>,
}

impl PipelineOutput {
    /// True when at least one transform changed the text.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Ordered sequence of transforms.
///
/// Order matters: later transforms see the output of earlier ones.
#[derive(Default)]
pub struct Pipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("transforms", &self.names())
            .finish()
    }
}

impl Pipeline {
    /// Create an empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform to the end of the pipeline
    pub fn push(&mut self, transform: impl Transform + 'static) {
        self.transforms.push(Box::new(transform));
    }

    /// Append a boxed transform
    pub fn push_boxed(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    /// Builder-style [`Pipeline::push`]
    #[must_use]
    pub fn with(mut self, transform: impl Transform + 'static) -> Self {
        self.push(transform);
        self
    }

    /// Number of transforms
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// True when the pipeline has no transforms
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Transform names in execution order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Run every transform that applies to `path` over `input`.
    #[must_use]
    pub fn apply(&self, path: &Path, input: &str) -> PipelineOutput {
        let mut current = input.to_owned();
        let mut applied = Vec::new();

        for transform in &self.transforms {
            if !transform.applies_to(path) {
                continue;
            }
            let next = match transform.apply(&current) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(text) => text,
            };
            if next != current {
                applied.push(transform.name().to_owned());
                current = next;
            }
        }

        PipelineOutput {
            content: current,
            applied,
        }
    }

    /// Check that a second pass over `output` changes nothing.
    #[must_use]
    pub fn is_stable_on(&self, path: &Path, output: &str) -> bool {
        !self.apply(path, output).changed()
    }
}
