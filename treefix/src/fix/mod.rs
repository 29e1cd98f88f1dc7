//! Tree rewriting.
//!
//! [`TreeRewriter`] walks a root directory, runs a [`Pipeline`] over every
//! selected file and writes back only the files whose contents changed.
//! Per-file failures are collected in the [`RunReport`] and never abort
//! the run.
//!
//! [`Pipeline`]: crate::transform::Pipeline

mod rewriter;

pub use rewriter::{
    ChangedFile, FileError, FileEvent, FileOutcome, RewriteError, RewriteOptions, RunReport,
    TransformHits, TreeRewriter,
};
