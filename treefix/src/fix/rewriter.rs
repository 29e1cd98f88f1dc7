//! Idempotent rewrite of a file tree.
//!
//! # Usage
//!
//! ```
//! use treefix::fix::{RewriteOptions, TreeRewriter};
//! use treefix::transform::{CommentStripper, Pipeline};
//!
//! let dir = tempfile::tempdir()?;
//! std::fs::write(dir.path().join("app.js"), "const x = 5; // set x\n")?;
//!
//! let pipeline = Pipeline::new().with(CommentStripper::default());
//! let rewriter = TreeRewriter::new(pipeline, RewriteOptions::default());
//! let report = rewriter.run(dir.path(), |_| Ok(()))?;
//!
//! assert_eq!(report.changed, 1);
//! assert_eq!(std::fs::read_to_string(dir.path().join("app.js"))?, "const x = 5;\n");
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::constants::DEFAULT_EXTENSIONS;
use crate::transform::Pipeline;
use crate::utils::{collect_files, normalize_display_path, validate_path_within_root};
use crate::utils::{FileSet, WalkOptions};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Settings for a [`TreeRewriter`] run.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// File selection.
    pub walk: WalkOptions,
    /// Compute and report changes without writing.
    pub dry_run: bool,
    /// Re-run the pipeline on each new content and warn if it changes again.
    pub verify_idempotence: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions {
                extensions: DEFAULT_EXTENSIONS()
                    .iter()
                    .map(|&s| s.to_owned())
                    .collect(),
                ..WalkOptions::default()
            },
            dry_run: false,
            verify_idempotence: true,
        }
    }
}

/// Error processing a single file.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The file could not be read.
    #[error("failed to read file: {0}")]
    Read(#[source] io::Error),
    /// The file is not valid UTF-8.
    #[error("file is not valid UTF-8: {0}")]
    Encoding(#[source] FromUtf8Error),
    /// The new contents could not be written.
    #[error("failed to write file: {0}")]
    Write(#[source] io::Error),
    /// The file resolves to a location outside the root.
    #[error("refusing to write outside the root: {0}")]
    OutsideRoot(String),
}

/// What happened to a file that was processed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// No transform changed the contents; the file was not touched.
    Unchanged,
    /// The contents changed (and were written unless in dry-run).
    Changed {
        /// Transforms that changed the text, in pipeline order.
        applied: Vec<String>,
        /// False when a second pass would change the new contents again.
        stable: bool,
    },
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum FileEvent<'a> {
    /// A file is about to be processed.
    Visited {
        /// File path
        path: &'a Path,
    },
    /// A file's contents changed.
    Changed {
        /// File path
        path: &'a Path,
        /// Transforms that changed the text
        applied: &'a [String],
        /// Whether the write was skipped
        dry_run: bool,
    },
    /// A changed file would change again on a second pass.
    Unstable {
        /// File path
        path: &'a Path,
    },
    /// A file could not be processed.
    Failed {
        /// File path
        path: &'a Path,
        /// The reason
        error: &'a RewriteError,
    },
}

/// A file whose contents changed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChangedFile {
    /// Display path
    pub path: String,
    /// Transforms that changed the text
    pub transforms: Vec<String>,
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileError {
    /// Display path
    pub path: String,
    /// Human-readable reason
    pub reason: String,
}

/// How many files a transform changed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransformHits {
    /// Transform name
    pub name: String,
    /// Number of files it changed
    pub files: usize,
}

/// Summary of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Root that was walked
    pub root: String,
    /// Whether writes were skipped
    pub dry_run: bool,
    /// Files selected and processed
    pub scanned: usize,
    /// Directories visited below the root
    pub directories: usize,
    /// Files whose contents changed
    pub changed: usize,
    /// Files left as they were
    pub unchanged: usize,
    /// Files that failed
    pub errored: usize,
    /// Changed files in processing order
    pub changed_files: Vec<ChangedFile>,
    /// Per-file failures
    pub errors: Vec<FileError>,
    /// Hits per transform, in pipeline order
    pub transform_hits: Vec<TransformHits>,
    /// Files that a second pass would change again
    pub non_idempotent: Vec<String>,
    /// Entries the walker could not read
    pub walk_errors: Vec<String>,
}

impl RunReport {
    fn new(root: &Path, pipeline: &Pipeline, dry_run: bool) -> Self {
        let mut transform_hits: Vec<TransformHits> = Vec::new();
        for name in pipeline.names() {
            if !transform_hits.iter().any(|hit| hit.name == name) {
                transform_hits.push(TransformHits {
                    name: name.to_owned(),
                    files: 0,
                });
            }
        }
        Self {
            root: normalize_display_path(root),
            dry_run,
            transform_hits,
            ..Self::default()
        }
    }

    fn record_hits(&mut self, applied: &[String]) {
        for name in applied {
            if let Some(hit) = self.transform_hits.iter_mut().find(|hit| &hit.name == name) {
                hit.files += 1;
            }
        }
    }

    /// True when at least one file failed or could not be walked.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errored > 0 || !self.walk_errors.is_empty()
    }
}

/// Applies a [`Pipeline`] to every selected file under a root.
#[derive(Debug)]
pub struct TreeRewriter {
    pipeline: Pipeline,
    options: RewriteOptions,
}

impl TreeRewriter {
    /// Create a rewriter
    #[must_use]
    pub fn new(pipeline: Pipeline, options: RewriteOptions) -> Self {
        Self { pipeline, options }
    }

    /// The pipeline in use
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The options in use
    #[must_use]
    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Select the files a run over `root` would process.
    #[must_use]
    pub fn collect(&self, root: &Path) -> FileSet {
        collect_files(root, &self.options.walk)
    }

    /// Process a single file.
    ///
    /// `root` bounds where the file may be written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not UTF-8, escapes the
    /// root, or cannot be written.
    pub fn rewrite_file(&self, root: &Path, path: &Path) -> Result<FileOutcome, RewriteError> {
        let bytes = fs::read(path).map_err(RewriteError::Read)?;
        let content = String::from_utf8(bytes).map_err(RewriteError::Encoding)?;

        let output = self.pipeline.apply(path, &content);
        if !output.changed() {
            return Ok(FileOutcome::Unchanged);
        }

        let stable =
            !self.options.verify_idempotence || self.pipeline.is_stable_on(path, &output.content);

        if !self.options.dry_run {
            let target = validate_path_within_root(path, root)
                .map_err(|e| RewriteError::OutsideRoot(e.to_string()))?;
            fs::write(&target, output.content.as_bytes()).map_err(RewriteError::Write)?;
        }

        Ok(FileOutcome::Changed {
            applied: output.applied,
            stable,
        })
    }

    /// Process an already collected file set.
    ///
    /// `on_event` sees every file as it is processed; an error it returns
    /// stops the run.
    ///
    /// # Errors
    ///
    /// Only errors returned by `on_event` are propagated.
    pub fn run_files(
        &self,
        root: &Path,
        files: &FileSet,
        mut on_event: impl FnMut(&FileEvent<'_>) -> io::Result<()>,
    ) -> io::Result<RunReport> {
        let mut report = RunReport::new(root, &self.pipeline, self.options.dry_run);
        report.directories = files.directories;
        report.walk_errors.clone_from(&files.walk_errors);

        for path in &files.files {
            on_event(&FileEvent::Visited { path })?;
            report.scanned += 1;
            let display = normalize_display_path(path);

            match self.rewrite_file(root, path) {
                Ok(FileOutcome::Unchanged) => report.unchanged += 1,
                Ok(FileOutcome::Changed { applied, stable }) => {
                    on_event(&FileEvent::Changed {
                        path,
                        applied: &applied,
                        dry_run: self.options.dry_run,
                    })?;
                    if !stable {
                        on_event(&FileEvent::Unstable { path })?;
                        report.non_idempotent.push(display.clone());
                    }
                    report.changed += 1;
                    report.record_hits(&applied);
                    report.changed_files.push(ChangedFile {
                        path: display,
                        transforms: applied,
                    });
                }
                Err(error) => {
                    on_event(&FileEvent::Failed {
                        path,
                        error: &error,
                    })?;
                    report.errored += 1;
                    report.errors.push(FileError {
                        path: display,
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Walk `root` and process every selected file.
    ///
    /// # Errors
    ///
    /// Returns an error, before touching any file, if `root` is not an
    /// existing directory. Errors returned by `on_event` are propagated.
    pub fn run(
        &self,
        root: &Path,
        on_event: impl FnMut(&FileEvent<'_>) -> io::Result<()>,
    ) -> anyhow::Result<RunReport> {
        if !root.is_dir() {
            anyhow::bail!("Root directory '{}' does not exist", root.display());
        }
        let files = self.collect(root);
        Ok(self.run_files(root, &files, on_event)?)
    }
}
