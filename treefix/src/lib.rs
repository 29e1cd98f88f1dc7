//! Core library for treefix.
//!
//! treefix walks a source tree and applies an ordered pipeline of text
//! transforms to every selected file, writing a file back only when its
//! contents changed. Running it twice changes nothing the second time.
//!
//! The pieces, bottom-up:
//! - [`transform`]: the [`transform::Transform`] trait, the comment stripper
//!   and declarative find-and-replace rules
//! - [`utils`]: file discovery with directory pruning
//! - [`fix`]: the [`fix::TreeRewriter`] and its [`fix::RunReport`]
//! - [`config`], [`cli`], [`commands`], [`entry_point`]: the command-line tool

#![allow(clippy::module_name_repetitions, clippy::items_after_statements)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing text transforms and the pipeline that runs them.
pub mod transform;

/// Module containing the tree rewriter and run report.
pub mod fix;

/// Module for loading configuration.
pub mod config;

/// Module containing utility functions.
/// This includes path normalization and file discovery.
pub mod utils;

/// Module defining the entry point logic shared by both binaries.
pub mod entry_point;

/// Module containing shared constants.
pub mod constants;

/// Module for CLI output formatting with colored text and tables.
pub mod output;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;
