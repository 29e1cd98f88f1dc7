//! Commands module - CLI command implementations.
//!
//! The default command rewrites a tree ([`run_fix`]); `init` and `rules`
//! are subcommands.

mod fix;
mod init;
mod rules;
mod settings;

pub use fix::{run_fix, FixOptions};
pub use init::{run_init, run_init_in, DEFAULT_CONFIG};
pub use rules::run_rules;
pub use settings::Settings;
