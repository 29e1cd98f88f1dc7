//! Main binary entry point for treefix.
//!
//! This binary simply delegates to the shared `entry_point::run_with_args()` function
//! so that it behaves exactly like the `treefix` binary of the CLI crate.

use anyhow::Result;

fn main() -> Result<()> {
    let code = treefix::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
