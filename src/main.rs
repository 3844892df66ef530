//! # file-zen CLI
//!
//! Command-line front end for the file-zen engine.
//!
//! ## Usage
//! ```bash
//! file-zen scan ~/Documents --recursive --checksum
//! file-zen organize ~/Camera ~/Pictures --by-year --by-month
//! ```

mod cli;

use file_zen::Result;

fn main() -> Result<()> {
    file_zen::init_tracing();
    cli::run()
}
