//! # Organize Module
//!
//! Places files into a date-structured destination tree.
//!
//! ## Stages (per file)
//! 1. **Filter** - [`FilterSet`] decides whether the file takes part
//! 2. **Resolve** - [`DestinationResolver`] maps it to
//!    `root[/YYYY][/MM][/DD]/<name>` using its effective creation date
//! 3. **Transfer** - [`TransferEngine`] copies or moves it, resolving
//!    collisions with the [`OverwritePolicy`]
//!
//! ## Collisions
//! An existing destination file is overwritten only when the policy allows
//! it. Otherwise identical content is skipped, and different content is
//! written as `<sha256>_<name>` beside it (skipped if that exists too).

mod filter;
mod resolver;
mod transfer;
mod types;

pub use filter::{FilterDecision, FilterSet};
pub use resolver::{destination_example, destination_format, DestinationResolver};
pub use transfer::{TransferEngine, TransferOutcome};
pub use types::*;
