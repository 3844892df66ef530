//! # Events Module
//!
//! Event stream from a running task to whatever UI is listening.
//!
//! ## Design
//! The core never holds a reference back into presentation state. Every
//! observable change (a file catalogued, a status line, completion) is sent
//! as an immutable [`Event`] through a channel, in processing order.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Status(line) => println!("{}", line.message),
//!             Event::Completed(summary) => println!("{} files", summary.files_processed),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&token, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender, ALL_DONE};
pub use types::*;
