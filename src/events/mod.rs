//! # Events Module
//!
//! Progress reporting decoupled from presentation.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, log file, tests) to subscribe and display progress. Long phases
//! throttle their progress events to a wall-clock interval through
//! [`ProgressTicker`].
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Match(MatchEvent::Progress(p)) = event {
//!             println!("{}/{}...", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod ticker;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use ticker::{ProgressTicker, DEFAULT_PROGRESS_INTERVAL};
pub use types::*;
