//! Prefetching picture pipeline

mod cache;
mod loader;
mod navigator;
mod request;
mod session;
mod types;
mod worker;

pub use cache::{Entry, ImageCache, SharedCache};
pub use loader::{ImageLoader, Loader, bounded_size};
pub use navigator::Navigator;
pub use request::{LoadCompletion, LoadError, LoadRequest, LoadResult};
pub use session::{Command, Session, completion_handler};
pub use types::*;
pub use worker::{CompletionHandler, Dispatcher, WorkerPool, load_worker};

/// Positions kept loaded on each side of the current one
pub const DEFAULT_LOOKAHEAD_STEPS: usize = 2;
/// Longest edge of a loaded picture, in pixels
pub const DEFAULT_MAX_EDGE: u32 = 1366;
pub const DEFAULT_WORKERS: usize = 2;
/// Display refresh interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 10;
