// Export modules for use in tests
pub mod event_source;
pub mod gallery;
pub mod main_app;
pub mod panic_handler;
pub mod sequence;
pub mod settings;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main app components
pub use main_app::{App, AppAction, run_app_with_event_source};
