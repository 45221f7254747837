//! Session controller: navigation, prefetch dispatch and display refresh

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use super::cache::{Entry, SharedCache};
use super::navigator::Navigator;
use super::request::{LoadCompletion, LoadRequest};
use super::worker::{CompletionHandler, Dispatcher};

/// Navigation input delivered by the event loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    GoTo(usize),
    First,
    Last,
}

/// What the display was last given, so `tick` only reports changes
#[derive(Clone, Debug, PartialEq, Eq)]
enum Shown {
    Nothing,
    Placeholder(usize),
    Settled(usize),
}

/// Browses a fixed sequence of pictures, keeping a window of them loaded.
///
/// Every navigation step computes the window around the new position and
/// dispatches loads for positions the cache has never seen. Nothing here
/// waits on a load.
pub struct Session<D: Dispatcher> {
    items: Arc<[PathBuf]>,
    navigator: Navigator,
    cache: SharedCache,
    dispatcher: D,
    dispatched: usize,
    shown: Shown,
}

impl<D: Dispatcher> Session<D> {
    /// Build a session over `items`; nothing is dispatched until the first
    /// navigation call (usually `set_index(0)`).
    pub fn new(items: impl Into<Arc<[PathBuf]>>, steps: usize, cache: SharedCache, dispatcher: D) -> Self {
        let items = items.into();
        let navigator = Navigator::new(items.len(), steps);
        Self {
            items,
            navigator,
            cache,
            dispatcher,
            dispatched: 0,
            shown: Shown::Nothing,
        }
    }

    /// Jump to `pos` (clamped) and prefetch its window
    pub fn set_index(&mut self, pos: usize) {
        self.navigator.set(pos);
        self.after_move();
    }

    pub fn advance(&mut self) {
        self.navigator.advance();
        self.after_move();
    }

    pub fn retreat(&mut self) {
        self.navigator.retreat();
        self.after_move();
    }

    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Next => self.advance(),
            Command::Previous => self.retreat(),
            Command::GoTo(pos) => self.set_index(pos),
            Command::First => self.set_index(0),
            Command::Last => self.set_index(self.len().saturating_sub(1)),
        }
    }

    fn after_move(&mut self) {
        if self.navigator.is_empty() {
            return;
        }
        info!(
            "position {}/{} ({:?})",
            self.navigator.current() + 1,
            self.len(),
            self.navigator.direction()
        );
        self.shown = Shown::Nothing;
        self.prefetch();
    }

    /// Dispatch loads for window positions the cache has no entry for
    fn prefetch(&mut self) {
        for pos in self.navigator.window() {
            let Some(path) = self.items.get(pos) else {
                warn!("window position {pos} outside sequence of {}", self.len());
                continue;
            };
            if !self.cache.mark_pending(pos) {
                continue;
            }
            debug!("dispatch {pos} {}", path.display());
            self.dispatcher.submit(LoadRequest::load(pos, path.clone()));
            self.dispatched += 1;
        }
    }

    /// Cache entry at the current position; `Absent` for an empty sequence
    #[must_use]
    pub fn current_payload(&self) -> Entry {
        if self.navigator.is_empty() {
            return Entry::Absent;
        }
        self.cache.get(self.navigator.current())
    }

    /// Periodic display hook.
    ///
    /// Returns the current entry when it differs from what was last
    /// returned (first call after a move, or a load that just settled).
    pub fn tick(&mut self) -> Option<Entry> {
        if self.navigator.is_empty() {
            return None;
        }
        let pos = self.navigator.current();
        let entry = self.cache.get(pos);
        let now = if entry.is_settled() {
            Shown::Settled(pos)
        } else {
            Shown::Placeholder(pos)
        };
        if now == self.shown {
            return None;
        }
        self.shown = now;
        Some(entry)
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.navigator.current()
    }

    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        if self.navigator.is_empty() {
            return None;
        }
        self.items.get(self.navigator.current()).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    #[must_use]
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Total number of load requests sent so far
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        self.dispatched
    }
}

/// Completion handler for the load workers: stores each result.
///
/// Results are kept even if the user has moved away from the position.
#[must_use]
pub fn completion_handler(cache: SharedCache) -> CompletionHandler {
    Arc::new(move |done: LoadCompletion| {
        match &done.result {
            Ok(_) => debug!("cache <- {} ({})", done.pos, done.path.display()),
            Err(e) => debug!("cache <- {} failed: {e}", done.pos),
        }
        cache.put(done.pos, done.result);
    })
}
