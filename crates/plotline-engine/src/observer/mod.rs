//! Debounced reactions to cursor movement and document edits.
//!
//! The host owns the document behind an `Rc<RefCell<_>>` and hands the
//! observer a weak handle. Events only schedule work; the work itself runs
//! when a debounce window closes, either from [`ChangeObserver::poll`] or
//! from a host timer calling [`ChangeObserver::fire_cursor`] /
//! [`ChangeObserver::fire_reanalysis`] with the generation it was given.
//! Fire-time work reads the document as it is then, through a fresh
//! `try_borrow`, and never holds the borrow while a callback runs.

mod debounce;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use crate::editing::Document;
use crate::scenes::{SceneChange, SceneIndexer};

pub use debounce::Debouncer;

/// Shared handle the host keeps to its live document
pub type SharedDocument = Rc<RefCell<Document>>;

/// Quiet intervals for the two debounce timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverSettings {
    pub cursor_quiet: Duration,
    pub reanalysis_quiet: Duration,
}

impl ObserverSettings {
    pub const DEFAULT_CURSOR_QUIET: Duration = Duration::from_millis(300);
    pub const DEFAULT_REANALYSIS_QUIET: Duration = Duration::from_secs(2);
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            cursor_quiet: Self::DEFAULT_CURSOR_QUIET,
            reanalysis_quiet: Self::DEFAULT_REANALYSIS_QUIET,
        }
    }
}

/// Snapshot reported after a quiet period following edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    pub version: u64,
    pub text: String,
    pub boundaries: Vec<usize>,
}

/// Generations handed out by [`ChangeObserver::document_changed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub cursor: u64,
    pub reanalysis: u64,
}

/// What happened to a fire attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    /// The work ran; callbacks were invoked if anything changed
    Ran,
    /// A newer event superseded this generation
    Stale,
    /// The document was mid-mutation; the work stays pending
    Busy,
    /// The document is gone; nothing will fire again
    Disposed,
}

type DocumentCallback = Box<dyn FnMut(&DocumentChange)>;

pub struct ChangeObserver {
    document: Weak<RefCell<Document>>,
    cursor_timer: Debouncer,
    reanalysis_timer: Debouncer,
    /// Cursor from the latest move not yet processed
    pending_cursor: Option<usize>,
    /// Cursor the indexer last looked at
    last_cursor: Option<usize>,
    indexer: SceneIndexer,
    last_change: Option<DocumentChange>,
    on_document_change: Option<DocumentCallback>,
    disposed: bool,
}

impl ChangeObserver {
    pub fn new(
        document: &SharedDocument,
        settings: ObserverSettings,
        on_scene_change: impl FnMut(SceneChange) + 'static,
    ) -> Self {
        Self {
            document: Rc::downgrade(document),
            cursor_timer: Debouncer::new(settings.cursor_quiet),
            reanalysis_timer: Debouncer::new(settings.reanalysis_quiet),
            pending_cursor: None,
            last_cursor: None,
            indexer: SceneIndexer::new(on_scene_change),
            last_change: None,
            on_document_change: None,
            disposed: false,
        }
    }

    /// Register the callback for debounced whole-document reports
    pub fn on_document_change(mut self, callback: impl FnMut(&DocumentChange) + 'static) -> Self {
        self.on_document_change = Some(Box::new(callback));
        self
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed || self.document.strong_count() == 0
    }

    pub fn last_change(&self) -> Option<&DocumentChange> {
        self.last_change.as_ref()
    }

    /// Record a cursor move; returns the generation a host timer should fire
    pub fn cursor_moved(&mut self, cursor: usize, now: Instant) -> u64 {
        self.pending_cursor = Some(cursor);
        self.cursor_timer.schedule(now)
    }

    /// Record an edit. Schedules both the scene recheck at the last cursor
    /// and the whole-document re-analysis.
    pub fn document_changed(&mut self, now: Instant) -> Scheduled {
        Scheduled {
            cursor: self.cursor_timer.schedule(now),
            reanalysis: self.reanalysis_timer.schedule(now),
        }
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.cursor_timer.deadline(), self.reanalysis_timer.deadline()) {
            (Some(cursor), Some(reanalysis)) => Some(cursor.min(reanalysis)),
            (cursor, reanalysis) => cursor.or(reanalysis),
        }
    }

    /// Run whatever work is due at `now`; returns how many jobs ran
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut ran = 0;
        if let Some(generation) = self.cursor_timer.due(now)
            && self.fire_cursor(generation, now) == Fired::Ran
        {
            ran += 1;
        }
        if let Some(generation) = self.reanalysis_timer.due(now)
            && self.fire_reanalysis(generation, now) == Fired::Ran
        {
            ran += 1;
        }
        ran
    }

    /// Recompute boundaries and report the scene under the cursor if it
    /// changed
    pub fn fire_cursor(&mut self, generation: u64, now: Instant) -> Fired {
        if self.disposed {
            return Fired::Disposed;
        }
        if !self.cursor_timer.is_current(generation) {
            return Fired::Stale;
        }
        let Some(document) = self.document.upgrade() else {
            self.dispose();
            return Fired::Disposed;
        };
        let boundaries = match document.try_borrow() {
            Ok(doc) => doc.scene_boundaries(),
            Err(_) => {
                log::debug!("document busy, retrying cursor work {generation}");
                self.cursor_timer.retry(now);
                return Fired::Busy;
            }
        };
        drop(document);
        self.cursor_timer.claim(generation);

        self.indexer.set_boundaries(boundaries.to_vec());
        if let Some(cursor) = self.pending_cursor.take().or(self.last_cursor) {
            self.last_cursor = Some(cursor);
            self.indexer.on_cursor_move(cursor);
        }
        Fired::Ran
    }

    /// Report the document's text and boundaries if either changed since the
    /// last report
    pub fn fire_reanalysis(&mut self, generation: u64, now: Instant) -> Fired {
        if self.disposed {
            return Fired::Disposed;
        }
        if !self.reanalysis_timer.is_current(generation) {
            return Fired::Stale;
        }
        let Some(document) = self.document.upgrade() else {
            self.dispose();
            return Fired::Disposed;
        };
        let change = match document.try_borrow() {
            Ok(doc) => DocumentChange {
                version: doc.version(),
                text: doc.text(),
                boundaries: doc.scene_boundaries().to_vec(),
            },
            Err(_) => {
                log::debug!("document busy, retrying re-analysis {generation}");
                self.reanalysis_timer.retry(now);
                return Fired::Busy;
            }
        };
        drop(document);
        self.reanalysis_timer.claim(generation);

        let unchanged = self.last_change.as_ref().is_some_and(|last| {
            last.text == change.text && last.boundaries == change.boundaries
        });
        if unchanged {
            log::debug!("version {} unchanged since last report", change.version);
            return Fired::Ran;
        }
        if let Some(callback) = self.on_document_change.as_mut() {
            callback(&change);
        }
        self.last_change = Some(change);
        Fired::Ran
    }

    fn dispose(&mut self) {
        log::debug!("document dropped, discarding pending work");
        self.disposed = true;
        self.pending_cursor = None;
        self.cursor_timer.cancel();
        self.reanalysis_timer.cancel();
    }
}

impl fmt::Debug for ChangeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeObserver")
            .field("cursor_timer", &self.cursor_timer)
            .field("reanalysis_timer", &self.reanalysis_timer)
            .field("pending_cursor", &self.pending_cursor)
            .field("last_cursor", &self.last_cursor)
            .field("indexer", &self.indexer)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
