//! Progress Tracker: reading time and scroll progress for the open book.
//!
//! ```text
//! Idle --open(book)--> Active --page turn--> Active (flush scheduled)
//!                        ^                        |
//!                        +------ flush due -------+
//! Active --open(other) / close--> Idle (pending flush dropped)
//! ```
//!
//! Page turns only (re)schedule a flush; the front-matter write happens once
//! the reader has stopped turning pages for the configured delay. Time since
//! the last flush is lost on an abrupt switch, at most one delay's worth.

mod clock;

pub use clock::{Clock, DebounceTimer, ManualClock, Scheduler, SystemClock};

use crate::config::{Config, FlipConfig, TrackingConfig};
use crate::error::Result;
use crate::frontmatter::FrontMatter;
use crate::ui::Ui;
use crate::vault::{self, DocumentStore};
use tracing::{debug, info};

/// Geometry of the reading view, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollView {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
    pub mode: ViewMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Preview,
    Source,
}

/// Work queued by a page turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushJob {
    pub path: String,
}

/// State for the book currently in view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingSession {
    pub path: String,
    /// When the current stretch of reading started counting.
    pub start_time: u64,
}

/// What happened to a freshly measured progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressUpdate {
    Accepted(f64),
    /// Lower than what is stored; progress never goes backwards.
    Regressed { stored: f64, measured: f64 },
    /// Strict mode: the jump is larger than two viewports.
    TooLarge { stored: f64, measured: f64 },
    /// The view has no height yet.
    NoLayout,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render milliseconds as `XhYmZs`, leaving out zero components.
///
/// ```
/// # use shelfmark::tracker::format_duration;
/// assert_eq!(format_duration(3_723_000), "1h2m3s");
/// assert_eq!(format_duration(60_000), "1m");
/// assert_eq!(format_duration(0), "");
/// ```
pub fn format_duration(ms: u64) -> String {
    let seconds = (ms / 1000) % 60;
    let minutes = (ms / (1000 * 60)) % 60;
    let hours = ms / (1000 * 60 * 60);

    let mut out = String::new();
    for (value, unit) in [(hours, 'h'), (minutes, 'm'), (seconds, 's')] {
        if value > 0 {
            out.push_str(&format!("{value}{unit}"));
        }
    }
    out
}

pub fn status_text(reading_time: u64, progress: f64) -> String {
    format!("{} ⏱️ {}% ⏳", format_duration(reading_time), progress)
}

/// Decide whether the view's position may replace the stored progress.
pub fn evaluate_progress(stored: f64, view: &ScrollView, strict: bool) -> ProgressUpdate {
    if view.scroll_height <= 0.0 {
        return ProgressUpdate::NoLayout;
    }

    let measured = round2((view.scroll_top + view.client_height) / view.scroll_height * 100.0).min(100.0);
    if measured < stored {
        return ProgressUpdate::Regressed { stored, measured };
    }

    let max_jump = view.client_height / view.scroll_height * 200.0;
    if strict && measured - stored > max_jump {
        return ProgressUpdate::TooLarge { stored, measured };
    }

    ProgressUpdate::Accepted(measured)
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub struct ProgressTracker<C, S> {
    tracking: TrackingConfig,
    flip: FlipConfig,
    clock: C,
    scheduler: S,
    session: Option<ReadingSession>,
    status: String,
}

impl ProgressTracker<SystemClock, DebounceTimer<SystemClock, FlushJob>> {
    /// Tracker on wall-clock time.
    pub fn system(config: &Config) -> Self {
        Self::new(config, SystemClock, DebounceTimer::new(SystemClock))
    }
}

impl<C: Clock, S: Scheduler<FlushJob>> ProgressTracker<C, S> {
    pub fn new(config: &Config, clock: C, scheduler: S) -> Self {
        Self {
            tracking: config.tracking.clone(),
            flip: config.flip.clone(),
            clock,
            scheduler,
            session: None,
            status: String::new(),
        }
    }

    /// Markdown documents directly inside the book folder are tracked.
    pub fn is_tracked(&self, path: &str) -> bool {
        vault::is_markdown(path) && vault::parent(path) == self.tracking.folder.trim_matches('/')
    }

    pub fn session(&self) -> Option<&ReadingSession> {
        self.session.as_ref()
    }

    /// Status line for the open book, empty when nothing is tracked.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn has_pending_flush(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// A document became active.
    pub fn open(&mut self, store: &dyn DocumentStore, ui: &dyn Ui, path: &str) -> Result<()> {
        self.close();
        if !self.is_tracked(path) {
            return Ok(());
        }

        let fm = store.frontmatter(path)?;
        self.session = Some(ReadingSession {
            path: path.to_string(),
            start_time: self.clock.now_ms(),
        });
        self.status = status_text(fm.reading_time(), fm.reading_progress());
        debug!(path, "reading session started");

        self.offer_reading_date(store, ui, path, &fm)?;
        self.offer_completion_date(store, ui, path, &fm)?;
        Ok(())
    }

    /// Leave the current book. Any pending flush is dropped.
    pub fn close(&mut self) {
        self.scheduler.cancel_pending();
        self.session = None;
        self.status.clear();
    }

    /// Move the view down one page, if flipping is enabled.
    pub fn flip(&self, view: &mut ScrollView) {
        if self.flip.enabled {
            view.scroll_top += view.client_height + self.flip.revise;
        }
    }

    /// Scroll gesture: flip only, nothing is tracked.
    pub fn scroll(&self, view: &mut ScrollView) {
        if self.session.is_some() && view.mode == ViewMode::Preview {
            self.flip(view);
        }
    }

    /// Click on the reading view: flip and (re)schedule a flush.
    pub fn page_turn(&mut self, view: &mut ScrollView) {
        if view.mode == ViewMode::Source {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        let job = FlushJob {
            path: session.path.clone(),
        };

        self.flip(view);
        if !self.tracking.enabled {
            return;
        }
        self.scheduler.cancel_pending();
        self.scheduler.schedule(self.tracking.delay_ms, job);
    }

    /// Run a due flush, if any, against the current view geometry.
    pub fn tick(
        &mut self,
        store: &dyn DocumentStore,
        ui: &dyn Ui,
        view: &ScrollView,
    ) -> Result<Option<ProgressUpdate>> {
        let Some(job) = self.scheduler.take_due() else {
            return Ok(None);
        };
        if self.session.as_ref().is_none_or(|s| s.path != job.path) {
            return Ok(None);
        }
        self.flush(store, ui, &job.path, view).map(Some)
    }

    fn flush(
        &mut self,
        store: &dyn DocumentStore,
        ui: &dyn Ui,
        path: &str,
        view: &ScrollView,
    ) -> Result<ProgressUpdate> {
        let now = self.clock.now_ms();
        let elapsed = match self.session.as_mut() {
            Some(session) => {
                let elapsed = now.saturating_sub(session.start_time).min(self.tracking.timeout_ms);
                session.start_time = now;
                elapsed
            }
            None => 0,
        };

        let strict = self.tracking.strict_progress;
        let mut update = ProgressUpdate::NoLayout;
        let mut after = FrontMatter::default();
        store.update_frontmatter(path, &mut |fm| {
            let total = fm.reading_time() + elapsed;
            fm.reading_time = Some(total);
            fm.reading_time_format = Some(format_duration(total));
            update = evaluate_progress(fm.reading_progress(), view, strict);
            if let ProgressUpdate::Accepted(progress) = update {
                fm.reading_progress = Some(progress);
            }
            after = fm.clone();
        })?;

        self.status = status_text(after.reading_time(), after.reading_progress());
        match update {
            ProgressUpdate::Accepted(progress) => {
                info!(path, elapsed, progress, "reading progress saved");
                self.offer_completion_date(store, ui, path, &after)?;
            }
            ProgressUpdate::TooLarge { stored, measured } => {
                info!(path, stored, measured, "progress jump rejected");
                ui.notice(&format!(
                    "Strict progress is on: ignored a jump from {stored}% to {measured}%"
                ));
            }
            ProgressUpdate::Regressed { .. } | ProgressUpdate::NoLayout => {
                debug!(path, ?update, "progress unchanged");
            }
        }
        Ok(update)
    }

    fn offer_reading_date(
        &self,
        store: &dyn DocumentStore,
        ui: &dyn Ui,
        path: &str,
        fm: &FrontMatter,
    ) -> Result<()> {
        if fm.reading_date.is_some() || !self.tracking.record_status {
            return Ok(());
        }
        let prompt = format!("\"{}\" has not been started. Mark it as reading?", vault::basename(path));
        if ui.confirm(&prompt) {
            let date = today();
            store.update_frontmatter(path, &mut |fm| fm.reading_date = Some(date.clone()))?;
        }
        Ok(())
    }

    fn offer_completion_date(
        &self,
        store: &dyn DocumentStore,
        ui: &dyn Ui,
        path: &str,
        fm: &FrontMatter,
    ) -> Result<()> {
        if fm.reading_progress() < 100.0 || fm.completion_date.is_some() || !self.tracking.record_status {
            return Ok(());
        }
        let prompt = format!("\"{}\" is at 100%. Mark it as finished?", vault::basename(path));
        if ui.confirm(&prompt) {
            let date = today();
            store.update_frontmatter(path, &mut |fm| fm.completion_date = Some(date.clone()))?;
        }
        Ok(())
    }

    /// Scroll the view to the stored progress.
    pub fn jump_to_progress(
        &self,
        store: &dyn DocumentStore,
        ui: &dyn Ui,
        path: &str,
        view: &mut ScrollView,
    ) -> Result<Option<f64>> {
        let progress = store.frontmatter(path)?.reading_progress();
        if progress <= 0.0 {
            return Ok(None);
        }
        view.scroll_top = view.scroll_height * progress / 100.0;
        ui.notice(&format!("Jumped to {progress}%"));
        Ok(Some(progress))
    }
}
