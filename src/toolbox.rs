//! Wires the components to host events and commands.
//!
//! The host forwards three kinds of input: a document became active, the
//! reader interacted with the reading view, and a command was invoked.

use crate::config::Config;
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::highlight;
use crate::sync::{SyncOutcome, Synchronizer};
use crate::spotlight::Spotlight;
use crate::tracker::{
    Clock, DebounceTimer, FlushJob, ProgressTracker, ProgressUpdate, Scheduler, ScrollView, SystemClock,
};
use crate::ui::Ui;
use crate::vault::{self, DocumentStore};
use rand::Rng;
use tracing::{debug, warn};

/// Front-matter of a freshly created card note.
pub const CARD_TEMPLATE: &str = "---\nempty: true\n---";

/// Replace the selection with a link to a card note named after it, creating
/// the card in `folder` unless it already exists.
///
/// Returns the card's path.
pub fn create_card(editor: &mut dyn Editor, store: &dyn DocumentStore, folder: &str) -> Result<String> {
    let name = editor.selection();
    if name.trim().is_empty() || name.contains(['/', '\\', '\n']) {
        return Err(Error::InvalidPath(name));
    }

    let path = vault::join(folder, &format!("{name}.md"));
    if store.exists(&path) {
        debug!(path, "card exists, linking only");
    } else {
        store.create(&path, CARD_TEMPLATE)?;
    }
    editor.replace_selection(&format!("[[{name}|{name}]]"));
    Ok(path)
}

/// What happened when a document became active.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OpenReport {
    pub spotlight_refreshed: bool,
    pub tracking: bool,
    pub sync: Option<SyncOutcome>,
}

pub struct Toolbox<C, S> {
    config: Config,
    tracker: ProgressTracker<C, S>,
    synchronizer: Synchronizer,
    spotlight: Spotlight,
}

impl Toolbox<SystemClock, DebounceTimer<SystemClock, FlushJob>> {
    pub fn system(config: Config) -> Self {
        let tracker = ProgressTracker::system(&config);
        Self::new(config, tracker)
    }
}

impl<C: Clock, S: Scheduler<FlushJob>> Toolbox<C, S> {
    pub fn new(config: Config, tracker: ProgressTracker<C, S>) -> Self {
        Self {
            synchronizer: Synchronizer::new(&config),
            spotlight: Spotlight::new(&config),
            tracker,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &ProgressTracker<C, S> {
        &self.tracker
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    pub fn spotlight(&self) -> &Spotlight {
        &self.spotlight
    }

    /// A document became active.
    pub fn on_file_open<R: Rng + ?Sized>(
        &mut self,
        store: &dyn DocumentStore,
        ui: &dyn Ui,
        path: &str,
        rng: &mut R,
    ) -> Result<OpenReport> {
        let mut report = OpenReport::default();
        if !vault::is_markdown(path) {
            self.tracker.close();
            return Ok(report);
        }

        // Leaving the previous book must happen before anything can fail.
        self.tracker.open(store, ui, path)?;
        report.tracking = self.tracker.session().is_some();

        if self.spotlight.is_home(path) {
            match self.spotlight.refresh(store, rng) {
                Ok(refreshed) => report.spotlight_refreshed = refreshed,
                Err(e) => {
                    warn!(path, error = %e, "spotlight refresh failed");
                    ui.notice(&format!("{} - spotlight failed: {}", vault::file_name(path), e));
                }
            }
        }

        if report.tracking && self.config.notes.enabled {
            match self.synchronizer.sync(store, ui, path) {
                Ok(outcome) => report.sync = Some(outcome),
                Err(e) => {
                    warn!(path, error = %e, "sync on open failed");
                    ui.notice(&format!("{} - sync failed: {}", vault::file_name(path), e));
                }
            }
        }
        Ok(report)
    }

    /// Click on the reading view.
    pub fn on_page_turn(&mut self, view: &mut ScrollView) {
        self.tracker.page_turn(view);
    }

    /// Scroll gesture on the reading view.
    pub fn on_scroll(&self, view: &mut ScrollView) {
        self.tracker.scroll(view);
    }

    /// Give the tracker a chance to run a due flush.
    pub fn tick(&mut self, store: &dyn DocumentStore, ui: &dyn Ui, view: &ScrollView) -> Result<Option<ProgressUpdate>> {
        self.tracker.tick(store, ui, view)
    }

    pub fn highlight<R: Rng + ?Sized>(&self, editor: &mut dyn Editor, ui: &dyn Ui, rng: &mut R) -> Result<String> {
        if !self.config.notes.enabled {
            return Err(Error::Config("reading notes are disabled".to_string()));
        }
        highlight::highlight_selection(editor, ui, rng)
    }

    pub fn create_card(&self, editor: &mut dyn Editor, store: &dyn DocumentStore) -> Result<String> {
        create_card(editor, store, &self.config.cards.folder)
    }

    pub fn sync_all(&self, store: &dyn DocumentStore, ui: &dyn Ui) -> Result<Vec<(String, SyncOutcome)>> {
        if !self.config.notes.enabled {
            return Ok(Vec::new());
        }
        self.synchronizer.sync_all(store, ui)
    }

    /// Scroll the view of the active book to its stored progress.
    pub fn jump_to_progress(&self, store: &dyn DocumentStore, ui: &dyn Ui, view: &mut ScrollView) -> Result<Option<f64>> {
        match self.tracker.session() {
            Some(session) => self.tracker.jump_to_progress(store, ui, &session.path, view),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BufferEditor;
    use crate::parser::Position;
    use crate::tracker::ManualClock;
    use crate::ui::ScriptedUi;
    use crate::vault::MemoryVault;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn toolbox(config: Config) -> (ManualClock, Toolbox<ManualClock, DebounceTimer<ManualClock, FlushJob>>) {
        let clock = ManualClock::new(0);
        let tracker = ProgressTracker::new(&config, clock.clone(), DebounceTimer::new(clock.clone()));
        (clock, Toolbox::new(config, tracker))
    }

    fn vault() -> MemoryVault {
        let vault = MemoryVault::new();
        vault.insert("Books/Dune.md", "---\ntags: book\nreadingDate: 2024-01-01\n---\n==spice%%^abc123^%%==\n");
        vault.insert("Books/Notes/Emma.md", "> [!quote] [match](Books/Emma.md#^eeeeee)\n");
        vault.insert("Home.md", "%%quote|1%%%%quote-end%%");
        vault.insert("Journal.md", "today");
        vault
    }

    #[test]
    fn test_create_card() {
        let store = MemoryVault::new();
        let mut editor = BufferEditor::new("see Stoicism here")
            .with_selection(Position { line: 0, ch: 4 }, Position { line: 0, ch: 12 });

        let path = create_card(&mut editor, &store, "Cards").unwrap();
        assert_eq!(path, "Cards/Stoicism.md");
        assert_eq!(store.read(&path).unwrap(), CARD_TEMPLATE);
        assert_eq!(editor.text(), "see [[Stoicism|Stoicism]] here");
    }

    #[test]
    fn test_create_card_keeps_existing_card() {
        let store = MemoryVault::new();
        store.insert("Cards/Stoicism.md", "my notes");
        let mut editor = BufferEditor::new("Stoicism")
            .with_selection(Position { line: 0, ch: 0 }, Position { line: 0, ch: 8 });

        create_card(&mut editor, &store, "Cards").unwrap();
        assert_eq!(store.read("Cards/Stoicism.md").unwrap(), "my notes");
        assert_eq!(editor.text(), "[[Stoicism|Stoicism]]");
    }

    #[test]
    fn test_create_card_rejects_bad_names() {
        let store = MemoryVault::new();
        let mut editor = BufferEditor::new("a/b");
        assert!(matches!(create_card(&mut editor, &store, "Cards"), Err(Error::InvalidPath(_))));

        let mut editor = BufferEditor::new("a/b")
            .with_selection(Position { line: 0, ch: 0 }, Position { line: 0, ch: 3 });
        assert!(matches!(create_card(&mut editor, &store, "Cards"), Err(Error::InvalidPath(_))));
        assert_eq!(editor.text(), "a/b");
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_open_book_tracks_and_syncs() {
        let (_, mut toolbox) = toolbox(Config::default());
        let store = vault();
        let ui = ScriptedUi::new();
        let mut rng = StdRng::seed_from_u64(0);

        let report = toolbox.on_file_open(&store, &ui, "Books/Dune.md", &mut rng).unwrap();
        assert!(report.tracking);
        assert!(!report.spotlight_refreshed);
        assert_eq!(report.sync, Some(SyncOutcome::Created("Books/Notes/Dune.md".to_string())));
        assert!(toolbox.tracker().status().contains("⏱️"));
    }

    #[test]
    fn test_open_home_refreshes_spotlight() {
        let (_, mut toolbox) = toolbox(Config::default());
        let store = vault();
        let ui = ScriptedUi::new();
        let mut rng = StdRng::seed_from_u64(0);

        toolbox.on_file_open(&store, &ui, "Books/Dune.md", &mut rng).unwrap();
        let report = toolbox.on_file_open(&store, &ui, "Home.md", &mut rng).unwrap();
        assert!(report.spotlight_refreshed);
        assert!(!report.tracking);
        assert_eq!(toolbox.tracker().status(), "");
    }

    #[test]
    fn test_failed_spotlight_still_ends_previous_session() {
        let (clock, mut toolbox) = toolbox(Config::default());
        let store = vault();
        let ui = ScriptedUi::new();
        let mut rng = StdRng::seed_from_u64(0);

        toolbox.on_file_open(&store, &ui, "Books/Dune.md", &mut rng).unwrap();
        let writes_after_open = store.write_count("Books/Dune.md");
        let mut view = ScrollView {
            client_height: 100.0,
            scroll_height: 1000.0,
            ..ScrollView::default()
        };
        toolbox.on_page_turn(&mut view);

        // Home is listed as the spotlight target but cannot be read.
        let missing_home = MemoryVault::new();
        missing_home.insert("Books/Dune.md", &store.read("Books/Dune.md").unwrap());
        let report = toolbox.on_file_open(&missing_home, &ui, "Home.md", &mut rng).unwrap();

        assert!(!report.spotlight_refreshed);
        assert!(toolbox.tracker().session().is_none());
        assert!(ui.notices().iter().any(|n| n.starts_with("Home.md - spotlight failed")));

        clock.advance(10_000);
        assert_eq!(toolbox.tick(&store, &ui, &view).unwrap(), None);
        assert_eq!(store.write_count("Books/Dune.md"), writes_after_open);
    }

    #[test]
    fn test_open_other_document_is_quiet() {
        let (_, mut toolbox) = toolbox(Config::default());
        let store = vault();
        let ui = ScriptedUi::new();
        let mut rng = StdRng::seed_from_u64(0);

        let report = toolbox.on_file_open(&store, &ui, "Journal.md", &mut rng).unwrap();
        assert_eq!(report, OpenReport::default());
        let report = toolbox.on_file_open(&store, &ui, "Books/cover.png", &mut rng).unwrap();
        assert_eq!(report, OpenReport::default());
        assert!(ui.notices().is_empty());
    }

    #[test]
    fn test_notes_disabled_skips_sync() {
        let mut config = Config::default();
        config.notes.enabled = false;
        let (_, mut toolbox) = toolbox(config);
        let store = vault();
        let ui = ScriptedUi::new();
        let mut rng = StdRng::seed_from_u64(0);

        let report = toolbox.on_file_open(&store, &ui, "Books/Dune.md", &mut rng).unwrap();
        assert!(report.tracking);
        assert_eq!(report.sync, None);
        assert!(toolbox.sync_all(&store, &ui).unwrap().is_empty());

        let mut editor = BufferEditor::new("text")
            .with_selection(Position { line: 0, ch: 0 }, Position { line: 0, ch: 4 });
        assert!(matches!(toolbox.highlight(&mut editor, &ui, &mut rng), Err(Error::Config(_))));
    }

    #[test]
    fn test_page_turn_flush_through_toolbox() {
        let (clock, mut toolbox) = toolbox(Config::default());
        let store = vault();
        let ui = ScriptedUi::new();
        let mut rng = StdRng::seed_from_u64(0);
        toolbox.on_file_open(&store, &ui, "Books/Dune.md", &mut rng).unwrap();

        let mut view = ScrollView {
            scroll_top: 0.0,
            client_height: 500.0,
            scroll_height: 1000.0,
            ..ScrollView::default()
        };
        toolbox.on_page_turn(&mut view);
        assert_eq!(view.scroll_top, 420.0);

        clock.advance(3_000);
        let update = toolbox.tick(&store, &ui, &view).unwrap();
        assert_eq!(update, Some(ProgressUpdate::Accepted(92.0)));

        let mut fresh = ScrollView {
            scroll_height: 1000.0,
            ..ScrollView::default()
        };
        assert_eq!(toolbox.jump_to_progress(&store, &ui, &mut fresh).unwrap(), Some(92.0));
        assert_eq!(fresh.scroll_top, 920.0);
    }
}
