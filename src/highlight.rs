//! Highlight Composer and the inline markup it produces.
//!
//! ```text
//! ==<text>%%💬<idea>💬%%%%^<id>^%%==
//! ```
//!
//! The idea tag is optional and may repeat. Everything inside `%%` is an
//! Obsidian comment, so the rendered note shows only the highlighted text.

use crate::editor::Editor;
use crate::error::Result;
use crate::locator;
use crate::ui::Ui;
use rand::Rng;

pub const IDEA_OPEN: &str = "%%💬";
pub const IDEA_CLOSE: &str = "💬%%";

/// Wrap a selection into highlight markup referencing `block_id`.
///
/// # Examples
///
/// ```
/// use shelfmark::highlight::compose;
///
/// assert_eq!(compose("spice", None, "a1b2c3"), "==spice%%^a1b2c3^%%==");
/// assert_eq!(
///     compose("spice", Some("must flow"), "a1b2c3"),
///     "==spice%%💬must flow💬%%%%^a1b2c3^%%=="
/// );
/// ```
pub fn compose(selected: &str, annotation: Option<&str>, block_id: &str) -> String {
    let idea = match annotation {
        Some(text) if !text.is_empty() => format!("{IDEA_OPEN}{text}{IDEA_CLOSE}"),
        _ => String::new(),
    };
    format!("=={selected}{idea}%%^{block_id}^%%==")
}

/// Highlight the current selection.
///
/// Resolves (or assigns) the block id first, then asks for an optional idea
/// and replaces the selection with the composed markup. A dismissed prompt
/// still records the highlight, just without an idea.
pub fn highlight_selection<R: Rng + ?Sized>(
    editor: &mut dyn Editor,
    ui: &dyn Ui,
    rng: &mut R,
) -> Result<String> {
    let selection = editor.selection();
    let block_id = locator::locate(editor, rng)?;
    let idea = ui.input("Idea", &selection);
    let markup = compose(&selection, idea.as_deref(), &block_id);
    editor.replace_selection(&markup);
    Ok(markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BufferEditor;
    use crate::parser::Position;
    use crate::ui::ScriptedUi;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_compose_without_annotation() {
        assert_eq!(compose("hello", None, "abc12"), "==hello%%^abc12^%%==");
        assert_eq!(compose("hello", Some(""), "abc12"), "==hello%%^abc12^%%==");
    }

    #[test]
    fn test_compose_with_annotation() {
        assert_eq!(
            compose("hello", Some("nice"), "abc12"),
            "==hello%%💬nice💬%%%%^abc12^%%=="
        );
    }

    #[test]
    fn test_highlight_selection_rewrites_buffer() {
        let mut rng = StdRng::seed_from_u64(42);
        let ui = ScriptedUi::new();
        ui.answer_input(Some("worth remembering"));

        let mut editor = BufferEditor::new("Fear is the mind-killer.")
            .with_selection(Position::new(0, 0), Position::new(0, 4));
        let markup = highlight_selection(&mut editor, &ui, &mut rng).unwrap();

        let id = editor.structure().sections[0].id.clone().unwrap();
        assert_eq!(markup, format!("==Fear%%💬worth remembering💬%%%%^{id}^%%=="));
        assert_eq!(
            editor.text(),
            format!("==Fear%%💬worth remembering💬%%%%^{id}^%%== is the mind-killer. ^{id}")
        );
    }

    #[test]
    fn test_dismissed_prompt_still_highlights() {
        let mut rng = StdRng::seed_from_u64(42);
        let ui = ScriptedUi::new();
        let mut editor =
            BufferEditor::new("Plain text").with_selection(Position::new(0, 6), Position::new(0, 10));
        let markup = highlight_selection(&mut editor, &ui, &mut rng).unwrap();
        assert!(markup.starts_with("==text%%^"));
        assert!(!markup.contains("💬"));
    }
}
