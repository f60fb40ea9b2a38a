//! Editor surface.
//!
//! The Block Locator and the highlight commands only need a selection, a
//! cursor, range replacement and the structure index of the current text.
//! [`BufferEditor`] provides all of that over an in-memory string.

use crate::parser::{Position, StructureIndex, build_index};

pub trait Editor {
    /// Currently selected text.
    fn selection(&self) -> String;

    /// The "to" end of the selection.
    fn cursor(&self) -> Position;

    /// Replace `from..to` with `text`. `from == to` inserts.
    fn replace_range(&mut self, text: &str, from: Position, to: Position);

    fn replace_selection(&mut self, text: &str);

    /// Structure index of the current content.
    fn structure(&self) -> StructureIndex;
}

/// A plain text buffer with a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEditor {
    text: String,
    anchor: Position,
    head: Position,
}

impl BufferEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor: Position::default(),
            head: Position::default(),
        }
    }

    pub fn with_selection(mut self, from: Position, to: Position) -> Self {
        self.anchor = from;
        self.head = to;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Byte offset of a position, clamped to the line and the buffer.
    /// A column inside a multibyte character snaps back to its first byte.
    pub fn offset_of(&self, pos: Position) -> usize {
        let mut offset = 0;
        for (n, line) in self.text.split('\n').enumerate() {
            if n == pos.line {
                let line = line.strip_suffix('\r').unwrap_or(line);
                let mut ch = pos.ch.min(line.len());
                while !line.is_char_boundary(ch) {
                    ch -= 1;
                }
                return offset + ch;
            }
            offset += line.len() + 1;
        }
        self.text.len()
    }

    pub fn position_of(&self, offset: usize) -> Position {
        let before = &self.text[..offset.min(self.text.len())];
        let line = before.matches('\n').count();
        let ch = before.rfind('\n').map_or(before.len(), |i| before.len() - i - 1);
        Position::new(line, ch)
    }

    fn ordered_selection(&self) -> (Position, Position) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

impl Editor for BufferEditor {
    fn selection(&self) -> String {
        let (from, to) = self.ordered_selection();
        self.text[self.offset_of(from)..self.offset_of(to)].to_string()
    }

    fn cursor(&self) -> Position {
        self.head
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        let start = self.offset_of(from);
        let end = self.offset_of(to).max(start);
        let anchor = self.offset_of(self.anchor);
        let head = self.offset_of(self.head);

        self.text.replace_range(start..end, text);

        // Points after the edited range move with the text; points inside it
        // collapse to its start.
        let remap = |offset: usize| {
            if offset > end || (offset == end && end > start) {
                offset - (end - start) + text.len()
            } else if offset > start {
                start
            } else {
                offset
            }
        };
        self.anchor = self.position_of(remap(anchor));
        self.head = self.position_of(remap(head));
    }

    fn replace_selection(&mut self, text: &str) {
        let (from, to) = self.ordered_selection();
        let start = self.offset_of(from);
        self.replace_range(text, from, to);
        let caret = self.position_of(start + text.len());
        self.anchor = caret;
        self.head = caret;
    }

    fn structure(&self) -> StructureIndex {
        build_index(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_inside_multibyte_chars_snap_back() {
        let mut editor = BufferEditor::new("你好世界")
            .with_selection(Position::new(0, 1), Position::new(0, 3));
        assert_eq!(editor.selection(), "你");
        assert_eq!(editor.offset_of(Position::new(0, 5)), 3);

        editor.replace_selection("==你==");
        assert_eq!(editor.text(), "==你==好世界");

        editor.replace_range("!", Position::new(0, 8), Position::new(0, 10));
        assert_eq!(editor.text(), "==你==!世界");
    }

    #[test]
    fn test_selection_across_lines() {
        let editor = BufferEditor::new("first line\nsecond line")
            .with_selection(Position::new(0, 6), Position::new(1, 6));
        assert_eq!(editor.selection(), "line\nsecond");
        assert_eq!(editor.cursor(), Position::new(1, 6));
    }

    #[test]
    fn test_insert_after_selection_keeps_selection() {
        let mut editor =
            BufferEditor::new("Some text here").with_selection(Position::new(0, 5), Position::new(0, 9));
        editor.replace_range(" ^abc", Position::new(0, 14), Position::new(0, 14));
        assert_eq!(editor.text(), "Some text here ^abc");
        assert_eq!(editor.selection(), "text");
    }

    #[test]
    fn test_insert_before_selection_shifts_it() {
        let mut editor =
            BufferEditor::new("alpha\nbeta").with_selection(Position::new(1, 0), Position::new(1, 4));
        editor.replace_range("zero\n", Position::new(0, 0), Position::new(0, 0));
        assert_eq!(editor.selection(), "beta");
        assert_eq!(editor.cursor(), Position::new(2, 4));
    }

    #[test]
    fn test_replace_selection_moves_caret() {
        let mut editor =
            BufferEditor::new("read this now").with_selection(Position::new(0, 5), Position::new(0, 9));
        editor.replace_selection("==this==");
        assert_eq!(editor.text(), "read ==this== now");
        assert_eq!(editor.cursor(), Position::new(0, 13));
        assert_eq!(editor.selection(), "");
    }

    #[test]
    fn test_offsets_clamp() {
        let editor = BufferEditor::new("ab\ncd");
        assert_eq!(editor.offset_of(Position::new(0, 10)), 2);
        assert_eq!(editor.offset_of(Position::new(9, 0)), 5);
        assert_eq!(editor.position_of(4), Position::new(1, 1));
    }
}
