//! Structure index: the sections, list items and headings of a document.
//!
//! This is the minimal block model the Block Locator needs: each block has a
//! line span and, if the author (or a previous highlight) gave it one, a
//! `^id`. Line numbers are 0-based and count from the top of the file,
//! front-matter included; columns are byte offsets within the line.

use super::utils::{
    code_fence, get_heading_level, heading_text, is_footnote_definition, is_list_item,
    is_thematic_break, standalone_block_id, trailing_block_id,
};
use crate::frontmatter;
use serde::Serialize;
use std::collections::HashSet;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    /// Byte column within the line.
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn contains_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    Blockquote,
    Code,
    Table,
    Comment,
    FootnoteDefinition,
    ThematicBreak,
}

impl BlockKind {
    /// Kinds whose block reference must sit on its own line after a blank line.
    pub fn needs_detached_id(self) -> bool {
        matches!(
            self,
            BlockKind::Blockquote
                | BlockKind::Code
                | BlockKind::Table
                | BlockKind::Comment
                | BlockKind::FootnoteDefinition
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: BlockKind,
    pub span: Span,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub span: Span,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingBlock {
    pub level: usize,
    pub text: String,
    pub span: Span,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureIndex {
    pub sections: Vec<Section>,
    pub list_items: Vec<ListItem>,
    pub headings: Vec<HeadingBlock>,
}

impl StructureIndex {
    pub fn section_at(&self, line: usize) -> Option<&Section> {
        self.sections.iter().find(|s| s.span.contains_line(line))
    }

    pub fn list_item_at(&self, line: usize) -> Option<&ListItem> {
        self.list_items.iter().find(|item| item.span.contains_line(line))
    }

    pub fn heading_starting_at(&self, line: usize) -> Option<&HeadingBlock> {
        self.headings.iter().find(|h| h.span.start.line == line)
    }

    /// Every block id already present in the document.
    pub fn ids(&self) -> HashSet<&str> {
        self.sections
            .iter()
            .filter_map(|s| s.id.as_deref())
            .chain(self.list_items.iter().filter_map(|i| i.id.as_deref()))
            .chain(self.headings.iter().filter_map(|h| h.id.as_deref()))
            .collect()
    }
}

/// Build the structure index of a whole document.
pub fn build_index(text: &str) -> StructureIndex {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let mut index = StructureIndex::default();

    let body_start = match frontmatter::split(text).yaml {
        Some(yaml) => yaml.lines().count() + 2,
        None => 0,
    };

    let span = |start: usize, end: usize| Span {
        start: Position::new(start, 0),
        end: Position::new(end, lines[end].len()),
    };

    let mut i = body_start;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        let (kind, end) = scan_block(&lines, i);

        // A lone `^id` paragraph right after a block names that block.
        if kind == BlockKind::Paragraph && end == i {
            if let Some(id) = standalone_block_id(line) {
                if let Some(prev) = index.sections.last_mut() {
                    if prev.id.is_none() && prev.span.end.line + 2 == i {
                        prev.id = Some(id.to_string());
                        i = end + 1;
                        continue;
                    }
                }
            }
        }

        let id = match kind {
            BlockKind::Paragraph | BlockKind::Heading => trailing_block_id(lines[end]).map(str::to_string),
            _ => None,
        };

        match kind {
            BlockKind::Heading => index.headings.push(HeadingBlock {
                level: get_heading_level(line).unwrap_or(1),
                text: heading_text(line),
                span: span(i, i),
                id: id.clone(),
            }),
            BlockKind::List => collect_list_items(&lines, i, end, &mut index.list_items, span),
            _ => {}
        }

        index.sections.push(Section {
            kind,
            span: span(i, end),
            id,
        });
        i = end + 1;
    }

    index
}

/// Classify the block starting at `start` and find its last line.
fn scan_block(lines: &[&str], start: usize) -> (BlockKind, usize) {
    let line = lines[start];
    let last = lines.len() - 1;
    let trimmed = line.trim_start();

    if let Some(fence) = code_fence(line) {
        let end = (start + 1..lines.len())
            .find(|&j| lines[j].trim_start().starts_with(fence))
            .unwrap_or(last);
        return (BlockKind::Code, end);
    }

    if trimmed.starts_with("%%") {
        if line.matches("%%").count() >= 2 {
            return (BlockKind::Comment, start);
        }
        let end = (start + 1..lines.len())
            .find(|&j| lines[j].contains("%%"))
            .unwrap_or(last);
        return (BlockKind::Comment, end);
    }

    if get_heading_level(line).is_some() && !line.starts_with("    ") {
        return (BlockKind::Heading, start);
    }

    if is_thematic_break(line) {
        return (BlockKind::ThematicBreak, start);
    }

    if is_footnote_definition(line) {
        return (BlockKind::FootnoteDefinition, run_until(lines, start, |l| l.trim().is_empty()));
    }

    if trimmed.starts_with('>') {
        return (
            BlockKind::Blockquote,
            run_until(lines, start, |l| !l.trim_start().starts_with('>')),
        );
    }

    if trimmed.starts_with('|') {
        return (
            BlockKind::Table,
            run_until(lines, start, |l| !l.trim_start().starts_with('|')),
        );
    }

    if is_list_item(line) {
        return (BlockKind::List, scan_list(lines, start));
    }

    (
        BlockKind::Paragraph,
        run_until(lines, start, |l| l.trim().is_empty() || interrupts_paragraph(l)),
    )
}

/// Last line before the first line (after `start`) matching `stop`.
fn run_until(lines: &[&str], start: usize, stop: impl Fn(&str) -> bool) -> usize {
    (start + 1..lines.len())
        .find(|&j| stop(lines[j]))
        .map_or(lines.len() - 1, |j| j - 1)
}

fn interrupts_paragraph(line: &str) -> bool {
    get_heading_level(line).is_some()
        || code_fence(line).is_some()
        || line.trim_start().starts_with('>')
        || is_thematic_break(line)
        || is_list_item(line)
}

/// A list runs through blank lines as long as the next content is another
/// item or indented continuation.
fn scan_list(lines: &[&str], start: usize) -> usize {
    let mut end = start;
    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j];
        if line.trim().is_empty() {
            let next = (j + 1..lines.len()).find(|&k| !lines[k].trim().is_empty());
            match next {
                Some(k) if is_list_item(lines[k]) || lines[k].starts_with([' ', '\t']) => {
                    j = k;
                    continue;
                }
                _ => break,
            }
        }
        let indented = line.starts_with([' ', '\t']);
        if !indented && !is_list_item(line) && interrupts_paragraph(line) {
            break;
        }
        end = j;
        j += 1;
    }
    end
}

fn collect_list_items(
    lines: &[&str],
    start: usize,
    end: usize,
    out: &mut Vec<ListItem>,
    span: impl Fn(usize, usize) -> Span,
) {
    let starts: Vec<usize> = (start..=end).filter(|&j| is_list_item(lines[j])).collect();
    for (n, &item_start) in starts.iter().enumerate() {
        let mut item_end = starts.get(n + 1).map_or(end, |&next| next - 1);
        while item_end > item_start && lines[item_end].trim().is_empty() {
            item_end -= 1;
        }
        out.push(ListItem {
            span: span(item_start, item_end),
            id: trailing_block_id(lines[item_end]).map(str::to_string),
        });
    }
}
