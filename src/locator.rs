//! Block Locator: find the block under the cursor and make sure it has an id.

use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::parser::{BlockKind, Position};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 6;

/// Draw a 6-character base-36 block id that is not in `taken`.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R, taken: &HashSet<&str>) -> String {
    loop {
        let id: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}

/// The block the cursor resolved to.
struct Target {
    kind: Option<BlockKind>,
    end: Position,
    id: Option<String>,
}

/// Return the id of the block containing the cursor, inserting one if needed.
///
/// Lists resolve to the list item under the cursor and headings to the heading
/// entry on the same line, since those carry their own ids. Calling this twice
/// at the same place returns the same id and only edits the document once.
///
/// # Errors
///
/// [`Error::NoBlockAt`] when the cursor is not inside any block; the document
/// is left untouched.
pub fn locate<R: Rng + ?Sized>(editor: &mut dyn Editor, rng: &mut R) -> Result<String> {
    let cursor = editor.cursor();
    let index = editor.structure();
    let not_found = || Error::NoBlockAt { line: cursor.line };

    let section = index.section_at(cursor.line).ok_or_else(not_found)?;
    let target = match section.kind {
        BlockKind::List => {
            let item = index.list_item_at(cursor.line).ok_or_else(not_found)?;
            Target {
                kind: None,
                end: item.span.end,
                id: item.id.clone(),
            }
        }
        BlockKind::Heading => {
            let heading = index
                .heading_starting_at(section.span.start.line)
                .ok_or_else(not_found)?;
            Target {
                kind: Some(BlockKind::Heading),
                end: heading.span.end,
                id: heading.id.clone(),
            }
        }
        kind => Target {
            kind: Some(kind),
            end: section.span.end,
            id: section.id.clone(),
        },
    };

    if let Some(id) = target.id {
        return Ok(id);
    }

    let id = generate_id(rng, &index.ids());
    let spacer = if target.kind.is_some_and(BlockKind::needs_detached_id) {
        "\n\n"
    } else {
        " "
    };
    editor.replace_range(&format!("{spacer}^{id}"), target.end, target.end);
    let kind = target.kind.map_or_else(|| "listItem".to_string(), |k| k.to_string());
    debug!(%id, %kind, line = target.end.line, "inserted block id");

    Ok(id)
}
