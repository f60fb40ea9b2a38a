//! Markdown structure extraction.
//!
//! shelfmark does not need a full markdown parser. It needs the block
//! structure of a document (to attach `^id` references) and a handful of
//! line-level patterns; both live here.

pub mod index;
pub mod links;
pub mod utils;

pub use index::{
    BlockKind, HeadingBlock, ListItem, Position, Section, Span, StructureIndex, build_index,
};
pub use links::extract_outlinks;
