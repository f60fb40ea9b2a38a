//! YAML front-matter handling.
//!
//! A document is split into its front-matter block (`---\n...\n---`) and its
//! body. The front-matter is exposed as a typed [`FrontMatter`] record; keys
//! shelfmark does not know about are kept in [`FrontMatter::extra`] in their
//! original order so rewriting a document never drops user metadata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `tags` may be written either as a single scalar or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    One(String),
    Many(Vec<String>),
}

impl Tags {
    /// Check for a tag, ignoring a leading `#` on either side.
    pub fn contains(&self, tag: &str) -> bool {
        let wanted = tag.trim_start_matches('#');
        match self {
            Tags::One(t) => t.trim_start_matches('#') == wanted,
            Tags::Many(ts) => ts.iter().any(|t| t.trim_start_matches('#') == wanted),
        }
    }
}

/// Typed view over a document's front-matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,

    /// Date the reader marked the book as started (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_date: Option<String>,

    /// Date the reader marked the book as finished (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,

    /// Accumulated reading time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u64>,

    /// `reading_time` rendered as `XhYmZs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time_format: Option<String>,

    /// Scroll progress in percent, two decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_progress: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlinks: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinks: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_review: Option<String>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse the YAML between the front-matter fences.
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.as_ref().is_some_and(|t| t.contains(tag))
    }

    pub fn reading_time(&self) -> u64 {
        self.reading_time.unwrap_or(0)
    }

    pub fn reading_progress(&self) -> f64 {
        self.reading_progress.unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        if self.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(self)
    }
}

/// A document split at its front-matter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Raw YAML between the fences, `None` when the document has no front-matter.
    pub yaml: Option<&'a str>,
    /// Everything after the closing fence line.
    pub body: &'a str,
}

/// Split a document into front-matter and body.
///
/// The first line must be exactly `---` (an optional BOM is tolerated); the
/// block ends at the next line that is `---` or `...`. An unterminated block is
/// treated as plain body text.
pub fn split(text: &str) -> Split<'_> {
    let content = text.trim_start_matches('\u{feff}');
    let no_frontmatter = Split {
        yaml: None,
        body: text,
    };

    let Some(first_end) = content.find('\n') else {
        return no_frontmatter;
    };
    if content[..first_end].trim_end() != "---" {
        return no_frontmatter;
    }

    let yaml_start = first_end + 1;
    let mut offset = yaml_start;
    while offset < content.len() {
        let line_end = content[offset..]
            .find('\n')
            .map_or(content.len(), |i| offset + i);
        let line = content[offset..line_end].trim_end();
        if line == "---" || line == "..." {
            let body_start = (line_end + 1).min(content.len());
            return Split {
                yaml: Some(&content[yaml_start..offset]),
                body: &content[body_start..],
            };
        }
        offset = line_end + 1;
    }

    no_frontmatter
}

/// Join front-matter and body back into a full document.
pub fn render(frontmatter: &FrontMatter, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = frontmatter.to_yaml()?;
    Ok(format!("---\n{yaml}---\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let doc = "---\ntags: book\n---\n# Title\nBody";
        let split = split(doc);
        assert_eq!(split.yaml, Some("tags: book\n"));
        assert_eq!(split.body, "# Title\nBody");
    }

    #[test]
    fn test_split_without_frontmatter() {
        let doc = "# Title\n---\nBody";
        let split = split(doc);
        assert_eq!(split.yaml, None);
        assert_eq!(split.body, doc);
    }

    #[test]
    fn test_split_unterminated_is_body() {
        let doc = "---\ntags: book\n# Title";
        assert_eq!(split(doc).yaml, None);
    }

    #[test]
    fn test_split_closing_fence_at_eof() {
        let split = split("---\nreadingTime: 5\n---");
        assert_eq!(split.yaml, Some("readingTime: 5\n"));
        assert_eq!(split.body, "");
    }

    #[test]
    fn test_parse_typed_fields() {
        let fm = FrontMatter::parse(
            "tags:\n  - book\n  - '#novel'\nreadingTime: 120000\nreadingProgress: 42.5\nbookReview: Great",
        )
        .unwrap();
        assert!(fm.has_tag("book"));
        assert!(fm.has_tag("novel"));
        assert!(!fm.has_tag("poem"));
        assert_eq!(fm.reading_time(), 120000);
        assert_eq!(fm.reading_progress(), 42.5);
        assert_eq!(fm.book_review.as_deref(), Some("Great"));
    }

    #[test]
    fn test_parse_scalar_tag_and_integer_progress() {
        let fm = FrontMatter::parse("tags: book\nreadingProgress: 100").unwrap();
        assert!(fm.has_tag("book"));
        assert_eq!(fm.reading_progress(), 100.0);
    }

    #[test]
    fn test_defaults_when_missing() {
        let fm = FrontMatter::parse("").unwrap();
        assert_eq!(fm.reading_time(), 0);
        assert_eq!(fm.reading_progress(), 0.0);
        assert!(fm.is_empty());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let fm = FrontMatter::parse("author: Someone\nto: '[[Other]]'\nreadingTime: 10").unwrap();
        let rendered = render(&fm, "body").unwrap();
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.contains("author: Someone"));
        assert!(rendered.contains("readingTime: 10"));
        assert!(rendered.ends_with("---\nbody"));

        let again = FrontMatter::parse(split(&rendered).yaml.unwrap()).unwrap();
        assert_eq!(again, fm);
    }

    #[test]
    fn test_render_empty_frontmatter() {
        let rendered = render(&FrontMatter::default(), "text").unwrap();
        assert_eq!(rendered, "---\n---\ntext");
    }
}
