//! Skill document model
//!
//! A [`Document`] is the `(name, description, body)` triple stored in a
//! skill file. Parsing here is structural only; rule checks live in
//! [`crate::validator`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SkillError};
use crate::frontmatter::{self, DELIMITER};

/// File name a skill directory must contain
pub const SKILL_FILE: &str = "SKILL.md";

/// Metadata carried in the front-matter block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrontMatter {
    /// Short identifier (lowercase letters, digits, hyphens)
    pub name: String,
    /// What the skill does and when to use it
    pub description: String,
}

/// A skill document: front-matter plus Markdown body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Skill name
    pub name: String,
    /// Skill description
    pub description: String,
    /// Markdown body, verbatim
    pub body: String,
}

impl Document {
    /// Build a document from its parts
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            body: body.into(),
        }
    }

    /// Parse raw text into a document
    ///
    /// The metadata block must hold exactly `name` and `description`.
    /// Field contents are not checked against the naming or length rules.
    pub fn parse(raw: &str) -> Result<Self> {
        let sections = frontmatter::split(raw)?;
        let front_matter = parse_front_matter(sections.metadata)?;

        Ok(Self {
            name: front_matter.name,
            description: front_matter.description,
            body: sections.body.to_string(),
        })
    }

    /// Read and parse a document from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| SkillError::io(path, e))?;
        Self::parse(&raw)
    }

    /// Serialize into the on-disk format
    pub fn render(&self) -> Result<String> {
        let metadata = serde_yaml::to_string(&self.front_matter())?;

        let mut out = String::with_capacity(metadata.len() + self.body.len() + 8);
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&metadata);
        if !metadata.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&self.body);
        Ok(out)
    }

    /// Front-matter view of this document
    pub fn front_matter(&self) -> FrontMatter {
        FrontMatter {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Number of lines in the body
    pub fn body_lines(&self) -> usize {
        self.body.lines().count()
    }
}

/// Deserialize a metadata block into [`FrontMatter`]
pub(crate) fn parse_front_matter(metadata: &str) -> Result<FrontMatter> {
    let value: serde_yaml::Value = serde_yaml::from_str(metadata)?;
    if !value.is_mapping() {
        return Err(SkillError::NotAMapping);
    }
    Ok(serde_yaml::from_value(value)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let content = r#"---
name: code-reviewer
description: Reviews code for best practices and security. Use when reviewing or analyzing code.
---

# Code Reviewer

This skill helps review code.
"#;

        let doc = Document::parse(content).unwrap();
        assert_eq!(doc.name, "code-reviewer");
        assert_eq!(
            doc.description,
            "Reviews code for best practices and security. Use when reviewing or analyzing code."
        );
        assert_eq!(doc.body, "\n# Code Reviewer\n\nThis skill helps review code.\n");
        // the leading blank line counts
        assert_eq!(doc.body_lines(), 4);
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        let content = "---\nname: a\ndescription: b\nversion: 2\n---\n";
        assert!(matches!(Document::parse(content), Err(SkillError::Yaml(_))));
    }

    #[test]
    fn test_parse_rejects_missing_key() {
        let content = "---\nname: a\n---\n";
        assert!(matches!(Document::parse(content), Err(SkillError::Yaml(_))));
    }

    #[test]
    fn test_parse_rejects_scalar_metadata() {
        let content = "---\njust text\n---\n";
        assert!(matches!(
            Document::parse(content),
            Err(SkillError::NotAMapping)
        ));
    }

    #[test]
    fn test_render_layout() {
        let doc = Document::new("pdf-tools", "Extracts text from PDF files.", "# PDF\n");
        assert_eq!(
            doc.render().unwrap(),
            "---\nname: pdf-tools\ndescription: Extracts text from PDF files.\n---\n# PDF\n"
        );
    }

    #[test]
    fn test_round_trip_quoted_values() {
        let doc = Document::new(
            "123",
            "key: value # not a comment, 'quoted' \"twice\"",
            "---\nbody that looks like front-matter\n",
        );
        let parsed = Document::parse(&doc.render().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_round_trip_multiline_description() {
        let doc = Document::new("notes", "Line one.\nLine two.", "");
        let parsed = Document::parse(&doc.render().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_from_path_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join(SKILL_FILE);
        let err = Document::from_path(&missing).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
