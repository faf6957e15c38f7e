//! Skill directory entries
//!
//! Each skill is a folder containing SKILL.md. Discovery keeps only the
//! front-matter; the body is read when the skill is loaded.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::document::{Document, FrontMatter, SKILL_FILE};
use crate::error::{Result, SkillError};
use crate::validator::{Report, Validator};

/// A discovered skill with metadata and (optionally) its body
#[derive(Debug, Clone)]
pub struct Skill {
    /// Front-matter metadata
    pub metadata: FrontMatter,
    /// Full path to skill directory
    pub path: PathBuf,
    /// Markdown body (loaded on demand)
    pub body: Option<String>,
    /// Warnings raised when the skill was discovered
    pub report: Report,
}

/// Outcome of inspecting one skill directory
#[derive(Debug, Clone)]
pub enum Discovered {
    /// SKILL.md passed validation
    Accepted(Skill),
    /// SKILL.md failed validation
    Rejected(Report),
}

impl Skill {
    /// Read and validate SKILL.md in `dir`, keeping only the metadata
    pub fn metadata_from_dir(dir: &Path, validator: &Validator) -> Result<Discovered> {
        let skill_file = dir.join(SKILL_FILE);
        let raw = fs::read_to_string(&skill_file).map_err(|e| SkillError::io(&skill_file, e))?;

        let report = validator.validate_at(&raw, &skill_file);
        if !report.passed() {
            return Ok(Discovered::Rejected(report));
        }

        let document = Document::parse(&raw)?;
        debug!(
            "Parsed {} ({} body lines)",
            document.name,
            document.body_lines()
        );

        Ok(Discovered::Accepted(Self {
            metadata: document.front_matter(),
            path: dir.to_path_buf(),
            body: None,
            report,
        }))
    }

    /// Load the body if not already loaded
    pub fn load_body(&mut self) -> Result<&str> {
        if self.body.is_none() {
            let document = Document::from_path(&self.file())?;
            self.body = Some(document.body);
        }
        Ok(self.body.as_deref().unwrap_or_default())
    }

    /// Path of the SKILL.md file
    pub fn file(&self) -> PathBuf {
        self.path.join(SKILL_FILE)
    }

    /// Skill name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Skill description
    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// Full document, if the body has been loaded
    pub fn document(&self) -> Option<Document> {
        self.body.as_ref().map(|body| Document {
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            body: body.clone(),
        })
    }
}
