//! Skills registry for managing multiple skills
//!
//! Mirrors how an agent consumes a skills directory:
//! - Discovery: scan directories and keep metadata only
//! - Loading: read a skill's body on demand

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::document::SKILL_FILE;
use crate::error::{Result, SkillError};
use crate::skill::{Discovered, Skill};
use crate::validator::{Report, Rule, Validator};

/// Registry of every valid skill found under the configured directories
pub struct SkillsRegistry {
    /// All accepted skills (metadata only until loaded)
    skills: HashMap<String, Skill>,
    /// Reports for skills that failed validation
    rejected: Vec<Report>,
    /// Skills directories to scan
    directories: Vec<PathBuf>,
    validator: Validator,
}

impl SkillsRegistry {
    /// Create a new empty registry
    pub fn new(validator: Validator) -> Self {
        Self {
            skills: HashMap::new(),
            rejected: Vec::new(),
            directories: Vec::new(),
            validator,
        }
    }

    /// Add a skills directory to scan
    pub fn add_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Directories this registry scans, in priority order
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Scan all configured directories and register valid skills
    ///
    /// Rescanning replaces the results of any earlier discovery.
    pub fn discover(&mut self) -> Result<()> {
        self.skills.clear();
        self.rejected.clear();

        info!(
            "Starting skills discovery in {} directories",
            self.directories.len()
        );

        let directories = self.directories.clone();

        for dir in &directories {
            if !dir.exists() {
                debug!("Skills directory does not exist: {:?}", dir);
                continue;
            }

            if !dir.is_dir() {
                warn!("Skills path is not a directory: {:?}", dir);
                continue;
            }

            self.scan_directory(dir)?;
        }

        info!(
            "Discovered {} skills ({} rejected)",
            self.skills.len(),
            self.rejected.len()
        );
        Ok(())
    }

    /// Scan a single directory for skills
    fn scan_directory(&mut self, dir: &Path) -> Result<()> {
        for file in skill_files(dir)? {
            let Some(skill_dir) = file.parent() else {
                continue;
            };

            match Skill::metadata_from_dir(skill_dir, &self.validator) {
                Ok(Discovered::Accepted(skill)) => self.register(skill),
                Ok(Discovered::Rejected(report)) => {
                    warn!(
                        "Rejected {:?}: {} error(s)",
                        file,
                        report.errors().count()
                    );
                    self.rejected.push(report);
                }
                Err(e) => {
                    warn!("Failed to load skill from {:?}: {}", skill_dir, e);
                    let mut report = Report::new(Some(&file));
                    report.push(Rule::Unreadable, e.to_string());
                    self.rejected.push(report);
                }
            }
        }

        Ok(())
    }

    fn register(&mut self, skill: Skill) {
        if let Some(existing) = self.skills.get(skill.name()) {
            warn!(
                "Duplicate skill '{}' at {:?}; keeping {:?}",
                skill.name(),
                skill.path,
                existing.path
            );
            let mut report = skill.report;
            report.push(
                Rule::DuplicateName,
                format!(
                    "skill `{}` is already defined at {}",
                    skill.metadata.name,
                    existing.file().display()
                ),
            );
            self.rejected.push(report);
            return;
        }

        debug!("Discovered skill: {} at {:?}", skill.name(), skill.path);
        self.skills.insert(skill.metadata.name.clone(), skill);
    }

    /// Get a skill by name (body may not be loaded)
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    /// Load the body of a specific skill
    pub fn load(&mut self, name: &str) -> Result<&Skill> {
        let skill = self
            .skills
            .get_mut(name)
            .ok_or_else(|| SkillError::NotFound(name.to_string()))?;

        skill.load_body()?;
        Ok(skill)
    }

    /// All skills sorted by name
    pub fn skills(&self) -> Vec<&Skill> {
        let mut sorted: Vec<_> = self.skills.values().collect();
        sorted.sort_by_key(|s| s.name());
        sorted
    }

    /// Reports for every skill that was not registered
    pub fn rejected(&self) -> &[Report] {
        &self.rejected
    }

    /// Get number of skills
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// SKILL.md files in the immediate subdirectories of `dir`, sorted by path
pub fn skill_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| SkillError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SkillError::io(dir, e))?.path();

        if !path.is_dir() {
            continue;
        }

        let skill_file = path.join(SKILL_FILE);
        if skill_file.is_file() {
            files.push(skill_file);
        } else {
            debug!("Skipping {:?}: no {}", path, SKILL_FILE);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn registry() -> SkillsRegistry {
        SkillsRegistry::new(Validator::with_defaults().unwrap())
    }

    #[test]
    fn test_registry_new() {
        let registry = registry();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.rejected().is_empty());
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let mut registry = registry().add_directory("/definitely/not/here");
        registry.discover().unwrap();
        assert!(registry.is_empty());
    }

    fn write_skill(root: &Path, dir: &str, content: &[u8]) {
        fs::create_dir_all(root.join(dir)).unwrap();
        fs::write(root.join(dir).join(SKILL_FILE), content).unwrap();
    }

    #[test]
    fn test_discover_twice_keeps_skills() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(
            tmp.path(),
            "pdf",
            b"---\nname: pdf\ndescription: Extracts text from PDFs. Use when reading PDFs.\n---\n",
        );
        let mut registry = registry().add_directory(tmp.path());

        registry.discover().unwrap();
        registry.discover().unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.rejected().is_empty());
    }

    #[test]
    fn test_unreadable_skill_does_not_stop_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(
            tmp.path(),
            "a-good",
            b"---\nname: a-good\ndescription: Formats code. Use when formatting.\n---\n",
        );
        write_skill(tmp.path(), "b-bad", b"\xff");
        let mut registry = registry().add_directory(tmp.path());

        registry.discover().unwrap();

        assert!(registry.get("a-good").is_some());
        assert_eq!(registry.rejected().len(), 1);
        let report = &registry.rejected()[0];
        assert!(report.has(Rule::Unreadable));
        assert!(!report.passed());
        assert_eq!(
            report.path.as_deref(),
            Some(tmp.path().join("b-bad").join(SKILL_FILE).as_path())
        );
    }

    #[test]
    fn test_load_unknown_skill() {
        let mut registry = registry();
        assert!(matches!(
            registry.load("ghost"),
            Err(SkillError::NotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_skill_files_skips_plain_dirs_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("b-skill")).unwrap();
        fs::write(tmp.path().join("b-skill").join(SKILL_FILE), "").unwrap();
        fs::create_dir_all(tmp.path().join("a-skill")).unwrap();
        fs::write(tmp.path().join("a-skill").join(SKILL_FILE), "").unwrap();
        fs::create_dir_all(tmp.path().join("assets")).unwrap();
        fs::write(tmp.path().join("README.md"), "").unwrap();

        let files = skill_files(tmp.path()).unwrap();
        assert_eq!(
            files,
            vec![
                tmp.path().join("a-skill").join(SKILL_FILE),
                tmp.path().join("b-skill").join(SKILL_FILE),
            ]
        );
    }
}
