//! README index of available skills
//!
//! The generated list sits between two HTML comment markers so it can be
//! regenerated in place without touching the rest of the README.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SkillError};
use crate::registry::SkillsRegistry;
use crate::skill::Skill;

/// Marker opening the generated section
pub const INDEX_START: &str = "<!-- skills:start -->";
/// Marker closing the generated section
pub const INDEX_END: &str = "<!-- skills:end -->";

/// Characters escaped in a Markdown link target segment
const LINK_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'`');

/// One listed skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Skill name
    pub name: String,
    /// Skill description
    pub description: String,
    /// Path of the SKILL.md file, relative to the index root when possible
    pub path: PathBuf,
}

impl IndexEntry {
    /// Project a registered skill, relativizing its path against `root`
    ///
    /// The path may climb out of `root` with `..` components.
    pub fn from_skill(skill: &Skill, root: &Path) -> Self {
        Self {
            name: skill.name().to_string(),
            description: skill.description().to_string(),
            path: relative_to(&skill.file(), root),
        }
    }

    /// Markdown bullet for this entry
    /// Format: "- [`{name}`]({path}): {description}"
    pub fn to_markdown(&self) -> String {
        let description = self.description.split_whitespace().collect::<Vec<_>>().join(" ");
        format!(
            "- [`{}`]({}): {}",
            self.name,
            link_path(&self.path),
            description
        )
    }
}

/// Sorted list of skills, ready to render
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillIndex {
    entries: Vec<IndexEntry>,
}

impl SkillIndex {
    /// Build from arbitrary entries
    pub fn from_entries(mut entries: Vec<IndexEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    /// Build from every skill accepted by a registry
    pub fn from_registry(registry: &SkillsRegistry, root: &Path) -> Self {
        Self::from_entries(
            registry
                .skills()
                .into_iter()
                .map(|skill| IndexEntry::from_skill(skill, root))
                .collect(),
        )
    }

    /// Entries sorted by name
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Markdown list, one line per skill
    pub fn render_markdown(&self) -> String {
        if self.entries.is_empty() {
            return "_No skills available._\n".to_string();
        }

        let mut list = String::new();
        for entry in &self.entries {
            list.push_str(&entry.to_markdown());
            list.push('\n');
        }
        list
    }

    /// Replace the marked section of `readme` with the rendered index
    pub fn splice(&self, readme: &str) -> Result<String> {
        let missing = || SkillError::MissingIndexMarkers {
            start: INDEX_START,
            end: INDEX_END,
        };

        let start = readme.find(INDEX_START).ok_or_else(missing)? + INDEX_START.len();
        let end = readme[start..].find(INDEX_END).ok_or_else(missing)? + start;

        let mut out = String::with_capacity(readme.len());
        out.push_str(&readme[..start]);
        out.push('\n');
        out.push_str(&self.render_markdown());
        out.push_str(&readme[end..]);
        Ok(out)
    }

    /// Whether `readme` already carries this exact index
    pub fn is_current(&self, readme: &str) -> Result<bool> {
        Ok(self.splice(readme)? == readme)
    }
}

/// `file` as seen from `root`, compared on canonical paths when both exist
fn relative_to(file: &Path, root: &Path) -> PathBuf {
    let (from, base) = match (file.canonicalize(), root.canonicalize()) {
        (Ok(from), Ok(base)) => (from, base),
        _ => (file.to_path_buf(), root.to_path_buf()),
    };
    pathdiff::diff_paths(&from, &base).unwrap_or_else(|| file.to_path_buf())
}

fn link_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => {
                Some(utf8_percent_encode(&part.to_string_lossy(), LINK_SEGMENT).to_string())
            }
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn entry(name: &str, description: &str) -> IndexEntry {
        IndexEntry {
            name: name.to_string(),
            description: description.to_string(),
            path: PathBuf::from(name).join("SKILL.md"),
        }
    }

    fn index() -> SkillIndex {
        SkillIndex::from_entries(vec![
            entry("skill-authoring", "Guides writing skills.\nUse when authoring."),
            entry("react-useeffect", "Explains useEffect. Use when writing effects."),
        ])
    }

    #[test]
    fn test_render_sorted_single_line() {
        assert_eq!(
            index().render_markdown(),
            "- [`react-useeffect`](react-useeffect/SKILL.md): Explains useEffect. Use when writing effects.\n\
             - [`skill-authoring`](skill-authoring/SKILL.md): Guides writing skills. Use when authoring.\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(
            SkillIndex::default().render_markdown(),
            "_No skills available._\n"
        );
    }

    #[test]
    fn test_splice_replaces_only_marked_section() {
        let readme = format!("# Skills\n\n{INDEX_START}\nstale\n{INDEX_END}\n\nFooter\n");
        let updated = index().splice(&readme).unwrap();

        assert!(updated.starts_with("# Skills\n\n"));
        assert!(updated.ends_with(&format!("{INDEX_END}\n\nFooter\n")));
        assert!(!updated.contains("stale"));
        assert!(index().is_current(&updated).unwrap());
        assert!(!index().is_current(&readme).unwrap());
    }

    #[test]
    fn test_splice_requires_markers() {
        assert!(matches!(
            index().splice("# Skills\n"),
            Err(SkillError::MissingIndexMarkers { .. })
        ));
        assert!(index().splice(&format!("{INDEX_END}\n{INDEX_START}\n")).is_err());
    }

    #[test]
    fn test_link_path_uses_forward_slashes() {
        let path: PathBuf = ["docs", "pdf", "SKILL.md"].iter().collect();
        assert_eq!(link_path(&path), "docs/pdf/SKILL.md");
    }

    #[test]
    fn test_link_path_escapes_segments() {
        let path: PathBuf = ["..", "my skills (old)", "SKILL.md"].iter().collect();
        assert_eq!(link_path(&path), "../my%20skills%20%28old%29/SKILL.md");
    }

    #[test]
    fn test_relative_to_climbs_out_of_root() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("skills").join("pdf").join("SKILL.md");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "").unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();

        let path = relative_to(&file, &docs);
        assert_eq!(link_path(&path), "../skills/pdf/SKILL.md");
        assert_eq!(link_path(&relative_to(&file, tmp.path())), "skills/pdf/SKILL.md");
    }
}
