use crate::config::Config;
use anyhow::{bail, Context, Result};
use skillcheck_skills::registry::skill_files;
use skillcheck_skills::{Document, Report, SkillIndex, SkillsRegistry, Validator, SKILL_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do with the README after building the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadmeMode {
    /// Rewrite the marked section
    Write,
    /// Only report whether the marked section is up to date
    Check,
}

/// Result of validating a set of documents
#[derive(Debug)]
pub struct ValidationRun {
    pub reports: Vec<Report>,
    pub strict: bool,
}

impl ValidationRun {
    /// Whether a single report counts as a failure for this run
    pub fn is_failure(&self, report: &Report) -> bool {
        !report.passed() || (self.strict && report.warnings().next().is_some())
    }

    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| self.is_failure(r)).count()
    }

    pub fn succeeded(&self) -> bool {
        self.failures() == 0
    }
}

/// Command service - runs checks against the configured skills
pub struct CheckService {
    config: Config,
    validator: Validator,
}

impl CheckService {
    /// Create a new check service
    pub fn new(config: Config) -> Result<Self> {
        let validator =
            Validator::new(config.rules.clone()).context("Failed to build validator")?;
        Ok(Self { config, validator })
    }

    /// Validate files, or the SKILL.md files inside directories
    ///
    /// With no paths, the configured skill directories are used.
    pub fn validate(&self, paths: &[PathBuf], strict: bool) -> Result<ValidationRun> {
        let targets = if paths.is_empty() {
            self.config.skills.directories.clone()
        } else {
            paths.to_vec()
        };

        let mut files = Vec::new();
        for target in &targets {
            if target.is_dir() {
                let found = skill_files(target)?;
                if found.is_empty() {
                    warn!("No {} files under {:?}", SKILL_FILE, target);
                }
                files.extend(found);
            } else if target.is_file() {
                files.push(target.clone());
            } else if paths.is_empty() {
                debug!("Skills directory does not exist: {:?}", target);
            } else {
                bail!("No such file or directory: {}", target.display());
            }
        }

        info!("Validating {} documents", files.len());

        let reports = files
            .iter()
            .map(|file| self.validator.validate_file(file))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidationRun { reports, strict })
    }

    /// Build the index for `dir`, or for every configured directory
    ///
    /// Links are relative to the directory of `readme`, or of the
    /// configured README when none is given.
    pub fn index(&self, dir: Option<&Path>, readme: Option<&Path>) -> Result<SkillIndex> {
        let directories = match dir {
            Some(dir) => vec![dir.to_path_buf()],
            None => self.config.skills.directories.clone(),
        };

        let mut registry = directories
            .into_iter()
            .fold(SkillsRegistry::new(self.validator.clone()), |registry, dir| {
                registry.add_directory(dir)
            });
        registry.discover()?;

        for report in registry.rejected() {
            warn!(
                "Not indexed: {}",
                report
                    .path
                    .as_deref()
                    .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string())
            );
        }

        Ok(SkillIndex::from_registry(
            &registry,
            &readme_root(self.readme_path(readme)),
        ))
    }

    /// Splice `index` into the README, or check that it is current
    ///
    /// Returns whether the README was already up to date.
    pub fn sync_readme(
        &self,
        index: &SkillIndex,
        readme: Option<&Path>,
        mode: ReadmeMode,
    ) -> Result<bool> {
        let readme = self.readme_path(readme);
        let current = fs::read_to_string(readme)
            .with_context(|| format!("Failed to read {}", readme.display()))?;

        let updated = index
            .splice(&current)
            .with_context(|| format!("Failed to update {}", readme.display()))?;
        let up_to_date = updated == current;

        if mode == ReadmeMode::Write && !up_to_date {
            fs::write(readme, updated)
                .with_context(|| format!("Failed to write {}", readme.display()))?;
            info!("Updated skills index in {:?}", readme);
        }

        Ok(up_to_date)
    }

    /// Create `<dir>/<name>/SKILL.md` from a starter template
    pub fn scaffold(&self, name: &str, description: &str, dir: Option<&Path>) -> Result<PathBuf> {
        let root = match dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .config
                .skills
                .directories
                .first()
                .cloned()
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        let skill_dir = root.join(name);
        let skill_file = skill_dir.join(SKILL_FILE);

        let document = Document::new(name, description, starter_body(name));
        let rendered = document.render()?;

        let report = self.validator.validate_at(&rendered, &skill_file);
        if !report.passed() {
            let problems: Vec<String> = report.errors().map(ToString::to_string).collect();
            bail!("Refusing to create {}:\n  {}", skill_file.display(), problems.join("\n  "));
        }
        for warning in report.warnings() {
            warn!("{}", warning);
        }

        if skill_file.exists() {
            bail!("{} already exists", skill_file.display());
        }

        fs::create_dir_all(&skill_dir)
            .with_context(|| format!("Failed to create {}", skill_dir.display()))?;
        fs::write(&skill_file, rendered)
            .with_context(|| format!("Failed to write {}", skill_file.display()))?;

        info!("Created {:?}", skill_file);
        Ok(skill_file)
    }

    fn readme_path<'a>(&'a self, readme: Option<&'a Path>) -> &'a Path {
        readme.unwrap_or(self.config.skills.readme.as_path())
    }
}

/// Directory index links are made relative to
fn readme_root(readme: &Path) -> PathBuf {
    match readme.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn starter_body(name: &str) -> String {
    let title = name
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!("\n# {title}\n\n## Instructions\n\n## Examples\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use skillcheck_skills::index::{INDEX_END, INDEX_START};
    use skillcheck_skills::Rule;

    const DESCRIPTION: &str = "Explains when effects are needed. Use when writing React components.";

    fn service_for(root: &Path) -> CheckService {
        let mut config = Config::default();
        config.skills.directories = vec![root.join("skills")];
        config.skills.readme = root.join("README.md");
        CheckService::new(config).unwrap()
    }

    #[test]
    fn test_scaffold_then_validate() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_for(tmp.path());

        let file = service.scaffold("react-useeffect", DESCRIPTION, None).unwrap();
        assert_eq!(file, tmp.path().join("skills/react-useeffect/SKILL.md"));

        let doc = Document::from_path(&file).unwrap();
        assert!(doc.body.contains("# React Useeffect"));

        let run = service.validate(&[], false).unwrap();
        assert_eq!(run.reports.len(), 1);
        assert!(run.succeeded());
    }

    #[test]
    fn test_scaffold_refuses_overwrite_and_bad_names() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_for(tmp.path());

        service.scaffold("pdf", DESCRIPTION, None).unwrap();
        let err = service.scaffold("pdf", DESCRIPTION, None).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let err = service.scaffold("Claude-Helper", DESCRIPTION, None).unwrap_err();
        assert!(err.to_string().contains("name-pattern"));
        assert!(!tmp.path().join("skills/Claude-Helper").exists());
    }

    #[test]
    fn test_validate_strict_fails_on_warnings() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_for(tmp.path());
        let file = tmp.path().join("notes.md");
        fs::write(&file, "---\nname: notes\ndescription: I keep your notes.\n---\n").unwrap();

        let run = service.validate(std::slice::from_ref(&file), false).unwrap();
        assert!(run.succeeded());
        assert!(run.reports[0].has(Rule::PointOfView));

        let run = service.validate(&[file], true).unwrap();
        assert!(!run.succeeded());
        assert_eq!(run.failures(), 1);
    }

    #[test]
    fn test_validate_missing_path_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_for(tmp.path());
        assert!(service.validate(&[tmp.path().join("absent.md")], false).is_err());
        // configured directories that don't exist are skipped
        assert!(service.validate(&[], false).unwrap().reports.is_empty());
    }

    #[test]
    fn test_index_write_and_check() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_for(tmp.path());
        service.scaffold("react-useeffect", DESCRIPTION, None).unwrap();
        let readme = tmp.path().join("README.md");
        fs::write(&readme, format!("# Skills\n\n{INDEX_START}\n{INDEX_END}\n")).unwrap();

        let index = service.index(None, None).unwrap();
        assert_eq!(index.len(), 1);

        assert!(!service.sync_readme(&index, None, ReadmeMode::Check).unwrap());
        assert!(!service.sync_readme(&index, None, ReadmeMode::Write).unwrap());
        assert!(service.sync_readme(&index, None, ReadmeMode::Check).unwrap());

        let content = fs::read_to_string(&readme).unwrap();
        assert!(content.contains("- [`react-useeffect`](skills/react-useeffect/SKILL.md)"));
    }

    #[test]
    fn test_index_links_follow_readme_override() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_for(tmp.path());
        service.scaffold("pdf", DESCRIPTION, None).unwrap();
        let docs = tmp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        let readme = docs.join("README.md");
        fs::write(&readme, format!("{INDEX_START}\n{INDEX_END}\n")).unwrap();

        let index = service.index(None, Some(&readme)).unwrap();
        service
            .sync_readme(&index, Some(&readme), ReadmeMode::Write)
            .unwrap();

        let content = fs::read_to_string(&readme).unwrap();
        assert!(content.contains("- [`pdf`](../skills/pdf/SKILL.md)"), "{content}");
        assert!(!tmp.path().join("README.md").exists());
    }

    #[test]
    fn test_starter_body_title() {
        assert_eq!(
            starter_body("skill-authoring"),
            "\n# Skill Authoring\n\n## Instructions\n\n## Examples\n"
        );
    }
}
