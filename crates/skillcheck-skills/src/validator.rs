//! Front-matter and body validation
//!
//! The validator never fails on malformed input: every problem becomes a
//! [`Violation`] in the returned [`Report`]. A report passes when it has no
//! error-severity violations.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{Document, SKILL_FILE};
use crate::error::{Result, SkillError};
use crate::frontmatter;
use crate::heuristics;

/// Maximum allowed name length
pub const MAX_NAME_LENGTH: usize = 64;
/// Maximum allowed description length, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 1024;
/// Soft cap on body length, in lines
pub const MAX_BODY_LINES: usize = 500;

const NAME_PATTERN: &str = r"^[a-z0-9-]+$";
const XML_TAG_PATTERN: &str = r"</?[A-Za-z][A-Za-z0-9_.:-]*(\s[^<>]*)?/?>";

/// How serious a violation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; does not fail the report
    Warning,
    /// Fails the report
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The rule a violation was raised by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// Document does not open with `---`
    MissingFrontMatter,
    /// Opening `---` is never closed
    UnterminatedFrontMatter,
    /// Metadata is not a YAML mapping
    MalformedFrontMatter,
    /// Required key absent
    MissingField,
    /// Required key present but blank
    EmptyField,
    /// Key present with a non-string value
    InvalidField,
    /// Key other than `name` / `description`
    UnexpectedField,
    /// Name uses characters outside `[a-z0-9-]`
    NamePattern,
    /// Name longer than the limit
    NameTooLong,
    /// Name contains a reserved word
    NameReservedWord,
    /// Name differs from the skill directory name
    NameMismatch,
    /// Another skill already uses this name
    DuplicateName,
    /// Description longer than the limit
    DescriptionTooLong,
    /// Description contains XML tags
    XmlTag,
    /// Body longer than the line cap
    BodyTooLong,
    /// File could not be read as UTF-8 text
    Unreadable,
    /// Description is not written in third person
    PointOfView,
    /// Description never says when to use the skill
    MissingTrigger,
    /// Description never says what the skill does
    MissingCapability,
}

impl Rule {
    /// Stable kebab-case identifier
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingFrontMatter => "missing-front-matter",
            Self::UnterminatedFrontMatter => "unterminated-front-matter",
            Self::MalformedFrontMatter => "malformed-front-matter",
            Self::MissingField => "missing-field",
            Self::EmptyField => "empty-field",
            Self::InvalidField => "invalid-field",
            Self::UnexpectedField => "unexpected-field",
            Self::NamePattern => "name-pattern",
            Self::NameTooLong => "name-too-long",
            Self::NameReservedWord => "name-reserved-word",
            Self::NameMismatch => "name-mismatch",
            Self::DuplicateName => "duplicate-name",
            Self::DescriptionTooLong => "description-too-long",
            Self::XmlTag => "xml-tag",
            Self::BodyTooLong => "body-too-long",
            Self::Unreadable => "unreadable",
            Self::PointOfView => "point-of-view",
            Self::MissingTrigger => "missing-trigger",
            Self::MissingCapability => "missing-capability",
        }
    }

    /// Severity this rule reports at
    pub fn severity(self) -> Severity {
        match self {
            Self::NameMismatch
            | Self::PointOfView
            | Self::MissingTrigger
            | Self::MissingCapability => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Rule that was broken
    pub rule: Rule,
    /// Severity of the rule
    pub severity: Severity,
    /// Human-readable explanation
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.rule, self.message)
    }
}

/// Outcome of validating one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Document path, when validated from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Everything that failed, in check order
    pub violations: Vec<Violation>,
}

impl Report {
    /// Empty report for an optional path
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            violations: Vec::new(),
        }
    }

    /// Record a violation of `rule`
    pub fn push(&mut self, rule: Rule, message: impl Into<String>) {
        self.violations.push(Violation {
            rule,
            severity: rule.severity(),
            message: message.into(),
        });
    }

    /// True when no error-severity violation was found
    pub fn passed(&self) -> bool {
        self.errors().next().is_none()
    }

    /// True when there are no violations at all
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Error-severity violations
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    /// Warning-severity violations
    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }

    /// Whether `rule` was violated
    pub fn has(&self, rule: Rule) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}

/// Tunable limits for the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Maximum name length
    pub max_name_length: usize,
    /// Maximum description length, in characters
    pub max_description_length: usize,
    /// Maximum body length, in lines
    pub max_body_lines: usize,
    /// Words a name may not contain
    pub reserved_words: Vec<String>,
    /// Run the wording heuristics on descriptions
    pub advisory: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_name_length: MAX_NAME_LENGTH,
            max_description_length: MAX_DESCRIPTION_LENGTH,
            max_body_lines: MAX_BODY_LINES,
            reserved_words: vec!["anthropic".to_string(), "claude".to_string()],
            advisory: true,
        }
    }
}

#[derive(Default)]
struct Fields {
    name: Option<String>,
    description: Option<String>,
}

/// Checks documents against [`ValidationRules`]
#[derive(Debug, Clone)]
pub struct Validator {
    rules: ValidationRules,
    name_re: Regex,
    xml_re: Regex,
}

impl Validator {
    /// Create a validator for the given rules
    pub fn new(rules: ValidationRules) -> Result<Self> {
        Ok(Self {
            rules,
            name_re: Regex::new(NAME_PATTERN)?,
            xml_re: Regex::new(XML_TAG_PATTERN)?,
        })
    }

    /// Validator with the default limits
    pub fn with_defaults() -> Result<Self> {
        Self::new(ValidationRules::default())
    }

    /// Rules in effect
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate raw document text
    pub fn validate(&self, raw: &str) -> Report {
        self.check(raw, None)
    }

    /// Validate raw text that lives at `path`
    ///
    /// For `SKILL.md` files this also compares the name with the parent
    /// directory name.
    pub fn validate_at(&self, raw: &str, path: &Path) -> Report {
        self.check(raw, Some(path))
    }

    /// Read and validate a file
    pub fn validate_file(&self, path: &Path) -> Result<Report> {
        let raw = fs::read_to_string(path).map_err(|e| SkillError::io(path, e))?;
        Ok(self.validate_at(&raw, path))
    }

    /// Validate an already-parsed document
    pub fn validate_document(&self, doc: &Document) -> Report {
        let mut report = Report::new(None);
        if doc.name.trim().is_empty() {
            report.push(Rule::EmptyField, "`name` must not be empty");
        } else {
            self.check_name(&doc.name, None, &mut report);
        }
        if doc.description.trim().is_empty() {
            report.push(Rule::EmptyField, "`description` must not be empty");
        } else {
            self.check_description(&doc.description, &mut report);
        }
        self.check_body(&doc.body, &mut report);
        report
    }

    fn check(&self, raw: &str, path: Option<&Path>) -> Report {
        let mut report = Report::new(path);

        let sections = match frontmatter::split(raw) {
            Ok(sections) => sections,
            Err(SkillError::UnterminatedFrontMatter) => {
                report.push(
                    Rule::UnterminatedFrontMatter,
                    "front-matter opened with --- but never closed",
                );
                return report;
            }
            Err(e) => {
                report.push(Rule::MissingFrontMatter, e.to_string());
                return report;
            }
        };

        let fields = self.check_metadata(sections.metadata, &mut report);
        if let Some(name) = &fields.name {
            self.check_name(name, path, &mut report);
        }
        if let Some(description) = &fields.description {
            self.check_description(description, &mut report);
        }
        self.check_body(sections.body, &mut report);

        report
    }

    fn check_metadata(&self, metadata: &str, report: &mut Report) -> Fields {
        if metadata.trim().is_empty() {
            return Fields {
                name: take_string(&Mapping::new(), "name", report),
                description: take_string(&Mapping::new(), "description", report),
            };
        }

        let value: Value = match serde_yaml::from_str(metadata) {
            Ok(value) => value,
            Err(e) => {
                report.push(Rule::MalformedFrontMatter, format!("invalid YAML: {e}"));
                return Fields::default();
            }
        };

        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => {
                report.push(
                    Rule::MalformedFrontMatter,
                    "front-matter must be a mapping of keys to values",
                );
                return Fields::default();
            }
        };

        for key in mapping.keys() {
            match key.as_str() {
                Some("name" | "description") => {}
                Some(other) => report.push(
                    Rule::UnexpectedField,
                    format!("unexpected key `{other}`; only `name` and `description` are allowed"),
                ),
                None => report.push(
                    Rule::UnexpectedField,
                    "front-matter keys must be plain strings",
                ),
            }
        }

        Fields {
            name: take_string(&mapping, "name", report),
            description: take_string(&mapping, "description", report),
        }
    }

    fn check_name(&self, name: &str, path: Option<&Path>, report: &mut Report) {
        let length = name.chars().count();
        if length > self.rules.max_name_length {
            report.push(
                Rule::NameTooLong,
                format!(
                    "name is {length} characters; the limit is {}",
                    self.rules.max_name_length
                ),
            );
        }

        if !self.name_re.is_match(name) {
            report.push(
                Rule::NamePattern,
                format!("name `{name}` must contain only lowercase letters, digits, and hyphens"),
            );
        }

        let lowered = name.to_lowercase();
        for word in &self.rules.reserved_words {
            if !word.is_empty() && lowered.contains(&word.to_lowercase()) {
                report.push(
                    Rule::NameReservedWord,
                    format!("name `{name}` contains the reserved word `{word}`"),
                );
            }
        }

        if let Some(dir_name) = path.and_then(skill_dir_name) {
            if dir_name != name {
                report.push(
                    Rule::NameMismatch,
                    format!("name `{name}` differs from its directory `{dir_name}`"),
                );
            }
        }
    }

    fn check_description(&self, description: &str, report: &mut Report) {
        let length = description.chars().count();
        if length > self.rules.max_description_length {
            report.push(
                Rule::DescriptionTooLong,
                format!(
                    "description is {length} characters; the limit is {}",
                    self.rules.max_description_length
                ),
            );
        }

        if let Some(tag) = self.xml_re.find(description) {
            report.push(
                Rule::XmlTag,
                format!("description contains the XML tag `{}`", tag.as_str()),
            );
        }

        if !self.rules.advisory {
            return;
        }

        let pronouns = heuristics::personal_pronouns(description);
        if !pronouns.is_empty() {
            report.push(
                Rule::PointOfView,
                format!(
                    "description should be written in third person (found: {})",
                    pronouns.join(", ")
                ),
            );
        }
        if !heuristics::has_capability(description) {
            report.push(
                Rule::MissingCapability,
                "description should say what the skill does",
            );
        }
        if !heuristics::has_trigger(description) {
            report.push(
                Rule::MissingTrigger,
                "description should say when to use the skill (e.g. \"Use when ...\")",
            );
        }
    }

    fn check_body(&self, body: &str, report: &mut Report) {
        let lines = body.lines().count();
        if lines > self.rules.max_body_lines {
            report.push(
                Rule::BodyTooLong,
                format!(
                    "body is {lines} lines; keep it at or under {} and move detail into separate files",
                    self.rules.max_body_lines
                ),
            );
        }
    }
}

fn take_string(mapping: &Mapping, key: &str, report: &mut Report) -> Option<String> {
    match mapping.get(key) {
        None => {
            report.push(Rule::MissingField, format!("missing required key `{key}`"));
            None
        }
        Some(Value::Null) => {
            report.push(Rule::EmptyField, format!("`{key}` must not be empty"));
            None
        }
        Some(Value::String(value)) if value.trim().is_empty() => {
            report.push(Rule::EmptyField, format!("`{key}` must not be empty"));
            None
        }
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            report.push(Rule::InvalidField, format!("`{key}` must be a string"));
            None
        }
    }
}

fn skill_dir_name(path: &Path) -> Option<&str> {
    if path.file_name()? != SKILL_FILE {
        return None;
    }
    path.parent()?.file_name()?.to_str()
}
