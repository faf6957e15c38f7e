//! `skillcheck` skills library
//!
//! Parsing, validation, and indexing for skill documents: Markdown files
//! that open with a YAML front-matter block naming the skill and describing
//! what it does and when to use it.
//!
//! ## Features
//!
//! - Front-matter splitting that keeps the body byte-for-byte
//! - `Document` parse/render with exact round-trips
//! - A validator that reports every broken rule instead of stopping at the first
//! - Registry discovery over `<dir>/<skill>/SKILL.md` with bodies loaded on demand
//! - README index generation between marker comments
//!
//! ## Document format
//!
//! ```text
//! ---
//! name: react-useeffect
//! description: Explains when to use useEffect. Use when writing React effects.
//! ---
//! # Markdown body
//! ```

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod document;
pub mod error;
pub mod frontmatter;
mod heuristics;
pub mod index;
pub mod registry;
pub mod skill;
pub mod validator;

pub use document::{Document, FrontMatter, SKILL_FILE};
pub use error::SkillError;
pub use index::{IndexEntry, SkillIndex};
pub use registry::SkillsRegistry;
pub use skill::{Discovered, Skill};
pub use validator::{Report, Rule, Severity, ValidationRules, Validator, Violation};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Document, Report, Rule, SkillError, SkillIndex, SkillsRegistry, ValidationRules,
        Validator,
    };
}
