//! Section and image records.
//!
//! A [`Section`] is one entry of the exported write-up: a title, free-form
//! algorithm notes, a code snippet and two ordered image galleries. Sections
//! and images are identified by random v4 UUIDs wrapped in newtypes so the two
//! id spaces cannot be mixed up.

use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(Uuid);

impl SectionId {
    /// Creates a fresh, never reused identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Unique identifier of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(Uuid);

impl ImageId {
    /// Creates a fresh, never reused identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to a previously uploaded picture.
///
/// Immutable once created; only its position inside the owning list changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: ImageId,
    pub url: String,
}

impl Image {
    /// Wraps a hosted URL in a new image with a fresh id.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: ImageId::new(),
            url: url.into(),
        }
    }
}

/// Languages a code snippet can be tagged with.
///
/// The first variant is the default for new sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    Cpp,
    C,
}

impl Language {
    /// All languages in selection order.
    pub const ALL: [Self; 2] = [Self::Cpp, Self::C];

    /// Fence tag used in the exported Markdown.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpp => "cpp",
            Self::C => "c",
        }
    }

    /// The language after this one, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code snippet attached to a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Language,
    pub content: String,
}

/// Selects one of the two image galleries of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageField {
    /// Screenshots of working through the problem.
    ProblemSolving,
    /// Screenshots of the program output.
    Output,
}

impl ImageField {
    /// Human-readable label, also used as the alt text on export.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProblemSolving => "Problem Solving",
            Self::Output => "Output",
        }
    }
}

/// Replacement value for one editable field of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    Title(String),
    Algorithm(String),
    Language(Language),
    Code(String),
}

/// One record of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub algorithm: String,
    pub problem_solving: Vec<Image>,
    pub code: CodeBlock,
    pub output: Vec<Image>,
    pub is_collapsed: bool,
    /// Percentage of the running upload batch, `None` when idle.
    pub upload_progress: Option<f64>,
}

impl Section {
    /// Creates an empty, expanded section with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: SectionId::new(),
            title: String::new(),
            algorithm: String::new(),
            problem_solving: Vec::new(),
            code: CodeBlock::default(),
            output: Vec::new(),
            is_collapsed: false,
            upload_progress: None,
        }
    }

    /// Returns the image list selected by `field`.
    #[must_use]
    pub fn images(&self, field: ImageField) -> &[Image] {
        match field {
            ImageField::ProblemSolving => &self.problem_solving,
            ImageField::Output => &self.output,
        }
    }

    /// Returns the image list selected by `field` for mutation.
    pub fn images_mut(&mut self, field: ImageField) -> &mut Vec<Image> {
        match field {
            ImageField::ProblemSolving => &mut self.problem_solving,
            ImageField::Output => &mut self.output,
        }
    }

    /// Replaces exactly one field, leaving the rest untouched.
    pub fn apply(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::Title(title) => self.title = title,
            SectionUpdate::Algorithm(text) => self.algorithm = text,
            SectionUpdate::Language(language) => self.code.language = language,
            SectionUpdate::Code(content) => self.code.content = content,
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}
