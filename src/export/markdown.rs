//! Markdown rendering of a document.
//!
//! The output layout per section is fixed:
//!
//! ~~~text
//! # {title}
//!
//! 1. Algorithm:
//! {algorithm}
//!
//! 2. Problem Solving:
//! > ![Problem Solving]({url})
//!
//! 3. Code:
//! ```{language}
//! {content}
//! ```
//!
//! 4. Output:
//! > ![Output]({url})
//!
//! ---
//! ~~~
//!
//! User text is copied verbatim; it may itself contain Markdown.

use crate::domain::{ImageField, Section};
use std::fmt::Write;

/// Renders the sections, in order, as one Markdown string.
///
/// Pure and deterministic: identical input always yields identical bytes.
#[must_use]
pub fn generate_document(sections: &[Section]) -> String {
    let _span = tracing::debug_span!("generate_document", sections = sections.len()).entered();

    let mut markdown = String::new();
    for section in sections {
        write_section(&mut markdown, section);
    }

    tracing::debug!(bytes = markdown.len(), "document generated");
    markdown
}

fn write_section(out: &mut String, section: &Section) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# {}\n", section.title);
    let _ = writeln!(out, "1. Algorithm:\n{}\n", section.algorithm);

    write_gallery(out, "2. Problem Solving:", section, ImageField::ProblemSolving);

    let _ = writeln!(
        out,
        "3. Code:\n```{}\n{}\n```\n",
        section.code.language, section.code.content
    );

    write_gallery(out, "4. Output:", section, ImageField::Output);

    out.push_str("---\n\n");
}

fn write_gallery(out: &mut String, heading: &str, section: &Section, field: ImageField) {
    let _ = writeln!(out, "{heading}");
    for image in section.images(field) {
        let _ = writeln!(out, "> ![{}]({})", field.label(), image.url);
    }
    out.push('\n');
}
