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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, Image, Language, SectionUpdate};

    fn intro_document() -> Document {
        let mut doc = Document::new();
        let id = doc.add_section();
        doc.update_field(id, SectionUpdate::Title("Intro".to_string()));
        doc.update_field(id, SectionUpdate::Algorithm("Do X".to_string()));
        doc.update_field(id, SectionUpdate::Language(Language::Cpp));
        doc.update_field(id, SectionUpdate::Code("int main(){}".to_string()));
        doc.append_image(id, ImageField::ProblemSolving, Image::new("http://x/1.png"));
        doc
    }

    #[test]
    fn empty_document_exports_empty_string() {
        assert_eq!(generate_document(&[]), "");
    }

    #[test]
    fn intro_section_layout() {
        let doc = intro_document();
        let markdown = generate_document(doc.sections());

        let expected = "# Intro\n\n\
                        1. Algorithm:\nDo X\n\n\
                        2. Problem Solving:\n> ![Problem Solving](http://x/1.png)\n\n\
                        3. Code:\n```cpp\nint main(){}\n```\n\n\
                        4. Output:\n\n\
                        ---\n\n";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn intro_parts_appear_in_order() {
        let markdown = generate_document(intro_document().sections());

        let positions: Vec<usize> = [
            "# Intro",
            "Do X",
            "![Problem Solving](http://x/1.png)",
            "```cpp\nint main(){}\n```",
            "4. Output:\n\n",
        ]
        .iter()
        .map(|needle| markdown.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert!(!markdown.contains("![Output]"));
    }

    #[test]
    fn export_is_deterministic() {
        let doc = intro_document();
        assert_eq!(generate_document(doc.sections()), generate_document(doc.sections()));
    }

    #[test]
    fn sections_and_images_keep_order() {
        let mut doc = Document::new();
        for title in ["first", "second"] {
            let id = doc.add_section();
            doc.update_field(id, SectionUpdate::Title(title.to_string()));
            doc.update_field(id, SectionUpdate::Language(Language::C));
            for n in 1..=2 {
                doc.append_image(id, ImageField::Output, Image::new(format!("http://x/{title}-{n}.png")));
            }
        }

        let markdown = generate_document(doc.sections());
        let first = markdown.find("# first").unwrap();
        let second = markdown.find("# second").unwrap();
        assert!(first < second);
        assert!(markdown.find("first-1.png").unwrap() < markdown.find("first-2.png").unwrap());
        assert!(markdown.contains("```c\n"));
        assert_eq!(markdown.matches("---\n").count(), 2);
    }

    #[test]
    fn algorithm_markdown_is_not_escaped() {
        let mut doc = Document::new();
        let id = doc.add_section();
        doc.update_field(id, SectionUpdate::Algorithm("* step `one`\n* [link](x)".to_string()));

        let markdown = generate_document(doc.sections());
        assert!(markdown.contains("1. Algorithm:\n* step `one`\n* [link](x)\n\n"));
    }
}


