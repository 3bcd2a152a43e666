//! The section list store.
//!
//! [`Document`] owns the ordered sections and is the whole of the plugin's
//! persistent-for-the-session data. It has exactly one writer: the event
//! handler in [`crate::app`]. Every operation is total. Unknown ids and
//! out-of-range indices leave the document untouched instead of failing.

use super::reorder::reorder;
use super::section::{Image, ImageField, ImageId, Section, SectionId, SectionUpdate};

/// Ordered collection of sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self { sections: Vec::new() }
    }

    /// Builds a document from existing sections, keeping their order.
    #[must_use]
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Sections in document order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Index of the section with `id`.
    #[must_use]
    pub fn position(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Section at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Appends an empty section and returns its id.
    pub fn add_section(&mut self) -> SectionId {
        let section = Section::new();
        let id = section.id;
        self.sections.push(section);
        tracing::debug!(section_id = %id, count = self.sections.len(), "section added");
        id
    }

    /// Removes the section with `id`, if present.
    ///
    /// Returns `true` when a section was removed.
    pub fn remove_section(&mut self, id: SectionId) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.id != id);
        let removed = self.sections.len() != before;
        tracing::debug!(section_id = %id, removed, "remove section");
        removed
    }

    /// Flips the collapsed flag of the section with `id`.
    pub fn toggle_collapse(&mut self, id: SectionId) -> bool {
        self.section_mut(id).map_or(false, |section| {
            section.is_collapsed = !section.is_collapsed;
            true
        })
    }

    /// Replaces one field of the section with `id`.
    pub fn update_field(&mut self, id: SectionId, update: SectionUpdate) -> bool {
        self.section_mut(id).map_or(false, |section| {
            section.apply(update);
            true
        })
    }

    /// Moves the section at `from` to `to`.
    ///
    /// `to == None` models a drop outside any target and never mutates.
    pub fn reorder_sections(&mut self, from: usize, to: Option<usize>) -> bool {
        let moved = reorder(&mut self.sections, from, to);
        tracing::debug!(from, to = ?to, moved, "reorder sections");
        moved
    }

    /// Moves the section with `id` by `offset` positions.
    ///
    /// Moving past either end of the list is a no-op.
    pub fn move_section(&mut self, id: SectionId, offset: isize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let to = from
            .checked_add_signed(offset)
            .filter(|to| *to < self.sections.len());
        self.reorder_sections(from, to)
    }

    /// Appends an image to one gallery of the section with `id`.
    pub fn append_image(&mut self, id: SectionId, field: ImageField, image: Image) -> bool {
        self.section_mut(id).map_or(false, |section| {
            section.images_mut(field).push(image);
            true
        })
    }

    /// Removes the image with `image_id` from one gallery.
    pub fn remove_image(&mut self, id: SectionId, image_id: ImageId, field: ImageField) -> bool {
        self.section_mut(id).map_or(false, |section| {
            let images = section.images_mut(field);
            let before = images.len();
            images.retain(|img| img.id != image_id);
            images.len() != before
        })
    }

    /// Moves an image within one gallery; same contract as
    /// [`reorder_sections`](Self::reorder_sections).
    pub fn reorder_images(&mut self, id: SectionId, field: ImageField, from: usize, to: Option<usize>) -> bool {
        self.section_mut(id)
            .map_or(false, |section| reorder(section.images_mut(field), from, to))
    }

    /// Sets or clears the transient upload progress of a section.
    pub fn set_upload_progress(&mut self, id: SectionId, progress: Option<f64>) -> bool {
        self.section_mut(id).map_or(false, |section| {
            section.upload_progress = progress;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::section::Language;

    fn titled(doc: &mut Document, title: &str) -> SectionId {
        let id = doc.add_section();
        doc.update_field(id, SectionUpdate::Title(title.to_string()));
        id
    }

    fn titles(doc: &Document) -> Vec<&str> {
        doc.sections().iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn add_then_remove_restores_document() {
        let mut doc = Document::new();
        titled(&mut doc, "first");
        let before = doc.clone();

        let id = doc.add_section();
        assert_eq!(doc.len(), 2);
        assert!(doc.remove_section(id));

        assert_eq!(doc, before);
    }

    #[test]
    fn add_section_defaults_to_first_language() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let section = doc.section(id).unwrap();
        assert_eq!(section.code.language, Language::Cpp);
        assert!(!section.is_collapsed);
    }

    #[test]
    fn remove_absent_section_is_noop() {
        let mut doc = Document::new();
        titled(&mut doc, "a");
        let before = doc.clone();
        assert!(!doc.remove_section(SectionId::new()));
        assert_eq!(doc, before);
    }

    #[test]
    fn toggle_collapse_flips_only_target() {
        let mut doc = Document::new();
        let a = titled(&mut doc, "a");
        let b = titled(&mut doc, "b");

        assert!(doc.toggle_collapse(a));
        assert!(doc.section(a).unwrap().is_collapsed);
        assert!(!doc.section(b).unwrap().is_collapsed);

        doc.toggle_collapse(a);
        assert!(!doc.section(a).unwrap().is_collapsed);
        assert!(!doc.toggle_collapse(SectionId::new()));
    }

    #[test]
    fn update_field_leaves_other_sections_alone() {
        let mut doc = Document::new();
        let a = titled(&mut doc, "a");
        let b = titled(&mut doc, "b");
        let b_before = doc.section(b).unwrap().clone();

        doc.update_field(a, SectionUpdate::Algorithm("Do X".to_string()));
        doc.update_field(a, SectionUpdate::Language(Language::C));

        let section = doc.section(a).unwrap();
        assert_eq!(section.algorithm, "Do X");
        assert_eq!(section.code.language, Language::C);
        assert_eq!(section.title, "a");
        assert_eq!(doc.section(b).unwrap(), &b_before);
    }

    #[test]
    fn reorder_sections_moves_element() {
        let mut doc = Document::new();
        for t in ["a", "b", "c"] {
            titled(&mut doc, t);
        }
        assert!(doc.reorder_sections(0, Some(2)));
        assert_eq!(titles(&doc), vec!["b", "c", "a"]);
    }

    #[test]
    fn reorder_sections_without_destination_is_noop() {
        let mut doc = Document::new();
        for t in ["a", "b", "c"] {
            titled(&mut doc, t);
        }
        let before = doc.clone();
        assert!(!doc.reorder_sections(0, None));
        assert!(!doc.reorder_sections(0, Some(7)));
        assert!(!doc.reorder_sections(9, Some(0)));
        assert_eq!(doc, before);
    }

    #[test]
    fn move_section_stops_at_edges() {
        let mut doc = Document::new();
        let a = titled(&mut doc, "a");
        let c = {
            titled(&mut doc, "b");
            titled(&mut doc, "c")
        };

        assert!(!doc.move_section(a, -1));
        assert!(!doc.move_section(c, 1));
        assert!(doc.move_section(a, 1));
        assert_eq!(titles(&doc), vec!["b", "a", "c"]);
    }

    #[test]
    fn image_operations_are_scoped_to_field() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let first = Image::new("http://x/1.png");
        let second = Image::new("http://x/2.png");
        let first_id = first.id;

        doc.append_image(id, ImageField::ProblemSolving, first);
        doc.append_image(id, ImageField::ProblemSolving, second);
        doc.append_image(id, ImageField::Output, Image::new("http://x/out.png"));

        assert!(doc.reorder_images(id, ImageField::ProblemSolving, 0, Some(1)));
        let urls: Vec<&str> = doc.section(id).unwrap().problem_solving.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["http://x/2.png", "http://x/1.png"]);

        assert!(!doc.remove_image(id, first_id, ImageField::Output));
        assert_eq!(doc.section(id).unwrap().output.len(), 1);

        assert!(doc.remove_image(id, first_id, ImageField::ProblemSolving));
        assert_eq!(doc.section(id).unwrap().problem_solving.len(), 1);
    }

    #[test]
    fn remove_absent_image_is_noop() {
        let mut doc = Document::new();
        let id = doc.add_section();
        doc.append_image(id, ImageField::Output, Image::new("u"));
        let before = doc.clone();

        assert!(!doc.remove_image(id, ImageId::new(), ImageField::Output));
        assert!(!doc.remove_image(SectionId::new(), ImageId::new(), ImageField::Output));
        assert_eq!(doc, before);
    }

    #[test]
    fn reorder_images_invalid_destination_is_noop() {
        let mut doc = Document::new();
        let id = doc.add_section();
        doc.append_image(id, ImageField::Output, Image::new("1"));
        doc.append_image(id, ImageField::Output, Image::new("2"));
        let before = doc.clone();

        assert!(!doc.reorder_images(id, ImageField::Output, 0, None));
        assert!(!doc.reorder_images(id, ImageField::Output, 0, Some(2)));
        assert_eq!(doc, before);
    }
}
