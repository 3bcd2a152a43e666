//! Sequential upload batches.
//!
//! An [`UploadBatch`] is the ordered task list created by one file-selection
//! interaction. Exactly one task runs at a time: the caller takes the next
//! task, performs the upload however it likes, and reports the outcome back.
//! That keeps append order identical to selection order whether the transport
//! is a blocking call ([`upload_images`]) or an asynchronous host request
//! answered by a later event (the plugin shim).
//!
//! Progress is written to the target section after every completion as
//! `completed / total * 100` and cleared when the batch finishes or fails.
//! A failure keeps everything appended so far and drops the remaining tasks.

use crate::domain::{Document, Image, ImageField, SectionId, UploadError};
use std::collections::VecDeque;

/// Performs a single upload and returns the hosted URL.
///
/// Implemented by anything that can turn a local file into a URL; closures
/// with the matching signature qualify.
pub trait ImageUploader {
    /// Uploads one file.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] on any read, transport or service failure.
    fn upload(&mut self, file: &str) -> Result<String, UploadError>;
}

impl<F> ImageUploader for F
where
    F: FnMut(&str) -> Result<String, UploadError>,
{
    fn upload(&mut self, file: &str) -> Result<String, UploadError> {
        self(file)
    }
}

/// One file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub section_id: SectionId,
    pub field: ImageField,
    /// File as selected by the user.
    pub file: String,
    /// Zero-based position within the batch.
    pub index: usize,
    /// Number of files in the batch.
    pub total: usize,
}

/// What the batch needs after an outcome was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStep {
    /// Another file is waiting; run this task next.
    Next(UploadTask),
    /// All files were uploaded.
    Finished { uploaded: usize },
    /// The batch stopped early; `uploaded` images were kept.
    Stopped { uploaded: usize },
}

/// Ordered task list for one upload interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadBatch {
    section_id: SectionId,
    field: ImageField,
    pending: VecDeque<String>,
    in_flight: Option<UploadTask>,
    total: usize,
    completed: usize,
}

impl UploadBatch {
    /// Creates a batch for `files`, or `None` when nothing was selected.
    #[must_use]
    pub fn new(section_id: SectionId, field: ImageField, files: Vec<String>) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        let total = files.len();
        Some(Self {
            section_id,
            field,
            pending: files.into(),
            in_flight: None,
            total,
            completed: 0,
        })
    }

    #[must_use]
    pub const fn section_id(&self) -> SectionId {
        self.section_id
    }

    #[must_use]
    pub const fn field(&self) -> ImageField {
        self.field
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// The task currently being uploaded, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<&UploadTask> {
        self.in_flight.as_ref()
    }

    /// Completion percentage of the batch.
    #[must_use]
    pub fn progress(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.completed as f64 / self.total as f64;
        ratio * 100.0
    }

    /// Starts the batch: zeroes the section's progress and hands out the
    /// first task.
    ///
    /// Returns `None` if the target section no longer exists.
    pub fn begin(&mut self, doc: &mut Document) -> Option<UploadTask> {
        if !doc.set_upload_progress(self.section_id, Some(0.0)) {
            tracing::debug!(section_id = %self.section_id, "upload target missing, dropping batch");
            self.truncate();
            return None;
        }
        tracing::debug!(section_id = %self.section_id, files = self.total, field = ?self.field, "upload batch started");
        self.take_next()
    }

    /// Records a successful upload of the in-flight task.
    pub fn record_success(&mut self, doc: &mut Document, url: String) -> BatchStep {
        self.in_flight = None;

        if !doc.append_image(self.section_id, self.field, Image::new(url)) {
            tracing::debug!(section_id = %self.section_id, "section removed during upload, dropping remaining files");
            self.truncate();
            return BatchStep::Stopped { uploaded: self.completed };
        }

        self.completed += 1;
        let progress = self.progress();
        tracing::debug!(completed = self.completed, total = self.total, progress, "upload completed");

        match self.take_next() {
            Some(task) => {
                doc.set_upload_progress(self.section_id, Some(progress));
                BatchStep::Next(task)
            }
            None => {
                doc.set_upload_progress(self.section_id, None);
                BatchStep::Finished { uploaded: self.completed }
            }
        }
    }

    /// Records a failed upload of the in-flight task.
    ///
    /// Keeps what was already appended, clears progress and drops the rest.
    pub fn record_failure(&mut self, doc: &mut Document, error: &UploadError) -> BatchStep {
        tracing::warn!(
            section_id = %self.section_id,
            file = ?self.in_flight.as_ref().map(|t| t.file.as_str()),
            completed = self.completed,
            total = self.total,
            error = %error,
            "upload failed, stopping batch"
        );
        self.in_flight = None;
        self.truncate();
        doc.set_upload_progress(self.section_id, None);
        BatchStep::Stopped { uploaded: self.completed }
    }

    /// Drops every task that has not started yet.
    pub fn truncate(&mut self) {
        self.pending.clear();
    }

    fn take_next(&mut self) -> Option<UploadTask> {
        let file = self.pending.pop_front()?;
        let task = UploadTask {
            section_id: self.section_id,
            field: self.field,
            file,
            index: self.completed,
            total: self.total,
        };
        self.in_flight = Some(task.clone());
        Some(task)
    }
}

/// Uploads `files` one after another and appends them to `field` of
/// `section_id`.
///
/// `on_progress` observes the section's progress value after every change,
/// ending with `None`. Returns the number of images appended.
///
/// # Errors
///
/// Returns the first [`UploadError`]. Images appended before the failure stay
/// in the document and no later file is attempted.
pub fn upload_images<U, P>(
    doc: &mut Document,
    section_id: SectionId,
    files: Vec<String>,
    field: ImageField,
    uploader: &mut U,
    mut on_progress: P,
) -> Result<usize, UploadError>
where
    U: ImageUploader + ?Sized,
    P: FnMut(Option<f64>),
{
    let _span = tracing::debug_span!("upload_images", section_id = %section_id, files = files.len()).entered();

    let Some(mut batch) = UploadBatch::new(section_id, field, files) else {
        return Ok(0);
    };

    let mut next = batch.begin(doc);
    if next.is_some() {
        on_progress(Some(0.0));
    }

    while let Some(task) = next {
        match uploader.upload(&task.file) {
            Ok(url) => match batch.record_success(doc, url) {
                BatchStep::Next(task) => {
                    on_progress(Some(batch.progress()));
                    next = Some(task);
                }
                BatchStep::Finished { .. } | BatchStep::Stopped { .. } => {
                    on_progress(None);
                    next = None;
                }
            },
            Err(error) => {
                batch.record_failure(doc, &error);
                on_progress(None);
                return Err(error);
            }
        }
    }

    Ok(batch.completed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn hosted(file: &str) -> Result<String, UploadError> {
        Ok(format!("https://img.example/{file}"))
    }

    #[test]
    fn uploads_in_selection_order() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let mut calls = Vec::new();
        let mut uploader = |file: &str| {
            calls.push(file.to_string());
            hosted(file)
        };

        let uploaded = upload_images(&mut doc, id, files(&["a.png", "b.png", "c.png"]), ImageField::Output, &mut uploader, |_| {}).unwrap();

        assert_eq!(uploaded, 3);
        assert_eq!(calls, vec!["a.png", "b.png", "c.png"]);
        let urls: Vec<&str> = doc.section(id).unwrap().output.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://img.example/a.png", "https://img.example/b.png", "https://img.example/c.png"]);
        assert!(doc.section(id).unwrap().problem_solving.is_empty());
        assert!(doc.section(id).unwrap().upload_progress.is_none());
    }

    #[test]
    fn reports_progress_after_each_completion() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let mut seen = Vec::new();

        upload_images(&mut doc, id, files(&["a", "b", "c", "d"]), ImageField::ProblemSolving, &mut hosted, |p| seen.push(p)).unwrap();

        assert_eq!(seen, vec![Some(0.0), Some(25.0), Some(50.0), Some(75.0), None]);
    }

    #[test]
    fn failure_keeps_earlier_images_and_stops() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let mut calls = 0;
        let mut uploader = |file: &str| {
            calls += 1;
            if file == "second" {
                Err(UploadError::Transport("connection reset".to_string()))
            } else {
                hosted(file)
            }
        };

        let result = upload_images(&mut doc, id, files(&["first", "second", "third"]), ImageField::ProblemSolving, &mut uploader, |_| {});

        assert_eq!(result, Err(UploadError::Transport("connection reset".to_string())));
        assert_eq!(calls, 2);
        let section = doc.section(id).unwrap();
        assert_eq!(section.problem_solving.len(), 1);
        assert_eq!(section.problem_solving[0].url, "https://img.example/first");
        assert!(section.upload_progress.is_none());
    }

    #[test]
    fn empty_selection_does_nothing() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let before = doc.clone();
        let mut uploader = |_: &str| -> Result<String, UploadError> { panic!("no upload expected") };

        assert_eq!(upload_images(&mut doc, id, vec![], ImageField::Output, &mut uploader, |_| {}), Ok(0));
        assert_eq!(doc, before);
        assert!(UploadBatch::new(id, ImageField::Output, vec![]).is_none());
    }

    #[test]
    fn missing_section_uploads_nothing() {
        let mut doc = Document::new();
        let mut uploader = |_: &str| -> Result<String, UploadError> { panic!("no upload expected") };

        let result = upload_images(&mut doc, SectionId::new(), files(&["a"]), ImageField::Output, &mut uploader, |_| {});
        assert_eq!(result, Ok(0));
    }

    #[test]
    fn batch_progress_is_visible_on_section_between_tasks() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let mut batch = UploadBatch::new(id, ImageField::Output, files(&["a", "b"])).unwrap();

        let first = batch.begin(&mut doc).unwrap();
        assert_eq!(first.file, "a");
        assert_eq!(first.index, 0);
        assert_eq!(doc.section(id).unwrap().upload_progress, Some(0.0));
        assert_eq!(batch.in_flight(), Some(&first));

        let step = batch.record_success(&mut doc, "u1".to_string());
        let BatchStep::Next(second) = step else {
            panic!("expected another task, got {step:?}");
        };
        assert_eq!(second.file, "b");
        assert_eq!(second.index, 1);
        assert_eq!(doc.section(id).unwrap().upload_progress, Some(50.0));

        assert_eq!(batch.record_success(&mut doc, "u2".to_string()), BatchStep::Finished { uploaded: 2 });
        assert!(doc.section(id).unwrap().upload_progress.is_none());
        assert!(batch.in_flight().is_none());
    }

    #[test]
    fn removed_section_stops_batch() {
        let mut doc = Document::new();
        let id = doc.add_section();
        let mut batch = UploadBatch::new(id, ImageField::Output, files(&["a", "b", "c"])).unwrap();
        batch.begin(&mut doc);

        doc.remove_section(id);

        assert_eq!(batch.record_success(&mut doc, "u".to_string()), BatchStep::Stopped { uploaded: 0 });
        assert!(doc.is_empty());
    }
}
