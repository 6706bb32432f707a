// Attachment selection and validation for jobs, bids and chat.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default per-file limit, matching the backend.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Content types the backend accepts.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
];

/// What an upload is attached to. Also the `{type}` segment of the
/// upload/list/download paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadTarget {
    Job,
    Bid,
    Chat,
}

impl UploadTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadTarget::Job => "job",
            UploadTarget::Bid => "bid",
            UploadTarget::Chat => "chat",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            UploadTarget::Job => "Job",
            UploadTarget::Bid => "Bid",
            UploadTarget::Chat => "Message",
        }
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("File {name} is not a supported type")]
    UnsupportedType { name: String },

    #[error("File {name} is too large (max {max})")]
    TooLarge { name: String, max: String },

    #[error("File {name} could not be read: {message}")]
    Unreadable { name: String, message: String },
}

/// Guess the MIME type from the file extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

/// A file accepted into a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub content_type: &'static str,
    pub size: u64,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `10MB` for whole mebibytes, otherwise the formatted size (`512 KB`).
fn limit_label(max_size: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if max_size >= MIB && max_size % MIB == 0 {
        format!("{}MB", max_size / MIB)
    } else {
        format_file_size(max_size)
    }
}

/// Check a single candidate against the type and size rules.
pub fn validate(path: &Path, size: u64, max_size: u64) -> Result<SelectedFile, UploadError> {
    let name = display_name(path);
    let Some(content_type) = content_type_for(path) else {
        return Err(UploadError::UnsupportedType { name });
    };
    if size > max_size {
        return Err(UploadError::TooLarge {
            name,
            max: limit_label(max_size),
        });
    }
    Ok(SelectedFile {
        path: path.to_path_buf(),
        name,
        content_type,
        size,
    })
}

/// Files picked for one upload. Valid files accumulate across calls to
/// [`FileSelection::add_paths`]; rejects are reported per file.
#[derive(Debug, Clone)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
    max_size: u64,
}

impl Default for FileSelection {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl FileSelection {
    pub fn new(max_size: u64) -> Self {
        Self {
            files: Vec::new(),
            max_size,
        }
    }

    /// Add already-measured candidates. Returns the rejection for each file
    /// that failed validation.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = (PathBuf, u64)>) -> Vec<UploadError> {
        let mut rejected = Vec::new();
        for (path, size) in candidates {
            match validate(&path, size, self.max_size) {
                Ok(file) => self.files.push(file),
                Err(e) => rejected.push(e),
            }
        }
        rejected
    }

    /// Stat each path on disk and add it.
    pub fn add_paths(&mut self, paths: &[PathBuf]) -> Vec<UploadError> {
        let mut measured = Vec::new();
        let mut rejected = Vec::new();
        for path in paths {
            match std::fs::metadata(path) {
                Ok(meta) if meta.is_file() => measured.push((path.clone(), meta.len())),
                Ok(_) => rejected.push(UploadError::Unreadable {
                    name: display_name(path),
                    message: "not a regular file".to_string(),
                }),
                Err(e) => rejected.push(UploadError::Unreadable {
                    name: display_name(path),
                    message: e.to_string(),
                }),
            }
        }
        rejected.extend(self.add(measured));
        rejected
    }

    /// Remove by position. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Human-readable size: "0 Bytes", "1.5 KB", "2 MB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut i = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && i < UNITS.len() - 1 {
        scaled /= 1024;
        i += 1;
    }
    let value = bytes as f64 / 1024f64.powi(i as i32);
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[i])
}

/// Warning shown when a record was created but its attachments failed.
pub fn partial_upload_warning(target: UploadTarget) -> String {
    format!(
        "{} created successfully, but file upload failed. You can upload files later.",
        target.noun()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn infers_content_type_case_insensitively() {
        assert_eq!(content_type_for(Path::new("Plan.PDF")), Some("application/pdf"));
        assert_eq!(content_type_for(Path::new("site.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("archive.zip")), None);
        assert_eq!(content_type_for(Path::new("README")), None);
    }

    #[test]
    fn every_inferred_type_is_allowed() {
        for ext in ["jpg", "png", "gif", "pdf", "doc", "docx", "xls", "xlsx", "txt"] {
            let name = format!("f.{ext}");
            let mime = content_type_for(Path::new(&name)).unwrap();
            assert!(ALLOWED_CONTENT_TYPES.contains(&mime), "{mime}");
        }
    }

    #[test]
    fn rejection_messages() {
        let err = validate(Path::new("/tmp/setup.exe"), 10, DEFAULT_MAX_FILE_SIZE).unwrap_err();
        assert_eq!(err.to_string(), "File setup.exe is not a supported type");

        let err = validate(
            Path::new("big.pdf"),
            DEFAULT_MAX_FILE_SIZE + 1,
            DEFAULT_MAX_FILE_SIZE,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "File big.pdf is too large (max 10MB)");
    }

    #[test]
    fn sub_megabyte_limit_is_named_exactly() {
        let err = validate(Path::new("scan.jpg"), 600 * 1024, 512 * 1024).unwrap_err();
        assert_eq!(err.to_string(), "File scan.jpg is too large (max 512 KB)");

        let err = validate(Path::new("scan.jpg"), 2 * 1024 * 1024, 1536 * 1024).unwrap_err();
        assert_eq!(err.to_string(), "File scan.jpg is too large (max 1.5 MB)");
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        assert!(validate(Path::new("a.png"), DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILE_SIZE).is_ok());
    }

    #[test]
    fn selection_accumulates_and_removes() {
        let mut sel = FileSelection::default();
        let rejected = sel.add(vec![
            (PathBuf::from("a.pdf"), 100),
            (PathBuf::from("b.zip"), 100),
        ]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(sel.len(), 1);

        sel.add(vec![(PathBuf::from("c.xlsx"), 300)]);
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.total_size(), 400);

        let removed = sel.remove(0).unwrap();
        assert_eq!(removed.name, "a.pdf");
        assert_eq!(sel.files()[0].name, "c.xlsx");
        assert!(sel.remove(5).is_none());
    }

    #[test]
    fn add_paths_reads_sizes_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("quote.txt");
        std::fs::File::create(&good)
            .unwrap()
            .write_all(b"rate 450/bag")
            .unwrap();
        let missing = dir.path().join("gone.pdf");

        let mut sel = FileSelection::default();
        let rejected = sel.add_paths(&[good.clone(), missing]);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.files()[0].size, 12);
        assert!(matches!(rejected[0], UploadError::Unreadable { .. }));
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn warning_text_names_the_record() {
        assert_eq!(
            partial_upload_warning(UploadTarget::Job),
            "Job created successfully, but file upload failed. You can upload files later."
        );
        assert!(partial_upload_warning(UploadTarget::Bid).starts_with("Bid created"));
    }
}
