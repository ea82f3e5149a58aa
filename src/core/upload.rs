//! # Transcript Upload Form
//!
//! Pre-submit checks for a new meeting transcript, mirroring what the web
//! form enforces before it lets the browser post `/process`:
//!
//! - pasted text or a file is required (text wins when both are given)
//! - files must be `.txt` or `.docx`
//! - files are capped at 16 MiB
//! - pasted text must be at least 20 characters

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;
pub const MIN_TRANSCRIPT_CHARS: usize = 20;
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "docx"];
pub const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug)]
pub enum UploadError {
    /// Neither text nor a file was given.
    Empty,
    /// Pasted text is below the server's minimum length.
    TooShort(usize),
    UnsupportedExtension(String),
    TooLarge(u64),
    Io(PathBuf, std::io::Error),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Empty => write!(f, "Please either paste text or upload a file."),
            UploadError::TooShort(len) => write!(
                f,
                "transcript too short: {len} characters (minimum {MIN_TRANSCRIPT_CHARS})"
            ),
            UploadError::UnsupportedExtension(name) => write!(
                f,
                "unsupported file '{name}': expected one of {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
            UploadError::TooLarge(size) => write!(
                f,
                "file is {size} bytes, larger than the {MAX_UPLOAD_BYTES} byte limit"
            ),
            UploadError::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for UploadError {}

/// What the user filled in, before any checks.
#[derive(Debug, Default, Clone)]
pub struct TranscriptForm {
    pub title: Option<String>,
    pub text: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl TranscriptSource {
    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            TranscriptSource::Text(text) => format!("{} chars of text", text.chars().count()),
            TranscriptSource::File { file_name, bytes } => {
                format!("file {} ({} bytes)", file_name, bytes.len())
            }
        }
    }
}

/// A form that passed every check and is ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTranscript {
    pub title: String,
    pub source: TranscriptSource,
}

impl TranscriptForm {
    pub fn validate(&self) -> Result<ValidatedTranscript, UploadError> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();

        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            let len = text.chars().count();
            if len < MIN_TRANSCRIPT_CHARS {
                return Err(UploadError::TooShort(len));
            }
            debug!("Transcript form uses pasted text ({} chars)", len);
            return Ok(ValidatedTranscript {
                title,
                source: TranscriptSource::Text(text.to_string()),
            });
        }

        let Some(path) = self.file.as_deref() else {
            return Err(UploadError::Empty);
        };

        let file_name = check_file_name(path)?;
        let size = fs::metadata(path)
            .map_err(|e| UploadError::Io(path.to_path_buf(), e))?
            .len();
        if size > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge(size));
        }
        let bytes = fs::read(path).map_err(|e| UploadError::Io(path.to_path_buf(), e))?;
        debug!("Transcript form uses file {} ({} bytes)", file_name, size);

        Ok(ValidatedTranscript {
            title,
            source: TranscriptSource::File { file_name, bytes },
        })
    }
}

/// Returns the bare file name if its extension is allowed.
fn check_file_name(path: &Path) -> Result<String, UploadError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let allowed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        });

    if allowed {
        Ok(file_name)
    } else {
        Err(UploadError::UnsupportedExtension(file_name))
    }
}
