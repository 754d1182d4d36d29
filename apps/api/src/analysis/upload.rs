//! Upload preconditions. Checked before the first stage runs; nothing is stored
//! for a submission that fails here.

use thiserror::Error;

use crate::storage::FileBlob;

/// Maximum accepted resume size: 20 MiB.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Please select a resume file.")]
    NoFile,

    #[error("Please upload exactly one resume file ({0} were submitted).")]
    MultipleFiles(usize),

    #[error("Only PDF resumes are supported (got '{0}').")]
    UnsupportedType(String),

    #[error("The resume is {size} bytes; the limit is {limit} bytes (20 MB).")]
    TooLarge { size: usize, limit: usize },

    #[error("The resume file is empty.")]
    EmptyFile,
}

/// Checks that exactly one non-empty PDF under the size ceiling was submitted.
pub fn validate_upload(mut files: Vec<FileBlob>) -> Result<FileBlob, InputError> {
    let file = match files.len() {
        0 => return Err(InputError::NoFile),
        1 => files.remove(0),
        n => return Err(InputError::MultipleFiles(n)),
    };

    let content_type = essence(&file.content_type);
    if !content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        return Err(InputError::UnsupportedType(file.content_type.clone()));
    }
    if file.len() > MAX_UPLOAD_BYTES {
        return Err(InputError::TooLarge {
            size: file.len(),
            limit: MAX_UPLOAD_BYTES,
        });
    }
    if file.is_empty() {
        return Err(InputError::EmptyFile);
    }

    Ok(file)
}

/// `application/pdf; charset=binary` → `application/pdf`
fn essence(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}
