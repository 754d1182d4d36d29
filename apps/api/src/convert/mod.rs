//! Image conversion: renders the first page of a submitted PDF to a PNG preview.
//!
//! Rasterization itself is delegated to poppler's `pdftoppm`; this module only
//! shuttles bytes through a temp directory and validates what comes back.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::storage::FileBlob;

pub const PREVIEW_CONTENT_TYPE: &str = "image/png";

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error during conversion: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to run {bin}: {source}. Make sure poppler-utils is installed.")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pdftoppm failed: {0}")]
    Render(String),

    #[error("converter produced no image")]
    NoOutput,
}

#[async_trait]
pub trait ImageConverter: Send + Sync {
    /// Renders the document to a single image file.
    async fn convert(&self, document: &FileBlob) -> Result<FileBlob, ConvertError>;
}

/// Converter that shells out to `pdftoppm -png -singlefile` for page one.
#[derive(Debug, Clone)]
pub struct PdftoppmConverter {
    bin: String,
    dpi: u32,
}

impl PdftoppmConverter {
    pub fn new(bin: impl Into<String>, dpi: u32) -> Self {
        Self {
            bin: bin.into(),
            dpi,
        }
    }
}

#[async_trait]
impl ImageConverter for PdftoppmConverter {
    async fn convert(&self, document: &FileBlob) -> Result<FileBlob, ConvertError> {
        let workdir = tempfile::tempdir()?;
        let pdf_path = workdir.path().join("input.pdf");
        let output_prefix = workdir.path().join("page");
        tokio::fs::write(&pdf_path, &document.bytes).await?;

        let output = Command::new(&self.bin)
            .arg("-png")
            .arg("-singlefile")
            .args(["-f", "1", "-l", "1"])
            .args(["-r", &self.dpi.to_string()])
            .arg(&pdf_path)
            .arg(&output_prefix)
            .output()
            .await
            .map_err(|source| ConvertError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConvertError::Render(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let png_path: PathBuf = output_prefix.with_extension("png");
        let bytes = match tokio::fs::read(&png_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::NoOutput)
            }
            Err(e) => return Err(e.into()),
        };
        if !bytes.starts_with(PNG_SIGNATURE) {
            return Err(ConvertError::NoOutput);
        }

        debug!(
            pdf_size = document.len(),
            png_size = bytes.len(),
            "Rendered first page preview"
        );

        Ok(FileBlob::new(
            preview_file_name(&document.file_name),
            PREVIEW_CONTENT_TYPE,
            bytes,
        ))
    }
}

/// `resume.pdf` → `resume.png`; names without an extension get `.png` appended.
pub fn preview_file_name(source_name: &str) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => source_name,
    };
    if stem.is_empty() {
        "preview.png".to_string()
    } else {
        format!("{stem}.png")
    }
}
