//! JSON export of the portfolio.
//!
//! Building the file is pure: [`ExportArtifact::from_portfolio`] produces the
//! filename and 2-space indented JSON. Handing it to the user is the job of a
//! [`DownloadTarget`]; the platform targets live in the UI layer.

use crate::constants::{EXPORT_FALLBACK_NAME, EXPORT_SUFFIX};
use crate::error::Result;
use crate::types::{PortfolioData, StudentInfo};

/// MIME type of the exported file.
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// A ready-to-download export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested filename, e.g. `Ada_Lovelace_Corvid_Portfolio.json`
    pub filename: String,
    /// MIME type for the download
    pub mime_type: &'static str,
    /// UTF-8 JSON contents
    pub contents: String,
}

impl ExportArtifact {
    /// Serializes the aggregate and derives the filename from the student's name.
    pub fn from_portfolio(data: &PortfolioData) -> Result<Self> {
        Ok(Self {
            filename: export_filename(&data.student_info),
            mime_type: EXPORT_MIME_TYPE,
            contents: data.to_json()?,
        })
    }
}

/// Something that can hand an export file to the user.
pub trait DownloadTarget {
    /// Delivers the file. Any resource acquired for the download must be
    /// released before this returns, on success and on failure.
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<()>;
}

/// Builds `<sanitized name or "Student">_Corvid_Portfolio.json`.
///
/// Words are joined with `_`; anything other than ASCII letters, digits, `_`
/// and `-` is dropped, and words left empty disappear.
pub fn export_filename(info: &StudentInfo) -> String {
    let stem = info
        .name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.trim_matches('_').is_empty() {
        EXPORT_FALLBACK_NAME
    } else {
        stem.as_str()
    };
    format!("{stem}{EXPORT_SUFFIX}")
}

/// Serializes the portfolio and delivers it through `target`.
pub fn export_portfolio(data: &PortfolioData, target: &mut dyn DownloadTarget) -> Result<String> {
    let artifact = ExportArtifact::from_portfolio(data)?;
    target.deliver(&artifact)?;
    log::info!(
        "Exported portfolio as {} ({} bytes)",
        artifact.filename,
        artifact.contents.len()
    );
    Ok(artifact.filename)
}
