//! Export delivery for both native and WASM platforms.
//!
//! Native builds ask for a destination through an async `rfd` save dialog and
//! report back over a channel. The browser build streams the JSON into a Blob
//! and clicks a temporary anchor; the object URL is revoked when its guard drops.

use super::state::{Notice, PortfolioApp};
use crate::error::{PortfolioError, Result};
use crate::export::{self, DownloadTarget, ExportArtifact};
use eframe::egui;
use std::sync::mpsc::Sender;

/// Messages sent from async export operations back to the main app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResult {
    /// The file was written to the given location
    Saved(String),
    /// Writing the file failed
    Failed(String),
}

/// Returns the download target for the current platform.
///
/// `ctx` is woken when an async export finishes so its notice shows at once.
pub fn default_download_target(
    sender: Sender<ExportResult>,
    ctx: Option<egui::Context>,
) -> Box<dyn DownloadTarget> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(SaveDialogDownload { sender, ctx })
    }

    #[cfg(target_arch = "wasm32")]
    {
        // Browser downloads complete synchronously
        drop((sender, ctx));
        Box::new(BrowserDownload)
    }
}

/// Hands an async export result to the app and wakes the UI to show it.
#[cfg(not(target_arch = "wasm32"))]
pub(super) fn report_export(
    sender: &Sender<ExportResult>,
    ctx: Option<&egui::Context>,
    result: ExportResult,
) {
    if sender.send(result).is_err() {
        log::debug!("Export finished after the app closed");
    }
    if let Some(ctx) = ctx {
        ctx.request_repaint();
    }
}

/// Writes an exported file to `path`.
#[cfg(not(target_arch = "wasm32"))]
pub(super) fn write_export(path: &std::path::Path, artifact: &ExportArtifact) -> ExportResult {
    match std::fs::write(path, artifact.contents.as_bytes()) {
        Ok(_) => ExportResult::Saved(path.display().to_string()),
        Err(e) => ExportResult::Failed(format!("Failed to save file: {}", e)),
    }
}

impl PortfolioApp {
    /// Exports the current portfolio as JSON through the download target.
    pub fn export_portfolio(&mut self) {
        match export::export_portfolio(self.store.data(), self.export.target.as_mut()) {
            Ok(filename) => {
                #[cfg(target_arch = "wasm32")]
                {
                    self.notice = Some(Notice::info(format!("Downloaded {filename}")));
                }
                #[cfg(not(target_arch = "wasm32"))]
                {
                    log::debug!("Save dialog opened for {filename}");
                }
            }
            Err(err) => {
                log::warn!("{err}");
                self.notice = Some(Notice::warning(err.to_string()));
            }
        }
    }

    /// Processes completed async export operations.
    pub fn poll_export_results(&mut self) {
        while let Ok(result) = self.export.receiver.try_recv() {
            match result {
                ExportResult::Saved(path) => {
                    log::info!("Portfolio exported to {path}");
                    self.notice = Some(Notice::info(format!("Portfolio saved to {path}")));
                }
                ExportResult::Failed(error) => {
                    log::warn!("Export failed: {error}");
                    self.notice = Some(Notice::warning(format!("Export failed: {error}")));
                }
            }
        }
    }
}

/// Native target: lets the user pick a destination, then writes the file.
#[cfg(not(target_arch = "wasm32"))]
pub struct SaveDialogDownload {
    sender: Sender<ExportResult>,
    ctx: Option<egui::Context>,
}

#[cfg(not(target_arch = "wasm32"))]
impl DownloadTarget for SaveDialogDownload {
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PortfolioError::Export(format!("no async runtime for save dialog: {e}")))?;
        let artifact = artifact.clone();
        let sender = self.sender.clone();
        let ctx = self.ctx.clone();

        runtime.spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("JSON", &["json"])
                .set_file_name(&artifact.filename)
                .save_file()
                .await
            {
                let result = write_export(handle.path(), &artifact);
                report_export(&sender, ctx.as_ref(), result);
            }
        });
        Ok(())
    }
}

/// Object URL that is revoked when dropped.
#[cfg(target_arch = "wasm32")]
struct ObjectUrl(String);

#[cfg(target_arch = "wasm32")]
impl ObjectUrl {
    fn for_blob(blob: &web_sys::Blob) -> Result<Self> {
        web_sys::Url::create_object_url_with_blob(blob)
            .map(Self)
            .map_err(|_| PortfolioError::Export("Failed to create object URL".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if web_sys::Url::revoke_object_url(&self.0).is_err() {
            log::warn!("Failed to revoke object URL");
        }
    }
}

/// Browser target: triggers a client-side download (Firefox-compatible).
#[cfg(target_arch = "wasm32")]
pub struct BrowserDownload;

#[cfg(target_arch = "wasm32")]
impl DownloadTarget for BrowserDownload {
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<()> {
        use eframe::wasm_bindgen::{JsCast, JsValue};

        let fail = |msg: &str| PortfolioError::Export(msg.to_string());

        let window = web_sys::window().ok_or_else(|| fail("No window found"))?;
        let document = window.document().ok_or_else(|| fail("No document found"))?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&JsValue::from_str(&artifact.contents));
        let blob_options = web_sys::BlobPropertyBag::new();
        blob_options.set_type(artifact.mime_type);
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)
            .map_err(|_| fail("Failed to create blob"))?;

        // Revoked on every return path below
        let url = ObjectUrl::for_blob(&blob)?;

        let anchor = document
            .create_element("a")
            .map_err(|_| fail("Failed to create anchor element"))?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| fail("Failed to cast to anchor element"))?;
        anchor.set_href(&url.0);
        anchor.set_download(&artifact.filename);
        anchor.style().set_property("display", "none").ok();

        let body = document.body().ok_or_else(|| fail("No body found"))?;
        body.append_child(&anchor)
            .map_err(|_| fail("Failed to append anchor"))?;
        anchor.click();
        body.remove_child(&anchor)
            .map_err(|_| fail("Failed to remove anchor"))?;

        Ok(())
    }
}
