//! # Corvid Portfolio
//!
//! A classroom learning portfolio for a unit on corvids. Students record:
//! - **Student info**: name, teacher, school, grade and start date
//! - **Episode reflections**: what they learned and what they still wonder, per episode
//! - **Vocabulary**: definitions and example sentences for the unit's words
//! - **Observations**: a free-form journal plus a freehand sketch
//! - **Self-assessment**: a 0–5 rating per learning goal
//!
//! ## Features
//! - Completion progress derived from every tracked field
//! - Every edit saved to durable local storage
//! - Pen and eraser sketching on a bitmap canvas
//! - JSON export and a short progress summary

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod canvas;
pub mod constants;
pub mod curriculum;
pub mod error;
pub mod export;
pub mod persistence;
pub mod store;
pub mod summary;
mod types;
mod ui;

// Re-export public types and functions
pub use canvas::{DrawingSurface, StrokeState, ToolMode};
pub use curriculum::{Curriculum, EpisodeTemplate};
pub use error::{PortfolioError, Result};
pub use export::{export_filename, export_portfolio, DownloadTarget, ExportArtifact};
pub use persistence::{LoadOutcome, MemoryStorage, PersistenceGateway, StorageBackend};
pub use store::{compute_progress, PortfolioListener, PortfolioStore};
pub use summary::{generate_summary, SummaryReport};
pub use types::*;
pub use ui::{ExportResult, Notice, NoticeKind, PortfolioApp, Section, UiSettings};

/// Runs the portfolio application with default settings.
///
/// The native save dialog used for export runs on the ambient tokio runtime,
/// so call this from within one (see `main.rs`).
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use corvid_portfolio::run_app;
///
/// #[tokio::main]
/// async fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> std::result::Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 820.0])
            .with_app_id(constants::APP_ID),
        ..Default::default()
    };
    eframe::run_native(
        "Corvid Learning Portfolio",
        options,
        Box::new(|cc| Ok(Box::new(PortfolioApp::new(cc)))),
    )
}
