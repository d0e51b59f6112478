//! Application state management structures.
//!
//! This module contains the main `PortfolioApp` together with the UI-only state
//! around it: persisted preferences, the canvas texture cache, notices and the
//! channel that brings export results back from async dialogs.

use super::file_ops::{default_download_target, ExportResult};
use crate::canvas::DrawingSurface;
use crate::constants::UI_SETTINGS_KEY;
use crate::curriculum::Curriculum;
use crate::error::PortfolioError;
use crate::export::DownloadTarget;
use crate::persistence::{LoadOutcome, MemoryStorage, PersistenceGateway, StorageBackend};
use crate::store::PortfolioStore;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Sections of the portfolio shown as tabs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Section {
    /// Student identity fields
    Student,
    /// Episode reflections
    Episodes,
    /// Vocabulary list
    Vocabulary,
    /// Observations journal and sketch canvas
    Observations,
    /// Self-assessment ratings
    SelfAssessment,
}

impl Section {
    /// Every section, in tab order.
    pub const ALL: [Section; 5] = [
        Section::Student,
        Section::Episodes,
        Section::Vocabulary,
        Section::Observations,
        Section::SelfAssessment,
    ];

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            Section::Student => "Student",
            Section::Episodes => "Episodes",
            Section::Vocabulary => "Vocabulary",
            Section::Observations => "Observations & Sketch",
            Section::SelfAssessment => "Self-Assessment",
        }
    }
}

/// UI preferences persisted through eframe's storage, separate from the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Last opened section
    pub section: Section,
    /// Whether the summary panel is open
    pub show_summary: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            section: Section::Student,
            show_summary: false,
        }
    }
}

/// Texture cache for the sketch canvas.
#[derive(Default)]
pub struct CanvasView {
    /// GPU texture mirroring the drawing surface
    pub texture: Option<egui::TextureHandle>,
    /// Surface revision last uploaded into `texture`
    pub uploaded_revision: Option<u64>,
    /// Where the canvas was laid out in the last frame
    pub last_rect: Option<egui::Rect>,
}

/// Where the banners' Dismiss buttons were laid out in the last frame.
#[derive(Default)]
pub struct BannerView {
    /// Dismiss button of the general notice
    pub notice_dismiss: Option<egui::Rect>,
    /// Dismiss button of the persist-failure banner
    pub persist_dismiss: Option<egui::Rect>,
}

/// Severity of a banner notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Something went well (e.g. export finished)
    Info,
    /// Non-fatal problem the user should know about
    Warning,
}

/// A dismissible banner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub kind: NoticeKind,
    /// Text shown to the user
    pub message: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }
}

/// Export plumbing: where files go and how async results come back.
pub struct ExportState {
    /// Platform download target
    pub target: Box<dyn DownloadTarget>,
    /// Sender handed to async save dialogs
    pub sender: Sender<ExportResult>,
    /// Receiver drained every frame
    pub receiver: Receiver<ExportResult>,
}

impl ExportState {
    fn with_default_target(ctx: Option<egui::Context>) -> Self {
        let (sender, receiver) = channel();
        Self {
            target: default_download_target(sender.clone(), ctx),
            sender,
            receiver,
        }
    }
}

/// The main application structure: the portfolio store plus UI state.
///
/// This struct implements the `eframe::App` trait and handles all user interface
/// rendering and interaction logic.
pub struct PortfolioApp {
    /// Owner of the portfolio aggregate
    pub store: PortfolioStore,
    /// Bitmap behind the sketch canvas
    pub surface: DrawingSurface,
    /// Persisted UI preferences
    pub settings: UiSettings,
    /// Canvas texture cache
    pub canvas: CanvasView,
    /// Banner shown above the content until dismissed
    pub notice: Option<Notice>,
    /// Banner button layout
    pub banners: BannerView,
    /// Export target and result channel
    pub export: ExportState,
}

impl PortfolioApp {
    /// Builds the app from eframe's creation context.
    ///
    /// UI preferences come from eframe's storage; the portfolio comes from the
    /// platform's durable storage through a [`PersistenceGateway`].
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<UiSettings>(storage, UI_SETTINGS_KEY))
            .unwrap_or_default();
        let curriculum = Curriculum::default();

        #[cfg(not(target_arch = "wasm32"))]
        let opened = crate::persistence::FileStorage::default_location()
            .map(|storage| Self::open_store(storage, curriculum.clone()));
        #[cfg(target_arch = "wasm32")]
        let opened = crate::persistence::LocalStorage::new()
            .map(|storage| Self::open_store(storage, curriculum.clone()));

        let mut app = match opened {
            Some((store, notice)) => Self::from_parts(store, settings, notice),
            None => Self::without_durable_storage(curriculum, settings),
        };
        app.export = ExportState::with_default_target(Some(cc.egui_ctx.clone()));
        app
    }

    /// Builds the app over in-memory storage when the platform has none.
    pub fn without_durable_storage(curriculum: Curriculum, settings: UiSettings) -> Self {
        log::warn!("No durable storage available; portfolio changes will not be kept");
        let (store, _) = Self::open_store(MemoryStorage::new(), curriculum);
        let mut app = Self::from_parts(store, settings, None);
        app.notice = Some(Notice::warning(
            "No durable storage is available on this device. Changes will be lost when the app closes.",
        ));
        app
    }

    /// Loads the portfolio from `backend` and subscribes a gateway for writes.
    pub fn open_store<B: StorageBackend + 'static>(
        backend: B,
        curriculum: Curriculum,
    ) -> (PortfolioStore, Option<PortfolioError>) {
        let gateway = PersistenceGateway::new(backend, curriculum.clone());
        let LoadOutcome { data, notice } = gateway.load();
        let mut store = PortfolioStore::new(curriculum, data);
        store.subscribe(Box::new(gateway));
        (store, notice)
    }

    /// Assembles the app around an already opened store.
    ///
    /// The drawing surface is restored from the store's committed snapshot.
    pub fn from_parts(
        store: PortfolioStore,
        settings: UiSettings,
        load_notice: Option<PortfolioError>,
    ) -> Self {
        let mut surface = DrawingSurface::default();
        let mut notice = load_notice.map(|err| {
            Notice::warning(format!("{err}. Starting with a blank portfolio."))
        });
        if let Err(err) = surface.restore(&store.data().canvas_data) {
            log::warn!("Could not restore sketch: {err}");
            notice.get_or_insert_with(|| Notice::warning(format!("Could not restore sketch: {err}")));
        }

        Self {
            store,
            surface,
            settings,
            canvas: CanvasView::default(),
            notice,
            banners: BannerView::default(),
            export: ExportState::with_default_target(None),
        }
    }

    /// Hides the current notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Replaces the download target (e.g. in tests or embedding hosts).
    pub fn set_download_target(&mut self, target: Box<dyn DownloadTarget>) {
        self.export.target = target;
    }
}
