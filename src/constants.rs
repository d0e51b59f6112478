//! Shared application-wide constants.
//! Centralizes tweakable values used by the store, the drawing surface and the UI.

// Persistence
/// Key under which the portfolio blob is stored in durable storage.
pub const STORAGE_KEY: &str = "corvidPortfolioData";
/// Key used for UI preferences in eframe's own storage.
pub const UI_SETTINGS_KEY: &str = "ui_settings";
/// Application id, also used to locate the native storage directory.
pub const APP_ID: &str = "corvid_portfolio";

// Progress
/// Number of student-info fields counted towards progress.
pub const STUDENT_INFO_FIELDS: usize = 5;
/// Tracked fields per episode (learning + questions).
pub const FIELDS_PER_EPISODE: usize = 2;
/// Tracked fields per vocabulary word (definition + example).
pub const FIELDS_PER_WORD: usize = 2;
/// The observations journal counts as a single field.
pub const OBSERVATION_FIELDS: usize = 1;
/// Highest self-assessment rating.
pub const MAX_RATING: u8 = 5;

// Drawing surface
/// Bitmap width in pixels.
pub const CANVAS_WIDTH: u32 = 800;
/// Bitmap height in pixels.
pub const CANVAS_HEIGHT: u32 = 500;
/// Pen stroke width in bitmap pixels.
pub const PEN_WIDTH: f32 = 3.0;
/// Eraser stroke width in bitmap pixels.
pub const ERASER_WIDTH: f32 = 20.0;
/// Pen colour (slate-800).
pub const PEN_COLOR: [u8; 3] = [0x1f, 0x29, 0x37];
/// Prefix of every committed canvas snapshot.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

// Export
/// Suffix appended to the sanitized student name.
pub const EXPORT_SUFFIX: &str = "_Corvid_Portfolio.json";
/// Name used when the student has not entered one.
pub const EXPORT_FALLBACK_NAME: &str = "Student";
