//! Freehand drawing surface.
//!
//! A fixed-size `tiny_skia` bitmap that records pen and eraser strokes. Pointer
//! input drives an explicit two-state machine: a stroke starts on pointer-down,
//! every move appends a segment, and pointer-up or leaving the surface ends it.
//! Ending a stroke yields the bitmap as a PNG data URI, which the caller commits
//! to the portfolio store (one commit per stroke, never per move).

use crate::constants::*;
use crate::error::{PortfolioError, Result};
use base64::Engine;
use eframe::egui::{Pos2, Rect};
use tiny_skia::{
    BlendMode, Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

/// Which tool the next stroke uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Paint with the pen colour (source-over)
    #[default]
    Pen,
    /// Clear pixels along the stroke (destination-out)
    Eraser,
}

impl ToolMode {
    /// Stroke width in bitmap pixels.
    pub fn width(self) -> f32 {
        match self {
            ToolMode::Pen => PEN_WIDTH,
            ToolMode::Eraser => ERASER_WIDTH,
        }
    }

    /// Compositing rule used for this tool.
    pub fn blend_mode(self) -> BlendMode {
        match self {
            ToolMode::Pen => BlendMode::SourceOver,
            ToolMode::Eraser => BlendMode::DestinationOut,
        }
    }

    fn paint(self) -> Paint<'static> {
        let mut paint = Paint::default();
        let [r, g, b] = PEN_COLOR;
        // Destination-out only reads source alpha, so the eraser reuses the pen colour.
        paint.set_color_rgba8(r, g, b, 255);
        paint.blend_mode = self.blend_mode();
        paint.anti_alias = true;
        paint
    }

    fn stroke(self) -> Stroke {
        Stroke {
            width: self.width(),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        }
    }
}

/// Stroke lifecycle of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    /// No pointer is held on the surface
    #[default]
    Idle,
    /// A stroke is in progress
    Drawing {
        /// Last recorded point in bitmap coordinates
        last: Pos2,
        /// Tool the stroke was started with
        tool: ToolMode,
    },
}

/// Bitmap-backed canvas for freehand sketches.
pub struct DrawingSurface {
    /// `None` when the host could not allocate a bitmap
    pixmap: Option<Pixmap>,
    tool: ToolMode,
    state: StrokeState,
    /// Bumped whenever pixels change, so views know when to re-upload
    revision: u64,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl DrawingSurface {
    /// Creates a transparent surface of the given size.
    ///
    /// A zero-sized request yields an unavailable surface on which every
    /// operation is a no-op.
    pub fn new(width: u32, height: u32) -> Self {
        let pixmap = Pixmap::new(width, height);
        if pixmap.is_none() {
            log::warn!("{} ({}x{})", PortfolioError::DrawingSurfaceUnavailable, width, height);
        }
        Self {
            pixmap,
            tool: ToolMode::default(),
            state: StrokeState::Idle,
            revision: 0,
        }
    }

    /// Whether a bitmap backs this surface.
    pub fn is_available(&self) -> bool {
        self.pixmap.is_some()
    }

    /// Bitmap size in pixels, `[0, 0]` when unavailable.
    pub fn size(&self) -> [usize; 2] {
        self.pixmap
            .as_ref()
            .map_or([0, 0], |p| [p.width() as usize, p.height() as usize])
    }

    /// Premultiplied RGBA pixel data.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.pixmap.as_ref().map(|p| p.data())
    }

    /// Counter that changes whenever the bitmap does.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The tool used by the next stroke.
    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Selects the tool for subsequent strokes.
    pub fn set_tool(&mut self, tool: ToolMode) {
        self.tool = tool;
    }

    /// Current stroke state.
    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Maps a screen position into bitmap coordinates.
    ///
    /// The surface may be displayed at any size, so the offset from the
    /// on-screen origin is scaled by bitmap size over displayed size.
    pub fn to_surface_coords(&self, screen: Pos2, bounds: Rect) -> Option<Pos2> {
        let [w, h] = self.size();
        if w == 0 || h == 0 || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return None;
        }
        let offset = screen - bounds.min;
        Some(Pos2::new(
            offset.x * w as f32 / bounds.width(),
            offset.y * h as f32 / bounds.height(),
        ))
    }

    /// Idle → Drawing. Ignored while a stroke is already in progress.
    pub fn pointer_down(&mut self, screen: Pos2, bounds: Rect) {
        if !matches!(self.state, StrokeState::Idle) {
            return;
        }
        if let Some(point) = self.to_surface_coords(screen, bounds) {
            self.state = StrokeState::Drawing {
                last: point,
                tool: self.tool,
            };
        }
    }

    /// Appends a segment from the previous point while Drawing.
    pub fn pointer_move(&mut self, screen: Pos2, bounds: Rect) {
        let StrokeState::Drawing { last, tool } = self.state else {
            return;
        };
        let Some(point) = self.to_surface_coords(screen, bounds) else {
            return;
        };
        if point == last {
            return;
        }
        self.draw_segment(last, point, tool);
        self.state = StrokeState::Drawing { last: point, tool };
    }

    /// Drawing → Idle. Returns the data URI to commit, if a stroke ended.
    pub fn pointer_up(&mut self) -> Option<String> {
        self.finish_stroke()
    }

    /// The pointer left the surface; ends the stroke exactly like pointer-up.
    pub fn pointer_leave(&mut self) -> Option<String> {
        self.finish_stroke()
    }

    fn finish_stroke(&mut self) -> Option<String> {
        if matches!(self.state, StrokeState::Idle) {
            return None;
        }
        self.state = StrokeState::Idle;
        match self.to_data_uri() {
            Ok(uri) => Some(uri),
            Err(err) => {
                log::warn!("Stroke not committed: {err}");
                None
            }
        }
    }

    fn draw_segment(&mut self, from: Pos2, to: Pos2, tool: ToolMode) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        let Some(path) = pb.finish() else {
            return;
        };
        pixmap.stroke_path(&path, &tool.paint(), &tool.stroke(), Transform::identity(), None);
        self.revision += 1;
    }

    /// Wipes the whole bitmap and abandons any stroke in progress.
    pub fn clear(&mut self) {
        self.state = StrokeState::Idle;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::TRANSPARENT);
            self.revision += 1;
        }
    }

    /// Serializes the bitmap as a `data:image/png;base64,` URI.
    pub fn to_data_uri(&self) -> Result<String> {
        let pixmap = self
            .pixmap
            .as_ref()
            .ok_or(PortfolioError::DrawingSurfaceUnavailable)?;
        let png = pixmap
            .encode_png()
            .map_err(|e| PortfolioError::CanvasEncode(e.to_string()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        Ok(format!("{PNG_DATA_URI_PREFIX}{encoded}"))
    }

    /// Replaces the bitmap with a previously committed data URI.
    ///
    /// An empty string clears the surface. On error the surface is left blank.
    pub fn restore(&mut self, data_uri: &str) -> Result<()> {
        self.clear();
        if data_uri.is_empty() {
            return Ok(());
        }
        let pixmap = self
            .pixmap
            .as_mut()
            .ok_or(PortfolioError::DrawingSurfaceUnavailable)?;
        let encoded = data_uri.strip_prefix(PNG_DATA_URI_PREFIX).ok_or_else(|| {
            PortfolioError::CanvasEncode("not a base64 PNG data URI".to_string())
        })?;
        let png = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| PortfolioError::CanvasEncode(e.to_string()))?;
        let snapshot =
            Pixmap::decode_png(&png).map_err(|e| PortfolioError::CanvasEncode(e.to_string()))?;
        pixmap.draw_pixmap(
            0,
            0,
            snapshot.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        self.revision += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn bounds() -> Rect {
        Rect::from_min_size(pos2(100.0, 50.0), vec2(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32))
    }

    fn alpha_at(surface: &DrawingSurface, x: usize, y: usize) -> u8 {
        let [w, _] = surface.size();
        surface.pixels().unwrap()[(y * w + x) * 4 + 3]
    }

    fn draw_line(surface: &mut DrawingSurface, from: Pos2, to: Pos2) -> Option<String> {
        surface.pointer_down(from, bounds());
        surface.pointer_move(to, bounds());
        surface.pointer_up()
    }

    #[test]
    fn test_stroke_state_machine() {
        let mut surface = DrawingSurface::default();
        assert_eq!(surface.state(), StrokeState::Idle);

        surface.pointer_down(pos2(110.0, 60.0), bounds());
        assert!(matches!(
            surface.state(),
            StrokeState::Drawing { last, tool: ToolMode::Pen } if last == pos2(10.0, 10.0)
        ));

        surface.pointer_move(pos2(150.0, 60.0), bounds());
        assert!(matches!(
            surface.state(),
            StrokeState::Drawing { last, .. } if last == pos2(50.0, 10.0)
        ));

        let committed = surface.pointer_up();
        assert!(committed.is_some());
        assert_eq!(surface.state(), StrokeState::Idle);
    }

    #[test]
    fn test_pointer_up_while_idle_commits_nothing() {
        let mut surface = DrawingSurface::default();
        assert!(surface.pointer_up().is_none());
        assert!(surface.pointer_leave().is_none());
        // Moves without a pointer-down do not paint
        surface.pointer_move(pos2(200.0, 200.0), bounds());
        assert_eq!(surface.revision(), 0);
    }

    #[test]
    fn test_pointer_leave_ends_stroke() {
        let mut surface = DrawingSurface::default();
        surface.pointer_down(pos2(120.0, 70.0), bounds());
        surface.pointer_move(pos2(180.0, 70.0), bounds());

        let committed = surface.pointer_leave();
        assert!(committed.unwrap().starts_with(PNG_DATA_URI_PREFIX));
        assert_eq!(surface.state(), StrokeState::Idle);
    }

    #[test]
    fn test_pen_paints_and_eraser_clears() {
        let mut surface = DrawingSurface::default();
        draw_line(&mut surface, pos2(100.0, 150.0), pos2(400.0, 150.0));
        assert!(alpha_at(&surface, 150, 100) > 0);
        // Far from the line stays transparent
        assert_eq!(alpha_at(&surface, 150, 300), 0);

        surface.set_tool(ToolMode::Eraser);
        draw_line(&mut surface, pos2(200.0, 150.0), pos2(300.0, 150.0));
        assert_eq!(alpha_at(&surface, 150, 100), 0);
        // Outside the eraser path the pen stroke survives
        assert!(alpha_at(&surface, 50, 100) > 0);
    }

    #[test]
    fn test_coordinates_follow_display_scaling() {
        let surface = DrawingSurface::default();
        // Surface displayed at half size
        let half = Rect::from_min_size(pos2(10.0, 20.0), vec2(400.0, 250.0));

        let mapped = surface.to_surface_coords(pos2(210.0, 145.0), half).unwrap();
        assert_eq!(mapped, pos2(400.0, 250.0));

        let origin = surface.to_surface_coords(pos2(10.0, 20.0), half).unwrap();
        assert_eq!(origin, pos2(0.0, 0.0));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut surface = DrawingSurface::default();
        draw_line(&mut surface, pos2(120.0, 80.0), pos2(300.0, 200.0));

        surface.clear();
        let once = surface.pixels().unwrap().to_vec();
        let once_uri = surface.to_data_uri().unwrap();
        surface.clear();

        assert_eq!(surface.pixels().unwrap(), once.as_slice());
        assert_eq!(surface.to_data_uri().unwrap(), once_uri);
        assert!(once.iter().all(|b| *b == 0));
        assert_eq!(surface.state(), StrokeState::Idle);
    }

    #[test]
    fn test_restore_reproduces_committed_bitmap() {
        let mut surface = DrawingSurface::default();
        let uri = draw_line(&mut surface, pos2(130.0, 90.0), pos2(500.0, 300.0)).unwrap();
        let original = surface.pixels().unwrap().to_vec();

        let mut restored = DrawingSurface::default();
        restored.restore(&uri).unwrap();

        // PNG stores unpremultiplied colour, so allow off-by-one rounding
        let restored = restored.pixels().unwrap();
        assert_eq!(restored.len(), original.len());
        assert!(restored
            .iter()
            .zip(&original)
            .all(|(a, b)| a.abs_diff(*b) <= 1));
        assert!(restored.iter().any(|b| *b > 0));
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let mut surface = DrawingSurface::default();
        assert!(surface.restore("data:image/jpeg;base64,AAAA").is_err());
        assert!(surface.restore("data:image/png;base64,@@@").is_err());
        assert!(surface.restore("").is_ok());
        assert!(surface.pixels().unwrap().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_unavailable_surface_is_noop() {
        let mut surface = DrawingSurface::new(0, 0);
        assert!(!surface.is_available());

        surface.pointer_down(pos2(10.0, 10.0), bounds());
        surface.pointer_move(pos2(20.0, 20.0), bounds());
        assert_eq!(surface.state(), StrokeState::Idle);
        assert!(surface.pointer_up().is_none());
        surface.clear();
        assert!(matches!(
            surface.to_data_uri(),
            Err(PortfolioError::DrawingSurfaceUnavailable)
        ));
    }
}
