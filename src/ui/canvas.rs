//! Sketch canvas widget.
//!
//! This module lays out the drawing surface, mirrors its bitmap into an egui
//! texture and turns pointer input into surface events. A finished stroke is
//! committed to the store once, when the pointer is released or leaves the canvas.

use super::state::PortfolioApp;
use crate::canvas::{StrokeState, ToolMode};
use eframe::egui;

impl PortfolioApp {
    /// Draws the tool row and the canvas, and handles drawing input.
    pub fn draw_sketch_canvas(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut tool = self.surface.tool();
            ui.selectable_value(&mut tool, ToolMode::Pen, "Pen");
            ui.selectable_value(&mut tool, ToolMode::Eraser, "Eraser");
            self.surface.set_tool(tool);

            ui.separator();
            if ui.button("Clear drawing").clicked() {
                self.store.clear_canvas(&mut self.surface);
            }
        });

        if !self.surface.is_available() {
            ui.weak("Drawing is not available on this device.");
            return;
        }

        // Keep the bitmap's aspect ratio while fitting the available width
        let [w, h] = self.surface.size();
        let width = ui.available_width().min(w as f32).max(1.0);
        let size = egui::vec2(width, width * h as f32 / w as f32);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
        let rect = response.rect;
        self.canvas.last_rect = Some(rect);

        self.handle_canvas_pointer(ui, rect);
        self.refresh_canvas_texture(ui.ctx());

        painter.rect_filled(rect, 4.0, egui::Color32::WHITE);
        if let Some(texture) = &self.canvas.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        painter.rect_stroke(
            rect,
            4.0,
            ui.visuals().widgets.noninteractive.bg_stroke,
            egui::StrokeKind::Inside,
        );

        if response.hovered() {
            let cursor = match self.surface.tool() {
                ToolMode::Pen => egui::CursorIcon::Crosshair,
                ToolMode::Eraser => egui::CursorIcon::Cell,
            };
            ui.ctx().set_cursor_icon(cursor);
        }
    }

    /// Feeds this frame's pointer state into the stroke state machine.
    pub fn handle_canvas_pointer(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let (pos, pressed, down) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
            )
        });
        let inside = pos.is_some_and(|p| rect.contains(p));

        let committed = match (self.surface.state(), pos) {
            (StrokeState::Idle, Some(p)) if pressed && inside => {
                self.surface.pointer_down(p, rect);
                None
            }
            (StrokeState::Drawing { .. }, _) if !down => self.surface.pointer_up(),
            (StrokeState::Drawing { .. }, _) if !inside => self.surface.pointer_leave(),
            (StrokeState::Drawing { .. }, Some(p)) => {
                self.surface.pointer_move(p, rect);
                None
            }
            _ => None,
        };

        if let Some(data_uri) = committed {
            self.store.set_canvas_data(data_uri);
        }
    }

    /// Re-uploads the bitmap when the surface changed since the last upload.
    fn refresh_canvas_texture(&mut self, ctx: &egui::Context) {
        let revision = self.surface.revision();
        if self.canvas.texture.is_some() && self.canvas.uploaded_revision == Some(revision) {
            return;
        }
        let Some(pixels) = self.surface.pixels() else {
            return;
        };
        let image = egui::ColorImage::from_rgba_premultiplied(self.surface.size(), pixels);

        match &mut self.canvas.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.canvas.texture =
                    Some(ctx.load_texture("sketch-canvas", image, egui::TextureOptions::LINEAR));
            }
        }
        self.canvas.uploaded_revision = Some(revision);
    }
}
