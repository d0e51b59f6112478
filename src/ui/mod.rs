//! User interface for the learning portfolio.
//!
//! This module contains the main application struct and all panels: the toolbar
//! with progress and section tabs, the notice banner, one form per portfolio
//! section, the sketch canvas and the summary side panel.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main PortfolioApp
//! - `file_ops` - Export delivery for native and WASM
//! - `canvas` - Sketch canvas layout, texture upload and pointer handling

mod canvas;
mod file_ops;
mod state;

pub use file_ops::ExportResult;
pub use state::{Notice, NoticeKind, PortfolioApp, Section, UiSettings};

use crate::constants::{MAX_RATING, UI_SETTINGS_KEY};
use crate::summary::generate_summary;
use crate::types::*;
use eframe::egui;

impl eframe::App for PortfolioApp {
    /// Persist UI preferences between restarts. The portfolio itself is
    /// written on every edit by its persistence gateway.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, UI_SETTINGS_KEY, &self.settings);
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.draw_ui(ctx);
    }
}

impl PortfolioApp {
    /// Lays out and handles one frame of the whole UI.
    pub fn draw_ui(&mut self, ctx: &egui::Context) {
        let visuals = if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.poll_export_results();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        if self.settings.show_summary {
            egui::SidePanel::right("summary_panel")
                .resizable(false)
                .default_width(260.0)
                .show(ctx, |ui| {
                    self.draw_summary_panel(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_notices(ui);
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.settings.section {
                    Section::Student => self.draw_student_section(ui),
                    Section::Episodes => self.draw_episodes_section(ui),
                    Section::Vocabulary => self.draw_vocabulary_section(ui),
                    Section::Observations => self.draw_observations_section(ui),
                    Section::SelfAssessment => self.draw_self_assessment_section(ui),
                });
        });
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Corvid Learning Portfolio");
            ui.separator();

            let progress = self.store.progress();
            ui.add(
                egui::ProgressBar::new(progress as f32 / 100.0)
                    .desired_width(180.0)
                    .text(format!("{progress}% complete")),
            );

            ui.separator();
            if ui
                .selectable_label(self.settings.show_summary, "Summary")
                .clicked()
            {
                self.settings.show_summary = !self.settings.show_summary;
            }
            if ui.button("Export JSON").clicked() {
                self.export_portfolio();
            }
            ui.checkbox(&mut self.settings.dark_mode, "Dark mode");
        });

        ui.horizontal_wrapped(|ui| {
            for section in Section::ALL {
                ui.selectable_value(&mut self.settings.section, section, section.label());
            }
        });
    }

    fn draw_notices(&mut self, ui: &mut egui::Ui) {
        self.banners.notice_dismiss = None;
        self.banners.persist_dismiss = None;

        if let Some(notice) = &self.notice {
            let color = match notice.kind {
                NoticeKind::Info => ui.visuals().hyperlink_color,
                NoticeKind::Warning => ui.visuals().warn_fg_color,
            };
            let dismiss = ui
                .horizontal(|ui| {
                    ui.colored_label(color, notice.message.as_str());
                    ui.small_button("Dismiss")
                })
                .inner;
            self.banners.notice_dismiss = Some(dismiss.rect);
            if dismiss.clicked() {
                self.dismiss_notice();
            }
        }

        if let Some(error) = self.store.last_persist_error() {
            let color = ui.visuals().warn_fg_color;
            let dismiss = ui
                .horizontal(|ui| {
                    ui.colored_label(color, format!("Changes may not be saved: {error}"));
                    ui.small_button("Dismiss")
                })
                .inner;
            self.banners.persist_dismiss = Some(dismiss.rect);
            if dismiss.clicked() {
                self.store.dismiss_persist_error();
            }
        }
    }

    fn draw_student_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("About Me");
        egui::Grid::new("student_info_grid")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for field in StudentField::ALL {
                    ui.label(field.label());
                    let mut value = self.store.data().student_info.get(field).to_string();
                    if ui.text_edit_singleline(&mut value).changed() {
                        self.store.update_student_info(field, value);
                    }
                    ui.end_row();
                }
            });
    }

    fn draw_episodes_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Episode Reflections");
        let episodes = self.store.data().episodes.clone();
        for episode in episodes {
            let marker = if episode.completed { " ✔" } else { "" };
            egui::CollapsingHeader::new(format!("{}. {}{}", episode.id, episode.title, marker))
                .id_salt(("episode", episode.id))
                .show(ui, |ui| {
                    if let Some(description) = self.store.curriculum().episode_description(episode.id) {
                        ui.weak(description);
                    }
                    self.episode_field(ui, &episode, EpisodeField::Date, "Date watched", false);
                    self.episode_field(ui, &episode, EpisodeField::Learning, "What I learned", true);
                    self.episode_field(ui, &episode, EpisodeField::Questions, "Questions I still have", true);
                });
        }
    }

    fn episode_field(
        &mut self,
        ui: &mut egui::Ui,
        episode: &EpisodeReflection,
        field: EpisodeField,
        label: &str,
        multiline: bool,
    ) {
        ui.label(label);
        let mut value = episode.get(field).to_string();
        let edit = if multiline {
            egui::TextEdit::multiline(&mut value).desired_rows(3)
        } else {
            egui::TextEdit::singleline(&mut value)
        };
        if ui.add(edit.desired_width(f32::INFINITY)).changed() {
            if let Err(err) = self.store.update_episode(episode.id, field, value) {
                log::warn!("{err}");
            }
        }
    }

    fn draw_vocabulary_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Vocabulary");
        let words = self.store.data().vocabulary.clone();
        egui::Grid::new("vocabulary_grid")
            .num_columns(3)
            .striped(true)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.strong("Word");
                ui.strong("Definition");
                ui.strong("Example");
                ui.end_row();

                for (index, word) in words.iter().enumerate() {
                    ui.label(word.word.as_str());
                    for field in [VocabularyField::Definition, VocabularyField::Example] {
                        let mut value = word.get(field).to_string();
                        if ui.text_edit_singleline(&mut value).changed() {
                            if let Err(err) = self.store.update_vocabulary(index, field, value) {
                                log::warn!("{err}");
                            }
                        }
                    }
                    ui.end_row();
                }
            });
    }

    fn draw_observations_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Field Observations");
        let mut text = self.store.data().observations.clone();
        let edit = egui::TextEdit::multiline(&mut text)
            .desired_rows(5)
            .desired_width(f32::INFINITY)
            .hint_text("What did you notice about the corvids near you?");
        if ui.add(edit).changed() {
            self.store.set_observations(text);
        }

        ui.add_space(8.0);
        ui.heading("Sketch");
        self.draw_sketch_canvas(ui);
    }

    fn draw_self_assessment_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Self-Assessment");
        ui.weak("0 = not rated yet, 5 = I could teach this");
        let entries = self.store.data().self_assessment.clone();
        egui::Grid::new("self_assessment_grid")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for (index, entry) in entries.iter().enumerate() {
                    ui.label(entry.topic.as_str());
                    ui.horizontal(|ui| {
                        for rating in 0..=MAX_RATING {
                            let clicked = ui
                                .selectable_label(entry.rating == rating, rating.to_string())
                                .clicked();
                            if clicked && entry.rating != rating {
                                if let Err(err) = self.store.update_self_assessment(index, rating) {
                                    log::warn!("{err}");
                                }
                            }
                        }
                    });
                    ui.end_row();
                }
            });
    }

    fn draw_summary_panel(&mut self, ui: &mut egui::Ui) {
        let report = generate_summary(self.store.data());
        ui.heading("Summary");
        ui.separator();
        ui.label(format!(
            "Episodes completed: {}/{}",
            report.episodes_completed, report.episodes_total
        ));
        ui.label(format!(
            "Vocabulary defined: {}/{}",
            report.vocabulary_defined, report.vocabulary_total
        ));
        ui.add(egui::ProgressBar::new(report.progress as f32 / 100.0).show_percentage());
        ui.label(if report.has_observations {
            "Observations recorded"
        } else {
            "No observations yet"
        });
        ui.separator();
        if ui.button("Copy summary").clicked() {
            ui.ctx().copy_text(report.to_string());
        }
        if ui.button("Close").clicked() {
            self.settings.show_summary = false;
        }
    }
}
