//! Game level page
//!
//! Hosts one level session: the 3D viewport, the draggable token, the
//! HUD stats, hint and feedback popups, and the completion overlay.
//! Immediate-mode: `frame` draws everything and reports the navigation
//! action the player chose.

use macroquad::prelude::*;

use crate::level::LevelDef;
use crate::model::PrismModel;
use crate::progress::{BestScore, PlayerProgress, ProgressStore};
use crate::scene::{self, OrbitCamera};
use crate::session::{Feedback, LevelSession, MAX_HINTS};
use crate::ui::{self, Rect};

/// How long found elements celebrate after completion
const CELEBRATION_SECS: f64 = 1.0;

/// Delay from completion to the score overlay
const OVERLAY_DELAY_SECS: f64 = 1.5;

const HUD_H: f32 = 96.0;

pub enum GameAction {
    None,
    /// Back to level selection, discarding the session
    Exit,
    /// Restart the same level
    Replay,
    /// Advance to the next level (or level selection if none)
    Advance,
}

struct ActiveFeedback {
    feedback: Feedback,
    expires_at: f64,
}

/// State for one visit to the game page
pub struct GamePage {
    session: LevelSession,
    model: PrismModel,
    camera: OrbitCamera,
    dragging_token: bool,
    orbit_anchor: Option<(f32, f32)>,
    feedback: Option<ActiveFeedback>,
    /// Set when the session completes; drives celebration and overlay
    completed_at: Option<f64>,
}

impl GamePage {
    pub fn new(level: &LevelDef, now: f64) -> Self {
        Self {
            session: LevelSession::new(level, now),
            model: PrismModel::new(),
            camera: OrbitCamera::new(),
            dragging_token: false,
            orbit_anchor: None,
            feedback: None,
            completed_at: None,
        }
    }

    pub fn level_id(&self) -> u32 {
        self.session.level().id
    }

    /// Run one frame: draw the page, process input, advance timers.
    pub fn frame(
        &mut self,
        progress: &mut PlayerProgress,
        store: &ProgressStore,
        now: f64,
    ) -> GameAction {
        let sw = screen_width();
        let sh = screen_height();
        let (mx, my) = mouse_position();

        let hud = Rect::new(0.0, 0.0, sw, HUD_H);
        let toolbox = Rect::new(sw - 230.0, HUD_H + 12.0, 218.0, 180.0);
        let token_card = Rect::new(toolbox.x + 12.0, toolbox.y + 56.0, toolbox.w - 24.0, 86.0);

        // Drive the pending completion transition; the session ignores the
        // call until the delay has elapsed, and fires exactly once.
        if let Some(summary) = self.session.poll(now) {
            progress.record_completion(
                self.level_id(),
                BestScore {
                    accuracy: summary.final_accuracy,
                    time: summary.time_taken,
                    hints: summary.hints_used,
                },
            );
            store.save(progress);
            self.completed_at = Some(now);
            self.dragging_token = false;
            self.feedback = None;
        }

        // Expire feedback
        if self.feedback.as_ref().is_some_and(|f| now >= f.expires_at) {
            self.feedback = None;
        }

        let celebrating = self
            .completed_at
            .is_some_and(|t| now - t < CELEBRATION_SECS);
        let overlay_open = self
            .completed_at
            .is_some_and(|t| now - t >= OVERLAY_DELAY_SECS);

        // === 3D scene ===
        set_camera(&self.camera.to_camera3d());
        scene::draw_model(&self.model, &self.session, now, celebrating);
        set_default_camera();
        scene::draw_vertex_labels(&self.model, &self.camera);

        // === Input over the viewport ===
        let over_ui = hud.contains(mx, my)
            || toolbox.contains(mx, my)
            || overlay_open
            || self
                .feedback
                .as_ref()
                .is_some_and(|_| feedback_rect(sw, sh).contains(mx, my));

        if !overlay_open {
            if self.dragging_token {
                if is_mouse_button_down(MouseButton::Left) {
                    if over_ui {
                        self.session.clear_hover();
                    } else {
                        let ray = self.camera.screen_ray(mx, my, sw, sh);
                        self.session.handle_drag_over(&ray, &self.model);
                    }
                } else {
                    // Token released
                    self.dragging_token = false;
                    self.session.clear_hover();
                    if !over_ui {
                        let ray = self.camera.screen_ray(mx, my, sw, sh);
                        if let Some(feedback) = self.session.handle_drop(&ray, &self.model, now) {
                            let expires_at = now + feedback.dismiss_after();
                            self.feedback = Some(ActiveFeedback { feedback, expires_at });
                        }
                    }
                }
            } else {
                // Camera orbit and zoom
                if is_mouse_button_pressed(MouseButton::Left) && !over_ui {
                    self.orbit_anchor = Some((mx, my));
                }
                if is_mouse_button_down(MouseButton::Left) {
                    if let Some((ax, ay)) = self.orbit_anchor {
                        self.camera.orbit(mx - ax, my - ay);
                        self.orbit_anchor = Some((mx, my));
                    }
                } else {
                    self.orbit_anchor = None;
                }
                if !over_ui {
                    let (_, scroll_y) = mouse_wheel();
                    if scroll_y != 0.0 {
                        self.camera.zoom(scroll_y.signum());
                    }
                }
            }
        }

        // === HUD ===
        let mut action = self.draw_hud(&hud, now);
        self.draw_toolbox(&toolbox, &token_card);

        if self.dragging_token {
            let level = self.session.level();
            draw_text(&level.token_icon, mx - 8.0, my + 8.0, 40.0, ui::ACCENT_COLOR);
        }

        let mut dismiss_feedback = false;
        if let Some(active) = &self.feedback {
            dismiss_feedback = self.draw_feedback(sw, sh, &active.feedback);
        }
        if dismiss_feedback {
            self.feedback = None;
        }

        if overlay_open {
            if let Some(overlay_action) = self.draw_completion_overlay(sw, sh) {
                action = overlay_action;
            }
        }

        action
    }

    fn draw_hud(&mut self, hud: &Rect, now: f64) -> GameAction {
        let level = self.session.level();
        ui::draw_panel(hud, ui::PANEL_BG);

        draw_text(&format!("LEVEL {}", level.id), 20.0, 32.0, 30.0, ui::TEXT_COLOR);
        draw_text(&level.title, 20.0, 58.0, 22.0, ui::ACCENT_COLOR);
        draw_text(&level.description, 20.0, 82.0, 18.0, ui::MUTED_COLOR);

        // Live stats, recomputed every frame
        let stats = format!(
            "ACCURACY {}/{} ({}%)   HINTS {}/{}   TIME {}",
            self.session.correct_attempts(),
            self.session.attempts(),
            self.session.accuracy(),
            self.session.hints_used(),
            MAX_HINTS,
            format_time(self.session.elapsed_secs(now)),
        );
        let dims = measure_text(&stats, None, 20, 1.0);
        draw_text(&stats, hud.right() - dims.width - 270.0, 36.0, 20.0, ui::TEXT_COLOR);

        let mut action = GameAction::None;

        let back_rect = Rect::new(hud.right() - 120.0, 24.0, 100.0, 40.0);
        if ui::button(&back_rect, "< BACK") {
            action = GameAction::Exit;
        }

        let hint_rect = Rect::new(hud.right() - 250.0, 24.0, 120.0, 40.0);
        let hints_left = self.session.hints_used() < MAX_HINTS;
        let label = format!("HINT {}/{}", self.session.hints_used(), MAX_HINTS);
        if ui::button_enabled(&hint_rect, &label, hints_left) {
            self.session.request_hint(now);
        }

        action
    }

    fn draw_toolbox(&mut self, toolbox: &Rect, token_card: &Rect) {
        let level = self.session.level();
        ui::draw_panel(toolbox, ui::PANEL_BG);
        draw_text("TOOLBOX", toolbox.x + 12.0, toolbox.y + 28.0, 22.0, ui::TEXT_COLOR);
        draw_text(
            "drag onto the prism",
            toolbox.x + 12.0,
            toolbox.y + 48.0,
            16.0,
            ui::MUTED_COLOR,
        );

        let over = ui::hovered(token_card);
        let bg = if self.dragging_token {
            Color::new(0.85, 0.92, 1.0, 1.0)
        } else if over {
            Color::new(0.92, 0.96, 1.0, 1.0)
        } else {
            WHITE
        };
        ui::draw_panel(token_card, bg);
        ui::draw_centered_text(
            &Rect::new(token_card.x, token_card.y + 8.0, token_card.w, 36.0),
            &level.token_icon,
            34.0,
            ui::ACCENT_COLOR,
        );
        ui::draw_centered_text(
            &Rect::new(token_card.x, token_card.y + 48.0, token_card.w, 28.0),
            &level.token_name,
            20.0,
            ui::TEXT_COLOR,
        );

        if over && is_mouse_button_pressed(MouseButton::Left) && !self.session.is_complete() {
            self.dragging_token = true;
        }
    }

    /// Draw the feedback popup; returns true when dismissed via its button
    fn draw_feedback(&self, sw: f32, sh: f32, feedback: &Feedback) -> bool {
        let rect = feedback_rect(sw, sh);
        let bg = if feedback.is_success {
            Color::new(0.88, 0.97, 0.88, 1.0)
        } else {
            Color::new(0.99, 0.9, 0.9, 1.0)
        };
        ui::draw_panel(&rect, bg);

        let headline = if feedback.is_success { "CORRECT!" } else { "WRONG!" };
        draw_text(headline, rect.x + 16.0, rect.y + 32.0, 26.0, ui::TEXT_COLOR);
        draw_text(&feedback.message, rect.x + 16.0, rect.y + 60.0, 18.0, ui::TEXT_COLOR);

        let ok_rect = Rect::new(rect.right() - 76.0, rect.bottom() - 48.0, 60.0, 32.0);
        ui::button(&ok_rect, "OK")
    }

    fn draw_completion_overlay(&self, sw: f32, sh: f32) -> Option<GameAction> {
        let Some(summary) = self.session.summary() else {
            return None;
        };

        // Dim the scene
        draw_rectangle(0.0, 0.0, sw, sh, Color::new(0.0, 0.0, 0.0, 0.45));

        let panel = Rect::new(sw * 0.5 - 220.0, sh * 0.5 - 160.0, 440.0, 320.0);
        ui::draw_panel(&panel, WHITE);

        ui::draw_centered_text(
            &Rect::new(panel.x, panel.y + 16.0, panel.w, 40.0),
            &format!("LEVEL {} COMPLETE!", self.level_id()),
            32.0,
            ui::TEXT_COLOR,
        );

        let lines = [
            format!("Accuracy: {}%", summary.final_accuracy),
            format!("Time: {}", format_time(summary.time_taken)),
            format!("Hints: {}/{}", summary.hints_used, MAX_HINTS),
        ];
        for (i, line) in lines.iter().enumerate() {
            ui::draw_centered_text(
                &Rect::new(panel.x, panel.y + 80.0 + i as f32 * 36.0, panel.w, 30.0),
                line,
                24.0,
                ui::TEXT_COLOR,
            );
        }

        let again_rect = Rect::new(panel.x + 30.0, panel.bottom() - 70.0, 170.0, 48.0);
        if ui::button(&again_rect, "PLAY AGAIN") {
            return Some(GameAction::Replay);
        }

        let next_rect = Rect::new(panel.right() - 200.0, panel.bottom() - 70.0, 170.0, 48.0);
        if ui::button(&next_rect, "NEXT") {
            return Some(GameAction::Advance);
        }

        None
    }
}

fn feedback_rect(sw: f32, sh: f32) -> Rect {
    Rect::new(sw * 0.5 - 230.0, sh - 150.0, 460.0, 110.0)
}

/// mm:ss formatting for elapsed and final times
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
