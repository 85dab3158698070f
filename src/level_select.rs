//! Level selection page
//!
//! A card per level showing completion status and the best recorded
//! accuracy. Every level is unlocked from the start.

use macroquad::prelude::*;

use crate::level::LevelCatalog;
use crate::progress::PlayerProgress;
use crate::ui::{self, Rect};

pub enum SelectAction {
    None,
    StartLevel(u32),
    Back,
}

const CARD_W: f32 = 220.0;
const CARD_H: f32 = 130.0;
const CARD_GAP: f32 = 20.0;
const COLUMNS: usize = 3;

/// Draw the level grid and report the chosen action
pub fn draw_level_select(catalog: &LevelCatalog, progress: &PlayerProgress) -> SelectAction {
    let sw = screen_width();

    let title = "SELECT LEVEL";
    let dims = measure_text(title, None, 40, 1.0);
    draw_text(title, (sw - dims.width) * 0.5, 70.0, 40.0, ui::TEXT_COLOR);

    let grid_w = COLUMNS as f32 * CARD_W + (COLUMNS - 1) as f32 * CARD_GAP;
    let origin_x = (sw - grid_w) * 0.5;
    let origin_y = 110.0;

    let mut action = SelectAction::None;

    for (i, level) in catalog.levels().iter().enumerate() {
        let col = i % COLUMNS;
        let row = i / COLUMNS;
        let rect = Rect::new(
            origin_x + col as f32 * (CARD_W + CARD_GAP),
            origin_y + row as f32 * (CARD_H + CARD_GAP),
            CARD_W,
            CARD_H,
        );

        let completed = progress.is_completed(level.id);
        let over = ui::hovered(&rect);

        let bg = if completed {
            Color::new(0.86, 0.96, 0.86, 1.0)
        } else {
            ui::PANEL_BG
        };
        ui::draw_panel(&rect, bg);
        if over {
            draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 3.0, ui::ACCENT_COLOR);
        }

        draw_text(
            &format!("LEVEL {}", level.id),
            rect.x + 14.0,
            rect.y + 30.0,
            26.0,
            ui::TEXT_COLOR,
        );
        draw_text(&level.title, rect.x + 14.0, rect.y + 56.0, 18.0, ui::MUTED_COLOR);

        let status = if completed { "DONE" } else { "OPEN" };
        draw_text(status, rect.x + 14.0, rect.y + 84.0, 18.0, ui::TEXT_COLOR);

        if let Some(best) = progress.best(level.id) {
            draw_text(
                &format!("Best: {}% in {}s", best.accuracy, best.time),
                rect.x + 14.0,
                rect.y + 110.0,
                18.0,
                ui::ACCENT_COLOR,
            );
        }

        if over && is_mouse_button_pressed(MouseButton::Left) {
            action = SelectAction::StartLevel(level.id);
        }
    }

    let back_rect = Rect::new(20.0, 20.0, 110.0, 40.0);
    if ui::button(&back_rect, "< MENU") {
        action = SelectAction::Back;
    }

    action
}
