//! Main menu page

use macroquad::prelude::*;

use crate::ui::{self, Rect};
use crate::VERSION;

pub enum MenuAction {
    None,
    Play,
}

/// Draw the menu and report the chosen action
pub fn draw_menu() -> MenuAction {
    let sw = screen_width();
    let sh = screen_height();

    let title = "PRISM QUEST";
    let dims = measure_text(title, None, 64, 1.0);
    draw_text(title, (sw - dims.width) * 0.5, sh * 0.28, 64.0, ui::TEXT_COLOR);

    let tagline = "Learn the elements of a rectangular prism, one drop at a time";
    let dims = measure_text(tagline, None, 22, 1.0);
    draw_text(tagline, (sw - dims.width) * 0.5, sh * 0.28 + 40.0, 22.0, ui::MUTED_COLOR);

    let button_rect = Rect::new(sw * 0.5 - 110.0, sh * 0.45, 220.0, 56.0);
    let mut action = MenuAction::None;
    if ui::button(&button_rect, "PLAY") {
        action = MenuAction::Play;
    }

    let help = [
        "Pick a level and drag the token from the toolbox onto the 3D prism.",
        "Claim every target element to finish. Wrong drops cost accuracy,",
        "and each hint takes 10 points off your final score.",
    ];
    for (i, line) in help.iter().enumerate() {
        let dims = measure_text(line, None, 18, 1.0);
        draw_text(
            line,
            (sw - dims.width) * 0.5,
            sh * 0.62 + i as f32 * 24.0,
            18.0,
            ui::MUTED_COLOR,
        );
    }

    draw_text(&format!("v{}", VERSION), 12.0, sh - 12.0, 16.0, ui::MUTED_COLOR);

    action
}
