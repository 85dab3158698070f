//! Minimal immediate-mode UI helpers: rectangles, buttons, panels

use macroquad::prelude::*;

/// Accent color used across pages
pub const ACCENT_COLOR: Color = Color::new(0.0, 0.45, 0.85, 1.0);

/// Panel background
pub const PANEL_BG: Color = Color::new(1.0, 1.0, 1.0, 0.92);

pub const TEXT_COLOR: Color = Color::new(0.15, 0.15, 0.18, 1.0);
pub const MUTED_COLOR: Color = Color::new(0.45, 0.45, 0.5, 1.0);

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h * 0.5
    }

    /// Check if point is inside
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Whether the mouse is over the rect this frame
pub fn hovered(rect: &Rect) -> bool {
    let (mx, my) = mouse_position();
    rect.contains(mx, my)
}

/// Draw a filled panel with a thin border
pub fn draw_panel(rect: &Rect, bg: Color) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, bg);
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, Color::new(0.7, 0.7, 0.75, 1.0));
}

/// Draw text centered in a rect
pub fn draw_centered_text(rect: &Rect, text: &str, font_size: f32, color: Color) {
    let dims = measure_text(text, None, font_size as u16, 1.0);
    let x = (rect.center_x() - dims.width * 0.5).round();
    let y = (rect.center_y() + dims.height * 0.5).round();
    draw_text(text, x, y, font_size, color);
}

/// A clickable button. Returns true on the frame it is pressed.
pub fn button(rect: &Rect, label: &str) -> bool {
    let over = hovered(rect);
    let bg = if over {
        Color::new(0.0, 0.55, 0.95, 1.0)
    } else {
        ACCENT_COLOR
    };
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, bg);
    draw_centered_text(rect, label, 22.0, WHITE);

    over && is_mouse_button_pressed(MouseButton::Left)
}

/// A button that can be disabled (drawn muted, never fires)
pub fn button_enabled(rect: &Rect, label: &str, enabled: bool) -> bool {
    if !enabled {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, Color::new(0.75, 0.75, 0.78, 1.0));
        draw_centered_text(rect, label, 22.0, Color::new(0.55, 0.55, 0.58, 1.0));
        return false;
    }
    button(rect, label)
}
