//! 3D render host
//!
//! Owns the orbit camera and draws the prism with visual state derived
//! from the active session each frame: default, hovered, found, hint
//! pulse, celebration. The session itself never touches the renderer;
//! it only exposes the state this module reads.

use macroquad::prelude::*;

use crate::geom::{Ray, Vec3};
use crate::model::{Element, ElementKind, Primitive, PrismModel};
use crate::session::LevelSession;

/// Field of view used for ray casting; must match the Camera3D default
const FOV_Y_DEGREES: f32 = 45.0;

/// Scene background, a light neutral gray
pub const BACKGROUND: Color = Color::new(0.94, 0.94, 0.94, 1.0);

/// Unhighlighted element color
const ELEMENT_DEFAULT: Color = Color::new(0.27, 0.27, 0.27, 1.0);

/// Hover glow
const HOVER_COLOR: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Hint pulse color (blended against the default)
const HINT_COLOR: Color = Color::new(1.0, 0.6, 0.0, 1.0);

const FACE_DEFAULT_OPACITY: f32 = 0.1;
const FACE_FOUND_OPACITY: f32 = 0.4;
const FACE_HOVER_OPACITY: f32 = 0.8;

/// Radius for drawing vertex spheres (slightly larger than the pick radius
/// so the marker is readable at a distance)
const VERTEX_DRAW_RADIUS: f32 = 0.06;

/// Highlight color for a found element of the given kind
fn found_color(kind: ElementKind) -> Color {
    match kind {
        ElementKind::Point => Color::new(1.0, 1.0, 0.0, 1.0),
        ElementKind::Edge => Color::new(1.0, 0.0, 0.0, 1.0),
        ElementKind::Face => Color::new(0.12, 0.56, 1.0, 1.0),
        ElementKind::FaceDiagonal => Color::new(0.0, 1.0, 1.0, 1.0),
        ElementKind::SpaceDiagonal => Color::new(0.6, 0.2, 0.8, 1.0),
    }
}

/// Orbit camera around a fixed target
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl OrbitCamera {
    /// Classic three-quarter view, matching a camera at roughly (5, 5, 5)
    /// looking at the prism center
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 8.66,
            azimuth: -2.356,
            elevation: 0.615,
        }
    }

    /// View direction from camera toward the target
    fn forward(&self) -> Vec3 {
        Vec3::new(
            self.elevation.cos() * self.azimuth.sin(),
            -self.elevation.sin(),
            self.elevation.cos() * self.azimuth.cos(),
        )
    }

    pub fn position(&self) -> Vec3 {
        self.target - self.forward() * self.distance
    }

    /// Camera basis in world space: (right, up, forward)
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(Vec3::UP).normalize();
        let up = right.cross(forward);
        (right, up, forward)
    }

    /// Drag-to-orbit. Horizontal motion spins the azimuth, vertical motion
    /// tilts the elevation (clamped short of the poles).
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * 0.01;
        self.elevation = (self.elevation + dy * 0.01).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - scroll * 0.5).clamp(4.0, 20.0);
    }

    /// Cast a ray through a screen position, inverting the perspective
    /// projection: normalized device coords from the pixel position, then
    /// out through the camera basis.
    pub fn screen_ray(&self, screen_x: f32, screen_y: f32, screen_w: f32, screen_h: f32) -> Ray {
        let ndc_x = (screen_x / screen_w) * 2.0 - 1.0;
        let ndc_y = -((screen_y / screen_h) * 2.0 - 1.0);

        let (right, up, forward) = self.basis();
        let half_h = (FOV_Y_DEGREES.to_radians() * 0.5).tan();
        let half_w = half_h * (screen_w / screen_h);

        let dir = right * (ndc_x * half_w) + up * (ndc_y * half_h) + forward;
        Ray::new(self.position(), dir)
    }

    /// Project a world point to screen coordinates (used for vertex labels).
    /// None when the point is behind the camera.
    pub fn world_to_screen(
        &self,
        world: Vec3,
        screen_w: f32,
        screen_h: f32,
    ) -> Option<(f32, f32)> {
        let (right, up, forward) = self.basis();
        let rel = world - self.position();

        let depth = rel.dot(forward);
        if depth <= 0.01 {
            return None;
        }

        let half_h = (FOV_Y_DEGREES.to_radians() * 0.5).tan();
        let half_w = half_h * (screen_w / screen_h);

        let ndc_x = rel.dot(right) / (depth * half_w);
        let ndc_y = rel.dot(up) / (depth * half_h);

        Some((
            (ndc_x + 1.0) * 0.5 * screen_w,
            (1.0 - ndc_y) * 0.5 * screen_h,
        ))
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: mq(self.position()),
            target: mq(self.target),
            up: vec3(0.0, 1.0, 0.0),
            ..Default::default()
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

fn mq(v: Vec3) -> macroquad::math::Vec3 {
    vec3(v.x, v.y, v.z)
}

/// Per-frame visual state of one element, derived from the session
#[derive(Debug, Clone, Copy, PartialEq)]
enum VisualState {
    Hidden,
    Default,
    Hovered,
    Found,
    HintPulse,
}

fn visual_state(element: &Element, session: &LevelSession, now: f64) -> VisualState {
    let level = session.level();
    let found = session.is_found(&element.id) && element.kind.satisfies(level.target_kind);

    if found {
        return VisualState::Found;
    }

    let visible = match element.kind {
        ElementKind::Point | ElementKind::Edge | ElementKind::SpaceDiagonal => true,
        ElementKind::Face => session.face_visible(&element.id),
        ElementKind::FaceDiagonal => level.target_kind == ElementKind::FaceDiagonal,
    };
    if !visible {
        return VisualState::Hidden;
    }

    if let Some((kind, id)) = session.hovered() {
        if *kind == element.kind && *id == element.id {
            return VisualState::Hovered;
        }
    }

    let is_remaining_target = element.kind.satisfies(level.target_kind)
        && level.target_ids.iter().any(|t| t == &element.id)
        && !session.is_found(&element.id);
    if is_remaining_target && session.hint_active(now) {
        return VisualState::HintPulse;
    }

    VisualState::Default
}

fn blend(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

/// Draw the full model. `celebrating` briefly exaggerates found elements
/// after level completion.
pub fn draw_model(model: &PrismModel, session: &LevelSession, now: f64, celebrating: bool) {
    // Hint pulse phase shared by all pulsing elements
    let pulse = ((now * 6.0).sin() * 0.5 + 0.5) as f32;

    for element in model.elements() {
        let state = visual_state(element, session, now);
        if state == VisualState::Hidden {
            continue;
        }

        let color = match state {
            VisualState::Found => found_color(element.kind),
            VisualState::Hovered => HOVER_COLOR,
            VisualState::HintPulse => blend(ELEMENT_DEFAULT, HINT_COLOR, pulse),
            _ => ELEMENT_DEFAULT,
        };

        match &element.primitive {
            Primitive::Point(pos) => {
                let mut radius = VERTEX_DRAW_RADIUS;
                if celebrating && state == VisualState::Found {
                    radius *= 1.2;
                }
                draw_sphere(mq(*pos), radius, None, color);
            }
            Primitive::Segment { start, end } => {
                let color = if celebrating && state == VisualState::Found {
                    HOVER_COLOR
                } else {
                    color
                };
                draw_line_3d(mq(*start), mq(*end), color);
            }
            Primitive::Quad { corners } => {
                let opacity = match state {
                    VisualState::Found => FACE_FOUND_OPACITY,
                    VisualState::Hovered => FACE_HOVER_OPACITY,
                    _ => FACE_DEFAULT_OPACITY,
                };
                let color = Color::new(color.r, color.g, color.b, opacity);
                // The prism's quads are all parallelograms, so two edge
                // vectors from the first corner span them exactly
                draw_affine_parallelogram(
                    mq(corners[0]),
                    mq(corners[1] - corners[0]),
                    mq(corners[3] - corners[0]),
                    None,
                    color,
                );
            }
        }
    }
}

/// Draw the vertex letters next to their markers (2D pass, after the 3D
/// scene is done)
pub fn draw_vertex_labels(model: &PrismModel, camera: &OrbitCamera) {
    let sw = screen_width();
    let sh = screen_height();

    for element in model.elements() {
        if element.kind != ElementKind::Point {
            continue;
        }
        let Primitive::Point(pos) = element.primitive else {
            continue;
        };

        // Push the label slightly away from the prism center so it doesn't
        // sit on top of the marker
        let offset = pos * 1.12;
        if let Some((sx, sy)) = camera.world_to_screen(offset, sw, sh) {
            draw_text(&element.id, sx - 4.0, sy + 4.0, 22.0, DARKGRAY);
        }
    }
}
