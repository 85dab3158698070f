//! Level session state machine
//!
//! One `LevelSession` per play-through. It consumes picking results and
//! owns all per-attempt bookkeeping: attempts, found targets, hints,
//! phase transitions, and the final score. All time-dependent behavior
//! takes an explicit `now` (seconds), so the machine is deterministic
//! under test and pending deadlines die with the session object.

use std::collections::BTreeSet;

use crate::geom::Ray;
use crate::level::LevelDef;
use crate::model::{Element, ElementKind, PrismModel};
use crate::picking;

/// Delay between the last correct drop and the completion transition,
/// leaving the success feedback visible
pub const COMPLETION_DELAY_SECS: f64 = 1.0;

/// How long a hint pulses the remaining targets
pub const HINT_PULSE_SECS: f64 = 3.0;

/// Hint budget per session
pub const MAX_HINTS: u32 = 2;

/// Accuracy points lost per hint used
pub const HINT_PENALTY: u32 = 10;

/// Outward feedback for a single drop
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub is_success: bool,
    pub message: String,
}

impl Feedback {
    fn success(message: String) -> Self {
        Self { is_success: true, message }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self { is_success: false, message: message.into() }
    }

    /// How long the feedback stays on screen before auto-dismissing
    pub fn dismiss_after(&self) -> f64 {
        if self.is_success {
            3.0
        } else {
            5.0
        }
    }
}

/// Final result of a completed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Accuracy after the hint penalty, 0..=100
    pub final_accuracy: u32,
    /// Seconds from session start to completion
    pub time_taken: u64,
    pub hints_used: u32,
}

/// Session lifecycle. Initializing is not represented: construction
/// resets everything and lands in Playing synchronously.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    Playing,
    /// All targets found; waiting out the feedback delay
    Completing { deadline: f64 },
    Completed { summary: ScoreSummary },
}

/// State for one play-through of a level
#[derive(Debug, Clone)]
pub struct LevelSession {
    level: LevelDef,
    start_time: f64,
    attempts: u32,
    correct_attempts: u32,
    found_targets: BTreeSet<String>,
    hints_used: u32,
    hint_until: Option<f64>,
    hovered: Option<(ElementKind, String)>,
    phase: SessionPhase,
}

impl LevelSession {
    pub fn new(level: &LevelDef, now: f64) -> Self {
        Self {
            level: level.clone(),
            start_time: now,
            attempts: 0,
            correct_attempts: 0,
            found_targets: BTreeSet::new(),
            hints_used: 0,
            hint_until: None,
            hovered: None,
            phase: SessionPhase::Playing,
        }
    }

    pub fn level(&self) -> &LevelDef {
        &self.level
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correct_attempts(&self) -> u32 {
        self.correct_attempts
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn found_targets(&self) -> &BTreeSet<String> {
        &self.found_targets
    }

    pub fn is_found(&self, id: &str) -> bool {
        self.found_targets.contains(id)
    }

    /// True once every target has been found (Completing or Completed)
    pub fn is_complete(&self) -> bool {
        !matches!(self.phase, SessionPhase::Playing)
    }

    /// Accuracy so far: round(100 * correct / attempts), 0 before any attempt
    pub fn accuracy(&self) -> u32 {
        if self.attempts == 0 {
            return 0;
        }
        ((self.correct_attempts as f32 / self.attempts as f32) * 100.0).round() as u32
    }

    /// Whole seconds elapsed since the session started
    pub fn elapsed_secs(&self, now: f64) -> u64 {
        (now - self.start_time).max(0.0) as u64
    }

    /// Whether a face is currently shown (and therefore pickable): faces
    /// stay hidden unless already found or named by the active level
    pub fn face_visible(&self, id: &str) -> bool {
        self.is_found(id) || self.level.target_ids.iter().any(|t| t == id)
    }

    /// All elements a drop can land on. Every element is a candidate
    /// regardless of the level's target kind (wrong drops must resolve to
    /// the element actually hit); only hidden faces are excluded.
    pub fn candidates<'m>(&self, model: &'m PrismModel) -> Vec<&'m Element> {
        model
            .elements()
            .iter()
            .filter(|e| e.kind != ElementKind::Face || self.face_visible(&e.id))
            .collect()
    }

    /// Update the hover highlight from a drag-over position
    pub fn handle_drag_over(&mut self, ray: &Ray, model: &PrismModel) -> Option<(ElementKind, String)> {
        self.hovered = None;
        if !matches!(self.phase, SessionPhase::Playing) {
            return None;
        }

        let candidates = self.candidates(model);
        let hit = picking::pick(ray, &candidates, picking::DEFAULT_TOLERANCE)?;
        let hovered = (hit.element.kind, hit.element.id.clone());
        self.hovered = Some(hovered.clone());
        Some(hovered)
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<&(ElementKind, String)> {
        self.hovered.as_ref()
    }

    /// Evaluate a token drop. Returns None when the session is no longer
    /// accepting drops (the level is already completing or completed).
    pub fn handle_drop(&mut self, ray: &Ray, model: &PrismModel, now: f64) -> Option<Feedback> {
        if !matches!(self.phase, SessionPhase::Playing) {
            return None;
        }

        let candidates = self.candidates(model);
        let hit = picking::pick(ray, &candidates, picking::DEFAULT_TOLERANCE);

        // Every drop counts as an attempt, including repeats on elements
        // already found.
        self.attempts += 1;

        let feedback = match hit {
            None => Feedback::failure(
                "Wrong! Make sure you drop the token on an element of the prism.",
            ),
            Some(hit) => {
                let is_correct = hit.element.kind.satisfies(self.level.target_kind)
                    && self.level.target_ids.iter().any(|t| t == &hit.element.id);

                if is_correct && !self.found_targets.contains(&hit.element.id) {
                    self.correct_attempts += 1;
                    self.found_targets.insert(hit.element.id.clone());

                    if self.found_targets.len() == self.level.target_ids.len() {
                        self.phase = SessionPhase::Completing {
                            deadline: now + COMPLETION_DELAY_SECS,
                        };
                    }

                    Feedback::success(format!("Correct! You found {}.", hit.element.display_name()))
                } else if is_correct {
                    Feedback::failure("You already found this element!")
                } else {
                    Feedback::failure(format!(
                        "Wrong! That is {}, not one of the targets.",
                        hit.element.display_name()
                    ))
                }
            }
        };

        Some(feedback)
    }

    /// Spend a hint: pulses the remaining targets for a fixed duration.
    /// Silently ignored beyond the budget or outside Playing.
    pub fn request_hint(&mut self, now: f64) {
        if self.hints_used >= MAX_HINTS || !matches!(self.phase, SessionPhase::Playing) {
            return;
        }
        self.hints_used += 1;
        self.hint_until = Some(now + HINT_PULSE_SECS);
    }

    /// Whether the hint pulse is currently running
    pub fn hint_active(&self, now: f64) -> bool {
        self.hint_until.is_some_and(|until| now < until)
    }

    /// Drive the pending completion transition. Returns the score summary
    /// exactly once, when the completion delay has elapsed.
    pub fn poll(&mut self, now: f64) -> Option<ScoreSummary> {
        let SessionPhase::Completing { deadline } = self.phase else {
            return None;
        };
        if now < deadline {
            return None;
        }

        let raw = self.accuracy();
        let summary = ScoreSummary {
            final_accuracy: raw.saturating_sub(HINT_PENALTY * self.hints_used),
            time_taken: self.elapsed_secs(now),
            hints_used: self.hints_used,
        };
        self.phase = SessionPhase::Completed { summary };
        Some(summary)
    }

    /// The final score, once completed
    pub fn summary(&self) -> Option<ScoreSummary> {
        match self.phase {
            SessionPhase::Completed { summary } => Some(summary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;
    use crate::level::LevelCatalog;
    use crate::model::vertex_position;

    fn catalog() -> LevelCatalog {
        LevelCatalog::load_embedded().unwrap()
    }

    /// Ray from outside the prism straight at a vertex
    fn ray_at_vertex(name: char) -> Ray {
        let target = vertex_position(name).unwrap();
        let origin = target * 5.0;
        Ray::new(origin, target - origin)
    }

    /// Ray from outside straight at a world-space point
    fn ray_at(origin: Vec3, target: Vec3) -> Ray {
        Ray::new(origin, target - origin)
    }

    /// Ray that misses the model entirely
    fn miss_ray() -> Ray {
        Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn test_scenario_all_correct() {
        // Level 1: 4 correct drops, no misses, no hints -> 100%
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 100.0);

        for (i, name) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            let fb = session
                .handle_drop(&ray_at_vertex(name), &model, 100.0 + i as f64)
                .unwrap();
            assert!(fb.is_success, "drop on {} failed: {}", name, fb.message);
        }

        assert_eq!(session.attempts(), 4);
        assert_eq!(session.correct_attempts(), 4);
        assert!(session.is_complete());

        let summary = session.poll(105.0).expect("completion due");
        assert_eq!(summary.final_accuracy, 100);
        assert_eq!(summary.hints_used, 0);
    }

    #[test]
    fn test_scenario_one_miss() {
        // One wrong drop then 4 correct -> 80%
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        // Vertex E is a point but not a target
        let fb = session.handle_drop(&ray_at_vertex('E'), &model, 0.0).unwrap();
        assert!(!fb.is_success);
        assert!(fb.message.contains("vertex E"), "message: {}", fb.message);

        for name in ['A', 'B', 'C', 'D'] {
            session.handle_drop(&ray_at_vertex(name), &model, 1.0).unwrap();
        }

        assert_eq!(session.attempts(), 5);
        assert_eq!(session.correct_attempts(), 4);
        assert_eq!(session.accuracy(), 80);

        let summary = session.poll(10.0).unwrap();
        assert_eq!(summary.final_accuracy, 80);
    }

    #[test]
    fn test_scenario_hint_penalty() {
        // Same as one-miss but with a hint -> 70%
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        session.request_hint(0.5);
        assert!(session.hint_active(1.0));
        assert!(!session.hint_active(4.0));

        session.handle_drop(&ray_at_vertex('E'), &model, 1.0).unwrap();
        for name in ['A', 'B', 'C', 'D'] {
            session.handle_drop(&ray_at_vertex(name), &model, 2.0).unwrap();
        }

        let summary = session.poll(10.0).unwrap();
        assert_eq!(summary.final_accuracy, 70);
        assert_eq!(summary.hints_used, 1);
    }

    #[test]
    fn test_scenario_repeat_claim() {
        // Repeat drop on a found element: attempts up, nothing else
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        session.handle_drop(&ray_at_vertex('A'), &model, 0.0).unwrap();
        let fb = session.handle_drop(&ray_at_vertex('A'), &model, 1.0).unwrap();

        assert!(!fb.is_success);
        assert!(fb.message.contains("already"));
        assert_eq!(session.attempts(), 2);
        assert_eq!(session.correct_attempts(), 1);
        assert_eq!(session.found_targets().len(), 1);
    }

    #[test]
    fn test_miss_increments_attempts_only() {
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        let fb = session.handle_drop(&miss_ray(), &model, 0.0).unwrap();
        assert!(!fb.is_success);
        assert_eq!(session.attempts(), 1);
        assert_eq!(session.correct_attempts(), 0);
        assert!(session.found_targets().is_empty());
    }

    #[test]
    fn test_accuracy_zero_without_attempts() {
        let catalog = catalog();
        let session = LevelSession::new(catalog.get(1).unwrap(), 0.0);
        assert_eq!(session.accuracy(), 0);
    }

    #[test]
    fn test_hint_budget_capped() {
        let catalog = catalog();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        for i in 0..5 {
            session.request_hint(i as f64);
        }
        assert_eq!(session.hints_used(), MAX_HINTS);
    }

    #[test]
    fn test_completion_waits_for_delay() {
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        for name in ['A', 'B', 'C', 'D'] {
            session.handle_drop(&ray_at_vertex(name), &model, 10.0).unwrap();
        }
        assert!(session.is_complete());
        assert!(session.summary().is_none());

        assert!(session.poll(10.5).is_none());
        assert!(session.poll(11.0).is_some());
        // Completion fires exactly once
        assert!(session.poll(12.0).is_none());
        assert!(session.summary().is_some());
    }

    #[test]
    fn test_drops_ignored_after_completion() {
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        for name in ['A', 'B', 'C', 'D'] {
            session.handle_drop(&ray_at_vertex(name), &model, 0.0).unwrap();
        }
        let attempts = session.attempts();

        assert!(session.handle_drop(&ray_at_vertex('A'), &model, 0.5).is_none());
        assert_eq!(session.attempts(), attempts);
    }

    #[test]
    fn test_hidden_faces_are_not_candidates() {
        // Level 1 targets points, so every face is hidden: a drop on a face
        // interior resolves to no element
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        let fb = session
            .handle_drop(
                &ray_at(Vec3::new(0.6, 0.0, -6.0), Vec3::new(0.6, 0.0, -1.0)),
                &model,
                0.0,
            )
            .unwrap();
        assert!(!fb.is_success);
        assert!(fb.message.contains("element of the prism"), "message: {}", fb.message);
    }

    #[test]
    fn test_face_level_claims_faces() {
        // Level 3: the two targeted faces are visible and claimable
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(3).unwrap(), 0.0);

        assert!(session.face_visible("ABFE"));
        assert!(!session.face_visible("ABCD"));

        let fb = session
            .handle_drop(
                &ray_at(Vec3::new(0.6, 0.0, -6.0), Vec3::new(0.6, 0.0, -1.0)),
                &model,
                0.0,
            )
            .unwrap();
        assert!(fb.is_success, "message: {}", fb.message);
        assert!(session.is_found("ABFE"));

        let fb = session
            .handle_drop(
                &ray_at(Vec3::new(0.6, 0.0, 6.0), Vec3::new(0.6, 0.0, 1.0)),
                &model,
                1.0,
            )
            .unwrap();
        assert!(fb.is_success, "message: {}", fb.message);
        assert!(session.is_complete());
    }

    #[test]
    fn test_space_diagonal_level() {
        // Level 5: a drop near a space diagonal claims it even though a
        // face diagonal with the same name coincides with it
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(5).unwrap(), 0.0);

        let fb = session
            .handle_drop(
                &ray_at(Vec3::new(5.0, 0.6, -3.0), Vec3::new(0.63, 0.6, 0.57)),
                &model,
                0.0,
            )
            .unwrap();
        assert!(fb.is_success, "message: {}", fb.message);
        assert!(session.is_found("AG"));
    }

    #[test]
    fn test_section_level_claims_cross_section_quads() {
        // Level 6 targets carry the face-diagonal kind but name the two
        // cross-section quads, which the model holds as faces. A drop on
        // the quad interior must still count.
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(6).unwrap(), 0.0);

        assert!(session.face_visible("ACGE"));
        assert!(session.face_visible("BDHF"));

        // Head-on at an ACGE interior point chosen clear of the section's
        // own diagonals and the prism edges
        let fb = session
            .handle_drop(
                &ray_at(
                    Vec3::new(1.757, -0.55, -2.485),
                    Vec3::new(-0.364, -0.55, -0.364),
                ),
                &model,
                0.0,
            )
            .unwrap();
        assert!(fb.is_success, "message: {}", fb.message);
        assert!(session.is_found("ACGE"));

        // Mirror shot at BDHF
        let fb = session
            .handle_drop(
                &ray_at(
                    Vec3::new(2.485, -0.55, 1.757),
                    Vec3::new(0.364, -0.55, -0.364),
                ),
                &model,
                1.0,
            )
            .unwrap();
        assert!(fb.is_success, "message: {}", fb.message);
        assert!(session.is_complete());
    }

    #[test]
    fn test_found_set_monotonic_and_bounded() {
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);
        let target_count = session.level().target_ids.len();

        let mut last = 0;
        for name in ['A', 'E', 'A', 'B', 'F', 'C', 'D'] {
            session.handle_drop(&ray_at_vertex(name), &model, 0.0);
            let size = session.found_targets().len();
            assert!(size >= last);
            assert!(size <= target_count);
            last = size;
        }
    }

    #[test]
    fn test_hover_tracks_and_clears() {
        let catalog = catalog();
        let model = PrismModel::new();
        let mut session = LevelSession::new(catalog.get(1).unwrap(), 0.0);

        let hovered = session.handle_drag_over(&ray_at_vertex('A'), &model);
        assert_eq!(hovered, Some((ElementKind::Point, "A".to_string())));
        assert!(session.hovered().is_some());

        assert!(session.handle_drag_over(&miss_ray(), &model).is_none());
        assert!(session.hovered().is_none());

        session.handle_drag_over(&ray_at_vertex('B'), &model);
        session.clear_hover();
        assert!(session.hovered().is_none());
    }
}
