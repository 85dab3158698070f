//! Picking engine
//!
//! Resolves a world-space ray to the nearest interactable element.
//! Pure: no side effects, deterministic for a given ray and candidate
//! list. Exact-distance ties go to the earlier candidate (the sort is
//! stable), which the model's iteration order relies on.

use crate::geom::{ray_plane_intersection, ray_sphere_intersection, ray_triangle_intersect, Ray, Vec3};
use crate::model::{Element, Primitive};

/// Pick radius for vertex spheres, in world units
pub const POINT_RADIUS: f32 = 0.05;

/// Default screen-space-derived tolerance for line-like elements, in world units
pub const DEFAULT_TOLERANCE: f32 = 0.08;

/// A successful pick
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub element: &'a Element,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    pub point: Vec3,
}

/// Find the closest interactable element along the ray, if any.
///
/// `tolerance` only affects line-like elements; points use their fixed
/// sphere radius and faces use exact triangle intersection.
pub fn pick<'a>(ray: &Ray, candidates: &[&'a Element], tolerance: f32) -> Option<Hit<'a>> {
    let mut hits: Vec<Hit<'a>> = candidates
        .iter()
        .filter_map(|element| {
            intersect_element(ray, element, tolerance).map(|(distance, point)| Hit {
                element,
                distance,
                point,
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits.into_iter().next()
}

fn intersect_element(ray: &Ray, element: &Element, tolerance: f32) -> Option<(f32, Vec3)> {
    match &element.primitive {
        Primitive::Point(center) => {
            let t = ray_sphere_intersection(ray, *center, POINT_RADIUS)?;
            Some((t, ray.at(t)))
        }
        Primitive::Segment { start, end } => segment_intersection(ray, *start, *end, tolerance),
        Primitive::Quad { corners } => {
            let (tri_a, tri_b) = Primitive::quad_triangles(corners);
            let t = [tri_a, tri_b]
                .into_iter()
                .filter_map(|[v0, v1, v2]| ray_triangle_intersect(ray.origin, ray.direction, v0, v1, v2))
                .min_by(|a, b| a.total_cmp(b))?;
            Some((t, ray.at(t)))
        }
    }
}

/// Two-stage segment hit test tolerant of viewing angle.
///
/// True closest-point picking is unforgiving for thin lines at a distance,
/// so instead the segment is embedded in a plane oriented toward the ray
/// origin and the ray is intersected with that plane. The hit point must
/// then pass a relaxed on-segment test (endpoint distance sum within
/// `length + tolerance`) and sit within `tolerance` of the ray itself.
fn segment_intersection(ray: &Ray, start: Vec3, end: Vec3, tolerance: f32) -> Option<(f32, Vec3)> {
    let dir = (end - start).normalize();
    let to_origin = ray.origin - start;

    // Plane normal: the component of to_origin perpendicular to the
    // segment. The plane contains the segment and faces the ray origin.
    let mut normal = (to_origin - dir * dir.dot(to_origin)).normalize();
    if normal == Vec3::ZERO {
        // Ray origin on the segment's line: fall back to a plane spanned
        // by the segment and the ray direction
        normal = dir.cross(ray.direction).normalize();
    }

    let t = ray_plane_intersection(ray, start, normal)?;
    let point = ray.at(t);

    let length = start.distance_to(end);
    let to_start = point.distance_to(start);
    let to_end = point.distance_to(end);
    if to_start + to_end > length + tolerance {
        return None;
    }

    let to_point = point - ray.origin;
    let perp = to_point.len() * ray.direction.angle_to(to_point).sin();
    if perp > tolerance {
        return None;
    }

    Some((ray.origin.distance_to(point), point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, PrismModel};

    fn ray_toward(origin: Vec3, target: Vec3) -> Ray {
        Ray::new(origin, target - origin)
    }

    fn all_candidates(model: &PrismModel) -> Vec<&Element> {
        model.elements().iter().collect()
    }

    #[test]
    fn test_pick_empty_candidates() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(pick(&ray, &[], DEFAULT_TOLERANCE).is_none());
    }

    #[test]
    fn test_pick_vertex_head_on() {
        let model = PrismModel::new();
        let candidates: Vec<&Element> = model
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Point)
            .collect();

        // Straight at vertex G (1,1,1) from well outside
        let ray = ray_toward(Vec3::new(5.0, 5.0, 5.0), Vec3::new(1.0, 1.0, 1.0));
        let hit = pick(&ray, &candidates, DEFAULT_TOLERANCE).expect("should hit G");
        assert_eq!(hit.element.id, "G");
    }

    #[test]
    fn test_pick_vertex_iff_within_radius() {
        // A sphere is hit exactly when the ray's closest approach to the
        // center is within the pick radius.
        let model = PrismModel::new();
        let a = model.get(ElementKind::Point, "A").unwrap();
        let candidates = [a];
        let center = Vec3::new(-1.0, -1.0, -1.0);

        // Closest approach just inside the radius
        let ray = Ray::new(center + Vec3::new(POINT_RADIUS * 0.9, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(pick(&ray, &candidates, DEFAULT_TOLERANCE).is_some());

        // Closest approach just outside
        let ray = Ray::new(center + Vec3::new(POINT_RADIUS * 1.1, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(pick(&ray, &candidates, DEFAULT_TOLERANCE).is_none());
    }

    #[test]
    fn test_pick_edge_midpoint() {
        let model = PrismModel::new();
        let edge = model.get(ElementKind::Edge, "AB").unwrap();
        let candidates = [edge];

        // AB runs along the bottom front; aim at its midpoint from the front
        let ray = ray_toward(Vec3::new(0.0, 0.0, -6.0), Vec3::new(0.0, -1.0, -1.0));
        let hit = pick(&ray, &candidates, DEFAULT_TOLERANCE).expect("should hit AB");
        assert_eq!(hit.element.id, "AB");
        assert!(hit.point.distance_to(Vec3::new(0.0, -1.0, -1.0)) < 0.05);
    }

    #[test]
    fn test_segment_not_hit_beyond_endpoints() {
        // The ray passes within tolerance of the segment's infinite line but
        // well past the endpoint: the endpoint-sum test must reject it.
        let model = PrismModel::new();
        let edge = model.get(ElementKind::Edge, "AB").unwrap();
        let candidates = [edge];

        // AB spans x in [-1, 1] at y=-1, z=-1; aim at (3, -1, -1)
        let ray = ray_toward(Vec3::new(3.0, -1.0, -6.0), Vec3::new(3.0, -1.0, -1.0));
        assert!(pick(&ray, &candidates, DEFAULT_TOLERANCE).is_none());
    }

    #[test]
    fn test_segment_miss_outside_tolerance() {
        let model = PrismModel::new();
        let edge = model.get(ElementKind::Edge, "AB").unwrap();
        let candidates = [edge];

        // Parallel to AB but offset 0.5 in y: perpendicular distance 0.5
        let ray = ray_toward(Vec3::new(0.0, -0.5, -6.0), Vec3::new(0.0, -0.5, -1.0));
        assert!(pick(&ray, &candidates, DEFAULT_TOLERANCE).is_none());
    }

    #[test]
    fn test_pick_face_interior() {
        let model = PrismModel::new();
        let face = model.get(ElementKind::Face, "ABFE").unwrap();
        let candidates = [face];

        // ABFE is the z=-1 side; aim at a point inside it
        let ray = ray_toward(Vec3::new(0.3, 0.2, -6.0), Vec3::new(0.3, 0.2, -1.0));
        let hit = pick(&ray, &candidates, DEFAULT_TOLERANCE).expect("should hit ABFE");
        assert_eq!(hit.element.id, "ABFE");
        assert!((hit.point.z - -1.0).abs() < 0.001);
    }

    #[test]
    fn test_pick_face_second_triangle() {
        // A point inside the quad but outside the first triangle still hits
        let model = PrismModel::new();
        let face = model.get(ElementKind::Face, "ABFE").unwrap();
        let candidates = [face];

        // Corners A(-1,-1) B(1,-1) F(1,1) E(-1,1) in the z=-1 plane; the
        // second triangle (A, F, E) covers the upper-left half
        let ray = ray_toward(Vec3::new(-0.8, 0.8, -6.0), Vec3::new(-0.8, 0.8, -1.0));
        assert!(pick(&ray, &candidates, DEFAULT_TOLERANCE).is_some());
    }

    #[test]
    fn test_closest_hit_wins() {
        let model = PrismModel::new();
        let candidates = all_candidates(&model);

        // Straight down the z axis through both ABFE (z=-1) and DCGH (z=1),
        // entering from negative z: the near face wins
        let ray = Ray::new(Vec3::new(0.5, 0.1, -6.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = pick(&ray, &candidates, DEFAULT_TOLERANCE).expect("should hit something");
        assert_eq!(hit.element.id, "ABFE");
    }

    #[test]
    fn test_coincident_diagonal_tie_goes_to_space_diagonal() {
        // AG exists twice with identical geometry (space diagonal and
        // cross-section face diagonal): the distances tie exactly, so the
        // model's iteration order decides.
        let model = PrismModel::new();
        let candidates: Vec<&Element> = model.elements().iter().filter(|e| e.id == "AG").collect();
        assert_eq!(candidates.len(), 2);

        // Slightly off the diagonal's midpoint, well within tolerance
        let ray = ray_toward(Vec3::new(4.0, 0.0, -4.0), Vec3::new(0.03, -0.03, 0.0));
        let hit = pick(&ray, &candidates, DEFAULT_TOLERANCE).expect("should hit AG");
        assert_eq!(hit.element.kind, ElementKind::SpaceDiagonal);
    }

    #[test]
    fn test_miss_everything() {
        let model = PrismModel::new();
        let candidates = all_candidates(&model);
        let ray = Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(pick(&ray, &candidates, DEFAULT_TOLERANCE).is_none());
    }
}
