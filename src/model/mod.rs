//! Prism element catalog
//!
//! The fixed rectangular-prism model the whole game runs on: 8 named
//! vertices and the elements derived from them (edges, faces, face
//! diagonals, space diagonals). Built once per level session; the
//! topology never changes.

use serde::{Deserialize, Serialize};

use crate::geom::Vec3;

/// The five kinds of interactable geometric elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Point,
    Edge,
    Face,
    FaceDiagonal,
    SpaceDiagonal,
}

impl ElementKind {
    /// Whether a hit on an element of this kind can satisfy a target of
    /// kind `target`. Almost always an exact match; the one exception is
    /// the two diagonal cross-sections, which are faces geometrically but
    /// are claimed as face diagonals by the section level.
    pub fn satisfies(self, target: ElementKind) -> bool {
        self == target || (self == ElementKind::Face && target == ElementKind::FaceDiagonal)
    }

    /// Human-readable name used in feedback messages
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Point => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::Face => "face",
            ElementKind::FaceDiagonal => "face diagonal",
            ElementKind::SpaceDiagonal => "space diagonal",
        }
    }
}

/// Geometric primitive backing an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Point(Vec3),
    Segment { start: Vec3, end: Vec3 },
    Quad { corners: [Vec3; 4] },
}

impl Primitive {
    /// Split a quad into its two triangles for hit testing
    pub fn quad_triangles(corners: &[Vec3; 4]) -> ([Vec3; 3], [Vec3; 3]) {
        (
            [corners[0], corners[1], corners[2]],
            [corners[0], corners[2], corners[3]],
        )
    }
}

/// A named geometric element of the prism
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub id: String,
    pub primitive: Primitive,
}

impl Element {
    /// Display name for feedback messages, e.g. "edge AB"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.kind.label(), self.id)
    }
}

/// Vertex names and positions of the unit prism (edge length 2, centered)
const VERTICES: [(char, Vec3); 8] = [
    ('A', Vec3 { x: -1.0, y: -1.0, z: -1.0 }),
    ('B', Vec3 { x: 1.0, y: -1.0, z: -1.0 }),
    ('C', Vec3 { x: 1.0, y: -1.0, z: 1.0 }),
    ('D', Vec3 { x: -1.0, y: -1.0, z: 1.0 }),
    ('E', Vec3 { x: -1.0, y: 1.0, z: -1.0 }),
    ('F', Vec3 { x: 1.0, y: 1.0, z: -1.0 }),
    ('G', Vec3 { x: 1.0, y: 1.0, z: 1.0 }),
    ('H', Vec3 { x: -1.0, y: 1.0, z: 1.0 }),
];

/// The 12 prism edges
const EDGES: [&str; 12] = [
    "AB", "BC", "CD", "DA", // base
    "EF", "FG", "GH", "HE", // top
    "AE", "BF", "CG", "DH", // verticals
];

/// The 6 rectangular faces plus the two diagonal cross-sections
const FACES: [&str; 8] = [
    "ABCD", "EFGH", "ABFE", "DCGH", "ADHE", "BCGF", "ACGE", "BDHF",
];

/// Two diagonals per rectangular face, plus the diagonals of the two
/// cross-section quads (AG/CE on ACGE, BH/DF on BDHF)
const FACE_DIAGONALS: [&str; 16] = [
    "AC", "BD", "EG", "FH", "AF", "BE", "DG", "CH", "AH", "DE", "BG", "CF", "AG", "CE", "BH", "DF",
];

/// The 4 space diagonals through the prism interior
const SPACE_DIAGONALS: [&str; 4] = ["AG", "BH", "CE", "DF"];

/// Look up a vertex position by its letter name
pub fn vertex_position(name: char) -> Option<Vec3> {
    VERTICES.iter().find(|(n, _)| *n == name).map(|(_, p)| *p)
}

/// The prism model: every interactable element, in a fixed iteration order.
///
/// Order matters for picking: exact-distance ties resolve to the earlier
/// candidate, and the four space diagonals coincide geometrically with the
/// cross-section face diagonals of the same name. Space diagonals are
/// therefore listed before face diagonals so a drop on AG claims the space
/// diagonal, not its shadow.
#[derive(Debug, Clone)]
pub struct PrismModel {
    elements: Vec<Element>,
}

impl PrismModel {
    pub fn new() -> Self {
        let mut elements = Vec::new();

        for (name, pos) in VERTICES {
            elements.push(Element {
                kind: ElementKind::Point,
                id: name.to_string(),
                primitive: Primitive::Point(pos),
            });
        }

        for id in EDGES {
            elements.push(segment_element(ElementKind::Edge, id));
        }

        for id in FACES {
            let mut corners = [Vec3::ZERO; 4];
            for (i, name) in id.chars().enumerate() {
                corners[i] = vertex_position(name).expect("face names a known vertex");
            }
            elements.push(Element {
                kind: ElementKind::Face,
                id: id.to_string(),
                primitive: Primitive::Quad { corners },
            });
        }

        for id in SPACE_DIAGONALS {
            elements.push(segment_element(ElementKind::SpaceDiagonal, id));
        }

        for id in FACE_DIAGONALS {
            elements.push(segment_element(ElementKind::FaceDiagonal, id));
        }

        Self { elements }
    }

    /// All elements, in tie-break iteration order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Look up an element by kind and id
    pub fn get(&self, kind: ElementKind, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.kind == kind && e.id == id)
    }

    /// Look up the first element with the given id, regardless of kind
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }
}

impl Default for PrismModel {
    fn default() -> Self {
        Self::new()
    }
}

fn segment_element(kind: ElementKind, id: &str) -> Element {
    let mut chars = id.chars();
    let start = chars.next().and_then(vertex_position).expect("segment start vertex");
    let end = chars.next().and_then(vertex_position).expect("segment end vertex");
    Element {
        kind,
        id: id.to_string(),
        primitive: Primitive::Segment { start, end },
    }
}
