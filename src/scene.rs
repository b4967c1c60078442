//! Scene-graph collaborator
//!
//! The host owns the stage; this module only describes what the sphere and
//! ground plane look like and which operations the controller needs.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{BounceError, Result};

/// Nodes this crate creates in the host scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneNode {
    Sphere,
    Ground,
}

impl SceneNode {
    pub fn path(&self) -> &'static str {
        match self {
            SceneNode::Sphere => SPHERE_PATH,
            SceneNode::Ground => GROUND_PATH,
        }
    }

    /// Path of the constant-color material bound to this node
    pub fn material_path(&self) -> String {
        match self {
            SceneNode::Sphere => format!("{SPHERE_PATH}/material"),
            SceneNode::Ground => format!("{GROUND_PATH}/color_material"),
        }
    }

    /// Path of the surface shader feeding the material
    pub fn shader_path(&self) -> String {
        format!("{}/color_shader", self.path())
    }
}

/// Linear RGB color, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Random colors for the recolor buttons
#[derive(Debug, Clone)]
pub struct ColorPicker {
    rng: Pcg32,
}

impl ColorPicker {
    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg32::from_os_rng(),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Uniform color in [0, 1)³
    pub fn next_color(&mut self) -> Rgb {
        Rgb::new(self.rng.random(), self.rng.random(), self.rng.random())
    }
}

/// Geometry of the ground quad the sphere bounces on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    /// Quad corners, counter-clockwise seen from above
    pub points: [Vec3; 4],
    pub face_vertex_counts: Vec<u32>,
    pub face_vertex_indices: Vec<u32>,
    /// Per-vertex normals (all up)
    pub normals: [Vec3; 4],
    pub double_sided: bool,
    /// Material the host should reference for the base look
    pub material_reference: String,
}

impl Default for GroundPlane {
    fn default() -> Self {
        let e = GROUND_HALF_EXTENT;
        let y = GROUND_ELEVATION;
        Self {
            points: [
                Vec3::new(-e, y, e),
                Vec3::new(e, y, e),
                Vec3::new(e, y, -e),
                Vec3::new(-e, y, -e),
            ],
            face_vertex_counts: vec![4],
            face_vertex_indices: vec![0, 1, 2, 3],
            normals: [Vec3::Y; 4],
            double_sided: true,
            material_reference: GROUND_MATERIAL_REFERENCE.to_string(),
        }
    }
}

/// Operations the controller performs on the host scene
///
/// Creation replaces any existing node at the same path. The setters fail
/// with `PreconditionViolation` when their node is absent.
pub trait SceneGraph {
    fn create_sphere(&mut self, radius: f32, translation: Vec3);
    fn remove_sphere(&mut self);
    fn create_ground(&mut self, plane: &GroundPlane);
    fn remove_ground(&mut self);
    fn has_node(&self, node: SceneNode) -> bool;
    fn set_sphere_translation(&mut self, translation: Vec3) -> Result<()>;
    fn set_node_color(&mut self, node: SceneNode, color: Rgb) -> Result<()>;
}

fn missing(node: SceneNode) -> BounceError {
    BounceError::PreconditionViolation(format!("no node at {}", node.path()))
}

/// A constant-color material bound to a node
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBinding {
    pub color: Rgb,
    pub material_path: String,
    pub shader_path: String,
}

impl ColorBinding {
    pub fn new(node: SceneNode, color: Rgb) -> Self {
        Self {
            color,
            material_path: node.material_path(),
            shader_path: node.shader_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereNode {
    pub radius: f32,
    pub translation: Vec3,
    pub binding: Option<ColorBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroundNode {
    pub plane: GroundPlane,
    pub binding: Option<ColorBinding>,
}

/// Headless scene that records what the controller did
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    pub sphere: Option<SphereNode>,
    pub ground: Option<GroundNode>,
    /// Number of translation updates applied to the sphere
    pub translation_updates: u64,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding_of(&self, node: SceneNode) -> Option<&ColorBinding> {
        match node {
            SceneNode::Sphere => self.sphere.as_ref().and_then(|s| s.binding.as_ref()),
            SceneNode::Ground => self.ground.as_ref().and_then(|g| g.binding.as_ref()),
        }
    }

    pub fn color_of(&self, node: SceneNode) -> Option<Rgb> {
        self.binding_of(node).map(|b| b.color)
    }
}

impl SceneGraph for InMemoryScene {
    fn create_sphere(&mut self, radius: f32, translation: Vec3) {
        self.sphere = Some(SphereNode {
            radius,
            translation,
            binding: None,
        });
    }

    fn remove_sphere(&mut self) {
        self.sphere = None;
    }

    fn create_ground(&mut self, plane: &GroundPlane) {
        self.ground = Some(GroundNode {
            plane: plane.clone(),
            binding: None,
        });
    }

    fn remove_ground(&mut self) {
        self.ground = None;
    }

    fn has_node(&self, node: SceneNode) -> bool {
        match node {
            SceneNode::Sphere => self.sphere.is_some(),
            SceneNode::Ground => self.ground.is_some(),
        }
    }

    fn set_sphere_translation(&mut self, translation: Vec3) -> Result<()> {
        let sphere = self
            .sphere
            .as_mut()
            .ok_or_else(|| missing(SceneNode::Sphere))?;
        sphere.translation = translation;
        self.translation_updates += 1;
        Ok(())
    }

    fn set_node_color(&mut self, node: SceneNode, color: Rgb) -> Result<()> {
        let slot = match node {
            SceneNode::Sphere => self.sphere.as_mut().map(|s| &mut s.binding),
            SceneNode::Ground => self.ground.as_mut().map(|g| &mut g.binding),
        };
        *slot.ok_or_else(|| missing(node))? = Some(ColorBinding::new(node, color));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_paths() {
        assert_eq!(SceneNode::Sphere.path(), "/World/bouncing_sphere");
        assert_eq!(SceneNode::Ground.path(), "/World/ground_plane");
        assert_eq!(
            SceneNode::Sphere.shader_path(),
            "/World/bouncing_sphere/color_shader"
        );
        assert_eq!(
            SceneNode::Ground.material_path(),
            "/World/ground_plane/color_material"
        );
    }

    #[test]
    fn test_ground_plane_geometry() {
        let plane = GroundPlane::default();
        assert_eq!(plane.points[0], Vec3::new(-10.0, -0.7, 10.0));
        assert_eq!(plane.points[2], Vec3::new(10.0, -0.7, -10.0));
        assert!(plane.points.iter().all(|p| p.y == GROUND_ELEVATION));
        assert_eq!(plane.face_vertex_counts, vec![4]);
        assert!(plane.double_sided);
        assert_eq!(plane.material_reference, "/World/Looks/Asphalt");
    }

    #[test]
    fn test_seeded_colors_repeat() {
        let mut a = ColorPicker::seeded(42);
        let mut b = ColorPicker::seeded(42);
        for _ in 0..10 {
            let color = a.next_color();
            assert_eq!(color, b.next_color());
            for c in [color.r, color.g, color.b] {
                assert!((0.0..1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_setters_require_nodes() {
        let mut scene = InMemoryScene::new();
        assert!(matches!(
            scene.set_sphere_translation(Vec3::Y),
            Err(BounceError::PreconditionViolation(_))
        ));
        assert!(matches!(
            scene.set_node_color(SceneNode::Ground, Rgb::new(1.0, 0.0, 0.0)),
            Err(BounceError::PreconditionViolation(_))
        ));
        assert_eq!(scene.translation_updates, 0);
    }

    #[test]
    fn test_recreate_sphere_clears_color() {
        let mut scene = InMemoryScene::new();
        scene.create_sphere(SPHERE_RADIUS, Vec3::new(0.0, 20.0, 0.0));
        scene
            .set_node_color(SceneNode::Sphere, Rgb::new(0.2, 0.4, 0.6))
            .unwrap();
        assert_eq!(scene.color_of(SceneNode::Sphere), Some(Rgb::new(0.2, 0.4, 0.6)));

        let binding = scene.binding_of(SceneNode::Sphere).unwrap();
        assert_eq!(binding.material_path, "/World/bouncing_sphere/material");
        assert_eq!(binding.shader_path, "/World/bouncing_sphere/color_shader");

        scene.create_sphere(SPHERE_RADIUS, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(scene.color_of(SceneNode::Sphere), None);

        scene.set_sphere_translation(Vec3::new(0.0, 4.0, 0.0)).unwrap();
        assert_eq!(scene.sphere.as_ref().map(|s| s.translation.y), Some(4.0));
        assert_eq!(scene.translation_updates, 1);

        scene.remove_sphere();
        assert!(!scene.has_node(SceneNode::Sphere));
    }
}
