use log::{debug, info};
use std::collections::HashMap;

use crate::camera::{OrbitCamera, Viewport};
use crate::geometry::Material;
use crate::math::{Color, Ray};
use crate::scene::{NodeId, SceneGraph};

pub const HIGHLIGHT_EMISSIVE: u32 = 0x44ff44;
pub const HIGHLIGHT_INTENSITY: f32 = 0.3;

/// What one pick did to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// The ray hit nothing at all
    Missed,
    /// Nearest hit belongs to no flower (e.g. the floor)
    NotAFlower(NodeId),
    /// Nearest hit is the flower that is already selected
    AlreadySelected(NodeId),
    Selected {
        previous: Option<NodeId>,
        current: NodeId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Selected(NodeId),
}

/// Saved appearance of one flower's surfaces
type Snapshot = Vec<(NodeId, Vec<Material>)>;

/// Reversible emissive highlight. Original materials are copied before the
/// first highlight of a flower and written back verbatim on unhighlight.
#[derive(Debug, Default)]
pub struct Highlighter {
    saved: HashMap<NodeId, Snapshot>,
}

impl Highlighter {
    pub fn highlight(&mut self, scene: &mut SceneGraph, flower: NodeId) {
        let surfaces = scene.surfaces(flower);
        self.saved.entry(flower).or_insert_with(|| {
            surfaces
                .iter()
                .filter_map(|&s| scene.materials(s).map(|m| (s, m.to_vec())))
                .collect()
        });

        let glow = Color::from_hex(HIGHLIGHT_EMISSIVE);
        for surface in surfaces {
            if let Some(materials) = scene.materials_mut(surface) {
                for material in materials.iter_mut() {
                    material.emissive = glow;
                    material.emissive_intensity = HIGHLIGHT_INTENSITY;
                }
            }
        }
    }

    /// Restores whatever surfaces of the flower still exist
    pub fn unhighlight(&mut self, scene: &mut SceneGraph, flower: NodeId) {
        let Some(snapshot) = self.saved.remove(&flower) else {
            return;
        };
        for (surface, original) in snapshot {
            if let Some(materials) = scene.materials_mut(surface) {
                *materials = original;
            }
        }
    }

    pub fn is_highlighted(&self, flower: NodeId) -> bool {
        self.saved.contains_key(&flower)
    }

    pub fn highlighted_count(&self) -> usize {
        self.saved.len()
    }
}

/// Single-selection state machine driven by pointer picks.
///
/// At most one flower is selected, and only the selected flower is
/// highlighted.
#[derive(Debug, Default)]
pub struct SelectionEngine {
    selection: Selection,
    highlighter: Highlighter,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected(&self) -> Option<NodeId> {
        match self.selection {
            Selection::Idle => None,
            Selection::Selected(id) => Some(id),
        }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn pick_at(
        &mut self,
        scene: &mut SceneGraph,
        camera: &OrbitCamera,
        viewport: &Viewport,
        x: f32,
        y: f32,
    ) -> PickOutcome {
        let Some(ray) = camera.ray_from_screen(viewport, x, y) else {
            debug!("Viewport {:?} has no area, nothing to pick", viewport);
            return PickOutcome::Missed;
        };
        self.pick_ray(scene, &ray)
    }

    /// Selects the flower owning the nearest surface hit by `ray`
    pub fn pick_ray(&mut self, scene: &mut SceneGraph, ray: &Ray) -> PickOutcome {
        let Some(hit) = scene.intersect(ray).into_iter().next() else {
            debug!("Pick missed everything");
            return PickOutcome::Missed;
        };

        let Some(flower) = scene.owning_flower(hit.node) else {
            debug!("Picked node {} is not a flower", hit.node);
            return PickOutcome::NotAFlower(hit.node);
        };

        if self.selected() == Some(flower) {
            return PickOutcome::AlreadySelected(flower);
        }

        let previous = self.select(scene, flower);
        debug!(
            "Selected flower {} ({}) at distance {:.3}",
            flower,
            scene.flower_type(flower).unwrap_or("?"),
            hit.distance
        );
        PickOutcome::Selected {
            previous,
            current: flower,
        }
    }

    /// Unhighlights the old selection, highlights `flower`. Returns the old one.
    fn select(&mut self, scene: &mut SceneGraph, flower: NodeId) -> Option<NodeId> {
        let previous = self.selected();
        if let Some(old) = previous {
            self.highlighter.unhighlight(scene, old);
        }
        self.highlighter.highlight(scene, flower);
        self.selection = Selection::Selected(flower);
        previous
    }

    pub fn clear_selection(&mut self, scene: &mut SceneGraph) -> Option<NodeId> {
        let previous = self.selected()?;
        self.highlighter.unhighlight(scene, previous);
        self.selection = Selection::Idle;
        Some(previous)
    }

    /// Leaves Selected and hands back the flower the caller should delete.
    /// Logs and does nothing while Idle.
    pub fn take_for_delete(&mut self, scene: &mut SceneGraph) -> Option<NodeId> {
        let taken = self.clear_selection(scene);
        if taken.is_none() {
            info!("No flower selected to delete");
        }
        taken
    }

    /// Moves the selection onto the flower that replaced the selected one.
    /// Must run before the old node leaves the scene so its look is restored.
    pub fn retarget(&mut self, scene: &mut SceneGraph, replacement: NodeId) {
        if self.selected() != Some(replacement) {
            self.select(scene, replacement);
        }
    }

    /// Drops the selection if it points at `flower`, e.g. before removal
    pub fn forget(&mut self, scene: &mut SceneGraph, flower: NodeId) -> bool {
        if self.selected() == Some(flower) {
            self.clear_selection(scene);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Surface};
    use glam::{Mat4, Vec3};

    fn flower_at(scene: &mut SceneGraph, x: f32, type_id: &str) -> NodeId {
        let flower = scene.add_group(scene.root(), type_id, Mat4::from_translation(Vec3::new(x, 0.0, 0.0)));
        scene.add_surface(
            flower,
            "head",
            Mat4::IDENTITY,
            Surface::with_materials(
                Geometry::Sphere { radius: 0.5 },
                vec![Material::from_hex(0xff0000), Material::from_hex(0x00ff00)],
            ),
        );
        scene.tag_flower(flower, type_id);
        flower
    }

    fn ray_down_at(x: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, 0.0), -Vec3::Y)
    }

    fn head_materials(scene: &SceneGraph, flower: NodeId) -> Vec<Material> {
        let head = scene.surfaces(flower)[0];
        scene.materials(head).unwrap().to_vec()
    }

    #[test]
    fn pick_selects_and_highlights() {
        let mut scene = SceneGraph::new();
        let rose = flower_at(&mut scene, 0.0, "rose");
        let mut engine = SelectionEngine::new();

        let outcome = engine.pick_ray(&mut scene, &ray_down_at(0.0));
        assert_eq!(outcome, PickOutcome::Selected { previous: None, current: rose });
        assert_eq!(engine.selection(), Selection::Selected(rose));
        for m in head_materials(&scene, rose) {
            assert_eq!(m.emissive, Color::from_hex(HIGHLIGHT_EMISSIVE));
            assert_eq!(m.emissive_intensity, HIGHLIGHT_INTENSITY);
        }
    }

    #[test]
    fn switching_selection_restores_previous() {
        let mut scene = SceneGraph::new();
        let a = flower_at(&mut scene, 0.0, "rose");
        let b = flower_at(&mut scene, 3.0, "lily");
        let before = head_materials(&scene, a);
        let mut engine = SelectionEngine::new();

        engine.pick_ray(&mut scene, &ray_down_at(0.0));
        let outcome = engine.pick_ray(&mut scene, &ray_down_at(3.0));

        assert_eq!(outcome, PickOutcome::Selected { previous: Some(a), current: b });
        assert_eq!(head_materials(&scene, a), before);
        assert!(engine.highlighter().is_highlighted(b));
        assert!(!engine.highlighter().is_highlighted(a));
        assert_eq!(engine.highlighter().highlighted_count(), 1);
    }

    #[test]
    fn repeated_cycles_do_not_drift() {
        let mut scene = SceneGraph::new();
        let a = flower_at(&mut scene, 0.0, "rose");
        flower_at(&mut scene, 3.0, "lily");
        let before = head_materials(&scene, a);
        let mut engine = SelectionEngine::new();

        for _ in 0..5 {
            engine.pick_ray(&mut scene, &ray_down_at(0.0));
            engine.pick_ray(&mut scene, &ray_down_at(3.0));
        }
        engine.clear_selection(&mut scene);
        assert_eq!(head_materials(&scene, a), before);
        assert_eq!(engine.highlighter().highlighted_count(), 0);
    }

    #[test]
    fn picking_same_flower_is_noop() {
        let mut scene = SceneGraph::new();
        let rose = flower_at(&mut scene, 0.0, "rose");
        let mut engine = SelectionEngine::new();

        engine.pick_ray(&mut scene, &ray_down_at(0.0));
        assert_eq!(engine.pick_ray(&mut scene, &ray_down_at(0.0)), PickOutcome::AlreadySelected(rose));
        assert_eq!(engine.selected(), Some(rose));
    }

    #[test]
    fn miss_and_non_flower_keep_state() {
        let mut scene = SceneGraph::new();
        let rose = flower_at(&mut scene, 0.0, "rose");
        let floor = scene.add_surface(
            scene.root(),
            "floor",
            Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)),
            Surface::new(Geometry::Sphere { radius: 1.0 }, Material::from_hex(0xcccccc)),
        );
        let mut engine = SelectionEngine::new();
        engine.pick_ray(&mut scene, &ray_down_at(0.0));

        assert_eq!(engine.pick_ray(&mut scene, &ray_down_at(10.0)), PickOutcome::NotAFlower(floor));
        assert_eq!(engine.pick_ray(&mut scene, &ray_down_at(-20.0)), PickOutcome::Missed);
        assert_eq!(engine.selected(), Some(rose));
    }

    #[test]
    fn take_for_delete_when_idle_is_noop() {
        let mut scene = SceneGraph::new();
        let mut engine = SelectionEngine::new();
        assert_eq!(engine.take_for_delete(&mut scene), None);
        assert_eq!(engine.selection(), Selection::Idle);
    }

    #[test]
    fn zero_width_viewport_picks_nothing() {
        use crate::config::{CameraControlsConfig, SceneConfig};

        let mut scene = SceneGraph::new();
        flower_at(&mut scene, 0.0, "rose");
        let camera = OrbitCamera::new(&SceneConfig::default(), &CameraControlsConfig::default());
        let viewport = Viewport::new(0.0, 0.0, 0.0, 600.0);
        let mut engine = SelectionEngine::new();

        assert_eq!(engine.pick_at(&mut scene, &camera, &viewport, 0.0, 300.0), PickOutcome::Missed);
        assert_eq!(engine.selection(), Selection::Idle);
    }

    #[test]
    fn retarget_moves_highlight() {
        let mut scene = SceneGraph::new();
        let old = flower_at(&mut scene, 0.0, "rose");
        let before = head_materials(&scene, old);
        let mut engine = SelectionEngine::new();
        engine.pick_ray(&mut scene, &ray_down_at(0.0));

        let new = flower_at(&mut scene, 0.0, "lily");
        engine.retarget(&mut scene, new);

        assert_eq!(engine.selected(), Some(new));
        assert_eq!(head_materials(&scene, old), before);
        assert!(engine.highlighter().is_highlighted(new));
    }
}
