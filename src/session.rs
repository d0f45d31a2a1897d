use glam::{Mat4, Quat, Vec3};
use log::{debug, error, info, warn};

use crate::allocator::SlotAllocator;
use crate::camera::{OrbitCamera, Viewport};
use crate::config::{BouquetConfig, FlowerType};
use crate::error::{BouquetError, Result};
use crate::geometry::{Geometry, Material, Surface};
use crate::layout::{generate_slots, Slot};
use crate::models::{procedural_flower, Model, ModelCache, ModelSource};
use crate::picking::{PickOutcome, Selection, SelectionEngine};
use crate::registry::{FlowerInstance, FlowerRegistry};
use crate::scene::{NodeId, SceneGraph};

/// Slot and flower counts a front end needs to label and enable controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BouquetCounts {
    pub occupied: usize,
    pub free: usize,
    pub capacity: usize,
}

impl BouquetCounts {
    pub fn can_add(&self) -> bool {
        self.free > 0
    }

    pub fn can_remove(&self) -> bool {
        self.occupied > 0
    }

    pub fn can_clear(&self) -> bool {
        self.occupied > 0
    }
}

/// A slot taken from the allocator whose flower is not in the scene yet
#[derive(Debug)]
#[must_use = "a reserved slot stays taken until it is attached or abandoned"]
pub struct PendingFlower {
    slot: usize,
    flower: FlowerType,
}

impl PendingFlower {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn flower(&self) -> &FlowerType {
        &self.flower
    }
}

/// One editing session: the bouquet, its scene, camera and selection.
///
/// Every mutation keeps allocator, registry and scene in step, and a slot
/// is never counted twice: `occupied == pending + registry.len()`.
pub struct BouquetSession<S> {
    config: BouquetConfig,
    slots: Vec<Slot>,
    allocator: SlotAllocator,
    registry: FlowerRegistry,
    scene: SceneGraph,
    floor: NodeId,
    camera: OrbitCamera,
    viewport: Viewport,
    selection: SelectionEngine,
    models: ModelCache<S>,
    pending: usize,
}

impl<S: ModelSource> BouquetSession<S> {
    pub fn new(config: BouquetConfig, source: S, viewport: Viewport) -> Self {
        let slots = generate_slots(&config.rings, config.include_center);
        info!("Generated {} flower slots", slots.len());

        let mut scene = SceneGraph::new();
        let floor_transform = Mat4::from_rotation_translation(
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, config.scene.floor_y, 0.0),
        );
        let floor = scene.add_surface(
            scene.root(),
            "floor",
            floor_transform,
            Surface::new(
                Geometry::Disc {
                    radius: config.scene.floor_radius,
                },
                Material::new(config.scene.floor_color),
            ),
        );

        let camera = OrbitCamera::new(&config.scene, &config.camera_controls);

        Self {
            allocator: SlotAllocator::new(slots.len()),
            registry: FlowerRegistry::new(),
            slots,
            scene,
            floor,
            camera,
            viewport,
            selection: SelectionEngine::new(),
            models: ModelCache::new(source),
            pending: 0,
            config,
        }
    }

    pub fn config(&self) -> &BouquetConfig {
        &self.config
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn allocator(&self) -> &SlotAllocator {
        &self.allocator
    }

    pub fn registry(&self) -> &FlowerRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn floor(&self) -> NodeId {
        self.floor
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn models(&self) -> &ModelCache<S> {
        &self.models
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn counts(&self) -> BouquetCounts {
        BouquetCounts {
            occupied: self.allocator.occupied_count(),
            free: self.allocator.free_count(),
            capacity: self.allocator.capacity(),
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    pub fn selected_instance(&self) -> Option<&FlowerInstance> {
        self.selection
            .selected()
            .and_then(|handle| self.registry.find_by_handle(handle))
    }

    pub fn selection_engine(&self) -> &SelectionEngine {
        &self.selection
    }

    fn flower_type(&self, type_id: &str) -> Result<FlowerType> {
        self.config
            .flower_type(type_id)
            .cloned()
            .ok_or_else(|| BouquetError::UnknownFlowerType(type_id.to_string()))
    }

    /// Takes the lowest free slot right away, before any model loading
    pub fn reserve(&mut self, type_id: &str) -> Result<PendingFlower> {
        let flower = self.flower_type(type_id)?;
        let slot = self.allocator.allocate()?;
        self.pending += 1;
        debug!("Reserved slot {} for '{}'", slot, type_id);
        Ok(PendingFlower { slot, flower })
    }

    /// Places a model for a reserved slot and registers it
    pub fn attach(&mut self, pending: PendingFlower, model: Model) -> NodeId {
        let handle = self.spawn(&pending.flower, pending.slot, model);
        self.registry.add(FlowerInstance {
            slot_index: pending.slot,
            type_id: pending.flower.id,
            handle,
        });
        self.pending -= 1;
        handle
    }

    /// Gives a reserved slot back without placing anything
    pub fn abandon(&mut self, pending: PendingFlower) {
        if let Err(e) = self.allocator.release(pending.slot) {
            error!("Abandoning reservation failed: {}", e);
        }
        self.pending -= 1;
    }

    fn spawn(&mut self, flower: &FlowerType, slot: usize, model: Model) -> NodeId {
        let placement = self.slots[slot].placement();
        self.scene.spawn_model(model, placement, &flower.id)
    }

    /// Model for `flower`, or the procedural placeholder if loading fails
    async fn model_for(&mut self, flower: &FlowerType) -> Model {
        match self.models.get_or_load(flower).await {
            Ok(model) => model,
            Err(e) => {
                warn!("Using placeholder for '{}': {:#}", flower.id, e);
                procedural_flower(flower.color)
            }
        }
    }

    pub async fn add_flower(&mut self, type_id: &str) -> Result<NodeId> {
        let pending = self.reserve(type_id)?;
        let flower = pending.flower.clone();
        let model = self.model_for(&flower).await;
        let handle = self.attach(pending, model);
        info!("Added '{}' as {}", type_id, handle);
        Ok(handle)
    }

    /// Replaces the bouquet with `type_id` in every slot. Returns how many
    /// flowers were placed.
    pub async fn generate_full_bouquet(&mut self, type_id: &str) -> Result<usize> {
        let flower = self.flower_type(type_id)?;
        self.clear_all();

        // Load once up front so every slot clones the cached template
        let template = self.model_for(&flower).await;
        info!("Model for '{}' ready, filling {} slots", flower.id, self.slots.len());

        let mut placed = 0;
        while self.allocator.free_count() > 0 {
            let pending = self.reserve(type_id)?;
            self.attach(pending, template.clone());
            placed += 1;
        }
        Ok(placed)
    }

    /// Removes the most recently added flower
    pub fn remove_last(&mut self) -> Option<FlowerInstance> {
        let instance = self.registry.remove_last()?;
        self.detach(&instance);
        info!("Removed '{}' from slot {}", instance.type_id, instance.slot_index);
        Some(instance)
    }

    /// Removes every placed flower. Returns how many were removed.
    ///
    /// Slots held by pending reservations stay taken; their flowers are
    /// attached or abandoned later as usual.
    pub fn clear_all(&mut self) -> usize {
        self.selection.clear_selection(&mut self.scene);
        let removed = self.registry.clear();
        for instance in &removed {
            self.scene.remove(instance.handle);
            if let Err(e) = self.allocator.release(instance.slot_index) {
                error!("Slot bookkeeping out of sync: {}", e);
            }
        }
        if self.pending != 0 {
            debug!("Keeping {} pending reservations across clear", self.pending);
        }
        info!("Cleared {} flowers", removed.len());
        removed.len()
    }

    fn detach(&mut self, instance: &FlowerInstance) {
        self.selection.forget(&mut self.scene, instance.handle);
        self.scene.remove(instance.handle);
        if let Err(e) = self.allocator.release(instance.slot_index) {
            error!("Slot bookkeeping out of sync: {}", e);
        }
    }

    pub fn pick_at(&mut self, x: f32, y: f32) -> PickOutcome {
        self.selection
            .pick_at(&mut self.scene, &self.camera, &self.viewport, x, y)
    }

    pub fn clear_selection(&mut self) -> Option<NodeId> {
        self.selection.clear_selection(&mut self.scene)
    }

    /// Deletes the selected flower and frees its slot. `Ok(None)` when
    /// nothing is selected.
    pub fn delete_selected(&mut self) -> Result<Option<FlowerInstance>> {
        let Some(handle) = self.selection.take_for_delete(&mut self.scene) else {
            return Ok(None);
        };
        let Some(instance) = self.registry.find_by_handle(handle).cloned() else {
            warn!("Selected node {} has no flower instance", handle);
            return Err(BouquetError::NotFound(handle));
        };
        self.registry.remove_by_handle(handle)?;
        self.scene.remove(handle);
        self.allocator.release(instance.slot_index)?;
        info!("Deleted '{}' from slot {}", instance.type_id, instance.slot_index);
        Ok(Some(instance))
    }

    /// Swaps the selected flower for `type_id` in the same slot and keeps it
    /// selected. `Ok(None)` when nothing is selected.
    pub async fn replace_selected(&mut self, type_id: &str) -> Result<Option<NodeId>> {
        let flower = self.flower_type(type_id)?;
        let Some(old) = self.selection.selected() else {
            info!("No flower selected to replace");
            return Ok(None);
        };
        let Some(slot) = self.registry.find_by_handle(old).map(|f| f.slot_index) else {
            warn!("Selected node {} has no flower instance, clearing selection", old);
            self.selection.clear_selection(&mut self.scene);
            return Err(BouquetError::NotFound(old));
        };

        let model = self.model_for(&flower).await;
        let new = self.spawn(&flower, slot, model);
        self.registry.replace(old, flower.id.as_str(), new)?;
        self.selection.retarget(&mut self.scene, new);
        self.scene.remove(old);
        info!("Replaced flower in slot {} with '{}'", slot, flower.id);
        Ok(Some(new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RingSpec;
    use crate::math::Color;
    use anyhow::anyhow;
    use futures::future::{FutureExt, LocalBoxFuture};

    struct PlaceholderSource;

    impl ModelSource for PlaceholderSource {
        fn load<'a>(&'a self, flower: &'a FlowerType) -> LocalBoxFuture<'a, anyhow::Result<Model>> {
            async move { Ok(procedural_flower(flower.color).normalized()) }.boxed_local()
        }
    }

    struct BrokenSource;

    impl ModelSource for BrokenSource {
        fn load<'a>(&'a self, flower: &'a FlowerType) -> LocalBoxFuture<'a, anyhow::Result<Model>> {
            async move { Err(anyhow!("{} is missing", flower.model_path.display())) }.boxed_local()
        }
    }

    fn small_config() -> BouquetConfig {
        BouquetConfig {
            rings: vec![RingSpec::new(4, 1.5, 0.0, 30.0)],
            include_center: true,
            ..Default::default()
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn reservation_counts_as_occupied() {
        let mut session = BouquetSession::new(small_config(), PlaceholderSource, viewport());
        let pending = session.reserve("rose").unwrap();
        assert_eq!(pending.slot(), 0);
        assert_eq!(session.counts().occupied, 1);
        assert_eq!(session.pending(), 1);
        assert!(session.registry().is_empty());

        session.attach(pending, procedural_flower(Color::WHITE));
        assert_eq!(session.pending(), 0);
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.counts().occupied, 1);
    }

    #[test]
    fn abandon_releases_slot() {
        let mut session = BouquetSession::new(small_config(), PlaceholderSource, viewport());
        let pending = session.reserve("rose").unwrap();
        session.abandon(pending);
        assert_eq!(session.counts().free, 5);
        assert_eq!(session.pending(), 0);
    }

    #[test]
    fn load_failure_substitutes_placeholder() {
        let mut session = BouquetSession::new(small_config(), BrokenSource, viewport());
        let handle = pollster::block_on(session.add_flower("rose")).unwrap();
        assert!(session.scene().contains(handle));
        assert_eq!(session.scene().flower_type(handle), Some("rose"));
        assert_eq!(session.counts().occupied, 1);
        assert_eq!(session.pending(), 0);
    }

    #[test]
    fn unknown_type_reserves_nothing() {
        let mut session = BouquetSession::new(small_config(), PlaceholderSource, viewport());
        let err = pollster::block_on(session.add_flower("tulip")).unwrap_err();
        assert_eq!(err, BouquetError::UnknownFlowerType("tulip".into()));
        assert_eq!(session.counts().free, 5);
    }

    #[test]
    fn clear_all_keeps_pending_reservation_for_attach() {
        let mut session = BouquetSession::new(small_config(), PlaceholderSource, viewport());
        pollster::block_on(session.add_flower("rose")).unwrap();
        let pending = session.reserve("lily").unwrap();
        assert_eq!(pending.slot(), 1);

        assert_eq!(session.clear_all(), 1);
        assert_eq!(session.pending(), 1);
        assert_eq!(session.counts().occupied, 1);
        assert!(!session.allocator().is_free(1));

        let handle = session.attach(pending, procedural_flower(Color::WHITE));
        assert_eq!(session.pending(), 0);
        assert_eq!(session.registry().find_by_handle(handle).unwrap().slot_index, 1);
        assert_eq!(session.counts().occupied, session.registry().len());
    }

    #[test]
    fn clear_all_then_abandon_frees_everything() {
        let mut session = BouquetSession::new(small_config(), PlaceholderSource, viewport());
        let pending = session.reserve("rose").unwrap();
        session.clear_all();
        session.abandon(pending);
        assert_eq!(session.pending(), 0);
        assert_eq!(session.counts().free, 5);
    }

    #[test]
    fn clear_all_never_hands_out_a_reserved_slot() {
        let mut session = BouquetSession::new(small_config(), PlaceholderSource, viewport());
        let first = session.reserve("rose").unwrap();
        session.clear_all();
        let second = session.reserve("lily").unwrap();
        assert_ne!(first.slot(), second.slot());
        assert_eq!(session.counts().occupied, session.pending() + session.registry().len());

        session.attach(second, procedural_flower(Color::WHITE));
        session.attach(first, procedural_flower(Color::WHITE));
        let mut slots: Vec<usize> = session.registry().iter().map(|f| f.slot_index).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn remove_last_clears_its_selection() {
        let mut session = BouquetSession::new(small_config(), PlaceholderSource, viewport());
        let handle = pollster::block_on(session.add_flower("rose")).unwrap();
        let center = session.camera().project_to_screen(session.viewport(), Vec3::ZERO);
        assert!(matches!(session.pick_at(center.x, center.y), PickOutcome::Selected { current, .. } if current == handle));

        let removed = session.remove_last().unwrap();
        assert_eq!(removed.handle, handle);
        assert_eq!(session.selection(), Selection::Idle);
        assert_eq!(session.selection_engine().highlighter().highlighted_count(), 0);
    }
}
