//! The rendering target runs attach their entities to.

use crate::geometry::Rect;
use crate::pool::{EntityId, GlyphPool};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("presentation surface is unavailable")]
    Unavailable,
    #[error("unknown {0}")]
    UnknownContainer(ContainerId),
    #[error("surface I/O error: {0}")]
    Io(String),
}

/// Everything the engine needs from a window or terminal.
///
/// Entities live in the [`GlyphPool`]; a surface only tracks which handles are attached to
/// which container and reads them back from the pool when asked to present a frame.
pub trait PresentationSurface {
    fn name(&self) -> &'static str;
    /// `None` once the surface has been torn down.
    fn bounds(&self) -> Option<Rect>;
    fn register_container(&mut self) -> Result<ContainerId, SurfaceError>;
    fn unregister_container(&mut self, container: ContainerId) -> Result<(), SurfaceError>;
    fn add_entity(&mut self, container: ContainerId, entity: EntityId) -> Result<(), SurfaceError>;
    fn remove_entity(&mut self, container: ContainerId, entity: EntityId)
    -> Result<(), SurfaceError>;
    fn present(&mut self, pool: &GlyphPool) -> Result<(), SurfaceError>;
}

/// Container bookkeeping shared by the concrete surfaces.
#[derive(Debug, Default)]
pub(crate) struct ContainerSet {
    next_id: u64,
    containers: BTreeMap<ContainerId, Vec<EntityId>>,
}

impl ContainerSet {
    pub(crate) fn register(&mut self) -> ContainerId {
        self.next_id += 1;
        let id = ContainerId(self.next_id);
        self.containers.insert(id, Vec::new());
        id
    }

    pub(crate) fn unregister(&mut self, container: ContainerId) -> Result<(), SurfaceError> {
        self.containers
            .remove(&container)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownContainer(container))
    }

    pub(crate) fn add(
        &mut self,
        container: ContainerId,
        entity: EntityId,
    ) -> Result<(), SurfaceError> {
        let list = self
            .containers
            .get_mut(&container)
            .ok_or(SurfaceError::UnknownContainer(container))?;
        if !list.contains(&entity) {
            list.push(entity);
        }
        Ok(())
    }

    pub(crate) fn remove(
        &mut self,
        container: ContainerId,
        entity: EntityId,
    ) -> Result<(), SurfaceError> {
        let list = self
            .containers
            .get_mut(&container)
            .ok_or(SurfaceError::UnknownContainer(container))?;
        list.retain(|e| *e != entity);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.containers.len()
    }

    pub(crate) fn attached(&self) -> usize {
        self.containers.values().map(Vec::len).sum()
    }

    pub(crate) fn entities(&self, container: ContainerId) -> &[EntityId] {
        self.containers.get(&container).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn iter_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.containers.values().flatten().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.containers.clear();
    }
}

/// In-memory surface with no output. Used by tests and the `--surface headless` mode.
#[derive(Debug)]
pub struct HeadlessSurface {
    bounds: Rect,
    torn_down: bool,
    containers: ContainerSet,
    frames: u64,
    peak_attached: usize,
    last_visible: usize,
}

impl HeadlessSurface {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            torn_down: false,
            containers: ContainerSet::default(),
            frames: 0,
            peak_attached: 0,
            last_visible: 0,
        }
    }

    /// Simulate the window going away; every later call fails with `Unavailable`.
    pub fn tear_down(&mut self) {
        self.torn_down = true;
        self.containers.clear();
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn attached_count(&self) -> usize {
        self.containers.attached()
    }

    pub fn entities_in(&self, container: ContainerId) -> &[EntityId] {
        self.containers.entities(container)
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn peak_attached(&self) -> usize {
        self.peak_attached
    }

    /// Entities with non-zero opacity in the last presented frame.
    pub fn last_visible(&self) -> usize {
        self.last_visible
    }

    fn ensure_live(&self) -> Result<(), SurfaceError> {
        if self.torn_down {
            Err(SurfaceError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl PresentationSurface for HeadlessSurface {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn bounds(&self) -> Option<Rect> {
        (!self.torn_down).then_some(self.bounds)
    }

    fn register_container(&mut self) -> Result<ContainerId, SurfaceError> {
        self.ensure_live()?;
        Ok(self.containers.register())
    }

    fn unregister_container(&mut self, container: ContainerId) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.containers.unregister(container)
    }

    fn add_entity(&mut self, container: ContainerId, entity: EntityId) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.containers.add(container, entity)?;
        self.peak_attached = self.peak_attached.max(self.containers.attached());
        Ok(())
    }

    fn remove_entity(
        &mut self,
        container: ContainerId,
        entity: EntityId,
    ) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.containers.remove(container, entity)
    }

    fn present(&mut self, pool: &GlyphPool) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.frames += 1;
        self.last_visible = self
            .containers
            .iter_entities()
            .filter_map(|id| pool.get(id))
            .filter(|e| e.opacity > 0.0)
            .count();
        Ok(())
    }
}
