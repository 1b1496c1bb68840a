//! Arena of reusable text entities.
//!
//! Entities are addressed by [`EntityId`]. A handle is either checked out (owned by one run)
//! or sitting on the free list; the pool never shrinks.

use crate::entity::{Font, TextEntity};
use crate::palette::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

#[derive(Debug, Default)]
pub struct GlyphPool {
    slots: Vec<TextEntity>,
    in_use: Vec<bool>,
    free: Vec<EntityId>,
}

impl GlyphPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconfigure a free slot (most recently released first) or grow the arena.
    pub fn acquire(&mut self, content: &str, font: Font, color: Rgb, opacity: f32) -> EntityId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0].configure(content, font, color, opacity);
            self.in_use[id.0] = true;
            return id;
        }
        let id = EntityId(self.slots.len());
        self.slots.push(TextEntity::new(content, font, color, opacity));
        self.in_use.push(true);
        id
    }

    /// Return a handle to the free list. Releasing a free or unknown handle is ignored.
    pub fn release(&mut self, id: EntityId) {
        match self.in_use.get_mut(id.0) {
            Some(flag) if *flag => {
                *flag = false;
                self.slots[id.0].alive = false;
                self.free.push(id);
            }
            _ => {}
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&TextEntity> {
        if self.is_checked_out(id) {
            self.slots.get(id.0)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut TextEntity> {
        if self.is_checked_out(id) {
            self.slots.get_mut(id.0)
        } else {
            None
        }
    }

    pub fn is_checked_out(&self, id: EntityId) -> bool {
        self.in_use.get(id.0).copied().unwrap_or(false)
    }

    /// Total slots ever created.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn checked_out(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
