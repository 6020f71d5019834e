//! Archive-able fixture types.
//!
//! - [`Record`]: a mixed struct with a nested array, serialized field by
//!   field.
//! - [`Vertex`]: plain-old-data, serialized as raw bytes.

use anvil_containers::{Archivable, Archive, ArchiveError, GrowableArray};
use bytemuck::{Pod, Zeroable};

/// A game-object-like record keyed by `id`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub id: u32,
    pub health: f32,
    pub alive: bool,
    pub inventory: GrowableArray<u16>,
}

impl Record {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            health: 100.0 - id as f32,
            alive: id % 3 != 0,
            inventory: (0..id as u16 % 5).collect(),
        }
    }
}

impl Archivable for Record {
    fn archive<A: Archive + ?Sized>(
        &mut self,
        ar: &mut A,
        name: &str,
        _label: &str,
    ) -> Result<(), ArchiveError> {
        self.id.archive(ar, name, "id")?;
        self.health.archive(ar, name, "health")?;
        self.alive.archive(ar, name, "alive")?;
        self.inventory.archive(ar, name, "inventory")
    }
}

/// A tightly packed vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: u32,
}

impl Vertex {
    pub fn new(i: u32) -> Self {
        let f = i as f32;
        Self {
            position: [f, f * 0.5, -f],
            color: 0xFF00_0000 | i,
        }
    }
}
