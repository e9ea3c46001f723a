//! World collections the chest and switch logic reads and mutates.
//!
//! Player movement, enemy AI, bullet flight and bomb fuses belong to other
//! systems. The simulation only needs their current positions and a few
//! flags, so the types here are deliberately thin.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::chest::Chest;
use crate::geometry::{Aabb, BodyShape};
use crate::inventory::Inventory;
use crate::loot::GroundItem;
use crate::switch::Switch;

/// The player body plus the currencies it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Anchor position (top-left for rectangles, centre for `Centered`).
    pub pos: Vec2,
    /// Body extent.
    pub shape: BodyShape,
    /// Currency counters.
    pub inventory: Inventory,
}

impl Player {
    /// A player with the default 30x30 body and an empty inventory.
    #[must_use]
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            shape: BodyShape::default(),
            inventory: Inventory::default(),
        }
    }

    /// Box occupied by the player.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.pos)
    }
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Anchor position.
    pub pos: Vec2,
    /// Body extent.
    pub shape: BodyShape,
    /// Set once the bullet has hit something; the projectile system
    /// removes spent bullets.
    pub spent: bool,
}

impl Bullet {
    /// A live bullet centred on `pos` with half-extent `size`.
    #[must_use]
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            shape: BodyShape::Centered { half: size },
            spent: false,
        }
    }

    /// Box occupied by the bullet.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.pos)
    }
}

/// A placed bomb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    /// Blast centre.
    pub pos: Vec2,
    /// True during the frames the blast is live.
    pub exploding: bool,
}

/// Everything in the current room that chests interact with.
#[derive(Debug, Clone, Default)]
pub struct World {
    /// The player, if spawned.
    pub player: Option<Player>,
    /// Live enemies; zero means the room is clear.
    pub enemy_count: usize,
    /// Bullets in flight.
    pub bullets: Vec<Bullet>,
    /// Bombs on the floor.
    pub bombs: Vec<Bomb>,
    /// Chests in the current room.
    pub chests: Vec<Chest>,
    /// Switches in the current room.
    pub switches: Vec<Switch>,
    /// Loot on the floor, across all rooms visited.
    pub ground_items: Vec<GroundItem>,
}

impl World {
    /// Whether all hostiles are gone.
    #[must_use]
    pub fn room_cleared(&self) -> bool {
        self.enemy_count == 0
    }

    /// Looks up a chest by id.
    #[must_use]
    pub fn chest(&self, id: &str) -> Option<&Chest> {
        self.chests.iter().find(|chest| chest.id.as_str() == id)
    }

    /// Looks up a chest by id, mutably.
    pub fn chest_mut(&mut self, id: &str) -> Option<&mut Chest> {
        self.chests.iter_mut().find(|chest| chest.id.as_str() == id)
    }

    /// Ground items lying in the given room.
    pub fn items_in_room(&self, room: IVec2) -> impl Iterator<Item = &GroundItem> + '_ {
        self.ground_items.iter().filter(move |item| item.room == room)
    }
}
