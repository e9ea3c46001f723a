//! Positional collision resolution for chests.
//!
//! The `CollisionResolver` handles:
//! - Player vs chest: push the chest if it can move, otherwise the player
//! - Chest vs chest: a fixed number of relaxation passes over closed chests
//!
//! Corrections are applied along a single axis (the one with less
//! penetration). There is no velocity; the solver only moves positions.
//!
//! # Iteration Count
//!
//! Chest stacks are separated by a small fixed number of passes rather than
//! an exact solve. More passes settle larger piles at linear cost. Two passes
//! are enough for the handful of chests a room holds.

use glam::Vec2;

use crate::chest::{Chest, ChestState};
use crate::config::SimConfig;
use crate::geometry::{separation, RoomBounds};
use crate::world::Player;

/// Outcome of resolving the player against one chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerContact {
    /// The padded boxes do not overlap.
    Clear,
    /// The chest slid out of the way.
    ChestShoved,
    /// The player was pushed back.
    PlayerPushed,
}

/// Resolver for chest collisions.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use strongbox_core::config::SimConfig;
/// use strongbox_core::physics::CollisionResolver;
///
/// let resolver = CollisionResolver::new(&SimConfig::default());
/// assert_eq!(resolver.iterations(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    padding: f32,
    push_epsilon: f32,
    bounds: RoomBounds,
    iterations: u32,
}

impl CollisionResolver {
    /// Creates a resolver from the simulation tunables.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            padding: config.pushback_padding,
            push_epsilon: config.push_epsilon,
            bounds: config.room_bounds(),
            iterations: config.solver_iterations,
        }
    }

    /// Chest-vs-chest passes per call to [`Self::resolve_chests`].
    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Clamp rectangle applied to displaced chests.
    #[must_use]
    pub fn bounds(&self) -> RoomBounds {
        self.bounds
    }

    /// Separates the player from one chest.
    ///
    /// The chest's hitbox is padded for this check so the player is held a
    /// little way off. A pushable chest is displaced first and clamped to
    /// the room; if the clamp leaves it where it was, the player is pushed
    /// instead.
    pub fn resolve_player(&self, player: &mut Player, chest: &mut Chest) -> PlayerContact {
        let padded = chest.aabb().inflate(self.padding);
        let Some(sep) = separation(&player.aabb(), &padded) else {
            return PlayerContact::Clear;
        };
        let push = sep.push();

        if chest.is_pushable() {
            let before = chest.pos;
            chest.pos = self.bounds.clamp(chest.pos - push, chest.size);
            let moved = (chest.pos - before).abs();
            if moved.x > self.push_epsilon || moved.y > self.push_epsilon {
                return PlayerContact::ChestShoved;
            }
        }

        player.pos += push;
        PlayerContact::PlayerPushed
    }

    /// Separates overlapping closed chests. Returns the number of corrections.
    pub fn resolve_chests(&self, chests: &mut [Chest]) -> usize {
        let mut corrections = 0;
        for _ in 0..self.iterations {
            for j in 1..chests.len() {
                let (head, tail) = chests.split_at_mut(j);
                let b = &mut tail[0];
                if b.state() != ChestState::Closed {
                    continue;
                }
                for a in head.iter_mut() {
                    if a.state() == ChestState::Closed && self.resolve_pair(a, b) {
                        corrections += 1;
                    }
                }
            }
        }
        corrections
    }

    /// Separates two chests. Returns whether either moved.
    ///
    /// Both pushable: split the overlap. One pushable: it takes the whole
    /// overlap. Neither: left alone.
    pub fn resolve_pair(&self, a: &mut Chest, b: &mut Chest) -> bool {
        let Some(sep) = separation(&a.aabb(), &b.aabb()) else {
            return false;
        };
        let push = sep.push();

        let (shift_a, shift_b) = match (a.is_pushable(), b.is_pushable()) {
            (true, true) => (push * 0.5, -push * 0.5),
            (true, false) => (push, Vec2::ZERO),
            (false, true) => (Vec2::ZERO, -push),
            (false, false) => return false,
        };

        if a.is_pushable() {
            a.pos = self.bounds.clamp(a.pos + shift_a, a.size);
        }
        if b.is_pushable() {
            b.pos = self.bounds.clamp(b.pos + shift_b, b.size);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::chest::ChestId;
    use crate::config::{ChestConfig, LockConfig};

    fn resolver() -> CollisionResolver {
        CollisionResolver::new(&SimConfig::default())
    }

    fn chest(id: &str, x: f32, y: f32, moveable: bool, locked: bool) -> Chest {
        let config = ChestConfig {
            x,
            y,
            moveable,
            locked: locked.then_some(LockConfig::Flag(true)),
            ..ChestConfig::default()
        };
        Chest::from_config(ChestId::new(id), Arc::new(config), ChestState::Closed, 40.0, None)
    }

    mod player_tests {
        use super::*;

        #[test]
        fn far_player_is_untouched() {
            let mut player = Player::at(Vec2::new(500.0, 500.0));
            let mut c = chest("a", 100.0, 100.0, true, false);
            assert_eq!(resolver().resolve_player(&mut player, &mut c), PlayerContact::Clear);
            assert_eq!(player.pos, Vec2::new(500.0, 500.0));
        }

        #[test]
        fn static_chest_pushes_player_on_one_axis() {
            // Player box [60,90]x[105,135], padded chest box [75,165]x[75,165]
            let mut player = Player::at(Vec2::new(60.0, 105.0));
            let mut c = chest("a", 100.0, 100.0, false, false);

            let contact = resolver().resolve_player(&mut player, &mut c);

            assert_eq!(contact, PlayerContact::PlayerPushed);
            assert_eq!(player.pos, Vec2::new(45.0, 105.0));
            assert_eq!(c.pos, Vec2::new(100.0, 100.0));
        }

        #[test]
        fn moveable_chest_is_shoved() {
            let mut player = Player::at(Vec2::new(60.0, 105.0));
            let mut c = chest("a", 100.0, 100.0, true, false);

            let contact = resolver().resolve_player(&mut player, &mut c);

            assert_eq!(contact, PlayerContact::ChestShoved);
            assert_eq!(c.pos, Vec2::new(115.0, 100.0));
            assert_eq!(player.pos, Vec2::new(60.0, 105.0));
        }

        #[test]
        fn locked_moveable_chest_pushes_player() {
            let mut player = Player::at(Vec2::new(60.0, 105.0));
            let mut c = chest("a", 100.0, 100.0, true, true);

            assert_eq!(
                resolver().resolve_player(&mut player, &mut c),
                PlayerContact::PlayerPushed
            );
            assert_eq!(c.pos, Vec2::new(100.0, 100.0));
        }

        #[test]
        fn chest_against_wall_falls_through_to_player() {
            // Chest already at the right inset (800 - 20 - 40 = 740)
            let mut player = Player::at(Vec2::new(700.0, 105.0));
            let mut c = chest("a", 740.0, 100.0, true, false);

            let contact = resolver().resolve_player(&mut player, &mut c);

            assert_eq!(contact, PlayerContact::PlayerPushed);
            assert_eq!(c.pos.x, 740.0);
            assert!(player.pos.x < 700.0);
        }
    }

    mod chest_tests {
        use super::*;

        #[test]
        fn both_moveable_split_overlap() {
            let mut a = chest("a", 100.0, 100.0, true, false);
            let mut b = chest("b", 130.0, 100.0, true, false);

            assert!(resolver().resolve_pair(&mut a, &mut b));
            assert_eq!(a.pos.x, 95.0);
            assert_eq!(b.pos.x, 135.0);
            assert!(!a.aabb().intersects(&b.aabb()));
        }

        #[test]
        fn single_moveable_takes_full_overlap() {
            let mut a = chest("a", 100.0, 100.0, false, false);
            let mut b = chest("b", 130.0, 100.0, true, false);

            assert!(resolver().resolve_pair(&mut a, &mut b));
            assert_eq!(a.pos.x, 100.0);
            assert_eq!(b.pos.x, 140.0);
        }

        #[test]
        fn neither_moveable_is_left_alone() {
            let mut a = chest("a", 100.0, 100.0, false, false);
            let mut b = chest("b", 130.0, 100.0, true, true);

            assert!(!resolver().resolve_pair(&mut a, &mut b));
            assert_eq!(a.pos.x, 100.0);
            assert_eq!(b.pos.x, 130.0);
        }

        #[test]
        fn only_closed_chests_participate() {
            let mut chests = vec![
                chest("a", 100.0, 100.0, true, false),
                chest("b", 130.0, 100.0, true, false),
            ];
            chests[1].open();

            assert_eq!(resolver().resolve_chests(&mut chests), 0);
            assert_eq!(chests[0].pos.x, 100.0);
        }

        #[test]
        fn displaced_chest_is_clamped() {
            let mut a = chest("a", 30.0, 100.0, true, false);
            let mut b = chest("b", 40.0, 100.0, false, false);

            resolver().resolve_pair(&mut a, &mut b);
            assert_eq!(a.pos.x, 20.0);
        }
    }
}
