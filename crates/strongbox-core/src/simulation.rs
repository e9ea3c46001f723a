//! Simulation module with the per-tick update loop.
//!
//! The `Simulation` owns the room's world state and runs one deterministic
//! update per call to [`Simulation::step`]:
//!
//! 1. **DELIVER**: Apply loot that finished resolving since the last tick
//! 2. **INPUT**: React to interaction keys (only while playing)
//! 3. **SWITCHES**: Proximity presses, which may restock chests
//! 4. **CHESTS**: Reveals, player contact, chest stacking, bullets and bombs
//! 5. **LOOT**: Schedule fetches for every chest that opened this tick
//!
//! # Determinism
//!
//! All random draws come from a `ChaCha8Rng` seeded with the master seed, and
//! chests are iterated in id order. Loot fetches complete in any order, so
//! ground item jitter is drawn when a delivery is applied, not when it
//! arrives.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strongbox_core::loot::MemoryContentSource;
//! use strongbox_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(42, Arc::new(MemoryContentSource::new()));
//! for _ in 0..10 {
//!     sim.step();
//! }
//! assert_eq!(sim.tick(), 10);
//! ```

use std::fmt;
use std::sync::Arc;

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chest::{spawn_chests, Chest, ChestState, Reveal};
use crate::config::{RoomDescriptor, SimConfig};
use crate::feedback::{Color, Cue, Feedback, FeedbackQueue};
use crate::inventory::{CurrencyStore, MemoryCurrencyStore, RED_SHARD_KEY};
use crate::lock::try_unlock;
use crate::loot::{ContentSource, GroundItem, ItemTemplate, LootOrder, LootPipeline};
use crate::physics::CollisionResolver;
use crate::switch::{spawn_switches, update_switches, SwitchContext, SwitchRules};
use crate::world::{Player, World};

// =============================================================================
// Phase and Input
// =============================================================================

/// Top-level game mode. Chests only react to input in [`GamePhase::Play`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen.
    #[default]
    Title,
    /// In a room, playing.
    Play,
    /// Paused; the world is frozen.
    Paused,
    /// Run over.
    GameOver,
}

/// Physical key codes the simulation cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Space bar.
    Space,
    /// Enter / Return.
    Enter,
    /// The E key.
    KeyE,
    /// Anything else, by its code name.
    Other(String),
}

impl KeyCode {
    /// Maps a DOM-style key code (`"Space"`, `"KeyE"`, ...) to a `KeyCode`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => Self::Space,
            "Enter" => Self::Enter,
            "KeyE" => Self::KeyE,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this key triggers chest interaction.
    #[must_use]
    pub fn is_interact(&self) -> bool {
        matches!(self, Self::Space | Self::Enter | Self::KeyE)
    }
}

/// Input delivered from the host's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down.
    KeyDown(KeyCode),
}

/// Sending half of an input subscription.
pub type InputSender = mpsc::UnboundedSender<InputEvent>;

// =============================================================================
// Simulation
// =============================================================================

/// The chest/switch simulation for one room at a time.
///
/// `Simulation` manages:
/// - The world collections (player, chests, switches, projectiles, loot)
/// - A seeded random source for every draw
/// - The loot pipeline and its room generation counter
/// - The feedback queue the host drains each frame
///
/// # Room Generations
///
/// Every load or unload bumps a generation counter. Loot orders carry the
/// generation they were scheduled in, and deliveries from an older
/// generation are discarded, so a slow fetch can never drop items into the
/// wrong room.
pub struct Simulation {
    config: SimConfig,
    world: World,
    rng: ChaCha8Rng,
    master_seed: u64,
    tick: u64,
    phase: GamePhase,
    feedback: FeedbackQueue,
    store: Box<dyn CurrencyStore>,
    catalog: Vec<ItemTemplate>,
    loot: LootPipeline,
    resolver: CollisionResolver,
    switch_rules: SwitchRules,
    input: Option<mpsc::UnboundedReceiver<InputEvent>>,
    room: IVec2,
    generation: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("phase", &self.phase)
            .field("room", &self.room)
            .field("generation", &self.generation)
            .field("chests", &self.world.chests.len())
            .field("switches", &self.world.switches.len())
            .field("loot", &self.loot)
            .field("master_seed", &self.master_seed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation with default tunables.
    ///
    /// # Arguments
    ///
    /// * `seed` - Master seed for every random draw
    /// * `source` - Where loot manifests and item templates are fetched from
    #[must_use]
    pub fn new(seed: u64, source: Arc<dyn ContentSource>) -> Self {
        Self::with_config(SimConfig::default(), seed, source)
    }

    /// Creates a simulation with explicit tunables.
    ///
    /// Starts on the title screen with an empty world and an in-memory
    /// currency store.
    #[must_use]
    pub fn with_config(config: SimConfig, seed: u64, source: Arc<dyn ContentSource>) -> Self {
        Self {
            resolver: CollisionResolver::new(&config),
            switch_rules: SwitchRules::from(&config),
            config,
            world: World::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            master_seed: seed,
            tick: 0,
            phase: GamePhase::default(),
            feedback: FeedbackQueue::new(),
            store: Box::new(MemoryCurrencyStore::new()),
            catalog: Vec::new(),
            loot: LootPipeline::new(source),
            input: None,
            room: IVec2::ZERO,
            generation: 0,
        }
    }

    /// Replaces the persistent currency store.
    #[must_use]
    pub fn with_currency_store(mut self, store: Box<dyn CurrencyStore>) -> Self {
        self.store = store;
        self
    }

    /// Runs loot orders on `runtime`.
    ///
    /// Hosts that call [`step`](Self::step) from a plain game loop, outside
    /// any tokio context, hand in a runtime handle here so opened chests
    /// still drop their loot.
    #[must_use]
    pub fn with_runtime(mut self, runtime: tokio::runtime::Handle) -> Self {
        self.loot = self.loot.with_runtime(runtime);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Ticks executed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.master_seed
    }

    /// Tunables in effect.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current game phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Switches the game phase.
    pub fn set_phase(&mut self, phase: GamePhase) {
        if phase != self.phase {
            debug!(from = ?self.phase, to = ?phase, "phase change");
            self.phase = phase;
        }
    }

    /// World state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world state, for the systems that move the player, enemies
    /// and projectiles.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Grid coordinates of the loaded room.
    #[must_use]
    pub fn room(&self) -> IVec2 {
        self.room
    }

    /// Room generation; bumped on every load and unload.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Feedback emitted since the last drain.
    #[must_use]
    pub fn feedback(&self) -> &FeedbackQueue {
        &self.feedback
    }

    /// Takes all pending feedback.
    pub fn drain_feedback(&mut self) -> Vec<Feedback> {
        self.feedback.drain()
    }

    /// Loot orders still resolving.
    #[must_use]
    pub fn loot_in_flight(&self) -> usize {
        self.loot.in_flight()
    }

    /// Sets the item templates that shop switches draw from.
    pub fn set_catalog(&mut self, catalog: Vec<ItemTemplate>) {
        debug!(items = catalog.len(), "catalog replaced");
        self.catalog = catalog;
    }

    /// Places the player, restoring persisted currency totals.
    pub fn spawn_player(&mut self, pos: Vec2) -> &mut Player {
        let mut player = Player::at(pos);
        if let Some(red) = self.store.load(RED_SHARD_KEY) {
            player.inventory.red_shards = red;
        }
        self.world.player.insert(player)
    }

    // -------------------------------------------------------------------------
    // Input Subscription
    // -------------------------------------------------------------------------

    /// Opens an input channel. Replaces any previous subscription.
    ///
    /// Events sent on the returned handle are consumed at the start of the
    /// next [`Self::step`].
    pub fn subscribe_input(&mut self) -> InputSender {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.input.replace(rx).is_some() {
            debug!("input subscription replaced");
        }
        tx
    }

    /// Closes the input channel. Later sends on the old handle fail.
    pub fn unsubscribe_input(&mut self) {
        if self.input.take().is_some() {
            debug!("input unsubscribed");
        }
    }

    // -------------------------------------------------------------------------
    // Room Lifecycle
    // -------------------------------------------------------------------------

    /// Loads a room, replacing the current one.
    pub fn load_room(&mut self, room: &RoomDescriptor) {
        self.unload_room();
        self.room = IVec2::new(room.x, room.y);

        if let Some(map) = &room.chests {
            self.world.chests = spawn_chests(map, self.config.chest_size, &mut self.rng);
        }
        if let Some(switches) = room.switches.clone() {
            self.world.switches =
                spawn_switches(&switches.into_vec(), self.config.default_switch_size);
        }

        info!(
            room = room.name.as_deref().unwrap_or("?"),
            x = room.x,
            y = room.y,
            chests = self.world.chests.len(),
            switches = self.world.switches.len(),
            generation = self.generation,
            "room loaded"
        );
    }

    /// Clears the room's chests and switches and cancels its loot.
    ///
    /// Ground items stay; they are keyed by room coordinates.
    pub fn unload_room(&mut self) {
        self.loot.cancel_all();
        self.generation += 1;
        self.world.chests.clear();
        self.world.switches.clear();
        self.world.bullets.clear();
        self.world.bombs.clear();
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Executes one tick.
    ///
    /// Outside [`GamePhase::Play`] only loot deliveries are applied and
    /// queued input is discarded.
    pub fn step(&mut self) {
        self.apply_loot();

        let playing = self.phase == GamePhase::Play;
        let interactions = self.take_interactions();

        if playing {
            let mut opened = Vec::new();
            for _ in 0..interactions {
                self.interact(&mut opened);
            }
            self.update_switches();
            self.update_chests(&mut opened);

            for order in opened {
                self.loot.schedule(order);
            }
        }

        self.tick += 1;
    }

    /// Waits for every in-flight loot order and applies what it delivered.
    pub async fn flush_loot(&mut self) {
        self.loot.flush().await;
        self.apply_loot();
    }

    fn take_interactions(&mut self) -> usize {
        let Some(rx) = self.input.as_mut() else {
            return 0;
        };
        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                InputEvent::KeyDown(key) if key.is_interact() => count += 1,
                InputEvent::KeyDown(_) => {}
            }
        }
        if count > 0 && self.phase != GamePhase::Play {
            debug!(count, phase = ?self.phase, "interaction ignored outside play");
        }
        count
    }

    fn apply_loot(&mut self) {
        for delivery in self.loot.drain() {
            let live = delivery.generation == self.generation
                && self.world.chest(delivery.chest.as_str()).is_some();
            if !live {
                debug!(chest = %delivery.chest, item = %delivery.item_path, "stale loot dropped");
                continue;
            }
            debug!(chest = %delivery.chest, item = %delivery.item_path, "loot spawned");
            let item = GroundItem::scatter(delivery, self.room, &self.config.loot, &mut self.rng);
            self.world.ground_items.push(item);
        }
    }

    /// Handles one interaction key press against every closed chest in range.
    fn interact(&mut self, opened: &mut Vec<LootOrder>) {
        let World { player, chests, .. } = &mut self.world;
        let Some(player) = player.as_mut() else {
            return;
        };
        let radius = self.config.interact_radius;

        for chest in chests.iter_mut() {
            if !chest.shows_prompt(player.pos, radius) {
                continue;
            }
            debug!(chest = %chest.id, locked = chest.locked, "interact");

            if chest.locked {
                let outcome = try_unlock(&chest.lock_spec(), &mut player.inventory, self.store.as_mut());
                let cue = if outcome.authorized { Cue::Success } else { Cue::Failure };
                self.feedback.cue(cue);
                if let Some(message) = outcome.message {
                    self.feedback
                        .text(chest.pos - Vec2::new(0.0, 20.0), message, outcome.color);
                }
                if !outcome.authorized {
                    continue;
                }
            }
            open_chest(chest, self.generation, &mut self.feedback, opened);
        }
    }

    fn update_switches(&mut self) {
        let World {
            player,
            chests,
            switches,
            ..
        } = &mut self.world;
        let mut ctx = SwitchContext {
            player: player.as_mut(),
            chests,
            catalog: &self.catalog,
            feedback: &mut self.feedback,
            rng: &mut self.rng,
        };
        update_switches(switches, self.switch_rules, &mut ctx);
    }

    fn update_chests(&mut self, opened: &mut Vec<LootOrder>) {
        let cleared = self.world.room_cleared();
        let World {
            player,
            chests,
            bullets,
            bombs,
            ..
        } = &mut self.world;

        // Reveals and player contact
        for chest in chests.iter_mut() {
            match chest.state() {
                ChestState::Hidden => {
                    if cleared && chest.reveal(&mut self.rng) == Some(Reveal::Appeared) {
                        self.feedback.cue(Cue::Success);
                        self.feedback
                            .text(chest.pos - Vec2::new(0.0, 20.0), "Appeared!", Color::GOLD);
                    }
                }
                ChestState::Despawned => {}
                ChestState::Open => {
                    if let Some(player) = player.as_mut() {
                        if chest.solid && player.aabb().intersects(&chest.aabb()) {
                            self.resolver.resolve_player(player, chest);
                        }
                    }
                }
                ChestState::Closed => {
                    let Some(player) = player.as_mut() else {
                        continue;
                    };
                    if !player.aabb().intersects(&chest.aabb()) {
                        continue;
                    }
                    if chest.locked || chest.solid {
                        self.resolver.resolve_player(player, chest);
                    } else {
                        open_chest(chest, self.generation, &mut self.feedback, opened);
                    }
                }
            }
        }

        self.resolver.resolve_chests(chests);

        // Bullets
        for bullet in bullets.iter_mut().filter(|bullet| !bullet.spent) {
            let hitbox = bullet.aabb();
            for chest in chests.iter_mut() {
                if !chest.state().is_present() || !hitbox.intersects(&chest.aabb()) {
                    continue;
                }
                if chest.state() == ChestState::Closed {
                    if !chest.locked && chest.config.shootable() {
                        open_chest(chest, self.generation, &mut self.feedback, opened);
                        bullet.spent = true;
                        break;
                    }
                    self.feedback.cue(Cue::Failure);
                }
                if chest.solid {
                    bullet.spent = true;
                    break;
                }
            }
        }

        // Bombs
        let blast = self.config.blast_radius;
        for bomb in bombs.iter().filter(|bomb| bomb.exploding) {
            for chest in chests.iter_mut() {
                let blastable = chest.state() == ChestState::Closed
                    && !chest.locked
                    && chest.config.bombable();
                if blastable && bomb.pos.distance(chest.pos) < blast {
                    open_chest(chest, self.generation, &mut self.feedback, opened);
                }
            }
        }
    }
}

/// Flips a chest open and queues its loot order. No-op unless closed.
fn open_chest(
    chest: &mut Chest,
    generation: u64,
    feedback: &mut FeedbackQueue,
    opened: &mut Vec<LootOrder>,
) {
    if !chest.open() {
        return;
    }
    info!(chest = %chest.id, "chest opened");
    feedback.cue(Cue::Success);
    if chest.manifest.is_none() {
        warn!(chest = %chest.id, "opened chest has no manifest");
    }
    opened.push(LootOrder::for_chest(chest, generation));
}
