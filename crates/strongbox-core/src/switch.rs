//! Floor switches and the shop restock they trigger.
//!
//! A switch is pressed by walking onto it. It stays `Active` while the player
//! stands within its radius plus a release margin, and pops back to `Idle`
//! once they step off, regardless of the cooldown. The cooldown only
//! throttles how soon it can be pressed again.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chest::{Chest, ChestState};
use crate::config::{Amount, LockConfig, LockConfigSpec, SimConfig, SwitchConfig};
use crate::feedback::{Color, Cue, FeedbackQueue};
use crate::inventory::Currency;
use crate::loot::ItemTemplate;
use crate::world::Player;

/// Currency name written into restocked locks when an item names none.
pub const DEFAULT_PURCHASE_TYPE: &str = "greenshards";

/// Press state of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchState {
    /// Up.
    Idle,
    /// Held down by the player.
    Active,
}

/// What pressing a switch does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchAction {
    /// Restock every chest in the room.
    Shop,
    /// Anything else; pressing it has no effect beyond the click.
    Inert(String),
}

impl SwitchAction {
    /// Parses an action tag.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        if tag == "shop" {
            Self::Shop
        } else {
            Self::Inert(tag.to_string())
        }
    }
}

impl fmt::Display for SwitchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shop => f.write_str("shop"),
            Self::Inert(tag) => f.write_str(tag),
        }
    }
}

/// A floor switch in the current room.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    /// Centre.
    pub pos: Vec2,
    /// Activation radius.
    pub size: f32,
    /// Effect of a press.
    pub action: SwitchAction,
    /// Green shards charged per press.
    pub reroll_cost: u32,
    state: SwitchState,
    cooldown: u32,
}

impl Switch {
    /// Builds a switch from room data.
    ///
    /// Entries with a missing or zero coordinate are skipped, matching how
    /// room files mark placeholder switches.
    #[must_use]
    pub fn from_config(config: &SwitchConfig, default_size: f32) -> Option<Self> {
        let x = config.x.filter(|x| *x != 0.0)?;
        let y = config.y.filter(|y| *y != 0.0)?;
        Some(Self {
            pos: Vec2::new(x, y),
            size: config.size.filter(|s| *s > 0.0).unwrap_or(default_size),
            action: SwitchAction::parse(config.action.as_deref().unwrap_or("none")),
            reroll_cost: config.reroll_cost.or(config.default_cost).unwrap_or(0),
            state: SwitchState::Idle,
            cooldown: 0,
        })
    }

    /// Current press state.
    #[must_use]
    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Ticks until the switch can be pressed again.
    #[must_use]
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Caption drawn under the switch.
    #[must_use]
    pub fn label(&self) -> String {
        let base = match self.action {
            SwitchAction::Shop => "REROLL",
            SwitchAction::Inert(_) => "SWITCH",
        };
        if self.reroll_cost > 0 {
            format!("{base} ({})", self.reroll_cost)
        } else {
            base.to_string()
        }
    }
}

/// Builds every switch in a room.
#[must_use]
pub fn spawn_switches(configs: &[SwitchConfig], default_size: f32) -> Vec<Switch> {
    configs
        .iter()
        .filter_map(|config| Switch::from_config(config, default_size))
        .collect()
}

/// Timing rules shared by all switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchRules {
    /// Ticks of cooldown after a press or refusal.
    pub cooldown_ticks: u32,
    /// Extra distance beyond the radius before a held switch releases.
    pub release_margin: f32,
}

impl From<&SimConfig> for SwitchRules {
    fn from(config: &SimConfig) -> Self {
        Self {
            cooldown_ticks: config.switch_cooldown_ticks,
            release_margin: config.switch_release_margin,
        }
    }
}

/// What a restock did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerollOutcome {
    /// The catalog had nothing eligible.
    NoItems,
    /// No chest was eligible for restocking.
    NothingToReroll,
    /// This many chests were restocked.
    Restocked(usize),
}

/// Mutable state a switch press can touch.
pub struct SwitchContext<'a, R: Rng + ?Sized> {
    /// The player, if spawned.
    pub player: Option<&'a mut Player>,
    /// Chests in the room.
    pub chests: &'a mut [Chest],
    /// All item templates known to the game.
    pub catalog: &'a [ItemTemplate],
    /// Feedback sink.
    pub feedback: &'a mut FeedbackQueue,
    /// Random source for restock picks.
    pub rng: &'a mut R,
}

/// Advances every switch by one tick.
pub fn update_switches<R: Rng + ?Sized>(
    switches: &mut [Switch],
    rules: SwitchRules,
    ctx: &mut SwitchContext<'_, R>,
) {
    for switch in switches.iter_mut() {
        switch.cooldown = switch.cooldown.saturating_sub(1);

        let Some(player_pos) = ctx.player.as_ref().map(|player| player.pos) else {
            continue;
        };
        let dist = player_pos.distance(switch.pos);

        if dist < switch.size && switch.state == SwitchState::Idle && switch.cooldown == 0 {
            activate(switch, rules, ctx);
        }

        if dist > switch.size + rules.release_margin && switch.state == SwitchState::Active {
            debug!(pos = ?switch.pos, "switch released");
            switch.state = SwitchState::Idle;
        }
    }
}

fn activate<R: Rng + ?Sized>(switch: &mut Switch, rules: SwitchRules, ctx: &mut SwitchContext<'_, R>) {
    let Some(player) = ctx.player.as_deref_mut() else {
        return;
    };
    let cost = switch.reroll_cost;
    if cost > 0 {
        if player.inventory.try_debit(Currency::GreenShards, cost).is_none() {
            ctx.feedback
                .text(switch.pos, format!("{cost} Shards required!"), Color::RED);
            ctx.feedback.cue(Cue::Failure);
            switch.cooldown = rules.cooldown_ticks;
            return;
        }
        ctx.feedback
            .text(switch.pos - Vec2::new(0.0, 10.0), format!("-{cost}"), Color::RED);
    }

    switch.state = SwitchState::Active;
    switch.cooldown = rules.cooldown_ticks;
    ctx.feedback.cue(Cue::Click);
    info!(action = %switch.action, cost, "switch activated");

    if switch.action == SwitchAction::Shop {
        reroll_shop(switch.pos, ctx.chests, ctx.catalog, ctx.feedback, ctx.rng);
    }
}

/// Whether a catalog item may be offered in a shop.
#[must_use]
pub fn shop_eligible(item: &ItemTemplate) -> bool {
    item.location.is_some()
        && item.is_spawnable()
        && item.kind.as_deref() != Some("unlock")
        && item.rarity.as_deref() != Some("special")
        && item
            .purchasable
            .as_ref()
            .map_or(true, |terms| terms.active != Some(false))
}

/// Restocks every chest still in the room with a random eligible item.
///
/// Hidden chests are restocked too but stay hidden until their reveal.
/// Despawned chests are skipped. Each chest gets a fresh configuration: the item's location as its only
/// `contains` pattern, the item's name, and either a lock priced from the
/// item's purchase terms or no lock at all.
pub fn reroll_shop<R: Rng + ?Sized>(
    anchor: Vec2,
    chests: &mut [Chest],
    catalog: &[ItemTemplate],
    feedback: &mut FeedbackQueue,
    rng: &mut R,
) -> RerollOutcome {
    let pool: Vec<&ItemTemplate> = catalog.iter().filter(|item| shop_eligible(item)).collect();
    if pool.is_empty() {
        feedback.text(anchor, "No Items!", Color::RED);
        return RerollOutcome::NoItems;
    }

    let mut restocked = 0;
    for chest in chests
        .iter_mut()
        .filter(|chest| chest.state() != ChestState::Despawned)
    {
        let Some(item) = pool.choose(rng) else {
            break;
        };
        let Some(location) = item.location.clone() else {
            continue;
        };

        let mut config = (*chest.config).clone();
        config.contains = vec![location];
        if let Some(name) = &item.name {
            config.name = Some(name.clone());
        }

        let for_sale = item
            .purchasable
            .as_ref()
            .filter(|terms| terms.active == Some(true));
        let locked = if let Some(terms) = for_sale {
            let cost = terms
                .cost
                .clone()
                .filter(|amount| amount.value().is_some())
                .unwrap_or_else(|| Amount::from(0));
            config.locked = Some(LockConfig::Spec(LockConfigSpec {
                active: Some(true),
                unlock_type: Some(
                    terms
                        .purchase_type
                        .clone()
                        .unwrap_or_else(|| DEFAULT_PURCHASE_TYPE.to_string()),
                ),
                cost: Some(cost),
            }));
            config.cost = None;
            config.purchase_type = None;
            true
        } else {
            config.locked = None;
            config.cost = None;
            false
        };

        debug!(chest = %chest.id, item = ?item.name, locked, "chest restocked");
        chest.restock(Arc::new(config), locked);
        if chest.state().is_present() {
            feedback.text(chest.pos - Vec2::new(0.0, 20.0), "Restocked!", Color::GREEN);
        }
        restocked += 1;
    }

    let banner = anchor - Vec2::new(0.0, 20.0);
    if restocked > 0 {
        info!(restocked, "shop rerolled");
        feedback.text(banner, "SHOP REROLLED", Color::GOLD);
        RerollOutcome::Restocked(restocked)
    } else {
        feedback.text(banner, "Nothing to reroll", Color::GREY);
        RerollOutcome::NothingToReroll
    }
}
