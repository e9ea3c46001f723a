//! Loot reveal: manifest lookup, item-template fetches and ground-item spawn.
//!
//! Opening a chest schedules a [`LootOrder`] on the tokio runtime. The task
//! fetches the chest's manifest, filters its item list through the chest's
//! `contains` globs, and fetches every matching item template concurrently.
//! Each template that may spawn comes back as a [`LootDelivery`] over a
//! channel. The simulation drains that channel at the start of a tick and
//! turns deliveries into [`GroundItem`]s, so world state is only ever touched
//! by the simulation owner.
//!
//! # Failure Containment
//!
//! - Manifest fetch or decode failure aborts that chest's order; the chest
//!   stays open with no loot.
//! - An item template failure is logged and skipped; sibling items still
//!   arrive.
//!
//! # Liveness
//!
//! Orders carry the room generation they were issued in. Unloading a room
//! aborts its tasks, and any delivery that still slips through is dropped by
//! the simulation if its generation or chest no longer matches.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bitflags::bitflags;
use glam::{IVec2, Vec2};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::chest::{Chest, ChestId};
use crate::config::{Amount, LootSettings, SimConfig};
use crate::error::{FetchError, LootError};

// =============================================================================
// Content Source
// =============================================================================

/// Fetch-by-path access to JSON content.
///
/// Paths are relative to the source's content root and never start with `/`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches and decodes the JSON document at `path`.
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError>;
}

/// Strips the leading slash that rooted content paths carry.
#[must_use]
pub fn content_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Reads JSON documents from a directory.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    /// Serves documents under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Serves documents under the configured content root.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.content_root.clone())
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let full = self.root.join(content_path(path));
        let text = tokio::fs::read_to_string(&full).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&text).map_err(|source| FetchError::Malformed {
            path: path.to_string(),
            source,
        })
    }
}

/// In-memory documents keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    docs: HashMap<String, Value>,
}

impl MemoryContentSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a document.
    pub fn insert(&mut self, path: &str, doc: Value) {
        self.docs.insert(content_path(path).to_string(), doc);
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, path: &str, doc: Value) -> Self {
        self.insert(path, doc);
        self
    }
}

#[async_trait]
impl ContentSource for MemoryContentSource {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        self.docs
            .get(content_path(path))
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Loot manifest: a list of item template paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Current field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    /// Older field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocks: Option<Vec<String>>,
}

impl Manifest {
    /// Item paths, from `items` if present, otherwise `unlocks`.
    #[must_use]
    pub fn entries(&self) -> Option<&[String]> {
        self.items.as_deref().or(self.unlocks.as_deref())
    }
}

/// Shop purchase terms of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchasable {
    /// Whether the item is currently for sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Currency name (`"greenshards"`, `"redshards"`, `"key"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_type: Option<String>,
    /// Price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Amount>,
}

/// An item template. Fields the chest logic reads are typed; everything
/// else rides along in `extra` for the pickup system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTemplate {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Item kind (`"gun"`, `"bomb"`, `"unlock"`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Rarity tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    /// Path of the template, used as a `contains` pattern on restock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// `false` keeps the item out of chests and shops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawnable: Option<bool>,
    /// Shop terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchasable: Option<Purchasable>,
    /// Remaining template fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemTemplate {
    /// Whether the item may be dropped.
    #[must_use]
    pub fn is_spawnable(&self) -> bool {
        self.spawnable != Some(false)
    }
}

// =============================================================================
// Item Selection
// =============================================================================

/// Compiled `contains` globs of a chest.
///
/// `*` matches any run of characters. Patterns are anchored at the start of
/// the item path only, so `"guns/"` matches everything under `guns/`.
#[derive(Debug, Clone)]
pub struct ContainsFilter {
    patterns: Vec<Regex>,
}

impl ContainsFilter {
    /// Compiles the patterns. Patterns that fail to compile are skipped.
    #[must_use]
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| {
                let body = pattern
                    .split('*')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(".*");
                Regex::new(&format!("^{body}"))
                    .inspect_err(|err| warn!(pattern, %err, "skipping contains pattern"))
                    .ok()
            })
            .collect();
        Self { patterns }
    }

    /// Whether any pattern matches the item path.
    #[must_use]
    pub fn matches(&self, item: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(item))
    }

    /// Every item that matches, in manifest order.
    #[must_use]
    pub fn select<'a>(&self, items: &'a [String]) -> Vec<&'a str> {
        items
            .iter()
            .map(String::as_str)
            .filter(|item| self.matches(item))
            .collect()
    }
}

/// Directory of a manifest, with a trailing slash, or empty at the root.
#[must_use]
pub fn manifest_dir(manifest: &str) -> &str {
    let path = content_path(manifest);
    path.rfind('/').map_or("", |idx| &path[..=idx])
}

/// Content path of an item template listed in a manifest.
///
/// Rooted paths and paths already under `rewards/` or `json/` are taken as
/// is; anything else is relative to the manifest's directory.
#[must_use]
pub fn template_path(item: &str, base: &str) -> String {
    let rooted = item.starts_with('/') || item.starts_with("rewards/") || item.starts_with("json/");
    let joined = if rooted {
        content_path(item).to_string()
    } else {
        format!("{base}{item}")
    };
    if joined.ends_with(".json") {
        joined
    } else {
        format!("{joined}.json")
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Everything a loot task needs, captured when the chest opens.
#[derive(Debug, Clone, PartialEq)]
pub struct LootOrder {
    /// Chest that opened.
    pub chest: ChestId,
    /// Room generation at the time of opening.
    pub generation: u64,
    /// Chest top-left at the time of opening.
    pub origin: Vec2,
    /// Manifest path, if any.
    pub manifest: Option<String>,
    /// `contains` patterns.
    pub contains: Vec<String>,
}

impl LootOrder {
    /// Captures an order from a chest that just opened.
    #[must_use]
    pub fn for_chest(chest: &Chest, generation: u64) -> Self {
        Self {
            chest: chest.id.clone(),
            generation,
            origin: chest.pos,
            manifest: chest.manifest.clone(),
            contains: chest.config.contains.clone(),
        }
    }
}

/// One resolved item, ready to drop.
#[derive(Debug, Clone, PartialEq)]
pub struct LootDelivery {
    /// Chest the item came from.
    pub chest: ChestId,
    /// Room generation of the order.
    pub generation: u64,
    /// Drop anchor.
    pub origin: Vec2,
    /// Manifest entry that matched.
    pub item_path: String,
    /// Fetched template.
    pub template: ItemTemplate,
}

/// Runs loot orders on the tokio runtime and collects their deliveries.
pub struct LootPipeline {
    source: Arc<dyn ContentSource>,
    tx: mpsc::UnboundedSender<LootDelivery>,
    rx: mpsc::UnboundedReceiver<LootDelivery>,
    tasks: HashMap<ChestId, Vec<JoinHandle<()>>>,
    runtime: Option<Handle>,
}

impl std::fmt::Debug for LootPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LootPipeline")
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

impl LootPipeline {
    /// Creates a pipeline fetching from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            tx,
            rx,
            tasks: HashMap::new(),
            runtime: None,
        }
    }

    /// Pins every future order to `runtime`.
    ///
    /// Without a pinned runtime, orders spawn on whichever runtime is
    /// current when [`schedule`](Self::schedule) runs.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Starts resolving an order in the background.
    ///
    /// Orders without a manifest are dropped here. With no pinned runtime
    /// and no current one, the order is logged and dropped.
    pub fn schedule(&mut self, order: LootOrder) {
        let Some(manifest) = order.manifest.clone() else {
            info!(chest = %order.chest, "chest has no manifest, nothing to drop");
            return;
        };
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            error!(chest = %order.chest, "no async runtime, loot order dropped");
            return;
        };

        self.prune();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let chest = order.chest.clone();
        let handle = runtime.spawn(async move {
            let chest = order.chest.clone();
            match resolve_order(source, &manifest, order, tx).await {
                Ok(count) => debug!(%chest, count, "loot order complete"),
                Err(err) => error!(%chest, %err, "loot order failed"),
            }
        });
        self.tasks.entry(chest).or_default().push(handle);
    }

    /// Aborts every running order and discards undelivered items.
    pub fn cancel_all(&mut self) {
        let mut aborted = 0;
        for handle in self.tasks.drain().flat_map(|(_, handles)| handles) {
            if !handle.is_finished() {
                aborted += 1;
            }
            handle.abort();
        }
        let stale = self.drain().len();
        if aborted > 0 || stale > 0 {
            debug!(aborted, stale, "loot orders cancelled");
        }
    }

    /// Takes every delivery that has arrived so far.
    pub fn drain(&mut self) -> Vec<LootDelivery> {
        let mut out = Vec::new();
        while let Ok(delivery) = self.rx.try_recv() {
            out.push(delivery);
        }
        out
    }

    /// Waits for every running order to finish.
    pub async fn flush(&mut self) {
        let handles: Vec<_> = self.tasks.drain().flat_map(|(_, handles)| handles).collect();
        for handle in handles {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    error!(%err, "loot task panicked");
                }
            }
        }
    }

    /// Number of orders still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks
            .values()
            .flatten()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    fn prune(&mut self) {
        self.tasks.retain(|_, handles| {
            handles.retain(|handle| !handle.is_finished());
            !handles.is_empty()
        });
    }
}

async fn resolve_order(
    source: Arc<dyn ContentSource>,
    manifest_path: &str,
    order: LootOrder,
    tx: mpsc::UnboundedSender<LootDelivery>,
) -> Result<usize, LootError> {
    let doc = source.fetch_json(content_path(manifest_path)).await?;
    let manifest: Manifest =
        serde_json::from_value(doc).map_err(|source| LootError::InvalidManifest {
            path: manifest_path.to_string(),
            source,
        })?;
    let items = manifest
        .entries()
        .ok_or_else(|| LootError::EmptyManifest(manifest_path.to_string()))?;

    let pool = ContainsFilter::new(&order.contains).select(items);
    if pool.is_empty() {
        debug!(chest = %order.chest, "no manifest items match chest contents");
        return Ok(0);
    }

    let base = manifest_dir(manifest_path);
    let mut fetches = JoinSet::new();
    for item in pool {
        let source = Arc::clone(&source);
        let item = item.to_string();
        let path = template_path(&item, base);
        fetches.spawn(async move {
            let result = fetch_template(source.as_ref(), &path).await;
            (item, result)
        });
    }

    let mut delivered = 0;
    while let Some(joined) = fetches.join_next().await {
        let (item_path, result) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                warn!(chest = %order.chest, %err, "item fetch task failed");
                continue;
            }
        };
        match result {
            Ok(template) if template.is_spawnable() => {
                let delivery = LootDelivery {
                    chest: order.chest.clone(),
                    generation: order.generation,
                    origin: order.origin,
                    item_path,
                    template,
                };
                if tx.send(delivery).is_err() {
                    debug!(chest = %order.chest, "loot receiver gone");
                    break;
                }
                delivered += 1;
            }
            Ok(_) => debug!(chest = %order.chest, item = %item_path, "item not spawnable"),
            Err(err) => error!(chest = %order.chest, item = %item_path, %err, "failed to fetch item"),
        }
    }
    Ok(delivered)
}

async fn fetch_template(source: &dyn ContentSource, path: &str) -> Result<ItemTemplate, FetchError> {
    let doc = source.fetch_json(path).await?;
    serde_json::from_value(doc).map_err(|source| FetchError::Malformed {
        path: path.to_string(),
        source,
    })
}

// =============================================================================
// Ground Items
// =============================================================================

bitflags! {
    /// Physical tags of a loose body.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BodyFlags: u8 {
        /// Collides with other bodies.
        const SOLID = 1 << 0;
        /// Can be knocked around.
        const MOVEABLE = 1 << 1;
    }
}

/// A dropped item waiting on the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    /// Centre.
    pub pos: Vec2,
    /// Initial drift.
    pub velocity: Vec2,
    /// Item template.
    pub payload: ItemTemplate,
    /// Manifest entry it was drawn from.
    pub item_path: String,
    /// Grid coordinates of the room it lies in.
    pub room: IVec2,
    /// Physical tags.
    pub flags: BodyFlags,
    /// Velocity damping per tick.
    pub friction: f32,
    /// Pickup radius.
    pub radius: f32,
}

impl GroundItem {
    /// Drops a delivered item near its chest with a little scatter.
    pub fn scatter<R: Rng + ?Sized>(
        delivery: LootDelivery,
        room: IVec2,
        settings: &LootSettings,
        rng: &mut R,
    ) -> Self {
        let mut spread = |width: f32| (rng.gen::<f32>() - 0.5) * width;
        let pos = delivery.origin
            + Vec2::splat(settings.drop_offset)
            + Vec2::new(spread(settings.jitter), spread(settings.jitter));
        let velocity = Vec2::new(
            spread(settings.velocity_spread),
            spread(settings.velocity_spread),
        );
        Self {
            pos,
            velocity,
            payload: delivery.template,
            item_path: delivery.item_path,
            room,
            flags: BodyFlags::SOLID | BodyFlags::MOVEABLE,
            friction: settings.friction,
            radius: settings.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn order(manifest: Option<&str>, contains: &[&str]) -> LootOrder {
        LootOrder {
            chest: ChestId::new("c"),
            generation: 1,
            origin: Vec2::new(100.0, 100.0),
            manifest: manifest.map(str::to_string),
            contains: contains.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn names(deliveries: &[LootDelivery]) -> Vec<String> {
        let mut names: Vec<_> = deliveries.iter().map(|d| d.item_path.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn contains_filter_is_prefix_anchored() {
        let filter = ContainsFilter::new(&["a*".into(), "guns/".into()]);
        assert!(filter.matches("a"));
        assert!(filter.matches("apple"));
        assert!(filter.matches("guns/peashooter"));
        assert!(!filter.matches("banana"));
        assert!(!filter.matches("xguns/peashooter"));
    }

    #[test]
    fn contains_filter_escapes_regex_syntax() {
        let filter = ContainsFilter::new(&["items/gun.v2*".into()]);
        assert!(filter.matches("items/gun.v2_fast"));
        assert!(!filter.matches("items/gunXv2"));
    }

    #[test]
    fn empty_contains_selects_nothing() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert!(ContainsFilter::new(&[]).select(&items).is_empty());
    }

    #[test]
    fn paths_resolve_relative_to_manifest() {
        assert_eq!(manifest_dir("/rewards/chests/manifest.json"), "rewards/chests/");
        assert_eq!(manifest_dir("manifest.json"), "");
        assert_eq!(
            template_path("guns/peashooter", "rewards/chests/"),
            "rewards/chests/guns/peashooter.json"
        );
        assert_eq!(template_path("/items/bomb", "rewards/chests/"), "items/bomb.json");
        assert_eq!(template_path("rewards/items/key", "x/"), "rewards/items/key.json");
        assert_eq!(template_path("gem.json", ""), "gem.json");
    }

    #[test]
    fn manifest_prefers_items_over_unlocks() {
        let m: Manifest = serde_json::from_value(json!({ "unlocks": ["u"], "items": ["i"] })).unwrap();
        assert_eq!(m.entries(), Some(&["i".to_string()][..]));
        let legacy: Manifest = serde_json::from_value(json!({ "unlocks": ["u"] })).unwrap();
        assert_eq!(legacy.entries(), Some(&["u".to_string()][..]));
    }

    #[test]
    fn item_template_keeps_unknown_fields() {
        let t: ItemTemplate = serde_json::from_value(json!({
            "name": "gun_laser",
            "type": "gun",
            "damage": 4
        }))
        .unwrap();
        assert_eq!(t.kind.as_deref(), Some("gun"));
        assert_eq!(t.extra.get("damage"), Some(&json!(4)));
        assert!(t.is_spawnable());
    }

    #[test]
    fn scatter_stays_within_jitter() {
        let settings = LootSettings::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let delivery = LootDelivery {
                chest: ChestId::new("c"),
                generation: 0,
                origin: Vec2::new(100.0, 100.0),
                item_path: "a".into(),
                template: ItemTemplate::default(),
            };
            let item = GroundItem::scatter(delivery, IVec2::new(2, 3), &settings, &mut rng);
            assert!((item.pos.x - 110.0).abs() <= 10.0);
            assert!((item.pos.y - 110.0).abs() <= 10.0);
            assert!(item.velocity.x.abs() <= 2.5);
            assert!(item.flags.contains(BodyFlags::SOLID | BodyFlags::MOVEABLE));
            assert_eq!(item.room, IVec2::new(2, 3));
        }
    }

    #[tokio::test]
    async fn spawns_every_match_and_nothing_else() {
        let source = MemoryContentSource::new()
            .with("rewards/manifest.json", json!({ "items": ["a", "b", "c", "ab"] }))
            .with("rewards/a.json", json!({ "name": "A" }))
            .with("rewards/ab.json", json!({ "name": "AB" }))
            .with("rewards/b.json", json!({ "name": "B" }))
            .with("rewards/c.json", json!({ "name": "C" }));
        let mut pipeline = LootPipeline::new(Arc::new(source));

        pipeline.schedule(order(Some("/rewards/manifest.json"), &["a*"]));
        pipeline.flush().await;

        assert_eq!(names(&pipeline.drain()), ["a", "ab"]);
        assert_eq!(pipeline.in_flight(), 0);
    }

    #[tokio::test]
    async fn missing_item_does_not_block_siblings() {
        let source = MemoryContentSource::new()
            .with("rewards/manifest.json", json!({ "items": ["a1", "a2", "a3"] }))
            .with("rewards/a1.json", json!({ "name": "one" }))
            .with("rewards/a3.json", json!({ "name": "three" }));
        let mut pipeline = LootPipeline::new(Arc::new(source));

        pipeline.schedule(order(Some("rewards/manifest.json"), &["a*"]));
        pipeline.flush().await;

        assert_eq!(names(&pipeline.drain()), ["a1", "a3"]);
    }

    #[tokio::test]
    async fn unspawnable_items_are_skipped() {
        let source = MemoryContentSource::new()
            .with("m.json", json!({ "unlocks": ["x", "y"] }))
            .with("x.json", json!({ "spawnable": false }))
            .with("y.json", json!({ "spawnable": true }));
        let mut pipeline = LootPipeline::new(Arc::new(source));

        pipeline.schedule(order(Some("m.json"), &["*"]));
        pipeline.flush().await;

        assert_eq!(names(&pipeline.drain()), ["y"]);
    }

    #[tokio::test]
    async fn missing_manifest_or_path_yields_nothing() {
        let mut pipeline = LootPipeline::new(Arc::new(MemoryContentSource::new()));

        pipeline.schedule(order(None, &["*"]));
        pipeline.schedule(order(Some("gone.json"), &["*"]));
        pipeline.flush().await;

        assert!(pipeline.drain().is_empty());
    }

    #[tokio::test]
    async fn cancel_discards_pending_deliveries() {
        let source = MemoryContentSource::new()
            .with("m.json", json!({ "items": ["a"] }))
            .with("a.json", json!({}));
        let mut pipeline = LootPipeline::new(Arc::new(source));

        pipeline.schedule(order(Some("m.json"), &["a"]));
        pipeline.cancel_all();
        tokio::task::yield_now().await;

        assert!(pipeline.drain().is_empty());
        assert_eq!(pipeline.in_flight(), 0);
    }

    #[tokio::test]
    async fn fs_source_reads_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("rewards")).unwrap();
        std::fs::write(dir.path().join("rewards/m.json"), r#"{ "items": ["k"] }"#).unwrap();
        std::fs::write(dir.path().join("rewards/bad.json"), "{ nope").unwrap();

        let source = FsContentSource::new(dir.path());
        let doc = source.fetch_json("/rewards/m.json").await.unwrap();
        assert_eq!(doc, json!({ "items": ["k"] }));

        assert!(matches!(
            source.fetch_json("rewards/missing.json").await,
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            source.fetch_json("rewards/bad.json").await,
            Err(FetchError::Malformed { .. })
        ));
    }
}
