//! `behaviour` blocks.
//!
//! Every sub-builder is written against the in-game defaults and only emits
//! a key when the sheet deviates from them, so species files carry overrides
//! only. If the defaults change in game, the checks here change with them.

use serde_json::{json, Map, Value};

use crate::builder::AttributeBuilder;
use crate::keys::EntityKey;
use crate::record::AttributeBlock;
use crate::table::{Cell, TabularRow};

/// Every sheet column the sub-builders read.
const COLUMNS: &[&str] = &[
    "Sleep",
    "S. Depth",
    "S. Times",
    "S. Light",
    "S. Blocks",
    "S. Biomes",
    "Bed S.",
    "S. Sees Sky",
    "S. Skylight",
    "Walk",
    "Walk Speed",
    "Avoids Land",
    "Avoids Water",
    "W. Swim",
    "Swim Speed",
    "W. Breathing",
    "W. Walk",
    "L. Swim",
    "L. Walk",
    "L. Breathing",
    "Fly",
    "Fly Speed",
    "Look",
    "Species Specific",
    "Defends Self",
    "Defends Owner",
    "Will Flee",
    "maxSize",
    "Follow Distance",
    "Follows",
    "Hurt by Lava",
];

pub struct BehaviourBuilder;

impl AttributeBuilder for BehaviourBuilder {
    fn block_key(&self) -> &'static str {
        "behaviour"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn is_blank(&self, row: &TabularRow) -> bool {
        self.build(row, None).is_empty()
    }

    /// Rebuilt from the row alone; the existing block is replaced.
    fn build(&self, row: &TabularRow, _existing: Option<AttributeBlock>) -> AttributeBlock {
        let mut behaviour = AttributeBlock::new();

        let sections = [
            ("resting", build_resting(row)),
            ("moving", build_moving(row)),
            ("idle", build_idle(row)),
            ("entityInteract", build_entity_interact(row)),
            ("combat", build_combat(row)),
            ("herd", build_herd(row)),
        ];
        for (key, section) in sections {
            if !section.is_empty() {
                behaviour.insert(key.into(), Value::Object(section));
            }
        }

        if row.cell("Hurt by Lava").is_false() {
            behaviour.insert("fireImmune".into(), Value::Bool(true));
        }

        behaviour
    }
}

/// Speed cells hold expressions and are written as quoted expression strings.
fn expression(cell: &Cell) -> Value {
    Value::String(format!("\"{}\"", cell.text()))
}

fn build_resting(row: &TabularRow) -> Map<String, Value> {
    let mut resting = Map::new();
    if row.cell("Sleep").is_true() {
        resting.insert("canSleep".into(), Value::Bool(true));
    }
    let depth = row.cell("S. Depth");
    if !depth.is_blank() {
        resting.insert("depth".into(), depth.to_json());
    }
    let times = row.cell("S. Times");
    if !times.is_blank() && times.text() != "Any" {
        resting.insert("times".into(), Value::Array(times.to_list('/')));
    }
    let light = row.cell("S. Light");
    if !light.is_blank() {
        resting.insert("light".into(), light.to_json());
    }
    let blocks = row.cell("S. Blocks");
    if !blocks.is_blank() {
        resting.insert("blocks".into(), Value::Array(blocks.to_list(',')));
    }
    let biomes = row.cell("S. Biomes");
    if !biomes.is_blank() {
        resting.insert("biomes".into(), Value::Array(biomes.to_list(',')));
    }
    if row.cell("Bed S.").is_true() {
        resting.insert("willSleepOnBed".into(), Value::Bool(true));
    }
    if let Some(sees_sky) = row.cell("S. Sees Sky").as_bool() {
        resting.insert("canSeeSky".into(), Value::Bool(sees_sky));
    }
    let skylight = row.cell("S. Skylight");
    if !skylight.is_blank() {
        resting.insert("skyLight".into(), skylight.to_json());
    }
    resting
}

fn build_moving(row: &TabularRow) -> Map<String, Value> {
    let mut moving = Map::new();
    let walk = build_walk(row);
    if !walk.is_empty() {
        moving.insert("walk".into(), Value::Object(walk));
    }
    let swim = build_swim(row);
    if !swim.is_empty() {
        moving.insert("swim".into(), Value::Object(swim));
    }
    let fly = build_fly(row);
    if !fly.is_empty() {
        moving.insert("fly".into(), Value::Object(fly));
    }
    if row.cell("Look").is_false() {
        moving.insert("canLook".into(), Value::Bool(false));
    }
    moving
}

fn build_walk(row: &TabularRow) -> Map<String, Value> {
    let mut walk = Map::new();
    if row.cell("Walk").is_false() {
        walk.insert("canWalk".into(), Value::Bool(false));
    }
    let speed = row.cell("Walk Speed");
    if !speed.is_blank() {
        walk.insert("walkSpeed".into(), expression(speed));
    }
    if row.cell("Avoids Land").is_true() {
        walk.insert("avoidsLand".into(), Value::Bool(true));
    }
    walk
}

fn build_swim(row: &TabularRow) -> Map<String, Value> {
    let mut swim = Map::new();
    if row.cell("Avoids Water").is_true() {
        swim.insert("avoidsWater".into(), Value::Bool(true));
    }
    if row.cell("W. Swim").is_false() {
        swim.insert("canSwimInWater".into(), Value::Bool(false));
    }
    let speed = row.cell("Swim Speed");
    if !speed.is_blank() {
        swim.insert("swimSpeed".into(), expression(speed));
    }

    let flags = [
        ("W. Breathing", "canBreatheUnderwater"),
        ("W. Walk", "canWalkOnWater"),
        ("L. Swim", "canSwimInLava"),
        ("L. Walk", "canWalkOnLava"),
        ("L. Breathing", "canBreatheInLava"),
    ];
    for (column, key) in flags {
        if row.cell(column).is_true() {
            swim.insert(key.into(), Value::Bool(true));
        }
    }
    swim
}

fn build_fly(row: &TabularRow) -> Map<String, Value> {
    let mut fly = Map::new();
    if row.cell("Fly").is_true() {
        fly.insert("canFly".into(), Value::Bool(true));
    }
    let speed = row.cell("Fly Speed");
    if !speed.is_blank() {
        fly.insert("flySpeedHorizontal".into(), expression(speed));
    }
    fly
}

// Idle has no sheet columns yet.
fn build_idle(_row: &TabularRow) -> Map<String, Value> {
    Map::new()
}

fn build_entity_interact(row: &TabularRow) -> Map<String, Value> {
    let mut interact = Map::new();
    let specific = row.cell("Species Specific").text();
    for flag in ["avoidedBySkeleton", "avoidedByCreeper"] {
        if specific.contains(flag) {
            interact.insert(flag.into(), Value::Bool(true));
        }
    }
    interact
}

fn build_combat(row: &TabularRow) -> Map<String, Value> {
    let mut combat = Map::new();
    let defends_self = row.cell("Defends Self").is_true();
    let defends_owner = row.cell("Defends Owner").is_true();
    if defends_self {
        combat.insert("willDefendSelf".into(), Value::Bool(true));
    }
    if defends_owner {
        combat.insert("willDefendOwner".into(), Value::Bool(true));
    }
    if row.cell("Will Flee").is_true() {
        combat.insert("willFlee".into(), Value::Bool(true));
    }
    // No ranged combat yet: anything that fights back fights in melee.
    if defends_self || defends_owner {
        combat.insert("fightsMelee".into(), Value::Bool(true));
    }
    combat
}

fn build_herd(row: &TabularRow) -> Map<String, Value> {
    let mut herd = Map::new();
    let max_size = row.cell("maxSize");
    if !max_size.is_blank() {
        herd.insert("maxSize".into(), max_size.to_json());
    }
    let distance = row.cell("Follow Distance");
    if !distance.is_blank() {
        herd.insert("followDistance".into(), distance.to_json());
    }
    let leaders = parse_leaders(row.cell("Follows").text());
    if !leaders.is_empty() {
        herd.insert("toleratedLeaders".into(), Value::Array(leaders));
    }
    herd
}

/// `"Tauros-2, Miltank"` -> `[{pokemon: tauros, tier: 2}, {pokemon: miltank, tier: 1}]`.
fn parse_leaders(text: &str) -> Vec<Value> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (name, tier) = match entry.rsplit_once('-') {
                Some((name, tier)) => match tier.trim().parse::<u32>() {
                    Ok(tier) => (name, tier),
                    Err(_) => (entry, 1),
                },
                None => (entry, 1),
            };
            let key = EntityKey::from_display(name);
            (!key.is_empty()).then(|| json!({ "pokemon": key, "tier": tier }))
        })
        .collect()
}
