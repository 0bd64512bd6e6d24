//! `riding` blocks: per-medium stat ranges and the ride controller.

use serde_json::{Map, Value};

use crate::builder::AttributeBuilder;
use crate::record::AttributeBlock;
use crate::table::TabularRow;

pub const FLAVOURS: [&str; 5] = ["SPEED", "ACCELERATION", "SKILL", "JUMP", "STAMINA"];

const COMPOSITE_COLUMN: &str = "Composite";
const INACTIVE: &str = "N/A";

const SUB_CONTROLLERS: [&str; 3] = ["landController", "flightController", "swimController"];

// ---------------------------------------------------------------------------
// Mediums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    Land,
    Liquid,
    Air,
}

impl Medium {
    pub const ALL: [Medium; 3] = [Medium::Land, Medium::Liquid, Medium::Air];

    /// Sheet column holding this medium's controller style.
    pub fn column(self) -> &'static str {
        match self {
            Medium::Land => "Land",
            Medium::Liquid => "Water",
            Medium::Air => "Flying",
        }
    }

    /// Key used in multi-medium `ranges` objects.
    pub fn label(self) -> &'static str {
        match self {
            Medium::Land => "LAND",
            Medium::Liquid => "LIQUID",
            Medium::Air => "AIR",
        }
    }

    fn index(self) -> usize {
        match self {
            Medium::Land => 0,
            Medium::Liquid => 1,
            Medium::Air => 2,
        }
    }
}

/// `Min`/`Max` column pair for a medium and flavour. The sheet repeats the
/// pair per (medium, flavour), so every pair after the first is suffixed.
fn range_columns(medium: Medium, flavour: usize) -> (String, String) {
    let index = medium.index() * FLAVOURS.len() + flavour;
    if index == 0 {
        ("Min".into(), "Max".into())
    } else {
        (format!("Min.{index}"), format!("Max.{index}"))
    }
}

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    LandGeneric,
    LandVehicle,
    WaterBoat,
    AirBird,
    AirGlider,
    FallToFlight,
    RunUpToFlight,
}

impl ControllerKind {
    /// Sheet style name to controller kind. Styles the game has no
    /// controller for map to `None`.
    pub fn from_style(style: &str) -> Option<Self> {
        match style {
            "Standard" => Some(Self::LandGeneric),
            "Vehicle" => Some(Self::LandVehicle),
            "Boat" => Some(Self::WaterBoat),
            "Bird" => Some(Self::AirBird),
            "Glider" => Some(Self::AirGlider),
            "Fall To Flight" => Some(Self::FallToFlight),
            "Run Up To Flight" => Some(Self::RunUpToFlight),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::LandGeneric => "cobblemon:land/generic",
            Self::LandVehicle => "cobblemon:land/vehicle",
            Self::WaterBoat => "cobblemon:water/boat",
            Self::AirBird => "cobblemon:air/bird",
            Self::AirGlider => "cobblemon:air/glider",
            Self::FallToFlight => "cobblemon:composite/fall_to_flight",
            Self::RunUpToFlight => "cobblemon:composite/run_up_to_flight",
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, Self::FallToFlight | Self::RunUpToFlight)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    pub kind: ControllerKind,
    pub land: Option<Box<Controller>>,
    pub flight: Option<Box<Controller>>,
}

impl Controller {
    fn simple(kind: ControllerKind) -> Self {
        Self {
            kind,
            land: None,
            flight: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("key".into(), Value::String(self.kind.key().into()));
        if let Some(ref flight) = self.flight {
            object.insert("flightController".into(), flight.to_json());
        }
        if let Some(ref land) = self.land {
            object.insert("landController".into(), land.to_json());
        }
        Value::Object(object)
    }
}

/// Merge a freshly built controller into the one already on disk.
///
/// A different key replaces the old controller outright. The same key keeps
/// the old one, including any hand-tuned fields. Composite controllers with
/// the same key merge each sub-controller the same way; the new side decides
/// which sub-controllers exist.
pub fn merge_controller(previous: Value, new: Value) -> Value {
    let (mut previous, mut new) = match (previous, new) {
        (Value::Object(previous), Value::Object(new)) => (previous, new),
        (_, new) => return new,
    };

    if previous.get("key") != new.get("key") {
        return Value::Object(new);
    }

    let composite = previous
        .get("key")
        .and_then(Value::as_str)
        .is_some_and(|key| key.contains("composite"));
    if composite {
        for slot in SUB_CONTROLLERS {
            match new.shift_remove(slot) {
                Some(sub) => match previous.get_mut(slot) {
                    Some(existing) => {
                        let merged = merge_controller(existing.take(), sub);
                        *existing = merged;
                    }
                    None => {
                        previous.insert(slot.into(), sub);
                    }
                },
                None => {
                    previous.shift_remove(slot);
                }
            }
        }
    }

    Value::Object(previous)
}

// ---------------------------------------------------------------------------
// Parsed row
// ---------------------------------------------------------------------------

/// A riding row with its `N/A` sentinels turned into options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidingRow {
    pub composite: Option<String>,
    /// Controller style per medium, `None` when the medium is inactive.
    pub mediums: [Option<String>; 3],
    /// `(min, max)` per medium and flavour, `None` unless both cells are filled.
    pub ranges: [[Option<(String, String)>; 5]; 3],
}

fn active(text: &str) -> Option<String> {
    (!text.is_empty() && text != INACTIVE).then(|| text.to_string())
}

impl RidingRow {
    pub fn parse(row: &TabularRow) -> Self {
        let mut parsed = RidingRow {
            composite: active(row.cell(COMPOSITE_COLUMN).text()),
            ..Default::default()
        };
        for medium in Medium::ALL {
            let m = medium.index();
            parsed.mediums[m] = active(row.cell(medium.column()).text());
            for f in 0..FLAVOURS.len() {
                let (min_column, max_column) = range_columns(medium, f);
                let min = row.cell(&min_column);
                let max = row.cell(&max_column);
                if !min.is_blank() && !max.is_blank() {
                    parsed.ranges[m][f] = Some((min.text().to_string(), max.text().to_string()));
                }
            }
        }
        parsed
    }

    pub fn style(&self, medium: Medium) -> Option<&str> {
        self.mediums[medium.index()].as_deref()
    }

    pub fn range(&self, medium: Medium, flavour: usize) -> Option<String> {
        self.ranges[medium.index()][flavour]
            .as_ref()
            .map(|(min, max)| format!("{min}-{max}"))
    }

    pub fn active_mediums(&self) -> Vec<Medium> {
        Medium::ALL
            .into_iter()
            .filter(|m| self.style(*m).is_some())
            .collect()
    }

    /// Nothing to write: no composite style and no active medium with a range.
    pub fn is_blank(&self) -> bool {
        self.composite.is_none()
            && !self
                .active_mediums()
                .into_iter()
                .any(|m| self.ranges[m.index()].iter().any(Option::is_some))
    }

    /// Controller from `Composite` when set, else the first active medium.
    pub fn controller(&self) -> Option<Controller> {
        let style = self
            .composite
            .as_deref()
            .or_else(|| Medium::ALL.into_iter().find_map(|m| self.style(m)))?;
        self.build_controller(style)
    }

    fn build_controller(&self, style: &str) -> Option<Controller> {
        let kind = ControllerKind::from_style(style)?;
        let mut controller = Controller::simple(kind);
        if kind.is_composite() {
            controller.flight = self
                .style(Medium::Air)
                .and_then(ControllerKind::from_style)
                .map(|k| Box::new(Controller::simple(k)));
            controller.land = self
                .style(Medium::Land)
                .and_then(ControllerKind::from_style)
                .map(|k| Box::new(Controller::simple(k)));
        }
        Some(controller)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct RidingBuilder;

impl AttributeBuilder for RidingBuilder {
    fn block_key(&self) -> &'static str {
        "riding"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[COMPOSITE_COLUMN, "Land", "Water", "Flying", "Min", "Max"]
    }

    fn is_blank(&self, row: &TabularRow) -> bool {
        RidingRow::parse(row).is_blank()
    }

    fn build(&self, row: &TabularRow, existing: Option<AttributeBlock>) -> AttributeBlock {
        let parsed = RidingRow::parse(row);
        let mut riding = existing.unwrap_or_default();
        if parsed.is_blank() {
            return riding;
        }

        let mut stats = take_object(&mut riding, "stats");
        apply_ranges(&mut stats, &parsed);
        riding.insert("stats".into(), Value::Object(stats));

        if !riding.get("seats").is_some_and(Value::is_array) {
            riding.insert("seats".into(), Value::Array(Vec::new()));
        }

        match parsed.controller() {
            Some(controller) => {
                let new = controller.to_json();
                let merged = match riding.get_mut("controller") {
                    Some(previous) => merge_controller(previous.take(), new),
                    None => new,
                };
                riding.insert("controller".into(), merged);
            }
            None => {
                riding.shift_remove("controller");
            }
        }

        riding
    }
}

/// Detach the object under `key` for editing. The key keeps its position
/// when the object is inserted back.
fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.get_mut(key).map(Value::take) {
        Some(Value::Object(object)) => object,
        _ => Map::new(),
    }
}

fn apply_ranges(stats: &mut Map<String, Value>, row: &RidingRow) {
    let active = row.active_mediums();
    let single = active.len() == 1;

    for (f, flavour) in FLAVOURS.iter().enumerate() {
        let present: Vec<(Medium, String)> = active
            .iter()
            .filter_map(|m| row.range(*m, f).map(|r| (*m, r)))
            .collect();
        if present.is_empty() {
            continue;
        }

        let mut entry = take_object(stats, flavour);
        if single {
            let (_, range) = &present[0];
            entry.insert("ranges".into(), Value::String(range.clone()));
        } else {
            let ranges: Map<String, Value> = present
                .into_iter()
                .map(|(m, r)| (m.label().to_string(), Value::String(r)))
                .collect();
            entry.insert("ranges".into(), Value::Object(ranges));
            entry.shift_remove("range");
        }
        stats.insert((*flavour).into(), Value::Object(entry));
    }
}
