//! The field list: identity, derived area, selection and bookkeeping around drawn shapes.

mod json;
pub mod tasks;

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    fmt,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{point_in_polygon, polygon_area, Point};
pub use tasks::{Task, TaskKind};

/// Offset applied to the copy made by [`FieldStore::duplicate`], in world units.
const DUPLICATE_OFFSET: f64 = 50.;

/// Largest id a farm may hold: the largest integer a JavaScript reader of the saved file
/// still sees exactly.
pub const MAX_FIELD_ID: u64 = (1 << 53) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    #[default]
    Field,
    Irrigation,
    Boundary,
    CropArea,
    Greenhouse,
    Orchard,
    Pasture,
}

impl AreaKind {
    pub const ALL: [AreaKind; 7] = [
        AreaKind::Field,
        AreaKind::Irrigation,
        AreaKind::Boundary,
        AreaKind::CropArea,
        AreaKind::Greenhouse,
        AreaKind::Orchard,
        AreaKind::Pasture,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AreaKind::Field => "Field",
            AreaKind::Irrigation => "Irrigation",
            AreaKind::Boundary => "Boundary",
            AreaKind::CropArea => "Crop area",
            AreaKind::Greenhouse => "Greenhouse",
            AreaKind::Orchard => "Orchard",
            AreaKind::Pasture => "Pasture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Planning,
    Germination,
    Vegetative,
    Flowering,
    Fruiting,
    Maturity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationFrequency {
    Daily,
    Weekly,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilAnalysis {
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub organic_matter: f64,
    pub salinity: f64,
    pub moisture: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationSchedule {
    pub frequency: IrrigationFrequency,
    pub duration_minutes: f64,
    pub water_liters: f64,
    pub last: Option<DateTime<Utc>>,
    pub next: DateTime<Utc>,
}

/// Everything a user can record about a field besides its outline.
///
/// None of it influences geometry; it is stored and handed back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Agronomy {
    pub crop_type: Option<String>,
    pub variety: Option<String>,
    pub notes: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
    pub growth_stage: Option<GrowthStage>,
    pub soil_type: Option<String>,
    pub soil_analysis: Option<SoilAnalysis>,
    pub irrigation: Option<IrrigationSchedule>,
    /// 0 to 100.
    pub health: Option<f64>,
    /// Tons per hectare.
    pub expected_yield: Option<f64>,
    pub input_costs: Option<f64>,
    pub expected_revenue: Option<f64>,
}

impl Agronomy {
    /// Whether every recorded number is finite. JSON has no way to write the others.
    pub fn is_finite(&self) -> bool {
        let soil = self.soil_analysis.iter().flat_map(|soil| {
            [
                soil.ph,
                soil.nitrogen,
                soil.phosphorus,
                soil.potassium,
                soil.organic_matter,
                soil.salinity,
                soil.moisture,
            ]
        });
        let irrigation = self
            .irrigation
            .iter()
            .flat_map(|irrigation| [irrigation.duration_minutes, irrigation.water_liters]);
        let optional = [
            self.health,
            self.expected_yield,
            self.input_costs,
            self.expected_revenue,
        ]
        .into_iter()
        .flatten();
        soil.chain(irrigation).chain(optional).all(f64::is_finite)
    }
}

/// One drawn area on the map.
///
/// `area` is always `polygon_area(points) * area_scale`; the only way to change
/// `points` is [`FieldStore::set_points`], which recomputes it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoundary {
    id: FieldId,
    pub name: String,
    pub kind: AreaKind,
    pub color: String,
    points: Vec<Point>,
    area: f64,
    pub agronomy: Agronomy,
}

impl FieldBoundary {
    fn new(id: FieldId, name: String, kind: AreaKind, color: String, points: Vec<Point>, area_scale: f64) -> Self {
        let mut field = Self {
            id,
            name,
            kind,
            color,
            points: Vec::new(),
            area: 0.,
            agronomy: Agronomy::default(),
        };
        field.replace_points(points, area_scale);
        field
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Hectares.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Whether there is enough outline to fill.
    pub fn is_polygon(&self) -> bool {
        self.points.len() >= 3
    }

    pub fn contains(&self, world: Point) -> bool {
        point_in_polygon(world, &self.points)
    }

    fn replace_points(&mut self, points: Vec<Point>, area_scale: f64) {
        self.area = polygon_area(&points) * area_scale;
        self.points = points;
    }
}

/// The top-most field under `world`.
///
/// Fields are painted in insertion order, so the last one drawn is on top and is
/// tested first.
pub fn field_at(fields: &[FieldBoundary], world: Point) -> Option<&FieldBoundary> {
    fields.iter().rev().find(|field| field.contains(world))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldStats {
    pub count: usize,
    pub total_area: f64,
    pub average_area: f64,
    /// Sum over fields of `expected_yield * area`, in tons.
    pub total_expected_yield: f64,
    pub by_kind: BTreeMap<AreaKind, usize>,
}

impl FieldStats {
    fn compute(fields: &[FieldBoundary]) -> Self {
        let count = fields.len();
        let total_area: f64 = fields.iter().map(FieldBoundary::area).sum();
        let mut by_kind = BTreeMap::new();
        for field in fields {
            *by_kind.entry(field.kind).or_insert(0) += 1;
        }
        Self {
            count,
            total_area,
            average_area: if count == 0 { 0. } else { total_area / count as f64 },
            total_expected_yield: fields
                .iter()
                .map(|f| f.agronomy.expected_yield.unwrap_or(0.) * f.area)
                .sum(),
            by_kind,
        }
    }
}

/// Owns every field and task, plus the current selection.
#[derive(Debug, Clone)]
pub struct FieldStore {
    pub farm_name: String,
    pub season: String,
    fields: Vec<FieldBoundary>,
    tasks: Vec<Task>,
    selected: Option<FieldId>,
    next_id: u64,
    area_scale: f64,
    /// Bumped on every mutation of `fields`.
    version: u64,
    stats: RefCell<Option<(u64, FieldStats)>>,
}

impl FieldStore {
    pub fn new(area_scale: f64) -> Self {
        Self {
            farm_name: "My Farm".to_owned(),
            season: String::new(),
            fields: Vec::new(),
            tasks: Vec::new(),
            selected: None,
            next_id: 1,
            area_scale,
            version: 0,
            stats: RefCell::new(None),
        }
    }

    pub fn fields(&self) -> &[FieldBoundary] {
        &self.fields
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldBoundary> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn area_scale(&self) -> f64 {
        self.area_scale
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&FieldBoundary> {
        self.get(self.selected?)
    }

    /// Selects `id` if it names an existing field; anything else clears the selection.
    pub fn select(&mut self, id: Option<FieldId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    pub fn select_next(&mut self) {
        self.step_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.step_selection(-1);
    }

    fn step_selection(&mut self, step: isize) {
        if self.fields.is_empty() {
            return;
        }
        let n = self.fields.len() as isize;
        let next = match self.position(self.selected) {
            Some(i) => (i as isize + step).rem_euclid(n),
            None if step > 0 => 0,
            None => n - 1,
        };
        self.selected = Some(self.fields[next as usize].id);
    }

    fn position(&self, id: Option<FieldId>) -> Option<usize> {
        let id = id?;
        self.fields.iter().position(|f| f.id == id)
    }

    /// Top-most field containing the world point.
    pub fn field_at(&self, world: Point) -> Option<FieldId> {
        field_at(&self.fields, world).map(FieldBoundary::id)
    }

    /// Turns a finished drawing into a field named after its position among the
    /// plain fields ("Field 3").
    pub fn create(&mut self, points: Vec<Point>, color: &str) -> FieldId {
        let ordinal = self.fields.iter().filter(|f| f.kind == AreaKind::Field).count() + 1;
        let id = self.allocate_id();
        let mut field = FieldBoundary::new(
            id,
            format!("Field {ordinal}"),
            AreaKind::Field,
            color.to_owned(),
            points,
            self.area_scale,
        );
        field.agronomy.notes = Some("Newly created field".to_owned());
        field.agronomy.growth_stage = Some(GrowthStage::Planning);

        tracing::info!(%id, area = field.area, vertices = field.points.len(), "field created");
        self.fields.push(field);
        self.touch();
        id
    }

    /// Replaces the outline of a field. Returns whether the field exists.
    pub fn set_points(&mut self, id: FieldId, points: Vec<Point>) -> bool {
        let area_scale = self.area_scale;
        let Some(field) = self.fields.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        field.replace_points(points, area_scale);
        self.touch();
        true
    }

    /// Edits name, kind, colour or agronomic data. The outline is not reachable from here.
    ///
    /// An edit that leaves a non-finite agronomic number is undone and reported as `false`.
    pub fn edit(&mut self, id: FieldId, edit: impl FnOnce(&mut FieldBoundary)) -> bool {
        let Some(field) = self.fields.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        let before = field.clone();
        edit(field);
        if !field.agronomy.is_finite() {
            tracing::warn!(%id, "edit rejected: agronomic values must be finite");
            *field = before;
            return false;
        }
        self.touch();
        true
    }

    /// Removes a field together with its tasks.
    pub fn delete(&mut self, id: FieldId) -> Option<FieldBoundary> {
        let index = self.position(Some(id))?;
        let field = self.fields.remove(index);
        self.tasks.retain(|task| task.field != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::info!(%id, "field deleted");
        self.touch();
        Some(field)
    }

    pub fn duplicate(&mut self, id: FieldId) -> Option<FieldId> {
        let original = self.get(id)?.clone();
        let new_id = self.allocate_id();
        let points = original
            .points
            .iter()
            .map(|p| p.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET))
            .collect();
        let mut copy = FieldBoundary::new(
            new_id,
            format!("{} Copy", original.name),
            original.kind,
            original.color,
            points,
            self.area_scale,
        );
        copy.agronomy = original.agronomy;
        self.fields.push(copy);
        self.touch();
        Some(new_id)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.tasks.clear();
        self.selected = None;
        self.touch();
    }

    /// Replaces the tasks derived for one field with a fresh set.
    pub fn schedule_tasks(&mut self, id: FieldId, today: NaiveDate) -> usize {
        let Some(field) = self.get(id) else { return 0 };
        let fresh = tasks::derive(field, today);
        let added = fresh.len();
        self.tasks.retain(|task| task.field != id);
        self.tasks.extend(fresh);
        added
    }

    /// Aggregates, recomputed only after the field list changed.
    pub fn stats(&self) -> FieldStats {
        let mut cache = self.stats.borrow_mut();
        if let Some((version, stats)) = &*cache {
            if *version == self.version {
                return stats.clone();
            }
        }
        let stats = FieldStats::compute(&self.fields);
        *cache = Some((self.version, stats.clone()));
        stats
    }

    fn allocate_id(&mut self) -> FieldId {
        if self.next_id <= MAX_FIELD_ID {
            let id = FieldId(self.next_id);
            self.next_id += 1;
            return id;
        }
        // The counter is used up; fall back to the lowest free id.
        let taken: HashSet<FieldId> = self.fields.iter().map(|field| field.id).collect();
        let mut id = 1;
        while taken.contains(&FieldId(id)) {
            id += 1;
        }
        FieldId(id)
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::rectangle;

    const SCALE: f64 = 0.0001;

    fn square(x: f64, y: f64, side: f64) -> Vec<Point> {
        rectangle(Point::new(x, y), Point::new(x + side, y + side)).into_vec()
    }

    #[test]
    fn created_fields_carry_scaled_area() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 100.), "#4CAF50");
        let field = store.get(id).unwrap();
        assert_eq!(field.name, "Field 1");
        assert_eq!(field.kind, AreaKind::Field);
        assert!((field.area() - 1.).abs() < 1e-12);
        assert_eq!(field.agronomy.growth_stage, Some(GrowthStage::Planning));
    }

    #[test]
    fn ids_are_unique_and_names_count_plain_fields() {
        let mut store = FieldStore::new(SCALE);
        let a = store.create(square(0., 0., 10.), "#000");
        store.edit(a, |f| f.kind = AreaKind::Orchard);
        let b = store.create(square(0., 0., 10.), "#000");
        assert_ne!(a, b);
        assert_eq!(store.get(b).unwrap().name, "Field 1");
    }

    #[test]
    fn replacing_points_recomputes_area() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 10.), "#000");
        assert!(store.set_points(id, square(5., 5., 200.)));
        assert!((store.get(id).unwrap().area() - 4.).abs() < 1e-12);

        assert!(store.set_points(id, vec![Point::new(0., 0.), Point::new(1., 1.)]));
        let field = store.get(id).unwrap();
        assert_eq!(field.area(), 0.);
        assert!(!field.is_polygon());
    }

    #[test]
    fn non_finite_agronomy_is_rejected() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 10.), "#000");
        let soil = SoilAnalysis {
            ph: 6.5,
            nitrogen: 20.,
            phosphorus: 15.,
            potassium: 180.,
            organic_matter: 3.,
            salinity: 0.4,
            moisture: 22.,
        };

        let before = store.get(id).unwrap().clone();
        assert!(!store.edit(id, |f| {
            f.name = "North".to_owned();
            f.agronomy.soil_analysis = Some(SoilAnalysis { ph: f64::NAN, ..soil.clone() });
        }));
        assert!(!store.edit(id, |f| f.agronomy.health = Some(f64::INFINITY)));
        assert_eq!(store.get(id), Some(&before));

        assert!(store.edit(id, |f| f.agronomy.soil_analysis = Some(soil.clone())));
        let loaded = FieldStore::load(&store.save(Utc::now()), SCALE).unwrap();
        assert_eq!(loaded.fields(), store.fields());
    }

    #[test]
    fn topmost_field_wins() {
        let mut store = FieldStore::new(SCALE);
        let below = store.create(square(0., 0., 100.), "#000");
        let above = store.create(square(50., 50., 100.), "#000");
        let overlap = Point::new(75., 75.);
        for _ in 0..5 {
            assert_eq!(store.field_at(overlap), Some(above));
        }
        assert_eq!(store.field_at(Point::new(10., 10.)), Some(below));
        assert_eq!(store.field_at(Point::new(500., 500.)), None);
    }

    #[test]
    fn delete_drops_tasks_and_selection() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 100.), "#000");
        let other = store.create(square(200., 0., 100.), "#000");
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        for field in [id, other] {
            store.edit(field, |f| {
                f.agronomy.harvest_date = NaiveDate::from_ymd_opt(2024, 9, 1);
            });
            assert_eq!(store.schedule_tasks(field, today), 1);
        }
        store.select(Some(id));

        assert!(store.delete(id).is_some());
        assert_eq!(store.selected(), None);
        assert!(store.tasks().iter().all(|t| t.field == other));
        assert_eq!(store.tasks().len(), 1);
        assert!(store.delete(id).is_none());
    }

    #[test]
    fn selecting_unknown_ids_clears() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 1.), "#000");
        store.select(Some(id));
        assert_eq!(store.selected(), Some(id));
        store.select(Some(FieldId(999)));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn selection_cycles() {
        let mut store = FieldStore::new(SCALE);
        let ids: Vec<_> = (0..3)
            .map(|i| store.create(square(i as f64 * 20., 0., 10.), "#000"))
            .collect();
        store.select_next();
        assert_eq!(store.selected(), Some(ids[0]));
        store.select_previous();
        assert_eq!(store.selected(), Some(ids[2]));
        store.select_next();
        assert_eq!(store.selected(), Some(ids[0]));
    }

    #[test]
    fn duplicate_offsets_outline() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 10.), "#123456");
        let copy = store.duplicate(id).unwrap();
        let copy = store.get(copy).unwrap();
        assert_eq!(copy.name, "Field 1 Copy");
        assert_eq!(copy.points()[0], Point::new(50., 50.));
        assert_eq!(copy.area(), store.get(id).unwrap().area());
        assert_eq!(copy.color, "#123456");
    }

    #[test]
    fn stats_are_memoized_by_version() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 100.), "#000");
        store.edit(id, |f| f.agronomy.expected_yield = Some(3.));
        let first = store.stats();
        assert_eq!(first.count, 1);
        assert!((first.total_expected_yield - 3.).abs() < 1e-12);
        assert_eq!(store.stats(), first);

        store.create(square(0., 0., 200.), "#000");
        let second = store.stats();
        assert_eq!(second.count, 2);
        assert!((second.total_area - 5.).abs() < 1e-12);
        assert!((second.average_area - 2.5).abs() < 1e-12);
        assert_eq!(second.by_kind[&AreaKind::Field], 2);
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = FieldStore::new(SCALE);
        let id = store.create(square(0., 0., 1.), "#000");
        store.select(Some(id));
        store.clear();
        assert!(store.fields().is_empty());
        assert_eq!(store.selected(), None);
        assert_eq!(store.stats().count, 0);
    }
}
