//! Work items that follow from a field's recorded dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{FieldBoundary, FieldId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Planting,
    Harvesting,
    Irrigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub field: FieldId,
    pub kind: TaskKind,
    pub title: String,
    pub due: NaiveDate,
    pub estimated_hours: f64,
}

/// Tasks implied by a field's agronomic data as of `today`.
///
/// Planting is only scheduled while the planting date is still ahead. Without a
/// measured area, estimates fall back to a fixed day's work.
pub fn derive(field: &FieldBoundary, today: NaiveDate) -> Vec<Task> {
    let agronomy = &field.agronomy;
    let crop = agronomy.crop_type.as_deref().unwrap_or("crop");
    let area = Some(field.area()).filter(|area| *area > 0.);
    let mut tasks = Vec::new();

    if let Some(date) = agronomy.planting_date.filter(|date| *date > today) {
        tasks.push(Task {
            id: format!("planting-{}", field.id()),
            field: field.id(),
            kind: TaskKind::Planting,
            title: format!("Plant {crop} in {}", field.name),
            due: date,
            estimated_hours: area.map_or(8., |area| area * 2.),
        });
    }

    if let Some(date) = agronomy.harvest_date {
        tasks.push(Task {
            id: format!("harvest-{}", field.id()),
            field: field.id(),
            kind: TaskKind::Harvesting,
            title: format!("Harvest {crop} from {}", field.name),
            due: date,
            estimated_hours: area.map_or(16., |area| area * 4.),
        });
    }

    if let Some(irrigation) = &agronomy.irrigation {
        let due = irrigation.next.date_naive();
        tasks.push(Task {
            id: format!("irrigate-{}-{due}", field.id()),
            field: field.id(),
            kind: TaskKind::Irrigation,
            title: format!("Irrigate {}", field.name),
            due,
            estimated_hours: irrigation.duration_minutes / 60.,
        });
    }

    tasks
}
