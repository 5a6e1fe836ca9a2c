use crate::cache::AvailabilityCache;
use crate::calendar;
use crate::member::ProjectMember;
use crate::project::Project;
use crate::record::CellPosition;
use crate::selection::Selection;
use crate::types::{DayPart, Status};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateHeader {
    pub date: NaiveDate,
    pub editable: bool,
    pub weekend: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub position: CellPosition,
    pub status: Status,
    pub editable: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub member: ProjectMember,
    /// Two cells per window date, morning then afternoon.
    pub cells: Vec<GridCell>,
}

/// Render model of the 14-day grid: one row per member, two cells per date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridView {
    pub project_id: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub dates: Vec<DateHeader>,
    pub rows: Vec<GridRow>,
}

impl GridView {
    pub fn build(
        project: &Project,
        members: &[ProjectMember],
        window_start: NaiveDate,
        cache: &AvailabilityCache,
        selection: &Selection,
    ) -> Self {
        let dates = calendar::window_dates(window_start);

        let headers = dates
            .iter()
            .map(|&date| DateHeader {
                date,
                editable: project.is_editable(date),
                weekend: calendar::is_weekend(date),
            })
            .collect();

        let rows = members
            .iter()
            .map(|member| {
                let cells = dates
                    .iter()
                    .flat_map(|&date| {
                        DayPart::GRID.into_iter().map(move |part| (date, part))
                    })
                    .map(|(date, part)| {
                        let position = CellPosition::new(member.id.clone(), date, part);
                        GridCell {
                            status: cache.resolve(&member.id, date, part),
                            editable: project.is_editable(date),
                            selected: selection.contains(&position),
                            position,
                        }
                    })
                    .collect();
                GridRow {
                    member: member.clone(),
                    cells,
                }
            })
            .collect();

        Self {
            project_id: project.id.clone(),
            window_start,
            window_end: calendar::window_end(window_start),
            dates: headers,
            rows,
        }
    }

    /// "7 Jan 2024 - 20 Jan 2024"
    pub fn title(&self) -> String {
        format!(
            "{} - {}",
            self.window_start.format("%-d %b %Y"),
            self.window_end.format("%-d %b %Y")
        )
    }

    pub fn cell(&self, user_id: &str, date: NaiveDate, day_part: DayPart) -> Option<&GridCell> {
        self.rows
            .iter()
            .find(|r| r.member.id == user_id)?
            .cells
            .iter()
            .find(|c| c.position.date == date && c.position.day_part == day_part)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
