//! Cell selection for bulk status entry.
//!
//! A drag covers a continuous span of half-days within one member's row: every
//! date between the endpoints gets both halves, and each endpoint date gets
//! only the halves on the inside of the span. The result does not depend on
//! drag direction.

use crate::calendar;
use crate::record::CellPosition;
use crate::types::DayPart;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free set of highlighted cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    cells: Vec<CellPosition>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(cell: CellPosition) -> Self {
        Self { cells: vec![cell] }
    }

    pub fn from_cells(cells: impl IntoIterator<Item = CellPosition>) -> Self {
        let mut selection = Self::new();
        for cell in cells {
            if !selection.contains(&cell) {
                selection.cells.push(cell);
            }
        }
        selection
    }

    pub fn cells(&self) -> &[CellPosition] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &CellPosition) -> bool {
        self.cells.contains(cell)
    }

    /// The only selected cell, if exactly one is selected.
    pub fn single_cell(&self) -> Option<&CellPosition> {
        match self.cells.as_slice() {
            [cell] => Some(cell),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

// ---------------------------------------------------------------------------
// Drag range
// ---------------------------------------------------------------------------

/// Every cell spanned by a drag from `anchor` to `target`, in chronological order.
///
/// Empty when the target is in another member's row or either endpoint is
/// not a grid day part.
pub fn drag_range(anchor: &CellPosition, target: &CellPosition) -> Vec<CellPosition> {
    if anchor.user_id != target.user_id
        || !anchor.day_part.is_grid_part()
        || !target.day_part.is_grid_part()
    {
        return Vec::new();
    }

    let (first, last) = if (anchor.date, anchor.day_part) <= (target.date, target.day_part) {
        (anchor, target)
    } else {
        (target, anchor)
    };

    calendar::dates_between(first.date, last.date)
        .into_iter()
        .flat_map(|date| {
            let from = if date == first.date {
                first.day_part
            } else {
                DayPart::Morning
            };
            let to = if date == last.date {
                last.day_part
            } else {
                DayPart::Afternoon
            };
            DayPart::GRID
                .into_iter()
                .filter(move |part| *part >= from && *part <= to)
                .map(move |part| CellPosition::new(anchor.user_id.clone(), date, part))
        })
        .collect()
}

/// The cell that follows `cell` for sequential entry: the same day's
/// afternoon after a morning, otherwise the next weekday's morning.
pub fn successor(cell: &CellPosition) -> CellPosition {
    match cell.day_part {
        DayPart::Morning => cell.with_part(DayPart::Afternoon),
        _ => CellPosition::new(
            cell.user_id.clone(),
            calendar::next_weekday(cell.date),
            DayPart::Morning,
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
