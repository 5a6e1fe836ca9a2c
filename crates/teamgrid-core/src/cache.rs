use crate::calendar;
use crate::event::BroadcastEvent;
use crate::record::{AvailabilityRecord, CellPosition};
use crate::types::{DayPart, Status};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Records known to one grid view.
///
/// Seeded by a full fetch, then merged into record by record. At most one
/// record is held per (user, date, day part); `index` maps each cell to its
/// slot in `records`.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityCache {
    records: Vec<AvailabilityRecord>,
    index: HashMap<CellPosition, usize>,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<AvailabilityRecord>) -> Self {
        let mut cache = Self::new();
        cache.replace(records);
        cache
    }

    /// Drop everything and load `records`. Later duplicates of a cell win.
    pub fn replace(&mut self, records: Vec<AvailabilityRecord>) {
        self.records.clear();
        self.index.clear();
        self.records.reserve(records.len());
        self.index.reserve(records.len());
        for record in records {
            self.merge_record(record);
        }
    }

    pub fn records(&self) -> &[AvailabilityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, cell: &CellPosition) -> Option<&AvailabilityRecord> {
        self.index.get(cell).map(|&slot| &self.records[slot])
    }

    /// Stored status, or the weekday default when no record exists.
    pub fn resolve(&self, user_id: &str, date: NaiveDate, day_part: DayPart) -> Status {
        self.get(&CellPosition::new(user_id, date, day_part))
            .map(|r| r.status)
            .unwrap_or_else(|| calendar::default_status(date))
    }

    /// Replace the record for the same cell, or append it.
    pub fn merge_record(&mut self, record: AvailabilityRecord) {
        match self.index.get(&record.cell()) {
            Some(&slot) => self.records[slot] = record,
            None => self.push(record),
        }
    }

    /// Find-or-insert the event's cell and overwrite its status.
    ///
    /// Does not look at `project_id`; callers filter first. Returns true when
    /// the cache changed, so replaying an event reports false.
    pub fn apply_event(&mut self, event: &BroadcastEvent) -> bool {
        let cell = event.cell();
        match self.index.get(&cell) {
            Some(&slot) if self.records[slot].status == event.status => false,
            Some(&slot) => {
                self.records[slot].status = event.status;
                true
            }
            None => {
                self.push(AvailabilityRecord {
                    id: None,
                    user_id: cell.user_id,
                    date: cell.date,
                    day_part: cell.day_part,
                    status: event.status,
                });
                true
            }
        }
    }

    fn push(&mut self, record: AvailabilityRecord) {
        self.index.insert(record.cell(), self.records.len());
        self.records.push(record);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
