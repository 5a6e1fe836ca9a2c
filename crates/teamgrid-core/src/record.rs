use crate::calendar::{self, iso_date};
use crate::error::Result;
use crate::paths;
use crate::types::{DayPart, Status};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellPosition
// ---------------------------------------------------------------------------

/// One grid cell: a member's half-day. Also the upsert key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPosition {
    pub user_id: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub day_part: DayPart,
}

impl CellPosition {
    pub fn new(user_id: impl Into<String>, date: NaiveDate, day_part: DayPart) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            day_part,
        }
    }

    /// Same member and date, different half of the day.
    pub fn with_part(&self, day_part: DayPart) -> Self {
        Self {
            user_id: self.user_id.clone(),
            date: self.date,
            day_part,
        }
    }

    /// Storage key: `{user_id}/{date}/{day_part}`.
    ///
    /// User ids are validated slugs and never contain `/`, so all keys for one
    /// member share the `{user_id}/` prefix and sort by date.
    pub fn storage_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.user_id,
            self.date.format("%Y-%m-%d"),
            self.day_part
        )
    }
}

// ---------------------------------------------------------------------------
// AvailabilityRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    /// Assigned by the store on first write. Records merged from a broadcast
    /// before any fetch has seen them carry no id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub day_part: DayPart,
    pub status: Status,
}

impl AvailabilityRecord {
    /// A freshly stored record with a new id.
    pub fn create(cell: &CellPosition, status: Status) -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            user_id: cell.user_id.clone(),
            date: cell.date,
            day_part: cell.day_part,
            status,
        }
    }

    pub fn cell(&self) -> CellPosition {
        CellPosition::new(self.user_id.clone(), self.date, self.day_part)
    }

    pub fn is_at(&self, cell: &CellPosition) -> bool {
        self.user_id == cell.user_id && self.date == cell.date && self.day_part == cell.day_part
    }
}

// ---------------------------------------------------------------------------
// AvailabilityWrite
// ---------------------------------------------------------------------------

/// Body of an availability upsert as it travels over HTTP.
///
/// Fields stay as strings so a bad status, day part, or date can be reported
/// as such instead of as a generic body error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWrite {
    pub user_id: String,
    pub date: String,
    pub day_part: String,
    pub status: String,
}

impl AvailabilityWrite {
    pub fn new(cell: &CellPosition, status: Status) -> Self {
        Self {
            user_id: cell.user_id.clone(),
            date: cell.date.format("%Y-%m-%d").to_string(),
            day_part: cell.day_part.to_string(),
            status: status.to_string(),
        }
    }

    pub fn parse(&self) -> Result<(CellPosition, Status)> {
        paths::validate_id(&self.user_id)?;
        let date = calendar::parse_date(&self.date)?;
        let day_part = self.day_part.parse::<DayPart>()?;
        let status = self.status.parse::<Status>()?;
        Ok((CellPosition::new(self.user_id.clone(), date, day_part), status))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
