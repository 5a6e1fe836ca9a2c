use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Free,
    NotWorking,
    PartiallyAvailable,
    Working,
}

impl Status {
    /// All statuses in click-cycle order.
    pub fn all() -> &'static [Status] {
        &[
            Status::Free,
            Status::NotWorking,
            Status::PartiallyAvailable,
            Status::Working,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The status a click rotates to: FREE → NOT_WORKING → PARTIALLY_AVAILABLE → WORKING → FREE.
    pub fn next(self) -> Status {
        let all = Status::all();
        all[(self.index() + 1) % all.len()]
    }

    /// Keyboard shortcut mapping used by the grid: `1`..`4`.
    pub fn from_key(key: char) -> Option<Status> {
        match key {
            '1' => Some(Status::Working),
            '2' => Some(Status::PartiallyAvailable),
            '3' => Some(Status::NotWorking),
            '4' => Some(Status::Free),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Free => "FREE",
            Status::NotWorking => "NOT_WORKING",
            Status::PartiallyAvailable => "PARTIALLY_AVAILABLE",
            Status::Working => "WORKING",
        }
    }

    /// Lowercase human label ("partially available").
    pub fn label(self) -> &'static str {
        match self {
            Status::Free => "free",
            Status::NotWorking => "not working",
            Status::PartiallyAvailable => "partially available",
            Status::Working => "working",
        }
    }

    /// Single-letter marker used by text renderings of the grid.
    pub fn symbol(self) -> char {
        match self {
            Status::Free => 'F',
            Status::NotWorking => 'N',
            Status::PartiallyAvailable => 'P',
            Status::Working => 'W',
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = crate::error::GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" | "free" => Ok(Status::Free),
            "NOT_WORKING" | "not_working" | "not-working" => Ok(Status::NotWorking),
            "PARTIALLY_AVAILABLE" | "partially_available" | "partially-available" => {
                Ok(Status::PartiallyAvailable)
            }
            "WORKING" | "working" => Ok(Status::Working),
            _ => Err(crate::error::GridError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DayPart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayPart {
    Morning,
    Afternoon,
    /// Accepted by storage but never rendered or produced by the grid.
    Evening,
}

impl DayPart {
    /// The day parts the grid renders, in display order.
    pub const GRID: [DayPart; 2] = [DayPart::Morning, DayPart::Afternoon];

    pub fn is_grid_part(self) -> bool {
        matches!(self, DayPart::Morning | DayPart::Afternoon)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayPart::Morning => "MORNING",
            DayPart::Afternoon => "AFTERNOON",
            DayPart::Evening => "EVENING",
        }
    }
}

impl fmt::Display for DayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DayPart {
    type Err = crate::error::GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MORNING" | "morning" | "am" => Ok(DayPart::Morning),
            "AFTERNOON" | "afternoon" | "pm" => Ok(DayPart::Afternoon),
            "EVENING" | "evening" => Ok(DayPart::Evening),
            _ => Err(crate::error::GridError::InvalidDayPart(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
