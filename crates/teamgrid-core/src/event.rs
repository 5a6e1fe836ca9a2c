//! Live availability-change events and their Server-Sent-Events framing.
//!
//! Each event travels as one UTF-8 frame `data: <json>\n\n`. Consumers filter
//! by `projectId`; the broadcast side never does.

use crate::calendar::iso_date;
use crate::error::Result;
use crate::record::{AvailabilityRecord, CellPosition};
use crate::types::{DayPart, Status};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastEvent {
    pub project_id: String,
    pub user_id: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub day_part: DayPart,
    pub status: Status,
}

impl BroadcastEvent {
    pub fn from_record(project_id: impl Into<String>, record: &AvailabilityRecord) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: record.user_id.clone(),
            date: record.date,
            day_part: record.day_part,
            status: record.status,
        }
    }

    pub fn cell(&self) -> CellPosition {
        CellPosition::new(self.user_id.clone(), self.date, self.day_part)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The full wire frame, `data: <json>\n\n`.
    pub fn to_frame(&self) -> Result<String> {
        Ok(format!("data: {}\n\n", self.to_json()?))
    }
}

// ---------------------------------------------------------------------------
// FrameDecoder
// ---------------------------------------------------------------------------

/// Incremental decoder for an SSE byte stream.
///
/// Bytes are buffered until a blank line closes a frame, so chunk boundaries
/// may fall anywhere, including inside a multi-byte character. Comment lines
/// (`: keep-alive`) and `event:`/`id:` fields are skipped; frames with no
/// `data:` lines yield nothing.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns one item per complete data frame.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<BroadcastEvent>> {
        self.buf.extend(chunk.iter().filter(|&&b| b != b'\r'));

        let mut out = Vec::new();
        while let Some(end) = find_frame_end(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..end + 2).collect();
            let text = String::from_utf8_lossy(&frame[..end]);
            let data: Vec<&str> = text
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|d| d.strip_prefix(' ').unwrap_or(d))
                .collect();
            if data.is_empty() {
                continue;
            }
            out.push(serde_json::from_str(&data.join("\n")).map_err(Into::into));
        }
        out
    }

    /// Bytes received that do not yet form a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

/// Decode every complete frame in `buf`; a trailing partial frame is ignored.
pub fn parse_frames(buf: &[u8]) -> Vec<Result<BroadcastEvent>> {
    FrameDecoder::new().push(buf)
}

fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
