//! Client-side availability grid controller.
//!
//! Holds one project's grid state and drives the selection state machine:
//!
//! ```text
//! Idle ──drag_start──▶ Dragging ──drag_extend*──▶ Dragging ──drag_end──▶ Idle (selection kept)
//! Idle (selection) ──apply_status──▶ Idle (cleared) | Idle (single successor selected)
//! Idle ──click──▶ Idle
//! ```
//!
//! Writes go through an [`AvailabilityGateway`]. Each successful write is
//! merged into the local cache and then published for other viewers. There
//! is no coalescing and no conflict detection: the last write wins.

use crate::cache::AvailabilityCache;
use crate::calendar::{self, PERIOD_WEEKS};
use crate::error::{GridError, Result};
use crate::event::BroadcastEvent;
use crate::member::ProjectMember;
use crate::project::Project;
use crate::record::{AvailabilityRecord, CellPosition};
use crate::selection::{self, Selection};
use crate::types::{DayPart, Status};
use crate::view::GridView;
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use std::future::Future;

// ---------------------------------------------------------------------------
// AvailabilityGateway
// ---------------------------------------------------------------------------

/// The controller's view of the outside world: the persistence collaborator
/// plus the broadcast endpoint.
pub trait AvailabilityGateway {
    /// All records for the members of `project_id`, regardless of date.
    fn fetch(&self, project_id: &str)
        -> impl Future<Output = Result<Vec<AvailabilityRecord>>> + Send;

    /// Upsert keyed on (user, date, day part); returns the canonical record.
    fn upsert(
        &self,
        cell: &CellPosition,
        status: Status,
    ) -> impl Future<Output = Result<AvailabilityRecord>> + Send;

    /// Hand an event to the broadcast channel for fan-out.
    fn publish(&self, event: &BroadcastEvent) -> impl Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// ApplyOutcome
// ---------------------------------------------------------------------------

/// Result of setting a status on the whole selection.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    /// Canonical records for every write that succeeded.
    pub written: Vec<AvailabilityRecord>,
    /// Cells whose write was rejected; the cache was left alone for these.
    pub failed: Vec<(CellPosition, GridError)>,
    /// The single cell selected afterwards, if auto-advance applied.
    pub next: Option<CellPosition>,
}

impl ApplyOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// The written records, or the first write error.
    pub fn into_result(mut self) -> Result<Vec<AvailabilityRecord>> {
        if self.failed.is_empty() {
            Ok(self.written)
        } else {
            Err(self.failed.swap_remove(0).1)
        }
    }
}

// ---------------------------------------------------------------------------
// GridController
// ---------------------------------------------------------------------------

pub struct GridController<G> {
    gateway: G,
    project: Project,
    members: Vec<ProjectMember>,
    window_start: NaiveDate,
    cache: AvailabilityCache,
    selection: Selection,
    drag_anchor: Option<CellPosition>,
    dragging: bool,
}

impl<G: AvailabilityGateway> GridController<G> {
    /// A controller with an empty cache. Call [`load_window`](Self::load_window) to seed it.
    pub fn new(
        gateway: G,
        project: Project,
        members: Vec<ProjectMember>,
        window_start: NaiveDate,
    ) -> Self {
        Self {
            gateway,
            project,
            members,
            window_start,
            cache: AvailabilityCache::new(),
            selection: Selection::new(),
            drag_anchor: None,
            dragging: false,
        }
    }

    /// Build a controller and seed its cache.
    pub async fn open(
        gateway: G,
        project: Project,
        members: Vec<ProjectMember>,
        window_start: NaiveDate,
    ) -> Result<Self> {
        let mut controller = Self::new(gateway, project, members, window_start);
        controller.load_window().await?;
        Ok(controller)
    }

    // ---------------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------------

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn members(&self) -> &[ProjectMember] {
        &self.members
    }

    pub fn cache(&self) -> &AvailabilityCache {
        &self.cache
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drag_anchor(&self) -> Option<&CellPosition> {
        self.drag_anchor.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn window_start(&self) -> NaiveDate {
        self.window_start
    }

    pub fn window_dates(&self) -> Vec<NaiveDate> {
        calendar::window_dates(self.window_start)
    }

    pub fn view(&self) -> GridView {
        GridView::build(
            &self.project,
            &self.members,
            self.window_start,
            &self.cache,
            &self.selection,
        )
    }

    // ---------------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------------

    /// Replace the cache with a full fetch of the project's records.
    pub async fn load_window(&mut self) -> Result<()> {
        let records = self.gateway.fetch(&self.project.id).await?;
        tracing::debug!(project = %self.project.id, records = records.len(), "loaded availability");
        self.cache.replace(records);
        Ok(())
    }

    /// Point the controller at another project and reload.
    pub async fn switch_project(
        &mut self,
        project: Project,
        members: Vec<ProjectMember>,
        window_start: NaiveDate,
    ) -> Result<()> {
        self.project = project;
        self.members = members;
        self.window_start = window_start;
        self.selection.clear();
        self.drag_anchor = None;
        self.dragging = false;
        self.cache = AvailabilityCache::new();
        self.load_window().await
    }

    // ---------------------------------------------------------------------------
    // Window navigation
    // ---------------------------------------------------------------------------

    pub fn set_window_start(&mut self, start: NaiveDate) {
        self.window_start = start;
    }

    pub fn previous_period(&mut self) -> NaiveDate {
        self.window_start -= Duration::weeks(PERIOD_WEEKS);
        self.window_start
    }

    pub fn next_period(&mut self) -> NaiveDate {
        self.window_start += Duration::weeks(PERIOD_WEEKS);
        self.window_start
    }

    /// Jump to the week containing `today`.
    pub fn today_period(&mut self, today: NaiveDate) -> NaiveDate {
        self.window_start = calendar::start_of_week(today);
        self.window_start
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn resolve_status(&self, user_id: &str, date: NaiveDate, day_part: DayPart) -> Status {
        self.cache.resolve(user_id, date, day_part)
    }

    pub fn is_editable(&self, date: NaiveDate) -> bool {
        self.project.is_editable(date)
    }

    fn accepts(&self, cell: &CellPosition) -> bool {
        cell.day_part.is_grid_part() && self.is_editable(cell.date)
    }

    // ---------------------------------------------------------------------------
    // Click
    // ---------------------------------------------------------------------------

    /// Rotate one cell to its next status, persist, and publish.
    ///
    /// Returns `Ok(None)` when the click is ignored: the cell is not editable
    /// or a drag is in progress.
    pub async fn click(&mut self, cell: CellPosition) -> Result<Option<AvailabilityRecord>> {
        if self.dragging || !self.accepts(&cell) {
            return Ok(None);
        }
        let next = self
            .resolve_status(&cell.user_id, cell.date, cell.day_part)
            .next();
        let record = self.persist(&cell, next).await?;
        self.publish(&record).await;
        Ok(Some(record))
    }

    // ---------------------------------------------------------------------------
    // Drag
    // ---------------------------------------------------------------------------

    /// Begin a drag. Returns false when the cell is not editable.
    pub fn drag_start(&mut self, cell: CellPosition) -> bool {
        if !self.accepts(&cell) {
            return false;
        }
        self.selection = Selection::single(cell.clone());
        self.drag_anchor = Some(cell);
        self.dragging = true;
        true
    }

    /// Recompute the selection from the anchor to `target`.
    ///
    /// Ignored unless a drag is active and `target` is editable. A target in
    /// another member's row selects nothing.
    pub fn drag_extend(&mut self, target: &CellPosition) -> bool {
        if !self.dragging || !self.accepts(target) {
            return false;
        }
        let Some(anchor) = self.drag_anchor.as_ref() else {
            return false;
        };
        self.selection = Selection::from_cells(selection::drag_range(anchor, target));
        true
    }

    /// Stop dragging. The selection stays highlighted.
    pub fn drag_end(&mut self) {
        self.dragging = false;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ---------------------------------------------------------------------------
    // Status assignment
    // ---------------------------------------------------------------------------

    /// Set `status` on every selected cell.
    ///
    /// All writes run concurrently and are awaited as a set before the
    /// selection changes. A single selected cell advances to its successor
    /// when that cell is editable and not on a weekend; otherwise the
    /// selection is cleared.
    pub async fn apply_status(&mut self, status: Status) -> ApplyOutcome {
        let cells = self.selection.cells().to_vec();
        if cells.is_empty() {
            return ApplyOutcome::default();
        }

        let results = {
            let this = &*self;
            join_all(cells.iter().map(|cell| this.write_and_publish(cell, status))).await
        };

        let mut outcome = ApplyOutcome::default();
        for (cell, result) in cells.iter().zip(results) {
            match result {
                Ok(record) => {
                    self.cache.merge_record(record.clone());
                    outcome.written.push(record);
                }
                Err(e) => outcome.failed.push((cell.clone(), e)),
            }
        }

        outcome.next = match cells.as_slice() {
            [only] => {
                let next = selection::successor(only);
                if self.is_editable(next.date) && !calendar::is_weekend(next.date) {
                    Some(next)
                } else {
                    None
                }
            }
            _ => None,
        };
        self.selection = match &outcome.next {
            Some(next) => Selection::single(next.clone()),
            None => Selection::new(),
        };

        tracing::debug!(
            status = %status,
            written = outcome.written.len(),
            failed = outcome.failed.len(),
            "applied status to selection"
        );
        outcome
    }

    /// Keyboard entry: `1`..`4` set a status on the selection.
    ///
    /// Returns `None` without doing anything when nothing is selected or the
    /// key has no mapping.
    pub async fn key_press(&mut self, key: char) -> Option<ApplyOutcome> {
        if self.selection.is_empty() {
            return None;
        }
        let status = Status::from_key(key)?;
        Some(self.apply_status(status).await)
    }

    // ---------------------------------------------------------------------------
    // Persistence and broadcast
    // ---------------------------------------------------------------------------

    /// Upsert one cell and merge the canonical record. On failure the cache
    /// is left unchanged and the error is returned.
    pub async fn persist(&mut self, cell: &CellPosition, status: Status) -> Result<AvailabilityRecord> {
        match self.gateway.upsert(cell, status).await {
            Ok(record) => {
                self.cache.merge_record(record.clone());
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(cell = %cell.storage_key(), error = %e, "availability write failed");
                Err(e)
            }
        }
    }

    async fn write_and_publish(&self, cell: &CellPosition, status: Status) -> Result<AvailabilityRecord> {
        let record = self.gateway.upsert(cell, status).await.inspect_err(|e| {
            tracing::warn!(cell = %cell.storage_key(), error = %e, "availability write failed");
        })?;
        self.publish(&record).await;
        Ok(record)
    }

    /// Broadcast is best-effort: failures are logged, never returned.
    async fn publish(&self, record: &AvailabilityRecord) {
        let event = BroadcastEvent::from_record(self.project.id.clone(), record);
        if let Err(e) = self.gateway.publish(&event).await {
            tracing::warn!(error = %e, "failed to publish availability update");
        }
    }

    /// Merge a live update. Events for other projects are ignored.
    ///
    /// Returns true when the cache changed.
    pub fn apply_event(&mut self, event: &BroadcastEvent) -> bool {
        if event.project_id != self.project.id {
            return false;
        }
        self.cache.apply_event(event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::User;
    use parking_lot::Mutex;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::Barrier;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cell(user: &str, date: &str, part: DayPart) -> CellPosition {
        CellPosition::new(user, d(date), part)
    }

    /// In-process gateway: a keyed record map plus a log of published events.
    #[derive(Default)]
    struct FakeGateway {
        records: Mutex<BTreeMap<CellPosition, AvailabilityRecord>>,
        published: Mutex<Vec<BroadcastEvent>>,
        reject: Mutex<HashSet<CellPosition>>,
        fail_publish: bool,
        /// When set, every upsert waits here until the whole group has started.
        gate: Mutex<Option<Arc<Barrier>>>,
    }

    impl FakeGateway {
        fn rejecting(cells: &[CellPosition]) -> Self {
            let gw = Self::default();
            gw.reject.lock().extend(cells.iter().cloned());
            gw
        }

        fn hold_writes_until(&self, writers: usize) {
            *self.gate.lock() = Some(Arc::new(Barrier::new(writers)));
        }

        fn stored(&self, cell: &CellPosition) -> Option<Status> {
            self.records.lock().get(cell).map(|r| r.status)
        }
    }

    impl AvailabilityGateway for FakeGateway {
        async fn fetch(&self, _project_id: &str) -> Result<Vec<AvailabilityRecord>> {
            Ok(self.records.lock().values().cloned().collect())
        }

        async fn upsert(&self, cell: &CellPosition, status: Status) -> Result<AvailabilityRecord> {
            let gate = self.gate.lock().clone();
            if let Some(gate) = gate {
                gate.wait().await;
            }
            if self.reject.lock().contains(cell) {
                return Err(GridError::WriteRejected("rejected by test".into()));
            }
            let mut records = self.records.lock();
            let record = records
                .entry(cell.clone())
                .or_insert_with(|| AvailabilityRecord::create(cell, status));
            record.status = status;
            Ok(record.clone())
        }

        async fn publish(&self, event: &BroadcastEvent) -> Result<()> {
            if self.fail_publish {
                return Err(GridError::WriteRejected("broadcast down".into()));
            }
            self.published.lock().push(event.clone());
            Ok(())
        }
    }

    fn project() -> Project {
        // Wednesday start; the editable range begins Sunday 2023-12-31.
        let mut p = Project::new("apollo", "Apollo", d("2024-01-03"));
        p.add_member("u");
        p
    }

    fn members() -> Vec<ProjectMember> {
        vec![ProjectMember::from(&User::new("u", "U", "u@example.com"))]
    }

    fn controller(gw: FakeGateway) -> GridController<FakeGateway> {
        GridController::new(gw, project(), members(), d("2023-12-31"))
    }

    #[tokio::test]
    async fn load_window_seeds_cache() {
        let gw = FakeGateway::default();
        gw.upsert(&cell("u", "2024-01-02", DayPart::Morning), Status::Free)
            .await
            .unwrap();
        let c = GridController::open(gw, project(), members(), d("2023-12-31"))
            .await
            .unwrap();
        assert_eq!(c.cache().len(), 1);
        assert_eq!(
            c.resolve_status("u", d("2024-01-02"), DayPart::Morning),
            Status::Free
        );
    }

    #[tokio::test]
    async fn four_clicks_return_to_original_status() {
        let mut c = controller(FakeGateway::default());
        let target = cell("u", "2024-01-02", DayPart::Morning);
        let original = c.resolve_status("u", target.date, target.day_part);
        assert_eq!(original, Status::Working);

        let first = c.click(target.clone()).await.unwrap().unwrap();
        assert_eq!(first.status, Status::Free);
        for _ in 0..3 {
            c.click(target.clone()).await.unwrap();
        }
        assert_eq!(
            c.resolve_status("u", target.date, target.day_part),
            original
        );
        // One record, four published updates.
        assert_eq!(c.cache().len(), 1);
        assert_eq!(c.gateway().published.lock().len(), 4);
        assert!(c.selection().is_empty());
    }

    #[tokio::test]
    async fn click_publishes_project_scoped_event() {
        let mut c = controller(FakeGateway::default());
        c.click(cell("u", "2024-01-06", DayPart::Afternoon))
            .await
            .unwrap();
        let published = c.gateway().published.lock().clone();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].project_id, "apollo");
        // Saturday defaults to FREE, so the click moves it to NOT_WORKING.
        assert_eq!(published[0].status, Status::NotWorking);
    }

    #[tokio::test]
    async fn non_editable_cell_rejects_all_interaction() {
        let mut c = controller(FakeGateway::default());
        // Project starts 2024-01-03, so 2023-12-31 is editable and 2023-12-30 is not.
        let early = cell("u", "2023-12-30", DayPart::Morning);

        assert!(c.click(early.clone()).await.unwrap().is_none());
        assert!(!c.drag_start(early.clone()));
        assert!(!c.is_dragging());

        assert!(c.drag_start(cell("u", "2024-01-02", DayPart::Morning)));
        assert!(!c.drag_extend(&early));
        assert_eq!(c.selection().len(), 1);

        assert!(c.gateway().stored(&early).is_none());
        assert!(c.gateway().published.lock().is_empty());
    }

    #[tokio::test]
    async fn click_is_suppressed_while_dragging() {
        let mut c = controller(FakeGateway::default());
        let target = cell("u", "2024-01-02", DayPart::Morning);
        assert!(c.drag_start(target.clone()));
        assert!(c.click(target.clone()).await.unwrap().is_none());
        c.drag_end();
        assert!(c.click(target).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn drag_selects_span_and_survives_drag_end() {
        let mut c = controller(FakeGateway::default());
        assert!(c.drag_start(cell("u", "2024-01-03", DayPart::Afternoon)));
        assert!(c.drag_extend(&cell("u", "2024-01-02", DayPart::Morning)));
        assert!(c.drag_extend(&cell("u", "2024-01-01", DayPart::Morning)));
        assert_eq!(c.selection().len(), 6);

        // Shrinking recomputes from the anchor rather than accumulating.
        assert!(c.drag_extend(&cell("u", "2024-01-03", DayPart::Morning)));
        assert_eq!(c.selection().len(), 2);

        c.drag_end();
        assert!(!c.is_dragging());
        assert_eq!(c.selection().len(), 2);
        assert!(!c.drag_extend(&cell("u", "2024-01-01", DayPart::Morning)));
    }

    #[tokio::test]
    async fn cross_row_drag_yields_empty_selection() {
        let mut c = controller(FakeGateway::default());
        assert!(c.drag_start(cell("u", "2024-01-02", DayPart::Morning)));
        assert!(c.drag_extend(&cell("v", "2024-01-04", DayPart::Morning)));
        assert!(c.selection().is_empty());
    }

    #[tokio::test]
    async fn single_friday_afternoon_advances_to_monday() {
        let mut c = controller(FakeGateway::default());
        let friday = cell("u", "2024-01-05", DayPart::Afternoon);
        assert!(c.drag_start(friday.clone()));
        c.drag_end();

        let outcome = c.apply_status(Status::NotWorking).await;
        assert!(outcome.is_complete());
        assert_eq!(outcome.written.len(), 1);
        let monday = cell("u", "2024-01-08", DayPart::Morning);
        assert_eq!(outcome.next, Some(monday.clone()));
        assert_eq!(c.selection().cells(), &[monday]);
        assert_eq!(c.gateway().stored(&friday), Some(Status::NotWorking));
    }

    #[tokio::test]
    async fn single_morning_advances_to_afternoon() {
        let mut c = controller(FakeGateway::default());
        assert!(c.drag_start(cell("u", "2024-01-02", DayPart::Morning)));
        c.drag_end();
        c.key_press('2').await.unwrap();
        assert_eq!(
            c.selection().cells(),
            &[cell("u", "2024-01-02", DayPart::Afternoon)]
        );
        assert_eq!(
            c.resolve_status("u", d("2024-01-02"), DayPart::Morning),
            Status::PartiallyAvailable
        );
    }

    #[tokio::test]
    async fn weekend_successor_clears_selection() {
        let mut c = controller(FakeGateway::default());
        // Saturday morning → Saturday afternoon, which is a weekend.
        assert!(c.drag_start(cell("u", "2024-01-06", DayPart::Morning)));
        c.drag_end();
        let outcome = c.apply_status(Status::Working).await;
        assert!(outcome.next.is_none());
        assert!(c.selection().is_empty());
    }

    #[tokio::test]
    async fn multi_cell_apply_clears_selection() {
        let mut c = controller(FakeGateway::default());
        assert!(c.drag_start(cell("u", "2024-01-01", DayPart::Morning)));
        assert!(c.drag_extend(&cell("u", "2024-01-03", DayPart::Afternoon)));
        c.drag_end();

        let outcome = c.apply_status(Status::Free).await;
        assert_eq!(outcome.written.len(), 6);
        assert!(outcome.next.is_none());
        assert!(c.selection().is_empty());
        assert_eq!(c.gateway().published.lock().len(), 6);
        for date in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            for part in DayPart::GRID {
                assert_eq!(c.resolve_status("u", d(date), part), Status::Free);
            }
        }
    }

    #[tokio::test]
    async fn key_press_is_ignored_without_selection_or_mapping() {
        let mut c = controller(FakeGateway::default());
        assert!(c.key_press('1').await.is_none());

        assert!(c.drag_start(cell("u", "2024-01-02", DayPart::Morning)));
        c.drag_end();
        assert!(c.key_press('9').await.is_none());
        assert_eq!(c.selection().len(), 1);
        assert!(c.gateway().published.lock().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_cache_unchanged() {
        let bad = cell("u", "2024-01-02", DayPart::Morning);
        let mut c = controller(FakeGateway::rejecting(&[bad.clone()]));

        assert!(matches!(
            c.click(bad.clone()).await,
            Err(GridError::WriteRejected(_))
        ));
        assert!(c.cache().is_empty());
        assert!(c.gateway().published.lock().is_empty());

        assert!(c.drag_start(bad.clone()));
        assert!(c.drag_extend(&cell("u", "2024-01-02", DayPart::Afternoon)));
        c.drag_end();
        let outcome = c.apply_status(Status::Free).await;
        assert_eq!(outcome.written.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, bad);
        assert!(c.cache().get(&bad).is_none());
        assert_eq!(c.cache().len(), 1);
    }

    #[tokio::test]
    async fn publish_failure_does_not_undo_write() {
        let gw = FakeGateway {
            fail_publish: true,
            ..FakeGateway::default()
        };
        let mut c = controller(gw);
        let target = cell("u", "2024-01-02", DayPart::Morning);
        let record = c.click(target.clone()).await.unwrap().unwrap();
        assert_eq!(record.status, Status::Free);
        assert_eq!(c.cache().get(&target).unwrap().status, Status::Free);
    }

    #[tokio::test]
    async fn upsert_keeps_one_record_per_cell() {
        let mut c = controller(FakeGateway::default());
        let target = cell("u", "2024-01-02", DayPart::Morning);
        c.persist(&target, Status::Free).await.unwrap();
        c.persist(&target, Status::NotWorking).await.unwrap();
        assert_eq!(c.cache().len(), 1);
        assert_eq!(c.cache().get(&target).unwrap().status, Status::NotWorking);
        assert_eq!(c.gateway().records.lock().len(), 1);
    }

    #[tokio::test]
    async fn events_for_other_projects_are_ignored() {
        let mut c = controller(FakeGateway::default());
        let mut event = BroadcastEvent {
            project_id: "zeus".into(),
            user_id: "u".into(),
            date: d("2024-01-02"),
            day_part: DayPart::Morning,
            status: Status::Free,
        };
        assert!(!c.apply_event(&event));
        assert!(c.cache().is_empty());

        event.project_id = "apollo".into();
        assert!(c.apply_event(&event));
        assert!(!c.apply_event(&event));
        assert_eq!(c.cache().len(), 1);
    }

    #[tokio::test]
    async fn window_navigation() {
        let mut c = controller(FakeGateway::default());
        assert_eq!(c.next_period(), d("2024-01-14"));
        assert_eq!(c.previous_period(), d("2023-12-31"));
        assert_eq!(c.today_period(d("2024-01-10")), d("2024-01-07"));
        assert_eq!(c.window_dates().len(), 14);
    }

    #[tokio::test]
    async fn switch_project_resets_state() {
        let mut c = controller(FakeGateway::default());
        assert!(c.drag_start(cell("u", "2024-01-02", DayPart::Morning)));
        let other = Project::new("zeus", "Zeus", d("2024-02-01"));
        c.switch_project(other, vec![], d("2024-01-28")).await.unwrap();
        assert_eq!(c.project().id, "zeus");
        assert!(c.selection().is_empty());
        assert!(!c.is_dragging());
        assert!(c.drag_anchor().is_none());
    }

    #[tokio::test]
    async fn selection_writes_all_start_before_any_finishes() {
        let mut c = controller(FakeGateway::default());
        assert!(c.drag_start(cell("u", "2024-01-01", DayPart::Morning)));
        assert!(c.drag_extend(&cell("u", "2024-01-03", DayPart::Afternoon)));
        c.drag_end();
        let selected = c.selection().len();
        assert_eq!(selected, 6);

        // Each upsert blocks until all six are in flight; sequential writes
        // would never get past the first one.
        c.gateway().hold_writes_until(selected);
        let limit = std::time::Duration::from_secs(5);
        let outcome = tokio::time::timeout(limit, c.apply_status(Status::Free))
            .await
            .expect("writes were not issued concurrently");

        assert!(outcome.is_complete());
        assert_eq!(outcome.written.len(), 6);
        assert_eq!(c.gateway().published.lock().len(), 6);
        assert!(c.selection().is_empty());
    }

    #[tokio::test]
    async fn editable_range_starts_on_the_sunday_of_the_start_week() {
        // Start 2024-01-10 (Wednesday): 2024-01-07 is editable, 2024-01-06 is not.
        let mut p = Project::new("apollo", "Apollo", d("2024-01-10"));
        p.add_member("u");
        let mut c = GridController::new(FakeGateway::default(), p, members(), d("2024-01-07"));

        assert!(c.is_editable(d("2024-01-07")));
        assert!(!c.is_editable(d("2024-01-06")));

        let saturday = cell("u", "2024-01-06", DayPart::Afternoon);
        assert!(c.click(saturday.clone()).await.unwrap().is_none());
        assert!(!c.drag_start(saturday.clone()));
        assert_eq!(c.gateway().stored(&saturday), None);

        let sunday = cell("u", "2024-01-07", DayPart::Morning);
        let record = c.click(sunday.clone()).await.unwrap().unwrap();
        // Sunday defaults to FREE; one click moves it to NOT_WORKING.
        assert_eq!(record.status, Status::NotWorking);
        assert_eq!(c.gateway().stored(&sunday), Some(Status::NotWorking));
    }
}
