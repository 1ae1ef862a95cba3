//! Ticket collection view: filtering and the status board
//!
//! The filtered view is always a pure function of (source collection,
//! filter criteria): every mutator recomputes it synchronously, so it can
//! never hold stale entries, and the source collection's order is never
//! touched.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::{FetchError, UpdateError};
use crate::models::{Status, Ticket};

/// User-specified constraints narrowing the displayed collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring over issue text and assignee name
    pub search_text: String,
    /// Inclusive lower bound on creation day
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on creation day (the whole end day counts)
    pub end_date: Option<NaiveDate>,
    pub status_filter: Option<Status>,
    /// Exact assignee display-name match
    pub staff_filter: Option<String>,
}

impl FilterCriteria {
    /// A ticket is retained iff every set constraint matches
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.matches_search(ticket)
            && self.matches_status(ticket)
            && self.matches_staff(ticket)
            && self.matches_dates(ticket)
    }

    fn matches_search(&self, ticket: &Ticket) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        let in_issue = ticket
            .issue
            .as_deref()
            .is_some_and(|issue| issue.to_lowercase().contains(&needle));
        let in_assignee = ticket
            .assignee_name()
            .is_some_and(|name| name.to_lowercase().contains(&needle));
        in_issue || in_assignee
    }

    fn matches_status(&self, ticket: &Ticket) -> bool {
        self.status_filter.is_none_or(|status| ticket.status == status)
    }

    fn matches_staff(&self, ticket: &Ticket) -> bool {
        match &self.staff_filter {
            None => true,
            Some(name) => ticket.assignee_name().as_deref() == Some(name.as_str()),
        }
    }

    // Day granularity: the timestamp is truncated to its date before
    // comparing, which makes the end bound cover the entire end day.
    fn matches_dates(&self, ticket: &Ticket) -> bool {
        let created = ticket.date_created.date_naive();
        if let Some(start) = self.start_date {
            if created < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if created > end {
                return false;
            }
        }
        true
    }
}

/// Filter a collection, preserving relative order
pub fn apply_filters(tickets: &[Ticket], criteria: &FilterCriteria) -> Vec<Ticket> {
    tickets
        .iter()
        .filter(|ticket| criteria.matches(ticket))
        .cloned()
        .collect()
}

/// Group tickets into the four known status buckets
///
/// Every known bucket is materialized even when empty. Tickets with an
/// unrecognized status are dropped from the board and counted in a warning
/// rather than silently lost.
pub fn partition_by_status(tickets: &[Ticket]) -> BTreeMap<Status, Vec<Ticket>> {
    let mut buckets: BTreeMap<Status, Vec<Ticket>> = Status::KNOWN
        .iter()
        .map(|status| (*status, Vec::new()))
        .collect();

    let mut dropped = 0usize;
    for ticket in tickets {
        match buckets.get_mut(&ticket.status) {
            Some(bucket) => bucket.push(ticket.clone()),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "Dropped {} ticket(s) with unrecognized status from the board",
            dropped
        );
    }
    buckets
}

/// State of one ticket screen: source collection, criteria, derived views
#[derive(Debug, Default)]
pub struct TicketBoard {
    tickets: Vec<Ticket>,
    criteria: FilterCriteria,
    filtered: Vec<Ticket>,
    view: BTreeMap<Status, Vec<Ticket>>,
    /// Bumped for every new request and on detach; stale async results
    /// carry an older value and are ignored.
    generation: u64,
}

impl TicketBoard {
    pub fn new() -> Self {
        let mut board = Self::default();
        board.recompute();
        board
    }

    fn recompute(&mut self) {
        self.filtered = apply_filters(&self.tickets, &self.criteria);
        self.view = partition_by_status(&self.filtered);
    }

    /// The source collection, in backend order
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Flat filtered view (list screens)
    pub fn filtered(&self) -> &[Ticket] {
        &self.filtered
    }

    /// Filtered view partitioned by status (board screens)
    pub fn view(&self) -> &BTreeMap<Status, Vec<Ticket>> {
        &self.view
    }

    /// Replace the source collection
    pub fn set_tickets(&mut self, tickets: Vec<Ticket>) {
        self.tickets = tickets;
        self.recompute();
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.criteria.search_text = text.into();
        self.recompute();
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.criteria.start_date = start;
        self.criteria.end_date = end;
        self.recompute();
    }

    pub fn set_status_filter(&mut self, status: Option<Status>) {
        self.criteria.status_filter = status;
        self.recompute();
    }

    pub fn set_staff_filter(&mut self, staff: Option<String>) {
        self.criteria.staff_filter = staff;
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.recompute();
    }

    /// Mark the start of an async request and return its generation
    pub fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Invalidate all in-flight requests (the screen went away)
    pub fn detach(&mut self) {
        self.generation += 1;
    }

    /// Apply a fetch result; a stale generation is ignored and reported
    pub fn apply_fetch(&mut self, generation: u64, tickets: Vec<Ticket>) -> bool {
        if generation != self.generation {
            debug!(
                "Ignoring stale fetch result (generation {}, current {})",
                generation, self.generation
            );
            return false;
        }
        self.set_tickets(tickets);
        true
    }

    /// Fetch the collection and apply it under a generation guard
    pub async fn refresh(&mut self, api: &ApiClient, token: &str) -> Result<(), FetchError> {
        let generation = self.begin_request();
        let tickets = api.fetch_tickets(token).await?;
        self.apply_fetch(generation, tickets);
        Ok(())
    }

    /// Set a ticket's status locally and recompute; returns the previous
    /// status, or None when the id is not in the collection
    fn apply_status(&mut self, ticket_id: i64, new_status: Status) -> Option<Status> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|ticket| ticket.ticket_id == ticket_id)?;
        let previous = ticket.status;
        ticket.status = new_status;
        self.recompute();
        Some(previous)
    }

    /// Move a ticket between status buckets, optimistically
    ///
    /// The local view moves immediately; if the backend call then fails,
    /// the move is rolled back before the error is returned, so the view
    /// never drifts from what the backend accepted. An id not present in
    /// the collection is a no-op.
    pub async fn update_status(
        &mut self,
        api: &ApiClient,
        token: &str,
        ticket_id: i64,
        new_status: Status,
    ) -> Result<(), UpdateError> {
        let Some(previous) = self.apply_status(ticket_id, new_status) else {
            return Ok(());
        };
        if previous == new_status {
            return Ok(());
        }

        match api.update_status(token, ticket_id, new_status).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    "Status update for ticket {} failed; rolling back to {}",
                    ticket_id,
                    previous.label()
                );
                self.apply_status(ticket_id, previous);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::models::StaffRef;
    use chrono::{DateTime, Utc};

    fn ticket(id: i64, issue: &str, status: Status, created: &str) -> Ticket {
        Ticket {
            ticket_id: id,
            issue: Some(issue.to_string()),
            status,
            date_created: created.parse::<DateTime<Utc>>().unwrap(),
            date_finished: None,
            mis_staff: None,
            employees: None,
            students: None,
        }
    }

    fn assigned(mut t: Ticket, first: &str, last: &str) -> Ticket {
        t.mis_staff = Some(StaffRef {
            id: 1,
            first_name: first.to_string(),
            last_name: last.to_string(),
        });
        t
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_collection() -> Vec<Ticket> {
        vec![
            ticket(1, "printer", Status::ToDo, "2024-01-01T10:00:00Z"),
            ticket(2, "printer jam", Status::Done, "2024-01-02T10:00:00Z"),
            ticket(3, "network", Status::ToDo, "2024-01-03T10:00:00Z"),
        ]
    }

    fn offline_api() -> ApiClient {
        ApiClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: std::time::Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let tickets = sample_collection();
        let filtered = apply_filters(&tickets, &FilterCriteria::default());
        assert_eq!(filtered, tickets);
    }

    #[test]
    fn test_apply_filters_is_idempotent() {
        let tickets = sample_collection();
        let criteria = FilterCriteria {
            search_text: "printer".to_string(),
            ..Default::default()
        };

        let once = apply_filters(&tickets, &criteria);
        let twice = apply_filters(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_search_matches_issue_in_original_order() {
        let tickets = sample_collection();
        let criteria = FilterCriteria {
            search_text: "printer".to_string(),
            ..Default::default()
        };

        let filtered = apply_filters(&tickets, &criteria);
        let ids: Vec<i64> = filtered.iter().map(|t| t.ticket_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_search_matches_assignee_name_case_insensitively() {
        let tickets = vec![
            assigned(
                ticket(1, "broken screen", Status::ToDo, "2024-01-01T10:00:00Z"),
                "Ana",
                "Reyes",
            ),
            ticket(2, "printer", Status::ToDo, "2024-01-01T10:00:00Z"),
        ];
        let criteria = FilterCriteria {
            search_text: "ana rey".to_string(),
            ..Default::default()
        };

        let filtered = apply_filters(&tickets, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].ticket_id, 1);
    }

    #[test]
    fn test_status_filter() {
        let tickets = sample_collection();
        let criteria = FilterCriteria {
            status_filter: Some(Status::Done),
            ..Default::default()
        };

        let filtered = apply_filters(&tickets, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].ticket_id, 2);
    }

    #[test]
    fn test_staff_filter_is_exact() {
        let tickets = vec![
            assigned(
                ticket(1, "a", Status::ToDo, "2024-01-01T10:00:00Z"),
                "Ana",
                "Reyes",
            ),
            assigned(
                ticket(2, "b", Status::ToDo, "2024-01-01T10:00:00Z"),
                "Ana",
                "Reyes-Cruz",
            ),
        ];
        let criteria = FilterCriteria {
            staff_filter: Some("Ana Reyes".to_string()),
            ..Default::default()
        };

        let filtered = apply_filters(&tickets, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].ticket_id, 1);
    }

    #[test]
    fn test_date_range_end_day_is_fully_inclusive() {
        let tickets = vec![
            ticket(1, "late in the day", Status::ToDo, "2024-01-01T23:59:00Z"),
            ticket(2, "next day", Status::ToDo, "2024-01-02T00:00:01Z"),
        ];
        let criteria = FilterCriteria {
            start_date: Some(day(2024, 1, 1)),
            end_date: Some(day(2024, 1, 1)),
            ..Default::default()
        };

        let filtered = apply_filters(&tickets, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].ticket_id, 1);
    }

    #[test]
    fn test_open_ended_date_bounds() {
        let tickets = sample_collection();

        let only_start = FilterCriteria {
            start_date: Some(day(2024, 1, 2)),
            ..Default::default()
        };
        let ids: Vec<i64> = apply_filters(&tickets, &only_start)
            .iter()
            .map(|t| t.ticket_id)
            .collect();
        assert_eq!(ids, vec![2, 3]);

        let only_end = FilterCriteria {
            end_date: Some(day(2024, 1, 2)),
            ..Default::default()
        };
        let ids: Vec<i64> = apply_filters(&tickets, &only_end)
            .iter()
            .map(|t| t.ticket_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_partition_covers_collection_exactly() {
        let tickets = vec![
            ticket(1, "a", Status::ToDo, "2024-01-01T10:00:00Z"),
            ticket(2, "b", Status::InProgress, "2024-01-01T10:00:00Z"),
            ticket(3, "c", Status::Done, "2024-01-01T10:00:00Z"),
            ticket(4, "d", Status::Closed, "2024-01-01T10:00:00Z"),
            ticket(5, "e", Status::ToDo, "2024-01-01T10:00:00Z"),
        ];

        let buckets = partition_by_status(&tickets);
        assert_eq!(buckets.len(), 4);

        let mut ids: Vec<i64> = buckets
            .values()
            .flatten()
            .map(|t| t.ticket_id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(buckets[&Status::ToDo].len(), 2);
    }

    #[test]
    fn test_partition_materializes_empty_buckets_and_drops_unknown() {
        let tickets = vec![
            ticket(1, "a", Status::ToDo, "2024-01-01T10:00:00Z"),
            ticket(2, "b", Status::Unknown, "2024-01-01T10:00:00Z"),
        ];

        let buckets = partition_by_status(&tickets);
        assert_eq!(buckets.len(), 4);
        assert!(buckets[&Status::InProgress].is_empty());
        assert!(buckets[&Status::Done].is_empty());
        assert!(buckets[&Status::Closed].is_empty());
        assert!(!buckets.contains_key(&Status::Unknown));

        let total: usize = buckets.values().map(Vec::len).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_board_recomputes_on_every_input_change() {
        let mut board = TicketBoard::new();
        board.set_tickets(sample_collection());
        assert_eq!(board.filtered().len(), 3);

        board.set_search_text("printer");
        assert_eq!(board.filtered().len(), 2);

        board.set_status_filter(Some(Status::Done));
        assert_eq!(board.filtered().len(), 1);
        assert_eq!(board.view()[&Status::Done].len(), 1);
        assert!(board.view()[&Status::ToDo].is_empty());

        board.reset_filters();
        assert_eq!(board.filtered().len(), 3);
        assert_eq!(board.criteria(), &FilterCriteria::default());

        // Source order is never mutated by filtering
        let ids: Vec<i64> = board.tickets().iter().map(|t| t.ticket_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_stale_fetch_results_are_ignored() {
        let mut board = TicketBoard::new();
        let first = board.begin_request();
        let second = board.begin_request();

        assert!(!board.apply_fetch(first, sample_collection()));
        assert!(board.tickets().is_empty());

        assert!(board.apply_fetch(second, sample_collection()));
        assert_eq!(board.tickets().len(), 3);
    }

    #[test]
    fn test_detach_invalidates_inflight_requests() {
        let mut board = TicketBoard::new();
        let generation = board.begin_request();
        board.detach();

        assert!(!board.apply_fetch(generation, sample_collection()));
        assert!(board.tickets().is_empty());
    }

    #[test]
    fn test_optimistic_move_updates_both_views() {
        let mut board = TicketBoard::new();
        board.set_tickets(sample_collection());

        let previous = board.apply_status(1, Status::InProgress);
        assert_eq!(previous, Some(Status::ToDo));
        assert_eq!(board.view()[&Status::InProgress].len(), 1);
        assert_eq!(board.view()[&Status::ToDo].len(), 1);

        // Unknown id leaves everything alone
        assert_eq!(board.apply_status(99, Status::Done), None);
    }

    #[tokio::test]
    async fn test_update_status_rolls_back_on_backend_failure() {
        let api = offline_api();
        let mut board = TicketBoard::new();
        board.set_tickets(sample_collection());

        let result = board
            .update_status(&api, "token", 1, Status::InProgress)
            .await;
        assert!(matches!(result, Err(UpdateError::Network(_))));

        // The optimistic move was reverted
        let moved = board.tickets().iter().find(|t| t.ticket_id == 1).unwrap();
        assert_eq!(moved.status, Status::ToDo);
        assert_eq!(board.view()[&Status::ToDo].len(), 2);
        assert!(board.view()[&Status::InProgress].is_empty());
    }

    #[tokio::test]
    async fn test_update_status_to_same_status_skips_backend() {
        // The endpoint is unreachable, so reaching it would error; a no-op
        // move must not touch the network at all.
        let api = offline_api();
        let mut board = TicketBoard::new();
        board.set_tickets(sample_collection());

        let result = board.update_status(&api, "token", 1, Status::ToDo).await;
        assert!(result.is_ok());

        // Unknown ticket ids are also a quiet no-op
        let result = board.update_status(&api, "token", 99, Status::Done).await;
        assert!(result.is_ok());
    }
}
