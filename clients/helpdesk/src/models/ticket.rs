//! Ticket model and update payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::StaffRef;

/// Ticket workflow status
///
/// Serialized as the backend's display strings. Any status the backend sends
/// that the client does not know lands in `Unknown` so a single odd record
/// cannot fail a whole collection fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Closed,
    #[serde(other)]
    Unknown,
}

impl Status {
    /// The four statuses the board materializes columns for
    pub const KNOWN: [Status; 4] = [
        Status::ToDo,
        Status::InProgress,
        Status::Done,
        Status::Closed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
            Status::Closed => "Closed",
            Status::Unknown => "Unknown",
        }
    }

    /// Whether this status ends the workflow and carries a finish date
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done | Status::Closed)
    }
}

/// Reporter attachment carried by a ticket
///
/// The backend attaches either an `employees` or a `students` object whose
/// fields vary by deployment, so everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub student_number: Option<String>,
}

/// Which kind of user reported a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reporter {
    Employee,
    Student,
}

/// A unit of reported work, as returned by `GET /TicketService/tickets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub ticket_id: i64,
    #[serde(default)]
    pub issue: Option<String>,
    pub status: Status,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mis_staff: Option<StaffRef>,
    #[serde(default)]
    pub employees: Option<ReporterRef>,
    #[serde(default)]
    pub students: Option<ReporterRef>,
}

impl Ticket {
    /// "First Last" of the assigned staff member, if any
    pub fn assignee_name(&self) -> Option<String> {
        self.mis_staff.as_ref().map(StaffRef::display_name)
    }

    /// Reporter kind and identity, derived from whichever attachment is set
    pub fn reporter(&self) -> Option<(Reporter, &ReporterRef)> {
        if let Some(employee) = &self.employees {
            return Some((Reporter::Employee, employee));
        }
        self.students
            .as_ref()
            .map(|student| (Reporter::Student, student))
    }
}

/// Staff assignment fragment of a ticket update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub staff_id: i64,
}

/// Partial ticket for `PUT /TicketService/ticket/update/{id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    pub ticket_id: i64,
    pub issue: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mis_staff: Option<StaffAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_finished: Option<DateTime<Utc>>,
}

impl TicketUpdate {
    /// Build an update from the edit form's selections
    ///
    /// Unchanged fields fall back to the ticket's current values. Moving a
    /// ticket into a terminal status stamps the finish date.
    pub fn new(
        ticket: &Ticket,
        issue: Option<String>,
        status: Status,
        staff_id: Option<i64>,
    ) -> Self {
        let date_finished = status.is_terminal().then(Utc::now);
        let mis_staff = staff_id
            .map(|id| StaffAssignment { staff_id: id })
            .or_else(|| {
                ticket
                    .mis_staff
                    .as_ref()
                    .map(|staff| StaffAssignment { staff_id: staff.id })
            });

        TicketUpdate {
            ticket_id: ticket.ticket_id,
            issue: issue
                .or_else(|| ticket.issue.clone())
                .unwrap_or_default(),
            status,
            mis_staff,
            date_finished,
        }
    }
}

/// Body for `PUT /TicketService/updateStatus/{id}`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusUpdate {
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ticket(json: serde_json::Value) -> Ticket {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_status_round_trips_display_strings() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"To Do\"").unwrap(),
            Status::ToDo
        );
    }

    #[test]
    fn test_unrecognized_status_becomes_unknown() {
        assert_eq!(
            serde_json::from_str::<Status>("\"Pending\"").unwrap(),
            Status::Unknown
        );
    }

    #[test]
    fn test_ticket_deserializes_backend_shape() {
        let ticket = sample_ticket(serde_json::json!({
            "ticketId": 12,
            "issue": "printer jam",
            "status": "In Progress",
            "dateCreated": "2024-03-05T09:30:00Z",
            "misStaff": { "id": 3, "firstName": "Ana", "lastName": "Reyes" },
            "students": { "studentNumber": "S-1009" }
        }));

        assert_eq!(ticket.ticket_id, 12);
        assert_eq!(ticket.status, Status::InProgress);
        assert_eq!(ticket.assignee_name().as_deref(), Some("Ana Reyes"));
        assert_eq!(ticket.date_finished, None);

        let (kind, reporter) = ticket.reporter().unwrap();
        assert_eq!(kind, Reporter::Student);
        assert_eq!(reporter.student_number.as_deref(), Some("S-1009"));
    }

    #[test]
    fn test_update_stamps_finish_date_for_terminal_status() {
        let ticket = sample_ticket(serde_json::json!({
            "ticketId": 5,
            "issue": "no network",
            "status": "To Do",
            "dateCreated": "2024-03-05T09:30:00Z"
        }));

        let update = TicketUpdate::new(&ticket, None, Status::Done, Some(7));
        assert!(update.date_finished.is_some());
        assert_eq!(update.issue, "no network");
        assert_eq!(update.mis_staff.as_ref().unwrap().staff_id, 7);

        let update = TicketUpdate::new(&ticket, None, Status::InProgress, None);
        assert_eq!(update.date_finished, None);
        assert!(update.mis_staff.is_none());
    }

    #[test]
    fn test_update_keeps_current_assignment_when_none_selected() {
        let ticket = sample_ticket(serde_json::json!({
            "ticketId": 5,
            "issue": "no network",
            "status": "To Do",
            "dateCreated": "2024-03-05T09:30:00Z",
            "misStaff": { "id": 3, "firstName": "Ana", "lastName": "Reyes" }
        }));

        let update = TicketUpdate::new(&ticket, Some("no wifi".to_string()), Status::ToDo, None);
        assert_eq!(update.mis_staff.as_ref().unwrap().staff_id, 3);
        assert_eq!(update.issue, "no wifi");
    }
}
