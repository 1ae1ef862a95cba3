//! Ticketing data models
//!
//! Wire shapes match the backend's JSON (camelCase field names). The client
//! never owns this data; every value here is a local copy of a backend
//! record.

pub mod staff;
pub mod ticket;

// Re-export for convenience
pub use staff::StaffRef;
pub use ticket::{
    Reporter, ReporterRef, StaffAssignment, Status, StatusUpdate, Ticket, TicketUpdate,
};
