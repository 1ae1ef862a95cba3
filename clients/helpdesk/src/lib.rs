//! Client core of the helpdesk ticketing system
//!
//! This crate implements the state management slice shared by every screen
//! of the ticketing front end: session acquisition and gating
//! ([`session::SessionManager`]) and the ticket collection view with its
//! filtering and status-board derivations ([`board::TicketBoard`]). All
//! business rules (transitions, assignment, authorization) live in the
//! remote backend; this crate only holds non-authoritative local copies.

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

pub use api::ApiClient;
pub use board::{FilterCriteria, TicketBoard, apply_filters, partition_by_status};
pub use config::BackendConfig;
pub use error::{AuthError, FetchError, UpdateError};
pub use session::{Role, Session, SessionManager, SessionSnapshot};
