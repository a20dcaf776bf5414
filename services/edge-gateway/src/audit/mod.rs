//! Best-effort session auditing.
//!
//! The gateway tells the session audit service about every login and logout.
//! Those calls happen off the request path and their failures are only logged:
//! an unreachable audit service never affects authentication.

pub mod client;
pub mod dispatcher;

pub use client::SessionAuditClient;
pub use dispatcher::AuditDispatcher;
