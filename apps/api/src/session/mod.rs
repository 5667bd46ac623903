// Interaction controller: per-user sessions, their state machine and HTTP handlers.
// Sessions are in-memory only and expire after SESSION_TTL_SECS of inactivity.

pub mod controller;
pub mod handlers;
pub mod model;
pub mod store;
