// src/brevo/mod.rs
//
// Typed wrapper over the Brevo REST surface: transactional send, account
// identity, plan/credit info, delivery events and aggregated statistics.
// Responses from the free tier come back partial or inconsistently shaped,
// so everything is normalized through `types` and `events` before callers
// see it.

pub mod client;
pub mod error;
pub mod events;
pub mod types;

pub use client::{BrevoClient, BrevoConfig};
pub use error::BrevoError;
pub use events::{EventRecord, EventsPage, Pagination, TransactionalStats};
pub use types::{AccountInfo, PlanInfo, SendResponse, StatisticsReport};
