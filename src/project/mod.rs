//! Examination admission for repository-bound projects.
//!
//! A project may be handed to the external examination pipeline only when
//! neither it nor any other project of its owner is under examination, and
//! only when its repository changed since the last completed examination.
//! Admission records the new commit hash and `IN_PROGRESS` status in one
//! conditional write and then publishes an [`domain::AdmissionEvent`].
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
