//! Examiner: project examination admission.
//!
//! This crate decides whether a repository-bound project may be handed off
//! for external examination, records the admission, and publishes the event
//! that starts the examination pipeline.
//!
//! # Architecture
//!
//! Examiner follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, brokers, etc.)
//!
//! # Modules
//!
//! - [`project`]: Project examination lifecycle and admission
//! - [`config`]: Environment-driven runtime configuration
//! - [`telemetry`]: Tracing subscriber installation

pub mod config;
pub mod project;
pub mod telemetry;
