//! Unit tests for the project module.
//!
//! Tests are organised by concern: value objects and the aggregate, the
//! status transition table, the admission event wire format, the in-memory
//! store's write guards, and the admission service against in-memory and
//! mocked collaborators.
