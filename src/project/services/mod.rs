//! Application services for project examination admission.

mod admission;
mod validation;

pub use admission::{
    AdmissionError, AdmissionErrorKind, AdmissionResult, AdmissionService, AdmissionStage,
};
pub use validation::{AdmissionValidationError, AdmitProjectRequest, ValidatedAdmission};
