//! When steps for project admission BDD scenarios.

use super::world::{AdmissionWorld, run_async};
use examiner::project::services::AdmitProjectRequest;
use rstest_bdd_macros::when;

#[when(r#""{user}" admits project "{project}""#)]
fn user_admits_project(world: &mut AdmissionWorld, user: String, project: String) {
    let request = AdmitProjectRequest::new(user, project);
    world.last_result = Some(run_async(world.service.admit(request)));
}
