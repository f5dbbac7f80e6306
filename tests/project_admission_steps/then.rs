//! Then steps for project admission BDD scenarios.

use super::world::{AdmissionWorld, run_async};
use examiner::project::{
    domain::{ExaminationStatus, Project, ProjectId},
    ports::ProjectStore,
};
use rstest_bdd_macros::then;

fn stored_project(world: &AdmissionWorld, project: &str) -> Result<Project, eyre::Report> {
    run_async(world.store.find_by_id(&ProjectId::new(project)?))?
        .ok_or_else(|| eyre::eyre!("project {project} is missing from the store"))
}

#[then("the admission succeeds")]
fn admission_succeeds(world: &AdmissionWorld) -> Result<(), eyre::Report> {
    match world.result()? {
        Ok(_) => Ok(()),
        Err(err) => Err(eyre::eyre!("expected admission, got {err:?}")),
    }
}

#[then(r#"the admission fails with "{kind}""#)]
fn admission_fails_with(world: &AdmissionWorld, kind: String) -> Result<(), eyre::Report> {
    match world.result()? {
        Err(err) if err.kind().as_str() == kind => Ok(()),
        Err(err) => Err(eyre::eyre!("expected {kind}, got {}", err.kind())),
        Ok(project) => Err(eyre::eyre!("expected {kind}, admitted {}", project.id())),
    }
}

#[then("the failure reports committed state")]
fn failure_reports_committed_state(world: &AdmissionWorld) -> Result<(), eyre::Report> {
    match world.result()? {
        Err(err) if err.state_committed() => Ok(()),
        other => Err(eyre::eyre!("expected a committed failure, got {other:?}")),
    }
}

#[then(r#"project "{project}" has status "{status}""#)]
fn project_has_status(
    world: &AdmissionWorld,
    project: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = ExaminationStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let actual = stored_project(world, &project)?.examination_status();
    if actual != expected {
        return Err(eyre::eyre!(
            "expected {project} to be {expected}, found {actual}"
        ));
    }
    Ok(())
}

#[then(r#"project "{project}" has commit "{hash}""#)]
fn project_has_commit(
    world: &AdmissionWorld,
    project: String,
    hash: String,
) -> Result<(), eyre::Report> {
    let stored = stored_project(world, &project)?;
    match stored.commit_hash() {
        Some(actual) if actual.as_str() == hash => Ok(()),
        other => Err(eyre::eyre!("expected commit {hash}, found {other:?}")),
    }
}

#[then(r#"project "{project}" has no commit"#)]
fn project_has_no_commit(world: &AdmissionWorld, project: String) -> Result<(), eyre::Report> {
    let stored = stored_project(world, &project)?;
    match stored.commit_hash() {
        None => Ok(()),
        Some(actual) => Err(eyre::eyre!("expected no commit, found {actual}")),
    }
}

#[then(r#"one admission event was published with previous status "{status}""#)]
fn one_event_published(world: &AdmissionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = ExaminationStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let published = world.publisher.published()?;
    let [event] = published.as_slice() else {
        return Err(eyre::eyre!("expected one event, found {}", published.len()));
    };
    if event.previous_status() != expected || event.new_status() != ExaminationStatus::InProgress {
        return Err(eyre::eyre!("unexpected event {event:?}"));
    }
    Ok(())
}

#[then("no admission event was published")]
fn no_event_published(world: &AdmissionWorld) -> Result<(), eyre::Report> {
    let published = world.publisher.published()?;
    if !published.is_empty() {
        return Err(eyre::eyre!("expected no events, found {}", published.len()));
    }
    Ok(())
}
