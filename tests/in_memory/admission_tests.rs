//! In-memory integration tests for admission outcomes.

use super::helpers::world;
use examiner::project::{
    domain::ExaminationStatus,
    services::{AdmissionErrorKind, AdmitProjectRequest},
};
use eyre::{OptionExt, ensure};
use rstest::rstest;

const FIRST: &str = "c0ffee1c0ffee1c0ffee1c0ffee1c0ffee1c0ffe";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admitted_project_blocks_the_owners_other_projects() -> eyre::Result<()> {
    let world = world();
    world.connect("alice")?;
    world
        .seed_project("alpha", "alice", 1, ExaminationStatus::Pending, FIRST)
        .await?;
    world
        .seed_project("beta", "alice", 2, ExaminationStatus::Pending, FIRST)
        .await?;

    world
        .service
        .admit(AdmitProjectRequest::new("alice", "alpha"))
        .await?;
    let second = world
        .service
        .admit(AdmitProjectRequest::new("alice", "beta"))
        .await;

    ensure!(
        second
            .as_ref()
            .is_err_and(|err| err.kind() == AdmissionErrorKind::UserExaminationLimitReached),
        "expected user limit, got {second:?}"
    );
    ensure!(world.in_progress_count(&["alpha", "beta"]).await? == 1);
    ensure!(world.publisher.published()?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn different_owners_are_admitted_independently() -> eyre::Result<()> {
    let world = world();
    world.connect("alice")?;
    world.connect("bob")?;
    world
        .seed_project("alpha", "alice", 1, ExaminationStatus::Pending, FIRST)
        .await?;
    world
        .seed_project("gamma", "bob", 3, ExaminationStatus::Failed, FIRST)
        .await?;

    world
        .service
        .admit(AdmitProjectRequest::new("alice", "alpha"))
        .await?;
    world
        .service
        .admit(AdmitProjectRequest::new("bob", "gamma"))
        .await?;

    ensure!(world.in_progress_count(&["alpha", "gamma"]).await? == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn published_payload_uses_the_wire_contract() -> eyre::Result<()> {
    let world = world();
    world.connect("alice")?;
    world
        .seed_project("alpha", "alice", 1, ExaminationStatus::Pending, FIRST)
        .await?;

    world
        .service
        .admit(AdmitProjectRequest::new("alice", "alpha"))
        .await?;

    let payloads = world.publisher.payloads()?;
    let payload = payloads.first().ok_or_eyre("payload should be recorded")?;
    let decoded: serde_json::Value = serde_json::from_str(payload)?;
    ensure!(decoded["projectId"] == "alpha");
    ensure!(decoded["previousStatus"] == "PENDING");
    ensure!(decoded["newStatus"] == "IN_PROGRESS");
    ensure!(decoded["repoFullName"] == "alice/repo-1");
    ensure!(decoded["repoCommitHash"] == FIRST);
    ensure!(world.stored_hash("alpha").await?.is_some_and(|hash| hash.as_str() == FIRST));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_admissions_leave_commit_hash_untouched() -> eyre::Result<()> {
    let world = world();
    world
        .seed_project("alpha", "alice", 1, ExaminationStatus::Pending, FIRST)
        .await?;

    let result = world
        .service
        .admit(AdmitProjectRequest::new("alice", "alpha"))
        .await;

    ensure!(
        result
            .as_ref()
            .is_err_and(|err| err.kind() == AdmissionErrorKind::GitConnectionNotFound),
        "expected missing connection, got {result:?}"
    );
    ensure!(world.stored_hash("alpha").await?.is_none());
    ensure!(world.publisher.published()?.is_empty());
    Ok(())
}
