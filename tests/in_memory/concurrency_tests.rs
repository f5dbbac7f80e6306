//! Racing admissions against the atomic admission write.
//!
//! The gated inspector holds both admissions until each has passed its
//! read-side checks, so only the store's conditional write can separate
//! the winner from the loser.

use super::helpers::gated_world;
use examiner::project::{
    domain::ExaminationStatus,
    services::{AdmissionErrorKind, AdmitProjectRequest},
};
use eyre::{OptionExt, ensure};
use rstest::rstest;

const HASH: &str = "feedface00feedface00feedface00feedface00";

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn same_user_racing_two_projects_admits_exactly_one() -> eyre::Result<()> {
    let world = gated_world(2);
    world.connect("alice")?;
    world
        .seed_project("alpha", "alice", 1, ExaminationStatus::Pending, HASH)
        .await?;
    world
        .seed_project("beta", "alice", 2, ExaminationStatus::Failed, HASH)
        .await?;

    let first = tokio::spawn({
        let service = world.service.clone();
        async move { service.admit(AdmitProjectRequest::new("alice", "alpha")).await }
    });
    let second = tokio::spawn({
        let service = world.service.clone();
        async move { service.admit(AdmitProjectRequest::new("alice", "beta")).await }
    });
    let outcomes = [first.await?, second.await?];

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    ensure!(successes == 1, "expected one winner, got {outcomes:?}");
    let loser = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .ok_or_eyre("one admission should lose")?;
    ensure!(
        loser.kind() == AdmissionErrorKind::UserExaminationLimitReached,
        "unexpected loser outcome: {loser:?}"
    );
    ensure!(world.in_progress_count(&["alpha", "beta"]).await? == 1);
    ensure!(world.publisher.published()?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_the_same_project_admits_exactly_once() -> eyre::Result<()> {
    let world = gated_world(2);
    world.connect("alice")?;
    world
        .seed_project("alpha", "alice", 1, ExaminationStatus::Pending, HASH)
        .await?;

    let handles = [
        tokio::spawn({
            let service = world.service.clone();
            async move { service.admit(AdmitProjectRequest::new("alice", "alpha")).await }
        }),
        tokio::spawn({
            let service = world.service.clone();
            async move { service.admit(AdmitProjectRequest::new("alice", "alpha")).await }
        }),
    ];
    let mut kinds = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(_) => kinds.push(None),
            Err(err) => kinds.push(Some(err.kind())),
        }
    }

    ensure!(
        kinds.iter().filter(|kind| kind.is_none()).count() == 1,
        "expected one winner, got {kinds:?}"
    );
    ensure!(
        kinds.contains(&Some(AdmissionErrorKind::ProjectAlreadyUnderExamination)),
        "expected the loser to see the project in flight, got {kinds:?}"
    );
    ensure!(world.publisher.published()?.len() == 1);
    Ok(())
}
