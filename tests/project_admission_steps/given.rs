//! Given steps for project admission BDD scenarios.

use super::world::{AdmissionWorld, run_async};
use examiner::project::{
    domain::{
        CommitHash, ExaminationStatus, GitConnection, PersistedProjectData, Project, ProjectId,
        RepositoryFullName, RepositoryId, RepositorySnapshot, UserId,
    },
    ports::ProjectStore,
};
use rstest_bdd_macros::given;

#[given(r#"a user "{user}" with a git connection"#)]
fn user_with_git_connection(world: &mut AdmissionWorld, user: String) -> Result<(), eyre::Report> {
    world
        .connections
        .insert(GitConnection::from_parts(&user, "github", "ghp_scenario")?)?;
    Ok(())
}

#[given(r#"a project "{project}" owned by "{owner}" with status "{status}""#)]
fn project_with_status(
    world: &mut AdmissionWorld,
    project: String,
    owner: String,
    status: String,
) -> Result<(), eyre::Report> {
    let examination_status = ExaminationStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let next_repo = u64::try_from(world.repositories.len())? + 1;
    let repo_id = RepositoryId::new(next_repo)?;
    let now = chrono::Utc::now();
    let seeded = Project::from_persisted(PersistedProjectData {
        id: ProjectId::new(project.as_str())?,
        user_id: UserId::new(owner.as_str())?,
        repo_id,
        repo_name: RepositoryFullName::new(format!("{owner}/{project}"))?,
        examination_status,
        commit_hash: None,
        created_at: now,
        updated_at: now,
    });

    run_async(world.store.store(&seeded))?;
    world.repositories.insert(project, repo_id);
    Ok(())
}

#[given(r#"project "{project}" was last examined at commit "{hash}""#)]
fn project_last_examined_at(
    world: &mut AdmissionWorld,
    project: String,
    hash: String,
) -> Result<(), eyre::Report> {
    let project_id = ProjectId::new(project.as_str())?;
    let commit_hash = CommitHash::new(hash.as_str())?;
    run_async(world.store.set_commit_hash(&project_id, &commit_hash))?;
    Ok(())
}

#[given(r#"the repository of "{project}" reports commit "{hash}""#)]
fn repository_reports_commit(
    world: &mut AdmissionWorld,
    project: String,
    hash: String,
) -> Result<(), eyre::Report> {
    let repo_id = world.repository_of(&project)?;
    let stored = run_async(world.store.find_by_id(&ProjectId::new(project.as_str())?))?
        .ok_or_else(|| eyre::eyre!("project {project} was not stored"))?;
    let snapshot = RepositorySnapshot::from_parts(stored.repo_name().as_str(), "main", &hash)?;
    world.inspector.set_snapshot(repo_id, snapshot)?;
    Ok(())
}

#[given(r#"the repository of "{project}" is empty"#)]
fn repository_is_empty(world: &mut AdmissionWorld, project: String) -> Result<(), eyre::Report> {
    let repo_id = world.repository_of(&project)?;
    world.inspector.mark_empty(repo_id)?;
    Ok(())
}

#[given("the event bus rejects publications")]
fn event_bus_rejects(world: &mut AdmissionWorld) -> Result<(), eyre::Report> {
    world.publisher.fail_with("broker unavailable")?;
    Ok(())
}
