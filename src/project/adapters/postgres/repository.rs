//! `PostgreSQL` project store implementation.

use super::{
    models::{NewProjectRow, ProjectRow},
    schema::projects,
};
use crate::project::{
    domain::{
        CommitHash, ExaminationStatus, PersistedProjectData, Project, ProjectId,
        RepositoryFullName, RepositoryId, UserId,
    },
    ports::{ProjectStore, ProjectStoreError, ProjectStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use mockable::{Clock, DefaultClock};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// `PostgreSQL` connection pool type used by project adapters.
pub type ProjectPgPool = Pool<ConnectionManager<PgConnection>>;

/// Partial unique index allowing one in-progress project per user.
const SINGLE_IN_FLIGHT_INDEX: &str = "idx_projects_single_in_flight_per_user";

/// `PostgreSQL`-backed project store.
///
/// Row timestamps written by status and hash updates come from the store's
/// clock.
pub struct PostgresProjectStore<C = DefaultClock> {
    pool: ProjectPgPool,
    clock: Arc<C>,
}

impl PostgresProjectStore {
    /// Creates a new store from a `PostgreSQL` connection pool, stamped by
    /// the system clock.
    #[must_use]
    pub fn new(pool: ProjectPgPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }
}

impl<C> Clone for PostgresProjectStore<C> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> fmt::Debug for PostgresProjectStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresProjectStore")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl<C> PostgresProjectStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new store from a `PostgreSQL` connection pool, stamped by
    /// `clock`.
    #[must_use]
    pub const fn with_clock(pool: ProjectPgPool, clock: Arc<C>) -> Self {
        Self { pool, clock }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProjectStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProjectStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProjectStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProjectStoreError::persistence)?
    }
}

#[async_trait]
impl<C> ProjectStore for PostgresProjectStore<C>
where
    C: Clock + Send + Sync,
{
    async fn store(&self, project: &Project) -> ProjectStoreResult<()> {
        let project_id = project.id().clone();
        let owner = project.user_id().clone();
        let new_row = to_new_row(project)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_single_in_flight_violation(info.as_ref()) =>
                    {
                        ProjectStoreError::UserExaminationInProgress(owner.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProjectStoreError::DuplicateProject(project_id.clone())
                    }
                    _ => ProjectStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &ProjectId) -> ProjectStoreResult<Option<Project>> {
        let lookup_id = id.clone();
        self.run_blocking(move |connection| {
            find_project_row(connection, &lookup_id)?
                .map(row_to_project)
                .transpose()
        })
        .await
    }

    async fn is_user_examination_in_progress(&self, user_id: &UserId) -> ProjectStoreResult<bool> {
        let owner = user_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            diesel::select(diesel::dsl::exists(
                projects::table
                    .filter(projects::user_id.eq(owner))
                    .filter(
                        projects::examination_status.eq(ExaminationStatus::InProgress.as_str()),
                    ),
            ))
            .get_result::<bool>(connection)
            .map_err(ProjectStoreError::persistence)
        })
        .await
    }

    async fn get_last_commit_hash(
        &self,
        id: &ProjectId,
    ) -> ProjectStoreResult<Option<CommitHash>> {
        let lookup_id = id.clone();
        self.run_blocking(move |connection| {
            let stored = projects::table
                .filter(projects::id.eq(lookup_id.as_str()))
                .select(projects::commit_hash)
                .first::<Option<String>>(connection)
                .optional()
                .map_err(ProjectStoreError::persistence)?
                .ok_or_else(|| ProjectStoreError::NotFound(lookup_id.clone()))?;
            stored
                .map(CommitHash::new)
                .transpose()
                .map_err(ProjectStoreError::persistence)
        })
        .await
    }

    async fn set_commit_hash(&self, id: &ProjectId, hash: &CommitHash) -> ProjectStoreResult<()> {
        let target_id = id.clone();
        let hash_value = hash.as_str().to_owned();
        let updated_at = self.clock.utc();
        self.run_blocking(move |connection| {
            let updated = diesel::update(projects::table.find(target_id.as_str()))
                .set((
                    projects::commit_hash.eq(Some(hash_value)),
                    projects::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(ProjectStoreError::persistence)?;
            if updated == 0 {
                return Err(ProjectStoreError::NotFound(target_id));
            }
            Ok(())
        })
        .await
    }

    async fn set_examination_status(
        &self,
        id: &ProjectId,
        status: ExaminationStatus,
    ) -> ProjectStoreResult<Project> {
        let target_id = id.clone();
        let updated_at = self.clock.utc();
        let predecessors: Vec<&'static str> = ExaminationStatus::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(status))
            .map(ExaminationStatus::as_str)
            .collect();
        self.run_blocking(move |connection| {
            let result = diesel::update(
                projects::table
                    .filter(projects::id.eq(target_id.as_str()))
                    .filter(projects::examination_status.eq_any(predecessors)),
            )
            .set((
                projects::examination_status.eq(status.as_str()),
                projects::updated_at.eq(updated_at),
            ))
            .returning(ProjectRow::as_returning())
            .get_result::<ProjectRow>(connection)
            .optional();

            match result {
                Ok(Some(row)) => row_to_project(row),
                Ok(None) => Err(diagnose_rejected_transition(connection, &target_id, status)?),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info))
                    if is_single_in_flight_violation(info.as_ref()) =>
                {
                    Err(owner_conflict(connection, &target_id))
                }
                Err(err) => Err(ProjectStoreError::persistence(err)),
            }
        })
        .await
    }

    async fn begin_examination(
        &self,
        project: &Project,
        expected: ExaminationStatus,
    ) -> ProjectStoreResult<Project> {
        let row = to_new_row(project)?;
        let project_id = project.id().clone();
        let owner = project.user_id().clone();

        self.run_blocking(move |connection| {
            // The NOT EXISTS guard gives a precise conflict for the common
            // case; concurrent writers that both pass it are still serialized
            // by the single-in-flight partial unique index.
            let updated = diesel::sql_query(concat!(
                "UPDATE projects SET examination_status = $1, commit_hash = $2, updated_at = $3 ",
                "WHERE id = $4 AND examination_status = $5 ",
                "AND NOT EXISTS (SELECT 1 FROM projects AS sibling ",
                "WHERE sibling.user_id = projects.user_id AND sibling.id <> projects.id ",
                "AND sibling.examination_status = 'IN_PROGRESS') ",
                "RETURNING id, user_id, repo_id, repo_name, examination_status, commit_hash, ",
                "created_at, updated_at",
            ))
            .bind::<diesel::sql_types::Varchar, _>(row.examination_status.as_str())
            .bind::<diesel::sql_types::Nullable<diesel::sql_types::Varchar>, _>(
                row.commit_hash.as_deref(),
            )
            .bind::<diesel::sql_types::Timestamptz, _>(row.updated_at)
            .bind::<diesel::sql_types::Varchar, _>(row.id.as_str())
            .bind::<diesel::sql_types::Varchar, _>(expected.as_str())
            .get_result::<ProjectRow>(connection)
            .optional()
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                    if is_single_in_flight_violation(info.as_ref()) =>
                {
                    ProjectStoreError::UserExaminationInProgress(owner.clone())
                }
                _ => ProjectStoreError::persistence(err),
            })?;

            match updated {
                Some(updated_row) => row_to_project(updated_row),
                None => {
                    let conflict =
                        diagnose_rejected_admission(connection, &project_id, &owner, expected)?;
                    debug!(project_id = %project_id, error = %conflict, "admission write rejected");
                    Err(conflict)
                }
            }
        })
        .await
    }
}

/// Explains why the conditional admission update matched no row.
fn diagnose_rejected_admission(
    connection: &mut PgConnection,
    project_id: &ProjectId,
    owner: &UserId,
    expected: ExaminationStatus,
) -> ProjectStoreResult<ProjectStoreError> {
    let Some(current) = find_project_row(connection, project_id)? else {
        return Ok(ProjectStoreError::NotFound(project_id.clone()));
    };
    let actual = ExaminationStatus::try_from(current.examination_status.as_str())
        .map_err(ProjectStoreError::persistence)?;
    if actual != expected {
        return Ok(ProjectStoreError::StatusConflict {
            project_id: project_id.clone(),
            expected,
            actual,
        });
    }
    Ok(ProjectStoreError::UserExaminationInProgress(owner.clone()))
}

/// Explains why the guarded status update matched no row.
fn diagnose_rejected_transition(
    connection: &mut PgConnection,
    project_id: &ProjectId,
    target: ExaminationStatus,
) -> ProjectStoreResult<ProjectStoreError> {
    let Some(current) = find_project_row(connection, project_id)? else {
        return Ok(ProjectStoreError::NotFound(project_id.clone()));
    };
    let from = ExaminationStatus::try_from(current.examination_status.as_str())
        .map_err(ProjectStoreError::persistence)?;
    Ok(ProjectStoreError::InvalidTransition {
        project_id: project_id.clone(),
        from,
        to: target,
    })
}

/// Builds the conflict reported when a status write collides with a sibling.
fn owner_conflict(connection: &mut PgConnection, project_id: &ProjectId) -> ProjectStoreError {
    match find_project_row(connection, project_id) {
        Ok(Some(row)) => match UserId::new(row.user_id) {
            Ok(owner) => ProjectStoreError::UserExaminationInProgress(owner),
            Err(parse_err) => ProjectStoreError::persistence(parse_err),
        },
        Ok(None) => ProjectStoreError::NotFound(project_id.clone()),
        Err(lookup_err) => lookup_err,
    }
}

fn find_project_row(
    connection: &mut PgConnection,
    id: &ProjectId,
) -> ProjectStoreResult<Option<ProjectRow>> {
    projects::table
        .filter(projects::id.eq(id.as_str()))
        .select(ProjectRow::as_select())
        .first::<ProjectRow>(connection)
        .optional()
        .map_err(ProjectStoreError::persistence)
}

fn to_new_row(project: &Project) -> ProjectStoreResult<NewProjectRow> {
    let repo_id =
        i64::try_from(project.repo_id().value()).map_err(ProjectStoreError::persistence)?;
    Ok(NewProjectRow {
        id: project.id().as_str().to_owned(),
        user_id: project.user_id().as_str().to_owned(),
        repo_id,
        repo_name: project.repo_name().as_str().to_owned(),
        examination_status: project.examination_status().as_str().to_owned(),
        commit_hash: project.commit_hash().map(|hash| hash.as_str().to_owned()),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    })
}

fn row_to_project(row: ProjectRow) -> ProjectStoreResult<Project> {
    let ProjectRow {
        id,
        user_id,
        repo_id,
        repo_name,
        examination_status,
        commit_hash,
        created_at,
        updated_at,
    } = row;

    let repo_id = u64::try_from(repo_id).map_err(ProjectStoreError::persistence)?;
    let data = PersistedProjectData {
        id: ProjectId::new(id).map_err(ProjectStoreError::persistence)?,
        user_id: UserId::new(user_id).map_err(ProjectStoreError::persistence)?,
        repo_id: RepositoryId::new(repo_id).map_err(ProjectStoreError::persistence)?,
        repo_name: RepositoryFullName::new(repo_name).map_err(ProjectStoreError::persistence)?,
        examination_status: ExaminationStatus::try_from(examination_status.as_str())
            .map_err(ProjectStoreError::persistence)?,
        commit_hash: commit_hash
            .map(CommitHash::new)
            .transpose()
            .map_err(ProjectStoreError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Project::from_persisted(data))
}

fn is_single_in_flight_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == SINGLE_IN_FLIGHT_INDEX)
}
