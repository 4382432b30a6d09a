use super::{ReferenceNames, projects_with_task_progress};
use crate::db::entities::transaction_types::TransactionNature;
use crate::db::entities::{financial_transactions, project_members, projects, tasks};
use crate::db::reference::{PROJECT_COMPLETED, PROJECT_IN_PROGRESS, TASK_PENDING};
use crate::error::AppError;
use crate::services::auth::gate::{
    CONSULTANT_VIEW_ROLES, MANAGER_VIEW_ROLES, Session, require_any,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use proyecta_core::{ConsultantOverview, DataEnvelope, ManagerOverview};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::sync::Arc;
use uuid::Uuid;

/// `GET /api/dashboard/manager`
pub(crate) async fn manager_dashboard(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
) -> Result<Json<DataEnvelope<ManagerOverview>>, AppError> {
    require_any(&claims, MANAGER_VIEW_ROLES)?;
    let data = manager_overview(&state.db, claims.sub, Utc::now()).await?;
    Ok(Json(DataEnvelope { data }))
}

/// `GET /api/dashboard/consultant`
pub(crate) async fn consultant_dashboard(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
) -> Result<Json<DataEnvelope<ConsultantOverview>>, AppError> {
    require_any(&claims, CONSULTANT_VIEW_ROLES)?;
    let data = consultant_overview(&state.db, claims.sub).await?;
    Ok(Json(DataEnvelope { data }))
}

async fn member_project_ids<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<i32>, AppError> {
    Ok(project_members::Entity::find()
        .select_only()
        .column(project_members::Column::ProjectId)
        .filter(project_members::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?)
}

/// Projects the user created or belongs to.
pub(crate) async fn manager_overview<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ManagerOverview, AppError> {
    let refs = ReferenceNames::load(db).await?;
    let member_of = member_project_ids(db, user_id).await?;

    let managed = projects::Entity::find()
        .filter(
            Condition::any()
                .add(projects::Column::CreatorId.eq(user_id))
                .add(projects::Column::Id.is_in(member_of)),
        )
        .order_by_asc(projects::Column::Id)
        .all(db)
        .await?;
    let managed_ids: Vec<i32> = managed.iter().map(|p| p.id).collect();

    let active_managed_projects = managed
        .iter()
        .filter(|p| refs.project_status(p.status_id) == Some(PROJECT_IN_PROGRESS))
        .count() as u64;
    let overdue_managed_projects = managed
        .iter()
        .filter(|p| {
            p.planned_end.is_some_and(|end| end < now)
                && refs.project_status(p.status_id) != Some(PROJECT_COMPLETED)
        })
        .count() as u64;

    let pending_tasks_in_managed_projects = tasks::Entity::find()
        .filter(tasks::Column::ProjectId.is_in(managed_ids.clone()))
        .filter(tasks::Column::StatusId.is_in(refs.task_status_ids(TASK_PENDING)))
        .count(db)
        .await?;

    let consumed: Option<Option<f64>> = financial_transactions::Entity::find()
        .select_only()
        .column_as(financial_transactions::Column::Amount.sum(), "total")
        .filter(financial_transactions::Column::ProjectId.is_in(managed_ids))
        .filter(
            financial_transactions::Column::TypeId
                .is_in(refs.transaction_type_ids(TransactionNature::Expense)),
        )
        .into_tuple()
        .one(db)
        .await?;

    let projects_with_task_progress = projects_with_task_progress(db, &refs, &managed).await?;

    Ok(ManagerOverview {
        total_managed_projects: managed.len() as u64,
        active_managed_projects,
        overdue_managed_projects,
        pending_tasks_in_managed_projects,
        consumed_budget: consumed.flatten().unwrap_or(0.0),
        projects_with_task_progress,
    })
}

/// Projects the user is a member of.
pub(crate) async fn consultant_overview<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<ConsultantOverview, AppError> {
    let refs = ReferenceNames::load(db).await?;
    let member_of = member_project_ids(db, user_id).await?;

    let projects = projects::Entity::find()
        .filter(projects::Column::Id.is_in(member_of))
        .order_by_asc(projects::Column::Id)
        .all(db)
        .await?;
    let active_projects = projects
        .iter()
        .filter(|p| refs.project_status(p.status_id) == Some(PROJECT_IN_PROGRESS))
        .count() as u64;

    Ok(ConsultantOverview {
        total_projects: projects.len() as u64,
        active_projects,
        projects_with_task_progress: projects_with_task_progress(db, &refs, &projects).await?,
    })
}
