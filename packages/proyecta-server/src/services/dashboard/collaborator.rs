use super::ReferenceNames;
use crate::db::entities::{projects, task_assignees, tasks};
use crate::db::reference::{TASK_COMPLETED, TASK_PENDING};
use crate::error::AppError;
use crate::services::auth::gate::{COLLABORATOR_VIEW_ROLES, Session, require_any};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use proyecta_core::{AssignedTask, CollaboratorOverview, DataEnvelope};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// `GET /api/dashboard/collaborator`
pub(crate) async fn collaborator_dashboard(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
) -> Result<Json<DataEnvelope<CollaboratorOverview>>, AppError> {
    require_any(&claims, COLLABORATOR_VIEW_ROLES)?;
    let data = overview(&state.db, claims.sub, Utc::now()).await?;
    Ok(Json(DataEnvelope { data }))
}

/// Task rollup for the tasks assigned to `user_id`.
pub(crate) async fn overview<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CollaboratorOverview, AppError> {
    let refs = ReferenceNames::load(db).await?;

    let task_ids: Vec<i32> = task_assignees::Entity::find()
        .select_only()
        .column(task_assignees::Column::TaskId)
        .filter(task_assignees::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    let assigned = tasks::Entity::find()
        .filter(tasks::Column::Id.is_in(task_ids))
        .order_by_asc(tasks::Column::Id)
        .all(db)
        .await?;

    let project_ids: Vec<i32> = assigned.iter().map(|task| task.project_id).collect();
    let project_names: HashMap<i32, String> = projects::Entity::find()
        .select_only()
        .column(projects::Column::Id)
        .column(projects::Column::Name)
        .filter(projects::Column::Id.is_in(project_ids))
        .into_tuple::<(i32, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let today = now.date_naive();
    let mut pending_tasks = 0;
    let mut completed_today = 0;
    let mut overdue_tasks = 0;
    for task in &assigned {
        let status = refs.task_status(task.status_id);
        let completed = status == Some(TASK_COMPLETED);
        if status == Some(TASK_PENDING) {
            pending_tasks += 1;
        }
        if completed && task.created_at.date_naive() == today {
            completed_today += 1;
        }
        if !completed && task.due_date.is_some_and(|due| due < now) {
            overdue_tasks += 1;
        }
    }

    let tasks = assigned
        .iter()
        .map(|task| AssignedTask {
            id: task.id,
            name: task.name.clone(),
            project: project_names.get(&task.project_id).cloned(),
            status: refs.task_status(task.status_id).map(str::to_string),
            due_date: task.due_date,
            priority: refs.task_priority(task.priority_id).map(str::to_string),
        })
        .collect();

    Ok(CollaboratorOverview {
        total_assigned: assigned.len() as u64,
        pending_tasks,
        completed_today,
        overdue_tasks,
        tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::reference::{PROJECT_IN_PROGRESS, TASK_IN_PROGRESS};
    use crate::test_support::{self, Seed};
    use chrono::Duration;
    use proyecta_core::roles;

    #[tokio::test]
    async fn rollup_counts_only_the_callers_tasks() {
        let state = test_support::state().await;
        let worker = test_support::create_user_with_role(
            &state,
            "col@example.com",
            "clave123",
            roles::COLLABORATOR,
        )
        .await;
        let other = test_support::create_user_with_role(
            &state,
            "otro@example.com",
            "clave123",
            roles::COLLABORATOR,
        )
        .await;
        let seed = Seed::new(&state.db).await;
        let now = Utc::now();

        let project = seed.project(worker.id, "Huerta", PROJECT_IN_PROGRESS, now, None).await;
        let late = seed.task(
            project,
            "Regar",
            TASK_PENDING,
            "Alta",
            Some(now - Duration::days(1)),
            now - Duration::days(3),
        )
        .await;
        let done = seed.task(
            project,
            "Sembrar",
            TASK_COMPLETED,
            "Media",
            Some(now - Duration::days(1)),
            now,
        )
        .await;
        let doing = seed.task(
            project,
            "Cosechar",
            TASK_IN_PROGRESS,
            "Baja",
            Some(now + Duration::days(4)),
            now,
        )
        .await;
        let foreign = seed.task(project, "Vender", TASK_PENDING, "Baja", None, now).await;
        for task in [late, done, doing] {
            seed.assign(task, worker.id).await;
        }
        seed.assign(foreign, other.id).await;

        let data = overview(&state.db, worker.id, now).await.unwrap();
        assert_eq!(data.total_assigned, 3);
        assert_eq!(data.pending_tasks, 1);
        assert_eq!(data.completed_today, 1);
        assert_eq!(data.overdue_tasks, 1);
        assert_eq!(data.tasks.len(), 3);
        assert_eq!(data.tasks[0].project.as_deref(), Some("Huerta"));
        assert_eq!(data.tasks[0].priority.as_deref(), Some("Alta"));
    }

    #[tokio::test]
    async fn user_without_tasks_gets_empty_rollup() {
        let db = test_support::memory_db().await;
        let data = overview(&db, Uuid::new_v4(), Utc::now()).await.unwrap();
        assert_eq!(data.total_assigned, 0);
        assert!(data.tasks.is_empty());
    }
}
