use super::{ReferenceNames, month_bounds, month_key, year_start};
use crate::db::entities::transaction_types::TransactionNature;
use crate::db::entities::users::UserStatus;
use crate::db::entities::{
    asset_maintenances, assets, financial_transactions, projects, tasks, user_roles, user_sessions,
    users,
};
use crate::db::reference::{PROJECT_COMPLETED, PROJECT_IN_PROGRESS, UNKNOWN};
use crate::db::user_ops;
use crate::error::AppError;
use crate::services::auth::gate::{ADMIN_ROLES, Session, require_any};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Duration, Utc};
use proyecta_core::{
    AdminDashboard, DataEnvelope, MonthlyCount, MonthlyFinancial, NamedCount, Overview,
    PriorityStatusRow, ProjectSummary, UserSummary,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

const NO_ROLE: &str = "Sin rol";

/// `GET /api/dashboard`
pub(crate) async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
) -> Result<Json<DataEnvelope<AdminDashboard>>, AppError> {
    require_any(&claims, ADMIN_ROLES)?;
    let data = build(&state.db, Utc::now()).await?;
    Ok(Json(DataEnvelope { data }))
}

pub(crate) async fn build<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<AdminDashboard, AppError> {
    let refs = ReferenceNames::load(db).await?;

    Ok(AdminDashboard {
        overview: overview(db, &refs, now).await?,
        project_status: project_status(db, &refs).await?,
        financial_trend: financial_trend(db, &refs, now).await?,
        users_by_role: users_by_role(db).await?,
        tasks_by_priority_and_status: tasks_by_priority_and_status(db, &refs).await?,
        all_users: all_users(db).await?,
        all_projects: all_projects(db, &refs).await?,
        project_creation_trend: project_creation_trend(db, now).await?,
        user_registration_trend: user_registration_trend(db, now).await?,
    })
}

pub(crate) async fn overview<C: ConnectionTrait>(
    db: &C,
    refs: &ReferenceNames,
    now: DateTime<Utc>,
) -> Result<Overview, AppError> {
    let total_projects = projects::Entity::find().count(db).await?;
    let active_projects = projects::Entity::find()
        .filter(projects::Column::StatusId.is_in(refs.project_status_ids(PROJECT_IN_PROGRESS)))
        .count(db)
        .await?;
    let completed_projects_last_year = projects::Entity::find()
        .filter(projects::Column::StatusId.is_in(refs.project_status_ids(PROJECT_COMPLETED)))
        .filter(projects::Column::ActualEnd.gte(now - Duration::days(365)))
        .count(db)
        .await?;

    let total_users = users::Entity::find().count(db).await?;
    let active_users = users::Entity::find()
        .filter(users::Column::Status.eq(UserStatus::Active))
        .count(db)
        .await?;
    let active_sessions_last24h = user_sessions::Entity::find()
        .filter(user_sessions::Column::LoginSuccess.eq(true))
        .filter(user_sessions::Column::StartedAt.gte(now - Duration::hours(24)))
        .count(db)
        .await?;

    let (month_start, month_end) = month_bounds(now);
    let total_income_month = sum_amount(
        db,
        refs.transaction_type_ids(TransactionNature::Income),
        month_start,
        month_end,
    )
    .await?;
    let total_expense_month = sum_amount(
        db,
        refs.transaction_type_ids(TransactionNature::Expense),
        month_start,
        month_end,
    )
    .await?;

    let total_assets = assets::Entity::find().count(db).await?;
    let pending_maintenances = asset_maintenances::Entity::find()
        .filter(asset_maintenances::Column::ScheduledFor.gte(now))
        .count(db)
        .await?;

    Ok(Overview {
        total_projects,
        active_projects,
        completed_projects_last_year,
        total_users,
        active_users,
        active_sessions_last24h,
        total_income_month,
        total_expense_month,
        balance_net_month: total_income_month - total_expense_month,
        total_assets,
        pending_maintenances,
    })
}

async fn sum_amount<C: ConnectionTrait>(
    db: &C,
    type_ids: Vec<i32>,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<f64, AppError> {
    let total: Option<Option<f64>> = financial_transactions::Entity::find()
        .select_only()
        .column_as(financial_transactions::Column::Amount.sum(), "total")
        .filter(financial_transactions::Column::TypeId.is_in(type_ids))
        .filter(financial_transactions::Column::OccurredAt.gte(from))
        .filter(financial_transactions::Column::OccurredAt.lt(until))
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

/// Projects per status, largest group first.
pub(crate) async fn project_status<C: ConnectionTrait>(
    db: &C,
    refs: &ReferenceNames,
) -> Result<Vec<NamedCount>, AppError> {
    let rows: Vec<(i32, i64)> = projects::Entity::find()
        .select_only()
        .column(projects::Column::StatusId)
        .column_as(projects::Column::Id.count(), "count")
        .group_by(projects::Column::StatusId)
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for (status_id, count) in rows {
        *counts.entry(refs.project_status_or_unknown(status_id)).or_default() += count;
    }
    Ok(sorted_desc(counts))
}

fn sorted_desc(counts: BTreeMap<String, i64>) -> Vec<NamedCount> {
    let mut out: Vec<NamedCount> = counts
        .into_iter()
        .map(|(name, value)| NamedCount { name, value })
        .collect();
    out.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Income and expense per month of the current year.
pub(crate) async fn financial_trend<C: ConnectionTrait>(
    db: &C,
    refs: &ReferenceNames,
    now: DateTime<Utc>,
) -> Result<Vec<MonthlyFinancial>, AppError> {
    let rows: Vec<(i32, f64, DateTime<Utc>)> = financial_transactions::Entity::find()
        .select_only()
        .column(financial_transactions::Column::TypeId)
        .column(financial_transactions::Column::Amount)
        .column(financial_transactions::Column::OccurredAt)
        .filter(financial_transactions::Column::OccurredAt.gte(year_start(now)))
        .into_tuple()
        .all(db)
        .await?;

    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for (type_id, amount, occurred_at) in rows {
        let entry = months.entry(month_key(&occurred_at)).or_default();
        match refs.transaction_natures.get(&type_id) {
            Some(TransactionNature::Income) => entry.0 += amount,
            Some(TransactionNature::Expense) => entry.1 += amount,
            None => {}
        }
    }

    Ok(months
        .into_iter()
        .map(|(month, (ingresos, gastos))| MonthlyFinancial {
            month,
            ingresos,
            gastos,
        })
        .collect())
}

pub(crate) async fn users_by_role<C: ConnectionTrait>(db: &C) -> Result<Vec<NamedCount>, AppError> {
    let names = user_ops::role_names_by_id(db).await?;
    let rows: Vec<(i32, i64)> = user_roles::Entity::find()
        .select_only()
        .column(user_roles::Column::RoleId)
        .column_as(user_roles::Column::UserId.count(), "count")
        .group_by(user_roles::Column::RoleId)
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for (role_id, count) in rows {
        let name = names.get(&role_id).cloned().unwrap_or_else(|| UNKNOWN.to_string());
        *counts.entry(name).or_default() += count;
    }
    Ok(sorted_desc(counts))
}

/// One row per priority (in priority id order) with a count per task status.
pub(crate) async fn tasks_by_priority_and_status<C: ConnectionTrait>(
    db: &C,
    refs: &ReferenceNames,
) -> Result<Vec<PriorityStatusRow>, AppError> {
    let rows: Vec<(i32, i32, i64)> = tasks::Entity::find()
        .select_only()
        .column(tasks::Column::PriorityId)
        .column(tasks::Column::StatusId)
        .column_as(tasks::Column::Id.count(), "count")
        .group_by(tasks::Column::PriorityId)
        .group_by(tasks::Column::StatusId)
        .order_by_asc(tasks::Column::PriorityId)
        .into_tuple()
        .all(db)
        .await?;

    let mut by_priority: BTreeMap<i32, PriorityStatusRow> = BTreeMap::new();
    for (priority_id, status_id, count) in rows {
        let row = by_priority
            .entry(priority_id)
            .or_insert_with(|| PriorityStatusRow {
                name: refs.task_priority(priority_id).unwrap_or(UNKNOWN).to_string(),
                counts: BTreeMap::new(),
            });
        let status = refs.task_status(status_id).unwrap_or(UNKNOWN).to_string();
        *row.counts.entry(status).or_default() += count;
    }
    Ok(by_priority.into_values().collect())
}

/// Every user with their primary role, sorted by name.
pub(crate) async fn all_users<C: ConnectionTrait>(db: &C) -> Result<Vec<UserSummary>, AppError> {
    let names = user_ops::role_names_by_id(db).await?;
    let assignments = user_roles::Entity::find()
        .order_by_asc(user_roles::Column::AssignedAt)
        .order_by_asc(user_roles::Column::RoleId)
        .all(db)
        .await?;
    let mut primary: HashMap<Uuid, String> = HashMap::new();
    for assignment in assignments {
        if let Some(name) = names.get(&assignment.role_id) {
            primary.entry(assignment.user_id).or_insert_with(|| name.clone());
        }
    }

    let users = users::Entity::find()
        .order_by_asc(users::Column::FullName)
        .all(db)
        .await?;
    Ok(users
        .into_iter()
        .map(|user| UserSummary {
            role: primary
                .remove(&user.id)
                .unwrap_or_else(|| NO_ROLE.to_string()),
            id: user.id,
            name: user.full_name,
            email: user.email,
            cedula: user.national_id,
            status: user.status.as_str().to_string(),
        })
        .collect())
}

/// All projects, most recent planned start first.
pub(crate) async fn all_projects<C: ConnectionTrait>(
    db: &C,
    refs: &ReferenceNames,
) -> Result<Vec<ProjectSummary>, AppError> {
    let creators: HashMap<Uuid, String> = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::FullName)
        .into_tuple::<(Uuid, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let projects = projects::Entity::find()
        .order_by_desc(projects::Column::PlannedStart)
        .all(db)
        .await?;
    Ok(projects
        .into_iter()
        .map(|project| ProjectSummary {
            id: project.id,
            status: refs.project_status_or_unknown(project.status_id),
            manager: creators
                .get(&project.creator_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            name: project.name,
            description: project.description.unwrap_or_default(),
            due_date: project.planned_end,
        })
        .collect())
}

pub(crate) async fn project_creation_trend<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<Vec<MonthlyCount>, AppError> {
    let created: Vec<DateTime<Utc>> = projects::Entity::find()
        .select_only()
        .column(projects::Column::CreatedAt)
        .filter(projects::Column::CreatedAt.gte(year_start(now)))
        .into_tuple()
        .all(db)
        .await?;
    Ok(monthly_counts(created))
}

pub(crate) async fn user_registration_trend<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<Vec<MonthlyCount>, AppError> {
    let created: Vec<DateTime<Utc>> = users::Entity::find()
        .select_only()
        .column(users::Column::CreatedAt)
        .filter(users::Column::CreatedAt.gte(year_start(now)))
        .into_tuple()
        .all(db)
        .await?;
    Ok(monthly_counts(created))
}

fn monthly_counts(timestamps: Vec<DateTime<Utc>>) -> Vec<MonthlyCount> {
    let mut months: BTreeMap<String, i64> = BTreeMap::new();
    for at in timestamps {
        *months.entry(month_key(&at)).or_default() += 1;
    }
    months
        .into_iter()
        .map(|(month, total)| MonthlyCount { month, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::reference::{PROJECT_PLANNED, TASK_COMPLETED, TASK_PENDING};
    use crate::test_support::{self, Seed};
    use chrono::TimeZone;
    use proyecta_core::roles;

    #[tokio::test]
    async fn empty_database_yields_zeroes() {
        let db = test_support::memory_db().await;
        let data = build(&db, Utc::now()).await.unwrap();

        assert_eq!(data.overview, Overview::default());
        assert!(data.project_status.is_empty());
        assert!(data.financial_trend.is_empty());
        assert!(data.all_users.is_empty());
    }

    #[tokio::test]
    async fn overview_counts_reflect_seeded_rows() {
        let state = test_support::state().await;
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let admin = test_support::create_user_with_role(
            &state,
            "root@example.com",
            "raiz1234",
            roles::ADMINISTRATOR,
        )
        .await;
        let pending = test_support::insert_plain_user(&state.db, "pend@example.com", "P-1").await;
        test_support::set_status(&state.db, pending.id, UserStatus::Inactive).await;

        let seed = Seed::new(&state.db).await;
        seed.project(admin.id, "Alfa", PROJECT_IN_PROGRESS, now - Duration::days(30), None).await;
        seed.project(admin.id, "Beta", PROJECT_IN_PROGRESS, now - Duration::days(20), None).await;
        seed.project(
            admin.id,
            "Gamma",
            PROJECT_COMPLETED,
            now - Duration::days(200),
            Some(now - Duration::days(10)),
        )
        .await;
        seed.project(
            admin.id,
            "Delta",
            PROJECT_COMPLETED,
            now - Duration::days(900),
            Some(now - Duration::days(500)),
        )
        .await;
        seed.transaction(
            admin.id,
            TransactionNature::Income,
            1000.0,
            now - Duration::days(2),
        )
        .await;
        seed.transaction(
            admin.id,
            TransactionNature::Expense,
            250.5,
            now - Duration::days(1),
        )
        .await;
        seed.transaction(
            admin.id,
            TransactionNature::Expense,
            99.0,
            now - Duration::days(60),
        )
        .await;
        seed.session(admin.id, true, now - Duration::hours(3)).await;
        seed.session(admin.id, false, now - Duration::hours(2)).await;
        seed.session(admin.id, true, now - Duration::hours(30)).await;
        let asset = seed.asset("Camioneta").await;
        seed.maintenance(asset, now + Duration::days(5)).await;
        seed.maintenance(asset, now - Duration::days(5)).await;

        let refs = ReferenceNames::load(&state.db).await.unwrap();
        let overview = overview(&state.db, &refs, now).await.unwrap();

        assert_eq!(overview.total_projects, 4);
        assert_eq!(overview.active_projects, 2);
        assert_eq!(overview.completed_projects_last_year, 1);
        assert_eq!(overview.total_users, 2);
        assert_eq!(overview.active_users, 1);
        assert_eq!(overview.active_sessions_last24h, 1);
        assert_eq!(overview.total_income_month, 1000.0);
        assert_eq!(overview.total_expense_month, 250.5);
        assert_eq!(overview.balance_net_month, 749.5);
        assert_eq!(overview.total_assets, 1);
        assert_eq!(overview.pending_maintenances, 1);

        let statuses = project_status(&state.db, &refs).await.unwrap();
        assert_eq!(statuses[0].value, 2);
        assert_eq!(statuses.iter().map(|s| s.value).sum::<i64>(), 4);

        let trend = financial_trend(&state.db, &refs, now).await.unwrap();
        let june = trend.iter().find(|m| m.month == "2025-06").unwrap();
        assert_eq!(june.ingresos, 1000.0);
        assert_eq!(june.gastos, 250.5);
        assert!(trend.iter().any(|m| m.month == "2025-04" && m.gastos == 99.0));
        assert!(trend.windows(2).all(|w| w[0].month < w[1].month));
    }

    #[tokio::test]
    async fn users_list_shows_primary_role_or_placeholder() {
        let state = test_support::state().await;
        test_support::create_user_with_role(
            &state,
            "b@example.com",
            "clave123",
            roles::CONSULTANT,
        )
        .await;
        test_support::insert_plain_user(&state.db, "a@example.com", "A-1").await;

        let users = all_users(&state.db).await.unwrap();
        let roles_by_email: HashMap<_, _> = users
            .iter()
            .map(|u| (u.email.as_str(), u.role.as_str()))
            .collect();
        assert_eq!(roles_by_email["b@example.com"], roles::CONSULTANT);
        assert_eq!(roles_by_email["a@example.com"], NO_ROLE);
        assert!(users.windows(2).all(|w| w[0].name <= w[1].name));

        let by_role = users_by_role(&state.db).await.unwrap();
        assert_eq!(by_role, vec![NamedCount { name: roles::CONSULTANT.to_string(), value: 1 }]);
    }

    #[tokio::test]
    async fn task_matrix_groups_by_priority_then_status() {
        let state = test_support::state().await;
        let admin = test_support::create_user_with_role(
            &state,
            "root@example.com",
            "raiz1234",
            roles::ADMINISTRATOR,
        )
        .await;
        let seed = Seed::new(&state.db).await;
        let now = Utc::now();
        let project = seed.project(admin.id, "Alfa", PROJECT_PLANNED, now, None).await;
        seed.task(project, "t1", TASK_PENDING, "Alta", None, now).await;
        seed.task(project, "t2", TASK_PENDING, "Alta", None, now).await;
        seed.task(project, "t3", TASK_COMPLETED, "Alta", None, now).await;
        seed.task(project, "t4", TASK_COMPLETED, "Baja", None, now).await;

        let refs = ReferenceNames::load(&state.db).await.unwrap();
        let matrix = tasks_by_priority_and_status(&state.db, &refs).await.unwrap();

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].name, "Baja");
        assert_eq!(matrix[0].counts[TASK_COMPLETED], 1);
        assert_eq!(matrix[1].name, "Alta");
        assert_eq!(matrix[1].counts[TASK_PENDING], 2);
        assert_eq!(matrix[1].counts[TASK_COMPLETED], 1);

        let projects = all_projects(&state.db, &refs).await.unwrap();
        assert_eq!(projects[0].manager, "Usuario de prueba");
        assert_eq!(projects[0].status, PROJECT_PLANNED);
    }
}
