//! Fixtures shared by the unit tests: a migrated in-memory database, an
//! application state with a cheap bcrypt cost, and row builders.

use crate::db::entities::transaction_types::TransactionNature;
use crate::db::entities::users::{self, UserStatus};
use crate::db::entities::{
    asset_maintenances, assets, audit_events, beneficiaries, campaigns, document_signatures,
    document_versions, documents, files, financial_transactions, notifications, project_members,
    projects, task_assignees, tasks, user_roles, user_sessions,
};
use crate::db::initialize;
use crate::db::reference::PROJECT_COMPLETED;
use crate::db::user_ops::{self, NewUser};
use crate::services::auth::password::PasswordHasher;
use crate::services::auth::session::SessionCodec;
use crate::services::dashboard::ReferenceNames;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

pub(crate) const TEST_SECRET: &str = "unit-test-secret-unit-test-secret-0123";
pub(crate) const TEST_USER_NAME: &str = "Usuario de prueba";

pub(crate) async fn memory_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    initialize::initial(&db).await.unwrap();
    db
}

pub(crate) async fn state() -> Arc<AppState> {
    Arc::new(AppState {
        db: memory_db().await,
        sessions: SessionCodec::new(TEST_SECRET, false),
        passwords: PasswordHasher::new(4),
    })
}

/// Active user holding `role`, with a real bcrypt hash of `password`.
pub(crate) async fn create_user_with_role(
    state: &AppState,
    email: &str,
    password: &str,
    role: &str,
) -> users::Model {
    let password_hash = state.passwords.hash(password).await.unwrap();
    let user = user_ops::insert_user(
        &state.db,
        NewUser {
            full_name: TEST_USER_NAME.to_string(),
            national_id: format!("ID-{email}"),
            email: email.to_string(),
            password_hash,
            status: UserStatus::Active,
        },
    )
    .await
    .unwrap();
    let role = user_ops::find_role_by_name(&state.db, role).await.unwrap().unwrap();
    user_ops::assign_role(&state.db, user.id, role.id).await.unwrap();
    user
}

/// Active user with no role and an unusable password hash.
pub(crate) async fn insert_plain_user(
    db: &DatabaseConnection,
    email: &str,
    national_id: &str,
) -> users::Model {
    user_ops::insert_user(
        db,
        NewUser {
            full_name: format!("Sin rol {national_id}"),
            national_id: national_id.to_string(),
            email: email.to_string(),
            password_hash: "not-a-bcrypt-hash".to_string(),
            status: UserStatus::Active,
        },
    )
    .await
    .unwrap()
}

pub(crate) async fn set_status(db: &DatabaseConnection, user_id: Uuid, status: UserStatus) {
    let user = users::Entity::find_by_id(user_id).one(db).await.unwrap().unwrap();
    let mut active: users::ActiveModel = user.into();
    active.status = Set(status);
    active.update(db).await.unwrap();
}

/// Inserts business rows keyed by reference names rather than ids.
pub(crate) struct Seed<'a> {
    db: &'a DatabaseConnection,
    refs: ReferenceNames,
}

impl<'a> Seed<'a> {
    pub(crate) async fn new(db: &'a DatabaseConnection) -> Self {
        let refs = ReferenceNames::load(db).await.unwrap();
        Self { db, refs }
    }

    /// `end` is the planned end; completed projects also get it as actual end.
    pub(crate) async fn project(
        &self,
        creator: Uuid,
        name: &str,
        status: &str,
        planned_start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> i32 {
        let project = projects::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            status_id: Set(self.refs.project_status_ids(status)[0]),
            creator_id: Set(creator),
            planned_start: Set(planned_start),
            planned_end: Set(end),
            actual_end: Set(end.filter(|_| status == PROJECT_COMPLETED)),
            created_at: Set(planned_start),
            ..Default::default()
        };
        project.insert(self.db).await.unwrap().id
    }

    pub(crate) async fn task(
        &self,
        project: i32,
        name: &str,
        status: &str,
        priority: &str,
        due_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> i32 {
        let priority_id = self
            .refs
            .task_priorities
            .iter()
            .find(|(_, n)| n.as_str() == priority)
            .map(|(id, _)| *id)
            .unwrap();
        let task = tasks::ActiveModel {
            project_id: Set(project),
            name: Set(name.to_string()),
            status_id: Set(self.refs.task_status_ids(status)[0]),
            priority_id: Set(priority_id),
            due_date: Set(due_date),
            created_at: Set(created_at),
            ..Default::default()
        };
        task.insert(self.db).await.unwrap().id
    }

    pub(crate) async fn assign(&self, task: i32, user: Uuid) {
        task_assignees::Entity::insert(task_assignees::ActiveModel {
            task_id: Set(task),
            user_id: Set(user),
            assigned_at: Set(Utc::now()),
        })
        .exec_without_returning(self.db)
        .await
        .unwrap();
    }

    pub(crate) async fn member(&self, project: i32, user: Uuid) {
        project_members::Entity::insert(project_members::ActiveModel {
            project_id: Set(project),
            user_id: Set(user),
            joined_at: Set(Utc::now()),
        })
        .exec_without_returning(self.db)
        .await
        .unwrap();
    }

    async fn insert_transaction(
        &self,
        project: Option<i32>,
        user: Uuid,
        nature: TransactionNature,
        amount: f64,
        occurred_at: DateTime<Utc>,
    ) {
        financial_transactions::ActiveModel {
            type_id: Set(self.refs.transaction_type_ids(nature)[0]),
            project_id: Set(project),
            registered_by: Set(user),
            amount: Set(amount),
            occurred_at: Set(occurred_at),
            description: Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .unwrap();
    }

    pub(crate) async fn transaction(
        &self,
        user: Uuid,
        nature: TransactionNature,
        amount: f64,
        occurred_at: DateTime<Utc>,
    ) {
        self.insert_transaction(None, user, nature, amount, occurred_at)
            .await;
    }

    pub(crate) async fn project_transaction(
        &self,
        project: i32,
        user: Uuid,
        nature: TransactionNature,
        amount: f64,
    ) {
        self.insert_transaction(Some(project), user, nature, amount, Utc::now())
            .await;
    }

    pub(crate) async fn session(&self, user: Uuid, success: bool, at: DateTime<Utc>) {
        user_sessions::ActiveModel {
            user_id: Set(user),
            started_at: Set(at),
            login_success: Set(success),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .unwrap();
    }

    pub(crate) async fn asset(&self, name: &str) -> i32 {
        assets::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .unwrap()
        .id
    }

    pub(crate) async fn maintenance(&self, asset: i32, scheduled_for: DateTime<Utc>) {
        asset_maintenances::ActiveModel {
            asset_id: Set(asset),
            scheduled_for: Set(scheduled_for),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .unwrap();
    }
}

/// Gives `user` at least one row in every table that references users, with
/// `other` attached to the user's project and document.
pub(crate) async fn populate_user_footprint(db: &DatabaseConnection, user: Uuid, other: Uuid) {
    let seed = Seed::new(db).await;
    let now = Utc::now();

    let project = seed
        .project(user, "Proyecto a borrar", PROJECT_COMPLETED, now, Some(now))
        .await;
    let task = seed
        .task(project, "Tarea", crate::db::reference::TASK_PENDING, "Media", None, now)
        .await;
    seed.assign(task, user).await;
    seed.assign(task, other).await;
    seed.member(project, user).await;
    seed.member(project, other).await;
    seed.project_transaction(project, other, TransactionNature::Income, 10.0)
        .await;
    seed.transaction(user, TransactionNature::Expense, 5.0, now).await;

    let other_project = seed
        .project(other, "Proyecto ajeno", PROJECT_COMPLETED, now, Some(now))
        .await;
    seed.member(other_project, user).await;
    let other_task = seed
        .task(other_project, "Ajena", crate::db::reference::TASK_PENDING, "Baja", None, now)
        .await;
    seed.assign(other_task, user).await;

    audit_events::ActiveModel {
        user_id: Set(user),
        action: Set("login".to_string()),
        target: Set(user.to_string()),
        detail: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    files::ActiveModel {
        uploaded_by: Set(user),
        file_name: Set("acta.pdf".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    beneficiaries::ActiveModel {
        registered_by: Set(user),
        full_name: Set("Beneficiario".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    campaigns::ActiveModel {
        responsible_id: Set(user),
        name: Set("Campaña".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    notifications::ActiveModel {
        recipient_id: Set(user),
        message: Set("Hola".to_string()),
        read: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let document = documents::ActiveModel {
        creator_id: Set(user),
        title: Set("Informe".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id;
    for (author, version) in [(user, 1), (other, 2)] {
        document_versions::ActiveModel {
            document_id: Set(document),
            user_id: Set(author),
            version: Set(version),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }
    document_signatures::ActiveModel {
        document_id: Set(document),
        signer_id: Set(other),
        signed_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

/// Rows in any table that still point at `user`.
pub(crate) async fn rows_referencing(db: &DatabaseConnection, user: Uuid) -> u64 {
    let mut total = 0;
    total += audit_events::Entity::find()
        .filter(audit_events::Column::UserId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += files::Entity::find()
        .filter(files::Column::UploadedBy.eq(user))
        .count(db)
        .await
        .unwrap();
    total += beneficiaries::Entity::find()
        .filter(beneficiaries::Column::RegisteredBy.eq(user))
        .count(db)
        .await
        .unwrap();
    total += campaigns::Entity::find()
        .filter(campaigns::Column::ResponsibleId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += documents::Entity::find()
        .filter(documents::Column::CreatorId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += document_versions::Entity::find()
        .filter(document_versions::Column::UserId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += document_signatures::Entity::find()
        .filter(document_signatures::Column::SignerId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += notifications::Entity::find()
        .filter(notifications::Column::RecipientId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += project_members::Entity::find()
        .filter(project_members::Column::UserId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += projects::Entity::find()
        .filter(projects::Column::CreatorId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += user_sessions::Entity::find()
        .filter(user_sessions::Column::UserId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += task_assignees::Entity::find()
        .filter(task_assignees::Column::UserId.eq(user))
        .count(db)
        .await
        .unwrap();
    total += financial_transactions::Entity::find()
        .filter(financial_transactions::Column::RegisteredBy.eq(user))
        .count(db)
        .await
        .unwrap();
    total += user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user))
        .count(db)
        .await
        .unwrap();
    total
}
