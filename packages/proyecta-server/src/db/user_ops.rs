use crate::db::entities::users::{self, Entity as Users, Model as UserModel, UserStatus};
use crate::db::entities::{audit_events, roles, user_roles, user_sessions};
use crate::error::AppError;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Fields of a user row about to be inserted. The password is already hashed.
pub(crate) struct NewUser {
    pub(crate) full_name: String,
    pub(crate) national_id: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) status: UserStatus,
}

pub(crate) async fn find_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<UserModel>, AppError> {
    Ok(Users::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub(crate) async fn find_user_by_national_id<C: ConnectionTrait>(
    db: &C,
    national_id: &str,
) -> Result<Option<UserModel>, AppError> {
    Ok(Users::find()
        .filter(users::Column::NationalId.eq(national_id))
        .one(db)
        .await?)
}

pub(crate) async fn find_user_by_id<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<UserModel>, AppError> {
    Ok(Users::find_by_id(user_id).one(db).await?)
}

/// Role names held by a user, earliest assignment first (ties by role id).
pub(crate) async fn load_user_roles<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<String>, AppError> {
    let assignments = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id))
        .order_by_asc(user_roles::Column::AssignedAt)
        .order_by_asc(user_roles::Column::RoleId)
        .all(db)
        .await?;
    if assignments.is_empty() {
        return Ok(Vec::new());
    }

    let names = role_names_by_id(db).await?;
    Ok(assignments
        .into_iter()
        .filter_map(|assignment| names.get(&assignment.role_id).cloned())
        .collect())
}

pub(crate) async fn role_names_by_id<C: ConnectionTrait>(
    db: &C,
) -> Result<HashMap<i32, String>, AppError> {
    Ok(roles::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|role| (role.id, role.name))
        .collect())
}

/// Looks a role up by name, ignoring case and surrounding whitespace.
pub(crate) async fn find_role_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<roles::Model>, AppError> {
    let wanted = name.trim();
    Ok(roles::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .find(|role| role.name.eq_ignore_ascii_case(wanted)))
}

pub(crate) async fn insert_user<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser,
) -> Result<UserModel, AppError> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set(new_user.full_name),
        national_id: Set(new_user.national_id),
        email: Set(new_user.email),
        password_hash: Set(new_user.password_hash),
        status: Set(new_user.status),
        created_at: Set(Utc::now()),
    };

    user.insert(db).await.map_err(unique_violation)
}

/// Writes the changed columns of an existing user.
pub(crate) async fn update_user<C: ConnectionTrait>(
    db: &C,
    user: users::ActiveModel,
) -> Result<UserModel, AppError> {
    user.update(db).await.map_err(unique_violation)
}

/// Maps a unique-index race on insert or update to the matching conflict.
fn unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("national_id") => {
            AppError::DuplicateNationalId
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateEmail,
        _ => AppError::Db(err),
    }
}

pub(crate) async fn assign_role<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    role_id: i32,
) -> Result<(), AppError> {
    let assignment = user_roles::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(role_id),
        assigned_at: Set(Utc::now()),
    };
    user_roles::Entity::insert(assignment)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Drops every role a user holds and assigns `role_id` in their place.
pub(crate) async fn replace_roles<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    role_id: i32,
) -> Result<(), AppError> {
    user_roles::Entity::delete_many()
        .filter(user_roles::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    assign_role(db, user_id, role_id).await
}

pub(crate) async fn record_login_attempt<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    success: bool,
) -> Result<(), AppError> {
    let session = user_sessions::ActiveModel {
        user_id: Set(user_id),
        started_at: Set(Utc::now()),
        login_success: Set(success),
        ..Default::default()
    };
    session.insert(db).await?;
    Ok(())
}

pub(crate) async fn record_audit<C: ConnectionTrait>(
    db: &C,
    actor: Uuid,
    action: &str,
    target: &str,
    detail: Option<String>,
) -> Result<(), AppError> {
    let event = audit_events::ActiveModel {
        user_id: Set(actor),
        action: Set(action.to_string()),
        target: Set(target.to_string()),
        detail: Set(detail),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    event.insert(db).await?;
    Ok(())
}
