use crate::db::entities::users::{self, Model as UserModel, UserStatus};
use crate::db::entities::{
    audit_events, beneficiaries, campaigns, document_signatures, document_versions, documents,
    files, financial_transactions, notifications, project_members, projects, task_assignees, tasks,
    user_roles, user_sessions,
};
use crate::db::user_ops::{self, NewUser};
use crate::error::{AppError, AppJson, AppQuery};
use crate::services::auth::gate::{ADMIN_ROLES, Session, require_any};
use crate::services::auth::user::{normalize_email, required};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use proyecta_core::{
    ChangePasswordRequest, CreateUserRequest, CreatedUserResponse, MIN_PASSWORD_LEN,
    MessageResponse, UpdateUserRequest, roles,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MSG_ALL_FIELDS: &str = "Todos los campos son requeridos.";
const MSG_TAKEN: &str = "El correo o la cédula ya existen.";
const MSG_BAD_USER_ID: &str = "El identificador de usuario no es válido.";
const MSG_USER_NOT_FOUND: &str = "Usuario no encontrado.";

fn parse_status(value: &str) -> Result<UserStatus, AppError> {
    UserStatus::parse(value).ok_or_else(|| {
        AppError::validation(format!("El estado \"{}\" no es válido.", value.trim()))
    })
}

fn parse_user_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim()).map_err(|_| AppError::validation(MSG_BAD_USER_ID))
}

async fn resolve_role<C: ConnectionTrait>(db: &C, name: &str) -> Result<i32, AppError> {
    user_ops::find_role_by_name(db, name)
        .await?
        .map(|role| role.id)
        .ok_or_else(|| AppError::validation(format!("El rol \"{}\" no es válido.", name.trim())))
}

/// Inserts the user, its single role assignment and the audit row atomically.
pub(crate) async fn insert_user_with_role(
    db: &DatabaseConnection,
    actor: Uuid,
    new_user: NewUser,
    role_id: i32,
) -> Result<UserModel, AppError> {
    let txn = db.begin().await?;

    let user = user_ops::insert_user(&txn, new_user).await?;
    user_ops::assign_role(&txn, user.id, role_id).await?;
    user_ops::record_audit(
        &txn,
        actor,
        "create_user",
        &user.id.to_string(),
        Some(format!("role_id={role_id}")),
    )
    .await?;

    txn.commit().await?;
    Ok(user)
}

pub(crate) async fn create_user(
    state: &AppState,
    actor: Uuid,
    request: &CreateUserRequest,
) -> Result<CreatedUserResponse, AppError> {
    let (
        Some(full_name),
        Some(national_id),
        Some(email),
        Some(password),
        Some(role),
        Some(status),
    ) = (
        required(request.nombre_completo.as_deref()),
        required(request.cedula.as_deref()),
        required(request.correo.as_deref()),
        request.contrasena.as_deref().filter(|p| !p.is_empty()),
        required(request.rol.as_deref()),
        required(request.estado.as_deref()),
    ) else {
        return Err(AppError::validation(MSG_ALL_FIELDS));
    };
    let email = normalize_email(email);
    let status = parse_status(status)?;
    let role_id = resolve_role(&state.db, role).await?;

    if user_ops::find_user_by_email(&state.db, &email).await?.is_some()
        || user_ops::find_user_by_national_id(&state.db, national_id)
            .await?
            .is_some()
    {
        return Err(AppError::Conflict(MSG_TAKEN.to_string()));
    }

    let password_hash = state.passwords.hash(password).await?;
    let user = insert_user_with_role(
        &state.db,
        actor,
        NewUser {
            full_name: full_name.to_string(),
            national_id: national_id.to_string(),
            email,
            password_hash,
            status,
        },
        role_id,
    )
    .await?;

    info!(actor = %actor, user_id = %user.id, "user created by administrator");

    Ok(CreatedUserResponse {
        message: format!("Usuario {} creado correctamente.", user.full_name),
        user_id: user.id,
    })
}

pub(crate) async fn update_user(
    state: &AppState,
    actor: Uuid,
    request: &UpdateUserRequest,
) -> Result<MessageResponse, AppError> {
    let (
        Some(user_id),
        Some(full_name),
        Some(national_id),
        Some(email),
        Some(role),
        Some(status),
    ) = (
        required(request.id_usuario.as_deref()),
        required(request.nombre_completo.as_deref()),
        required(request.cedula.as_deref()),
        required(request.correo.as_deref()),
        required(request.rol.as_deref()),
        required(request.estado.as_deref()),
    ) else {
        return Err(AppError::validation(MSG_ALL_FIELDS));
    };
    let user_id = parse_user_id(user_id)?;
    let email = normalize_email(email);
    let status = parse_status(status)?;
    let role_id = resolve_role(&state.db, role).await?;

    let txn = state.db.begin().await?;

    let user = user_ops::find_user_by_id(&txn, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(MSG_USER_NOT_FOUND.to_string()))?;

    let email_owner = user_ops::find_user_by_email(&txn, &email).await?;
    let national_id_owner = user_ops::find_user_by_national_id(&txn, national_id).await?;
    if email_owner.is_some_and(|other| other.id != user_id)
        || national_id_owner.is_some_and(|other| other.id != user_id)
    {
        return Err(AppError::Conflict(MSG_TAKEN.to_string()));
    }

    let mut active: users::ActiveModel = user.into();
    active.full_name = Set(full_name.to_string());
    active.national_id = Set(national_id.to_string());
    active.email = Set(email);
    active.status = Set(status);
    user_ops::update_user(&txn, active).await?;

    user_ops::replace_roles(&txn, user_id, role_id).await?;
    user_ops::record_audit(
        &txn,
        actor,
        "update_user",
        &user_id.to_string(),
        Some(format!("role_id={role_id} status={}", status.as_str())),
    )
    .await?;

    txn.commit().await?;
    info!(actor = %actor, user_id = %user_id, "user updated by administrator");

    Ok(MessageResponse {
        message: "Usuario actualizado correctamente.".to_string(),
    })
}

/// Removes a user and every row that references it, in dependency order.
///
/// Projects created by the user go with their tasks, assignments, memberships
/// and transactions. A reference this sequence does not know about makes the
/// final delete fail, which rolls everything back.
pub(crate) async fn delete_user(
    state: &AppState,
    actor: Uuid,
    user_id: Option<&str>,
) -> Result<MessageResponse, AppError> {
    let user_id =
        required(user_id).ok_or_else(|| AppError::validation("Falta el parámetro userId."))?;
    let user_id = parse_user_id(user_id)?;
    if user_id == actor {
        return Err(AppError::validation("No puedes eliminar tu propia cuenta."));
    }

    let txn = state.db.begin().await?;

    if user_ops::find_user_by_id(&txn, user_id).await?.is_none() {
        return Err(AppError::NotFound(MSG_USER_NOT_FOUND.to_string()));
    }

    delete_dependents(&txn, user_id).await?;
    users::Entity::delete_by_id(user_id).exec(&txn).await?;

    user_ops::record_audit(&txn, actor, "delete_user", &user_id.to_string(), None).await?;

    txn.commit().await?;
    info!(actor = %actor, user_id = %user_id, "user deleted by administrator");

    Ok(MessageResponse {
        message: "Usuario eliminado correctamente.".to_string(),
    })
}

async fn delete_dependents<C: ConnectionTrait>(txn: &C, user_id: Uuid) -> Result<(), AppError> {
    audit_events::Entity::delete_many()
        .filter(audit_events::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    files::Entity::delete_many()
        .filter(files::Column::UploadedBy.eq(user_id))
        .exec(txn)
        .await?;
    beneficiaries::Entity::delete_many()
        .filter(beneficiaries::Column::RegisteredBy.eq(user_id))
        .exec(txn)
        .await?;
    campaigns::Entity::delete_many()
        .filter(campaigns::Column::ResponsibleId.eq(user_id))
        .exec(txn)
        .await?;

    let document_ids: Vec<i32> = documents::Entity::find()
        .select_only()
        .column(documents::Column::Id)
        .filter(documents::Column::CreatorId.eq(user_id))
        .into_tuple()
        .all(txn)
        .await?;
    document_signatures::Entity::delete_many()
        .filter(
            document_signatures::Column::SignerId
                .eq(user_id)
                .or(document_signatures::Column::DocumentId.is_in(document_ids.clone())),
        )
        .exec(txn)
        .await?;
    document_versions::Entity::delete_many()
        .filter(
            document_versions::Column::UserId
                .eq(user_id)
                .or(document_versions::Column::DocumentId.is_in(document_ids)),
        )
        .exec(txn)
        .await?;
    documents::Entity::delete_many()
        .filter(documents::Column::CreatorId.eq(user_id))
        .exec(txn)
        .await?;

    notifications::Entity::delete_many()
        .filter(notifications::Column::RecipientId.eq(user_id))
        .exec(txn)
        .await?;
    project_members::Entity::delete_many()
        .filter(project_members::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    delete_created_projects(txn, user_id).await?;
    user_sessions::Entity::delete_many()
        .filter(user_sessions::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    task_assignees::Entity::delete_many()
        .filter(task_assignees::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    financial_transactions::Entity::delete_many()
        .filter(financial_transactions::Column::RegisteredBy.eq(user_id))
        .exec(txn)
        .await?;
    user_roles::Entity::delete_many()
        .filter(user_roles::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    Ok(())
}

async fn delete_created_projects<C: ConnectionTrait>(
    txn: &C,
    user_id: Uuid,
) -> Result<(), AppError> {
    let project_ids: Vec<i32> = projects::Entity::find()
        .select_only()
        .column(projects::Column::Id)
        .filter(projects::Column::CreatorId.eq(user_id))
        .into_tuple()
        .all(txn)
        .await?;
    if project_ids.is_empty() {
        return Ok(());
    }

    let task_ids: Vec<i32> = tasks::Entity::find()
        .select_only()
        .column(tasks::Column::Id)
        .filter(tasks::Column::ProjectId.is_in(project_ids.clone()))
        .into_tuple()
        .all(txn)
        .await?;
    task_assignees::Entity::delete_many()
        .filter(task_assignees::Column::TaskId.is_in(task_ids))
        .exec(txn)
        .await?;
    tasks::Entity::delete_many()
        .filter(tasks::Column::ProjectId.is_in(project_ids.clone()))
        .exec(txn)
        .await?;
    project_members::Entity::delete_many()
        .filter(project_members::Column::ProjectId.is_in(project_ids.clone()))
        .exec(txn)
        .await?;
    financial_transactions::Entity::delete_many()
        .filter(financial_transactions::Column::ProjectId.is_in(project_ids.clone()))
        .exec(txn)
        .await?;
    projects::Entity::delete_many()
        .filter(projects::Column::Id.is_in(project_ids))
        .exec(txn)
        .await?;

    Ok(())
}

pub(crate) async fn change_password(
    state: &AppState,
    user_id: Uuid,
    request: &ChangePasswordRequest,
) -> Result<MessageResponse, AppError> {
    let new_password = request.new_password.as_deref().unwrap_or_default();
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "La nueva contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres."
        )));
    }

    let password_hash = state.passwords.hash(new_password).await?;

    let txn = state.db.begin().await?;
    let user = user_ops::find_user_by_id(&txn, user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(password_hash);
    user_ops::update_user(&txn, active).await?;
    user_ops::record_audit(&txn, user_id, "change_password", &user_id.to_string(), None).await?;
    txn.commit().await?;

    info!(user_id = %user_id, "password changed");

    Ok(MessageResponse {
        message: "Contraseña actualizada correctamente.".to_string(),
    })
}

/// First administrator for a fresh database. The account audits its own creation.
pub(crate) async fn create_admin(
    state: &AppState,
    full_name: &str,
    national_id: &str,
    email: &str,
    password: &str,
) -> Result<UserModel, AppError> {
    let (Some(full_name), Some(national_id), Some(email)) =
        (required(Some(full_name)), required(Some(national_id)), required(Some(email)))
    else {
        return Err(AppError::validation(MSG_ALL_FIELDS));
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "La contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres."
        )));
    }
    let role_id = resolve_role(&state.db, roles::ADMINISTRATOR).await?;
    let password_hash = state.passwords.hash(password).await?;

    let txn = state.db.begin().await?;
    let user = user_ops::insert_user(
        &txn,
        NewUser {
            full_name: full_name.to_string(),
            national_id: national_id.to_string(),
            email: normalize_email(email),
            password_hash,
            status: UserStatus::Active,
        },
    )
    .await?;
    user_ops::assign_role(&txn, user.id, role_id).await?;
    user_ops::record_audit(&txn, user.id, "create_admin", &user.id.to_string(), None).await?;
    txn.commit().await?;

    info!(user_id = %user.id, "administrator account created");
    Ok(user)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// `POST /api/dashboard`
pub(crate) async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
    AppJson(request): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), AppError> {
    require_any(&claims, ADMIN_ROLES)?;
    let created = create_user(&state, claims.sub, &request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/dashboard`
pub(crate) async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    require_any(&claims, ADMIN_ROLES)?;
    Ok(Json(update_user(&state, claims.sub, &request).await?))
}

/// `DELETE /api/dashboard?userId=`
pub(crate) async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
    AppQuery(params): AppQuery<DeleteParams>,
) -> Result<Json<MessageResponse>, AppError> {
    require_any(&claims, ADMIN_ROLES)?;
    Ok(Json(
        delete_user(&state, claims.sub, params.user_id.as_deref()).await?,
    ))
}

/// `PATCH /api/dashboard`: any signed-in user changes their own password.
pub(crate) async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    Ok(Json(change_password(&state, claims.sub, &request).await?))
}
