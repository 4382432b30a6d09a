use anyhow::{Context, Result};
use clap::Subcommand;
use proyecta_sdk::{CreateUserRequest, ProyectaClient, UpdateUserRequest};

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create a user with a role
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "national-id")]
        national_id: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Role name, e.g. "Colaborador"
        #[arg(long)]
        role: String,
        /// Activo / Inactivo
        #[arg(long, default_value = "Activo")]
        status: String,
    },
    /// Replace a user's profile, role and status
    Update {
        /// User ID
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "national-id")]
        national_id: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        status: String,
    },
    /// Delete a user and everything that references it
    Delete {
        /// User ID
        id: String,
    },
}

pub async fn handle_user_command(client: &ProyectaClient, action: UserAction) -> Result<()> {
    match action {
        UserAction::Create {
            name,
            national_id,
            email,
            password,
            role,
            status,
        } => {
            let request = CreateUserRequest {
                nombre_completo: Some(name),
                cedula: Some(national_id),
                correo: Some(email),
                contrasena: Some(password),
                rol: Some(role),
                estado: Some(status),
            };
            let created = client
                .create_user(&request)
                .await
                .context("failed to create user")?;
            println!("✅ {}", created.message);
            println!("   User ID: {}", created.user_id);
        }
        UserAction::Update {
            id,
            name,
            national_id,
            email,
            role,
            status,
        } => {
            let request = UpdateUserRequest {
                id_usuario: Some(id),
                nombre_completo: Some(name),
                cedula: Some(national_id),
                correo: Some(email),
                rol: Some(role),
                estado: Some(status),
            };
            let response = client
                .update_user(&request)
                .await
                .context("failed to update user")?;
            println!("✅ {}", response.message);
        }
        UserAction::Delete { id } => {
            let response = client
                .delete_user(&id)
                .await
                .context("failed to delete user")?;
            println!("🗑️  {}", response.message);
        }
    }
    Ok(())
}
