use anyhow::{Context, Result};
use clap::Subcommand;
use proyecta_sdk::ProyectaClient;

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Log in and print the session token
    Login {
        /// Email
        email: String,
        /// Password
        password: String,
    },
    /// Register a new account (an administrator must assign a role)
    Register {
        /// Full name
        #[arg(long)]
        name: String,
        /// National id (cédula)
        #[arg(long = "national-id")]
        national_id: String,
        /// Email
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long)]
        password: String,
    },
    /// Show the current session
    Me,
    /// Clear the session cookie on the server
    Logout,
}

pub async fn handle_auth_command(mut client: ProyectaClient, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login { email, password } => {
            println!("🔐 Logging in...");
            let response = client
                .login(&email, &password)
                .await
                .context("login failed")?;
            println!("✅ {} ({})", response.message, response.nombre_completo);
            println!("   Role: {}", response.rol);
            if let Some(token) = client.session() {
                println!();
                println!("export PROYECTA_SESSION={token}");
            }
        }
        AuthAction::Register {
            name,
            national_id,
            email,
            password,
        } => {
            println!("🔐 Registering new user...");
            let created = client
                .register(&name, &national_id, &email, &password)
                .await
                .context("registration failed")?;
            println!("✅ {}", created.message);
            println!("   User ID: {}", created.user_id);
        }
        AuthAction::Me => {
            let me = client.me().await.context("failed to load session")?;
            println!("👤 User ID: {}", me.user_id);
            println!("   Role: {}", me.rol);
            println!("   All roles: {}", me.roles.join(", "));
        }
        AuthAction::Logout => {
            let response = client.logout().await.context("logout failed")?;
            println!("👋 {}", response.message);
        }
    }

    Ok(())
}
