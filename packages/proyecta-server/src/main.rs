mod app;
mod bootstrap;
mod db;
mod error;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use crate::bootstrap::config::AppConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "proyecta-server", version, about = "Proyecta project management server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an active administrator account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long = "national-id")]
        national_id: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bootstrap::server::serve(config).await,
        Command::CreateAdmin {
            email,
            name,
            national_id,
            password,
        } => {
            let db = bootstrap::server::connect(&config).await?;
            let state = bootstrap::server::build_state(&config, db);
            let user =
                services::users::create_admin(&state, &name, &national_id, &email, &password)
                    .await
                    .context("failed to create administrator")?;
            info!(user_id = %user.id, email = %user.email, "administrator ready");
            state.db.clone().close().await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["proyecta-server"]).unwrap();
        assert_eq!(cli.command, None);
        let cli = Cli::try_parse_from(["proyecta-server", "serve"]).unwrap();
        assert_eq!(cli.command, Some(Command::Serve));
    }

    #[test]
    fn create_admin_requires_every_field() {
        let cli = Cli::try_parse_from([
            "proyecta-server",
            "create-admin",
            "--email",
            "root@example.com",
            "--name",
            "Raíz",
            "--national-id",
            "R-1",
            "--password",
            "raiz1234",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::CreateAdmin { ref national_id, .. }) if national_id == "R-1"
        ));

        let missing = Cli::try_parse_from(["proyecta-server", "create-admin", "--email", "a@b.c"]);
        assert!(missing.is_err());
    }
}
