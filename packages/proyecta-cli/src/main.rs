use anyhow::Context;
use clap::{Parser, Subcommand};
use proyecta_sdk::ProyectaClient;

mod auth_commands;
mod dashboard_commands;
mod user_commands;

#[derive(Parser, Debug)]
#[command(name = "proyecta-cli")]
#[command(about = "Proyecta CLI client")]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Session token printed by `auth login`
    #[arg(long, env = "PROYECTA_SESSION", hide_env_values = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Server health check
    Health,
    /// Session management
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
    /// Role dashboards
    Dashboard {
        #[command(subcommand)]
        action: dashboard_commands::DashboardAction,
    },
    /// User administration (administrators)
    Users {
        #[command(subcommand)]
        action: user_commands::UserAction,
    },
    /// Change the current user's password
    Password {
        /// New password
        new_password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut client = ProyectaClient::new(&cli.server)
        .with_context(|| format!("invalid server URL: {}", cli.server))?;
    if let Some(token) = cli.session.as_deref() {
        client = client.with_session(token);
    }

    match cli.command {
        Commands::Health => match client.health().await {
            Ok(health) if health.status == "ok" => {
                println!("✅ Server is healthy and responsive");
            }
            Ok(health) => {
                eprintln!("❌ Server reported status: {}", health.status);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("❌ Server health check failed: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Auth { action } => {
            auth_commands::handle_auth_command(client, action).await?;
        }
        Commands::Dashboard { action } => {
            dashboard_commands::handle_dashboard_command(&client, action).await?;
        }
        Commands::Users { action } => {
            user_commands::handle_user_command(&client, action).await?;
        }
        Commands::Password { new_password } => {
            let response = client
                .change_password(&new_password)
                .await
                .context("failed to change password")?;
            println!("✅ {}", response.message);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_commands::AuthAction;
    use crate::dashboard_commands::DashboardAction;
    use crate::user_commands::UserAction;

    #[test]
    fn test_cli_default_server() {
        let cli = Cli::try_parse_from(["proyecta-cli", "health"]).unwrap();
        assert_eq!(cli.server, "http://127.0.0.1:3000");
        assert!(matches!(cli.command, Commands::Health));
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "proyecta-cli",
            "--server",
            "http://localhost:8080",
            "--session",
            "tok",
            "dashboard",
            "manager",
        ])
        .unwrap();

        assert_eq!(cli.server, "http://localhost:8080");
        assert_eq!(cli.session.as_deref(), Some("tok"));
        match cli.command {
            Commands::Dashboard { action } => assert_eq!(action, DashboardAction::Manager),
            _ => panic!("Expected Dashboard command"),
        }
    }

    #[test]
    fn test_login_command_parsing() {
        let cli =
            Cli::try_parse_from(["proyecta-cli", "auth", "login", "ana@x.org", "s3cret!"]).unwrap();
        match cli.command {
            Commands::Auth {
                action: AuthAction::Login { email, password },
            } => {
                assert_eq!(email, "ana@x.org");
                assert_eq!(password, "s3cret!");
            }
            _ => panic!("Expected Auth Login command"),
        }
    }

    #[test]
    fn test_user_create_defaults_to_active() {
        let cli = Cli::try_parse_from([
            "proyecta-cli",
            "users",
            "create",
            "--name",
            "María Gómez",
            "--national-id",
            "0102",
            "--email",
            "maria@x.org",
            "--password",
            "clave123",
            "--role",
            "Colaborador",
        ])
        .unwrap();
        match cli.command {
            Commands::Users {
                action: UserAction::Create { status, name, .. },
            } => {
                assert_eq!(status, "Activo");
                assert_eq!(name, "María Gómez");
            }
            _ => panic!("Expected Users Create command"),
        }
    }

    #[test]
    fn test_all_commands_exist() {
        let commands = vec![
            vec!["proyecta-cli", "health"],
            vec!["proyecta-cli", "auth", "me"],
            vec!["proyecta-cli", "auth", "logout"],
            vec![
                "proyecta-cli", "auth", "register", "--name", "A", "--national-id", "1",
                "--email", "a@x.org", "--password", "p",
            ],
            vec!["proyecta-cli", "dashboard", "admin"],
            vec!["proyecta-cli", "dashboard", "collaborator"],
            vec!["proyecta-cli", "dashboard", "consultant"],
            vec!["proyecta-cli", "users", "delete", "some-id"],
            vec![
                "proyecta-cli", "users", "update", "some-id", "--name", "A", "--national-id",
                "1", "--email", "a@x.org", "--role", "Consultor", "--status", "Inactivo",
            ],
            vec!["proyecta-cli", "password", "nueva123"],
        ];

        for args in commands {
            let result = Cli::try_parse_from(args.clone());
            assert!(result.is_ok(), "Failed to parse: {:?}", args);
        }
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["proyecta-cli"]).is_err());
        assert!(Cli::try_parse_from(["proyecta-cli", "dashboard"]).is_err());
    }
}
