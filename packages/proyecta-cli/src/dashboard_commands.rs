use anyhow::{Context, Result};
use clap::Subcommand;
use proyecta_sdk::ProyectaClient;
use serde::Serialize;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DashboardAction {
    /// Organisation-wide dashboard (administrators)
    Admin,
    /// Tasks assigned to the current user
    Collaborator,
    /// Projects the current user manages
    Manager,
    /// Projects the current user consults on
    Consultant,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn handle_dashboard_command(
    client: &ProyectaClient,
    action: DashboardAction,
) -> Result<()> {
    match action {
        DashboardAction::Admin => {
            let data = client.dashboard().await.context("failed to load dashboard")?;
            println!(
                "📊 {} projects, {} users, balance this month {:.2}",
                data.overview.total_projects,
                data.overview.total_users,
                data.overview.balance_net_month
            );
            print_json(&data)
        }
        DashboardAction::Collaborator => {
            let data = client
                .collaborator_dashboard()
                .await
                .context("failed to load collaborator dashboard")?;
            println!(
                "📋 {} assigned, {} pending, {} overdue",
                data.total_assigned, data.pending_tasks, data.overdue_tasks
            );
            print_json(&data)
        }
        DashboardAction::Manager => {
            let data = client
                .manager_dashboard()
                .await
                .context("failed to load manager dashboard")?;
            print_json(&data)
        }
        DashboardAction::Consultant => {
            let data = client
                .consultant_dashboard()
                .await
                .context("failed to load consultant dashboard")?;
            print_json(&data)
        }
    }
}
