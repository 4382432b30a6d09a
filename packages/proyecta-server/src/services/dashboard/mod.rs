//! Read-only aggregations behind the dashboard endpoints.
//!
//! Every request recomputes from the database; nothing is cached. Time windows
//! are evaluated in UTC against the `now` handed in by the caller.

pub(crate) mod admin;
pub(crate) mod collaborator;
pub(crate) mod manager;

use crate::db::entities::transaction_types::TransactionNature;
use crate::db::entities::{
    project_statuses, projects, task_priorities, task_statuses, tasks, transaction_types,
};
use crate::db::reference::{TASK_COMPLETED, UNKNOWN};
use crate::error::AppError;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use proyecta_core::ProjectProgress;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use std::collections::HashMap;

/// Id to name maps for the seeded reference tables.
pub(crate) struct ReferenceNames {
    pub(crate) project_statuses: HashMap<i32, String>,
    pub(crate) task_statuses: HashMap<i32, String>,
    pub(crate) task_priorities: HashMap<i32, String>,
    pub(crate) transaction_natures: HashMap<i32, TransactionNature>,
}

impl ReferenceNames {
    pub(crate) async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, AppError> {
        let project_statuses = project_statuses::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.id, row.name))
            .collect();
        let task_statuses = task_statuses::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.id, row.name))
            .collect();
        let task_priorities = task_priorities::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.id, row.name))
            .collect();
        let transaction_natures = transaction_types::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.id, row.nature))
            .collect();

        Ok(Self {
            project_statuses,
            task_statuses,
            task_priorities,
            transaction_natures,
        })
    }

    pub(crate) fn project_status(&self, id: i32) -> Option<&str> {
        self.project_statuses.get(&id).map(String::as_str)
    }

    pub(crate) fn task_status(&self, id: i32) -> Option<&str> {
        self.task_statuses.get(&id).map(String::as_str)
    }

    pub(crate) fn task_priority(&self, id: i32) -> Option<&str> {
        self.task_priorities.get(&id).map(String::as_str)
    }

    pub(crate) fn project_status_or_unknown(&self, id: i32) -> String {
        self.project_status(id).unwrap_or(UNKNOWN).to_string()
    }

    /// Ids of project statuses with the given name.
    pub(crate) fn project_status_ids(&self, name: &str) -> Vec<i32> {
        ids_named(&self.project_statuses, name)
    }

    pub(crate) fn task_status_ids(&self, name: &str) -> Vec<i32> {
        ids_named(&self.task_statuses, name)
    }

    pub(crate) fn transaction_type_ids(&self, nature: TransactionNature) -> Vec<i32> {
        self.transaction_natures
            .iter()
            .filter(|(_, n)| **n == nature)
            .map(|(id, _)| *id)
            .collect()
    }
}

fn ids_named(map: &HashMap<i32, String>, name: &str) -> Vec<i32> {
    map.iter()
        .filter(|(_, n)| n.as_str() == name)
        .map(|(id, _)| *id)
        .collect()
}

/// `YYYY-MM` bucket for a timestamp.
pub(crate) fn month_key(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

pub(crate) fn year_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// `[start of this month, start of next month)`.
pub(crate) fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (start, end)
}

/// Percentage of completed tasks per project, rounded to two decimals.
pub(crate) async fn projects_with_task_progress<C: ConnectionTrait>(
    db: &C,
    refs: &ReferenceNames,
    projects: &[projects::Model],
) -> Result<Vec<ProjectProgress>, AppError> {
    let project_ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let completed_ids = refs.task_status_ids(TASK_COMPLETED);

    let rows: Vec<(i32, i32)> = tasks::Entity::find()
        .select_only()
        .column(tasks::Column::ProjectId)
        .column(tasks::Column::StatusId)
        .filter(tasks::Column::ProjectId.is_in(project_ids))
        .into_tuple()
        .all(db)
        .await?;

    let mut totals: HashMap<i32, (u64, u64)> = HashMap::new();
    for (project_id, status_id) in rows {
        let entry = totals.entry(project_id).or_default();
        entry.0 += 1;
        if completed_ids.contains(&status_id) {
            entry.1 += 1;
        }
    }

    Ok(projects
        .iter()
        .map(|project| {
            let (total, completed) = totals.get(&project.id).copied().unwrap_or_default();
            ProjectProgress {
                id: project.id,
                name: project.name.clone(),
                status: refs.project_status(project.status_id).map(str::to_string),
                progress: progress_percent(completed, total),
            }
        })
        .collect())
}

pub(crate) fn progress_percent(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = completed as f64 / total as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_roll_over_december() {
        let now = Utc.with_ymd_and_hms(2025, 12, 15, 10, 0, 0).unwrap();
        let (start, end) = month_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(year_start(now), Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn progress_rounds_to_two_decimals() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(1, 3), 33.33);
        assert_eq!(progress_percent(2, 3), 66.67);
        assert_eq!(progress_percent(4, 4), 100.0);
    }

    #[test]
    fn month_key_is_zero_padded() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(month_key(&at), "2024-03");
    }
}
