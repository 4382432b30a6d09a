pub mod asset_maintenances;
pub mod assets;
pub mod audit_events;
pub mod beneficiaries;
pub mod campaigns;
pub mod document_signatures;
pub mod document_versions;
pub mod documents;
pub mod files;
pub mod financial_transactions;
pub mod notifications;
pub mod project_members;
pub mod project_statuses;
pub mod projects;
pub mod roles;
pub mod task_assignees;
pub mod task_priorities;
pub mod task_statuses;
pub mod tasks;
pub mod transaction_types;
pub mod user_roles;
pub mod user_sessions;
pub mod users;
