//! Names of the seeded reference rows that queries match against.

pub(crate) const PROJECT_PLANNED: &str = "Planificado";
pub(crate) const PROJECT_IN_PROGRESS: &str = "En Progreso";
pub(crate) const PROJECT_COMPLETED: &str = "Completado";
pub(crate) const PROJECT_CANCELLED: &str = "Cancelado";

pub(crate) const TASK_PENDING: &str = "Pendiente";
pub(crate) const TASK_IN_PROGRESS: &str = "En Progreso";
pub(crate) const TASK_COMPLETED: &str = "Completada";

pub(crate) const PROJECT_STATUSES: [&str; 4] = [
    PROJECT_PLANNED,
    PROJECT_IN_PROGRESS,
    PROJECT_COMPLETED,
    PROJECT_CANCELLED,
];
pub(crate) const TASK_STATUSES: [&str; 3] = [TASK_PENDING, TASK_IN_PROGRESS, TASK_COMPLETED];
pub(crate) const TASK_PRIORITIES: [&str; 3] = ["Baja", "Media", "Alta"];

/// Label used when a row points at a reference id that no longer resolves.
pub(crate) const UNKNOWN: &str = "Desconocido";
