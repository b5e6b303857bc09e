use serde_json::Value;

use crate::{
    backend::BackendApi,
    models::{AdminDashboardView, CitizenDashboardView, WorkerDashboardView},
    session::{CitizenProfile, SessionSnapshot, WorkerProfile},
};

// Data loading for the role dashboards. Every backend call is independent: a failure
// is logged and that part of the view falls back to empty, the rest still renders.

async fn fetch_list(
    backend: &dyn BackendApi,
    path: &str,
    query: &[(&str, &str)],
    field: &str,
) -> Vec<Value> {
    match backend.get(path, query).await {
        Ok(body) => body
            .get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!("loading {} failed: {}", path, e);
            vec![]
        }
    }
}

async fn fetch_object(backend: &dyn BackendApi, path: &str, field: &str) -> Option<Value> {
    match backend.get(path, &[]).await {
        Ok(body) => body.get(field).filter(|value| !value.is_null()).cloned(),
        Err(e) => {
            tracing::warn!("loading {} failed: {}", path, e);
            None
        }
    }
}

fn area_filter(area: &Option<String>) -> &str {
    area.as_deref().filter(|a| !a.is_empty()).unwrap_or("all")
}

/// Activities, both leaderboards for the household's area, and the pickup schedule.
pub async fn load_citizen(
    backend: &dyn BackendApi,
    profile: &CitizenProfile,
    session: SessionSnapshot,
) -> CitizenDashboardView {
    let area = area_filter(&profile.area);
    let activities_path = format!("/api/citizen/activities/{}", profile.citizen_id);
    let schedule_path = format!("/api/citizen/schedule/{}", profile.citizen_id);
    let area_query = [("area", area)];

    let (activities, leaderboard, worker_leaderboard, schedule) = tokio::join!(
        fetch_list(backend, &activities_path, &[], "activities"),
        fetch_list(backend, "/api/citizen/leaderboard", &area_query, "leaderboard"),
        fetch_list(backend, "/api/worker/leaderboard", &area_query, "leaderboard"),
        fetch_object(backend, &schedule_path, "schedule"),
    );

    CitizenDashboardView {
        session,
        activities,
        leaderboard,
        worker_leaderboard,
        schedule,
    }
}

pub async fn load_worker(
    backend: &dyn BackendApi,
    profile: &WorkerProfile,
    session: SessionSnapshot,
) -> WorkerDashboardView {
    let area = area_filter(&profile.area);
    let tasks_path = format!("/api/worker/tasks/{}", profile.worker_id);
    let activities_path = format!("/api/worker/activities/{}", profile.worker_id);
    let area_query = [("area", area)];

    let (assigned_tasks, completed_tasks, activities, leaderboard) = tokio::join!(
        fetch_list(backend, &tasks_path, &[("status", "assigned")], "tasks"),
        fetch_list(backend, &tasks_path, &[("status", "completed")], "tasks"),
        fetch_list(backend, &activities_path, &[], "activities"),
        fetch_list(backend, "/api/worker/leaderboard", &area_query, "leaderboard"),
    );

    WorkerDashboardView {
        session,
        assigned_tasks,
        completed_tasks,
        activities,
        leaderboard,
    }
}

pub async fn load_admin(backend: &dyn BackendApi, session: SessionSnapshot) -> AdminDashboardView {
    let (workers, citizens, tasks, qr_scans) = tokio::join!(
        fetch_list(backend, "/api/admin/workers", &[], "workers"),
        fetch_list(backend, "/api/admin/citizens", &[], "citizens"),
        fetch_list(backend, "/api/admin/tasks", &[], "tasks"),
        fetch_list(backend, "/api/admin/qr-scans", &[], "scans"),
    );

    AdminDashboardView {
        session,
        workers,
        citizens,
        tasks,
        qr_scans,
    }
}
