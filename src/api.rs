//! Server functions backing the screens. Each one is a single row read or update; the screens
//! decide what to call and in which order.
//!
//! None of these check who is calling. Access control lives in the client route guard.

use leptos::prelude::*;

use crate::model::{
    Admin, AdminField, AdminIdentity, SettingGroup, SiteSetting, Stage, StageField, Team,
    TeamField, TeamIdentity,
};

#[cfg(feature = "ssr")]
use crate::{error::StoreError, DbPool};

/// Error type of every server function in this module.
pub type ApiError = ServerFnError;
#[cfg(feature = "ssr")]
use diesel::SqliteConnection;

/// Runs a store operation on a pooled connection off the async runtime.
#[cfg(feature = "ssr")]
async fn with_conn<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
{
    let pool: DbPool = expect_context();
    let result = tokio::task::spawn_blocking(move || -> Result<T, StoreError> {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await
    .map_err(|e| ApiError::ServerError(e.to_string()))?;

    result.map_err(|e| {
        tracing::warn!(error = %e, "store operation failed");
        ApiError::ServerError(e.to_string())
    })
}

#[server(GetSiteCopy)]
pub async fn get_site_copy(
    group: SettingGroup,
) -> Result<Vec<SiteSetting>, ApiError> {
    with_conn(move |conn| crate::get_settings_in_group(conn, group)).await
}

/// Returns the team's public fields when exactly one row matches both credentials.
#[server(LoginTeam)]
pub async fn login_team(
    username: String,
    password: String,
) -> Result<Option<TeamIdentity>, ApiError> {
    let team =
        with_conn(move |conn| crate::find_team_by_credentials(conn, &username, &password)).await?;
    match &team {
        Some(team) => tracing::info!(team_id = team.id, "team logged in"),
        None => tracing::info!("team login rejected"),
    }
    Ok(team.map(|t| t.identity()))
}

#[server(LoginAdmin)]
pub async fn login_admin(
    username: String,
    password: String,
) -> Result<Option<AdminIdentity>, ApiError> {
    let admin =
        with_conn(move |conn| crate::find_admin_by_credentials(conn, &username, &password)).await?;
    match &admin {
        Some(admin) => tracing::info!(admin_id = admin.id, "admin logged in"),
        None => tracing::info!("admin login rejected"),
    }
    Ok(admin.map(|a| a.identity()))
}

#[server(GetTeamStage)]
pub async fn get_team_stage(
    team_id: i32,
    stage_number: i32,
) -> Result<Stage, ApiError> {
    with_conn(move |conn| crate::get_team_stage(conn, team_id, stage_number)).await
}

/// Marks the stage completed and moves the team on. Returns the team's new public fields.
#[server(RecordStageCompletion)]
pub async fn record_stage_completion(
    team_id: i32,
    stage_id: i32,
) -> Result<TeamIdentity, ApiError> {
    let (team, advance) =
        with_conn(move |conn| crate::record_stage_completion(conn, team_id, stage_id)).await?;
    tracing::info!(team_id, stage_id, ?advance, "stage completed");
    Ok(team.identity())
}

#[server(GetTeams)]
pub async fn get_teams() -> Result<Vec<Team>, ApiError> {
    with_conn(crate::get_all_teams).await
}

#[server(GetAdmins)]
pub async fn get_admins() -> Result<Vec<Admin>, ApiError> {
    with_conn(crate::get_all_admins).await
}

#[server(GetStages)]
pub async fn get_stages() -> Result<Vec<Stage>, ApiError> {
    with_conn(crate::get_all_stages).await
}

#[server(GetSettings)]
pub async fn get_settings() -> Result<Vec<SiteSetting>, ApiError> {
    with_conn(crate::get_all_settings).await
}

#[server(UpdateTeamField)]
pub async fn update_team_field(
    team_id: i32,
    field: TeamField,
    value: String,
) -> Result<(), ApiError> {
    with_conn(move |conn| crate::update_team_field(conn, team_id, field, &value)).await?;
    tracing::info!(team_id, ?field, "team updated");
    Ok(())
}

#[server(UpdateAdminField)]
pub async fn update_admin_field(
    admin_id: i32,
    field: AdminField,
    value: String,
) -> Result<(), ApiError> {
    with_conn(move |conn| crate::update_admin_field(conn, admin_id, field, &value)).await?;
    tracing::info!(admin_id, ?field, "admin updated");
    Ok(())
}

#[server(UpdateStageField)]
pub async fn update_stage_field(
    stage_id: i32,
    field: StageField,
    value: String,
) -> Result<(), ApiError> {
    with_conn(move |conn| crate::update_stage_field(conn, stage_id, field, &value)).await?;
    tracing::info!(stage_id, ?field, "stage updated");
    Ok(())
}

#[server(UpdateSetting)]
pub async fn update_setting(
    setting_id: i32,
    value: String,
) -> Result<(), ApiError> {
    with_conn(move |conn| crate::update_setting(conn, setting_id, &value)).await?;
    tracing::info!(setting_id, "setting updated");
    Ok(())
}

#[server(ResetTeamProgress)]
pub async fn reset_team_progress(team_id: i32) -> Result<(), ApiError> {
    let summary = with_conn(move |conn| crate::reset_team_progress(conn, team_id)).await?;
    tracing::info!(team_id, stages = summary.stages, "team progress reset");
    Ok(())
}

#[server(ResetAllProgress)]
pub async fn reset_all_progress() -> Result<(), ApiError> {
    let summary = with_conn(crate::reset_all_progress).await?;
    tracing::info!(
        teams = summary.teams,
        stages = summary.stages,
        "all team progress reset"
    );
    Ok(())
}
