use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::team_commands;
use backend_application::queries::team_queries;
use backend_application::AppState;
use backend_domain::{AddTeamMemberRequest, CreateTeamRequest, Team, TeamId, User};

use crate::error::HttpError;
use crate::handlers::parse_id;
use crate::middleware::{authenticate, ApiJson};

pub async fn create_team(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team = team_commands::create_team(&state, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn list_teams(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Team>>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let teams = team_queries::list_my_teams(&state, &principal).await?;
    Ok(Json(teams))
}

pub async fn list_members(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<User>>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    let members = team_queries::list_team_members(&state, &principal, team_id).await?;
    Ok(Json(members))
}

pub async fn add_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
    ApiJson(payload): ApiJson<AddTeamMemberRequest>,
) -> Result<Json<User>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    let user = team_commands::add_team_member(&state, &principal, team_id, payload).await?;
    Ok(Json(user))
}
