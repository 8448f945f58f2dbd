//! Activities and activity types. All routes here sit behind `access_token`.

use serde::Deserialize;
use tracker_core::{Request, Response};

use super::{caller, id_param, method_not_allowed, AppState};
use crate::core::{respond, ApiError};
use crate::domain::NewActivity;

#[derive(Deserialize)]
struct CreateActivity {
    title: String,
    type_id: i64,
}

#[derive(Deserialize)]
struct CreateActivityType {
    title: String,
}

pub async fn activities(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "GET" => state
            .store
            .activities()
            .map(|list| Response::json(200, &list))
            .map_err(ApiError::from),
        "POST" => create_activity(&state, &req),
        _ => Err(method_not_allowed(&req)),
    })
}

pub async fn activity_by_id(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "GET" => get_activity(&state, &req),
        "DELETE" => delete_activity(&state, &req),
        _ => Err(method_not_allowed(&req)),
    })
}

pub async fn activity_types(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "GET" => state
            .store
            .activity_types()
            .map(|list| Response::json(200, &list))
            .map_err(ApiError::from),
        "POST" => create_activity_type(&state, &req),
        _ => Err(method_not_allowed(&req)),
    })
}

pub async fn activity_type_by_id(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "GET" => get_activity_type(&state, &req),
        _ => Err(method_not_allowed(&req)),
    })
}

fn create_activity(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let owner = caller(req)?;
    let body: CreateActivity = req.json()?;
    let activity = state.store.create_activity(NewActivity {
        title: body.title,
        type_id: body.type_id,
        owner_id: owner.id,
    })?;
    tracing::info!(activity_id = activity.id, owner_id = owner.id, "activity created");
    Ok(Response::json(201, &activity))
}

fn get_activity(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let id = id_param(req, "activityId")?;
    let activity = state.store.activity(id)?.ok_or(ApiError::NotFound("activity"))?;
    Ok(Response::json(200, &activity))
}

fn delete_activity(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let id = id_param(req, "activityId")?;
    if !state.store.delete_activity(id)? {
        return Err(ApiError::NotFound("activity"));
    }
    Ok(Response::new(204))
}

fn create_activity_type(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let body: CreateActivityType = req.json()?;
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }
    let created = state.store.create_activity_type(&body.title)?;
    Ok(Response::json(201, &created))
}

fn get_activity_type(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let id = id_param(req, "typeId")?;
    let found = state
        .store
        .activity_type(id)?
        .ok_or(ApiError::NotFound("activity type"))?;
    Ok(Response::json(200, &found))
}
