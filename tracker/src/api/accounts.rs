use tracker_core::{Request, Response};

use super::{id_param, method_not_allowed, AppState};
use crate::core::{respond, ApiError};

pub async fn accounts(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "GET" => state
            .store
            .accounts()
            .map(|list| Response::json(200, &list))
            .map_err(ApiError::from),
        _ => Err(method_not_allowed(&req)),
    })
}

pub async fn account_by_id(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "GET" => id_param(&req, "accountId").and_then(|id| {
            let account = state.store.account(id)?.ok_or(ApiError::NotFound("account"))?;
            Ok(Response::json(200, &account))
        }),
        _ => Err(method_not_allowed(&req)),
    })
}
