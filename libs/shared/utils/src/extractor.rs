use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use shared_models::error::AppError;
use shared_models::identity::{Actor, ActorRole};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Middleware resolving the caller identity forwarded by the auth gateway.
/// Every cell route runs behind this; handlers read the `Actor` extension
/// instead of assuming a fixed caller.
pub async fn identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let actor = actor_from_headers(request.headers())?;

    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AppError> {
    let id_value = headers
        .get(ACTOR_ID_HEADER)
        .ok_or_else(|| AppError::Auth(format!("Missing {} header", ACTOR_ID_HEADER)))?;
    let role_value = headers
        .get(ACTOR_ROLE_HEADER)
        .ok_or_else(|| AppError::Auth(format!("Missing {} header", ACTOR_ROLE_HEADER)))?;

    let id: i64 = id_value
        .to_str()
        .ok()
        .and_then(|raw| raw.parse().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Auth("Invalid actor id".to_string()))?;

    let role: ActorRole = role_value
        .to_str()
        .map_err(|_| AppError::Auth("Invalid actor role header".to_string()))?
        .parse()
        .map_err(AppError::Auth)?;

    Ok(Actor { id, role })
}
