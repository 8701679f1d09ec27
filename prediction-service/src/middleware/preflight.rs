use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

/// `CorsLayer` answers every `OPTIONS` request itself, before routing or body
/// handling, with an empty `200`. Clients of this API expect `204 No Content`.
pub async fn preflight_no_content_middleware(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;

    let mut response = next.run(req).await;

    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }

    response
}
