//! Request body extractors.

use axum::extract::FromRequest;

use super::error::ApiError;

/// `Json` whose rejections (malformed body, wrong content type) are
/// reported through the [`ApiError`] envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
