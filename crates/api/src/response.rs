//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// Used by the operator endpoints. The public generation endpoints keep
/// their bare response bodies.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ... }` body for endpoints that only acknowledge.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
