//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/v1/message/send/{receiver_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// Success envelope: `{"success": true, "responseData": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub response_data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(response_data: T) -> Self {
        Self {
            success: true,
            response_data,
        }
    }
}

/// Error detail inside the failure envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetailDto {
    pub message: String,
}

/// Failure envelope: `{"success": false, "error": {"message": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub success: bool,
    pub error: ErrorDetailDto,
}
