use serde::Serialize;

// 统一API响应结构
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

/// Body of operations that only report completion.
#[derive(Serialize, Debug, PartialEq)]
pub struct SuccessFlag {
    pub success: bool,
}

impl SuccessFlag {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// 便捷构造函数
impl<T> ApiResponse<T> {
    pub fn success(data: T, message: &str) -> Self {
        Self {
            success: true,
            code: 200,
            message: message.to_string(),
            data: Some(data),
            meta: None,
            errors: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn success_with_meta(data: T, message: &str, meta: ResponseMeta) -> Self {
        Self {
            success: true,
            code: 200,
            message: message.to_string(),
            data: Some(data),
            meta: Some(meta),
            errors: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn created(data: T, message: &str) -> Self {
        Self {
            success: true,
            code: 201,
            message: message.to_string(),
            data: Some(data),
            meta: None,
            errors: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(code: u16, message: &str, errors: Vec<ErrorDetail>) -> Self {
        Self {
            success: false,
            code,
            message: message.to_string(),
            data: None,
            meta: None,
            errors: Some(errors),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn single_error(code: u16, error_code: &str, message: &str) -> Self {
        Self::error(
            code,
            message,
            vec![ErrorDetail {
                field: None,
                code: error_code.to_string(),
                message: message.to_string(),
            }],
        )
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::single_error(401, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::single_error(403, "FORBIDDEN", message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::single_error(404, "NOT_FOUND", message)
    }

    pub fn conflict(message: &str, field: Option<String>, error_code: &str) -> Self {
        Self::error(
            409,
            message,
            vec![ErrorDetail {
                field,
                code: error_code.to_string(),
                message: message.to_string(),
            }],
        )
    }

    pub fn bad_request(message: &str) -> Self {
        Self::single_error(400, "BAD_REQUEST", message)
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::single_error(502, "BAD_GATEWAY", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::single_error(500, "INTERNAL_ERROR", message)
    }
}
