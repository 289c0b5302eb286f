use serde::Serialize;

/// Envelope for every JSON response of the admin endpoints.
///
/// ```json
/// {
///   "success": true,
///   "data": { "id": 1, "name": "France" },
///   "message": "Country retrieved successfully"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

impl ApiResponse<()> {
    /// An error response; `data` is serialized as `null`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            message: message.into(),
        }
    }
}
