//! REST panel wire types

use serde::Deserialize;

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// `GET /whoami`
#[derive(Debug, Deserialize)]
pub struct WhoAmI {
    pub reseller: Option<String>,
}
