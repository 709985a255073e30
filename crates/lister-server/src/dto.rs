use serde::{Deserialize, Serialize};

/// Body of the listing form (`application/x-www-form-urlencoded`).
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
