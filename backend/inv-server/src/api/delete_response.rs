use serde::Serialize;

/// Body returned by DELETE endpoints
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
