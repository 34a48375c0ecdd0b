use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    /// info, success, warning, workout
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "read")]
    pub is_read: bool,
    pub created_at: String,
}

pub mod kind {
    pub const INFO: &str = "info";
    pub const WORKOUT: &str = "workout";
}
