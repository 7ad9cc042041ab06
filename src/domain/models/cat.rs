use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub gender: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Cat {
    pub fn new(user_id: String, name: String, gender: String) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            gender,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_valid_gender(value: &str) -> bool {
        matches!(value, "MALE" | "FEMALE")
    }
}
