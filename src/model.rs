// Data model representing a registered user
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    // Stored verbatim; login matches on exact equality.
    pub password: String,
}

// Data model representing a Todo item owned by a user
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Todo {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub title: String,
    pub completed: bool,
}
