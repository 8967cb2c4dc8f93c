// Struct representing the request body for signup
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SignupSchema {
    pub username: String,
    pub password: String,
}

// Struct representing the request body for login
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LoginSchema {
    pub username: String,
    pub password: String,
}

// Struct representing the request body for creating a new Todo
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreateTodoSchema {
    pub title: String,
}

// Struct representing the request body for updating a Todo
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UpdateTodoSchema {
    pub title: String,
    pub completed: bool,
}
