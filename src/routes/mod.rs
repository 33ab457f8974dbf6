mod auth;
mod home;
mod tasks;

pub use auth::{
    get_current_user, login, signup, token, LoginRequest, SignupRequest, SignupResponse,
    TokenResponse,
};
pub use home::{health_check, home};
pub use tasks::{create_task, get_task, list_tasks, CreateTaskRequest, ListTasksQuery};
