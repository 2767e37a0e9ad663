pub mod auth;
pub mod route_guard;

pub use auth::{AdminUser, AuthUser, CurrentUser};
pub use route_guard::{route_guard, GuardState};
