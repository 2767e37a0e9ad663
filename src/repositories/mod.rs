pub mod auth_session_repo;
pub mod catalog_repo;
pub mod error_log_repo;
pub mod feedback_repo;
pub mod session_repo;
pub mod user_repo;

pub use auth_session_repo::AuthSessionRepository;
pub use catalog_repo::CatalogRepository;
pub use error_log_repo::ErrorLogRepository;
pub use feedback_repo::FeedbackRepository;
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
