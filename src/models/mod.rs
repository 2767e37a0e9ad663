pub mod catalog;
pub mod error_log;
pub mod feedback;
pub mod from_row;
pub mod plan;
pub mod session;
pub mod user;

pub use catalog::{BodyPart, BodyPartRef, Difficulty, Disclaimer, Exercise, MuscleTest};
pub use error_log::ErrorLog;
pub use feedback::{FeedbackRating, FeedbackRequest};
pub use from_row::{json_column, FromSqliteRow};
pub use plan::{PlannedExercise, TrainingPlan};
pub use session::{
    CreateSessionRequest, ListQuery, MuscleTestRating, Page, PlanStatus, Session, SessionDto,
    SessionSummary, SessionTestWithName,
};
pub use user::{Credentials, User, UserDto, UserRole};
