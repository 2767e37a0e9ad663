pub mod admin;
pub mod auth;
pub mod catalog;
pub mod disclaimer;
pub mod feedback;
pub mod health;
pub mod pages;
pub mod sessions;
