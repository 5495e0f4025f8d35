pub mod admin;
pub mod dashboard;
pub mod pdf;
pub mod profile;
pub mod requests;
pub mod settings;
