pub mod dashboard;
pub mod profile;
pub mod requests;
pub mod settings;
pub mod submission;
