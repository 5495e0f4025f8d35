pub mod admin_settings;
pub mod dashboard;
pub mod forms;
pub mod profile;
pub mod request;
pub mod role;
pub mod system_setting;
pub mod user;
