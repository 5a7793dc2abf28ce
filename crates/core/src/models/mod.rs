pub mod alert;
pub mod analysis;
pub mod analytics;
pub mod dashboard;
pub mod portfolio;
pub mod record;
pub mod settings;
pub mod signal;
pub mod ticker;
pub mod window;
