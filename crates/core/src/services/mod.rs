pub mod alert_service;
pub mod analytics_service;
pub mod change_service;
pub mod export_service;
pub mod fetch_service;
pub mod poll_scheduler;
pub mod portfolio_service;
pub mod recommendation_service;
pub mod series_validator;
pub mod volatility_service;
pub mod window_service;
