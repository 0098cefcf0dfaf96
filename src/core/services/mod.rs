pub mod analytics_service;
pub mod bulk_service;
pub mod export_service;
pub mod filter_service;
pub mod history_service;
