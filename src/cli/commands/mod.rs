pub mod analytics;
pub mod bulk;
pub mod entity;
pub mod history;
pub mod query_helpers;
pub mod recent;
pub mod user;
