pub mod date_range;
pub mod edit_record;
pub mod entity;
pub mod tracking_entry;
pub mod user_stats;
