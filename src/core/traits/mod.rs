pub mod history_store;
pub mod revision_source;
