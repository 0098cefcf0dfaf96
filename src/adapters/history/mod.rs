pub mod json_history_store;
