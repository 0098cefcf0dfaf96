pub mod history;
pub mod wikidata;
