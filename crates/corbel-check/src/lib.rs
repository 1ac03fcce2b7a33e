pub mod adapt;
pub mod classify;
pub mod component;
pub mod discover;
pub mod evaluate;
pub mod parser;
pub mod rules;
pub mod validate;

pub use corbel_schema_cache as schema_cache;
