pub mod discover_query;
pub mod size_class;
