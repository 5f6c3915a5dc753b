// Reply generation: category-aware prompt routing and the HTTP contract around it.
// All model calls go through oracle; nothing here speaks HTTP to the model service.

pub mod catalog;
pub mod gateway;
pub mod handlers;
