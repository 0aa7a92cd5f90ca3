// Application services sitting between the HTTP handlers and the domain

pub mod page_service;
pub mod query_cache;
pub mod serializers;

pub use page_service::{PageService, RenderedPage};
pub use query_cache::InMemoryQueryCache;
