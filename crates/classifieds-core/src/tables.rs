//! Backend table names and the constraints the hosted schema declares.

use classifieds_store::MemoryBackend;

pub const LISTINGS: &str = "listings";
pub const FAVORITES: &str = "favorites";
pub const MESSAGES: &str = "messages";
pub const PROFILES: &str = "profiles";

/// Register the marketplace schema's unique constraints on an in-memory
/// backend.
pub fn with_schema(backend: MemoryBackend) -> MemoryBackend {
    backend.with_unique(FAVORITES, &["user_id", "product_id"])
}

/// An empty in-memory backend with the marketplace schema.
pub fn memory_backend() -> MemoryBackend {
    with_schema(MemoryBackend::new())
}
