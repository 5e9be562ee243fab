//! Cache tiers for resolved image URLs
//!
//! Two tiers hold the same logical mapping from cache key to "image URL or
//! confirmed absence": an in-process memory map and a session store that
//! persists entries to disk under a versioned namespace. The session store
//! survives restarts until the cache version is bumped or the directory is
//! cleared.

mod memory;
mod session;

pub use memory::MemoryCache;
pub use session::{SessionStore, CACHE_VERSION, DEFAULT_SESSION_TTL_HOURS, NO_IMAGE_SENTINEL};
