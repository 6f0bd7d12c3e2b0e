//! On-disk repository cache
//!
//! Each repository identity maps to exactly one directory:
//!
//! | Mode | Root | Contents |
//! |------|------|----------|
//! | Capable | OS temp root (or `cache.root`) | real checkout with `.git/` |
//! | Degraded | `/tmp` | `.bugsmith-serverless` marker only |
//!
//! Entries are created on first acquisition and updated in place later.
//! Nothing here ever deletes an entry.

pub mod lock;
pub mod marker;
pub mod path;

pub use lock::{PathGuard, PathLocks};
pub use marker::{ServerlessMarker, MARKER_FILE};
pub use path::{os_temp_root, CachePathResolver, UNIVERSAL_TMP_ROOT};
