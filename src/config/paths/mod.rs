//! Filesystem locations used by configuration and caches.

pub mod xdg_root;
