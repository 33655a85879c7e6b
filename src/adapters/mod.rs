pub mod cache_purge;
pub mod object_storage;
