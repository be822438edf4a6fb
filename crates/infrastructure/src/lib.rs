//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_cache;
mod in_memory_permission_repository;
mod postgres_permission_repository;
mod redis_permission_cache;

pub use in_memory_permission_cache::InMemoryPermissionCache;
pub use in_memory_permission_repository::InMemoryPermissionRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use redis_permission_cache::RedisPermissionCache;
