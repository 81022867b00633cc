// src/db.rs

pub mod data_source;
pub use data_source::{SchoolDataSource, StaffProfileSource};
pub mod fixture_repo;
pub use fixture_repo::{FixtureDocument, FixtureRepository, SchoolFixture};
pub mod local_cache;
pub use local_cache::{FileCache, LocalCache, MemoryCache};
