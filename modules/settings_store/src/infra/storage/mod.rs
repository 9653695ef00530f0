//! Storage layer - backing store implementations

pub mod mapper;
pub mod memory;
pub mod migrations;
pub mod repositories;

pub use memory::InMemorySettingsRepository;
pub use repositories::SeaOrmSettingsRepository;
