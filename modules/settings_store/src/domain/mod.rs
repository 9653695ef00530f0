//! Domain layer - store logic, value encoding and collaborator traits

pub mod cache;
pub mod codec;
pub mod repository;
pub mod store;

pub use cache::SettingsCache;
pub use codec::{JsonCodec, PhpSerializeCodec, ValueCodec, ValueEncoding};
pub use repository::SettingsRepository;
pub use store::SettingsStore;
