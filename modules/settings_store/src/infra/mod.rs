//! Infrastructure layer - backing store and cache adapters

pub mod cache;
pub mod storage;
