//! Common test utilities: instrumented backing store and cache

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use settings_store::{
    InMemorySettingsRepository, MemoryCache, RawSetting, SettingsCache, SettingsMap,
    SettingsRepository,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Backing store that counts calls and can be told to fail
#[derive(Default)]
pub struct CountingRepo {
    pub inner: InMemorySettingsRepository,
    pub reads: AtomicUsize,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl CountingRepo {
    pub fn with_rows(rows: impl IntoIterator<Item = RawSetting>) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemorySettingsRepository::with_rows(rows),
            ..Self::default()
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.raw_value(key).flatten()
    }
}

#[async_trait]
impl SettingsRepository for CountingRepo {
    async fn read_all(&self) -> anyhow::Result<Vec<RawSetting>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        self.inner.read_all().await
    }

    async fn insert(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.insert(key, value).await
    }

    async fn update(&self, key: &str, value: &str) -> anyhow::Result<u64> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.update(key, value).await
    }
}

/// Cache that records every call in order
#[derive(Default)]
pub struct RecordingCache {
    pub inner: MemoryCache,
    pub calls: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: String) -> anyhow::Result<()> {
        self.calls.lock().push(call);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("cache unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsCache for RecordingCache {
    async fn get(&self, name: &str) -> anyhow::Result<Option<SettingsMap>> {
        self.record(format!("get:{}", name))?;
        self.inner.get(name).await
    }

    async fn save(&self, name: &str, settings: &SettingsMap, ttl: Duration) -> anyhow::Result<()> {
        self.record(format!("save:{}:{}", name, ttl.as_secs()))?;
        self.inner.save(name, settings, ttl).await
    }

    async fn delete(&self, name: &str) -> anyhow::Result<()> {
        self.record(format!("delete:{}", name))?;
        self.inner.delete(name).await
    }
}
