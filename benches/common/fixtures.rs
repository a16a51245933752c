use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use swr_resource::{BoxError, Fetcher};

/// Test data structure for benchmarks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub score: u32,
}

impl BenchUser {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            score: (id % 1000) as u32,
        }
    }
}

/// A list of `count` users.
pub fn users(count: usize) -> Vec<BenchUser> {
    (0..count as u64).map(BenchUser::new).collect()
}

/// Simulated API returning the same user list on every fetch
pub struct FakeApi {
    users: Vec<BenchUser>,
    latency: Duration,
    fetch_count: AtomicUsize,
}

impl FakeApi {
    pub fn new(count: usize, latency_us: u64) -> Self {
        Self {
            users: users(count),
            latency: Duration::from_micros(latency_us),
            fetch_count: AtomicUsize::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Fetcher<Vec<BenchUser>> for FakeApi {
    async fn fetch(&self, _key: &str) -> Result<Vec<BenchUser>, BoxError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        // Simulate network latency
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(self.users.clone())
    }
}
