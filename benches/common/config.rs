use std::env;

/// Configuration for benchmarks, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Simulated fetch latency in microseconds (from FETCH_LATENCY_US env var, defaults to 0)
    pub fetch_latency_us: u64,

    /// Sample size for benchmarks (from BENCH_SAMPLE_SIZE env var, defaults to 100)
    pub sample_size: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            fetch_latency_us: env::var("FETCH_LATENCY_US")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            sample_size: env::var("BENCH_SAMPLE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
        }
    }
}

impl BenchConfig {
    pub fn new() -> Self {
        let config = Self::default();
        eprintln!("Benchmark Configuration:");
        eprintln!("  Fetch Latency: {}us", config.fetch_latency_us);
        eprintln!("  Sample Size: {}", config.sample_size);
        config
    }
}
