//! # Throughput Sampler
//!
//! Rolling one-second byte counter used to report download speed in KiB/s.

use bridge_traits::Clock;
use std::sync::Arc;

/// Bucket length in milliseconds.
const BUCKET_MILLIS: i64 = 1000;

/// Minimum bucket age before the in-progress rate stands in for the last second.
const PARTIAL_BUCKET_MILLIS: i64 = 500;

/// Accumulates bytes into one-second buckets.
pub struct ThroughputSampler {
    clock: Arc<dyn Clock>,
    first_check_millis: Option<i64>,
    last_check_millis: i64,
    bucket_bytes: u64,
    last_second_bytes: u64,
}

impl ThroughputSampler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            first_check_millis: None,
            last_check_millis: 0,
            bucket_bytes: 0,
            last_second_bytes: 0,
        }
    }

    /// Forget all samples.
    pub fn reset(&mut self) {
        self.first_check_millis = None;
        self.last_check_millis = 0;
        self.bucket_bytes = 0;
        self.last_second_bytes = 0;
    }

    /// Record `bytes` received now.
    pub fn add_bytes(&mut self, bytes: u64) {
        let now = self.clock.unix_timestamp_millis();
        if self.first_check_millis.is_none() {
            self.first_check_millis = Some(now);
            self.last_check_millis = now;
            self.bucket_bytes += bytes;
        } else if now - self.last_check_millis < BUCKET_MILLIS {
            self.bucket_bytes += bytes;
        } else {
            self.last_second_bytes = self.bucket_bytes;
            self.bucket_bytes = bytes;
            self.last_check_millis = now;
        }
    }

    /// Rate of the bucket in progress, KiB/s.
    pub fn current_kbps(&mut self) -> f64 {
        self.add_bytes(0);
        let now = self.clock.unix_timestamp_millis();
        let mut elapsed_secs = (now - self.last_check_millis) as f64 / 1000.0;
        if elapsed_secs == 0.0 {
            elapsed_secs = 1.0;
        }
        self.bucket_bytes as f64 / elapsed_secs / 1024.0
    }

    /// Rate of the last completed second, KiB/s.
    pub fn last_second_kbps(&mut self) -> f64 {
        self.add_bytes(0);
        if self.last_second_bytes != 0 {
            return self.last_second_bytes as f64 / 1024.0;
        }
        let now = self.clock.unix_timestamp_millis();
        if now - self.last_check_millis >= PARTIAL_BUCKET_MILLIS {
            self.current_kbps()
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for ThroughputSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThroughputSampler")
            .field("first_check_millis", &self.first_check_millis)
            .field("last_check_millis", &self.last_check_millis)
            .field("bucket_bytes", &self.bucket_bytes)
            .field("last_second_bytes", &self.last_second_bytes)
            .finish()
    }
}
