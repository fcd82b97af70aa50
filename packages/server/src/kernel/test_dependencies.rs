// TestDependencies - mock implementations for testing
//
// Mock magnitude sources that can stand in for the COBS client in the
// refresher, the scheduler and the HTTP routes.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::BaseMagnitudeSource;

/// One scripted response of the mock source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockReading {
    Value(Option<f64>),
    Panic,
}

pub struct MockMagnitudeSource {
    readings: Arc<Mutex<Vec<MockReading>>>,
    calls: Arc<Mutex<usize>>,
    url: String,
}

impl MockMagnitudeSource {
    pub fn new() -> Self {
        Self {
            readings: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(0)),
            url: "https://cobs.example/recent/".to_string(),
        }
    }

    /// Queue a successful reading
    pub fn with_reading(self, magnitude: f64) -> Self {
        self.push(MockReading::Value(Some(magnitude)))
    }

    /// Queue a failed fetch (no reading)
    pub fn with_failure(self) -> Self {
        self.push(MockReading::Value(None))
    }

    /// Queue a fetch that panics mid-cycle
    pub fn with_panic(self) -> Self {
        self.push(MockReading::Panic)
    }

    /// Shared counter, readable after the source is moved into an Arc<dyn _>
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        self.calls.clone()
    }

    fn push(self, reading: MockReading) -> Self {
        self.readings.lock().unwrap().push(reading);
        self
    }
}

impl Default for MockMagnitudeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseMagnitudeSource for MockMagnitudeSource {
    async fn fetch_latest(&self) -> Option<f64> {
        *self.calls.lock().unwrap() += 1;

        let next = {
            let mut readings = self.readings.lock().unwrap();
            if readings.is_empty() {
                None
            } else {
                Some(readings.remove(0))
            }
        };

        // Exhausted queue behaves like an unreachable source
        match next {
            Some(MockReading::Value(reading)) => reading,
            Some(MockReading::Panic) => panic!("mock magnitude source panicked"),
            None => None,
        }
    }

    fn source_url(&self) -> &str {
        &self.url
    }
}
