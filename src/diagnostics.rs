// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Timing diagnostics for boundary operations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

/// A result together with the time it took to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    /// Run `f` and record how long it took. The result is passed through untouched.
    pub fn measure(f: impl FnOnce() -> T) -> Self {
        let timer = Timer::start();
        let value = f();
        Self {
            value,
            elapsed: timer.elapsed(),
        }
    }

    /// 100-nanosecond ticks
    pub fn ticks(&self) -> u128 {
        self.elapsed.as_nanos() / 100
    }

    /// One-line summary, e.g. `Volume: 3ms | 31250 ticks.`
    pub fn summary(&self, label: &str) -> String {
        format!("{}: {}ms | {} ticks.", label, self.elapsed.as_millis(), self.ticks())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed {
            value: f(self.value),
            elapsed: self.elapsed,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, E> Timed<Result<T, E>> {
    /// Move the error out so `?` can be applied to a timed fallible call
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let elapsed = self.elapsed;
        self.value.map(|value| Timed { value, elapsed })
    }
}

/// Aggregated timings for one named operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub name: String,
    pub count: usize,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl OperationMetrics {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            total: Duration::default(),
            min: Duration::MAX,
            max: Duration::default(),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
    }

    pub fn mean(&self) -> Duration {
        match u32::try_from(self.count) {
            Ok(0) | Err(_) => Duration::default(),
            Ok(n) => self.total / n,
        }
    }

    /// Format duration in milliseconds
    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }
}

/// Timings collected across many facade calls
#[derive(Debug, Default)]
pub struct DiagnosticsReport {
    metrics: HashMap<String, OperationMetrics>,
}

impl DiagnosticsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, elapsed: Duration) {
        self.metrics
            .entry(name.to_string())
            .or_insert_with(|| OperationMetrics::new(name))
            .record(elapsed);
    }

    /// Record the elapsed time of a timed result and hand the value back
    pub fn track<T>(&mut self, name: &str, timed: Timed<T>) -> T {
        self.record(name, timed.elapsed);
        timed.value
    }

    pub fn get(&self, name: &str) -> Option<&OperationMetrics> {
        self.metrics.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Print formatted report to console
    pub fn print_report(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════════════╗");
        println!("║                 MESHBRIDGE - BOUNDARY TIMINGS                        ║");
        println!("╠══════════════════════════════════════════════════════════════════════╣");

        let mut metrics_vec: Vec<_> = self.metrics.values().collect();
        metrics_vec.sort_by(|a, b| b.total.cmp(&a.total));

        for metrics in metrics_vec {
            println!("║ Operation: {:<58} ║", metrics.name);
            println!("║   Calls:          {:<50} ║", metrics.count);
            println!("║   Total (ms):     {:<50.3} ║", metrics.total_ms());
            println!("║   Mean (ms):      {:<50.3} ║", metrics.mean().as_secs_f64() * 1000.0);
            println!("║   Max (ms):       {:<50.3} ║", metrics.max.as_secs_f64() * 1000.0);
        }

        println!("╚══════════════════════════════════════════════════════════════════════╝\n");
    }

    /// Export report as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.metrics).unwrap_or_default()
    }
}
