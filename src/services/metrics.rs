//! Prometheus export of the component's counters and the admin server's traffic.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::time::{Duration, Instant};

use crate::services::component::ConnectionControl;

/// Metrics registry of the admin server
#[derive(Clone)]
pub struct ControlMetrics {
    pub registry: Registry,
    pub delay_generated: IntGauge,
    pub failed_accounts: IntGauge,
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub uptime_seconds: Gauge,
    pub start_time: Instant,
}

impl ControlMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let delay_generated = IntGauge::new(
            "component_connection_control_delay_generated",
            "Connections delayed since the threshold was last changed",
        )?;
        let failed_accounts = IntGauge::new(
            "component_connection_control_failed_accounts",
            "Accounts with at least one recorded failed login",
        )?;

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of admin API requests"),
            &["method", "status", "route"],
        )?;
        // Connection events can be held back for seconds
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Admin API request duration in seconds",
            )
            .buckets(vec![0.005, 0.05, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["method", "route"],
        )?;
        let uptime_seconds = Gauge::new("app_uptime_seconds", "Admin server uptime in seconds")?;

        registry.register(Box::new(delay_generated.clone()))?;
        registry.register(Box::new(failed_accounts.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry,
            delay_generated,
            failed_accounts,
            http_requests_total,
            http_request_duration_seconds,
            uptime_seconds,
            start_time: Instant::now(),
        })
    }

    /// Copy the component's current counters into the gauges
    pub fn refresh(&self, control: &ConnectionControl) {
        self.delay_generated
            .set(i64::try_from(control.delay_generated()).unwrap_or(i64::MAX));
        self.failed_accounts
            .set(i64::try_from(control.table_row_count()).unwrap_or(i64::MAX));
        self.uptime_seconds
            .set(self.start_time.elapsed().as_secs_f64());
    }

    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        if route == "/api/metrics" {
            return;
        }

        self.http_requests_total
            .with_label_values(&[method, &status.to_string(), route])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}
