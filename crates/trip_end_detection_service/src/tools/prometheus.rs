/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{
    opts, register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

pub static INCOMING_API: once_cell::sync::Lazy<HistogramVec> = once_cell::sync::Lazy::new(|| {
    register_histogram_vec!(
        opts!("http_request_duration_seconds", "Incoming API requests").into(),
        &["method", "handler", "status_code", "code", "version"]
    )
    .expect("Failed to register incoming API metrics")
});

pub static TOTAL_LOCATION_EVENTS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("total_location_events", "Total Location Events")
            .expect("Failed to register total location events metrics")
    });

pub static SAMPLE_FILTER_OUTCOME: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("sample_filter_outcome", "Sample Filter Outcomes"),
            &["outcome"]
        )
        .expect("Failed to register sample filter outcome metrics")
    });

pub static TRIP_END_DETECTED: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("trip_end_detected", "Trip Ends Detected")
            .expect("Failed to register trip end detected metrics")
    });

/// Observes the duration of an incoming API request into `INCOMING_API`.
///
/// # Arguments
///
/// * `$method` - The HTTP method of the request.
/// * `$endpoint` - The route of the request, with path parameters masked.
/// * `$status` - The HTTP status code of the response.
/// * `$code` - `SUCCESS` or the error code of the response.
/// * `$start` - The instant the request was received.
#[macro_export]
macro_rules! incoming_api {
    ($method:expr, $endpoint:expr, $status:expr, $code:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        INCOMING_API
            .with_label_values(&[$method, $endpoint, $status, $code, version.as_str()])
            .observe(duration);
    };
}

/// Counts one sample filter decision, labelled by its outcome.
#[macro_export]
macro_rules! sample_filter_outcome {
    ($outcome:expr) => {
        SAMPLE_FILTER_OUTCOME.with_label_values(&[$outcome]).inc();
    };
}

/// Builds the actix middleware serving `/metrics`, with the service metrics registered into it.
///
/// # Panics
///
/// * If the metrics builder fails or a metric cannot be registered.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(INCOMING_API.to_owned()))
        .expect("Failed to register incoming API metrics");

    prometheus
        .registry
        .register(Box::new(TOTAL_LOCATION_EVENTS.to_owned()))
        .expect("Failed to register total location events metrics");

    prometheus
        .registry
        .register(Box::new(SAMPLE_FILTER_OUTCOME.to_owned()))
        .expect("Failed to register sample filter outcome metrics");

    prometheus
        .registry
        .register(Box::new(TRIP_END_DETECTED.to_owned()))
        .expect("Failed to register trip end detected metrics");

    prometheus
}
