use std::net::SocketAddr;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics() {
    let port: u16 = std::env::var("HAZARD_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9898);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            tracing::info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            tracing::warn!("Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}

/// Count one successfully ingested record by type.
pub fn record_ingest_success(record_type: &str) {
    ::metrics::counter!("hazard_ingest_records_success", "record_type" => record_type.to_string())
        .increment(1);
}

/// Count one rejected ingest request.
pub fn record_ingest_rejected() {
    ::metrics::counter!("hazard_ingest_records_rejected").increment(1);
}

/// Track how many quality flags each ingested record carries.
pub fn record_quality_flags(count: usize) {
    ::metrics::histogram!("hazard_ingest_quality_flags_per_record").record(count as f64);
}
