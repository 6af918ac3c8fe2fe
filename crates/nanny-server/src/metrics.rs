use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// 初始化 Prometheus metrics exporter
pub fn init_metrics(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    // 描述所有指标
    nanny_engine::metrics::describe_metrics();

    tracing::info!("Metrics exporter started on http://{}/metrics", addr);
    Ok(())
}
