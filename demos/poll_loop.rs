// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Polling loop example.
//!
//! Demonstrates:
//! 1. Publishing namespaces to an in-process config service
//! 2. Running the background poller against it
//! 3. Publishing a change and watching the snapshot follow
//! 4. Displaying metrics
//! 5. Clean shutdown
//!
//! # Run
//!
//! ```bash
//! cargo run --example poll_loop
//! ```

use std::sync::Arc;
use std::time::Duration;

use apollo_sync::{ApolloClient, ApolloClientConfig, MemoryTransport, Poller, RetryConfig};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║            apollo-sync: Polling Loop Example                  ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Publish the initial releases
    // ─────────────────────────────────────────────────────────────────────────
    let service = Arc::new(MemoryTransport::new());
    service.publish("common", [("db.port", "9999"), ("timeout", "30")]);
    service.publish("application", [("db.host", "db.internal"), ("db.port", "5432")]);
    println!("📦 Published: common, application");

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Start the poller
    // ─────────────────────────────────────────────────────────────────────────
    let dir = std::env::temp_dir().join("apollo-sync-demo");
    let path = dir.join("app.env");
    let config = ApolloClientConfig::new(
        "http://apollo.local:8080",
        "billing",
        vec!["common".into(), "application".into()],
    );
    let client = Arc::new(ApolloClient::with_transport(config, service.clone())?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(client.clone(), &path)
        .with_interval(Duration::from_millis(200))
        .with_backoff(RetryConfig::test());
    let handle = tokio::spawn(async move { poller.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("\n📄 Snapshot at {}:", path.display());
    print!("{}", tokio::fs::read_to_string(&path).await.unwrap_or_default());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Publish a change
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📝 Publishing application with a new db.host...");
    service.publish("application", [("db.host", "db-replica.internal"), ("db.port", "5432")]);
    tokio::time::sleep(Duration::from_millis(500)).await;
    print!("{}", tokio::fs::read_to_string(&path).await.unwrap_or_default());

    println!("\n🔑 Release keys:");
    for (namespace, key) in client.release_keys().await {
        println!("   └─ {}: {}", namespace, key);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Shut down and dump metrics
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🛑 Shutting down...");
    let _ = shutdown_tx.send(true);
    let stats = handle.await?;
    println!(
        "   └─ cycles={} written={} failures={}",
        stats.cycles, stats.written, stats.failures
    );

    println!("\n📈 Metrics:");
    dump_metrics(&snapshotter);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

/// Dump captured counters and gauges, sorted by name
fn dump_metrics(snapshotter: &Snapshotter) {
    let mut lines = Vec::new();

    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let (_, key) = composite_key.into_parts();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let label_str = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };

        let rendered = match value {
            DebugValue::Counter(v) => v.to_string(),
            DebugValue::Gauge(v) => format!("{:.2}", v.into_inner()),
            DebugValue::Histogram(samples) => format!("{} samples", samples.len()),
        };
        lines.push(format!("{}{} = {}", key.name(), label_str, rendered));
    }

    lines.sort();
    if lines.is_empty() {
        println!("   └─ (no metrics recorded)");
    }
    for line in &lines {
        println!("   └─ {}", line);
    }
}
