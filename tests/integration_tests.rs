use agri_hub::store::NOT_AVAILABLE;
use agri_hub::{send_reading, IngestConfig, IngestServer, MetricStore, WaterChange};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_test::assert_ok;

const WAIT: Duration = Duration::from_secs(2);

struct RunningHub {
    addr: String,
    store: Arc<MetricStore>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<agri_hub::Result<()>>,
}

impl RunningHub {
    async fn start() -> Self {
        Self::start_with(IngestConfig::new("127.0.0.1", 0)).await
    }

    async fn start_with(config: IngestConfig) -> Self {
        let store = Arc::new(MetricStore::with_capacity(config.history_capacity));
        let server = IngestServer::bind(config, Arc::clone(&store))
            .await
            .expect("Should bind sensor listener");
        let addr: SocketAddr = server.local_addr().expect("Should report local address");

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(server.run_until(async {
            let _ = stopped.await;
        }));

        Self {
            addr: addr.to_string(),
            store,
            stop,
            task,
        }
    }

    async fn send(&self, line: &str) -> Option<String> {
        assert_ok!(send_reading(&self.addr, line, WAIT).await)
    }

    async fn shutdown(self) {
        let _ = self.stop.send(());
        let result = timeout(WAIT, self.task)
            .await
            .expect("Server should stop promptly")
            .expect("Server task should not panic");
        assert_ok!(result);
    }
}

#[tokio::test]
async fn test_water_reading_end_to_end() {
    let hub = RunningHub::start().await;

    let ack = hub.send("Water level: 5.40 cm. (Initial reading)").await;
    assert_eq!(ack.as_deref(), Some("OK"));

    let view = hub.store.snapshot();
    assert_eq!(view.current_water, "Water level: 5.40 cm. (Initial reading)");
    assert_eq!(view.water_history.len(), 1);
    assert_eq!(view.latest_water_cm(), Some(5.40));

    hub.shutdown().await;
}

#[tokio::test]
async fn test_pest_events_then_total() {
    let hub = RunningHub::start().await;

    for _ in 0..3 {
        assert_eq!(hub.send("Pest Detected").await.as_deref(), Some("OK"));
    }
    let view = hub.store.snapshot();
    assert_eq!(view.pest_count, 3);
    assert_eq!(view.current_pest_state, "Pest Detected");
    assert_eq!(view.pest_history.len(), 3);

    assert_eq!(
        hub.send("Total Pests Detected: 10").await.as_deref(),
        Some("OK")
    );
    let view = hub.store.snapshot();
    assert_eq!(view.pest_count, 10);
    assert_eq!(view.latest_pest_total(), Some(10));
    assert_eq!(view.pest_total_history.len(), 1);
    // The total only updates the count
    assert_eq!(view.pest_history.len(), 3);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_climate_reading_end_to_end() {
    let hub = RunningHub::start().await;

    let ack = hub
        .send("Temperature: 23.5 °C (Δ —)   Humidity: 55.0% (Δ —)")
        .await;
    assert_eq!(ack.as_deref(), Some("OK"));

    let view = hub.store.snapshot();
    assert_eq!(view.current_temp, "23.5 °C");
    assert_eq!(view.current_hum, "55.0 %");
    let sample = view.latest_climate().expect("Should record a climate sample");
    assert_eq!(sample.temperature_c, 23.5);
    assert_eq!(sample.humidity_pct, 55.0);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_malformed_lines_are_acknowledged_and_ignored() {
    let hub = RunningHub::start().await;
    let before = hub.store.snapshot();

    assert_eq!(
        hub.send("Total Pests Detected: many").await.as_deref(),
        Some("OK")
    );
    assert_eq!(hub.send("hello hub").await.as_deref(), Some("OK"));
    assert_eq!(
        hub.send("Temperature: 23.5 °C (Δ —)").await.as_deref(),
        Some("OK")
    );

    let after = hub.store.snapshot();
    assert_eq!(before, after);
    assert_eq!(after.current_water, NOT_AVAILABLE);
    assert_eq!(after.current_temp, NOT_AVAILABLE);
    assert_eq!(after.pest_count, 0);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_empty_connection_gets_no_acknowledgement() {
    let hub = RunningHub::start().await;

    let mut stream = assert_ok!(TcpStream::connect(&hub.addr).await);
    assert_ok!(stream.shutdown().await);

    let mut buf = Vec::new();
    let read = timeout(WAIT, stream.read_to_end(&mut buf))
        .await
        .expect("Server should close the connection");
    assert_ok!(read);
    assert!(buf.is_empty());

    hub.shutdown().await;
}

#[tokio::test]
async fn test_silent_client_times_out_without_blocking_others() {
    let config = IngestConfig::new("127.0.0.1", 0).with_read_timeout_ms(200);
    let hub = RunningHub::start_with(config).await;

    // Holds its connection open without sending anything
    let _silent = assert_ok!(TcpStream::connect(&hub.addr).await);

    let ack = hub.send("Pest Detected").await;
    assert_eq!(ack.as_deref(), Some("OK"));
    assert_eq!(hub.store.snapshot().pest_count, 1);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_clients_are_all_applied() {
    let hub = RunningHub::start().await;
    let addr = hub.addr.clone();

    let mut clients = Vec::new();
    for i in 0..20 {
        let addr = addr.clone();
        clients.push(tokio::spawn(async move {
            let line = if i % 2 == 0 {
                "Pest Detected".to_string()
            } else {
                format!("Water level: {}.00 cm. (No significant change)", i)
            };
            send_reading(&addr, &line, WAIT).await
        }));
    }
    for client in clients {
        let ack = assert_ok!(client.await.expect("Client task should not panic"));
        assert_eq!(ack.as_deref(), Some("OK"));
    }

    let view = hub.store.snapshot();
    assert_eq!(view.pest_count, 10);
    assert_eq!(view.pest_history.len(), 10);
    assert_eq!(view.water_history.len(), 10);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_history_capacity_is_respected() {
    let config = IngestConfig::new("127.0.0.1", 0).with_history_capacity(3);
    let hub = RunningHub::start_with(config).await;

    for total in 1..=5u64 {
        hub.send(&format!("Total Pests Detected: {}", total)).await;
    }

    let view = hub.store.snapshot();
    let totals: Vec<u64> = view.pest_total_history.iter().map(|s| s.value).collect();
    assert_eq!(totals, vec![3, 4, 5]);
    assert_eq!(view.pest_count, 5);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_snapshots_never_observe_partial_climate_updates() {
    let store = Arc::new(MetricStore::with_capacity(50));

    let writer = {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || {
            for i in 0..2000 {
                let value = f64::from(i % 100);
                let line = format!(
                    "Temperature: {:.1} °C (Δ —)   Humidity: {:.1}% (Δ —)",
                    value, value
                );
                store.apply(&agri_hub::classify(&line), chrono::Utc::now());
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || {
            for _ in 0..2000 {
                let view = store.snapshot();
                if view.current_temp == NOT_AVAILABLE {
                    assert_eq!(view.current_hum, NOT_AVAILABLE);
                    continue;
                }
                let temp = view.current_temp.trim_end_matches(" °C");
                let hum = view.current_hum.trim_end_matches(" %");
                assert_eq!(temp, hum, "temperature and humidity from different applies");
                let latest = view.latest_climate().expect("Climate history should be populated");
                assert_eq!(latest.temperature_c, latest.humidity_pct);
                assert!(view.climate_history.len() <= 50);
            }
        })
    };

    assert_ok!(writer.await);
    assert_ok!(reader.await);
}

#[tokio::test]
async fn test_listener_closed_after_shutdown() {
    let hub = RunningHub::start().await;
    let addr = hub.addr.clone();

    assert_eq!(hub.send("Pest Detected").await.as_deref(), Some("OK"));
    hub.shutdown().await;

    assert!(TcpStream::connect(&addr).await.is_err());
    assert!(send_reading(&addr, "Pest Detected", WAIT).await.is_err());
}

#[tokio::test]
async fn test_water_change_kinds_are_tracked() {
    let hub = RunningHub::start().await;

    hub.send("Water level: 5.40 cm. (Initial reading)").await;
    hub.send("Water level: 6.00 cm. Water added: 0.60 cm.").await;
    hub.send("Water level: 5.75 cm. Water evaporated: 0.25 cm.").await;

    let view = hub.store.snapshot();
    assert_eq!(view.water_history.len(), 3);
    assert_eq!(view.latest_water_cm(), Some(5.75));

    let kinds: Vec<WaterChange> = view
        .water_history
        .iter()
        .filter_map(|entry| match agri_hub::classify(&entry.value) {
            agri_hub::Reading::WaterLevel(level) => Some(level.change),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            WaterChange::Initial,
            WaterChange::Added,
            WaterChange::Evaporated
        ]
    );

    hub.shutdown().await;
}
