use std::sync::Arc;
use std::time::Duration;

use andon_core::MonitoringConfig;
use andon_engine::{AndonEngine, TickScheduler};

fn engine() -> Arc<AndonEngine> {
    Arc::new(AndonEngine::new(MonitoringConfig::with_stages(["cart", "paid"])).unwrap())
}

#[tokio::test(start_paused = true)]
async fn ticks_at_fixed_rate_until_shutdown() {
    let engine = engine();
    let scheduler = TickScheduler::spawn(engine.clone(), Duration::from_secs(60));

    // Ticks at 0s, 60s, 120s and 180s.
    tokio::time::sleep(Duration::from_secs(210)).await;
    let ticks = scheduler.shutdown().await;

    assert_eq!(ticks, 4);
    assert_eq!(engine.metrics().snapshot().ticks_completed, 4);
}

#[tokio::test(start_paused = true)]
async fn period_comes_from_config() {
    let mut config = MonitoringConfig::with_stages(["cart", "paid"]);
    config.tick_interval_secs = 10;
    let engine = Arc::new(AndonEngine::new(config).unwrap());
    let scheduler = TickScheduler::from_config(engine.clone());

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(scheduler.shutdown().await, 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_further_ticks() {
    let engine = engine();
    let scheduler = TickScheduler::spawn(engine.clone(), Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(scheduler.shutdown().await, 1);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(engine.metrics().snapshot().ticks_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn zero_period_is_clamped() {
    let scheduler = TickScheduler::spawn(engine(), Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(scheduler.shutdown().await >= 1);
}
