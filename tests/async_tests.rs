//! Reaper driven by a tokio runtime.
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use ttlcache::{Cache, Config, NO_EXPIRATION};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runtime_reaper_sweeps() {
    let config = Config::default()
        .with_sweep_interval(Duration::from_millis(10))
        .with_runtime(Handle::current());
    let cache = Cache::with_config(config);
    assert!(cache.has_reaper());

    cache.set("short", 1, Duration::from_millis(5));
    cache.set("long", 2, NO_EXPIRATION);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(cache.count(), 1);
    assert_eq!(cache.get("long"), Some(2));

    cache.close();
    assert!(!cache.has_reaper());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shared_across_tasks() {
    let config = Config::new(Duration::from_secs(60), Duration::from_millis(5))
        .with_runtime(Handle::current());
    let cache = Arc::new(Cache::with_config(config));

    let tasks: Vec<_> = (0..4u32)
        .map(|t| {
            let c = cache.clone();
            tokio::spawn(async move {
                for i in 0..100u32 {
                    c.set(t * 1000 + i, i, Duration::ZERO);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(cache.count(), 400);
    assert_eq!(cache.get(&3005), Some(5));
}

#[tokio::test]
async fn test_thread_reaper_inside_runtime() {
    // Without a runtime handle the reaper runs on its own thread
    let cache = Cache::new(Duration::ZERO, Duration::from_millis(10));
    cache.set("k", 1, Duration::from_millis(1));

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.count(), 0);
}

#[test]
#[should_panic(expected = "timers are disabled")]
fn test_runtime_without_timers_fails_at_construction() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .unwrap();

    let config = Config::new(Duration::ZERO, Duration::from_millis(5))
        .with_runtime(runtime.handle().clone());
    let _cache: Cache<&str, u32> = Cache::with_config(config);
}

#[test]
fn test_reaper_gone_after_runtime_shutdown() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();

    let config = Config::new(Duration::ZERO, Duration::from_millis(5))
        .with_runtime(runtime.handle().clone());
    let cache = Cache::with_config(config);
    cache.set("k", 1, Duration::from_millis(1));
    assert!(cache.has_reaper());

    runtime.shutdown_timeout(Duration::from_secs(1));
    assert!(!cache.has_reaper());

    // Lazy expiry and manual sweeps keep working
    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(cache.get("k"), None);
    cache.delete_expired();
    assert_eq!(cache.count(), 0);
}
