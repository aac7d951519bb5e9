//! Example demonstrating Redis-backed state for multi-instance throttling.
//!
//! This example shows how to share throttle state across application
//! instances through Redis. This is useful for:
//!
//! - Load-balanced services that need one budget per client, not one per replica
//! - Blacklists that must survive process restarts
//! - Horizontal scaling scenarios where local state isn't sufficient
//!
//! # Quick Start
//!
//! 1. Start Redis:
//!    ```bash
//!    docker run -p 6379:6379 redis:7-alpine
//!    ```
//!
//! 2. Run the example (from project root):
//!    ```bash
//!    cargo run --example redis --features redis-cache
//!    ```
//!
//! Run it twice in quick succession and the second run starts with the
//! budget the first run already spent.

use client_throttle::{Decision, RedisCache, RedisCacheConfig, RequestInfo, Throttle};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    println!("=== Redis-Backed Throttling Example ===\n");

    let config = RedisCacheConfig {
        key_prefix: "demo-throttle:".to_string(),
    };
    let cache = match RedisCache::connect_with_config("redis://127.0.0.1/", config).await {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("Could not connect to Redis at redis://127.0.0.1/: {err}");
            eprintln!("Start one with: docker run -p 6379:6379 redis:7-alpine");
            return;
        }
    };

    // Allow 5 requests per client per 30-second window, shared via Redis
    let throttle = Throttle::builder()
        .with_limit(5)
        .with_window(Duration::from_secs(30))
        .with_cache(Arc::new(cache))
        .build()
        .unwrap();

    let client = RequestInfo {
        source_address: Some("203.0.113.99".to_string()),
        user_agent: "redis-demo/1.0".to_string(),
        method: "GET".to_string(),
        path: "/api/data".to_string(),
    };

    println!("Policy: 5 requests per 30-second window, state in Redis\n");
    println!("Sending 3 requests from this process:");
    for attempt in 1..=3 {
        match throttle.check(&client).await {
            Ok(Decision::Allowed { remaining, .. }) => {
                println!("  request {attempt}: allowed ({remaining} left, counting all processes)");
            }
            Ok(Decision::RateLimited { retry_after, .. }) => {
                println!(
                    "  request {attempt}: denied with 429, retry in {} seconds",
                    retry_after.as_secs()
                );
            }
            Ok(Decision::Blacklisted) => println!("  request {attempt}: blocked with 403"),
            Err(err) => {
                // Fail open: log and let the request through
                eprintln!("  request {attempt}: storage error, admitting anyway: {err}");
            }
        }
    }

    println!("\n=== Example Complete ===");
    println!("Run this example again within 30 seconds: the remaining budget");
    println!("carries over because the window lives in Redis, not the process.");
}
