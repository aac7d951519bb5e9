//! Basic example demonstrating per-client fixed-window throttling.
//!
//! This example runs one client into a small request limit, shows the
//! rate-limit headers a web layer would attach, and waits out the window
//! to show the budget coming back.

use client_throttle::{Decision, RequestInfo, Throttle};
use std::time::Duration;

fn print_outcome(label: &str, decision: &Decision) {
    match decision {
        Decision::Allowed { remaining, .. } => {
            println!("{label}: allowed ({remaining} left in this window)");
        }
        Decision::RateLimited { retry_after, .. } => {
            println!(
                "{label}: denied with 429, retry in {} seconds",
                retry_after.as_secs()
            );
        }
        Decision::Blacklisted => println!("{label}: denied with 403 (blacklisted)"),
    }
}

#[tokio::main]
async fn main() {
    // Route the default sink's log events to stdout
    tracing_subscriber::fmt().init();

    // Allow 3 requests per 5-second window
    let throttle = Throttle::builder()
        .with_limit(3)
        .with_window(Duration::from_secs(5))
        .build()
        .unwrap();

    println!("=== Basic Throttling Example ===\n");
    println!("Policy: 3 requests per client per 5-second window\n");

    let curl_client = RequestInfo {
        source_address: Some("203.0.113.7".to_string()),
        user_agent: "curl/8.4.0".to_string(),
        method: "GET".to_string(),
        path: "/api/search".to_string(),
    };

    println!("One client sends 5 requests back to back:");
    for attempt in 1..=5 {
        let decision = throttle.check(&curl_client).await.unwrap();
        print_outcome(&format!("  request {attempt}"), &decision);
    }

    println!("\nThe headers a web layer would attach to the last response:");
    let denied = throttle.check(&curl_client).await.unwrap();
    for (name, value) in denied.headers() {
        println!("  {name}: {value}");
    }
    if let Some(body) = denied.body() {
        println!("  body: {body}");
    }

    // A different user agent is a different client with its own budget
    println!("\nAnother client is unaffected:");
    let browser_client = RequestInfo {
        source_address: Some("203.0.113.7".to_string()),
        user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:109.0)".to_string(),
        method: "GET".to_string(),
        path: "/api/search".to_string(),
    };
    let decision = throttle.check(&browser_client).await.unwrap();
    print_outcome("  request 1", &decision);

    println!("\nWaiting 6 seconds for the window to pass...");
    tokio::time::sleep(Duration::from_secs(6)).await;

    println!("The first client gets a fresh budget:");
    let decision = throttle.check(&curl_client).await.unwrap();
    print_outcome("  request 1", &decision);

    let snapshot = throttle.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "Totals: {} allowed, {} denied ({:.0}% denial rate)",
        snapshot.requests_allowed,
        snapshot.requests_limited,
        snapshot.denial_rate() * 100.0
    );
}
