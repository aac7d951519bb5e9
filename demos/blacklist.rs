//! Example demonstrating violation tracking and blacklist escalation.
//!
//! An abusive client keeps hammering a small limit. Each denied request
//! records a violation; at the configured threshold the client is
//! permanently blacklisted and every later request is blocked outright,
//! even after the rate-limit window has long passed.

use client_throttle::{Decision, RequestInfo, Throttle};
use std::time::Duration;

fn print_outcome(label: &str, decision: &Decision) {
    match decision {
        Decision::Allowed { remaining, .. } => {
            println!("{label}: allowed ({remaining} left in this window)");
        }
        Decision::RateLimited {
            violations,
            escalated,
            ..
        } => match violations {
            Some(count) if *escalated => {
                println!("{label}: denied with 429, violation {count} - blacklisted!");
            }
            Some(count) => println!("{label}: denied with 429, violation {count}"),
            None => println!("{label}: denied with 429"),
        },
        Decision::Blacklisted => println!("{label}: blocked with 403 (blacklisted)"),
    }
}

#[tokio::main]
async fn main() {
    // Route the default sink's log events to stdout; the escalation shows
    // up as a tracing error event
    tracing_subscriber::fmt().init();

    // Allow 2 requests per 3-second window, blacklist after 3 violations
    let throttle = Throttle::builder()
        .with_limit(2)
        .with_window(Duration::from_secs(3))
        .with_blacklist_threshold(3)
        .build()
        .unwrap();

    println!("=== Blacklist Escalation Example ===\n");
    println!("Policy: 2 requests per 3-second window, blacklist at 3 violations\n");

    let scraper = RequestInfo {
        source_address: Some("198.51.100.23".to_string()),
        user_agent: "scraper-bot/0.2".to_string(),
        method: "GET".to_string(),
        path: "/api/listings".to_string(),
    };

    println!("An aggressive client sends 6 requests at once:");
    for attempt in 1..=6 {
        let decision = throttle.check(&scraper).await.unwrap();
        print_outcome(&format!("  request {attempt}"), &decision);
    }

    println!("\nEvery further request is blocked before any counting:");
    let blocked = throttle.check(&scraper).await.unwrap();
    print_outcome("  request 7", &blocked);
    if let Some(body) = blocked.body() {
        println!("  body: {body}");
    }

    println!("\nWaiting 4 seconds, past the rate-limit window...");
    tokio::time::sleep(Duration::from_secs(4)).await;

    println!("The window reset does not lift the blacklist:");
    let decision = throttle.check(&scraper).await.unwrap();
    print_outcome("  request 8", &decision);

    // Other clients keep their normal budget throughout
    println!("\nA well-behaved client is untouched:");
    let reader = RequestInfo {
        source_address: Some("203.0.113.50".to_string()),
        user_agent: "feed-reader/1.1".to_string(),
        method: "GET".to_string(),
        path: "/api/listings".to_string(),
    };
    let decision = throttle.check(&reader).await.unwrap();
    print_outcome("  request 1", &decision);

    let snapshot = throttle.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "Totals: {} allowed, {} rate limited, {} blacklist blocks",
        snapshot.requests_allowed, snapshot.requests_limited, snapshot.blacklist_hits
    );
    println!("Notice: the blacklist flag is permanent; remove the client's");
    println!("blacklist entry from the cache backend to unblock it.");
}
