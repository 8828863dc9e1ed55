//! User Registration Example
//!
//! A registration flow that mixes synchronous validation with asynchronous
//! lookups. Demonstrates:
//! - short-circuiting on the first failure
//! - caller-defined error codes next to the built-in ones
//! - a panicking step turned into a failure instead of unwinding
//! - tracing events for every normalized failure
//!
//! Run with: cargo run --example registration --features tracing

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use sluice::prelude::*;

const EMAIL_TAKEN: ErrorCode = ErrorCode::from_static("email-taken");

#[derive(Debug, Clone)]
struct Registration {
    name: String,
    email: String,
}

#[derive(Debug, Clone)]
struct Account {
    id: u64,
    name: String,
}

struct Directory {
    emails: HashSet<String>,
}

impl Directory {
    async fn is_taken(&self, email: &str) -> bool {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.emails.contains(email)
    }
}

fn validate(reg: Registration) -> Outcome<Registration> {
    if reg.name.trim().is_empty() {
        return Outcome::failure_with_message("Name is required", ErrorCode::VALIDATION_FAILED);
    }
    if !reg.email.contains('@') {
        return Outcome::failure_with_message("Email must contain @", ErrorCode::VALIDATION_FAILED);
    }
    Outcome::success_with_message(reg, "validated")
}

async fn reserve_email(dir: Arc<Directory>, reg: Registration) -> Outcome<Registration> {
    if dir.is_taken(&reg.email).await {
        Outcome::failure_with_message(format!("{} is already registered", reg.email), EMAIL_TAKEN)
    } else {
        Outcome::success_with_message(reg, "email reserved")
    }
}

fn create_account(reg: Registration) -> Outcome<Account> {
    // Simulates a bug deep inside a dependency.
    if reg.name == "crash" {
        panic!("account store unavailable");
    }
    Outcome::success_with_message(
        Account {
            id: reg.name.len() as u64 * 1000,
            name: reg.name,
        },
        "account created",
    )
}

async fn register(dir: Arc<Directory>, reg: Registration) -> Outcome<Account> {
    Outcome::success(reg)
        .then(validate)
        .then_async(move |reg| reserve_email(dir, reg))
        .then(create_account)
        .instrument(tracing::info_span!("register"))
        .await
}

fn report(label: &str, outcome: &Outcome<Account>) {
    match outcome {
        Outcome::Success(s) => println!(
            "{label}: ok #{} {} ({})",
            s.data().id,
            s.data().name,
            s.message()
        ),
        Outcome::Failure(f) => println!("{label}: {}", f),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let dir = Arc::new(Directory {
        emails: ["bob@example.com".to_string()].into_iter().collect(),
    });

    let attempts = [
        ("new user", "ada", "ada@example.com"),
        ("bad email", "eve", "eve.example.com"),
        ("taken email", "bob", "bob@example.com"),
        ("panicking step", "crash", "crash@example.com"),
    ];

    for (label, name, email) in attempts {
        let reg = Registration {
            name: name.to_string(),
            email: email.to_string(),
        };
        let outcome = register(dir.clone(), reg).await;
        report(label, &outcome);

        if outcome.error_code() == Some(&EMAIL_TAKEN) {
            println!("  -> suggest signing in instead");
        }
        if let Some(cause) = outcome.cause() {
            println!("  -> cause: {}", cause);
        }
    }
}
