//! Chat Bot Example
//!
//! An end-to-end style test of a tiny chat bot: a fake gateway emits
//! `messageCreate` events, the bot answers `!ping` with `pong` after a short
//! delay, and the test waits for the bot's reply by describing only the
//! fields it cares about.
//!
//! Run with `RUST_LOG=lookout=debug` to see listeners being registered and
//! removed, and `RUST_LOG=lookout=trace` to see every rejected occurrence.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use lookout::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Plays the role of a chat gateway shared by the bot and the test.
struct Gateway {
    events: Emitter,
    next_message: AtomicU64,
}

impl Gateway {
    fn post(&self, author: &str, bot: bool, content: &str) {
        let message = json!({
            "id": self.next_message.fetch_add(1, Ordering::Relaxed).to_string(),
            "content": content,
            "author": {"name": author, "bot": bot},
            "attachments": [],
        });
        self.events.emit("messageCreate", &[Value::from(message)]);
    }
}

impl EventSource for Gateway {
    fn on(&self, event: &str, id: ListenerId, handler: Handler) {
        self.events.on(event, id, handler);
    }

    fn off(&self, event: &str, id: ListenerId) -> bool {
        self.events.off(event, id)
    }
}

/// Answers `!ping` from a spawned task, the way a real bot replies over the network.
fn start_bot(gateway: Arc<Gateway>) {
    let replies = gateway.clone();
    gateway.on(
        "messageCreate",
        ListenerId::new(),
        Arc::new(move |args: &[Value]| {
            let Some(message) = args.first() else { return };
            let from_bot = message
                .get("author")
                .and_then(|author| author.get("bot"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if from_bot || message.get("content").and_then(Value::as_str) != Some("!ping") {
                return;
            }
            let replies = replies.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                replies.post("bot", true, "pong");
            });
        }),
    );
}

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let gateway = Arc::new(Gateway {
        events: Emitter::new(),
        next_message: AtomicU64::new(1),
    });
    start_bot(gateway.clone());

    let waiter = EventWaiter::with_config(
        gateway.clone(),
        Config::default().with_default_time_limit(Duration::from_millis(500)),
    );

    // The reply must come from a bot, say pong, and carry a string id.
    let spec = Spec::from(json!({"content": "pong", "author": {"bot": true}}))
        .field("id", predicate!(|id: &Value| id.as_str().is_some()));

    let reply = waiter
        .wait_for_event("messageCreate", Projection::first(), spec.clone())
        .start();
    gateway.post("ana", false, "hello");
    gateway.post("ana", false, "!ping");

    let message = reply.await?;
    println!("bot replied: {message}");

    // Nobody asks, so nothing arrives: the error lists what was checked.
    let silence = waiter
        .wait_for_event("messageCreate", Projection::first(), spec)
        .within(Duration::from_millis(100))
        .start();
    gateway.post("bo", false, "anyone here?");

    match silence.await {
        Ok(message) => println!("unexpected reply: {message}"),
        Err(Error::Timeout(timeout)) => println!("{timeout}"),
        Err(e) => return Err(e),
    }

    Ok(())
}
