use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use conecta::prelude::*;

/// Prints each coalesced message and declines to reply, so the demo
/// never needs stored channel credentials.
struct PrintResponder;

#[async_trait]
impl Responder for PrintResponder {
    async fn respond(&self, message: &CoalescedMessage) -> Result<Option<String>> {
        println!(
            "   [responder] {} fragment(s) from {} on {}:",
            message.fragment_count, message.sender_id, message.channel
        );
        for line in message.text.lines() {
            println!("   [responder]   > {}", line);
        }
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("Conecta Relay - Demo");
    println!("====================\n");

    // The mongodb driver connects lazily, so the demo runs without a
    // live database as long as the responder never asks to reply.
    println!("1. Building a relay with a 400ms debounce window...");
    let relay = RelayBuilder::new()
        .mongodb("mongodb://localhost:27017", "conecta_demo")
        .debounce_delay_ms(400)
        .responder(Arc::new(PrintResponder))
        .build()
        .await?;

    println!("2. Ingesting a burst of WhatsApp fragments for conv-1...");
    for text in ["Hi!", "I ordered yesterday", "order #1234", "any update?"] {
        let fragment = InboundFragment::new(ChannelKind::Whatsapp, "conv-1", "user-42", text);
        let pending = relay.ingest_fragment("org-demo", fragment);
        println!("   buffered \"{}\" ({} pending)", text, pending);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    println!("3. Conversation goes quiet; fragments coalesce...");
    tokio::time::sleep(Duration::from_millis(600)).await;

    println!("\n4. A second conversation, force-flushed before the window elapses...");
    let fragment = InboundFragment::new(ChannelKind::Telegram, "conv-2", "user-7", "ping");
    relay.ingest_fragment("org-demo", fragment);
    relay.force_flush("org-demo", ChannelKind::Telegram, "conv-2");
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\nDone.");
    Ok(())
}
