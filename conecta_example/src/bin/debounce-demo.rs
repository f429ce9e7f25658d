use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use conecta_debounce::MessageDebouncer;

#[tokio::main]
async fn main() -> Result<()> {
    println!("Conecta Debouncer - Demo");
    println!("========================\n");

    // 1. One debouncer per process scope, short window for the demo
    let debouncer: MessageDebouncer<String> = MessageDebouncer::with_delay(Duration::from_millis(300));
    let (tx, rx) = mpsc::channel::<String>();

    // 2. Three fragments in quick succession under one conversation
    println!("1. Sending three rapid fragments for conv-1...");
    for fragment in ["Hey,", "can you help me", "with my order?"] {
        let tx = tx.clone();
        debouncer.add_fragment(
            "conv-1".to_string(),
            fragment,
            Box::new(move |joined, _| {
                let _ = tx.send(joined);
            }),
        );
        tokio::time::sleep(Duration::from_millis(80)).await;
    }

    println!(
        "   pending fragments: {}",
        debouncer.pending_fragment_count(&"conv-1".to_string())
    );

    // 3. Wait out the quiet window; the three fragments arrive as one
    println!("2. Waiting for the conversation to go quiet...");
    tokio::time::sleep(Duration::from_millis(400)).await;

    let joined = rx.recv()?;
    println!("   coalesced message:\n---\n{}\n---\n", joined);

    // 4. force_flush delivers immediately, without waiting
    println!("3. Buffering one fragment for conv-2 and force-flushing it...");
    let tx2 = tx.clone();
    debouncer.add_fragment(
        "conv-2".to_string(),
        "urgent!",
        Box::new(move |joined, _| {
            let _ = tx2.send(joined);
        }),
    );
    debouncer.force_flush(&"conv-2".to_string());
    println!("   flushed: {:?}", rx.recv()?);

    // 5. clear_all drops buffers silently
    println!("4. Buffering for conv-3 and clearing everything...");
    debouncer.add_fragment("conv-3".to_string(), "never delivered", Box::new(|_, _| {}));
    debouncer.clear_all();
    println!(
        "   conv-3 pending after clear: {}",
        debouncer.has_pending(&"conv-3".to_string())
    );

    println!("\nDone.");
    Ok(())
}
