//! Timing behavior of the debouncer, driven on a paused tokio clock so the
//! windows are exact rather than wall-clock-approximate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use conecta_debounce::{FlushCallback, MessageDebouncer};
use tokio::time::advance;

/// Shared recorder for flushed messages.
type Fired = Arc<Mutex<Vec<String>>>;

fn recorder() -> (Fired, FlushCallback) {
    let fired: Fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    (fired, Box::new(move |text, _| sink.lock().unwrap().push(text)))
}

fn record_into(fired: &Fired) -> FlushCallback {
    let sink = Arc::clone(fired);
    Box::new(move |text, _| sink.lock().unwrap().push(text))
}

/// Let spawned timer tasks register their sleeps / run their flushes.
/// Yields only; never advances the paused clock.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn coalesces_rapid_fragments_into_one_message() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (fired, cb) = recorder();

    debouncer.add_fragment("conv", "a", cb);
    settle().await;
    advance(Duration::from_millis(10)).await;
    debouncer.add_fragment("conv", "b", record_into(&fired));
    settle().await;
    advance(Duration::from_millis(10)).await;
    debouncer.add_fragment("conv", "c", record_into(&fired));
    settle().await;

    advance(Duration::from_millis(100)).await;
    settle().await;

    assert_eq!(*fired.lock().unwrap(), vec!["a\nb\nc".to_string()]);
    assert!(!debouncer.has_pending(&"conv"));
}

#[tokio::test(start_paused = true)]
async fn window_restarts_on_each_fragment() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (fired, cb) = recorder();

    // First fragment at t=0, second at t=90: nothing may fire before t=190.
    debouncer.add_fragment("conv", "first", cb);
    settle().await;
    advance(Duration::from_millis(90)).await;
    settle().await;
    debouncer.add_fragment("conv", "second", record_into(&fired));
    settle().await;

    advance(Duration::from_millis(99)).await;
    settle().await;
    assert!(fired.lock().unwrap().is_empty(), "fired before t=190");
    assert!(debouncer.has_pending(&"conv"));

    advance(Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(*fired.lock().unwrap(), vec!["first\nsecond".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn keys_are_isolated() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (fired_x, cb_x) = recorder();
    let (fired_y, cb_y) = recorder();

    debouncer.add_fragment("x", "from-x", cb_x);
    settle().await;
    advance(Duration::from_millis(50)).await;
    settle().await;
    debouncer.add_fragment("y", "from-y", cb_y);
    settle().await;

    // X's timer fires at t=100; Y's buffer must survive it untouched.
    advance(Duration::from_millis(50)).await;
    settle().await;
    assert_eq!(*fired_x.lock().unwrap(), vec!["from-x".to_string()]);
    assert!(fired_y.lock().unwrap().is_empty());
    assert!(debouncer.has_pending(&"y"));
    assert_eq!(debouncer.pending_fragment_count(&"y"), 1);

    advance(Duration::from_millis(50)).await;
    settle().await;
    assert_eq!(*fired_y.lock().unwrap(), vec!["from-y".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn force_flush_is_immediate_and_stale_timer_is_noop() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (fired, cb) = recorder();

    debouncer.add_fragment("conv", "a", cb);
    settle().await;
    debouncer.add_fragment("conv", "b", record_into(&fired));
    settle().await;

    // Synchronous: the callback has run before force_flush returns.
    assert!(debouncer.force_flush(&"conv"));
    assert_eq!(*fired.lock().unwrap(), vec!["a\nb".to_string()]);
    assert!(!debouncer.has_pending(&"conv"));

    // Let the original deadline pass; the old timer must not double-flush.
    advance(Duration::from_millis(200)).await;
    settle().await;
    assert_eq!(fired.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn clear_all_discards_silently() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (fired, cb) = recorder();

    debouncer.add_fragment("x", "a", cb);
    debouncer.add_fragment("y", "b", record_into(&fired));
    settle().await;

    debouncer.clear_all();
    assert!(!debouncer.has_pending(&"x"));
    assert!(!debouncer.has_pending(&"y"));

    advance(Duration::from_millis(500)).await;
    settle().await;
    assert!(fired.lock().unwrap().is_empty(), "clear_all must never invoke callbacks");
}

#[tokio::test(start_paused = true)]
async fn hello_world_two_fragment_scenario() {
    // addFragment at t=0 and t=30 with a 50ms window: quiet until t=80,
    // so nothing at t=60 and everything by t=90.
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(50));
    let (fired, cb) = recorder();

    debouncer.add_fragment("conv1", "Hello", cb);
    settle().await;
    advance(Duration::from_millis(30)).await;
    settle().await;
    debouncer.add_fragment("conv1", "world", record_into(&fired));
    settle().await;

    advance(Duration::from_millis(30)).await;
    settle().await;
    assert!(fired.lock().unwrap().is_empty(), "fired at t=60");

    advance(Duration::from_millis(30)).await;
    settle().await;
    assert_eq!(*fired.lock().unwrap(), vec!["Hello\nworld".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn key_that_never_goes_quiet_never_times_out() {
    // Intended starvation behavior: the window restarts rather than
    // accumulating, so a chatty key only terminates via force_flush.
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (fired, cb) = recorder();

    debouncer.add_fragment("chatty", "0", cb);
    settle().await;
    for i in 1..20 {
        advance(Duration::from_millis(50)).await;
        settle().await;
        debouncer.add_fragment("chatty", format!("{}", i), record_into(&fired));
        settle().await;
    }

    // 1000ms of fragments, ten windows' worth, and still pending.
    assert!(fired.lock().unwrap().is_empty());
    assert_eq!(debouncer.pending_fragment_count(&"chatty"), 20);

    assert!(debouncer.force_flush(&"chatty"));
    let flushed = fired.lock().unwrap();
    assert_eq!(flushed.len(), 1);
    assert!(flushed[0].starts_with("0\n1\n"));
    assert!(flushed[0].ends_with("\n19"));
}

#[tokio::test(start_paused = true)]
async fn first_callback_wins_for_a_pending_key() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (first, cb_first) = recorder();
    let (second, cb_second) = recorder();

    debouncer.add_fragment("conv", "a", cb_first);
    settle().await;
    debouncer.add_fragment("conv", "b", cb_second);
    settle().await;

    advance(Duration::from_millis(100)).await;
    settle().await;

    assert_eq!(*first.lock().unwrap(), vec!["a\nb".to_string()]);
    assert!(second.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_delay_flushes_on_next_tick() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::ZERO);
    let (fired, cb) = recorder();

    debouncer.add_fragment("conv", "now", cb);
    // Not inline: the flush still routes through the timer task.
    assert!(debouncer.has_pending(&"conv"));

    settle().await;
    assert_eq!(*fired.lock().unwrap(), vec!["now".to_string()]);
    assert!(!debouncer.has_pending(&"conv"));
}

#[tokio::test(start_paused = true)]
async fn set_default_delay_affects_only_future_calls() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let (slow, cb_slow) = recorder();
    let (fast, cb_fast) = recorder();

    debouncer.add_fragment("slow", "s", cb_slow);
    settle().await;

    debouncer.set_default_delay(Duration::from_millis(10));
    debouncer.add_fragment("fast", "f", cb_fast);
    settle().await;

    advance(Duration::from_millis(10)).await;
    settle().await;
    assert_eq!(*fast.lock().unwrap(), vec!["f".to_string()]);
    assert!(slow.lock().unwrap().is_empty(), "in-flight timer must keep its delay");

    advance(Duration::from_millis(90)).await;
    settle().await;
    assert_eq!(*slow.lock().unwrap(), vec!["s".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn flush_reports_fragment_count_not_newline_count() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));
    let seen: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    // A fragment carrying its own newline must still count as one.
    debouncer.add_fragment(
        "conv",
        "first line\nsecond line",
        Box::new(move |text, count| sink.lock().unwrap().push((text, count))),
    );
    settle().await;
    debouncer.add_fragment("conv", "third", Box::new(|_, _| {}));
    settle().await;

    advance(Duration::from_millis(100)).await;
    settle().await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "first line\nsecond line\nthird");
    assert_eq!(seen[0].1, 2);
}

#[tokio::test(start_paused = true)]
async fn panicking_callback_does_not_resurrect_buffer() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(100));

    debouncer.add_fragment("conv", "boom", Box::new(|_, _| panic!("downstream failure")));
    settle().await;
    advance(Duration::from_millis(100)).await;
    settle().await;

    // The panic unwound inside the timer task; the buffer stays gone.
    assert!(!debouncer.has_pending(&"conv"));
    assert_eq!(debouncer.pending_fragment_count(&"conv"), 0);

    // The key is immediately usable again with a fresh callback.
    let (fired, cb) = recorder();
    debouncer.add_fragment("conv", "after", cb);
    settle().await;
    advance(Duration::from_millis(100)).await;
    settle().await;
    assert_eq!(*fired.lock().unwrap(), vec!["after".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn callback_may_reenter_the_debouncer() {
    let debouncer: MessageDebouncer<&str> = MessageDebouncer::with_delay(Duration::from_millis(50));
    let (fired, _) = recorder();

    let reentrant = debouncer.clone();
    let sink = Arc::clone(&fired);
    debouncer.add_fragment(
        "conv",
        "ping",
        Box::new(move |text, _| {
            sink.lock().unwrap().push(text);
            // No lock is held during delivery, so this must not deadlock.
            reentrant.add_fragment("followup", "pong", Box::new(|_, _| {}));
        }),
    );
    settle().await;

    advance(Duration::from_millis(50)).await;
    settle().await;

    assert_eq!(*fired.lock().unwrap(), vec!["ping".to_string()]);
    assert!(debouncer.has_pending(&"followup"));
}
