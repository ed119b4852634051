//! Synthetic period capture example.
//!
//! Feeds 20 seconds of a generated tone through a 15 second period pipeline
//! on a simulated clock, applies a clock correction halfway through, and
//! prints what the downstream consumer sees.
//!
//! Run with: cargo run --example synthetic_period

use std::sync::Arc;
use std::time::Duration;

use period_capture::{
    BlockWritten, ChannelNotifier, ManualClock, MockSource, PeriodCapture, SampleFormat,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Audio delivered per simulated callback.
const CHUNK_MS: u64 = 100;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Start two seconds before a period boundary
    let clock = Arc::new(ManualClock::new(13_000));
    let (tx, mut rx) = mpsc::channel::<BlockWritten>(256);

    let capture = Arc::new(
        PeriodCapture::builder()
            .period_secs(15)
            .clock(clock.clone())
            .notifier(ChannelNotifier::with_name("decoder", tx))
            .on_event(|e| println!("event: {e:?}"))
            .build()?,
    );

    let consumer = tokio::spawn(async move {
        let mut blocks = 0u64;
        let mut last = 0;
        while let Some(block) = rx.recv().await {
            blocks += 1;
            last = block.position;
        }
        (blocks, last)
    });

    let mut mock = MockSource::new(48000, 1);
    for step in 0..(20_000 / CHUNK_MS) {
        mock.generate_sine(1500.0, 0.3, CHUNK_MS);
        capture.ingest(&mock.to_bytes(SampleFormat::I16));
        mock.take_samples();
        clock.advance_ms(CHUNK_MS as i64);

        if step == 100 {
            // The clock source reports we were running 250 ms slow
            clock.advance_ms(250);
            let r = capture.resync();
            println!("resync: {} -> {} (delta {:+})", r.from, r.to, r.delta);
        }

        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let stats = capture.stats();
    let position = capture.position();
    drop(capture);

    let (blocks, last) = consumer.await?;
    println!("consumer saw {blocks} blocks, last position {last}");
    println!("final position {position}");
    println!("stats: {stats:?}");

    Ok(())
}
