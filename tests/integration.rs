//! Integration tests for period-capture.
//!
//! Every test drives time through a `ManualClock`, so none depend on when
//! they run.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use period_capture::{
    BlockWritten, BufferMode, CaptureConfig, CaptureEvent, ChannelNotifier, ChannelSelection,
    Clock, ManualClock, MockSource, PeriodCapture, Reposition, SampleFormat,
};
use tokio::sync::mpsc;

/// 48 kHz mono i16, 15 s period, /4, 256-sample blocks.
fn scenario_capture(clock: Arc<ManualClock>) -> (PeriodCapture, Arc<Mutex<Vec<BlockWritten>>>) {
    let blocks = Arc::new(Mutex::new(Vec::new()));
    let sink = blocks.clone();

    let capture = PeriodCapture::builder()
        .input_sample_rate(48000)
        .period_secs(15)
        .decimation(4, &period_capture::pipeline::LOWPASS_48K_TO_12K)
        .block_size(256)
        .clock(clock)
        .on_block(move |block: &BlockWritten| sink.lock().push(*block))
        .build()
        .unwrap();

    (capture, blocks)
}

/// One second fills the buffer exactly: 48 blocks of 250 samples.
fn one_second_config() -> CaptureConfig {
    CaptureConfig {
        period_secs: 1,
        max_period_secs: 1,
        block_size: 250,
        ..Default::default()
    }
}

fn i16_bytes(level: f32, frames: usize) -> Vec<u8> {
    let mut mock = MockSource::new(48000, 1);
    mock.add_samples(&vec![level; frames]);
    mock.to_bytes(SampleFormat::I16)
}

#[test]
fn test_scenario_zero_then_unit_block() {
    let clock = Arc::new(ManualClock::new(0));
    let (capture, blocks) = scenario_capture(clock);

    assert_eq!(capture.ingest(&i16_bytes(0.0, 1024)), 2048);
    assert_eq!(blocks.lock().len(), 1);
    assert_eq!(blocks.lock()[0].position, 256);
    capture.with_samples(|samples, position| {
        assert_eq!(position, 256);
        assert!(samples[..256].iter().all(|&s| s == 0.0));
    });

    capture.ingest(&i16_bytes(1.0, 1024));
    assert_eq!(blocks.lock().len(), 2);
    assert_eq!(blocks.lock()[1].position, 512);

    capture.with_samples(|samples, position| {
        assert_eq!(position, 512);
        // Leading edge of the step is still inside the filter history
        for (i, &s) in samples[272..512].iter().enumerate() {
            assert!((s - 1.0).abs() < 1e-4, "sample {} = {s}", 272 + i);
        }
        assert!(samples[256] < 0.5);
    });
}

#[test]
fn test_position_advances_by_whole_blocks() {
    let (capture, blocks) = scenario_capture(Arc::new(ManualClock::new(0)));

    // Uneven chunk sizes that add up to exactly five blocks
    for chunk in [100usize, 924, 3000, 1096] {
        capture.ingest(&i16_bytes(0.1, chunk));
    }

    assert_eq!(capture.position(), 5 * 256);
    assert_eq!(capture.fill_offset(), 0);
    let positions: Vec<usize> = blocks.lock().iter().map(|b| b.position).collect();
    assert_eq!(positions, vec![256, 512, 768, 1024, 1280]);
}

#[test]
fn test_zero_input_stays_exactly_zero() {
    let (capture, _blocks) = scenario_capture(Arc::new(ManualClock::new(0)));
    capture.ingest(&i16_bytes(0.0, 1024 * 8));
    assert!(capture.snapshot().iter().all(|&s| s == 0.0));
}

#[test]
fn test_dc_input_converges() {
    let (capture, _blocks) = scenario_capture(Arc::new(ManualClock::new(0)));
    capture.ingest_samples(&vec![0.25; 1024 * 4]);

    let samples = capture.snapshot();
    assert_eq!(samples.len(), 1024);
    for &s in &samples[32..] {
        assert!((s - 0.25).abs() < 1e-5, "got {s}");
    }
}

#[test]
fn test_resync_twice_is_idempotent() {
    let clock = Arc::new(ManualClock::new(0));
    let (capture, _blocks) = scenario_capture(clock.clone());
    capture.ingest(&i16_bytes(0.5, 1024 * 3));

    clock.set_ms(2_500);
    let first = capture.resync();
    assert_eq!(first.from, 768);
    assert_eq!(first.to, 30_000);
    assert_eq!(first.delta, 30_000 - 768);

    let second = capture.resync();
    assert_eq!(second.from, 30_000);
    assert_eq!(second.delta, 0);
}

#[test]
fn test_resync_keeps_captured_audio_aligned() {
    let clock = Arc::new(ManualClock::new(0));
    let (capture, _blocks) = scenario_capture(clock.clone());
    capture.ingest(&i16_bytes(0.5, 1024 * 3));
    let before = capture.snapshot();
    assert_eq!(before.len(), 768);

    // 768 samples is 64 ms; a +1 s clock correction lands at 1.064 s
    clock.set_ms(1_064);
    let r = capture.resync();
    assert_eq!(r.to, 12_768);
    assert_eq!(r.delta, 12_000);

    capture.with_samples(|samples, position| {
        assert_eq!(position, 12_768);
        assert_eq!(&samples[12_000..12_768], &before[..]);
    });

    // Undo the correction: content returns to where it was
    clock.set_ms(64);
    let back = capture.resync();
    assert_eq!(back.delta, -12_000);
    capture.with_samples(|samples, position| {
        assert_eq!(position, 768);
        assert_eq!(&samples[..768], &before[..]);
    });
}

#[test]
fn test_overflow_never_writes_past_capacity() {
    let capture = PeriodCapture::builder()
        .config(one_second_config())
        .clock(Arc::new(ManualClock::new(0)))
        .build()
        .unwrap();
    let capacity = capture.capacity();
    assert_eq!(capacity, 12_000);

    capture.ingest_samples(&vec![0.5; 48_000]);
    assert!(capture.is_full());
    let full = capture.snapshot();

    // A different level offered past the bound must not land anywhere
    assert_eq!(capture.ingest(&i16_bytes(-1.0, 10_000)), 20_000);
    capture.with_samples(|samples, position| {
        assert_eq!(position, capacity);
        assert_eq!(samples.len(), capacity);
        assert_eq!(samples, &full[..]);
    });
    assert_eq!(capture.stats().frames_dropped, 10_000);
}

#[test]
fn test_overflow_inside_one_chunk() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let capture = PeriodCapture::builder()
        .config(one_second_config())
        .clock(Arc::new(ManualClock::new(0)))
        .on_event(move |e| sink.lock().push(e))
        .build()
        .unwrap();

    // Leave room for exactly one more block, then offer three
    capture.ingest_samples(&vec![0.0; 47_000]);
    assert_eq!(capture.position(), 11_750);

    capture.ingest_samples(&vec![0.0; 3_000]);
    assert_eq!(capture.position(), 12_000);
    assert_eq!(
        events.lock().as_slice(),
        &[CaptureEvent::FramesDropped {
            dropped_frames: 2_000,
            position: 11_750,
            second_in_period: 0,
        }]
    );
}

#[test]
fn test_period_wrap_restarts_at_zero() {
    let clock = Arc::new(ManualClock::new(13_000));
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let capture = PeriodCapture::builder()
        .buffer_mode(BufferMode::Reset)
        .clock(clock.clone())
        .on_event(move |e| sink.lock().push(e))
        .build()
        .unwrap();

    capture.ingest_samples(&vec![0.3; 1024 * 2 + 500]);
    assert_eq!(capture.position(), 512);
    assert_eq!(capture.fill_offset(), 500);

    clock.set_ms(14_900);
    capture.ingest_samples(&[0.3; 100]);
    assert_eq!(capture.fill_offset(), 600);

    // 15.2 s into the day: second 0 of the next period
    clock.set_ms(15_200);
    capture.ingest_samples(&[0.3; 100]);
    assert_eq!(capture.position(), 0);
    assert_eq!(capture.fill_offset(), 100);

    assert_eq!(
        events.lock().as_slice(),
        &[CaptureEvent::PeriodWrapped {
            previous_second: 14,
            second: 0,
        }]
    );
    assert_eq!(capture.stats().period_wraps, 1);
}

#[test]
fn test_wrap_reopens_full_buffer() {
    let clock = Arc::new(ManualClock::new(0));
    let capture = PeriodCapture::builder()
        .config(CaptureConfig {
            period_secs: 2,
            max_period_secs: 1,
            ..one_second_config()
        })
        .clock(clock.clone())
        .build();
    // A period longer than the buffer is rejected
    assert!(capture.is_err());

    let capture = PeriodCapture::builder()
        .config(CaptureConfig {
            period_secs: 2,
            max_period_secs: 2,
            ..one_second_config()
        })
        .buffer_mode(BufferMode::Reset)
        .clock(clock.clone())
        .build()
        .unwrap();

    clock.set_ms(1_000);
    capture.ingest_samples(&vec![0.0; 96_000]);
    assert!(capture.is_full());
    capture.ingest_samples(&[0.0; 1_000]);
    assert!(capture.is_full());

    clock.set_ms(2_000);
    capture.ingest_samples(&[0.0; 1_000]);
    assert_eq!(capture.position(), 250);
}

#[test]
fn test_stereo_f32_right_channel() {
    let capture = PeriodCapture::builder()
        .sample_format(SampleFormat::F32)
        .channels(2, ChannelSelection::Right)
        .buffer_mode(BufferMode::Reset)
        .clock(Arc::new(ManualClock::new(0)))
        .build()
        .unwrap();

    // Left carries garbage, right carries a steady 0.75
    let mut mock = MockSource::new(48000, 2);
    for _ in 0..4096 {
        mock.add_samples(&[-0.9, 0.75]);
    }
    capture.ingest(&mock.to_bytes(SampleFormat::F32));

    let samples = capture.snapshot();
    assert_eq!(samples.len(), 1024);
    assert!((samples[1023] - 0.75).abs() < 1e-5);
}

#[test]
fn test_reset_content_keeps_position() {
    let (capture, _blocks) = scenario_capture(Arc::new(ManualClock::new(0)));
    capture.ingest(&i16_bytes(0.5, 4096));
    capture.reset_content();

    assert_eq!(capture.position(), 1024);
    capture.with_samples(|samples, _| assert!(samples.iter().all(|&s| s == 0.0)));
}

#[test]
fn test_concurrent_ingest_and_resync() {
    let clock = Arc::new(ManualClock::new(0));
    let capture = Arc::new(
        PeriodCapture::builder()
            .clock(clock.clone())
            .build()
            .unwrap(),
    );
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let capture = capture.clone();
        let done = done.clone();
        thread::spawn(move || {
            let chunk = i16_bytes(0.2, 480);
            for _ in 0..2_000 {
                assert_eq!(capture.ingest(&chunk), chunk.len());
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let control = {
        let capture = capture.clone();
        let clock = clock.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut resyncs = 0u64;
            while !done.load(Ordering::SeqCst) {
                clock.advance_ms(7);
                let r = capture.resync();
                assert!(r.to <= capture.capacity());
                resyncs += 1;
                thread::yield_now();
            }
            resyncs
        })
    };

    producer.join().unwrap();
    let resyncs = control.join().unwrap();

    let stats = capture.stats();
    assert_eq!(stats.repositions, resyncs);
    assert!(capture.position() <= capture.capacity());
    assert!(capture.fill_offset() < 1024);
}

/// A clock that runs a one-shot callback the next time it is read.
#[derive(Default)]
struct HookedClock {
    now_ms: AtomicI64,
    hook: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl HookedClock {
    fn arm(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }
}

impl std::fmt::Debug for HookedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookedClock")
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

impl Clock for HookedClock {
    fn now_ms(&self) -> i64 {
        let now = self.now_ms.load(Ordering::SeqCst);
        let hook = self.hook.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        now
    }
}

#[test]
fn test_resync_during_ingest_is_not_a_wrap() {
    let clock = Arc::new(HookedClock::default());
    clock.now_ms.store(5_999, Ordering::SeqCst);

    let capture = Arc::new(
        PeriodCapture::builder()
            .clock(clock.clone())
            .build()
            .unwrap(),
    );
    assert_eq!(capture.position(), 71_988);

    // While ingest reads the clock, the control thread applies a +1 ms
    // correction and resyncs. Give it a moment to get through if it can.
    let resync_thread: Arc<Mutex<Option<JoinHandle<Reposition>>>> = Arc::new(Mutex::new(None));
    {
        let capture = capture.clone();
        let clock_handle = clock.clone();
        let slot = resync_thread.clone();
        clock.arm(move || {
            clock_handle.now_ms.store(6_000, Ordering::SeqCst);
            let (done_tx, done_rx) = std_mpsc::sync_channel(1);
            let handle = thread::spawn(move || {
                let r = capture.resync();
                let _ = done_tx.send(());
                r
            });
            let _ = done_rx.recv_timeout(Duration::from_millis(100));
            *slot.lock() = Some(handle);
        });
    }

    capture.ingest_samples(&[0.0; 1024]);
    let handle = resync_thread.lock().take().unwrap();
    let reposition = handle.join().unwrap();

    // The block lands first, then the resync moves to 6.000 s
    assert_eq!(reposition.from, 71_988 + 256);
    assert_eq!(reposition.to, 72_000);
    assert_eq!(capture.position(), 72_000);

    let stats = capture.stats();
    assert_eq!(stats.period_wraps, 0);
    assert_eq!(stats.repositions, 1);
}

#[tokio::test]
async fn test_channel_notifier_receives_blocks() {
    let (tx, mut rx) = mpsc::channel::<BlockWritten>(16);
    let clock = Arc::new(ManualClock::new(0));

    let capture = PeriodCapture::builder()
        .notifier(ChannelNotifier::new(tx))
        .clock(clock)
        .build()
        .unwrap();

    capture.ingest(&i16_bytes(0.0, 4096));

    for expected in [256, 512, 768, 1024] {
        let block = rx.recv().await.unwrap();
        assert_eq!(block.position, expected);
        assert_eq!(block.timestamp_ms, 0);
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_bridge_delivers_everything_on_stop() {
    let capture = Arc::new(
        PeriodCapture::builder()
            .clock(Arc::new(ManualClock::new(0)))
            .build()
            .unwrap(),
    );

    let mut mock = MockSource::new(48000, 1);
    mock.generate_sine(1000.0, 0.5, 100);
    let consumer = mock.into_ingest_buffer(capture.config().frame_format());

    let bridge =
        period_capture::spawn_ingest_bridge(consumer, capture.clone(), Duration::from_millis(5));
    assert!(bridge.is_running());

    let frames = bridge.stop().await;
    assert_eq!(frames, 4800);
    // 4800 frames = 4 full blocks + 704 pending
    assert_eq!(capture.position(), 1024);
    assert_eq!(capture.fill_offset(), 704);
}

#[tokio::test]
async fn test_bridge_from_producer_half() {
    let capture = Arc::new(
        PeriodCapture::builder()
            .clock(Arc::new(ManualClock::new(0)))
            .build()
            .unwrap(),
    );
    let (mut producer, consumer) =
        period_capture::create_ingest_buffer(8192, capture.config().frame_format());
    let bridge =
        period_capture::spawn_ingest_bridge(consumer, capture.clone(), Duration::from_millis(1));

    let bytes = i16_bytes(0.0, 1024);
    for _ in 0..4 {
        assert_eq!(producer.push_frames(&bytes), 1024);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    bridge.stop().await;
    assert_eq!(capture.position(), 1024);
    assert_eq!(producer.dropped_frames(), 0);
}
