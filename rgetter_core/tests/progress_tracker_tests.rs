mod common;

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::io::AsyncReadExt;

use common::{generate_test_data, CountingTracker, FailingStream, TrackedStream};
use rgetter_core::progress::{
    noop_progress_tracker, LogProgressTracker, NoopProgressTracker, ProgressTracker,
};
use rgetter_core::types::types::DownloadStream;

/// Every tracker implementation shipped with the crate, plus a counting one.
fn all_trackers() -> Vec<(&'static str, Box<dyn ProgressTracker>)> {
    vec![
        ("noop", Box::new(NoopProgressTracker)),
        ("log", Box::new(LogProgressTracker::new().with_step_bytes(4096))),
        ("counting", Box::new(CountingTracker::default())),
    ]
}

fn stream_of(data: &[u8]) -> DownloadStream {
    Box::new(io::Cursor::new(data.to_vec()))
}

async fn read_all(mut stream: DownloadStream) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await?;
    Ok(out)
}

// ---------------------------------------------------------------
// Byte transparency
// ---------------------------------------------------------------

#[tokio::test]
async fn test_every_tracker_is_byte_transparent() {
    let samples: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![0u8],
        b"hello world".to_vec(),
        generate_test_data(64 * 1024 + 17),
        generate_test_data(1024 * 1024),
    ];

    for (name, tracker) in all_trackers() {
        for (i, data) in samples.iter().enumerate() {
            for size in [Some(data.len() as u64), None] {
                let wrapped = tracker.track_progress("sample.bin", size, stream_of(data));
                let out = read_all(wrapped).await.unwrap();
                assert_eq!(&out, data, "tracker {} altered sample {} (size {:?})", name, i, size);
            }
        }
    }
}

#[tokio::test]
async fn test_wrong_size_hint_does_not_alter_bytes() {
    let data = generate_test_data(5000);
    for (name, tracker) in all_trackers() {
        for size in [Some(10), Some(0), Some(1 << 40)] {
            let wrapped = tracker.track_progress("liar.bin", size, stream_of(&data));
            let out = read_all(wrapped).await.unwrap();
            assert_eq!(out, data, "tracker {} with hint {:?}", name, size);
        }
    }
}

// ---------------------------------------------------------------
// Passthrough
// ---------------------------------------------------------------

#[test]
fn test_noop_returns_the_same_stream() {
    let stream = stream_of(b"abc");
    let before = &*stream as *const _ as *const u8;

    let returned = NoopProgressTracker.track_progress("whatever", Some(3), stream);
    let after = &*returned as *const _ as *const u8;
    assert_eq!(before, after);

    let stream = stream_of(b"");
    let before = &*stream as *const _ as *const u8;
    let returned = noop_progress_tracker().track_progress("", None, stream);
    assert_eq!(before, &*returned as *const _ as *const u8);
}

#[tokio::test]
async fn test_scenario_archive_with_known_size() {
    let data = generate_test_data(1024);
    let wrapped = NoopProgressTracker.track_progress("archive.tar.gz", Some(1024), stream_of(&data));
    let out = read_all(wrapped).await.unwrap();
    assert_eq!(out.len(), 1024);
    assert_eq!(out, data);
}

#[tokio::test]
async fn test_scenario_unknown_size_empty_stream() {
    for (name, tracker) in all_trackers() {
        let wrapped = tracker.track_progress("empty", None, stream_of(b""));
        let out = read_all(wrapped).await.unwrap();
        assert!(out.is_empty(), "tracker {}", name);
    }
}

// ---------------------------------------------------------------
// Ownership of the underlying stream
// ---------------------------------------------------------------

#[tokio::test]
async fn test_dropping_wrapper_drops_underlying_once() {
    for (name, tracker) in all_trackers() {
        // Fully read, then dropped.
        let (stream, drops) = TrackedStream::new(generate_test_data(300));
        let wrapped = tracker.track_progress("a", Some(300), Box::new(stream));
        assert_eq!(drops.load(Ordering::SeqCst), 0, "tracker {} dropped early", name);
        let out = read_all(wrapped).await.unwrap();
        assert_eq!(out.len(), 300);
        assert_eq!(drops.load(Ordering::SeqCst), 1, "tracker {}", name);

        // Dropped without reading.
        let (stream, drops) = TrackedStream::new(generate_test_data(300));
        let wrapped = tracker.track_progress("b", None, Box::new(stream));
        drop(wrapped);
        assert_eq!(drops.load(Ordering::SeqCst), 1, "tracker {}", name);
    }
}

// ---------------------------------------------------------------
// Error propagation
// ---------------------------------------------------------------

#[tokio::test]
async fn test_read_errors_pass_through_unchanged() {
    for (name, tracker) in all_trackers() {
        let stream = Box::new(FailingStream::new(b"partial".to_vec()));
        let mut wrapped = tracker.track_progress("flaky", Some(100), stream);

        let mut buf = [0u8; 64];
        let n = wrapped.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"partial");

        let err = wrapped.read(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset, "tracker {}", name);
        assert_eq!(err.to_string(), FailingStream::MESSAGE, "tracker {}", name);
    }
}

// ---------------------------------------------------------------
// Counting and concurrency
// ---------------------------------------------------------------

#[tokio::test]
async fn test_counting_tracker_sees_every_byte() {
    let tracker = CountingTracker::default();
    let data = generate_test_data(200_000);

    let wrapped = tracker.track_progress("big.bin", Some(200_000), stream_of(&data));
    read_all(wrapped).await.unwrap();

    assert_eq!(tracker.bytes.load(Ordering::SeqCst), 200_000);
    assert_eq!(tracker.finished.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.abandoned.load(Ordering::SeqCst), 0);
    assert_eq!(
        *tracker.calls.lock().unwrap(),
        vec![("big.bin".to_string(), Some(200_000))]
    );
}

#[tokio::test]
async fn test_shared_tracker_across_concurrent_downloads() {
    let tracker = Arc::new(CountingTracker::default());
    let mut handles = Vec::new();

    for i in 0..8usize {
        let tracker = tracker.clone();
        handles.push(tokio::spawn(async move {
            let data = generate_test_data(10_000 + i);
            let wrapped = tracker.track_progress(
                &format!("part-{}", i),
                Some(data.len() as u64),
                stream_of(&data),
            );
            let out = read_all(wrapped).await.unwrap();
            assert_eq!(out, data);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let expected: u64 = (0..8u64).map(|i| 10_000 + i).sum();
    assert_eq!(tracker.bytes.load(Ordering::SeqCst), expected);
    assert_eq!(tracker.finished.load(Ordering::SeqCst), 8);
    assert_eq!(tracker.call_count(), 8);
}

#[tokio::test]
async fn test_arc_tracker_delegates_to_inner() {
    let inner = Arc::new(CountingTracker::default());
    let as_dyn: Arc<dyn ProgressTracker> = inner.clone();

    let wrapped = as_dyn.track_progress("via-arc", None, stream_of(b"12345"));
    read_all(wrapped).await.unwrap();

    assert_eq!(inner.bytes.load(Ordering::SeqCst), 5);
    assert_eq!(inner.sources(), vec!["via-arc".to_string()]);
}
