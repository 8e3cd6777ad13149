//! Observable write-stream behavior against an in-memory store.
//!
//! Each test builds its own store, so tests never share state.

use std::sync::Arc;

use mockfs::adapters::memory::MemoryStore;
use mockfs::context::ServiceContext;
use mockfs::error::StreamError;
use mockfs::ports::{Channel, OutputStream, VirtualStore};
use mockfs::stream::VirtualFileOutputStream;

fn fresh_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

fn open(store: &Arc<MemoryStore>, path: &str, append: bool) -> VirtualFileOutputStream {
    VirtualFileOutputStream::open_with(Arc::clone(store) as Arc<dyn VirtualStore>, path, append)
        .expect("open should succeed")
}

#[test]
fn truncating_open_replaces_prior_content() {
    let store = fresh_store();
    assert!(store.put_file("/tmp/report.txt", b"stale data from last run"));

    let out = open(&store, "/tmp/report.txt", false);
    out.write_bytes(b"fresh").unwrap();
    out.close().unwrap();

    assert_eq!(store.read("/tmp/report.txt").unwrap(), b"fresh");
}

#[test]
fn append_open_keeps_prior_content() {
    let store = fresh_store();
    assert!(store.put_file("/tmp/log.txt", b"line1\n"));

    let out = open(&store, "/tmp/log.txt", true);
    out.write_bytes(b"line2\n").unwrap();
    out.close().unwrap();

    assert_eq!(store.read("/tmp/log.txt").unwrap(), b"line1\nline2\n");
}

#[test]
fn closed_stream_rejects_writes_without_touching_content() {
    let store = fresh_store();
    let out = open(&store, "/tmp/c.txt", false);
    out.write_bytes(b"abc").unwrap();
    out.close().unwrap();

    for result in [out.write_bytes(b"x"), out.write_byte(b'x'), out.write_range(b"xyz", 0, 2)] {
        assert!(matches!(result, Err(StreamError::StreamClosed)));
    }
    assert_eq!(store.read("/tmp/c.txt").unwrap(), b"abc");
}

#[test]
fn double_close_succeeds_without_side_effects() {
    let store = fresh_store();
    let out = open(&store, "/tmp/c.txt", false);
    out.write_bytes(b"abc").unwrap();
    out.close().unwrap();
    let before = store.snapshot();
    out.close().unwrap();
    assert_eq!(store.snapshot(), before);
}

#[test]
fn cursor_is_sum_of_writes_and_shared_with_channel() {
    let store = fresh_store();
    let out = open(&store, "/tmp/sum.bin", false);

    let early = out.channel();
    out.write_bytes(&[1; 5]).unwrap();
    out.write_byte(2).unwrap();
    let late = out.channel();
    out.write_range(&[3; 10], 4, 3).unwrap();

    assert_eq!(out.cursor(), 9);
    assert_eq!(early.position(), 9);
    assert_eq!(late.position(), 9);
    assert_eq!(store.read("/tmp/sum.bin").unwrap().len(), 9);
}

#[test]
fn closed_error_wins_over_injected_fault() {
    let store = fresh_store();
    store.inject_fault("/tmp/flaky");

    let closed = open(&store, "/tmp/flaky", false);
    assert!(matches!(closed.close(), Err(StreamError::InjectedFault { .. })));
    assert!(matches!(closed.write_bytes(b"x"), Err(StreamError::StreamClosed)));

    let live = open(&store, "/tmp/flaky", false);
    assert!(matches!(live.write_bytes(b"x"), Err(StreamError::InjectedFault { .. })));
    assert_eq!(live.cursor(), 0);
}

#[test]
fn open_write_then_append_through_context() {
    let store = fresh_store();
    let ctx = ServiceContext::with_store(Arc::clone(&store) as Arc<dyn VirtualStore>);

    assert!(store.find("/tmp/x").is_none());
    let first = ctx.open("/tmp/x", false).unwrap();
    first.write_bytes(b"hi").unwrap();
    assert_eq!(first.channel().position(), 2);
    assert_eq!(store.read("/tmp/x").unwrap(), b"hi");
    first.close().unwrap();

    let second = ctx.open("/tmp/x", true).unwrap();
    second.write_bytes(b"!").unwrap();
    second.close().unwrap();
    assert_eq!(store.read("/tmp/x").unwrap(), b"hi!");
}

#[test]
fn independent_stores_do_not_interfere() {
    let a = fresh_store();
    let b = fresh_store();
    open(&a, "/tmp/only-in-a", false).write_bytes(b"a").unwrap();
    assert!(b.find("/tmp/only-in-a").is_none());
}
