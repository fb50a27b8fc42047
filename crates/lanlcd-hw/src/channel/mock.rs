//! Scripted in-memory transport standing in for the display controller.

use super::transport::Transport;
use crate::Result;
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

type Responder = Box<dyn FnMut(&str) -> Option<Vec<u8>> + Send>;

/// Something the channel did to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// Pending input was discarded.
    Discard,
    /// A complete line (without its newline) was written.
    Write(String),
    /// Bytes were handed to a reader.
    Read(String),
}

#[derive(Default)]
struct Shared {
    input: VecDeque<u8>,
    partial_line: Vec<u8>,
    written: Vec<u8>,
    responder: Option<Responder>,
    fault: Option<(io::ErrorKind, String)>,
    events: Vec<MockEvent>,
    read_waker: Option<Waker>,
}

impl Shared {
    fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
        if let Some(waker) = self.read_waker.take() {
            waker.wake();
        }
    }
}

/// In-memory transport. Written lines are passed to a responder whose
/// answer becomes readable input.
pub struct MockTransport {
    shared: Arc<Mutex<Shared>>,
}

/// Test-side handle to script and inspect a [`MockTransport`].
#[derive(Clone)]
pub struct MockHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockTransport {
    /// Creates a silent transport and its handle.
    pub fn new() -> (Self, MockHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: shared.clone(),
            },
            MockHandle { shared },
        )
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MockHandle {
    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answers every written line with `f(line)` followed by a newline.
    pub fn respond_with<F>(&self, mut f: F)
    where
        F: FnMut(&str) -> Option<String> + Send + 'static,
    {
        self.shared().responder = Some(Box::new(move |line| {
            f(line).map(|reply| format!("{}\n", reply).into_bytes())
        }));
    }

    /// Answers every written line with raw bytes, without adding a newline.
    pub fn respond_raw<F>(&self, f: F)
    where
        F: FnMut(&str) -> Option<Vec<u8>> + Send + 'static,
    {
        self.shared().responder = Some(Box::new(f));
    }

    /// Makes every subsequent write fail with the given error.
    pub fn fail_writes(&self, kind: io::ErrorKind, message: &str) {
        self.shared().fault = Some((kind, message.to_string()));
    }

    /// Queues bytes as if the device had sent them unprompted.
    pub fn push_input(&self, bytes: &[u8]) {
        self.shared().push_input(bytes);
    }

    /// Returns every byte written so far.
    pub fn written(&self) -> Vec<u8> {
        self.shared().written.clone()
    }

    /// Returns the recorded transport events in order.
    pub fn events(&self) -> Vec<MockEvent> {
        self.shared().events.clone()
    }
}

impl AsyncRead for MockTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut shared = self.shared();
        if shared.input.is_empty() {
            shared.read_waker = Some(cx.waker().clone());
            return Poll::Pending;
        }

        let n = buf.remaining().min(shared.input.len());
        let bytes: Vec<u8> = shared.input.drain(..n).collect();
        buf.put_slice(&bytes);
        shared
            .events
            .push(MockEvent::Read(String::from_utf8_lossy(&bytes).into_owned()));
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut shared = self.shared();
        if let Some((kind, message)) = &shared.fault {
            return Poll::Ready(Err(io::Error::new(*kind, message.clone())));
        }

        shared.written.extend_from_slice(buf);
        for &byte in buf {
            if byte != b'\n' {
                shared.partial_line.push(byte);
                continue;
            }
            let line = String::from_utf8_lossy(&shared.partial_line).into_owned();
            shared.partial_line.clear();
            shared.events.push(MockEvent::Write(line.clone()));
            let reply = shared.responder.as_mut().and_then(|f| f(&line));
            if let Some(reply) = reply {
                shared.push_input(&reply);
            }
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl Transport for MockTransport {
    fn discard_input(&mut self) -> Result<()> {
        let mut shared = self.shared();
        shared.input.clear();
        shared.events.push(MockEvent::Discard);
        Ok(())
    }
}
