//! Serial channel to the display controller.

use super::transport::Transport;
use crate::{Error, Result};
use serde::Serialize;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, StopBits};
use tracing::{debug, info};

/// Default pause between sending a command and reading the reply.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Default time allowed for a reply line to arrive.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Timing of a single send/receive exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeTiming {
    /// Pause after the write so the firmware can process and answer.
    pub settle: Duration,
    /// Upper bound on waiting for the reply line.
    pub read_timeout: Duration,
}

impl Default for ExchangeTiming {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Exclusive channel to the display controller.
///
/// Every exchange holds the transport lock from the input flush until the
/// reply has been read, so concurrent callers are served one at a time.
pub struct SerialChannel {
    transport: Mutex<Box<dyn Transport>>,
    timing: ExchangeTiming,
}

impl SerialChannel {
    /// Wraps an already open transport.
    pub fn new<T: Transport + 'static>(transport: T, timing: ExchangeTiming) -> Self {
        Self {
            transport: Mutex::new(Box::new(transport)),
            timing,
        }
    }

    /// Opens the serial port at `path` (8N1).
    pub fn open(path: &str, baud_rate: u32, timing: ExchangeTiming) -> Result<Self> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(timing.read_timeout)
            .open_native_async()
            .map_err(|e| {
                if let tokio_serial::ErrorKind::Io(kind) = &e.kind {
                    if (*kind == std::io::ErrorKind::NotFound
                        || *kind == std::io::ErrorKind::PermissionDenied)
                        && !std::path::Path::new(path).exists()
                    {
                        return Error::DeviceNotFound(path.to_string());
                    }
                }
                Error::Serial(e)
            })?;

        info!("Serial port {} opened at {} baud", path, baud_rate);
        Ok(Self::new(port, timing))
    }

    /// Returns the exchange timing.
    pub fn timing(&self) -> ExchangeTiming {
        self.timing
    }

    /// Sends `message` as one line of compact JSON and reads at most one
    /// reply line.
    ///
    /// Returns `None` if the device stayed silent for the whole read timeout.
    pub async fn exchange<T: Serialize + ?Sized>(&self, message: &T) -> Result<Option<String>> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let mut transport = self.transport.lock().await;

        transport.discard_input()?;

        debug!("Sending: {}", String::from_utf8_lossy(&line).trim_end());
        transport.write_all(&line).await?;
        transport.flush().await?;

        tokio::time::sleep(self.timing.settle).await;

        let mut reply = Vec::new();
        match tokio::time::timeout(
            self.timing.read_timeout,
            read_line(&mut *transport, &mut reply),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => debug!("No complete reply within {:?}", self.timing.read_timeout),
        }
        drop(transport);

        let reply = String::from_utf8_lossy(&reply).trim().to_string();
        if reply.is_empty() {
            debug!("No reply from device");
            Ok(None)
        } else {
            debug!("Received: {}", reply);
            Ok(Some(reply))
        }
    }
}

/// Reads bytes into `buf` up to the first newline or end of stream.
///
/// Bytes after the newline are dropped; the next exchange discards pending
/// input anyway.
async fn read_line<R: AsyncRead + Unpin + ?Sized>(reader: &mut R, buf: &mut Vec<u8>) -> Result<()> {
    let mut chunk = [0u8; 64];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        if let Some(pos) = chunk[..n].iter().position(|&b| b == b'\n') {
            buf.extend_from_slice(&chunk[..pos]);
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::{MockEvent, MockTransport};
    use crate::DisplayCommand;
    use std::sync::Arc;

    fn fast_timing() -> ExchangeTiming {
        ExchangeTiming {
            settle: Duration::from_millis(20),
            read_timeout: Duration::from_millis(100),
        }
    }

    #[tokio::test]
    async fn test_exchange_writes_compact_line() {
        let (transport, handle) = MockTransport::new();
        handle.respond_with(|_| Some("OK".to_string()));
        let channel = SerialChannel::new(transport, fast_timing());

        let command = DisplayCommand::from_query_pairs([
            ("txt", "Hello"),
            ("fg", "WHITE"),
            ("bg", "BLUE"),
            ("size", "3"),
        ])
        .unwrap()
        .normalized();

        let reply = channel.exchange(&command).await.unwrap();
        assert_eq!(reply.as_deref(), Some("OK"));
        assert_eq!(
            handle.written(),
            b"{\"txt\":\"Hello\",\"fg\":\"FFFF\",\"bg\":\"001F\",\"size\":\"3\"}\n"
        );
    }

    #[tokio::test]
    async fn test_exchange_trims_reply() {
        let (transport, handle) = MockTransport::new();
        handle.respond_with(|_| Some("  ready \r".to_string()));
        let channel = SerialChannel::new(transport, fast_timing());

        let reply = channel.exchange(&DisplayCommand::new()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("ready"));
        assert_eq!(handle.written(), b"{}\n");
    }

    #[tokio::test]
    async fn test_exchange_silent_device() {
        let (transport, handle) = MockTransport::new();
        let channel = SerialChannel::new(transport, fast_timing());

        let reply = channel.exchange(&DisplayCommand::new()).await.unwrap();
        assert_eq!(reply, None);
        assert_eq!(handle.written(), b"{}\n");
    }

    #[tokio::test]
    async fn test_exchange_blank_reply_is_none() {
        let (transport, handle) = MockTransport::new();
        handle.respond_with(|_| Some("   ".to_string()));
        let channel = SerialChannel::new(transport, fast_timing());

        assert_eq!(channel.exchange(&DisplayCommand::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_exchange_discards_stale_input() {
        let (transport, handle) = MockTransport::new();
        handle.push_input(b"stale line\n");
        handle.respond_with(|_| Some("fresh".to_string()));
        let channel = SerialChannel::new(transport, fast_timing());

        let reply = channel.exchange(&DisplayCommand::new()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_exchange_keeps_only_first_line() {
        let (transport, handle) = MockTransport::new();
        handle.respond_with(|_| Some("first\nsecond".to_string()));
        let channel = SerialChannel::new(transport, fast_timing());

        let reply = channel.exchange(&DisplayCommand::new()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_exchange_partial_line_before_timeout() {
        let (transport, handle) = MockTransport::new();
        handle.respond_raw(|_| Some(b"no newline".to_vec()));
        let channel = SerialChannel::new(transport, fast_timing());

        let reply = channel.exchange(&DisplayCommand::new()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("no newline"));
    }

    #[tokio::test]
    async fn test_exchange_transport_fault() {
        let (transport, handle) = MockTransport::new();
        handle.fail_writes(std::io::ErrorKind::BrokenPipe, "device unplugged");
        let channel = SerialChannel::new(transport, fast_timing());

        let err = channel.exchange(&DisplayCommand::new()).await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("device unplugged"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_exchanges_never_interleave() {
        let (transport, handle) = MockTransport::new();
        handle.respond_with(|line| Some(format!("ack {}", line)));
        let channel = Arc::new(SerialChannel::new(transport, fast_timing()));

        let mut tasks = Vec::new();
        for name in ["first", "second", "third"] {
            let channel = channel.clone();
            tasks.push(tokio::spawn(async move {
                let command = DisplayCommand::from_query_pairs([("txt", name)]).unwrap();
                channel.exchange(&command).await
            }));
        }
        for (task, name) in tasks.into_iter().zip(["first", "second", "third"]) {
            let reply = task.await.unwrap().unwrap().unwrap();
            assert_eq!(reply, format!("ack {{\"txt\":\"{}\"}}", name));
        }

        // Each exchange must run discard -> write -> read before the next
        // one starts.
        let events = handle.events();
        assert_eq!(events.len(), 9, "{:?}", events);
        for exchange in events.chunks(3) {
            match exchange {
                [MockEvent::Discard, MockEvent::Write(sent), MockEvent::Read(received)] => {
                    assert_eq!(received, &format!("ack {}\n", sent));
                }
                other => panic!("interleaved exchange: {:?}", other),
            }
        }
    }
}
