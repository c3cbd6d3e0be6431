//! # Response Sinks
//!
//! Destinations for marshaled JSON chunks.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Receives the JSON array one chunk at a time
#[async_trait]
pub trait JsonSink: Send {
    async fn write_chunk(&mut self, chunk: Bytes) -> io::Result<()>;
}

#[async_trait]
impl JsonSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: Bytes) -> io::Result<()> {
        self.extend_from_slice(&chunk);
        Ok(())
    }
}

/// Forwards chunks to an HTTP response body
pub struct ChannelSink {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

/// Body stream fed by a [`ChannelSink`]
pub type ChunkStream = ReceiverStream<io::Result<Bytes>>;

/// A bounded sink/stream pair
pub fn channel(capacity: usize) -> (ChannelSink, ChunkStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelSink { tx }, ReceiverStream::new(rx))
}

impl ChannelSink {
    /// Terminate the stream with an error.
    ///
    /// A client still waiting for the first chunk sees a 500; one already
    /// reading the body sees it cut short.
    pub async fn fail(&self, message: impl Into<String>) {
        let err = io::Error::new(io::ErrorKind::Other, message.into());
        // Receiver gone means nobody is left to tell.
        let _ = self.tx.send(Err(err)).await;
    }
}

#[async_trait]
impl JsonSink for ChannelSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> io::Result<()> {
        self.tx
            .send(Ok(chunk))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))
    }
}
