use crate::error::StreamError;
use crate::modality::chat::extract::extract_text;
use crate::modality::chat::ChunkStream;
use bytes::Bytes;
use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::StreamExt;

/// Lifecycle of one streamed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Streaming,
    Completed,
    Failed(String),
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Completed | StreamState::Failed(_))
    }
}

/// How a streamed response ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Failed(String),
}

/// Read side of an adapter's state. Outlives the adapter.
#[derive(Debug)]
pub struct StreamMonitor {
    rx: watch::Receiver<StreamState>,
}

impl StreamMonitor {
    pub fn state(&self) -> StreamState {
        self.rx.borrow().clone()
    }

    /// Wait for the terminal state.
    pub async fn outcome(mut self) -> StreamOutcome {
        let state = self
            .rx
            .wait_for(StreamState::is_terminal)
            .await
            .map(|s| StreamState::clone(&s));
        match state {
            Ok(StreamState::Failed(reason)) => StreamOutcome::Failed(reason),
            Ok(_) => StreamOutcome::Completed,
            Err(_) => StreamOutcome::Failed("aborted: stream state lost".to_string()),
        }
    }
}

struct StateReporter {
    tx: watch::Sender<StreamState>,
}

impl StateReporter {
    fn set(&self, state: StreamState) {
        self.tx.send_replace(state);
    }
}

impl Drop for StateReporter {
    // Dropped without a terminal state means the consumer went away.
    fn drop(&mut self) {
        let terminal = self.tx.borrow().is_terminal();
        if !terminal {
            self.set(StreamState::Failed(
                "aborted: response stream dropped before completion".to_string(),
            ));
        }
    }
}

/// Bridges a backend chunk stream to an HTTP body. One adapter serves one
/// request.
pub struct ByteStreamAdapter {
    source: ChunkStream,
    reporter: StateReporter,
}

impl ByteStreamAdapter {
    pub fn new(source: ChunkStream) -> (Self, StreamMonitor) {
        let (tx, rx) = watch::channel(StreamState::Idle);
        (
            Self {
                source,
                reporter: StateReporter { tx },
            },
            StreamMonitor { rx },
        )
    }

    /// Pull one chunk at a time and emit each non-empty text as its own
    /// write. A source error is emitted as the final item and nothing more is
    /// pulled. Dropping the returned stream drops the source.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, StreamError>> + Send + 'static {
        let ByteStreamAdapter {
            mut source,
            reporter,
        } = self;

        async_stream::stream! {
            reporter.set(StreamState::Streaming);
            loop {
                match source.next().await {
                    Some(Ok(chunk)) => {
                        let text = extract_text(&chunk);
                        if !text.is_empty() {
                            yield Ok(Bytes::from(text));
                        }
                    }
                    Some(Err(e)) => {
                        reporter.set(StreamState::Failed(e.to_string()));
                        yield Err(e);
                        break;
                    }
                    None => {
                        reporter.set(StreamState::Completed);
                        break;
                    }
                }
            }
        }
    }
}
