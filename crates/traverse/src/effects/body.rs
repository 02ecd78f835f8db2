use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt, stream};

use crate::effects::sink::ByteSink;
use crate::error::{Result, TraverseError};

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Body chunks as delivered by a [`Transport`](crate::effects::Transport).
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

enum BodyState {
    Pending(ByteStream),
    Consumed,
    Cancelled,
}

/// Shared handle to a response body.
///
/// Every result derived from one response holds a clone of the same handle.
/// The underlying stream is handed out exactly once; after that the handle
/// reports [`TraverseError::BodyConsumed`], or [`TraverseError::BodyCancelled`]
/// once the orchestrator has released it.
#[derive(Clone)]
pub struct ResponseBody {
    state: Arc<Mutex<BodyState>>,
}

impl ResponseBody {
    pub fn new(stream: ByteStream) -> Self {
        Self {
            state: Arc::new(Mutex::new(BodyState::Pending(stream))),
        }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let chunk: Result<Bytes> = Ok(bytes.into());
        Self::new(Box::pin(stream::iter(vec![chunk])))
    }

    pub fn empty() -> Self { Self::new(Box::pin(stream::empty())) }

    fn lock(&self) -> MutexGuard<'_, BodyState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take(&self) -> Result<ByteStream> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, BodyState::Consumed) {
            BodyState::Pending(stream) => Ok(stream),
            BodyState::Consumed => Err(TraverseError::BodyConsumed),
            BodyState::Cancelled => {
                *state = BodyState::Cancelled;
                Err(TraverseError::BodyCancelled)
            }
        }
    }

    pub fn is_pending(&self) -> bool { matches!(*self.lock(), BodyState::Pending(_)) }

    pub fn is_consumed(&self) -> bool { matches!(*self.lock(), BodyState::Consumed) }

    pub fn is_cancelled(&self) -> bool { matches!(*self.lock(), BodyState::Cancelled) }

    /// Drop the stream if nobody read it. Returns `true` when a pending
    /// stream was released.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, BodyState::Pending(_)) {
            *state = BodyState::Cancelled;
            true
        } else {
            false
        }
    }

    pub async fn bytes(&self) -> Result<Bytes> {
        let mut stream = self.take()?;
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Read the whole body as UTF-8, replacing invalid sequences.
    pub async fn text(&self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Stream the body into `sink`, returning the byte count the sink
    /// reported as written.
    pub async fn write_to(&self, sink: &mut (dyn ByteSink + '_)) -> Result<u64> {
        let mut stream = self.take()?;
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += sink.write(&chunk).await? as u64;
        }
        sink.finish().await?;
        Ok(written)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *self.lock() {
            BodyState::Pending(_) => "pending",
            BodyState::Consumed => "consumed",
            BodyState::Cancelled => "cancelled",
        };
        f.debug_struct("ResponseBody").field("state", &state).finish()
    }
}
