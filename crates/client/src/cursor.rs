//! Lazy, batched cursor over query results
//!
//! A query larger than one response is delivered through a server-side
//! cursor: the initial request returns the first batch plus a continuation
//! handle, and each continuation request returns the next batch until
//! `hasMore` goes false.
//!
//! [`Cursor`] buffers exactly one batch and yields items in arrival order.
//! A continuation request is issued only when the buffer is empty and the
//! server reported more data. The sequence is finite, forward-only, and
//! non-restartable: re-reading a query means opening a new cursor.
//!
//! The cursor is a scoped resource. An unexhausted cursor holds server-side
//! state until the service times it out, so callers must either drain it or
//! call [`Cursor::dispose`] on every exit path. Dropping an unexhausted,
//! undisposed cursor only logs a warning — the release request cannot be
//! issued from `Drop`.

use crate::transport::{CommandRequest, CommandResponse, CursorPage, Method, Transport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};
use vellum_core::{Error, Result};

/// Path of the cursor api below the database root.
pub(crate) const CURSOR_API: &str = "_api/cursor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    Exhausted,
    Disposed,
}

/// Lazy, forward-only sequence over one query's results.
pub struct Cursor<T> {
    transport: Arc<dyn Transport>,
    buffer: VecDeque<Value>,
    has_more: bool,
    cursor_id: Option<String>,
    total_count: Option<u64>,
    phase: Phase,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Cursor<T> {
    /// Issue the initial query request and buffer the first batch.
    pub(crate) async fn open(
        transport: Arc<dyn Transport>,
        request: CommandRequest,
    ) -> Result<Self> {
        let response = transport.send(request).await?;
        let page = Self::parse_page(response)?;
        debug!(
            batch = page.result.len(),
            has_more = page.has_more,
            "cursor opened"
        );
        Ok(Cursor {
            transport,
            buffer: page.result.into(),
            has_more: page.has_more,
            cursor_id: page.id,
            total_count: page.count,
            phase: Phase::Ready,
            _item: PhantomData,
        })
    }

    /// Yield the next item, fetching the next batch at a boundary.
    ///
    /// Returns `Ok(None)` exactly once when the sequence ends; any call
    /// after that, or after [`Cursor::dispose`], fails with `CursorClosed`.
    pub async fn next(&mut self) -> Result<Option<T>> {
        match self.phase {
            Phase::Disposed | Phase::Exhausted => return Err(Error::CursorClosed),
            Phase::Ready => {}
        }

        loop {
            if let Some(item) = self.buffer.pop_front() {
                let item = serde_json::from_value(item)?;
                return Ok(Some(item));
            }
            if !self.has_more {
                self.phase = Phase::Exhausted;
                return Ok(None);
            }
            self.fetch_next_batch().await?;
        }
    }

    /// Drain the remaining items into a vector.
    ///
    /// Consumes the sequence; the cursor is exhausted afterwards.
    pub async fn all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Release the server-side cursor resource.
    ///
    /// Issues one best-effort release request if the cursor is still
    /// unexhausted; a failed release is logged and swallowed. Safe to call
    /// repeatedly. After disposal `next()` fails with `CursorClosed`.
    pub async fn dispose(&mut self) {
        if self.phase == Phase::Ready && self.has_more {
            if let Some(id) = self.cursor_id.take() {
                let request =
                    CommandRequest::new(Method::Delete, format!("{}/{}", CURSOR_API, id));
                match self.transport.send(request).await {
                    Ok(_) => debug!(cursor = %id, "cursor released"),
                    Err(e) => debug!(cursor = %id, error = %e, "cursor release failed"),
                }
            }
        }
        self.has_more = false;
        self.phase = Phase::Disposed;
    }

    /// Total result count, present only if the query requested count
    /// semantics.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Whether the sequence has been fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    /// Whether the cursor has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.phase == Phase::Disposed
    }

    async fn fetch_next_batch(&mut self) -> Result<()> {
        // Invariant: only reached with an empty buffer and has_more true.
        let id = self.cursor_id.as_deref().ok_or_else(|| {
            Error::Transport("server reported more data but sent no cursor id".to_string())
        })?;
        let request = CommandRequest::new(Method::Put, format!("{}/{}", CURSOR_API, id));
        let response = self.transport.send(request).await?;
        let page = Self::parse_page(response)?;
        debug!(
            batch = page.result.len(),
            has_more = page.has_more,
            "cursor batch fetched"
        );
        self.buffer = page.result.into();
        self.has_more = page.has_more;
        self.cursor_id = page.id;
        Ok(())
    }

    fn parse_page(response: CommandResponse) -> Result<CursorPage> {
        let body = response.into_result("cursor", None)?;
        let page: CursorPage = serde_json::from_value(body)?;
        Ok(page)
    }
}

impl<T> Drop for Cursor<T> {
    fn drop(&mut self) {
        if self.phase == Phase::Ready && self.has_more {
            warn!(
                cursor = self.cursor_id.as_deref().unwrap_or(""),
                "cursor dropped while unexhausted; server-side resource leaks until timeout"
            );
        }
    }
}
