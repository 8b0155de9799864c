//! Live, push-updated views over a single table.
//!
//! A [`LiveQuery`] subscribes to the table's change channel before taking its
//! first snapshot, so no committed write can slip between the two. Every
//! later snapshot is re-read from committed state after a change arrives.
//! Changes that pile up while the subscriber is busy are folded into one
//! re-read; a lagged receiver is treated the same way.

use std::sync::Arc;

use futures_util::stream::{self, Stream};
use rusqlite::Connection;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;

use crate::db::schema::Table;
use crate::errors::Result;
use crate::store::{LocalStore, TableChange};

type Query<T> = Arc<dyn Fn(&Connection) -> Result<Vec<T>> + Send + Sync>;

pub struct LiveQuery<T> {
    store: LocalStore,
    table: Table,
    changes: Receiver<TableChange>,
    query: Query<T>,
    primed: bool,
    closed: bool,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub fn new<F>(store: &LocalStore, table: Table, query: F) -> Self
    where
        F: Fn(&Connection) -> Result<Vec<T>> + Send + Sync + 'static,
    {
        Self {
            changes: store.watch(table),
            store: store.clone(),
            table,
            query: Arc::new(query),
            primed: false,
            closed: false,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Wait for the next snapshot. The first call returns immediately with the
    /// current contents. A read failure is returned once and ends the view.
    pub async fn next(&mut self) -> Option<Result<Vec<T>>> {
        if self.closed {
            return None;
        }
        if self.primed {
            match self.changes.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => {
                    self.closed = true;
                    return None;
                }
            }
            loop {
                match self.changes.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }
        self.primed = true;

        let query = self.query.clone();
        let snapshot = self.store.read(move |conn| query(conn)).await;
        if let Err(err) = &snapshot {
            log::warn!("live view on {} closed: {err}", self.table.name());
            self.closed = true;
        }
        Some(snapshot)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>>> {
        stream::unfold(self, |mut live| async move {
            let item = live.next().await?;
            Some((item, live))
        })
    }
}
