//! In-memory remote source serving canned responses

use crate::client::RemoteSource;
use crate::error::{RemoteError, RemoteResult};
use crate::query::EntityQuery;
use async_trait::async_trait;
use sl_core::Frame;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type ResponseKey = (String, Option<String>);

#[derive(Debug, Clone)]
enum Canned<T> {
    Ok(T),
    Status(u16),
}

/// Remote source backed by a table of responses keyed by entity and filter.
///
/// Queries with no registered response return an empty frame, which is how
/// the service answers a filter that matches nothing. A registered status
/// fails the way the live client does once its retries are spent. Every
/// query is recorded so callers can assert on what was requested.
#[derive(Debug, Default)]
pub struct MemorySource {
    metadata: Mutex<Option<Canned<String>>>,
    responses: Mutex<HashMap<ResponseKey, Canned<Frame>>>,
    requests: Mutex<Vec<EntityQuery>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn key(entity: &str, filter: Option<&str>) -> ResponseKey {
    (entity.to_ascii_uppercase(), filter.map(str::to_string))
}

fn status_error(url: String, status: u16) -> RemoteError {
    if (500..600).contains(&status) {
        RemoteError::Unavailable {
            url,
            attempts: 1,
            last: format!("HTTP {}", status),
        }
    } else {
        RemoteError::Rejected { url, status }
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(self, xml: impl Into<String>) -> Self {
        *lock(&self.metadata) = Some(Canned::Ok(xml.into()));
        self
    }

    pub fn with_metadata_failure(self, status: u16) -> Self {
        *lock(&self.metadata) = Some(Canned::Status(status));
        self
    }

    pub fn with_rows(self, entity: &str, filter: Option<&str>, frame: Frame) -> Self {
        self.set_rows(entity, filter, frame);
        self
    }

    pub fn with_failure(self, entity: &str, filter: Option<&str>, status: u16) -> Self {
        self.set_failure(entity, filter, status);
        self
    }

    /// Replace the response for a query after the source has been shared
    pub fn set_rows(&self, entity: &str, filter: Option<&str>, frame: Frame) {
        lock(&self.responses).insert(key(entity, filter), Canned::Ok(frame));
    }

    pub fn set_failure(&self, entity: &str, filter: Option<&str>, status: u16) {
        lock(&self.responses).insert(key(entity, filter), Canned::Status(status));
    }

    /// Queries received so far, in order
    pub fn requests(&self) -> Vec<EntityQuery> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl RemoteSource for MemorySource {
    async fn fetch_metadata(&self) -> RemoteResult<String> {
        let canned = lock(&self.metadata).clone();
        match canned {
            Some(Canned::Ok(xml)) => Ok(xml),
            Some(Canned::Status(status)) => Err(status_error("memory://$metadata".into(), status)),
            None => Err(RemoteError::Rejected {
                url: "memory://$metadata".into(),
                status: 404,
            }),
        }
    }

    async fn fetch_rows(&self, query: &EntityQuery) -> RemoteResult<Frame> {
        lock(&self.requests).push(query.clone());
        let canned = lock(&self.responses)
            .get(&key(&query.entity, query.filter.as_deref()))
            .cloned();
        match canned {
            Some(Canned::Ok(frame)) => Ok(frame),
            Some(Canned::Status(status)) => Err(status_error(query.to_url("memory:/"), status)),
            None => Ok(Frame::default()),
        }
    }
}
