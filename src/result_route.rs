// src/result_route.rs
//! Binds an analysis id to one fetch-and-render cycle.
//!
//! `ResultBinding` is the synchronous core: every id change produces a
//! `FetchTicket`, and a completion is applied only if its ticket is still the
//! current one. `ResultRoute` runs the fetches on tokio and feeds the
//! completions back through a channel.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::error::ClientError;
use crate::core::service_client::AnalysisApi;
use crate::render::{render, DisplayModel};
use crate::types::analysis::AnalysisRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: String,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingState {
    Unbound,
    Loading { id: String },
    Loaded { id: String, model: Box<DisplayModel> },
    Failed { id: String, error: ClientError },
}

impl BindingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

#[derive(Debug)]
pub struct ResultBinding {
    current: Option<String>,
    generation: u64,
    state: BindingState,
}

impl Default for ResultBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultBinding {
    pub fn new() -> Self {
        Self {
            current: None,
            generation: 0,
            state: BindingState::Unbound,
        }
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Bind to `id`. Returns the ticket of the fetch to start, or `None`
    /// when `id` is already bound.
    pub fn bind(&mut self, id: &str) -> Option<FetchTicket> {
        if self.current.as_deref() == Some(id) {
            debug!("Analysis {} already bound, not fetching again", id);
            return None;
        }

        self.generation += 1;
        self.current = Some(id.to_string());
        self.state = BindingState::Loading { id: id.to_string() };

        Some(FetchTicket {
            id: id.to_string(),
            generation: self.generation,
        })
    }

    /// Apply a fetch result. Returns false when the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<AnalysisRecord, ClientError>,
    ) -> bool {
        if ticket.generation != self.generation || self.current.as_deref() != Some(&ticket.id) {
            debug!(
                "Discarding stale result for {} (generation {}, current {})",
                ticket.id, ticket.generation, self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(record) => BindingState::Loaded {
                id: ticket.id.clone(),
                model: Box::new(render(&record)),
            },
            Err(error) => {
                warn!("Loading analysis {} failed: {}", ticket.id, error);
                BindingState::Failed {
                    id: ticket.id.clone(),
                    error,
                }
            }
        };
        true
    }
}

type Completion = (FetchTicket, Result<AnalysisRecord, ClientError>);

pub struct ResultRoute<A: ?Sized> {
    api: Arc<A>,
    binding: ResultBinding,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl<A> ResultRoute<A>
where
    A: AnalysisApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            binding: ResultBinding::new(),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &BindingState {
        self.binding.state()
    }

    /// Point the route at `id`; starts a fetch only when the id changed
    pub fn set_id(&mut self, id: &str) -> bool {
        let Some(ticket) = self.binding.bind(id) else {
            return false;
        };

        info!("Fetching analysis {}", ticket.id);
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let id = ticket.id.clone();
        let fetch = tokio::spawn(async move { api.fetch_analysis(&id).await });
        tokio::spawn(async move {
            // A fetch that panicked or was cancelled still has to settle the route
            let result = fetch.await.unwrap_or_else(|e| {
                Err(ClientError::NetworkFailure(format!(
                    "Fetching analysis {} aborted: {}",
                    ticket.id, e
                )))
            });
            // The route may be gone; nothing to deliver to then
            let _ = tx.send((ticket, result));
        });
        true
    }

    /// Apply completions that already arrived, without waiting
    pub fn drain_ready(&mut self) {
        while let Ok((ticket, result)) = self.rx.try_recv() {
            self.binding.complete(&ticket, result);
        }
    }

    /// Wait until the current id has finished loading
    pub async fn settle(&mut self) -> &BindingState {
        while self.binding.state().is_loading() {
            match self.rx.recv().await {
                Some((ticket, result)) => {
                    self.binding.complete(&ticket, result);
                }
                None => break,
            }
        }
        self.binding.state()
    }
}
