use crate::application::dto::{GraphRequest, GraphSnapshot};
use crate::graph_query::services::{
    CompileOptions, GraphNormalizer, InternetExposure, QueryCompiler,
};
use crate::ports::inbound::GraphExplorationPort;
use crate::ports::outbound::{ProgressReporter, QueryExecutor};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

/// Base page size and "load more" step
pub const PAGE_SIZE: usize = 25;

/// Mutable part of the loader; only touched between awaits
#[derive(Debug)]
struct LoaderState {
    request: GraphRequest,
    limit: usize,
    generation: u64,
    snapshot: GraphSnapshot,
}

/// Programs issued for one fetch cycle
struct FetchTicket {
    request: GraphRequest,
    limit: usize,
    generation: u64,
    data_query: String,
    count_query: String,
}

/// IncrementalLoader - Paged fetch cycle over the graph store
///
/// `apply_filters` resets the limit to one page, `load_more` grows it by one
/// page. Both re-run the data and count programs from scratch and publish a
/// fresh [`GraphSnapshot`].
///
/// Every call takes a new generation number. A response is only published
/// while its generation is still the latest issued; a slow superseded
/// response is returned to its own caller but never overwrites newer state.
///
/// # Type Parameters
/// * `E` - QueryExecutor implementation
/// * `P` - ProgressReporter implementation
pub struct IncrementalLoader<E, P> {
    executor: E,
    progress_reporter: P,
    state: Mutex<LoaderState>,
}

impl<E, P> IncrementalLoader<E, P>
where
    E: QueryExecutor,
    P: ProgressReporter,
{
    /// Creates a loader with the broad default criteria and no data
    pub fn new(executor: E, progress_reporter: P) -> Self {
        Self {
            executor,
            progress_reporter,
            state: Mutex::new(LoaderState {
                request: GraphRequest::default(),
                limit: PAGE_SIZE,
                generation: 0,
                snapshot: GraphSnapshot::empty(PAGE_SIZE, 0),
            }),
        }
    }

    pub async fn apply_filters(&self, request: GraphRequest) -> Result<GraphSnapshot> {
        let ticket = {
            let mut state = self.lock_state()?;
            state.request = request;
            state.limit = PAGE_SIZE;
            Self::issue(&mut state)
        };
        self.fetch(ticket).await
    }

    pub async fn load_more(&self) -> Result<GraphSnapshot> {
        let ticket = {
            let mut state = self.lock_state()?;
            state.limit += PAGE_SIZE;
            Self::issue(&mut state)
        };
        self.fetch(ticket).await
    }

    /// Applies `request`, then loads up to `extra_pages` more pages while
    /// the store reports more rows
    pub async fn load_pages(
        &self,
        request: GraphRequest,
        extra_pages: usize,
    ) -> Result<GraphSnapshot> {
        let mut snapshot = self.apply_filters(request).await?;

        for page in 1..=extra_pages {
            if !snapshot.has_more {
                break;
            }
            self.progress_reporter.report_progress(
                page,
                extra_pages,
                Some(&format!("{} more available", snapshot.more_available)),
            );
            snapshot = self.load_more().await?;
        }

        Ok(snapshot)
    }

    pub fn snapshot(&self) -> Result<GraphSnapshot> {
        Ok(self.lock_state()?.snapshot.clone())
    }

    pub fn current_limit(&self) -> Result<usize> {
        Ok(self.lock_state()?.limit)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, LoaderState>> {
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("Loader state lock was poisoned by a panicked fetch"))
    }

    /// Takes a new generation and compiles both programs for the current state
    fn issue(state: &mut LoaderState) -> FetchTicket {
        state.generation += 1;
        let options = CompileOptions {
            show_internet: state.request.show_internet,
        };
        let criteria = state.request.criteria.as_slice();

        FetchTicket {
            request: state.request.clone(),
            limit: state.limit,
            generation: state.generation,
            data_query: QueryCompiler::compile_with_options(criteria, state.limit, false, options),
            count_query: QueryCompiler::compile_with_options(criteria, state.limit, true, options),
        }
    }

    async fn fetch(&self, ticket: FetchTicket) -> Result<GraphSnapshot> {
        self.progress_reporter.report(&format!(
            "🔎 Querying graph store (limit {})...",
            ticket.limit
        ));

        let outcome = futures::try_join!(
            self.executor.execute(&ticket.data_query),
            self.executor.count(&ticket.count_query)
        );

        match outcome {
            Ok((records, total_count)) => {
                let normalized = GraphNormalizer::normalize_with_issues(&records);
                let graph = if ticket.request.show_internet {
                    InternetExposure::synthesize(normalized.model)
                } else {
                    normalized.model
                };

                let warnings: Vec<String> =
                    normalized.issues.iter().map(ToString::to_string).collect();
                for warning in &warnings {
                    self.progress_reporter.report_warning(warning);
                }

                let (has_more, more_available) =
                    GraphSnapshot::paginate(total_count, ticket.limit, PAGE_SIZE);
                self.progress_reporter.report_completion(&format!(
                    "✅ {} node(s), {} edge(s) of {} total",
                    graph.nodes.len(),
                    graph.edges.len(),
                    total_count
                ));

                self.publish(GraphSnapshot {
                    graph,
                    total_count,
                    limit: ticket.limit,
                    has_more,
                    more_available,
                    fetched_at: Utc::now(),
                    generation: ticket.generation,
                    data_query: ticket.data_query,
                    count_query: ticket.count_query,
                    warnings,
                })
            }
            Err(error) => {
                self.progress_reporter
                    .report_error(&format!("❌ Graph query failed: {}", error));

                let mut empty = GraphSnapshot::empty(ticket.limit, ticket.generation);
                empty.data_query = ticket.data_query;
                empty.count_query = ticket.count_query;
                self.publish(empty)?;
                Err(error)
            }
        }
    }

    fn publish(&self, snapshot: GraphSnapshot) -> Result<GraphSnapshot> {
        let mut state = self.lock_state()?;
        if snapshot.generation != state.generation {
            self.progress_reporter.report_warning(&format!(
                "Discarding response of superseded request #{} (latest is #{})",
                snapshot.generation, state.generation
            ));
            return Ok(snapshot);
        }
        state.snapshot = snapshot.clone();
        Ok(snapshot)
    }
}

#[async_trait]
impl<E, P> GraphExplorationPort for IncrementalLoader<E, P>
where
    E: QueryExecutor,
    P: ProgressReporter,
{
    async fn apply_filters(&self, request: GraphRequest) -> Result<GraphSnapshot> {
        IncrementalLoader::apply_filters(self, request).await
    }

    async fn load_more(&self) -> Result<GraphSnapshot> {
        IncrementalLoader::load_more(self).await
    }

    fn snapshot(&self) -> Result<GraphSnapshot> {
        IncrementalLoader::snapshot(self)
    }
}
