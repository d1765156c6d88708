//! Member Fetch Pipeline
//!
//! Pulls members from a [`MemberSource`] in fixed-size pages and keeps the
//! accumulated member set plus the pagination cursor.
//!
//! # Ordering
//! Page requests are serialised: offset N+1 is never requested before the
//! response for offset N has been applied.
//!
//! # Resets and stale responses
//! `reset()` does not wait for or cancel an in-flight request. It bumps a
//! generation counter instead; a response is applied only if the generation
//! it was issued under is still current, otherwise it is dropped.
//!
//! # Failures
//! A failed request aborts the current operation and is returned to the
//! caller. Pages committed earlier stay in the set. There is no automatic
//! retry.

use std::time::Duration;

use roster_common::config::ClientConfig;
use roster_common::events::{DirectoryEvent, EventBus};
use roster_common::member::decode_page;
use roster_common::query::{FilterBody, PageRequest};
use roster_common::{Member, Result};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::source::MemberSource;

/// Tunables for paging and throttling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub page_size: u64,
    /// Consecutive pages `fetch_all` requests before pausing
    pub batch_burst: usize,
    pub throttle: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            batch_burst: 5,
            throttle: Duration::from_millis(50),
        }
    }
}

impl From<&ClientConfig> for PipelineSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            batch_burst: config.batch_burst.max(1),
            throttle: config.throttle(),
        }
    }
}

/// Result of a single page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page committed
    Appended { added: usize, total: usize },
    /// Upstream returned no rows; no more data for this predicate
    Empty,
    /// A reset happened while the request was in flight; response dropped
    Stale,
    /// An earlier page was empty; no request issued
    Exhausted,
}

/// Why `fetch_all` stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfData,
    CapReached,
    Reset,
}

/// Progress of one `fetch_all` pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchAllSummary {
    pub pages: usize,
    pub added: usize,
    pub stopped: StopReason,
}

#[derive(Debug, Default)]
struct PipelineState {
    members: Vec<Member>,
    offset: u64,
    exhausted: bool,
    generation: u64,
}

/// Paginated accumulator over a [`MemberSource`]
pub struct MemberPipeline<S> {
    source: S,
    settings: PipelineSettings,
    state: RwLock<PipelineState>,
    /// Serialises page requests
    fetch_lock: Mutex<()>,
    events: EventBus,
}

impl<S: MemberSource> MemberPipeline<S> {
    pub fn new(source: S, settings: PipelineSettings, events: EventBus) -> Self {
        Self {
            source,
            settings,
            state: RwLock::new(PipelineState::default()),
            fetch_lock: Mutex::new(()),
            events,
        }
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Request one page at the current offset and append it
    pub async fn fetch_page(&self, filters: &FilterBody) -> Result<PageOutcome> {
        let _guard = self.fetch_lock.lock().await;
        self.fetch_page_locked(filters, None).await
    }

    /// Pull pages until end of data, `max_total` members, or a reset.
    ///
    /// Pauses for the configured throttle after every `batch_burst` pages.
    /// Pages are committed as they arrive, so an aborted pull keeps what it
    /// already fetched.
    pub async fn fetch_all(&self, filters: &FilterBody, max_total: usize) -> Result<FetchAllSummary> {
        let _guard = self.fetch_lock.lock().await;
        let start_generation = self.state.read().await.generation;

        let mut pages = 0;
        let mut added = 0;
        let mut burst = 0;

        let stopped = loop {
            {
                let state = self.state.read().await;
                if state.generation != start_generation {
                    break StopReason::Reset;
                }
                if state.members.len() >= max_total {
                    break StopReason::CapReached;
                }
                if state.exhausted {
                    break StopReason::EndOfData;
                }
            }

            if burst >= self.settings.batch_burst {
                debug!(pages, "Pausing bulk member pull");
                tokio::time::sleep(self.settings.throttle).await;
                burst = 0;
            }

            match self.fetch_page_locked(filters, Some(max_total)).await? {
                PageOutcome::Appended { added: n, .. } => {
                    pages += 1;
                    burst += 1;
                    added += n;
                }
                PageOutcome::Empty | PageOutcome::Exhausted => break StopReason::EndOfData,
                PageOutcome::Stale => break StopReason::Reset,
            }
        };

        info!(pages, added, ?stopped, "Bulk member pull finished");
        Ok(FetchAllSummary {
            pages,
            added,
            stopped,
        })
    }

    /// Clear the member set and cursor; in-flight responses become stale
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.members.clear();
        state.offset = 0;
        state.exhausted = false;
        state.generation += 1;
        debug!(generation = state.generation, "Member set reset");
        self.events.emit_lossy(DirectoryEvent::MembersCleared {
            generation: state.generation,
        });
    }

    pub async fn members(&self) -> Vec<Member> {
        self.state.read().await.members.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.members.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.members.is_empty()
    }

    pub async fn offset(&self) -> u64 {
        self.state.read().await.offset
    }

    pub async fn is_exhausted(&self) -> bool {
        self.state.read().await.exhausted
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Caller must hold `fetch_lock`
    async fn fetch_page_locked(&self, filters: &FilterBody, cap: Option<usize>) -> Result<PageOutcome> {
        let (generation, offset) = {
            let state = self.state.read().await;
            if state.exhausted {
                return Ok(PageOutcome::Exhausted);
            }
            (state.generation, state.offset)
        };

        let page = PageRequest {
            offset,
            limit: self.settings.page_size,
        };

        let result = self.source.fetch_page(page, filters).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(
                issued = generation,
                current = state.generation,
                offset,
                "Dropping stale member page"
            );
            return Ok(PageOutcome::Stale);
        }

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                error!(offset, "Member page fetch failed: {}", e);
                self.events.emit_lossy(DirectoryEvent::FetchFailed {
                    generation,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        state.offset += self.settings.page_size;

        if rows.is_empty() {
            state.exhausted = true;
            debug!(offset, "Empty member page, no more data");
            self.events.emit_lossy(DirectoryEvent::MembersAppended {
                generation,
                added: 0,
                total: state.members.len(),
                offset: state.offset,
            });
            return Ok(PageOutcome::Empty);
        }

        let mut members = decode_page(&rows);
        if let Some(cap) = cap {
            members.truncate(cap.saturating_sub(state.members.len()));
        }
        let added = members.len();
        state.members.extend(members);

        debug!(offset, added, total = state.members.len(), "Member page committed");
        self.events.emit_lossy(DirectoryEvent::MembersAppended {
            generation,
            added,
            total: state.members.len(),
            offset: state.offset,
        });

        Ok(PageOutcome::Appended {
            added,
            total: state.members.len(),
        })
    }
}
