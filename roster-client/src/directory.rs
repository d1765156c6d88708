//! Member directory session
//!
//! Wires Filter State, the fetch pipeline, the evaluator and the reveal
//! controller to the three presentation triggers:
//! - filter change → [`MemberDirectory::apply_filters`]
//! - scroll near bottom / "load more" → [`MemberDirectory::load_more`]
//! - "clear filters" → [`MemberDirectory::clear_filters`]
//!
//! The map view pulls up to a hard cap with [`MemberDirectory::load_map`].

use std::sync::Arc;

use roster_common::config::ClientConfig;
use roster_common::events::EventBus;
use roster_common::options::{CountryTable, SearchOptions};
use roster_common::query::FilterBody;
use roster_common::{Member, Result};
use tracing::info;

use crate::evaluator::{evaluate, EvaluatorOptions};
use crate::filter_state::{build_filters, FilterState};
use crate::markers::{build_markers, MapMarker};
use crate::pipeline::{FetchAllSummary, MemberPipeline, PageOutcome, PipelineSettings};
use crate::reveal::{LoadMore, RevealController};
use crate::source::{HttpMemberSource, MemberSource};

pub struct MemberDirectory<S> {
    filters: FilterState,
    pipeline: Arc<MemberPipeline<S>>,
    reveal: RevealController,
    options: EvaluatorOptions,
    map_member_cap: usize,
    events: EventBus,
}

impl<S: MemberSource> MemberDirectory<S> {
    pub fn new(source: S, config: &ClientConfig, events: EventBus) -> Self {
        let pipeline = MemberPipeline::new(source, PipelineSettings::from(config), events.clone());
        Self {
            filters: FilterState::new(events.clone()),
            pipeline: Arc::new(pipeline),
            reveal: RevealController::new(config.reveal_step),
            options: EvaluatorOptions {
                country_field: config.country_match,
            },
            map_member_cap: config.map_member_cap,
            events,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Mutable access for the search form's setters
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    /// Shared handle, e.g. to run a bulk pull on another task
    pub fn pipeline(&self) -> Arc<MemberPipeline<S>> {
        Arc::clone(&self.pipeline)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn reveal(&self) -> &RevealController {
        &self.reveal
    }

    /// Empty predicate: the list/map views must send the user to the search form
    pub fn needs_search_redirect(&self) -> bool {
        !self.filters.has_active_filters()
    }

    /// Restart the list for the current predicate and fetch its first page
    pub async fn apply_filters(&mut self) -> Result<PageOutcome> {
        self.pipeline.reset().await;
        self.reveal.reset();
        let body = self.filter_body();
        self.pipeline.fetch_page(&body).await
    }

    pub async fn load_more(&mut self) -> Result<LoadMore> {
        let matching_len = self.matching().await.len();
        let body = self.filter_body();
        self.reveal.load_more(matching_len, &self.pipeline, &body).await
    }

    /// Reset all filters and drop the member set
    pub async fn clear_filters(&mut self) {
        self.filters.reset_filters();
        self.pipeline.reset().await;
        self.reveal.reset();
    }

    /// All in-memory members matching the predicate
    pub async fn matching(&self) -> Vec<Member> {
        let members = self.pipeline.members().await;
        evaluate(&members, self.filters.predicate(), &self.options)
    }

    pub async fn visible_members(&self) -> Vec<Member> {
        let matching = self.matching().await;
        self.reveal.visible(&matching).to_vec()
    }

    pub async fn has_more(&self) -> bool {
        self.reveal.has_more(self.matching().await.len())
    }

    /// Restart and pull up to the map cap
    pub async fn load_map(&mut self) -> Result<FetchAllSummary> {
        self.pipeline.reset().await;
        self.reveal.reset();
        let body = self.filter_body();
        let summary = self.pipeline.fetch_all(&body, self.map_member_cap).await?;
        info!(added = summary.added, "Map members loaded");
        Ok(summary)
    }

    pub async fn map_markers(&self) -> Vec<MapMarker> {
        build_markers(&self.matching().await, CountryTable::bundled())
    }

    fn filter_body(&self) -> FilterBody {
        build_filters(self.filters.predicate(), self.options.country_field)
    }
}

impl MemberDirectory<HttpMemberSource> {
    /// Session against the forwarding server named by `config.api_base_url`
    pub fn connect(config: &ClientConfig, events: EventBus) -> Result<Self> {
        let source = HttpMemberSource::from_config(config)?;
        info!(base_url = source.base_url(), "Member directory connected");
        Ok(Self::new(source, config, events))
    }

    /// Option lists for the search form, countries as reported upstream
    pub async fn search_options(&self) -> Result<SearchOptions> {
        let codes = self.pipeline.source().fetch_countries().await?;
        Ok(SearchOptions::with_countries(&codes))
    }
}
