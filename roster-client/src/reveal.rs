//! Incremental Reveal Controller
//!
//! Decouples how many members are in memory from how many are shown. The
//! visible window starts at one step and grows by one step per "load more";
//! when the window outgrows the matching members, another backend page is
//! requested unless the pipeline already hit the end of data.

use roster_common::query::FilterBody;
use roster_common::{Member, Result};
use tracing::debug;

use crate::pipeline::{MemberPipeline, PageOutcome};
use crate::source::MemberSource;

/// What a `load_more` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Nothing left to reveal; no growth, no request
    Idle,
    /// Window grew, no request needed or possible
    Revealed,
    /// Window grew and a page was requested
    Fetched(PageOutcome),
}

/// Visible window over the matching members
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealController {
    visible_count: usize,
    step: usize,
}

impl Default for RevealController {
    fn default() -> Self {
        Self::new(20)
    }
}

impl RevealController {
    pub fn new(step: usize) -> Self {
        let step = step.max(1);
        Self {
            visible_count: step,
            step,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Back to one step; called whenever the predicate changes
    pub fn reset(&mut self) {
        self.visible_count = self.step;
    }

    /// The shown prefix of `matching`
    pub fn visible<'a>(&self, matching: &'a [Member]) -> &'a [Member] {
        &matching[..self.visible_count.min(matching.len())]
    }

    pub fn has_more(&self, matching_len: usize) -> bool {
        self.visible_count.min(matching_len) < matching_len
    }

    /// Grow the window and fetch another page when it outruns the data.
    ///
    /// No request is made once the pipeline has seen an empty page, so a
    /// predicate that starves the visible set cannot loop on empty pages.
    pub async fn load_more<S: MemberSource>(
        &mut self,
        matching_len: usize,
        pipeline: &MemberPipeline<S>,
        filters: &FilterBody,
    ) -> Result<LoadMore> {
        if !self.has_more(matching_len) {
            return Ok(LoadMore::Idle);
        }

        self.visible_count += self.step;
        debug!(visible = self.visible_count, matching_len, "Revealing more members");

        if self.visible_count > matching_len && !pipeline.is_exhausted().await {
            let outcome = pipeline.fetch_page(filters).await?;
            return Ok(LoadMore::Fetched(outcome));
        }

        Ok(LoadMore::Revealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(n: usize) -> Vec<Member> {
        (0..n as i64)
            .map(|id| Member {
                id,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_visible_window() {
        let reveal = RevealController::new(20);
        let all = members(15);
        assert_eq!(reveal.visible(&all).len(), 15);
        assert!(!reveal.has_more(15));

        let all = members(50);
        assert_eq!(reveal.visible(&all).len(), 20);
        assert!(reveal.has_more(50));
    }

    #[test]
    fn test_reset_restores_initial_window() {
        let mut reveal = RevealController::new(10);
        reveal.visible_count = 70;
        reveal.reset();
        assert_eq!(reveal.visible_count(), 10);
    }

    #[test]
    fn test_zero_step_clamped() {
        assert_eq!(RevealController::new(0).step(), 1);
    }
}
