//! roster-client - member directory core
//!
//! Everything between the search form and the list/map views:
//! - [`filter_state`]: the active search predicate and its translation to
//!   the upstream filter body
//! - [`pipeline`]: paginated fetching into an append-only member set
//! - [`evaluator`]: client-side predicate matching
//! - [`reveal`]: how many matching members are shown
//! - [`markers`]: map markers and clustering
//! - [`directory`]: one session wiring the above to presentation triggers
//!
//! Network access goes through the [`source::MemberSource`] trait so the
//! core can be driven without a server.

pub mod directory;
pub mod evaluator;
pub mod filter_state;
pub mod markers;
pub mod pipeline;
pub mod reveal;
pub mod source;

pub use directory::MemberDirectory;
pub use evaluator::{evaluate, EvaluatorOptions};
pub use filter_state::{build_filters, FilterPredicate, FilterState};
pub use pipeline::{FetchAllSummary, MemberPipeline, PageOutcome, PipelineSettings, StopReason};
pub use reveal::{LoadMore, RevealController};
pub use source::{HttpMemberSource, MemberSource};
