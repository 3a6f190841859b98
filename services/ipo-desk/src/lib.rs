//! ipo-desk - Mainboard IPO listings with LLM-written analyses.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod cache;
pub mod desk;
pub mod error;
pub mod llm;
pub mod model;
pub mod render;
pub mod report;
pub mod routes;
pub mod scrape;

pub use cache::{Freshness, IpoCache, ListingsSnapshot};
pub use desk::{DeskSettings, IpoDesk};
pub use error::{DeskError, DeskResult};
pub use llm::{GeminiSummarizer, SummarizeError, Summarizer};
pub use model::{AnalysisKey, AnalysisRecord, IpoKind, IpoListing, IpoListings};
pub use render::{ChromeRenderer, RenderError, Renderer, WaitFor};
pub use report::{run_report, ReportSummary};
pub use routes::{build_router, AppState};
