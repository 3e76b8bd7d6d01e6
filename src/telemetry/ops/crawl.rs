use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Crawl;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Library, FetchPage, Extract, Narrow, WriteOut, Append }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Library => "library",
        Phase::FetchPage => "fetch_page",
        Phase::Extract => "extract",
        Phase::Narrow => "narrow",
        Phase::WriteOut => "write_out",
        Phase::Append => "append",
    }}
    fn span(&self) -> Span { match self {
        Phase::Library => info_span!("library"),
        Phase::FetchPage => info_span!("fetch_page"),
        Phase::Extract => info_span!("extract"),
        Phase::Narrow => info_span!("narrow"),
        Phase::WriteOut => info_span!("write_out"),
        Phase::Append => info_span!("append"),
    }}
}

impl OpMarker for Crawl {
    const NAME: &'static str = "crawl";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("crawl") }
}
