use tracing::info_span;
use tracing::Span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Stats;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Summary,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Summary => "summary",
        }
    }
    fn span(&self) -> Span {
        match self {
            Phase::Summary => info_span!("summary"),
        }
    }
}

impl OpMarker for Stats {
    const NAME: &'static str = "stats";
    type Phase = Phase;
    fn root_span() -> Span {
        info_span!("stats")
    }
}
