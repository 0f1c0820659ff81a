use tracing::info_span;
use tracing::Span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Report;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Build,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Build => "build",
        }
    }
    fn span(&self) -> Span {
        match self {
            Phase::Build => info_span!("build"),
        }
    }
}

impl OpMarker for Report {
    const NAME: &'static str = "report";
    type Phase = Phase;
    fn root_span() -> Span {
        info_span!("report")
    }
}
