use tracing::info_span;
use tracing::Span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Run;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Site,
    Classify,
    Save,
    Report,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Site => "site",
            Phase::Classify => "classify",
            Phase::Save => "save",
            Phase::Report => "report",
        }
    }
    fn span(&self) -> Span {
        match self {
            Phase::Site => info_span!("site"),
            Phase::Classify => info_span!("classify"),
            Phase::Save => info_span!("save"),
            Phase::Report => info_span!("report"),
        }
    }
}

impl OpMarker for Run {
    const NAME: &'static str = "run";
    type Phase = Phase;
    fn root_span() -> Span {
        info_span!("run")
    }
}
