use tracing::info_span;
use tracing::Span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Export;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Dump,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Dump => "dump",
        }
    }
    fn span(&self) -> Span {
        match self {
            Phase::Dump => info_span!("dump"),
        }
    }
}

impl OpMarker for Export {
    const NAME: &'static str = "export";
    type Phase = Phase;
    fn root_span() -> Span {
        info_span!("export")
    }
}
