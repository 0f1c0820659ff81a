use tracing::info_span;
use tracing::Span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Init;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Schema,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Schema => "schema",
        }
    }
    fn span(&self) -> Span {
        match self {
            Phase::Schema => info_span!("schema"),
        }
    }
}

impl OpMarker for Init {
    const NAME: &'static str = "init";
    type Phase = Phase;
    fn root_span() -> Span {
        info_span!("init")
    }
}
