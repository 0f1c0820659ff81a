use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, error, info, warn, Span};

use super::emit;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str {
        O::NAME
    }

    pub fn root_span(&self) -> Span {
        O::root_span()
    }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span {
        ph.span()
    }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.json {
            info!(op = %self.op_name(), "{}", msg.as_ref());
        } else {
            info!("{}", msg.as_ref());
        }
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        if self.json {
            debug!(op = %self.op_name(), "{}", msg.as_ref());
        } else {
            debug!("{}", msg.as_ref());
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.json {
            warn!(op = %self.op_name(), "{}", msg.as_ref());
        } else {
            warn!("{}", msg.as_ref());
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        if self.json {
            error!(op = %self.op_name(), "{}", msg.as_ref());
        } else {
            error!("{}", msg.as_ref());
        }
    }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json {
            let details = kv_to_string(kv);
            info!(op = %self.op_name(), details = %details, "{}", msg);
        } else {
            info!("{}", msg);
        }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json {
            let details = kv_to_string(kv);
            warn!(op = %self.op_name(), details = %details, "{}", msg);
        } else {
            warn!("{}", msg);
        }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> {
        emit::print_plan(self.op_name(), plan, None)
    }

    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> {
        emit::print_result(self.op_name(), result, None)
    }
}

// Run-specific helpers remain available on the typed context
impl LogCtx<crate::telemetry::ops::run::Run> {
    pub fn site_summary(&self, site: &str, found: usize, saved: usize, duplicates: usize, errors: usize, secs: f64) {
        if self.json {
            info!(op = %self.op_name(), site, found, saved, duplicates, errors, secs, "site_summary");
        } else {
            info!(
                "✅ {} — found={} saved={} duplicates={} errors={} ({:.2}s)",
                site, found, saved, duplicates, errors, secs
            );
        }
    }

    pub fn totals(&self, sites: usize, found: usize, saved: usize, duplicates: usize, errors: usize) {
        if self.json {
            info!(op = %self.op_name(), sites, found, saved, duplicates, errors, "run_totals");
        } else {
            info!(
                "📊 Run totals — sites={} found={} saved={} duplicates={} errors={}",
                sites, found, saved, duplicates, errors
            );
        }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv {
        parts.push(format!("{}={}", k, v));
    }
    parts.join(" ")
}
