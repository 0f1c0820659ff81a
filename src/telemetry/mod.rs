pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

// Factory helpers, one per CLI operation
pub fn run() -> LogCtx<ops::run::Run> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn sites() -> LogCtx<ops::sites::Sites> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn stats() -> LogCtx<ops::stats::Stats> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn export() -> LogCtx<ops::export::Export> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn report() -> LogCtx<ops::report::Report> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn init() -> LogCtx<ops::init::Init> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
