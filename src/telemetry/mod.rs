pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

// Factory helpers, one per op
pub fn crawl() -> LogCtx<ops::crawl::Crawl> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn registry() -> LogCtx<ops::registry::Registry> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
