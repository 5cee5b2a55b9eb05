//! Command-line tooling around `knowlens-core`: replay recorded extraction
//! streams and exercise the layout cache.

pub mod demo;
pub mod replay;

pub use demo::{ring_layout, run_cache_demo};
pub use replay::{
    load_script, parse_script, replay, ConsoleObserver, ReplayOptions, ScriptedService,
    LIVE_ID_PLACEHOLDER,
};
