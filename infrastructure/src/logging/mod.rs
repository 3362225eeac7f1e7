//! Logging infrastructure: structured run logging.
//!
//! Provides [`JsonlRunLogger`], a JSONL file writer that implements the
//! [`AnalysisProgress`](architect_application::AnalysisProgress) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlRunLogger;
