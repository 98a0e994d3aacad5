//! TemplatePress - placeholder stamping over template trees
//!
//! Copies a directory of template files to an output location, substituting
//! `{{ key }}` tokens in file contents from a flat key→value configuration
//! and optionally renaming files via `$$FILE_<pattern>` rules from the same
//! configuration.
//!
//! # Architecture
//!
//! ```text
//! stamp.json ──► StampConfig ──┬──► Substituter      ({{ key }} tokens)
//!                              └──► Vec<RenameRule>  ($$FILE_ keys)
//!
//! template/ ──► TemplateProcessor::process ──► output/
//! output/   ──► TemplateProcessor::rename_in_place (moves on disk)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use templatepress::{StampConfig, TemplateProcessor};
//!
//! let config = StampConfig::from_json(r#"{"name": "World"}"#)?;
//! let sink = |line: &str| println!("{line}");
//! let processor = TemplateProcessor::new(&sink);
//! processor.process("template".as_ref(), "out".as_ref(), &config, false).await?;
//! ```

pub mod cli;
pub mod config;
pub mod processor;
pub mod rename;
pub mod substitute;

pub use config::{FILE_RULE_PREFIX, StampConfig};
pub use processor::{ProcessSummary, TemplateProcessor};
pub use rename::{RenameRule, apply_renaming};
pub use substitute::Substituter;

/// Consumer for the human-readable progress lines every operation emits.
///
/// This is the only externally observable progress signal; callers decide
/// where lines go (terminal, run log files, test buffers). Implemented for
/// any `Fn(&str)` closure.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}
