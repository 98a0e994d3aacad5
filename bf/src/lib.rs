//! BranchForge - template stamping with a git bracket
//!
//! Runs the whole flow the old desktop tool drove by hand: check out a base
//! branch, pull it, cut a new branch, stamp a template tree into the working
//! copy (via [`templatepress`]), commit, push, and prepare a pull-request
//! URL for the result.
//!
//! # Pipeline
//!
//! ```text
//! checkout base ─► pull ─► new branch ─► stamp templates ─► rename pass
//!       ─► add ─► commit ─► push ─► prepare PR URL
//! ```
//!
//! Progress is observable only through the run log stream ([`progress`]):
//! every step emits human-readable lines to a broadcast bus consumed by the
//! terminal printer and a per-run JSONL file. The run itself resolves to a
//! [`workflow::RunOutcome`] - `success: true` with no escaped error is the
//! only positive outcome.

pub mod cli;
pub mod config;
pub mod git;
pub mod pr;
pub mod progress;
pub mod workflow;

pub use config::Config;
pub use git::{GitError, GitRunner};
pub use pr::{PrClient, PrError, PrOutcome, RepoSlug};
pub use progress::{LogBus, Reporter, RunLogWriter};
pub use workflow::{RunOptions, RunOutcome};
