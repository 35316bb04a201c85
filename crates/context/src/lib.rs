//! Context gathering for oli.
//!
//! Sources produce labeled [`ContextUnit`](oli_core::ContextUnit)s, the
//! aggregator runs them and absorbs their failures, and the assembler turns
//! the ordered units plus the task into a [`MessagePair`](oli_core::MessagePair).

pub mod aggregator;
pub mod assembler;
pub mod git;
pub mod walker;

pub use aggregator::ContextAggregator;
pub use assembler::PromptAssembler;
pub use git::GitSnapshot;
pub use walker::{ListedReason, TreeWalker, WalkEntry, WalkReport, WalkRules};
