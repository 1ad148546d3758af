//! # rankfuse Cross-Validation
//!
//! k-fold cross-validation of learned rank fusion.
//!
//! ## Phases
//!
//! 1. Setup: earlier outputs cleared, working directories, copied runs, fold partitions
//! 2. Test build: one feature file per fold
//! 3. Train assembly: leave-one-fold-out concatenation by cyclic rotation
//! 4. Weight learning: external learner per training file
//! 5. Combine: each fold's test file scored with the weights that never saw it
//! 6. Final concat: per-fold fused runs appended in fold order
//!
//! Phases 2-5 fan out one task per fold with a barrier between phases.

pub mod assembly;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod summary;

pub use assembly::{TrainingSet, concat_files, leave_one_out_sets};
pub use context::PipelineContext;
pub use error::{CrossValError, Phase};
pub use pipeline::{CrossValOptions, CrossValOutcome, CrossValidator};
pub use pool::FoldPool;
pub use summary::{FoldSummary, RunSummary};
