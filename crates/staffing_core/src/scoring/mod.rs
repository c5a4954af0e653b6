//! Match Scorer: fit scores and candidate ranking.
//!
//! # Responsibility
//! - Compute a deterministic 0..=100 fit score and a short reason for one
//!   (person, project) pair.
//! - Rank every candidate for a project.
//!
//! # Invariants
//! - Scoring is a pure function of person, project, availability snapshot
//!   and policy. No hidden state, no I/O.
//! - Ranking is total: score descending, then person id ascending.

pub mod scorer;

pub use scorer::{
    rank, score, EmptyRequirements, FitScore, MatchFactor, ScoreBreakdown, ScoringPolicy,
    Suggestion,
};
