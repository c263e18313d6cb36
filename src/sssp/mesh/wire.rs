use std::cmp::Ordering;

use crate::sssp::matrix::{Weight, INFINITY};

/// One worker's bid for the next vertex to settle.
///
/// Candidates order lexicographically by `(dist, vertex)`, with "no vertex"
/// after every real vertex. The minimum over any set of candidates is
/// therefore the closest vertex, lowest id on ties, no matter in which order
/// the candidates are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub dist: Weight,
    pub vertex: Option<usize>,
}

impl Candidate {
    /// The bid of a worker with no finite unsettled vertex.
    pub const NONE: Candidate = Candidate {
        dist: INFINITY,
        vertex: None,
    };

    pub fn new(dist: Weight, vertex: usize) -> Self {
        Self {
            dist,
            vertex: Some(vertex),
        }
    }

    fn key(&self) -> (Weight, usize) {
        (self.dist, self.vertex.unwrap_or(usize::MAX))
    }

    /// The reduction operator.
    pub fn combine(self, other: Candidate) -> Candidate {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Folds any number of candidates. An empty set reduces to
    /// [`Candidate::NONE`].
    pub fn reduce<I>(candidates: I) -> Candidate
    where
        I: IntoIterator<Item = Candidate>,
    {
        candidates.into_iter().fold(Candidate::NONE, Candidate::combine)
    }

    /// Whether this candidate names a vertex that can still be settled.
    pub fn is_settleable(&self) -> bool {
        self.vertex.is_some() && self.dist != INFINITY
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What a worker sends to the reducer.
#[derive(Debug, Clone)]
pub enum Contribution {
    /// The worker's local candidate for `round`.
    Bid {
        rank: usize,
        round: u64,
        candidate: Candidate,
    },
    /// The worker cannot continue.
    Abort { rank: usize, reason: String },
    /// The worker's link was dropped before it finished.
    Departed { rank: usize },
}

/// What the reducer publishes to every worker after a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Winner { round: u64, candidate: Candidate },
    Abort { origin: usize, reason: String },
}

/// A worker's final arrays, sent to the coordinator for assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalResult {
    pub rank: usize,
    pub dist: Vec<Weight>,
    pub pred: Vec<Option<usize>>,
}
