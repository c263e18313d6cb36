use byteorder::{ByteOrder, LittleEndian};

use super::{
    matrix::{Weight, INFINITY},
    SOURCE,
};

/// Sentinel written into the digest for "no predecessor".
const NO_PRED: u64 = u64::MAX;

/// The assembled global distance and predecessor tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    dist: Vec<Weight>,
    pred: Vec<Option<usize>>,
}

impl ShortestPaths {
    pub fn new(dist: Vec<Weight>, pred: Vec<Option<usize>>) -> Self {
        debug_assert_eq!(dist.len(), pred.len());
        Self { dist, pred }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.dist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }

    pub fn dist(&self) -> &[Weight] {
        &self.dist
    }

    pub fn pred(&self) -> &[Option<usize>] {
        &self.pred
    }

    pub fn distance(&self, vertex: usize) -> Option<Weight> {
        self.dist.get(vertex).copied()
    }

    pub fn is_reachable(&self, vertex: usize) -> bool {
        self.distance(vertex).map_or(false, |d| d != INFINITY)
    }

    /// `(v, dist[v])` for every vertex but the source, in increasing order.
    pub fn distances(&self) -> impl Iterator<Item = (usize, Weight)> + '_ {
        self.dist
            .iter()
            .copied()
            .enumerate()
            .filter(|&(v, _)| v != SOURCE)
    }

    /// The vertex sequence from the source to `vertex`, or `None` if
    /// `vertex` is unreachable or the predecessor chain is broken.
    pub fn path(&self, vertex: usize) -> Option<Vec<usize>> {
        if !self.is_reachable(vertex) {
            return None;
        }
        let mut path = vec![vertex];
        let mut at = vertex;
        while at != SOURCE {
            at = self.pred.get(at).copied().flatten()?;
            path.push(at);
            // A chain longer than the vertex count can only be a cycle.
            if path.len() > self.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }

    /// A fingerprint of both tables. Equal digests mean byte-identical
    /// results.
    pub fn digest(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        let mut word = [0u8; 8];
        LittleEndian::write_u64(&mut word, self.len() as u64);
        hasher.update(&word);
        for &d in &self.dist {
            LittleEndian::write_u64(&mut word, d);
            hasher.update(&word);
        }
        for p in &self.pred {
            LittleEndian::write_u64(&mut word, p.map_or(NO_PRED, |p| p as u64));
            hasher.update(&word);
        }
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ShortestPaths {
        // 0 -> 1 -> 2, 3 unreachable
        ShortestPaths::new(
            vec![0, 1, 3, INFINITY],
            vec![None, Some(0), Some(1), None],
        )
    }

    #[test]
    fn paths_follow_predecessors() {
        let paths = sample();
        assert_eq!(paths.path(0), Some(vec![0]));
        assert_eq!(paths.path(2), Some(vec![0, 1, 2]));
        assert_eq!(paths.path(3), None);
        assert_eq!(paths.path(9), None);
        assert!(!paths.is_reachable(3));
    }

    #[test]
    fn distances_skip_the_source() {
        let rows: Vec<_> = sample().distances().collect();
        assert_eq!(rows, vec![(1, 1), (2, 3), (3, INFINITY)]);
    }

    #[test]
    fn digest_tracks_predecessors_too() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.digest(), b.digest());
        b.pred[2] = Some(0);
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn cyclic_chain_is_not_a_path() {
        let broken =
            ShortestPaths::new(vec![0, 1, 1], vec![None, Some(2), Some(1)]);
        assert_eq!(broken.path(1), None);
    }
}
