use core::fmt;

use crate::sssp::{matrix::INFINITY, paths::ShortestPaths, SOURCE};

/// The `v / dist 0->v` table.
pub struct DistanceTable<'a>(&'a ShortestPaths);

impl fmt::Display for DistanceTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    v     dist {SOURCE}->v")?;
        writeln!(f, "  ----    ---------")?;
        for (v, dist) in self.0.distances() {
            if dist == INFINITY {
                writeln!(f, "    {v}        inf")?;
            } else {
                writeln!(f, "    {v}        {dist}")?;
            }
        }
        writeln!(f)
    }
}

/// The `v / Path 0->v` table. Unreachable vertices say so instead of
/// printing a path.
pub struct PathTable<'a>(&'a ShortestPaths);

impl fmt::Display for PathTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    v     Path {SOURCE}->v")?;
        writeln!(f, "  ----    ---------")?;
        for v in (0..self.0.len()).filter(|&v| v != SOURCE) {
            write!(f, "    {v}:    ")?;
            match self.0.path(v) {
                Some(path) => {
                    for hop in path {
                        write!(f, "{hop} ")?;
                    }
                }
                None => write!(f, "unreachable")?,
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

pub trait ReportExt {
    fn distance_table(&self) -> DistanceTable<'_>;
    fn path_table(&self) -> PathTable<'_>;
}

impl ReportExt for ShortestPaths {
    fn distance_table(&self) -> DistanceTable<'_> {
        DistanceTable(self)
    }

    fn path_table(&self) -> PathTable<'_> {
        PathTable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_tables() {
        let paths = ShortestPaths::new(
            vec![0, 1, 3, INFINITY],
            vec![None, Some(0), Some(1), None],
        );
        assert_eq!(
            paths.distance_table().to_string(),
            "    v     dist 0->v\n  ----    ---------\n\
             \x20   1        1\n\
             \x20   2        3\n\
             \x20   3        inf\n\n"
        );
        assert_eq!(
            paths.path_table().to_string(),
            "    v     Path 0->v\n  ----    ---------\n\
             \x20   1:    0 1 \n\
             \x20   2:    0 1 2 \n\
             \x20   3:    unreachable\n\n"
        );
    }
}
