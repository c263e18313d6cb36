use cortex::{solve_blocking, sssp::reference, Config, Graph, Matrix, INFINITY};
use proptest::prelude::*;

/// An `n x n` matrix with a zero diagonal; `None` entries become absent edges.
fn square(n: usize) -> impl Strategy<Value = Graph> {
    let cell = prop::option::weighted(0.4, 1u64..50);
    prop::collection::vec(cell, n * n).prop_map(move |cells| {
        let buf = cells
            .into_iter()
            .enumerate()
            .map(|(i, w)| match (i / n == i % n, w) {
                (true, _) => 0,
                (false, Some(w)) => w,
                (false, None) => INFINITY,
            })
            .collect();
        Graph::new(Matrix::new(n, n, buf).unwrap()).unwrap()
    })
}

fn graph(max_n: usize) -> impl Strategy<Value = Graph> {
    (1..=max_n).prop_flat_map(square)
}

/// Every worker count that divides twelve vertices.
const DIVISORS: [usize; 6] = [1, 2, 3, 4, 6, 12];

fn twelve() -> impl Strategy<Value = Graph> {
    square(12)
}

fn run(graph: &Graph, workers: usize) -> cortex::ShortestPaths {
    let config = Config::builder().workers(workers).build();
    solve_blocking(graph, &config).unwrap().paths
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn one_worker_matches_sequential_dijkstra(g in graph(10)) {
        let paths = run(&g, 1);
        prop_assert_eq!(paths.dist(), &reference::sequential(&g)[..]);
        prop_assert_eq!(paths.distance(0), Some(0));
    }

    #[test]
    fn distances_do_not_depend_on_worker_count(g in twelve()) {
        let expected = reference::sequential(&g);
        for workers in DIVISORS {
            let paths = run(&g, workers);
            prop_assert_eq!(
                paths.dist(),
                &expected[..],
                "workers = {}",
                workers
            );
        }
    }

    #[test]
    fn triangle_inequality_holds(g in twelve()) {
        for workers in DIVISORS {
            let paths = run(&g, workers);
            for (u, v, w) in g.edges() {
                let du = paths.distance(u).unwrap();
                let dv = paths.distance(v).unwrap();
                prop_assert!(
                    dv <= du.saturating_add(w),
                    "edge {}->{} with {} workers",
                    u,
                    v,
                    workers
                );
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical(
        g in twelve(),
        workers in prop::sample::select(DIVISORS.to_vec()),
    ) {
        let first = run(&g, workers);
        let second = run(&g, workers);
        prop_assert_eq!(first.digest(), second.digest());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reachable_paths_have_the_reported_length(g in twelve()) {
        let paths = run(&g, 4);
        for v in 0..g.order() {
            match paths.path(v) {
                Some(path) => {
                    let length: u64 = path
                        .windows(2)
                        .map(|hop| g.weight(hop[0], hop[1]).unwrap())
                        .sum();
                    prop_assert_eq!(Some(length), paths.distance(v));
                }
                None => prop_assert_eq!(paths.distance(v), Some(INFINITY)),
            }
        }
    }
}
