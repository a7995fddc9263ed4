use astar_pool::grid::{Grid, WallConfig, grid_rng, manhattan};
use astar_pool::{
    CancelToken, Graph, Heuristic, Neighbor, SearchConfig, SearchError, ZeroHeuristic, search,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Directed graph over node indices with integer edge costs.
#[derive(Debug, Clone)]
struct Digraph {
    nodes: usize,
    edges: HashMap<usize, Vec<Neighbor<usize>>>,
}

impl Digraph {
    fn new(nodes: usize, edges: &[(usize, usize, u8)]) -> Self {
        let mut adjacency: HashMap<usize, Vec<Neighbor<usize>>> = HashMap::new();
        for &(from, to, cost) in edges {
            adjacency
                .entry(from % nodes)
                .or_default()
                .push(Neighbor::new(to % nodes, f64::from(cost)));
        }
        Self {
            nodes,
            edges: adjacency,
        }
    }

    fn edge_cost(&self, from: usize, to: usize) -> Option<f64> {
        self.edges
            .get(&from)?
            .iter()
            .filter(|n| n.node == to)
            .map(|n| n.cost)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Reference shortest-path costs from `start` (Bellman-Ford).
    fn shortest_costs(&self, start: usize) -> Vec<Option<f64>> {
        let mut dist = vec![None; self.nodes];
        dist[start] = Some(0.0);
        for _ in 0..self.nodes {
            for (&from, neighbors) in &self.edges {
                let Some(d) = dist[from] else { continue };
                for n in neighbors {
                    let candidate = d + n.cost;
                    if dist[n.node].is_none_or(|known| candidate < known) {
                        dist[n.node] = Some(candidate);
                    }
                }
            }
        }
        dist
    }

    fn reachable(&self, start: usize) -> usize {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for n in self.neighbors(&node) {
                if seen.insert(n.node) {
                    queue.push_back(n.node);
                }
            }
        }
        seen.len()
    }
}

impl Graph<usize> for Digraph {
    fn neighbors(&self, node: &usize) -> Vec<Neighbor<usize>> {
        self.edges.get(node).cloned().unwrap_or_default()
    }
}

fn assert_valid_path(graph: &Digraph, path: &[usize], start: usize, goal: usize, cost: f64) {
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    let mut total = 0.0;
    for pair in path.windows(2) {
        total += graph
            .edge_cost(pair[0], pair[1])
            .unwrap_or_else(|| panic!("{} -> {} is not an edge", pair[0], pair[1]));
    }
    assert_eq!(total, cost);
}

fn digraph_strategy() -> impl Strategy<Value = (Digraph, usize, usize)> {
    (2usize..12).prop_flat_map(|nodes| {
        (
            prop::collection::vec((0..nodes, 0..nodes, 0u8..10), 0..40),
            0..nodes,
            0..nodes,
        )
            .prop_map(move |(edges, start, goal)| (Digraph::new(nodes, &edges), start, goal))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_cost_is_optimal((graph, start, goal) in digraph_strategy(), workers in 1usize..5) {
        let expected = graph.shortest_costs(start)[goal];
        let config = SearchConfig::default().with_workers(workers);

        match search(&graph, start, goal, ZeroHeuristic, &config) {
            Ok(result) => {
                prop_assert!(result.found);
                prop_assert_eq!(Some(result.total_cost), expected);
                assert_valid_path(&graph, &result.path, start, goal, result.total_cost);
            }
            Err(SearchError::NotFound { expanded_nodes }) => {
                prop_assert_eq!(expected, None);
                prop_assert_eq!(expanded_nodes, graph.reachable(start));
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_worker_count_invariance((graph, start, goal) in digraph_strategy(), workers in 2usize..8) {
        let single = search(&graph, start, goal, ZeroHeuristic, &SearchConfig::default().with_workers(1));
        let many = search(&graph, start, goal, ZeroHeuristic, &SearchConfig::default().with_workers(workers));

        match (single, many) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.found, b.found);
                prop_assert_eq!(a.total_cost, b.total_cost);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "outcomes differ: {:?} vs {:?}", a, b),
        }
    }
}

#[test]
fn test_grid_scenario_with_obstacles() {
    let grid = Grid::new(5, 5).with_walls([(1, 1), (1, 2)]);
    let config = SearchConfig::default().with_workers(4);

    let result = search(&grid, (0, 0), (4, 4), manhattan, &config).unwrap();

    assert!(result.found);
    assert_eq!(result.total_cost, 8.0);
    assert_eq!(result.path.len(), 9);
    assert!(!result.path.contains(&(1, 1)));
    assert!(!result.path.contains(&(1, 2)));
    for pair in result.path.windows(2) {
        assert_eq!(manhattan(&pair[0], &pair[1]), 1.0);
    }
}

#[test]
fn test_walled_off_goal() {
    // goal in the corner behind two walls
    let grid = Grid::new(4, 4).with_walls([(2, 3), (3, 2)]);
    let err = search(&grid, (0, 0), (3, 3), manhattan, &SearchConfig::default()).unwrap_err();
    assert_eq!(err, SearchError::NotFound { expanded_nodes: 13 });
}

#[test]
fn test_random_grids_match_dijkstra() {
    let walls = WallConfig::default().with_density(0.3);
    for seed in 0..10 {
        let grid = Grid::random(16, 12, &walls, (0, 0), (15, 11), &mut grid_rng(Some(seed)));
        let config = SearchConfig::default().with_workers(3);

        let with_heuristic = search(&grid, (0, 0), (15, 11), manhattan, &config);
        let without = search(&grid, (0, 0), (15, 11), ZeroHeuristic, &config);

        match (with_heuristic, without) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a.total_cost, b.total_cost, "seed {}", seed);
                assert!(a.expanded_nodes <= b.expanded_nodes, "seed {}", seed);
            }
            (Err(a), Err(b)) => {
                assert!(a.is_not_found() && b.is_not_found(), "seed {}", seed);
            }
            (a, b) => panic!("seed {}: {:?} vs {:?}", seed, a, b),
        }
    }
}

/// Heuristic that is slow on purpose and tracks how many copies are alive.
struct SlowHeuristic {
    _alive: Arc<()>,
}

impl Heuristic<u64> for SlowHeuristic {
    fn estimate(&self, _node: &u64, _goal: &u64) -> f64 {
        thread::sleep(Duration::from_millis(1));
        0.0
    }
}

#[test]
fn test_cancel_stops_unbounded_search() {
    let endless = |node: &u64| vec![Neighbor::new(node + 1, 1.0), Neighbor::new(node + 2, 1.0)];
    let alive = Arc::new(());
    let heuristic = SlowHeuristic {
        _alive: Arc::clone(&alive),
    };

    let cancel = CancelToken::new();
    let config = SearchConfig::default()
        .with_workers(4)
        .with_cancel(cancel.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        cancel.cancel();
    });

    let err = search(&endless, 0, u64::MAX, heuristic, &config).unwrap_err();
    canceller.join().unwrap();

    assert_eq!(err, SearchError::Canceled);
    // every worker has exited and dropped its handle on the heuristic
    assert_eq!(Arc::strong_count(&alive), 1);
}

#[test]
fn test_panicking_heuristic_fails_search() {
    let fork = |node: &u32| match node {
        0 => vec![Neighbor::new(1, 1.0), Neighbor::new(2, 1.0)],
        _ => Vec::new(),
    };
    let heuristic = |node: &u32, _goal: &u32| {
        if *node == 1 {
            panic!("heuristic failure");
        }
        0.0
    };

    for workers in [1, 2, 4] {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            let config = SearchConfig::default().with_workers(workers);
            let _ = done_tx.send(search(&fork, 0, 2, heuristic, &config));
        });

        let outcome = done_rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap_or_else(|_| panic!("search with {} workers did not return", workers));
        assert_eq!(outcome, Err(SearchError::PoolDisconnected), "{} workers", workers);
    }
}
