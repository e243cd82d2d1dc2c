//! Generic adjacency-map directed graph, used for the happens-before DAG.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::{HashMap, HashSet};

/// Outcome of [`DiGraph::dfs_walk`]: either a full post-order (graph is
/// acyclic) or the back edge that closed a cycle.
enum DfsResult<T> {
    Finished(Vec<T>),
    Cycle(T, T),
}

#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DiGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    pub adj_map: HashMap<T, HashSet<T>>,
}

impl<T> DiGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    pub fn add_edge(&mut self, source: T, target: T) {
        self.adj_map.entry(source).or_default().insert(target.clone());
        self.adj_map.entry(target).or_default();
    }

    pub fn add_edges(&mut self, source: T, targets: &[T]) {
        let entry = self.adj_map.entry(source).or_default();
        entry.extend(targets.iter().cloned());
    }

    pub fn add_vertex(&mut self, source: T) {
        self.adj_map.entry(source).or_default();
    }

    #[must_use]
    pub fn has_edge(&self, source: &T, target: &T) -> bool {
        self.adj_map.get(source).is_some_and(|neighbors| neighbors.contains(target))
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.adj_map.len()
    }

    #[must_use]
    pub fn neighbors(&self, source: &T) -> Option<&HashSet<T>> {
        self.adj_map.get(source)
    }

    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !self.has_cycle()
    }

    /// Detects if the graph contains a cycle. `O(V+E)`.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        matches!(self.dfs_walk(), DfsResult::Cycle(..))
    }

    /// Returns a valid topological ordering of vertices if the graph is
    /// acyclic, or `None` if the graph contains a cycle. Iterative DFS
    /// with an explicit frame stack, `O(V+E)`: a vertex is emitted when
    /// every neighbor below it on the stack has finished, so reversing
    /// the emission order gives a topological order.
    #[must_use]
    pub fn topological_sort(&self) -> Option<Vec<T>> {
        match self.dfs_walk() {
            DfsResult::Finished(mut post_order) => {
                post_order.reverse();
                Some(post_order)
            }
            DfsResult::Cycle(..) => None,
        }
    }

    /// Returns an edge `(a, b)` that participates in a cycle, or `None`
    /// if acyclic: the edge DFS was following when it walked back onto a
    /// vertex still open on the current path.
    #[must_use]
    pub fn find_cycle_edge(&self) -> Option<(T, T)> {
        match self.dfs_walk() {
            DfsResult::Cycle(a, b) => Some((a, b)),
            DfsResult::Finished(_) => None,
        }
    }

    /// Shared DFS core for [`Self::has_cycle`], [`Self::topological_sort`],
    /// and [`Self::find_cycle_edge`]: a vertex is `Open` while it's an
    /// ancestor on the current DFS path, `Done` once fully explored.
    /// Following an edge into an `Open` vertex is a back edge -- a cycle.
    fn dfs_walk(&self) -> DfsResult<T> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Status {
            Open,
            Done,
        }

        let mut status: HashMap<T, Status> = HashMap::new();
        let mut post_order = Vec::with_capacity(self.adj_map.len());

        for start in self.adj_map.keys() {
            if status.contains_key(start) {
                continue;
            }
            status.insert(start.clone(), Status::Open);
            let mut stack: Vec<(T, Vec<T>, usize)> = vec![(start.clone(), self.successors_of(start), 0)];

            while let Some(frame) = stack.last_mut() {
                if frame.2 >= frame.1.len() {
                    let node = frame.0.clone();
                    status.insert(node.clone(), Status::Done);
                    post_order.push(node);
                    stack.pop();
                    continue;
                }

                let next = frame.1[frame.2].clone();
                let current = frame.0.clone();
                frame.2 += 1;

                match status.get(&next).copied() {
                    Some(Status::Open) => return DfsResult::Cycle(current, next),
                    Some(Status::Done) => {}
                    None => {
                        status.insert(next.clone(), Status::Open);
                        let successors = self.successors_of(&next);
                        stack.push((next, successors, 0));
                    }
                }
            }
        }

        DfsResult::Finished(post_order)
    }

    fn successors_of(&self, vertex: &T) -> Vec<T> {
        self.adj_map.get(vertex).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    /// BFS reachability: is there a path from `source` to `target`?
    /// This is the graph-reachability decision algorithm (algorithm 1).
    #[must_use]
    pub fn has_path(&self, source: &T, target: &T) -> bool {
        if source == target {
            return true;
        }
        let mut visited: HashSet<T> = HashSet::new();
        let mut queue: VecDeque<&T> = VecDeque::new();
        queue.push_back(source);
        visited.insert(source.clone());

        while let Some(node) = queue.pop_front() {
            let Some(neighbors) = self.adj_map.get(node) else {
                continue;
            };
            for neighbor in neighbors {
                if neighbor == target {
                    return true;
                }
                if visited.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }
        false
    }

    /// BFS shortest path (by edge count) from `source` to `target`, or
    /// `None` if unreachable. Used for human-readable witness chains in
    /// diagnostics, not on the hot verification path.
    #[must_use]
    pub fn shortest_path(&self, source: &T, target: &T) -> Option<Vec<T>> {
        if source == target {
            return Some(vec![source.clone()]);
        }
        let mut prev: HashMap<T, T> = HashMap::new();
        let mut visited: HashSet<T> = HashSet::new();
        let mut queue: VecDeque<T> = VecDeque::new();
        queue.push_back(source.clone());
        visited.insert(source.clone());

        while let Some(node) = queue.pop_front() {
            let Some(neighbors) = self.adj_map.get(&node) else {
                continue;
            };
            for neighbor in neighbors {
                if !visited.insert(neighbor.clone()) {
                    continue;
                }
                prev.insert(neighbor.clone(), node.clone());
                if *neighbor == *target {
                    let mut path = vec![target.clone()];
                    let mut cur = node.clone();
                    loop {
                        path.push(cur.clone());
                        if cur == *source {
                            break;
                        }
                        cur = prev[&cur].clone();
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(neighbor.clone());
            }
        }
        None
    }

    /// BFS over every vertex reachable from `source`, same traversal
    /// shape as [`Self::has_path`] but collecting the whole frontier
    /// instead of stopping at a single target.
    fn reachable_from(&self, source: &T) -> HashSet<T> {
        let mut reachable: HashSet<T> = HashSet::new();
        let mut queue: VecDeque<T> = VecDeque::new();
        queue.push_back(source.clone());

        while let Some(node) = queue.pop_front() {
            let Some(neighbors) = self.adj_map.get(&node) else {
                continue;
            };
            for neighbor in neighbors {
                if reachable.insert(neighbor.clone()) {
                    queue.push_back(neighbor.clone());
                }
            }
        }
        reachable
    }

    /// Full transitive closure. `O(V*(V+E))`; algorithm 2 (deprecated in
    /// favor of algorithm 3, vector clocks) builds this once per
    /// verification run rather than querying `has_path` per conflict pair.
    #[must_use]
    pub fn closure(&self) -> Self {
        Self {
            adj_map: self.adj_map.keys().map(|source| (source.clone(), self.reachable_from(source))).collect(),
        }
    }

    pub fn union(&mut self, other: &Self) -> bool {
        let mut change = false;
        for (source, other_neighbors) in &other.adj_map {
            let neighbors = self.adj_map.entry(source.clone()).or_default();
            let old_size = neighbors.len();
            neighbors.extend(other_neighbors.iter().cloned());
            change |= neighbors.len() != old_size;
        }
        change
    }

    #[must_use]
    pub fn to_edge_list(&self) -> Vec<(T, T)> {
        let mut edges = Vec::new();
        for (src, dsts) in &self.adj_map {
            for dst in dsts {
                edges.push((src.clone(), dst.clone()));
            }
        }
        edges
    }
}
