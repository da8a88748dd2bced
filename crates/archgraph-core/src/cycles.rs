use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;

use crate::graph::DependencyGraph;
use crate::types::Violation;

/// A dependency cycle in canonical rotation: starts at its smallest member.
/// Consecutive members are connected by an edge, and so is last -> first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cycle {
    pub members: Vec<NodeIndex>,
}

impl Cycle {
    fn canonical(mut members: Vec<NodeIndex>) -> Self {
        if let Some(min_pos) = members
            .iter()
            .enumerate()
            .min_by_key(|(_, idx)| **idx)
            .map(|(pos, _)| pos)
        {
            members.rotate_left(min_pos);
        }
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn paths(&self, graph: &DependencyGraph) -> Vec<String> {
        self.members
            .iter()
            .map(|&idx| graph.node(idx).path.clone())
            .collect()
    }
}

/// Find witness cycles: self-loops plus, for each strongly connected component
/// of two or more files, shortest cycles until every member is covered.
/// The result is sorted and free of rotations of the same cycle.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut found: BTreeSet<Cycle> = BTreeSet::new();

    for (idx, _) in graph.nodes() {
        if graph.has_edge(idx, idx) {
            found.insert(Cycle { members: vec![idx] });
        }
    }

    for mut scc in tarjan_scc(graph.inner()) {
        if scc.len() < 2 {
            continue;
        }
        scc.sort_unstable();
        let members: HashSet<NodeIndex> = scc.iter().copied().collect();
        let mut covered: HashSet<NodeIndex> = HashSet::new();

        for &start in &scc {
            if covered.contains(&start) {
                continue;
            }
            if let Some(path) = shortest_cycle_through(graph, start, &members) {
                covered.extend(path.iter().copied());
                found.insert(Cycle::canonical(path));
            }
        }
    }

    tracing::debug!(count = found.len(), "cycle detection finished");
    found.into_iter().collect()
}

/// BFS from `start` inside `members`, visiting successors in index order, until
/// an edge leads back to `start`. Returns the path `start .. last`.
fn shortest_cycle_through(
    graph: &DependencyGraph,
    start: NodeIndex,
    members: &HashSet<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in graph.successors(current) {
            if !members.contains(&next) {
                continue;
            }
            if next == start {
                if current == start {
                    // Self-loops are reported separately.
                    continue;
                }
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(&prev) = parent.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            if visited.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    None
}

/// One circular violation per cycle, attributed to the cycle's first file at
/// the smallest line of the closing edge.
pub fn cycle_violations(graph: &DependencyGraph, cycles: &[Cycle]) -> Vec<Violation> {
    cycles
        .iter()
        .filter_map(|cycle| {
            let first = *cycle.members.first()?;
            let last = *cycle.members.last()?;
            let line = graph.min_edge_line(last, first)?;
            Some(Violation::circular(
                &graph.node(first).path,
                line,
                cycle.paths(graph),
            ))
        })
        .collect()
}
