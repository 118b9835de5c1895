use std::collections::HashMap;
use std::hash::Hash;

/// Traversal state of a visited node. Absent from the map means unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path
    InProgress,
    /// Fully explored, no cycle reachable from here
    Finished,
}

/// Build adjacency from edges, keeping successor order as given.
/// Endpoints don't need to be declared nodes.
fn adjacency<N: Eq + Hash>(edges: &[(N, N)]) -> HashMap<&N, Vec<&N>> {
    let mut adjacency: HashMap<&N, Vec<&N>> = HashMap::new();
    for (source, target) in edges {
        adjacency.entry(source).or_default().push(target);
    }
    adjacency
}

/// Check whether the graph formed by `nodes` and `edges` is acyclic.
pub fn is_dag<N: Eq + Hash>(nodes: &[N], edges: &[(N, N)]) -> bool {
    find_cycle(nodes, edges).is_none()
}

/// Find a cycle using three-color DFS over an explicit stack.
///
/// Traversal starts from each unvisited node in `nodes`, in order. Edge
/// targets that aren't declared are still walked when reached.
///
/// Returns the closed cycle path for the first back-edge found: the node the
/// back-edge points at appears first and last, e.g. `[a, b, c, a]`, or
/// `[a, a]` for a self-loop.
pub fn find_cycle<'a, N: Eq + Hash>(nodes: &'a [N], edges: &'a [(N, N)]) -> Option<Vec<&'a N>> {
    let adjacency = adjacency(edges);
    let mut marks: HashMap<&N, Mark> = HashMap::with_capacity(nodes.len());
    // Each frame is a node on the current path and the index of its next successor
    let mut stack: Vec<(&N, usize)> = Vec::new();

    for start in nodes {
        if marks.contains_key(start) {
            continue;
        }

        marks.insert(start, Mark::InProgress);
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let next = adjacency
                .get(node)
                .and_then(|successors| successors.get(frame.1))
                .copied();
            frame.1 += 1;

            let Some(next) = next else {
                marks.insert(node, Mark::Finished);
                stack.pop();
                continue;
            };

            match marks.get(next) {
                Some(Mark::InProgress) => {
                    let from = stack
                        .iter()
                        .position(|(on_path, _)| *on_path == next)
                        .unwrap_or(0);
                    let mut cycle: Vec<&N> = stack[from..].iter().map(|(n, _)| *n).collect();
                    cycle.push(next);
                    return Some(cycle);
                }
                Some(Mark::Finished) => {}
                None => {
                    marks.insert(next, Mark::InProgress);
                    stack.push((next, 0));
                }
            }
        }
    }

    None
}
