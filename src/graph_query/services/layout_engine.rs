use crate::graph_query::domain::{
    CanonicalEdge, CanonicalNode, GraphModel, PositionedGraph, PositionedNode,
};
use std::collections::{HashMap, HashSet, VecDeque};

pub const COLUMN_WIDTH: f64 = 220.0;
pub const ROW_HEIGHT: f64 = 160.0;
pub const MARGIN: f64 = 100.0;

/// Deterministic grid layout.
///
/// BFS levels are computed from the roots (nodes without an incoming edge)
/// and reported per node, but placement is row-major in insertion order so
/// the grid stays evenly spaced regardless of graph shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEngine {
    pub column_width: f64,
    pub row_height: f64,
    pub margin: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            column_width: COLUMN_WIDTH,
            row_height: ROW_HEIGHT,
            margin: MARGIN,
        }
    }
}

impl LayoutEngine {
    pub fn layout(
        &self,
        nodes: &[CanonicalNode],
        edges: &[CanonicalEdge],
        viewport_width: f64,
    ) -> Vec<PositionedNode> {
        let levels = Self::levels(nodes, edges);
        let per_row = self.max_nodes_per_row(viewport_width);

        let mut positioned: Vec<PositionedNode> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| PositionedNode {
                node: node.clone(),
                x: (index % per_row) as f64 * self.column_width,
                y: (index / per_row) as f64 * self.row_height,
                level: levels.get(node.id.as_str()).copied().unwrap_or(0),
            })
            .collect();

        center(&mut positioned);
        positioned
    }

    /// Lays out a whole model, keeping its edges
    pub fn position(&self, model: GraphModel, viewport_width: f64) -> PositionedGraph {
        PositionedGraph {
            nodes: self.layout(&model.nodes, &model.edges, viewport_width),
            edges: model.edges,
        }
    }

    pub fn max_nodes_per_row(&self, viewport_width: f64) -> usize {
        let fit = ((viewport_width - self.margin) / self.column_width).floor();
        if fit.is_finite() && fit >= 1.0 {
            fit as usize
        } else {
            1
        }
    }

    /// BFS depth per node id.
    ///
    /// All roots start at level 0 together. Nodes left unvisited (cycles
    /// with no entry point, disconnected components) become roots of a
    /// second pass, again at level 0.
    pub fn levels<'a>(nodes: &'a [CanonicalNode], edges: &[CanonicalEdge]) -> HashMap<&'a str, usize> {
        let by_id: HashMap<&str, &'a CanonicalNode> =
            nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut has_incoming: HashSet<&str> = HashSet::new();
        for edge in edges {
            let (source, target) = (edge.source.as_str(), edge.target.as_str());
            if by_id.contains_key(source) && by_id.contains_key(target) {
                children.entry(source).or_default().push(target);
                has_incoming.insert(target);
            }
        }

        let mut levels: HashMap<&'a str, usize> = HashMap::new();
        let roots: Vec<&'a str> = nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| !has_incoming.contains(id))
            .collect();
        traverse(&roots, &children, &mut levels, &by_id);

        for node in nodes {
            if !levels.contains_key(node.id.as_str()) {
                traverse(&[node.id.as_str()], &children, &mut levels, &by_id);
            }
        }

        levels
    }
}

fn traverse<'a>(
    starts: &[&'a str],
    children: &HashMap<&str, Vec<&str>>,
    levels: &mut HashMap<&'a str, usize>,
    by_id: &HashMap<&str, &'a CanonicalNode>,
) {
    let mut queue: VecDeque<&'a str> = VecDeque::new();
    for &start in starts {
        if !levels.contains_key(start) {
            levels.insert(start, 0);
            queue.push_back(start);
        }
    }

    while let Some(current) = queue.pop_front() {
        let level = levels.get(current).copied().unwrap_or(0);
        for child in children.get(current).into_iter().flatten() {
            if levels.contains_key(child) {
                continue;
            }
            // Borrow the id from the node so the map outlives the edge list
            if let Some(&node) = by_id.get(child) {
                levels.insert(node.id.as_str(), level + 1);
                queue.push_back(node.id.as_str());
            }
        }
    }
}

/// Shifts every position so the bounding box is centered on the origin
fn center(nodes: &mut [PositionedNode]) {
    if nodes.is_empty() {
        return;
    }
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for node in nodes.iter() {
        min_x = min_x.min(node.x);
        max_x = max_x.max(node.x);
        min_y = min_y.min(node.y);
        max_y = max_y.max(node.y);
    }
    let (dx, dy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    for node in nodes.iter_mut() {
        node.x -= dx;
        node.y -= dy;
    }
}
