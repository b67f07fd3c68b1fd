//! The HLT levels structure: a dynamic-length vector of `(ETF, tree-edge-set,
//! non-tree-edge-set)` triples that layers spanning forests of shrinking
//! subgraphs on top of each other, per spec §3.5/§4.3. This is the crate's
//! public type - [`Graph`] is the only thing a caller constructs directly.
//!
//! Level 0's forest spans the whole graph (I1); level `i`'s forest spans a
//! subgraph of edges whose level is at least `i`, and every tree of level
//! `i+1` sits inside some tree of level `i` (I2); a tree edge's level never
//! exceeds the level at which its two endpoints are still co-located in
//! every lower level's forest (I3); and no tree of level `i` ever holds
//! more than `⌊n / 2ⁱ⌋` vertices (I4), which is what bounds the number of
//! levels to `⌊log₂ n⌋` and [`Graph::delete_edge`] to `O(log² n)` amortized.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::euler_tour_forest::EulerTourForest;
use crate::sequence::splay::Splays;
use crate::sequence::Sequence;

/// A symmetric adjacency map: inserting/removing `{u, v}` updates both
/// directions, so callers never have to pick a canonical order for a pair
/// of `V`s that's only required to be `Eq + Hash`, not `Ord`.
#[derive(Debug, Default)]
struct AdjSet<V: Eq + Hash + Clone> {
    adj: HashMap<V, HashSet<V>>,
}

impl<V: Eq + Hash + Clone> AdjSet<V> {
    fn new() -> Self {
        Self {
            adj: HashMap::new(),
        }
    }

    fn contains(&self, u: &V, v: &V) -> bool {
        self.adj.get(u).is_some_and(|ns| ns.contains(v))
    }

    fn insert(&mut self, u: &V, v: &V) {
        self.adj.entry(u.clone()).or_default().insert(v.clone());
        self.adj.entry(v.clone()).or_default().insert(u.clone());
    }

    fn remove(&mut self, u: &V, v: &V) {
        if let Some(ns) = self.adj.get_mut(u) {
            ns.remove(v);
        }
        if let Some(ns) = self.adj.get_mut(v) {
            ns.remove(u);
        }
    }

    fn neighbors(&self, u: &V) -> impl Iterator<Item = &V> {
        self.adj.get(u).into_iter().flatten()
    }

    fn degree(&self, u: &V) -> usize {
        self.adj.get(u).map_or(0, HashSet::len)
    }

    fn add_vertex(&mut self, v: &V) {
        self.adj.entry(v.clone()).or_default();
    }

    fn remove_vertex(&mut self, v: &V) {
        self.adj.remove(v);
    }
}

/// One level's state: its spanning forest, plus the edges currently
/// bookkept as tree/non-tree *at this level*. An edge sits in exactly one
/// of `tree_edges`/`non_tree_edges` across the whole levels vector at a
/// time; see [`Graph::delete_edge`] for why it can nonetheless be present,
/// structurally, in more than one level's `etf`.
struct LevelState<V, S>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<crate::euler_tour_forest::VertexCount<V>>,
{
    etf: EulerTourForest<V, S>,
    tree_edges: AdjSet<V>,
    non_tree_edges: AdjSet<V>,
}

impl<V, S> LevelState<V, S>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<crate::euler_tour_forest::VertexCount<V>>,
{
    fn fresh(vertices: impl IntoIterator<Item = V>) -> Self {
        Self {
            etf: EulerTourForest::discrete_forest(vertices),
            tree_edges: AdjSet::new(),
            non_tree_edges: AdjSet::new(),
        }
    }
}

/// Floor of log2, for `n >= 1`.
fn floor_log2(n: usize) -> u32 {
    usize::BITS - 1 - n.leading_zeros()
}

/// `floor(log2(max(n, 1))) + 1` - the number of levels I4 allows for a graph
/// of `n` vertices: I4 bounds every level-`i` tree to at most `floor(n /
/// 2^i)` vertices, and a tree can't hold fewer than one, so no level past
/// `floor(log2(n))` can ever be nonempty. `Graph::new` starts with one level
/// already (so `connected` works before any edge exists); this is `1` at
/// `n == 0` or `n == 1`. Note spec §3.5 phrases the level count in terms of
/// edge count, but that's only a correct bound when `numEdges <= n`; once a
/// graph gets denser than that, sizing off the edge count would let the
/// vector grow past what I4 permits, so this is sized off vertex count
/// instead (see `DESIGN.md`).
fn required_levels(num_vertices: usize) -> usize {
    if num_vertices == 0 {
        1
    } else {
        floor_log2(num_vertices) as usize + 1
    }
}

/// Fully dynamic graph connectivity via the Holm-Lichtenberg-Thorup level
/// structure over Euler-tour forests (spec §3.5/§4.3). `V` is the caller's
/// opaque vertex label (`Eq + Hash + Clone`); `S` is the sequence backend
/// the forests at every level are built on, defaulting to the splay
/// implementation.
///
/// ```
/// use dynconn::Graph;
///
/// let mut g = Graph::<u32>::from_vertices([1, 2, 3]);
/// assert_eq!(g.connected(&1, &2), Some(false));
/// g.insert_edge(&1, &2);
/// g.insert_edge(&2, &3);
/// assert_eq!(g.connected(&1, &3), Some(true));
/// g.delete_edge(&2, &3);
/// assert_eq!(g.connected(&1, &3), Some(false));
/// ```
pub struct Graph<V, S = Splays<crate::euler_tour_forest::VertexCount<V>>>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<crate::euler_tour_forest::VertexCount<V>>,
{
    levels: Vec<LevelState<V, S>>,
    all_edges: AdjSet<V>,
    vertices: HashSet<V>,
    num_edges: usize,
}

impl<V, S> Debug for Graph<V, S>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<crate::euler_tour_forest::VertexCount<V>>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph {{ vertices: {}, edges: {}, levels: {} }}",
            self.vertices.len(),
            self.num_edges,
            self.levels.len()
        )
    }
}

impl<V, S> Graph<V, S>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<crate::euler_tour_forest::VertexCount<V>>,
{
    /// An empty graph: no vertices, no edges, one (empty) level.
    pub fn new() -> Self {
        Self {
            levels: vec![LevelState::fresh(std::iter::empty())],
            all_edges: AdjSet::new(),
            vertices: HashSet::new(),
            num_edges: 0,
        }
    }

    /// A graph with the given vertices and no edges.
    pub fn from_vertices(vs: impl IntoIterator<Item = V>) -> Self {
        let mut g = Self::new();
        for v in vs {
            g.insert_vertex(v);
        }
        g
    }

    /// Number of levels currently maintained. Diagnostics / testing only,
    /// exercising spec §8.3's I4 and §8.4 scenario 6 ("level growth").
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Vertex count of the tree of `etf_level` containing `v`, or `None`
    /// if `level` doesn't exist or `v` is unknown. Used to check I4.
    pub fn level_component_size(&mut self, level: usize, v: &V) -> Option<usize> {
        Some(self.levels.get_mut(level)?.etf.component_size(v))
    }

    /// Whether `u` and `v` are in the same tree of level `level`'s forest,
    /// or `None` if `level` doesn't exist or either vertex is unknown.
    /// Testing/diagnostics only, exercises I2 (every tree of level `i+1`
    /// sits inside some tree of level `i`).
    pub fn level_connected(&mut self, level: usize, u: &V, v: &V) -> Option<bool> {
        self.levels.get_mut(level)?.etf.connected(u, v)
    }

    /// Adds `v` with no incident edges. No-op (returns `false`) if `v` is
    /// already known. Installs a fresh self-loop in every existing level's
    /// forest, per spec §4.3.4, then grows the level vector if the new
    /// vertex count requires more levels (I4).
    pub fn insert_vertex(&mut self, v: V) -> bool {
        if !self.vertices.insert(v.clone()) {
            return false;
        }
        self.all_edges.add_vertex(&v);
        for level in &mut self.levels {
            let inserted = level.etf.insert_vertex(v.clone());
            debug_assert!(inserted, "fresh vertex must not already have a self-loop");
        }

        let required = required_levels(self.vertices.len());
        while self.levels.len() < required {
            self.levels
                .push(LevelState::fresh(self.vertices.iter().cloned()));
            log::trace!("graph: grew to {} levels", self.levels.len());
        }
        true
    }

    /// Removes `v`, first deleting every edge incident to it. No-op
    /// (returns `false`) if `v` is unknown.
    pub fn delete_vertex(&mut self, v: &V) -> bool {
        if !self.vertices.contains(v) {
            return false;
        }
        let neighbors: Vec<V> = self.all_edges.neighbors(v).cloned().collect();
        for w in neighbors {
            self.delete_edge(v, &w);
        }
        for level in &mut self.levels {
            level.etf.delete_vertex(v);
        }
        self.all_edges.remove_vertex(v);
        self.vertices.remove(v);
        true
    }

    /// `true` if `u == v` and known; `false`/no-op if `u == v` or either
    /// vertex is unknown or the edge already exists; otherwise inserts the
    /// edge at level 0 as a tree or non-tree edge, whichever
    /// `ETF::insert_edge` decides, per spec §4.3.1. The level vector's size
    /// only ever tracks vertex count (see `insert_vertex`), so this never
    /// needs to grow it.
    pub fn insert_edge(&mut self, u: &V, v: &V) -> bool {
        if u == v {
            return false;
        }
        if !self.vertices.contains(u) || !self.vertices.contains(v) {
            return false;
        }
        if self.all_edges.contains(u, v) {
            return false;
        }
        self.all_edges.insert(u, v);
        self.num_edges += 1;

        if self.levels[0].etf.insert_edge(u, v) {
            self.levels[0].tree_edges.insert(u, v);
            log::debug!("graph: insert_edge({u:?}, {v:?}): tree edge at level 0");
        } else {
            self.levels[0].non_tree_edges.insert(u, v);
            log::debug!("graph: insert_edge({u:?}, {v:?}): non-tree edge at level 0");
        }
        true
    }

    /// Removes the edge `{u, v}` if present. Per spec §4.3.3: scans levels
    /// top-down. At each level where `{u, v}` is a tree edge, its tree
    /// splits in two; the tree edges of the smaller side are promoted one
    /// level up (making room per I4), and its non-tree edges are either
    /// "punished" up a level (if both endpoints stay on the small side) or
    /// become the replacement edge that reconnects the cut (first one
    /// whose far endpoint is outside the small side). A replacement is
    /// patched directly into every lower level's forest without touching
    /// that level's edge-set bookkeeping; see `DESIGN.md`'s Decision OQ-1
    /// for why that's safe. No-op (returns `false`) if `u == v` or the edge
    /// is absent.
    pub fn delete_edge(&mut self, u: &V, v: &V) -> bool {
        if u == v {
            return false;
        }
        if !self.all_edges.contains(u, v) {
            return false;
        }
        self.all_edges.remove(u, v);
        log::debug!("graph: delete_edge({u:?}, {v:?})");

        let mut i = self.levels.len() - 1;
        loop {
            let Some((root_a, root_b)) = self.levels[i].etf.disconnect_edge(u, v) else {
                self.levels[i].non_tree_edges.remove(u, v);
                if i == 0 {
                    break;
                }
                i -= 1;
                continue;
            };
            self.levels[i].tree_edges.remove(u, v);
            log::trace!("graph: delete_edge: tree edge cut at level {i}, searching replacement");

            let size_a = self.levels[i].etf.component_size_of(root_a);
            let size_b = self.levels[i].etf.component_size_of(root_b);
            let small_root = if size_a <= size_b { root_a } else { root_b };
            let s_vertices = self.levels[i].etf.vertices_of_tree(small_root);
            let s_set: HashSet<&V> = s_vertices.iter().collect();

            if i + 1 < self.levels.len() {
                for (x, y) in self.levels[i].etf.tree_edges_of(small_root) {
                    if self.levels[i + 1].etf.insert_edge(&x, &y) {
                        self.levels[i].tree_edges.remove(&x, &y);
                        self.levels[i + 1].tree_edges.insert(&x, &y);
                        log::trace!(
                            "graph: delete_edge: promoted tree edge ({x:?}, {y:?}) to level {}",
                            i + 1
                        );
                    }
                }
            }

            let mut replacement = None;
            'search: for x in &s_vertices {
                let ys: Vec<V> = self.levels[i].non_tree_edges.neighbors(x).cloned().collect();
                for y in ys {
                    if s_set.contains(&y) {
                        if i + 1 < self.levels.len() {
                            self.levels[i].non_tree_edges.remove(x, &y);
                            self.levels[i + 1].non_tree_edges.insert(x, &y);
                            log::trace!(
                                "graph: delete_edge: punished non-tree edge ({x:?}, {y:?}) to level {}",
                                i + 1
                            );
                        }
                    } else {
                        replacement = Some((x.clone(), y));
                        break 'search;
                    }
                }
            }

            if let Some((c, d)) = replacement {
                self.levels[i].non_tree_edges.remove(&c, &d);
                self.levels[i].tree_edges.insert(&c, &d);
                let linked = self.levels[i].etf.insert_edge(&c, &d);
                debug_assert!(linked, "replacement candidate must reconnect the cut");
                log::debug!(
                    "graph: delete_edge({u:?}, {v:?}): replacement ({c:?}, {d:?}) at level {i}"
                );
                for j in 0..i {
                    debug_assert!(
                        !self.levels[j].tree_edges.contains(u, v)
                            && !self.levels[j].non_tree_edges.contains(u, v),
                        "OQ-1: a promoted edge must never be bookkept below its own level"
                    );
                    self.levels[j].etf.delete_edge(u, v);
                    let relinked = self.levels[j].etf.insert_edge(&c, &d);
                    debug_assert!(relinked, "replacement must reconnect every lower level too");
                }
                self.num_edges -= 1;
                return true;
            }

            if i == 0 {
                break;
            }
            i -= 1;
        }
        self.num_edges -= 1;
        true
    }

    /// `true` if `u == v` and known. `None` if either is unknown.
    /// Otherwise delegates to level 0's forest, per spec §4.3.2.
    pub fn connected(&mut self, u: &V, v: &V) -> Option<bool> {
        if u == v {
            return self.vertices.contains(u).then_some(true);
        }
        self.levels[0].etf.connected(u, v)
    }

    /// Whether `{u, v}` is currently an edge of the graph.
    pub fn has_edge(&self, u: &V, v: &V) -> bool {
        self.all_edges.contains(u, v)
    }

    /// Whether `v` is currently a vertex of the graph.
    pub fn has_vertex(&self, v: &V) -> bool {
        self.vertices.contains(v)
    }

    /// Size of the connected component containing `v` in the whole graph
    /// (i.e. level 0's forest), or `0` if `v` is unknown. Supplement to
    /// spec §4.2's `componentSize`, which is only defined on the ETF;
    /// exposed here so callers don't have to reach into `etf(0)` by hand.
    pub fn component_size(&mut self, v: &V) -> usize {
        self.levels[0].etf.component_size(v)
    }

    /// Current neighbors of `v`, i.e. `allEdges[v]` of spec §3.5. Empty if `v`
    /// is unknown.
    pub fn neighbors(&self, v: &V) -> impl Iterator<Item = &V> {
        self.all_edges.neighbors(v)
    }

    /// Current degree of `v`; `0` if `v` is unknown.
    pub fn degree(&self, v: &V) -> usize {
        self.all_edges.degree(v)
    }

    /// Total number of edges currently in the graph.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Total number of vertices currently in the graph.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// A per-tree dump of level `level`'s forest, for diagnostics (spec
    /// §6's optional "debug dump of an ETF"). `None` if `level` doesn't
    /// exist.
    pub fn dump_level(&mut self, level: usize) -> Option<String> {
        Some(self.levels.get_mut(level)?.etf.pretty())
    }
}

impl<V, S> Default for Graph<V, S>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<crate::euler_tour_forest::VertexCount<V>>,
{
    fn default() -> Self {
        Self::new()
    }
}
