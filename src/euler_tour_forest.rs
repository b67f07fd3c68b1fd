//! Euler-tour forest: a forest of undirected trees represented as, for each
//! tree, the sequence of directed edges visited by an Euler tour of it (plus
//! one self-loop per vertex). `link`/`cut`/`connected`/`reroot` all reduce to
//! [`Sequence`] operations on that representation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use debug_tree::{add_branch_to, TreeBuilder};

use crate::sequence::splay::Splays;
use crate::sequence::{AggregatedData, Idx, Sequence};

/// A directed edge of an Euler tour: `from == to` marks a vertex's self-loop,
/// anything else is one direction of a tree edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel<V> {
    pub from: V,
    pub to: V,
}

impl<V> EdgeLabel<V> {
    fn is_self_loop(&self) -> bool
    where
        V: PartialEq,
    {
        self.from == self.to
    }
}

/// The counting monoid of spec §3.2: every self-loop contributes `1`, every
/// other edge contributes `0`, so a subtree's aggregate is its vertex count.
/// Parametrized over `V` only so the orphan rules let this crate provide the
/// `AggregatedData` impl without constraining `V` itself.
pub struct VertexCount<V>(usize, PhantomData<V>);

impl<V> VertexCount<V> {
    pub fn count(&self) -> usize {
        self.0
    }
}

impl<V> Clone for VertexCount<V> {
    fn clone(&self) -> Self {
        VertexCount(self.0, PhantomData)
    }
}

impl<V> Default for VertexCount<V> {
    fn default() -> Self {
        VertexCount(0, PhantomData)
    }
}

impl<V> Debug for VertexCount<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VertexCount({})", self.0)
    }
}

impl<V: Eq + Clone + Debug> AggregatedData for VertexCount<V> {
    type Data = EdgeLabel<V>;

    fn from(data: &EdgeLabel<V>) -> Self {
        VertexCount(data.is_self_loop() as usize, PhantomData)
    }

    fn merge(self, right: Self) -> Self {
        VertexCount(self.0 + right.0, PhantomData)
    }
}

/// A rooted tree given by explicit parent/children structure, for
/// [`EulerTourForest::from_tree`].
#[derive(Debug, Clone)]
pub struct RootedTree<V> {
    pub label: V,
    pub children: Vec<RootedTree<V>>,
}

impl<V> RootedTree<V> {
    pub fn leaf(label: V) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }
}

/// A forest of undirected trees, each held as the sequence of its Euler
/// tour. `S` is the sequence backend; defaults to the splay implementation.
pub struct EulerTourForest<V, S = Splays<VertexCount<V>>>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<VertexCount<V>>,
{
    seq: S,
    /// `M[(v,v)]`: handle of every known vertex's self-loop.
    loops: HashMap<V, Idx>,
    /// `M[(u,v)]`: handle of every directed tree-edge occurrence.
    edges: HashMap<(V, V), Idx>,
}

impl<V, S> Debug for EulerTourForest<V, S>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<VertexCount<V>>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EulerTourForest {{ vertices: {}, tree_edges: {} }}",
            self.loops.len(),
            self.edges.len() / 2
        )
    }
}

impl<V, S> EulerTourForest<V, S>
where
    V: Eq + Hash + Clone + Debug,
    S: Sequence<VertexCount<V>>,
{
    fn empty() -> Self {
        Self {
            seq: S::new(0),
            loops: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// A forest whose trees are the singletons `{v}` for each `v`, per spec
    /// §4.2 `discreteForest`.
    pub fn discrete_forest(vs: impl IntoIterator<Item = V>) -> Self {
        let mut f = Self::empty();
        for v in vs {
            f.insert_vertex(v);
        }
        f
    }

    /// The ETF of a single rooted tree, built by the DFS of spec §4.2
    /// `fromTree`: at each node emit a self-loop, then for each child
    /// surround its recursively-built sequence with the down- and up-edge.
    pub fn from_tree(t: &RootedTree<V>) -> Self {
        let mut f = Self::empty();
        f.build_subtree(t);
        f
    }

    fn build_subtree(&mut self, t: &RootedTree<V>) -> Idx {
        let loop_idx = self.seq.create(EdgeLabel {
            from: t.label.clone(),
            to: t.label.clone(),
        });
        self.loops.insert(t.label.clone(), loop_idx);
        let mut root = loop_idx;
        for child in &t.children {
            let child_root = self.build_subtree(child);
            let down = self.seq.create(EdgeLabel {
                from: t.label.clone(),
                to: child.label.clone(),
            });
            let up = self.seq.create(EdgeLabel {
                from: child.label.clone(),
                to: t.label.clone(),
            });
            self.edges
                .insert((t.label.clone(), child.label.clone()), down);
            self.edges
                .insert((child.label.clone(), t.label.clone()), up);
            root = self.seq.concat_all([root, down, child_root, up]);
        }
        root
    }

    /// Make `u` the root of its tree, preserving the rest of its cyclic
    /// Euler tour: split just before `u` and swap the two halves.
    fn reroot_idx(&mut self, u: Idx) {
        if !self.seq.is_first(u) {
            let ord = self.seq.order(u);
            let (before, u_and_after, _) = self.seq.split(u, ord..);
            self.seq.concat(u_and_after, before);
        }
    }

    /// Adds an edge between `u` and the root of `root_w`'s tree. Panics if
    /// `u` and `root_w` are already on the same tree, or `root_w` is not a
    /// root. Grounded on `ETT::link_root`.
    fn link_root(
        &mut self,
        u: Idx,
        root_w: Idx,
        uw_data: EdgeLabel<V>,
        wu_data: EdgeLabel<V>,
    ) -> (Idx, Idx) {
        debug_assert!(!self.seq.on_same_list(u, root_w));
        debug_assert!(self.seq.is_first(root_w));
        let uw = self.seq.create(uw_data);
        let wu = self.seq.create(wu_data);
        let ord = self.seq.order(u);
        let (_, until_u, after_u) = self.seq.split(u, 0..=ord);
        self.seq.concat_all([until_u, uw, root_w, wu, after_u]);
        (uw, wu)
    }

    /// The root handle of `v`'s sequence, or `None` if `v` is unknown.
    pub fn find_root(&mut self, v: &V) -> Option<Idx> {
        let &idx = self.loops.get(v)?;
        Some(self.seq.root(idx))
    }

    /// `None` if either vertex is absent; otherwise whether they're in the
    /// same tree.
    pub fn connected(&mut self, u: &V, v: &V) -> Option<bool> {
        let &lu = self.loops.get(u)?;
        let &lv = self.loops.get(v)?;
        Some(self.seq.on_same_list(lu, lv))
    }

    pub fn has_vertex(&self, v: &V) -> bool {
        self.loops.contains_key(v)
    }

    pub fn has_edge(&self, u: &V, v: &V) -> bool {
        self.edges.contains_key(&(u.clone(), v.clone()))
    }

    /// `false` and a no-op if `u == v`, either vertex is absent, or they're
    /// already connected; otherwise links them and returns `true`.
    pub fn insert_edge(&mut self, u: &V, v: &V) -> bool {
        if u == v {
            return false;
        }
        let (Some(&lu), Some(&lv)) = (self.loops.get(u), self.loops.get(v)) else {
            return false;
        };
        if self.seq.on_same_list(lu, lv) {
            return false;
        }
        self.reroot_idx(lv);
        let (uv, vu) = self.link_root(
            lu,
            lv,
            EdgeLabel {
                from: u.clone(),
                to: v.clone(),
            },
            EdgeLabel {
                from: v.clone(),
                to: u.clone(),
            },
        );
        self.edges.insert((u.clone(), v.clone()), uv);
        self.edges.insert((v.clone(), u.clone()), vu);
        true
    }

    /// Removes the edge `{u,v}` and returns the root of each of the two
    /// trees it splits into: `(root containing u, root containing v)`.
    /// `None` if there is no such edge, grounded on `ETT::disconnect`.
    pub fn disconnect_edge(&mut self, u: &V, v: &V) -> Option<(Idx, Idx)> {
        if u == v {
            return None;
        }
        let &uv = self.edges.get(&(u.clone(), v.clone()))?;
        let &vu = self.edges.get(&(v.clone(), u.clone()))?;
        debug_assert!(self.seq.on_same_list(uv, vu));
        let (a, b) = (self.seq.order(uv), self.seq.order(vu));
        let (left, middle, right) = self.seq.split(uv, a.min(b)..=a.max(b));
        let mid_len = self.seq.len(middle);
        // Drop the two singleton edge occurrences at either end of `middle`.
        let (_, middle, _) = self.seq.split(middle, 1..mid_len - 1);
        let rest = self.seq.concat(left, right);
        self.edges.remove(&(u.clone(), v.clone()));
        self.edges.remove(&(v.clone(), u.clone()));
        Some((self.seq.first(rest), self.seq.first(middle)))
    }

    /// `false` if there's no such edge (or `u == v`); otherwise splits the
    /// tree in two and returns `true`.
    pub fn delete_edge(&mut self, u: &V, v: &V) -> bool {
        self.disconnect_edge(u, v).is_some()
    }

    /// Adds `v`'s self-loop. No-op (returns `false`) if `v` is already
    /// known.
    pub fn insert_vertex(&mut self, v: V) -> bool {
        if self.loops.contains_key(&v) {
            return false;
        }
        let idx = self.seq.create(EdgeLabel {
            from: v.clone(),
            to: v.clone(),
        });
        self.loops.insert(v, idx);
        true
    }

    /// Removes `v`'s self-loop. `v` must be isolated (no incident tree
    /// edges): callers disconnect every edge first, as `Graph::delete_vertex`
    /// does. No-op (returns `false`) if `v` is unknown.
    pub fn delete_vertex(&mut self, v: &V) -> bool {
        let Some(idx) = self.loops.remove(v) else {
            return false;
        };
        debug_assert_eq!(
            self.seq.len(idx),
            1,
            "vertex must be isolated before its self-loop is removed"
        );
        true
    }

    /// Size of the tree containing `v`, or `0` if `v` is unknown.
    pub fn component_size(&mut self, v: &V) -> usize {
        match self.loops.get(v).copied() {
            Some(idx) => self.seq.total_agg(idx).count(),
            None => 0,
        }
    }

    /// Size of the tree rooted at the given sequence handle.
    pub fn component_size_of(&mut self, root: Idx) -> usize {
        self.seq.total_agg(root).count()
    }

    /// Makes `v` the root of its tree. No-op (returns `false`) if `v` is
    /// unknown.
    pub fn reroot(&mut self, v: &V) -> bool {
        match self.loops.get(v).copied() {
            Some(idx) => {
                self.reroot_idx(idx);
                true
            }
            None => false,
        }
    }

    /// Vertex labels of the tree rooted at the given sequence handle: every
    /// self-loop label in its Euler tour. Used by the levels structure to
    /// extract `sVertices` of a split-off subtree; linear in the subtree's
    /// size.
    pub fn vertices_of_tree(&mut self, root: Idx) -> Vec<V> {
        self.seq
            .to_vec(root)
            .into_iter()
            .filter(EdgeLabel::is_self_loop)
            .map(|e| e.from)
            .collect()
    }

    /// Undirected tree edges within the tree rooted at the given sequence
    /// handle, each reported once in whichever direction the Euler tour
    /// visits first. Used by the levels structure (spec §4.3.3) to find
    /// the tree edges of a split-off subtree that need promoting to the
    /// next level; linear in the subtree's size.
    pub fn tree_edges_of(&mut self, root: Idx) -> Vec<(V, V)> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for e in self.seq.to_vec(root) {
            if e.is_self_loop() {
                continue;
            }
            if seen.contains(&(e.to.clone(), e.from.clone())) {
                continue;
            }
            seen.insert((e.from.clone(), e.to.clone()));
            out.push((e.from, e.to));
        }
        out
    }

    /// A line-per-tree debug dump: each tree's Euler tour as its in-order
    /// labels. Diagnostics only, per spec §6.
    pub fn dump(&mut self) -> Vec<Vec<EdgeLabel<V>>> {
        let mut seen = std::collections::HashSet::new();
        let mut trees = Vec::new();
        for &idx in self.loops.values().collect::<Vec<_>>() {
            let root = self.seq.root(idx);
            if seen.insert(root) {
                trees.push(self.seq.to_vec(root));
            }
        }
        trees
    }

    /// [`dump`](Self::dump) rendered as an ASCII tree via `debug_tree`.
    pub fn pretty(&mut self) -> String {
        let builder = TreeBuilder::new();
        for (i, tour) in self.dump().into_iter().enumerate() {
            add_branch_to!(builder, "tree {i}");
            for e in tour {
                if e.is_self_loop() {
                    add_branch_to!(builder, "{:?}", e.from);
                } else {
                    add_branch_to!(builder, "edge {:?} -> {:?}", e.from, e.to);
                }
            }
        }
        builder.string()
    }
}
