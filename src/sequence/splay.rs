//! Splay-tree implementation of [`Sequence`]. This is the sequence flavor
//! spec §4.1 prefers: splaying every touched node to the root gives
//! `split`/`concat` their simple recursive-free form and the standard
//! amortized `O(log n)` bound.

use std::fmt::{Debug, Formatter};

use derivative::Derivative;

use super::{AggregatedData, Idx, SearchData, SearchDirection, Sequence};

fn fmt_idx(u: &Idx, f: &mut Formatter) -> std::fmt::Result {
    if *u == usize::MAX {
        write!(f, "∅")
    } else {
        write!(f, "{u}")
    }
}

fn fmt_children([l, r]: &[Idx; 2], f: &mut Formatter) -> std::fmt::Result {
    write!(f, "[")?;
    fmt_idx(l, f)?;
    write!(f, ", ")?;
    fmt_idx(r, f)?;
    write!(f, "]")
}

#[derive(Derivative)]
#[derivative(Debug)]
struct Node<Ag: AggregatedData> {
    data: Ag::Data,
    #[derivative(Debug(format_with = "fmt_children"))]
    child: [Idx; 2],
    #[derivative(Debug(format_with = "fmt_idx"))]
    parent: Idx,
    /// Lazily-propagated "this subtree's child order is swapped" bit.
    flip: bool,
    subtree_agg: Ag,
    subtree_size: usize,
}

impl<Ag: AggregatedData> Node<Ag> {
    fn new(data: Ag::Data) -> Self {
        Self {
            subtree_agg: Ag::from(&data),
            data,
            child: [Splays::<Ag>::EMPTY; 2],
            parent: Splays::<Ag>::EMPTY,
            flip: false,
            subtree_size: 1,
        }
    }
}

/// A collection of splay-tree sequences, arena-allocated: nodes are
/// referenced by stable `usize` indices rather than pointers, so there is
/// no cyclic-reference lifetime question for the parent/child links (spec
/// §9's preferred strategy).
pub struct Splays<Ag: AggregatedData = ()> {
    nodes: Vec<Node<Ag>>,
}

impl<Ag: AggregatedData> Debug for Splays<Ag> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Splays {{ ")?;
        let mut seen = vec![false; self.nodes.len()];
        for u in 0..self.nodes.len() {
            if self.nodes[u].parent == Self::EMPTY {
                self.print_rec(f, u, false, &mut seen)?;
                write!(f, " ")?;
            }
        }
        write!(f, "}}")
    }
}

impl<Ag: AggregatedData> Splays<Ag> {
    fn print_rec(
        &self,
        f: &mut Formatter<'_>,
        u: Idx,
        flipped: bool,
        seen: &mut [bool],
    ) -> std::fmt::Result {
        if u == Self::EMPTY {
            return Ok(());
        }
        if seen[u] {
            return write!(f, "<<loop at {u}>>");
        }
        seen[u] = true;
        write!(f, "(")?;
        let [l, r] = self.child_view(u, flipped);
        let flipped = flipped ^ self.nodes[u].flip;
        self.print_rec(f, l, flipped, seen)?;
        write!(f, " {u}:{:?} ", self.nodes[u].data)?;
        self.print_rec(f, r, flipped, seen)?;
        seen[u] = false;
        write!(f, ")")
    }

    fn child_view(&self, u: Idx, flipped: bool) -> [Idx; 2] {
        let n = &self.nodes[u];
        if flipped ^ n.flip {
            [n.child[1], n.child[0]]
        } else {
            n.child
        }
    }

    fn agg_of(&self, u: Idx) -> Ag {
        if u == Self::EMPTY {
            Ag::default()
        } else {
            let n = &self.nodes[u];
            if n.flip {
                n.subtree_agg.clone().reverse()
            } else {
                n.subtree_agg.clone()
            }
        }
    }

    fn size_of(&self, u: Idx) -> usize {
        if u == Self::EMPTY {
            0
        } else {
            self.nodes[u].subtree_size
        }
    }

    fn parent_of(&self, u: Idx) -> Idx {
        if u == Self::EMPTY {
            Self::EMPTY
        } else {
            self.nodes[u].parent
        }
    }

    /// Side of `u` in its parent's (un-flip-adjusted) child array.
    fn side_in_parent(&self, u: Idx) -> bool {
        let p = self.nodes[u].parent;
        let flipped = self.nodes[p].flip;
        match self.nodes[p].child {
            [l, _] if l == u => flipped,
            [_, r] if r == u => !flipped,
            _ => unreachable!("{u} is not a child of its own parent {p}"),
        }
    }

    /// Push this node's flip bit down to its children and clear it.
    fn push_flip(&mut self, u: Idx) {
        if u == Self::EMPTY || !self.nodes[u].flip {
            return;
        }
        let n = &mut self.nodes[u];
        n.flip = false;
        n.child.swap(0, 1);
        n.subtree_agg = n.subtree_agg.clone().reverse();
        for c in self.nodes[u].child {
            if c != Self::EMPTY {
                self.nodes[c].flip ^= true;
            }
        }
    }

    fn recompute(&mut self, u: Idx) {
        if u == Self::EMPTY {
            return;
        }
        self.push_flip(u);
        let [l, r] = self.nodes[u].child;
        let agg = self
            .agg_of(l)
            .merge(Ag::from(&self.nodes[u].data))
            .merge(self.agg_of(r));
        let size = self.size_of(l) + 1 + self.size_of(r);
        let n = &mut self.nodes[u];
        n.subtree_agg = agg;
        n.subtree_size = size;
    }

    /// Detach and return `u`'s left (`right = false`) or right child,
    /// replacing it with `new_child`. `new_child` must currently be a root.
    fn set_child(&mut self, u: Idx, right: bool, new_child: Idx) -> Idx {
        if new_child != Self::EMPTY {
            debug_assert_eq!(self.nodes[new_child].parent, Self::EMPTY);
            self.nodes[new_child].parent = u;
        }
        if u == Self::EMPTY {
            return Self::EMPTY;
        }
        let flip = self.nodes[u].flip;
        let slot = (right ^ flip) as usize;
        let old = std::mem::replace(&mut self.nodes[u].child[slot], new_child);
        if old != Self::EMPTY {
            self.nodes[old].parent = Self::EMPTY;
        }
        self.recompute(u);
        old
    }

    fn rotate_up(&mut self, u: Idx) {
        let p = self.nodes[u].parent;
        debug_assert_ne!(p, Self::EMPTY, "cannot rotate the root up");
        self.push_flip(p);
        self.push_flip(u);
        let u_side = self.side_in_parent(u);
        let b = std::mem::replace(&mut self.nodes[u].child[!u_side as usize], p);
        self.nodes[p].child[u_side as usize] = b;
        let pp = self.nodes[p].parent;
        self.nodes[u].parent = pp;
        if b != Self::EMPTY {
            self.nodes[b].parent = p;
        }
        if pp != Self::EMPTY {
            let p_side = {
                let flipped = self.nodes[pp].flip;
                match self.nodes[pp].child {
                    [l, _] if l == p => flipped,
                    [_, r] if r == p => !flipped,
                    _ => unreachable!(),
                }
            };
            let flipped = self.nodes[pp].flip;
            self.nodes[pp].child[(p_side ^ flipped) as usize] = u;
        }
        self.nodes[p].parent = u;
        self.recompute(p);
        self.recompute(u);
        self.recompute(pp);
    }

    /// Splay `u` to the root of its tree. Leaves `u` with its flip bit
    /// cleared (pushed to its children).
    fn splay(&mut self, u: Idx) {
        if u == Self::EMPTY {
            return;
        }
        loop {
            let p = self.nodes[u].parent;
            if p == Self::EMPTY {
                self.push_flip(u);
                break;
            }
            let pp = self.nodes[p].parent;
            self.push_flip(pp);
            self.push_flip(p);
            self.push_flip(u);
            if pp == Self::EMPTY {
                self.rotate_up(u);
                break;
            }
            let u_side = self.side_in_parent(u);
            let p_side = self.side_in_parent(p);
            if u_side == p_side {
                self.rotate_up(p);
                self.rotate_up(u);
            } else {
                self.rotate_up(u);
                self.rotate_up(u);
            }
        }
    }
}

impl<Ag: AggregatedData> Sequence<Ag> for Splays<Ag> {
    fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    fn create(&mut self, data: Ag::Data) -> Idx {
        self.nodes.push(Node::new(data));
        self.nodes.len() - 1
    }

    fn total_size(&self) -> usize {
        self.nodes.len()
    }

    fn root(&mut self, mut u: Idx) -> Idx {
        if u == Self::EMPTY {
            return Self::EMPTY;
        }
        self.splay(u);
        loop {
            self.push_flip(u);
            let l = self.child_view(u, false)[0];
            if l == Self::EMPTY {
                break;
            }
            u = l;
        }
        self.splay(u);
        u
    }

    fn data(&self, u: Idx) -> &Ag::Data {
        &self.nodes[u].data
    }

    fn mutate_data(&mut self, u: Idx, f: impl FnOnce(&mut Ag::Data)) {
        self.splay(u);
        f(&mut self.nodes[u].data);
        self.recompute(u);
    }

    fn order(&mut self, u: Idx) -> usize {
        self.splay(u);
        let l = self.child_view(u, false)[0];
        self.size_of(l)
    }

    fn len(&mut self, u: Idx) -> usize {
        self.splay(u);
        self.size_of(u)
    }

    fn find_kth(&mut self, u: Idx, mut k: usize) -> Idx {
        self.splay(u);
        if self.size_of(u) <= k {
            return Self::EMPTY;
        }
        let mut u = u;
        loop {
            self.push_flip(u);
            let [l, r] = self.nodes[u].child;
            let szl = self.size_of(l);
            match k.cmp(&szl) {
                std::cmp::Ordering::Equal => break,
                std::cmp::Ordering::Less => u = l,
                std::cmp::Ordering::Greater => {
                    k -= szl + 1;
                    u = r;
                }
            }
        }
        self.splay(u);
        u
    }

    fn first(&mut self, u: Idx) -> Idx {
        self.root(u)
    }

    fn find_element(
        &mut self,
        u: Idx,
        mut search_strategy: impl FnMut(SearchData<'_, Ag>) -> SearchDirection,
    ) -> Idx {
        self.splay(u);
        let mut cur = u;
        let mut last_visited = u;
        let found = loop {
            if cur == Self::EMPTY {
                break Self::EMPTY;
            }
            self.push_flip(cur);
            let [l, r] = self.nodes[cur].child;
            last_visited = cur;
            let dir = search_strategy(SearchData {
                current_data: &self.nodes[cur].data,
                left_agg: &self.agg_of(l),
                right_agg: &self.agg_of(r),
            });
            match dir {
                SearchDirection::Found => break cur,
                SearchDirection::NotFound => break Self::EMPTY,
                SearchDirection::Left => cur = l,
                SearchDirection::Right => cur = r,
            }
        };
        self.splay(last_visited);
        found
    }

    fn range_agg_lr(&mut self, u: Idx, l: usize, r: usize) -> Ag {
        let (left, mid, right) = self.split_lr(u, l, r);
        let agg = self.agg_of(mid);
        self.concat_all([left, mid, right]);
        agg
    }

    fn total_agg(&mut self, u: Idx) -> Ag {
        self.splay(u);
        self.agg_of(u)
    }

    fn concat(&mut self, u: Idx, v: Idx) -> Idx {
        let v = self.first(v);
        self.splay(u);
        if v == Self::EMPTY {
            return u;
        }
        let old = self.set_child(v, false, u);
        debug_assert_eq!(old, Self::EMPTY, "leftmost of v must have no left child");
        v
    }

    fn split_lr(&mut self, u: Idx, l: usize, r: usize) -> (Idx, Idx, Idx) {
        let middle = self.find_kth(u, l);
        if middle == Self::EMPTY {
            return (u, Self::EMPTY, Self::EMPTY);
        }
        let left = self.set_child(middle, false, Self::EMPTY);
        if r == l {
            return (left, Self::EMPTY, middle);
        }
        let last = self.find_kth(middle, r - l - 1);
        let right = self.set_child(last, true, Self::EMPTY);
        // `last`'s splay may have moved `middle` down; re-splay it to the root.
        self.splay(middle);
        (left, middle, right)
    }

    fn reverse(&mut self, u: Idx) {
        self.splay(u);
        if u != Self::EMPTY {
            self.nodes[u].flip ^= true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Sum(i64);

    impl AggregatedData for Sum {
        type Data = i64;
        fn from(data: &i64) -> Self {
            Sum(*data)
        }
        fn merge(self, right: Self) -> Self {
            Sum(self.0 + right.0)
        }
    }

    fn build(l: &mut Splays<Sum>, values: &[i64]) -> Idx {
        let mut root = Splays::EMPTY;
        for &v in values {
            let node = l.create(v);
            root = l.concat(root, node);
        }
        root
    }

    #[test]
    fn concat_preserves_order() {
        let mut l = Splays::<Sum>::new(0);
        let root = build(&mut l, &[1, 2, 3, 4, 5]);
        assert_eq!(l.to_vec(root), vec![1, 2, 3, 4, 5]);
        assert_eq!(l.total_agg(root), Sum(15));
    }

    #[test]
    fn split_then_concat_round_trips() {
        let mut l = Splays::<Sum>::new(0);
        let root = build(&mut l, &[1, 2, 3, 4, 5, 6]);
        let (left, mid, right) = l.split(root, 2..4);
        assert_eq!(l.to_vec(left), vec![1, 2]);
        assert_eq!(l.to_vec(mid), vec![3, 4]);
        assert_eq!(l.to_vec(right), vec![5, 6]);
        let rejoined = l.concat_all([left, mid, right]);
        assert_eq!(l.to_vec(rejoined), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn split_at_leftmost_is_empty_then_everything() {
        let mut l = Splays::<Sum>::new(0);
        let root = build(&mut l, &[1, 2, 3]);
        let (left, mid, right) = l.split(root, ..1);
        assert!(l.is_empty(left));
        assert_eq!(l.to_vec(mid), vec![1]);
        assert_eq!(l.to_vec(right), vec![2, 3]);
    }

    #[test]
    fn reverse_flips_order_lazily() {
        let mut l = Splays::<Sum>::new(0);
        let root = build(&mut l, &[1, 2, 3, 4]);
        l.reverse(root);
        assert_eq!(l.to_vec(root), vec![4, 3, 2, 1]);
        assert_eq!(l.total_agg(root), Sum(10));
    }

    #[test]
    fn on_same_list_tracks_concat_and_split() {
        let mut l = Splays::<Sum>::new(0);
        let a = l.create(1);
        let b = l.create(2);
        assert!(!l.on_same_list(a, b));
        let root = l.concat(a, b);
        assert!(l.on_same_list(a, b));
        let (left, _, right) = l.split(root, 0..1);
        assert!(!l.on_same_list(left, right));
    }

    #[test]
    fn handles_survive_many_rotations() {
        let mut l = Splays::<Sum>::new(0);
        let nodes: Vec<Idx> = (0..50).map(|i| l.create(i)).collect();
        let root = l.concat_all(nodes.iter().copied());
        for &n in &nodes {
            // Touching every node forces many splays/rotations; handles
            // must keep denoting the same element throughout.
            let k = l.order(n);
            assert_eq!(l.data(l.find_kth(root, k)), l.data(n));
        }
        assert_eq!(l.to_vec(root), (0..50).collect::<Vec<_>>());
    }
}
