//! Fully dynamic graph connectivity: maintain an undirected graph under an
//! online sequence of edge/vertex insertions and deletions while answering
//! `connected(u, v)` in amortized poly-logarithmic time. See [Graph].
//!
//! All operations are `O(log n)` amortized, except [`Graph::delete_edge`],
//! which is `O(log² n)` amortized.
//!
//! ## Usage
//!
//! ```
//! use dynconn::Graph;
//!
//! let mut g = Graph::from_vertices([1, 2, 3]);
//! g.insert_edge(&1, &2);
//! g.insert_edge(&2, &3);
//! assert_eq!(g.connected(&1, &3), Some(true));
//! g.delete_edge(&2, &3);
//! assert_eq!(g.connected(&1, &3), Some(false));
//! ```
//!
//! You can see example usage at `src/bin/demo.rs` and run it with `cargo run`.
//!
//! ## Implementation
//!
//! This is the Holm-Lichtenberg-Thorup level structure ([`graph`]) over
//! Euler-tour forests ([`euler_tour_forest`]), which in turn represent each
//! tree of a forest as one sequence ([`sequence`]), a self-adjusting
//! splay tree keyed by position rather than by value. The sequence layer
//! is the one genuinely reusable data structure here: it knows nothing
//! about graphs, only about maintaining an ordered, monoid-annotated list
//! under split/concatenate.
//!
//! To read the implementation of the algorithm, see [`Graph::delete_edge`]
//! in `src/graph.rs`. For the data structures:
//! - Splay trees: see `impl Sequence for Splays` in `src/sequence/splay.rs`.
//! - Euler-tour forest: see `src/euler_tour_forest.rs`.
//!
//! ## Testing
//!
//! Run the tests using:
//!
//! ```skip
//! cargo test
//! ```
//!
//! The differential stress test in `tests/differential.rs` runs a long
//! random sequence of operations against a naive flood-fill reference and
//! checks every `connected` answer agrees; run it with `RUST_LOG=trace` to
//! see the HLT bookkeeping as it promotes and punishes edges.

pub mod euler_tour_forest;
pub mod graph;
pub mod sequence;

pub use graph::Graph;
