//! Random-sequence differential test (spec §8.3): a long sequence of
//! `insertVertex`/`insertEdge`/`deleteEdge`/`deleteVertex`/`connected`
//! operations must make `Graph` agree with a naive flood-fill reference on
//! every `connected` answer.

mod common;

use common::{init_logger, NaiveGraph};
use dynconn::Graph;
use rand::{rngs::StdRng, Rng, SeedableRng};

const N: u32 = 20;

fn run_differential(seed: u64, ops: usize) {
    let mut g = Graph::from_vertices(0..N);
    let mut naive = NaiveGraph::default();
    for v in 0..N {
        naive.insert_vertex(v);
    }
    let mut rng = StdRng::seed_from_u64(seed);

    // Reproducibility: log the seed on unwind so a failing run can be
    // replayed without re-rolling the dice.
    let seed_guard = scopeguard::guard(seed, |seed| {
        if std::thread::panicking() {
            log::error!("differential test failed with seed {seed}");
        }
    });

    for step in 0..ops {
        let pick = rng.gen_range(0..100);
        match pick {
            0..=39 => {
                let u = rng.gen_range(0..N);
                let v = rng.gen_range(0..N);
                g.insert_edge(&u, &v);
                naive.insert_edge(u, v);
            }
            40..=74 => {
                let u = rng.gen_range(0..N);
                let v = rng.gen_range(0..N);
                g.delete_edge(&u, &v);
                naive.delete_edge(&u, &v);
            }
            75..=87 => {
                let v = rng.gen_range(0..N);
                g.delete_vertex(&v);
                naive.delete_vertex(&v);
            }
            _ => {
                let v = rng.gen_range(0..N);
                if g.insert_vertex(v) {
                    naive.insert_vertex(v);
                }
            }
        }
        if step % 5 == 0 {
            for u in 0..N {
                for v in 0..N {
                    assert_eq!(
                        g.connected(&u, &v),
                        naive.connected(&u, &v),
                        "seed {seed} step {step}: mismatch on connected({u}, {v})"
                    );
                }
            }
        }
    }
    drop(seed_guard);
}

#[test]
fn differential_fixed_seed_1() {
    init_logger();
    run_differential(9232345, 2000);
}

#[test]
fn differential_fixed_seed_2() {
    init_logger();
    run_differential(100_000_007, 2000);
}

#[test]
fn differential_fixed_seed_3() {
    init_logger();
    run_differential(3, 2000);
}

#[test]
#[ignore]
fn differential_stress() {
    init_logger();
    loop {
        let seed: u64 = rand::thread_rng().gen();
        log::info!("seed = {seed}");
        run_differential(seed, 10_000);
    }
}
