use dynconn::Graph;

fn connected(g: &mut Graph<u32>, u: u32, v: u32) {
    println!(
        "connected({u}, {v})? {}",
        match g.connected(&u, &v) {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unknown (unknown vertex)",
        }
    );
}

fn insert_edge(g: &mut Graph<u32>, u: u32, v: u32) {
    println!("insert edge {u}-{v}: {}", g.insert_edge(&u, &v));
}

fn delete_edge(g: &mut Graph<u32>, u: u32, v: u32) {
    println!("delete edge {u}-{v}: {}", g.delete_edge(&u, &v));
}

fn main() {
    let mut g = Graph::from_vertices(1..=4u32);
    println!("Built a graph on vertices 1..=4, no edges yet.");
    connected(&mut g, 1, 2);

    insert_edge(&mut g, 1, 2);
    insert_edge(&mut g, 2, 3);
    insert_edge(&mut g, 1, 3);
    println!("Triangle 1-2-3 built; vertex 4 stays isolated.");
    connected(&mut g, 1, 3);
    connected(&mut g, 3, 4);

    println!("\nCutting edge 1-2: edge 1-3/3-2 should replace it:");
    delete_edge(&mut g, 1, 2);
    connected(&mut g, 1, 2);

    println!("\nNow wiring 3-4 and cutting the only path between 1 and 4's side:");
    insert_edge(&mut g, 3, 4);
    connected(&mut g, 1, 4);
    delete_edge(&mut g, 1, 3);
    println!("(1-3 had no replacement once the triangle's extra edge was gone)");
    connected(&mut g, 1, 4);
    connected(&mut g, 2, 3);

    println!(
        "\nFinal state: {} vertices, {} edges, {} HLT levels.",
        g.num_vertices(),
        g.num_edges(),
        g.level_count()
    );
}
