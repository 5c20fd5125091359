//! Scenarios shaped like real tracking data: lineages across many time
//! points, divisions, and the derived edge statistics.

use geff::axis::{self, Axis};
use geff::{
    edge_stats, read_graph, write_graph, Edge, Geff, MemoryStore, Metadata, Node, WriteOptions,
};

/// A forking lineage: one cell per frame for `frames` frames, dividing into
/// two daughters halfway through. Ids are assigned frame-major.
fn lineage_graph(frames: i32) -> Geff {
    let division_frame = frames / 2;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut next_id = 0;

    let mut mother = -1;
    for t in 0..division_frame {
        let id = next_id;
        next_id += 1;
        nodes.push(Node {
            x: f64::from(t) * 1.5,
            y: f64::from(t) * 2.0,
            z: f64::from(t) * 0.5,
            segment_id: 0,
            radius: 2.0,
            ..Node::new(id, t)
        });
        if mother >= 0 {
            edges.push(Edge {
                score: 0.9,
                distance: 2.5,
                ..Edge::new(edges.len() as i32, mother, id)
            });
        }
        mother = id;
    }

    for daughter in 0..2 {
        let mut previous = mother;
        for t in division_frame..frames {
            let id = next_id;
            next_id += 1;
            nodes.push(Node {
                x: f64::from(t) * 1.5 + f64::from(daughter) * 10.0,
                y: f64::from(t) * 2.0,
                z: f64::from(t) * 0.5,
                segment_id: 1 + daughter,
                radius: 1.5,
                ..Node::new(id, t)
            });
            edges.push(Edge {
                score: 0.8,
                distance: 3.0,
                ..Edge::new(edges.len() as i32, previous, id)
            });
            previous = id;
        }
    }

    let metadata = Metadata::new("0.3.0", true).with_axes(vec![
        Axis::time(axis::NAME_TIME, axis::UNIT_SECONDS)
            .with_bounds(0.0, f64::from(frames))
            .expect("bounds"),
        Axis::space(axis::NAME_SPACE_X, axis::UNIT_MICROMETERS)
            .with_bounds(0.0, 1024.0)
            .expect("bounds"),
        Axis::space(axis::NAME_SPACE_Y, axis::UNIT_MICROMETERS)
            .with_bounds(0.0, 1024.0)
            .expect("bounds"),
        Axis::space(axis::NAME_SPACE_Z, axis::UNIT_MICROMETERS)
            .with_bounds(0.0, 100.0)
            .expect("bounds"),
    ]);

    Geff {
        metadata,
        nodes,
        edges,
    }
}

#[test]
fn lineage_round_trips_across_many_chunks() {
    let mut store = MemoryStore::new();
    let graph = lineage_graph(40);
    assert!(graph.nodes.len() > 50);

    let options = WriteOptions::default().chunk_size(7);
    write_graph(&mut store, "dataset.zarr/tracks", &graph, &options).expect("write");

    let back = read_graph(&store, "/dataset.zarr/tracks").expect("read");
    assert_eq!(back, graph);
}

#[test]
fn division_is_visible_through_the_node_index() {
    let mut store = MemoryStore::new();
    let graph = lineage_graph(10);
    write_graph(&mut store, "tracks", &graph, &WriteOptions::default()).expect("write");
    let back = read_graph(&store, "tracks").expect("read");

    let index = back.node_index();
    assert_eq!(index.len(), back.nodes.len());

    // The mother cell (last node of segment 0) has two outgoing edges.
    let mother = back
        .nodes
        .iter()
        .filter(|n| n.segment_id == 0)
        .max_by_key(|n| n.t)
        .expect("mother");
    let daughters: Vec<&Node> = back
        .edges
        .iter()
        .filter(|e| e.source_node_id == mother.id)
        .map(|e| &back.nodes[index[&e.target_node_id]])
        .collect();
    assert_eq!(daughters.len(), 2);
    assert!(daughters.iter().all(|d| d.t == mother.t + 1));
    assert_eq!(
        daughters.iter().map(|d| d.segment_id).sum::<i32>(),
        1 + 2,
        "daughters belong to the two new segments"
    );
}

#[test]
fn edge_statistics_are_derived_not_persisted() {
    let mut store = MemoryStore::new();
    let mut graph = lineage_graph(6);
    graph.edges.push(Edge::new(graph.edges.len() as i32, 3, 3));
    graph
        .edges
        .push(Edge::new(graph.edges.len() as i32, -1, 0));
    write_graph(&mut store, "tracks", &graph, &WriteOptions::default()).expect("write");

    let back = read_graph(&store, "tracks").expect("read");
    let stats = edge_stats(&back.edges);
    assert_eq!(stats.total, graph.edges.len());
    assert_eq!(stats.self_loops, 1);
    assert_eq!(stats.valid, graph.edges.len() - 1);

    // Nothing beyond the ids and the two property columns is on disk.
    use geff::BlockStore;
    assert!(!store.dataset_exists("tracks/edges/props/valid/values"));
    assert!(!store.dataset_exists("tracks/edges/stats"));
}

#[test]
fn undirected_graphs_keep_their_flag() {
    let mut store = MemoryStore::new();
    let graph = Geff {
        metadata: Metadata::new("0.2", false),
        nodes: vec![Node::new(0, 0), Node::new(1, 0)],
        edges: vec![Edge::new(0, 0, 1)],
    };
    write_graph(&mut store, "g", &graph, &WriteOptions::default()).expect("write");
    let back = read_graph(&store, "g").expect("read");
    assert!(!back.metadata.directed);
    assert_eq!(back.metadata.geff_version, "0.2");
    assert_eq!(back.metadata.axes, None);
}

#[test]
fn polygons_round_trip_at_every_chunk_size() {
    let graph = Geff {
        metadata: Metadata::new("0.4.0", true),
        nodes: (0..9)
            .map(|i| {
                let sides = (i % 4) as usize;
                Node {
                    polygon_x: (0..sides).map(|v| f64::from(i) + v as f64).collect(),
                    polygon_y: (0..sides).map(|v| v as f64 * 0.5).collect(),
                    ..Node::new(i, i / 3)
                }
            })
            .collect(),
        edges: (0..8).map(|i| Edge::new(i, i, i + 1)).collect(),
    };

    let mut decoded = Vec::new();
    for chunk_size in [1usize, 3, 7, 1000] {
        let mut store = MemoryStore::new();
        let options = WriteOptions::default().chunk_size(chunk_size);
        write_graph(&mut store, "g", &graph, &options).expect("write");
        decoded.push(read_graph(&store, "g").expect("read"));
    }
    for other in &decoded {
        assert_eq!(other.nodes, graph.nodes);
        assert_eq!(other.edges, graph.edges);
    }
}
