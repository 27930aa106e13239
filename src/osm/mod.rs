// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Reading and writing [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) map files.

mod error;
mod reader;
mod writer;

pub use error::Error;
pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, read_graph_from_file,
    FileFormat, Options, MAX_WAY_NODES,
};
pub use writer::{save_graph_to_file, write_graph};

#[cfg(test)]
mod tests {
    use super::super::{earth_distance, shortest_path, Graph};
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-4),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    macro_rules! assert_edge {
        ($graph:expr, $from:expr, $to:expr, $bidirectional:expr) => {
            assert_eq!(
                $graph.find_edge($from, $to).map(|e| e.bidirectional),
                Some($bidirectional),
                "expected edge {} -> {}",
                $from,
                $to,
            );
        };
    }

    macro_rules! assert_no_edge {
        ($graph:expr, $from:expr, $to:expr) => {
            assert!(
                $graph.find_edge($from, $to).is_none(),
                "unexpected edge {} -> {}",
                $from,
                $to,
            );
        };
    }

    fn three_node_map(tags: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="0" lon="0"/>
  <node id="2" lat="0" lon="1"/>
  <node id="3" lat="0" lon="2"/>
  <way id="10">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    {tags}
  </way>
</osm>
"#
        )
    }

    fn load_str(data: &str) -> Graph {
        let mut g = Graph::default();
        add_features_from_buffer(&mut g, &Options::default(), data.as_bytes()).unwrap();
        g
    }

    fn check_simple_graph(g: &Graph) {
        //  6
        //  │
        //  1 ─── 2 ─── 3
        //        ↓
        //        4
        //        ↑
        //        5

        assert_eq!(g.node_count(), 6);
        assert_eq!(g.edge_count(), 8);
        assert_eq!(g.count_bidirectional_edges(), 6);
        assert_eq!(g.count_oneway_edges(), 2);

        assert_almost_eq!(g.find_edge(1, 2).unwrap().weight, 0.149138);
        assert_almost_eq!(g.find_edge(3, 2).unwrap().weight, 0.118996);
        assert_almost_eq!(g.find_edge(6, 2).unwrap().weight, 0.125483);

        assert_edge!(g, 1, 2, true);
        assert_edge!(g, 2, 1, true);
        assert_edge!(g, 2, 3, true);
        assert_edge!(g, 3, 2, true);
        assert_edge!(g, 6, 2, true);
        assert_edge!(g, 2, 6, true);

        // oneway=yes
        assert_edge!(g, 2, 4, false);
        assert_no_edge!(g, 4, 2);

        // oneway=-1
        assert_edge!(g, 5, 4, false);
        assert_no_edge!(g, 4, 5);
    }

    #[test]
    fn way_directions() {
        let g = load_str(&three_node_map(""));
        assert_eq!(g.edge_count(), 4);
        assert_edge!(g, 1, 2, true);
        assert_edge!(g, 2, 1, true);
        assert_edge!(g, 2, 3, true);
        assert_edge!(g, 3, 2, true);

        let g = load_str(&three_node_map(r#"<tag k="oneway" v="yes"/>"#));
        assert_eq!(g.edge_count(), 2);
        assert_edge!(g, 1, 2, false);
        assert_edge!(g, 2, 3, false);
        assert_no_edge!(g, 2, 1);
        assert_no_edge!(g, 3, 2);

        let g = load_str(&three_node_map(r#"<tag k="oneway" v="-1"/>"#));
        assert_eq!(g.edge_count(), 2);
        assert_edge!(g, 2, 1, false);
        assert_edge!(g, 3, 2, false);
        assert_no_edge!(g, 1, 2);
        assert_no_edge!(g, 2, 3);
    }

    #[test]
    fn route_along_oneway_way() {
        let g = load_str(&three_node_map(r#"<tag k="oneway" v="yes"/>"#));

        let forward = shortest_path(&g, 1, 3).unwrap();
        assert!(forward.success);
        assert_eq!(forward.path, vec![1, 2, 3]);
        assert_almost_eq!(
            forward.total_distance,
            earth_distance(0.0, 0.0, 0.0, 1.0) + earth_distance(0.0, 1.0, 0.0, 2.0)
        );

        let backward = shortest_path(&g, 3, 1).unwrap();
        assert!(!backward.success);
        assert!(backward.path.is_empty());
    }

    #[test]
    fn ways_before_nodes() {
        let data = r#"<osm>
  <way id="1">
    <nd ref="1"/>
    <nd ref="2"/>
  </way>
  <node id="1" lat="0" lon="0"/>
  <node id="2" lat="0" lon="1"/>
</osm>
"#;
        let g = load_str(data);
        assert_almost_eq!(g.find_edge(1, 2).unwrap().weight, 111.194927);
    }

    #[test]
    fn unknown_way_references() {
        let data = r#"<osm>
  <node id="1" lat="0" lon="0"/>
  <way id="1">
    <nd ref="1"/>
    <nd ref="7"/>
  </way>
</osm>
"#;
        let g = load_str(data);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.find_edge(1, 7).unwrap().weight, 0.0);
    }

    #[test]
    fn duplicate_nodes() {
        let data = r#"<osm>
  <node id="1" lat="0" lon="0"/>
  <node id="1" lat="5" lon="5"/>
</osm>
"#;
        let g = load_str(data);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.find_node(1).unwrap().lat, 0.0);

        let mut g = Graph::default();
        let options = Options {
            strict: true,
            ..Options::default()
        };
        let err = add_features_from_buffer(&mut g, &options, data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(crate::GraphError::DuplicateNode(1))
        ));
    }

    #[test]
    fn build_graph_xml() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/simple.osm");

        let mut g = Graph::default();
        let options = Options {
            file_format: FileFormat::Xml,
            ..Options::default()
        };
        add_features_from_buffer(&mut g, &options, DATA).unwrap();

        check_simple_graph(&g);
    }

    #[test]
    fn build_graph_gz() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/simple.osm.gz");

        let mut g = Graph::default();
        let options = Options {
            file_format: FileFormat::XmlGz,
            ..Options::default()
        };
        add_features_from_buffer(&mut g, &options, DATA).unwrap();

        check_simple_graph(&g);
    }

    #[test]
    fn build_graph_bz2() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/simple.osm.bz2");

        let mut g = Graph::default();
        add_features_from_io(&mut g, &Options::default(), DATA).unwrap();

        check_simple_graph(&g);
    }

    #[test]
    fn detect_format() {
        for data in [
            &include_bytes!("reader/test_fixtures/simple.osm")[..],
            &include_bytes!("reader/test_fixtures/simple.osm.gz")[..],
            &include_bytes!("reader/test_fixtures/simple.osm.bz2")[..],
        ] {
            let mut g = Graph::default();
            add_features_from_buffer(&mut g, &Options::default(), data).unwrap();
            check_simple_graph(&g);
        }
    }

    #[test]
    fn missing_file() {
        let err = read_graph_from_file(&Options::default(), "does/not/exist.osm").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn write_failure() {
        struct Broken;

        impl std::io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut g = Graph::default();
        g.add_node(1, 0.0, 0.0).unwrap();
        let err = write_graph(&g, Broken).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn zero_node_id() {
        let data = r#"<osm>
  <node id="0" lat="0" lon="0"/>
  <node id="1" lat="0" lon="1"/>
  <way id="1">
    <nd ref="0"/>
    <nd ref="1"/>
  </way>
</osm>
"#;
        let g = load_str(data);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert_almost_eq!(g.find_edge(0, 1).unwrap().weight, 111.194927);

        let route = shortest_path(&g, 1, 0).unwrap();
        assert!(route.success);
        assert_eq!(route.path, vec![1, 0]);
    }

    #[test]
    fn write_and_reload() {
        let mut g = Graph::default();
        g.add_node(1, 0.0, 0.0).unwrap();
        g.add_node(2, 0.12345678, -1.5).unwrap();
        g.add_node(3, 0.0, 2.0).unwrap();
        g.add_edge(1, 2, earth_distance(0.0, 0.0, 0.12345678, -1.5), true)
            .unwrap();
        g.add_edge(2, 3, earth_distance(0.12345678, -1.5, 0.0, 2.0), false)
            .unwrap();

        let mut buf = Vec::new();
        write_graph(&g, &mut buf).unwrap();

        let text = std::str::from_utf8(&buf).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains(r#"generator="waygraph""#));
        assert!(text.contains(r#"lat="0.1234568""#));
        assert!(text.ends_with("</osm>\n"));

        let mut reloaded = Graph::default();
        let options = Options {
            strict: true,
            ..Options::default()
        };
        add_features_from_buffer(&mut reloaded, &options, &buf).unwrap();

        assert_eq!(reloaded.node_count(), 3);
        assert_eq!(reloaded.edge_count(), 3);
        assert_edge!(reloaded, 1, 2, true);
        assert_edge!(reloaded, 2, 1, true);
        assert_edge!(reloaded, 2, 3, false);
        assert_no_edge!(reloaded, 3, 2);
        assert_almost_eq!(reloaded.find_node(2).unwrap().lat, 0.1234568);
    }
}
