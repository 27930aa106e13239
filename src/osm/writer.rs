// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::Error;
use crate::{Edge, Graph};

const GENERATOR: &str = "waygraph";

/// Serializes a [Graph] as an [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) document.
///
/// Every node is written with its coordinates rounded to 7 decimal places.
/// Every stored [Edge] becomes a separate two-node way, numbered from 1 in storage order,
/// tagged with `highway=unclassified` and, for one-way edges, `oneway=yes`.
///
/// Reading the result back produces an equivalent graph, except that every
/// bidirectional edge is expanded into a pair of edges.
pub fn write_graph<W: io::Write>(g: &Graph, out: W) -> Result<(), Error> {
    let mut w = Writer::new_with_indent(out, b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(
        BytesStart::new("osm").with_attributes([("version", "0.6"), ("generator", GENERATOR)]),
    ))?;

    for n in g.nodes() {
        let id = n.id.to_string();
        let lat = format!("{:.7}", n.lat);
        let lon = format!("{:.7}", n.lon);
        w.write_event(Event::Empty(BytesStart::new("node").with_attributes([
            ("id", id.as_str()),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
        ])))?;
    }

    for (i, e) in g.edges().iter().enumerate() {
        write_way(&mut w, i as i64 + 1, e)?;
    }

    w.write_event(Event::End(BytesEnd::new("osm")))?;

    let mut out = w.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn write_way<W: io::Write>(w: &mut Writer<W>, id: i64, e: &Edge) -> Result<(), Error> {
    let id = id.to_string();
    w.write_event(Event::Start(
        BytesStart::new("way").with_attributes([("id", id.as_str())]),
    ))?;

    for node_id in [e.source, e.dest] {
        let r = node_id.to_string();
        w.write_event(Event::Empty(
            BytesStart::new("nd").with_attributes([("ref", r.as_str())]),
        ))?;
    }

    write_tag(w, "highway", "unclassified")?;
    if !e.bidirectional {
        write_tag(w, "oneway", "yes")?;
    }

    w.write_event(Event::End(BytesEnd::new("way")))?;
    Ok(())
}

fn write_tag<W: io::Write>(w: &mut Writer<W>, k: &str, v: &str) -> Result<(), Error> {
    w.write_event(Event::Empty(
        BytesStart::new("tag").with_attributes([("k", k), ("v", v)]),
    ))?;
    Ok(())
}

/// Writes a [Graph] to a file at the provided path, see [write_graph].
pub fn save_graph_to_file<P: AsRef<Path>>(g: &Graph, path: P) -> Result<(), Error> {
    let f = io::BufWriter::new(File::create(path.as_ref())?);
    write_graph(g, f)?;
    log::info!(
        "saved {} nodes and {} edges to {}",
        g.node_count(),
        g.edge_count(),
        path.as_ref().display()
    );
    Ok(())
}
