// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use graph_builder::GraphBuilder;

use super::Error;
use crate::Graph;

mod graph_builder;
mod model;
mod xml;

pub use model::MAX_WAY_NODES;

/// Format of the input map file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format of the data based on its first bytes.
    fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(&[0x1f, 0x8b]) {
            FileFormat::XmlGz
        } else if prefix.starts_with(b"BZh") {
            FileFormat::XmlBz2
        } else {
            FileFormat::Xml
        }
    }
}

/// Additional controls for interpreting map data as a routing [Graph].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// By default, unparsable lines (and duplicate nodes) are skipped and only reported
    /// through [log::debug]. If set, the first such line aborts loading with
    /// [Error::Malformed] (or [Error::Storage] for duplicate nodes).
    pub strict: bool,
}

/// Internal trait for objects which can stream [map features](model::Feature)
/// from an underlying source.
trait FeatureReader {
    type Error;
    fn next(&mut self) -> Result<Option<model::Feature>, Self::Error>;
}

/// Parse map features from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn add_features_from_io<R: io::Read>(
    g: &mut Graph,
    options: &Options,
    reader: R,
) -> Result<(), Error> {
    let mut b = io::BufReader::new(reader);
    let format = match options.file_format {
        FileFormat::Unknown => {
            let format = FileFormat::detect(b.fill_buf()?);
            log::debug!("detected map format: {format:?}");
            format
        }
        format => format,
    };
    add_features_from_buf_read(g, options, format, b)
}

fn add_features_from_buf_read<B: io::BufRead>(
    g: &mut Graph,
    options: &Options,
    format: FileFormat,
    b: B,
) -> Result<(), Error> {
    match format {
        FileFormat::Unknown | FileFormat::Xml => {
            let r = xml::Reader::from_io(b, options.strict);
            GraphBuilder::new(g, options).add_features(r)
        }

        FileFormat::XmlGz => {
            let d = flate2::bufread::MultiGzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d), options.strict);
            GraphBuilder::new(g, options).add_features(r)
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::bufread::MultiBzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d), options.strict);
            GraphBuilder::new(g, options).add_features(r)
        }
    }
}

/// Parse map features from a file at the provided path into a [Graph] as per the provided [Options].
pub fn add_features_from_file<P: AsRef<Path>>(
    g: &mut Graph,
    options: &Options,
    path: P,
) -> Result<(), Error> {
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse map features from a static buffer into a [Graph] as per the provided [Options].
pub fn add_features_from_buffer(g: &mut Graph, options: &Options, data: &[u8]) -> Result<(), Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        format => format,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let r = xml::Reader::from_buffer(data, options.strict);
        GraphBuilder::new(g, options).add_features(r)
    } else {
        // Slices are already buffered, so only the decompression needs a reader
        add_features_from_buf_read(g, options, format, data)
    }
}

/// Loads the map file at the provided path into a new [Graph].
pub fn read_graph_from_file<P: AsRef<Path>>(options: &Options, path: P) -> Result<Graph, Error> {
    let mut g = Graph::new();
    add_features_from_file(&mut g, options, path.as_ref())?;
    log::info!(
        "loaded {} nodes and {} edges from {}",
        g.node_count(),
        g.edge_count(),
        path.as_ref().display()
    );
    Ok(g)
}
