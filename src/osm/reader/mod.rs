// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::osm::{Profile, ROAD_PROFILE};
use crate::{Graph, GraphError};

mod graph_builder;
mod model;
mod xml;

/// Error conditions which may occur while loading OSM data into a [Graph].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
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
    /// Guesses the format from the first bytes of the data.
    /// Anything not recognized as compressed is assumed to be plain XML.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b]) {
            FileFormat::XmlGz
        } else if head.starts_with(b"BZh") {
            FileFormat::XmlBz2
        } else {
            FileFormat::Xml
        }
    }
}

/// Additional controls for interpreting OSM data as a routing [Graph].
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// Which OSM ways should be converted into edges of the [Graph].
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f64; 4],

    /// Abort loading with [GraphError::DuplicateNode] when a node id appears twice.
    /// Otherwise, the duplicate is logged and its first definition is kept.
    pub strict_duplicates: bool,
}

impl Default for Options<'static> {
    fn default() -> Self {
        Self {
            profile: &ROAD_PROFILE,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
            strict_duplicates: false,
        }
    }
}

/// Parse OSM features from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
/// Nodes not used by any routable way are removed from the graph
/// (see [Graph::clean]) once all features have been read.
pub fn add_features_from_io<'a, R: io::Read>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    reader: R,
) -> Result<(), Error> {
    let mut b = io::BufReader::new(reader);

    let file_format = match options.file_format {
        FileFormat::Unknown => {
            let detected = FileFormat::detect(b.fill_buf()?);
            log::debug!("detected OSM file format: {:?}", detected);
            detected
        }
        f => f,
    };

    match file_format {
        FileFormat::Unknown | FileFormat::Xml => {
            let r = xml::Reader::from_io(b);
            GraphBuilder::new(g, options).add_features(r)
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            GraphBuilder::new(g, options).add_features(r)
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            GraphBuilder::new(g, options).add_features(r)
        }
    }
}

/// Parse OSM features from a file at the provided path into a [Graph] as per the provided [Options].
pub fn add_features_from_file<'a, P: AsRef<Path>>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    path: P,
) -> Result<(), Error> {
    log::info!("loading OSM data from {}", path.as_ref().display());
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse OSM features from a static buffer into a [Graph] as per the provided [Options].
pub fn add_features_from_buffer<'a>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    data: &[u8],
) -> Result<(), Error> {
    let is_plain_xml = match options.file_format {
        FileFormat::Xml => true,
        FileFormat::Unknown => FileFormat::detect(data) == FileFormat::Xml,
        _ => false,
    };

    if is_plain_xml {
        // Fast path is available for in-memory XML data
        let r = xml::Reader::from_buffer(data);
        GraphBuilder::new(g, options).add_features(r)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let cursor = io::Cursor::new(data);
        add_features_from_io(g, options, cursor)
    }
}
