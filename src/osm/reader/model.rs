// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Node;
use std::collections::HashMap;

/// Represents an [OSM way](https://wiki.openstreetmap.org/wiki/Way).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub tags: HashMap<String, String>,
}

/// OSM features relevant for building a [Graph](crate::Graph).
/// Relations are skipped by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Node(Node),
    Way(Way),
}
