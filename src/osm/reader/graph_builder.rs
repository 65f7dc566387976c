// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Graph, GraphError, Node};

use super::{model, Error, Options};

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a [Graph].
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    options: &'a Options<'a>,
    ignore_bbox: bool,
    nodes_added: usize,
    ways_added: usize,
    ways_skipped: usize,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new graph builder, adding features into `g`.
    pub(super) fn new(g: &'a mut Graph, options: &'a Options<'a>) -> Self {
        let ignore_bbox =
            options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());

        if ignore_bbox && options.bbox.iter().any(|&x| x != 0.0) {
            log::warn!("ignoring invalid bounding box {:?}", options.bbox);
        }

        Self {
            g,
            options,
            ignore_bbox,
            nodes_added: 0,
            ways_added: 0,
            ways_skipped: 0,
        }
    }

    /// Add all features from the provided iterator, then remove nodes
    /// which were not used by any way.
    pub(super) fn add_features<I, E>(&mut self, features: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Result<model::Feature, E>>,
        Error: From<E>,
    {
        for f in features {
            self.add_feature(f?)?;
        }
        self.cleanup();
        Ok(())
    }

    fn cleanup(&mut self) {
        let removed = self.g.clean();
        log::info!(
            "loaded {} nodes and {} ways with the {:?} profile ({} ways skipped); removed {} unused nodes, {} nodes remain",
            self.nodes_added,
            self.ways_added,
            self.options.profile.name,
            self.ways_skipped,
            removed,
            self.g.len(),
        );
    }

    fn add_feature(&mut self, f: model::Feature) -> Result<(), Error> {
        match f {
            model::Feature::Node(n) => self.add_node(n),
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn add_node(&mut self, n: Node) -> Result<(), Error> {
        if !self.is_in_bbox(n.lon, n.lat) {
            return Ok(());
        }

        match self.g.add_node(n.id, n.lon, n.lat) {
            Ok(()) => {
                self.nodes_added += 1;
                Ok(())
            }
            Err(GraphError::DuplicateNode(id)) if !self.options.strict_duplicates => {
                log::warn!("duplicate node {}, keeping its first definition", id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn is_in_bbox(&self, lon: f64, lat: f64) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn add_way(&mut self, w: model::Way) -> Result<(), Error> {
        if !self.options.profile.is_routable(&w.tags) {
            self.ways_skipped += 1;
            return Ok(());
        }

        let runs = self.get_way_runs(&w.nodes);
        if runs.is_empty() {
            log::debug!("way {} has no two consecutive known nodes", w.id);
            self.ways_skipped += 1;
            return Ok(());
        }

        for run in runs {
            self.g.connect_way(run)?;
        }
        self.ways_added += 1;
        Ok(())
    }

    /// Splits the node list of a way at references to nodes absent from the graph
    /// (e.g. outside of the bounding box), returning the runs which
    /// contain at least 2 nodes.
    fn get_way_runs<'n>(&self, nodes: &'n [i64]) -> Vec<&'n [i64]> {
        let runs: Vec<&'n [i64]> = nodes
            .split(|&node_id| self.g.get_node(node_id).is_none())
            .filter(|run| run.len() >= 2)
            .collect();

        let known: usize = runs.iter().map(|run| run.len()).sum();
        if known < nodes.len() {
            log::debug!(
                "dropped {} references to unknown nodes",
                nodes.len() - known
            );
        }

        runs
    }
}

#[cfg(test)]
mod tests {
    use super::model::{Feature, Way};
    use super::*;
    use crate::osm::{FileFormat, Profile};
    use std::collections::HashMap;

    const PROFILE: Profile = Profile {
        name: "test",
        highways: &["residential"],
        access: &["access"],
    };

    fn options(bbox: [f64; 4], strict_duplicates: bool) -> Options<'static> {
        Options {
            profile: &PROFILE,
            file_format: FileFormat::Xml,
            bbox,
            strict_duplicates,
        }
    }

    fn node(id: i64, lon: f64, lat: f64) -> Result<Feature, Error> {
        Ok(Feature::Node(Node { id, lon, lat }))
    }

    fn road(id: i64, nodes: &[i64]) -> Result<Feature, Error> {
        Ok(Feature::Way(Way {
            id,
            nodes: nodes.to_vec(),
            tags: HashMap::from_iter([("highway".to_string(), "residential".to_string())]),
        }))
    }

    #[test]
    fn splits_ways_at_unknown_nodes() {
        let mut g = Graph::new();
        let opts = options([0.0; 4], false);
        GraphBuilder::new(&mut g, &opts)
            .add_features([
                node(1, 0.0, 0.0),
                node(2, 1.0, 0.0),
                node(4, 3.0, 0.0),
                node(5, 4.0, 0.0),
                node(6, 5.0, 0.0),
                road(10, &[1, 2, 3, 4, 5, 7, 6]),
            ])
            .unwrap();

        assert_eq!(g.adjacent(1).unwrap(), &[2]);
        assert_eq!(g.adjacent(2).unwrap(), &[1]);
        assert_eq!(g.adjacent(4).unwrap(), &[5]);
        assert_eq!(g.adjacent(5).unwrap(), &[4]);
        assert!(g.get_node(6).is_none());
    }

    #[test]
    fn bbox_filter() {
        let mut g = Graph::new();
        let opts = options([-0.5, -0.5, 2.5, 0.5], false);
        GraphBuilder::new(&mut g, &opts)
            .add_features([
                node(1, 0.0, 0.0),
                node(2, 1.0, 0.0),
                node(3, 2.0, 0.0),
                node(4, 3.0, 0.0),
                road(10, &[1, 2, 3, 4]),
            ])
            .unwrap();

        assert_eq!(g.vertices().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(g.adjacent(3).unwrap(), &[2]);
    }

    #[test]
    fn lenient_duplicates() {
        let mut g = Graph::new();
        let opts = options([0.0; 4], false);
        GraphBuilder::new(&mut g, &opts)
            .add_features([
                node(1, 0.0, 0.0),
                node(1, 9.0, 9.0),
                node(2, 1.0, 0.0),
                road(10, &[1, 2]),
            ])
            .unwrap();

        assert_eq!(g.lon(1), Ok(0.0));
    }

    #[test]
    fn strict_duplicates() {
        let mut g = Graph::new();
        let opts = options([0.0; 4], true);
        let result = GraphBuilder::new(&mut g, &opts).add_features([
            node(1, 0.0, 0.0),
            node(1, 9.0, 9.0),
        ]);

        assert!(matches!(
            result,
            Err(Error::Graph(GraphError::DuplicateNode(1)))
        ));
    }
}
