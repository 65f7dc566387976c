// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes which OSM ways become edges of a [Graph](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the profile. Only used for logging.
    pub name: &'a str,

    /// Values of the [highway](https://wiki.openstreetmap.org/wiki/Key:highway) tag
    /// of ways which can be used for routing. Ways without a matching `highway` tag
    /// are discarded.
    pub highways: &'a [&'a str],

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for road prohibitions.
    /// The most specific present tag wins; `no` and `private` exclude the way.
    pub access: &'a [&'a str],
}

impl<'a> Profile<'a> {
    /// Checks if a way with the given tags should be added to the graph:
    /// it must have a listed `highway` value and must not be prohibited by
    /// the [access tags](Profile::access).
    pub fn is_routable(&self, tags: &HashMap<String, String>) -> bool {
        self.has_routable_highway(tags) && self.is_allowed(tags)
    }

    fn has_routable_highway(&self, tags: &HashMap<String, String>) -> bool {
        tags.get("highway")
            .map_or(false, |v| self.highways.contains(&v.as_str()))
    }

    /// Checks if the way is not prohibited by its access tags ([Profile::access]).
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        match self
            .access
            .iter()
            .rev()
            .find_map(|&mode| tags.get(mode).map(|v| v.as_str()))
        {
            Some("no") | Some("private") => false,
            _ => true,
        }
    }
}

/// Routing [Profile] for streets drivable by cars, from motorways down to
/// residential streets and their links.
pub const ROAD_PROFILE: Profile = Profile {
    name: "road",
    highways: &[
        "motorway",
        "trunk",
        "primary",
        "secondary",
        "tertiary",
        "unclassified",
        "residential",
        "living_street",
        "motorway_link",
        "trunk_link",
        "primary_link",
        "secondary_link",
        "tertiary_link",
    ],
    access: &["access", "vehicle", "motor_vehicle"],
};

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PROFILE: Profile = Profile {
        name: "test",
        highways: &["footway", "path"],
        access: &["access", "cat"],
    };

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    #[test]
    fn is_routable() {
        assert!(TEST_PROFILE.is_routable(&tags! {"highway": "footway"}));
        assert!(TEST_PROFILE.is_routable(&tags! {"highway": "path", "name": "Trail"}));
        assert!(!TEST_PROFILE.is_routable(&tags! {"highway": "motorway"}));
        assert!(!TEST_PROFILE.is_routable(&tags! {"building": "yes"}));
        assert!(!TEST_PROFILE.is_routable(&tags! {}));
        assert!(!TEST_PROFILE.is_routable(&tags! {"highway": "path", "access": "no"}));
        assert!(TEST_PROFILE.is_routable(&tags! {"highway": "path", "access": "no", "cat": "yes"}));
    }

    #[test]
    fn is_allowed() {
        assert!(TEST_PROFILE.is_allowed(&tags! {"highway": "footway"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "no"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "private"}));
        assert!(TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "destination"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "yes", "cat": "no"}));
    }

    #[test]
    fn road_profile() {
        assert!(ROAD_PROFILE.is_routable(&tags! {"highway": "residential"}));
        assert!(ROAD_PROFILE.is_routable(&tags! {"highway": "primary_link"}));
        assert!(!ROAD_PROFILE.is_routable(&tags! {"highway": "footway"}));
        assert!(!ROAD_PROFILE.is_routable(&tags! {"highway": "service"}));
        assert!(!ROAD_PROFILE.is_routable(&tags! {"highway": "residential", "motor_vehicle": "private"}));
    }
}
