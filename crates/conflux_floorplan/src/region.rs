//! Regions and the hop chains between them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An opaque placement label, e.g. `SLOT_X0Y1`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(pub String);

impl Region {
    /// Wraps a label.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// For each ordered region pair, the intermediate regions a wire crosses.
///
/// Direction matters: `from -> to` and `to -> from` are separate entries and
/// neither is inferred from the other. An empty chain means the regions are
/// adjacent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology {
    routes: BTreeMap<Region, BTreeMap<Region, Vec<Region>>>,
}

impl Topology {
    /// An empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the intermediate chain from `from` to `to`.
    pub fn insert(&mut self, from: Region, to: Region, via: Vec<Region>) {
        self.routes.entry(from).or_default().insert(to, via);
    }

    /// Builder form of [`Topology::insert`].
    pub fn with_route(mut self, from: &str, to: &str, via: &[&str]) -> Self {
        self.insert(from.into(), to.into(), via.iter().map(|&r| r.into()).collect());
        self
    }

    /// Intermediate regions from `from` to `to`, if the pair is routable.
    pub fn via(&self, from: &Region, to: &Region) -> Option<&[Region]> {
        self.routes.get(from)?.get(to).map(Vec::as_slice)
    }

    /// Every region crossed going from `from` to `to`, both ends included.
    /// A region to itself is a single hop.
    pub fn hops(&self, from: &Region, to: &Region) -> Option<Vec<Region>> {
        if from == to {
            return Some(vec![from.clone()]);
        }
        let via = self.via(from, to)?;
        let mut hops = Vec::with_capacity(via.len() + 2);
        hops.push(from.clone());
        hops.extend(via.iter().cloned());
        hops.push(to.clone());
        Some(hops)
    }

    /// Every region named anywhere in the topology.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.routes
            .iter()
            .flat_map(|(from, tos)| {
                std::iter::once(from).chain(tos.iter().flat_map(|(to, via)| {
                    std::iter::once(to).chain(via.iter())
                }))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_chain_includes_both_ends() {
        let t = Topology::new().with_route("X", "Y", &["Z"]);
        let hops = t.hops(&"X".into(), &"Y".into()).unwrap();
        assert_eq!(hops, vec![Region::new("X"), Region::new("Z"), Region::new("Y")]);
    }

    #[test]
    fn topology_is_directional() {
        let t = Topology::new().with_route("X", "Y", &[]);
        assert_eq!(t.hops(&"X".into(), &"Y".into()).map(|h| h.len()), Some(2));
        assert!(t.hops(&"Y".into(), &"X".into()).is_none());
        assert_eq!(t.hops(&"Y".into(), &"Y".into()).map(|h| h.len()), Some(1));
    }

    #[test]
    fn serialized_as_nested_maps() {
        let t: Topology = serde_json::from_str(r#"{"X": {"Y": ["Z"]}}"#).unwrap();
        assert_eq!(t.via(&"X".into(), &"Y".into()), Some(&[Region::new("Z")][..]));
        let regions: Vec<&str> = t.regions().map(Region::as_str).collect();
        assert_eq!(regions, ["X", "Y", "Z"]);
    }
}
