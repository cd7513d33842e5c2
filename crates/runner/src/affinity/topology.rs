//! NUMA topology lookup.
//!
//! The finder asks a `TopologyProbe` which node owns the first core of a
//! window. When the probe has no answer the two-node bisection in
//! [`super::window::bisect_node`] is used instead.

use std::fs;
use std::path::Path;

use tracing::debug;

/// Maps cores to NUMA nodes.
pub trait TopologyProbe {
    /// Node owning `core`, or `None` if unknown.
    fn node_of(&self, core: usize) -> Option<usize>;
}

/// Probe that never knows; forces the bisection fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownTopology;

impl TopologyProbe for UnknownTopology {
    fn node_of(&self, _core: usize) -> Option<usize> {
        None
    }
}

/// Topology read from `/sys/devices/system/node/node*/cpulist`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SysfsTopology {
    nodes: Vec<(usize, Vec<usize>)>,
}

impl SysfsTopology {
    /// Loads the host topology; an unreadable sysfs yields an empty topology.
    pub fn load() -> Self {
        Self::load_from(Path::new("/sys/devices/system/node"))
    }

    /// Loads a topology from a directory laid out like `/sys/devices/system/node`.
    pub fn load_from(root: &Path) -> Self {
        let Ok(dir) = fs::read_dir(root) else {
            debug!(root = %root.display(), "numa topology unavailable");
            return Self::default();
        };
        let mut nodes: Vec<(usize, Vec<usize>)> = dir
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let id = name.to_str()?.strip_prefix("node")?.parse().ok()?;
                let cpulist = fs::read_to_string(entry.path().join("cpulist")).ok()?;
                Some((id, parse_cpulist(&cpulist)))
            })
            .collect();
        nodes.sort_by_key(|(id, _)| *id);
        Self { nodes }
    }

    /// Builds a topology from explicit node/core lists.
    pub const fn from_nodes(nodes: Vec<(usize, Vec<usize>)>) -> Self {
        Self { nodes }
    }

    /// Number of nodes found.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl TopologyProbe for SysfsTopology {
    fn node_of(&self, core: usize) -> Option<usize> {
        self.nodes
            .iter()
            .find(|(_, cores)| cores.contains(&core))
            .map(|(id, _)| *id)
    }
}

/// Parses a kernel cpulist such as `0-3,8,10-11`.
///
/// Malformed items are ignored. The result is sorted and deduplicated.
pub fn parse_cpulist(cpulist: &str) -> Vec<usize> {
    let mut cores = Vec::new();
    for part in cpulist.trim().split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((first, last)) = part.split_once('-') {
            if let (Ok(first), Ok(last)) = (first.parse::<usize>(), last.parse::<usize>()) {
                cores.extend(first..=last);
            }
        } else if let Ok(core) = part.parse::<usize>() {
            cores.push(core);
        }
    }
    cores.sort_unstable();
    cores.dedup();
    cores
}
