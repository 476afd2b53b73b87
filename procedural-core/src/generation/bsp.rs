//! Binary space partitioning of a 3D volume into leaf sectors.
//!
//! Each node either splits its box in two along one axis or becomes a leaf
//! carrying a `Sector`. Children always cover the parent exactly, so the
//! leaves tile the root volume with no gaps and no overlaps.

use serde::{Deserialize, Serialize};

use super::RandomSource;
use crate::error::ConfigurationError;
use crate::model::{Axis, Bounds, Sector, SectorRole};

/// Order in which candidate split axes are listed before the random pick
const SPLIT_ORDER: [Axis; 3] = [Axis::Y, Axis::X, Axis::Z];

#[derive(Deserialize)]
struct RawPartitionConfig {
    width: u32,
    height: u32,
    #[serde(default = "default_depth")]
    depth: u32,
    max_depth: u32,
    min_edge_length: u32,
}

fn default_depth() -> u32 {
    1
}

/// Validated partitioner input. A `max_depth` of 0 yields a single leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPartitionConfig")]
pub struct PartitionConfig {
    width: u32,
    height: u32,
    depth: u32,
    max_depth: u32,
    min_edge_length: u32,
}

impl PartitionConfig {
    pub fn new(
        width: u32,
        height: u32,
        depth: u32,
        max_depth: u32,
        min_edge_length: u32,
    ) -> Result<Self, ConfigurationError> {
        Bounds::volume_of(width, height, depth)?;
        if min_edge_length == 0 {
            return Err(ConfigurationError::ZeroMinEdge);
        }
        Ok(Self {
            width,
            height,
            depth,
            max_depth,
            min_edge_length,
        })
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height, self.depth)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn min_edge_length(&self) -> u32 {
        self.min_edge_length
    }
}

impl TryFrom<RawPartitionConfig> for PartitionConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawPartitionConfig) -> Result<Self, Self::Error> {
        Self::new(
            raw.width,
            raw.height,
            raw.depth,
            raw.max_depth,
            raw.min_edge_length,
        )
    }
}

/// What a tree node holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    Internal {
        axis: Axis,
        left: Box<BspNode>,
        right: Box<BspNode>,
    },
    Leaf {
        sector: Sector,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BspNode {
    pub id: String,
    pub bounds: Bounds,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl BspNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn sector(&self) -> Option<&Sector> {
        match &self.kind {
            NodeKind::Leaf { sector } => Some(sector),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn split_axis(&self) -> Option<Axis> {
        match self.kind {
            NodeKind::Internal { axis, .. } => Some(axis),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(&BspNode, &BspNode)> {
        match &self.kind {
            NodeKind::Internal { left, right, .. } => Some((left, right)),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.preorder().count()
    }

    pub fn leaf_count(&self) -> usize {
        self.preorder().filter(|node| node.is_leaf()).count()
    }

    /// Nodes in pre-order, walked with an explicit stack so skewed trees of
    /// any height are safe to traverse
    pub fn preorder(&self) -> impl Iterator<Item = &BspNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
            }
            Some(node)
        })
    }
}

impl Drop for BspNode {
    fn drop(&mut self) {
        // Unlink subtrees onto a heap stack; each node then drops as a leaf
        let mut pending = Vec::new();
        let mut kind = std::mem::replace(&mut self.kind, placeholder_leaf(self.bounds));
        loop {
            if let NodeKind::Internal { left, right, .. } = kind {
                pending.push(left);
                pending.push(right);
            }
            let Some(mut node) = pending.pop() else {
                break;
            };
            kind = std::mem::replace(&mut node.kind, placeholder_leaf(node.bounds));
        }
    }
}

fn placeholder_leaf(bounds: Bounds) -> NodeKind {
    NodeKind::Leaf {
        sector: Sector::new(String::new(), bounds, SectorRole::Room),
    }
}

/// A node decided during the build, before its children are attached
struct Visit {
    id: String,
    bounds: Bounds,
    depth: u32,
    /// Split axis with the near and far child boxes
    split: Option<(Axis, Bounds, Bounds)>,
}

/// Per-call state for one build
struct BuildContext<'a, R: ?Sized> {
    config: &'a PartitionConfig,
    rng: &'a mut R,
    next_id: u32,
}

impl<R: RandomSource + ?Sized> BuildContext<'_, R> {
    /// Decide every node in pre-order (left before right), drawing from the
    /// rng in that order, then assemble the tree bottom-up.
    fn tree(&mut self, root: Bounds) -> BspNode {
        let mut visits = Vec::new();
        let mut pending = vec![(root, 0)];
        while let Some((bounds, depth)) = pending.pop() {
            let visit = self.visit(bounds, depth);
            if let Some((_, near, far)) = visit.split {
                pending.push((far, depth + 1));
                pending.push((near, depth + 1));
            }
            visits.push(visit);
        }

        // Reverse pre-order: both subtrees of a node are complete when it
        // is reached, with the left subtree's root on top
        let mut built: Vec<BspNode> = Vec::new();
        for visit in visits.into_iter().rev() {
            let kind = match visit.split {
                Some((axis, ..)) => match (built.pop(), built.pop()) {
                    (Some(left), Some(right)) => NodeKind::Internal {
                        axis,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    _ => unreachable!("internal node visited without two children"),
                },
                None => {
                    let role = if visit.depth == 0 {
                        SectorRole::Hub
                    } else {
                        SectorRole::Room
                    };
                    NodeKind::Leaf {
                        sector: Sector::new(format!("sector_{}", visit.id), visit.bounds, role),
                    }
                }
            };
            built.push(BspNode {
                id: visit.id,
                bounds: visit.bounds,
                kind,
            });
        }
        match built.pop() {
            Some(root) => root,
            None => unreachable!("the root is always visited"),
        }
    }

    fn visit(&mut self, bounds: Bounds, depth: u32) -> Visit {
        let id = format!("bsp_{}", self.next_id);
        self.next_id += 1;

        let min = self.config.min_edge_length;
        let eligible: Vec<Axis> = SPLIT_ORDER
            .into_iter()
            .filter(|&axis| bounds.extent(axis) as u64 >= 2 * min as u64)
            .collect();

        let split = if depth >= self.config.max_depth || eligible.is_empty() {
            None
        } else {
            let axis = match eligible.len() {
                1 => eligible[0],
                n => eligible[self.pick(n as u32) as usize],
            };
            let span = bounds.extent(axis) - 2 * min;
            let offset = min + self.pick(span);
            let (near, far) = bounds.split(axis, offset);
            Some((axis, near, far))
        };
        Visit {
            id,
            bounds,
            depth,
            split,
        }
    }

    /// `floor(rng · n)`, kept below `n` (0 when `n` is 0)
    fn pick(&mut self, n: u32) -> u32 {
        let draw = (self.rng.next_f64() * n as f64).floor() as u32;
        draw.min(n.saturating_sub(1))
    }
}

/// Partition the configured volume
pub fn build<R: RandomSource + ?Sized>(config: &PartitionConfig, rng: &mut R) -> BspNode {
    let mut ctx = BuildContext {
        config,
        rng,
        next_id: 0,
    };
    let tree = ctx.tree(config.bounds());
    tracing::debug!(
        nodes = tree.node_count(),
        leaves = tree.leaf_count(),
        max_depth = config.max_depth,
        "BSP tree built"
    );
    tree
}

/// Leaf sectors in pre-order (left subtree before right)
pub fn flatten(tree: &BspNode) -> Vec<Sector> {
    tree.preorder().filter_map(BspNode::sector).cloned().collect()
}

/// Every sector is at least `min_edge` wide and high; depth is only checked
/// for sectors deeper than one layer.
pub fn validate(sectors: &[Sector], min_edge: u32) -> bool {
    sectors.iter().all(|s| {
        let b = &s.bounds;
        b.width >= min_edge && b.height >= min_edge && (b.depth <= 1 || b.depth >= min_edge)
    })
}
