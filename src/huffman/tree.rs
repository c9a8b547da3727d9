use crate::error::{Error, Result};

use super::{DepthMap, Histogram};

/// A Huffman tree node. Internal nodes own their children outright.
#[derive(Debug, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: u8, occurrence: u64 },
    Internal { occurrence: u64, left: Box<Node>, right: Box<Node> },
}

impl Node {
    pub fn occurrence(&self) -> u64 {
        match self {
            Node::Leaf { occurrence, .. } | Node::Internal { occurrence, .. } => *occurrence,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[derive(Debug)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Greedy pairwise merge over a list kept sorted by descending occurrence.
    ///
    /// The two least frequent nodes sit at the back; their parent is re-inserted before
    /// the first node whose occurrence does not exceed its own, so among equal weights
    /// the newest node is merged last.
    pub fn build(histo: &Histogram) -> Result<Self> {
        let mut nodes: Vec<Node> = histo
            .present()
            .map(|(symbol, occurrence)| Node::Leaf { symbol, occurrence })
            .collect();

        if nodes.is_empty() {
            return Err(Error::DegenerateInput { distinct_symbols: 0 });
        }

        // Stable, so equally frequent leaves stay in symbol order.
        nodes.sort_by(|a, b| b.occurrence().cmp(&a.occurrence()));

        while let Some(least) = nodes.pop() {
            let Some(next) = nodes.pop() else {
                return Ok(Self { root: least });
            };

            let occurrence = least.occurrence() + next.occurrence();
            let parent = Node::Internal {
                occurrence,
                left: Box::new(least),
                right: Box::new(next),
            };

            let at = nodes
                .iter()
                .position(|n| n.occurrence() <= occurrence)
                .unwrap_or(nodes.len());
            nodes.insert(at, parent);
        }

        Err(Error::DegenerateInput { distinct_symbols: 0 })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Walks the tree depth first, left before right, collecting `(depth, symbol)` for
    /// every leaf. The tree is consumed: nothing needs it once lengths are known.
    ///
    /// A lone leaf at the root would get a zero-length code; it is given length 1.
    pub fn into_depth_map(self) -> DepthMap {
        let mut depth_map = DepthMap::default();

        if let Node::Leaf { symbol, .. } = self.root {
            depth_map.push(1, symbol);
            return depth_map;
        }

        assign_depth(&self.root, 0, &mut depth_map);
        depth_map
    }
}

fn assign_depth(node: &Node, depth: u8, depth_map: &mut DepthMap) {
    match node {
        Node::Leaf { symbol, .. } => depth_map.push(depth, *symbol),
        Node::Internal { left, right, .. } => {
            assign_depth(left, depth + 1, depth_map);
            assign_depth(right, depth + 1, depth_map);
        }
    }
}
