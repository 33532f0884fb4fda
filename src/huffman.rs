//! Huffman tree construction.
//! The tree is an arena of nodes addressed by [`NodeId`]. It is built either
//! from symbol frequencies or, when loading a stored dictionary, purely from a
//! symbol -> path [`CodeTable`].
//!
use crate::bit_stream::BitBuffer;
use crate::error::{FdicError, Result};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::debug;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// Occurrence count per symbol.
pub type FrequencyTable = BTreeMap<char, u64>;

/// Bit path per symbol, left = 0 and right = 1 from the root.
pub type CodeTable = BTreeMap<char, BitBuffer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf(char),
    /// Children are always both present in a tree built from frequencies.
    /// A tree rebuilt from an incomplete table may lack one.
    Internal {
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
}

impl HuffmanNode {
    const EMPTY: HuffmanNode = HuffmanNode::Internal {
        left: None,
        right: None,
    };
}

/// A binary prefix-code tree stored as an arena of nodes.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: NodeId,
    terminator: char,
}

/// The frequencies a tree is actually built from.
///
/// If `terminator` is absent it is added with half the largest observed
/// frequency (integer division). An explicit terminator count is kept as is.
pub fn effective_frequencies(frequencies: &FrequencyTable, terminator: char) -> FrequencyTable {
    let mut effective = frequencies.clone();
    if !effective.contains_key(&terminator) {
        let max = effective.values().copied().max().unwrap_or(0);
        effective.insert(terminator, max / 2);
    }
    effective
}

impl HuffmanTree {
    /// Build a tree by repeatedly merging the two least frequent nodes.
    ///
    /// Nodes enter the queue in ascending symbol order and merged nodes are
    /// queued after every existing node, so equal frequencies resolve first in,
    /// first out. The first node popped becomes the left child.
    pub fn from_frequencies(frequencies: &FrequencyTable, terminator: char) -> Result<Self> {
        if !frequencies.keys().any(|&symbol| symbol != terminator) {
            return Err(FdicError::EmptyAlphabet);
        }
        let frequencies = effective_frequencies(frequencies, terminator);

        let mut nodes = Vec::with_capacity(frequencies.len() * 2 - 1);
        // (frequency, id): ids grow with creation order, which gives the FIFO tie-break.
        let mut queue = BinaryHeap::with_capacity(frequencies.len());
        for (&symbol, &frequency) in frequencies.iter() {
            queue.push(Reverse((frequency, nodes.len())));
            nodes.push(HuffmanNode::Leaf(symbol));
        }

        while queue.len() > 1 {
            let (Some(Reverse((left_freq, left))), Some(Reverse((right_freq, right)))) =
                (queue.pop(), queue.pop())
            else {
                break;
            };
            queue.push(Reverse((left_freq.saturating_add(right_freq), nodes.len())));
            nodes.push(HuffmanNode::Internal {
                left: Some(left),
                right: Some(right),
            });
        }
        let Reverse((_, root)) = queue.pop().ok_or(FdicError::EmptyAlphabet)?;

        let tree = Self {
            nodes,
            root,
            terminator,
        };
        debug!(
            symbols = frequencies.len(),
            terminator_frequency = ?frequencies.get(&terminator),
            max_code_len = tree.max_depth(),
            "built Huffman tree from frequencies"
        );
        Ok(tree)
    }

    /// Rebuild a tree from symbol paths alone.
    ///
    /// Each path is walked from a shared root, creating internal nodes on
    /// demand, and the node at its end becomes the symbol's leaf. Paths that
    /// are empty, collide, or are a prefix of another path are rejected, as is
    /// a table without the terminator.
    pub fn from_code_table(table: &CodeTable, terminator: char) -> Result<Self> {
        if !table.contains_key(&terminator) {
            return Err(FdicError::CorruptTable(format!(
                "no code for terminator {:?}",
                terminator
            )));
        }

        let root = 0;
        let mut nodes = vec![HuffmanNode::EMPTY];
        for (&symbol, path) in table.iter() {
            if path.is_empty() {
                return Err(FdicError::CorruptTable(format!(
                    "empty code for symbol {:?}",
                    symbol
                )));
            }

            let mut current = root;
            for (depth, bit) in path.iter().enumerate() {
                let is_last = depth + 1 == path.len();
                let existing = match nodes[current] {
                    HuffmanNode::Leaf(other) => {
                        return Err(FdicError::CorruptTable(format!(
                            "code of {:?} is a prefix of the code of {:?}",
                            other, symbol
                        )))
                    }
                    HuffmanNode::Internal { left, right } => {
                        if bit {
                            right
                        } else {
                            left
                        }
                    }
                };

                current = match existing {
                    Some(child) if is_last => {
                        return Err(FdicError::CorruptTable(match nodes[child] {
                            HuffmanNode::Leaf(other) => {
                                format!("symbols {:?} and {:?} share code {}", other, symbol, path)
                            }
                            HuffmanNode::Internal { .. } => {
                                format!("code of {:?} is a prefix of another code", symbol)
                            }
                        }))
                    }
                    Some(child) => child,
                    None => {
                        let child = nodes.len();
                        nodes.push(if is_last {
                            HuffmanNode::Leaf(symbol)
                        } else {
                            HuffmanNode::EMPTY
                        });
                        if let HuffmanNode::Internal { left, right } = &mut nodes[current] {
                            if bit {
                                *right = Some(child);
                            } else {
                                *left = Some(child);
                            }
                        }
                        child
                    }
                };
            }
        }

        Ok(Self {
            nodes,
            root,
            terminator,
        })
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The symbol whose leaf ends a term.
    pub fn terminator(&self) -> char {
        self.terminator
    }

    /// Get the node with handle `id`, or `None` if the tree has no such node.
    pub fn node(&self, id: NodeId) -> Option<HuffmanNode> {
        self.nodes.get(id).copied()
    }

    /// The child reached by following `bit` from `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - handle of the node to descend from
    /// * `bit` - `false` for the left child, `true` for the right
    ///
    /// Returns `None` for a leaf, for a missing branch, or for an unknown `id`.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match *self.nodes.get(id)? {
            HuffmanNode::Leaf(_) => None,
            HuffmanNode::Internal { left, right } => {
                if bit {
                    right
                } else {
                    left
                }
            }
        }
    }

    /// Derive every leaf's path with a depth-first walk.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        let mut stack = vec![(self.root, BitBuffer::new())];
        while let Some((id, path)) = stack.pop() {
            match self.nodes[id] {
                HuffmanNode::Leaf(symbol) => {
                    table.insert(symbol, path);
                }
                HuffmanNode::Internal { left, right } => {
                    for (child, bit) in [(right, true), (left, false)] {
                        if let Some(child) = child {
                            let mut child_path = path.clone();
                            child_path.push(bit);
                            stack.push((child, child_path));
                        }
                    }
                }
            }
        }
        table
    }

    /// Number of symbols in the tree, terminator included.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, HuffmanNode::Leaf(_)))
            .count()
    }

    /// Length of the longest code.
    pub fn max_depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            if let HuffmanNode::Internal { left, right } = self.nodes[id] {
                stack.extend(left.into_iter().chain(right).map(|child| (child, depth + 1)));
            }
        }
        max
    }
}
