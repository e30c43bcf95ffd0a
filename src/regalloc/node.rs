//! Interference graph nodes.

use bitflags::bitflags;

use crate::{
    ir::{RegisterType, VReg},
    regalloc::TypeDomain,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Independent node properties
    pub struct NodeProps: u8 {
        /// The register holds an incoming method parameter
        const PARAM = 0x01;
        /// The register is an operand of an instruction emitted in range form
        const RANGE = 0x02;
        /// The register is the short live range introduced by a spill and must not be spilled again
        const SPILL = 0x04;
        /// The node takes part in the graph; cleared by removal and coalescing
        const ACTIVE = 0x08;
    }
}

/// Number of start slots a neighbor of width `u_width` can take away from a
/// node of width `v_width`.
///
/// Two narrow registers block each other in exactly one slot. A wide neighbor
/// blocks its own two slots, and a wide node also loses the start slot just
/// below any occupied slot, so the count is `u_width + v_width - 1`.
/// Zero widths never block anything.
#[must_use]
pub const fn edge_weight(u_width: u8, v_width: u8) -> u32 {
    (u_width as u32 + v_width as u32).saturating_sub(1)
}

/// Per-register allocation state.
///
/// Nodes are owned by an [`InterferenceGraph`](crate::regalloc::InterferenceGraph)
/// and only mutated through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(super) weight: u32,
    pub(super) max_vreg: u16,
    pub(super) width: u8,
    pub(super) props: NodeProps,
    pub(super) type_domain: TypeDomain,
    pub(super) adjacent: Vec<VReg>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            weight: 0,
            max_vreg: u16::MAX,
            width: 1,
            props: NodeProps::ACTIVE,
            type_domain: TypeDomain::Unknown,
            adjacent: Vec::new(),
        }
    }
}

impl Node {
    /// Accumulated spill-cost estimate: the sum of [`edge_weight`] over all
    /// neighbors.
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Largest register this node can be assigned without a fallback encoding.
    #[must_use]
    pub fn max_vreg(&self) -> u16 {
        self.max_vreg
    }

    /// Number of contiguous slots the register occupies, 1 or 2.
    #[must_use]
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Returns the raw property set.
    #[must_use]
    pub fn props(&self) -> NodeProps {
        self.props
    }

    /// Returns `true` if the register holds a method parameter.
    #[must_use]
    pub fn is_param(&self) -> bool {
        self.props.contains(NodeProps::PARAM)
    }

    /// Returns `true` if the register is used by a range instruction.
    #[must_use]
    pub fn is_range(&self) -> bool {
        self.props.contains(NodeProps::RANGE)
    }

    /// Returns `true` for spill-introduced live ranges.
    #[must_use]
    pub fn is_spilt(&self) -> bool {
        self.props.contains(NodeProps::SPILL)
    }

    /// Returns `true` until the node is removed or coalesced away.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.props.contains(NodeProps::ACTIVE)
    }

    /// Merged type of every definition and use of the register.
    #[must_use]
    pub fn type_domain(&self) -> TypeDomain {
        self.type_domain
    }

    /// Concrete type of the register, if one has been established.
    #[must_use]
    pub fn register_type(&self) -> Option<RegisterType> {
        self.type_domain.element()
    }

    /// Neighbors in the order their edges were added.
    #[must_use]
    pub fn adjacent(&self) -> &[VReg] {
        &self.adjacent
    }

    /// Number of start slots available to this node: every register from 0 up
    /// to `max_vreg` that still leaves room for the node's full width.
    #[must_use]
    pub fn colorable_limit(&self) -> u32 {
        (u32::from(self.max_vreg) + 2).saturating_sub(u32::from(self.width))
    }

    /// Returns `true` if a color is guaranteed to remain no matter how the
    /// neighbors are colored.
    #[must_use]
    pub fn definitely_colorable(&self) -> bool {
        self.weight < self.colorable_limit()
    }

    pub(super) fn narrow_max_vreg(&mut self, cap: u16) {
        self.max_vreg = self.max_vreg.min(cap);
    }

    pub(super) fn widen(&mut self, width: u8) {
        self.width = self.width.max(width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_node() {
        let node = Node::default();
        assert!(node.is_active());
        assert!(!node.is_param() && !node.is_range() && !node.is_spilt());
        assert_eq!(node.max_vreg(), u16::MAX);
        assert_eq!(node.width(), 1);
        assert_eq!(node.weight(), 0);
        assert!(node.type_domain().is_unknown());
        assert!(node.adjacent().is_empty());
    }

    #[test]
    fn test_edge_weight() {
        assert_eq!(edge_weight(1, 1), 1);
        assert_eq!(edge_weight(1, 2), 2);
        assert_eq!(edge_weight(2, 1), 2);
        assert_eq!(edge_weight(2, 2), 3);
        assert_eq!(edge_weight(0, 0), 0);
        assert_eq!(edge_weight(0, 1), 0);
    }

    #[test]
    fn test_colorable_limit() {
        let mut node = Node::default();
        node.narrow_max_vreg(15);
        assert_eq!(node.colorable_limit(), 16);

        node.widen(2);
        assert_eq!(node.colorable_limit(), 15);

        node.narrow_max_vreg(300);
        assert_eq!(node.max_vreg(), 15);
    }

    #[test]
    fn test_isolated_node_colorable() {
        let mut node = Node::default();
        node.widen(2);
        node.narrow_max_vreg(1);
        assert_eq!(node.colorable_limit(), 1);
        assert!(node.definitely_colorable());
    }

    #[test]
    fn test_definitely_colorable_threshold() {
        let mut node = Node::default();
        node.narrow_max_vreg(3);
        node.weight = 3;
        assert!(node.definitely_colorable());
        node.weight = 4;
        assert!(!node.definitely_colorable());
    }
}
