//! The interference graph.
//!
//! One [`Node`] per virtual register, a symmetric adjacency relation whose
//! edges carry a coalesceability flag, an asymmetric containment relation and
//! the live-out snapshots of range-capable instructions.
//!
//! The graph is a mechanism, not a strategy. It is populated by
//! [`GraphBuilder`](crate::regalloc::GraphBuilder), which alone can add edges,
//! and then handed to a coloring driver that simplifies it with
//! [`InterferenceGraph::remove_node`] and coalesces with
//! [`InterferenceGraph::combine`]. Simplification order, spill choice and color
//! selection all live in that driver.
//!
//! All containers are ordered, so iteration and DOT output are identical for
//! identical inputs.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Write},
};

use crate::{
    ir::{InsnId, VReg},
    regalloc::{edge_weight, LiveRegs, MeetSemiLattice, Node, NodeProps},
    Error, Result,
};

/// Unordered register pair, stored as `(min, max)` so both orientations of an
/// edge share one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Edge {
    first: VReg,
    second: VReg,
}

impl Edge {
    fn new(u: VReg, v: VReg) -> Self {
        Self {
            first: u.min(v),
            second: u.max(v),
        }
    }
}

/// Summary counts of a graph, see [`InterferenceGraph::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of nodes, active or not.
    pub nodes: usize,
    /// Number of active nodes.
    pub active_nodes: usize,
    /// Number of interference edges.
    pub edges: usize,
    /// Number of edges that still allow coalescing.
    pub coalesceable_edges: usize,
    /// Number of containment edges.
    pub containment_edges: usize,
    /// Number of range liveness snapshots.
    pub range_snapshots: usize,
}

/// Register interference graph for one method.
#[derive(Debug, Clone, Default)]
pub struct InterferenceGraph {
    nodes: BTreeMap<VReg, Node>,
    /// Value is the "not coalesceable" flag.
    adj_matrix: BTreeMap<Edge, bool>,
    containment: BTreeSet<(VReg, VReg)>,
    range_liveness: BTreeMap<InsnId, LiveRegs>,
}

impl InterferenceGraph {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Returns the node of `reg`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the register has no node.
    pub fn get_node(&self, reg: VReg) -> Result<&Node> {
        self.nodes.get(&reg).ok_or(Error::NodeNotFound(reg))
    }

    /// All nodes, including removed and coalesced ones, by register.
    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<VReg, Node> {
        &self.nodes
    }

    /// Nodes still taking part in the graph, by ascending register.
    pub fn active_nodes(&self) -> impl Iterator<Item = (VReg, &Node)> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.is_active())
            .map(|(reg, node)| (*reg, node))
    }

    /// Returns `true` if an interference edge connects `u` and `v`.
    #[must_use]
    pub fn is_adjacent(&self, u: VReg, v: VReg) -> bool {
        self.adj_matrix.contains_key(&Edge::new(u, v))
    }

    /// Returns `true` unless a conflicting edge connects `u` and `v`.
    #[must_use]
    pub fn is_coalesceable(&self, u: VReg, v: VReg) -> bool {
        !self
            .adj_matrix
            .get(&Edge::new(u, v))
            .copied()
            .unwrap_or(false)
    }

    /// Returns `true` if the containment edge `(u, v)` exists.
    #[must_use]
    pub fn has_containment_edge(&self, u: VReg, v: VReg) -> bool {
        self.containment.contains(&(u, v))
    }

    /// Iterates over all containment edges in ascending order.
    pub fn containment_edges(&self) -> impl Iterator<Item = (VReg, VReg)> + '_ {
        self.containment.iter().copied()
    }

    /// Iterates over all interference edges as `(u, v, coalesceable)` with
    /// `u < v`, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (VReg, VReg, bool)> + '_ {
        self.adj_matrix
            .iter()
            .map(|(edge, not_coalesceable)| (edge.first, edge.second, !not_coalesceable))
    }

    /// Live-out registers recorded for a range-capable instruction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LivenessNotFound`] if no snapshot exists for `insn`.
    pub fn get_liveness(&self, insn: InsnId) -> Result<&LiveRegs> {
        self.range_liveness
            .get(&insn)
            .ok_or(Error::LivenessNotFound(insn))
    }

    /// Iterates over all range liveness snapshots by instruction.
    pub fn range_liveness(&self) -> impl Iterator<Item = (InsnId, &LiveRegs)> + '_ {
        self.range_liveness.iter().map(|(insn, regs)| (*insn, regs))
    }

    /// Takes `reg` out of the active graph.
    ///
    /// Adjacency is kept intact: the node and its edges stay queryable, it
    /// just no longer appears in [`InterferenceGraph::active_nodes`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the register has no node.
    pub fn remove_node(&mut self, reg: VReg) -> Result<()> {
        self.node_mut(reg)?.props.remove(NodeProps::ACTIVE);
        Ok(())
    }

    /// Coalesces `v` into `u`.
    ///
    /// Every neighbor `w` of `v` becomes a neighbor of `u`; if `u` and `w` were
    /// already adjacent the stricter flag wins. Containment edges of `v` are
    /// redirected to `u`. The encoding constraints of `u` become the
    /// intersection of both nodes: the smaller `max_vreg`, the union of the
    /// PARAM, RANGE and SPILL properties, the larger width and the met type.
    /// `v` is left inactive with its edges intact.
    ///
    /// Weights only grow by [`edge_weight`] for adjacencies that are new to
    /// `u`; nothing is recomputed.
    ///
    /// # Errors
    ///
    /// - [`Error::NodeNotFound`] if either register has no node
    /// - [`Error::PreconditionViolation`] if `u == v`, either node is inactive,
    ///   a conflicting edge joins them, or their types are incompatible
    pub fn combine(&mut self, u: VReg, v: VReg) -> Result<()> {
        if u == v {
            return Err(precondition_error!("cannot combine {} with itself", u));
        }
        let u_node = self.get_node(u)?;
        let v_node = self.get_node(v)?;
        if !u_node.is_active() || !v_node.is_active() {
            return Err(precondition_error!(
                "cannot combine {} and {}: both nodes must be active",
                u,
                v
            ));
        }
        if !self.is_coalesceable(u, v) {
            return Err(precondition_error!(
                "cannot combine {} and {}: they interfere",
                u,
                v
            ));
        }
        if !u_node.type_domain.is_compatible(&v_node.type_domain) {
            return Err(precondition_error!(
                "cannot combine {} ({}) and {} ({}): incompatible types",
                u,
                u_node.type_domain,
                v,
                v_node.type_domain
            ));
        }

        let neighbors = v_node.adjacent.clone();
        for w in neighbors {
            if w == u {
                continue;
            }
            let can_coalesce = self.is_coalesceable(v, w);
            self.add_edge(u, w, can_coalesce)?;
        }

        let redirected: Vec<(VReg, VReg)> = self
            .containment
            .iter()
            .filter_map(|&(a, b)| match (a == v, b == v) {
                (true, false) => Some((u, b)),
                (false, true) => Some((a, u)),
                _ => None,
            })
            .collect();
        for (a, b) in redirected {
            self.add_containment_edge(a, b);
        }

        let v_node = self.get_node(v)?.clone();
        let u_node = self.node_mut(u)?;
        u_node.narrow_max_vreg(v_node.max_vreg);
        u_node.widen(v_node.width);
        u_node.props |= v_node.props.difference(NodeProps::ACTIVE);
        u_node.type_domain = u_node.type_domain.meet(&v_node.type_domain);

        self.node_mut(v)?.props.remove(NodeProps::ACTIVE);
        Ok(())
    }

    /// Returns summary counts for diagnostics.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.nodes.len(),
            active_nodes: self.active_nodes().count(),
            edges: self.adj_matrix.len(),
            coalesceable_edges: self.adj_matrix.values().filter(|nc| !**nc).count(),
            containment_edges: self.containment.len(),
            range_snapshots: self.range_liveness.len(),
        }
    }

    /// Writes the graph in the DOT graph description language.
    ///
    /// Inactive nodes are drawn dashed, coalesceable edges dotted and
    /// containment edges as blue arrows. The layout is for debugging only.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying writer.
    pub fn write_dot_format<W: Write>(&self, out: &mut W, title: Option<&str>) -> fmt::Result {
        out.write_str("graph Interference {\n")?;
        if let Some(name) = title {
            writeln!(out, "    label=\"{}\";", escape_dot(name))?;
            out.write_str("    labelloc=t;\n")?;
        }
        out.write_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n\n")?;

        for (reg, node) in &self.nodes {
            let mut label = format!("{reg}\\lweight={} max={}", node.weight, node.max_vreg);
            if node.width == 2 {
                label.push_str(" wide");
            }
            for (flag, name) in [
                (NodeProps::PARAM, "param"),
                (NodeProps::RANGE, "range"),
                (NodeProps::SPILL, "spill"),
            ] {
                if node.props.contains(flag) {
                    let _ = write!(label, " {name}");
                }
            }
            let _ = write!(label, "\\l{}\\l", node.type_domain);

            let style = if node.is_active() { "solid" } else { "dashed" };
            writeln!(out, "    {reg} [label=\"{label}\", style={style}];")?;
        }

        if !self.adj_matrix.is_empty() {
            out.write_str("\n")?;
        }
        for (edge, not_coalesceable) in &self.adj_matrix {
            let style = if *not_coalesceable { "solid" } else { "dotted" };
            writeln!(out, "    {} -- {} [style={style}];", edge.first, edge.second)?;
        }

        if !self.containment.is_empty() {
            out.write_str("\n")?;
        }
        for (container, contained) in &self.containment {
            writeln!(
                out,
                "    {container} -- {contained} [dir=forward, color=blue, constraint=false];"
            )?;
        }

        out.write_str("}\n")
    }

    /// Renders the graph as a DOT string, see
    /// [`InterferenceGraph::write_dot_format`].
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();
        let _ = self.write_dot_format(&mut dot, title);
        dot
    }

    pub(super) fn node_mut(&mut self, reg: VReg) -> Result<&mut Node> {
        self.nodes.get_mut(&reg).ok_or(Error::NodeNotFound(reg))
    }

    pub(super) fn ensure_node(&mut self, reg: VReg) -> &mut Node {
        self.nodes.entry(reg).or_default()
    }

    /// Adds or upgrades the edge between `u` and `v`. Self-edges are ignored.
    ///
    /// A new edge adds [`edge_weight`] of the two widths to both endpoints. An
    /// existing edge only ever moves from coalesceable to conflicting.
    pub(super) fn add_edge(&mut self, u: VReg, v: VReg, can_coalesce: bool) -> Result<()> {
        if u == v {
            return Ok(());
        }
        let u_width = self.get_node(u)?.width;
        let v_width = self.get_node(v)?.width;

        let edge = Edge::new(u, v);
        if let Some(not_coalesceable) = self.adj_matrix.get_mut(&edge) {
            *not_coalesceable |= !can_coalesce;
            return Ok(());
        }
        self.adj_matrix.insert(edge, !can_coalesce);

        let weight = edge_weight(u_width, v_width);
        let u_node = self.node_mut(u)?;
        u_node.adjacent.push(v);
        u_node.weight += weight;
        let v_node = self.node_mut(v)?;
        v_node.adjacent.push(u);
        v_node.weight += weight;
        Ok(())
    }

    /// Adds the containment edge `(u, v)`. Self-pairs are ignored.
    pub(super) fn add_containment_edge(&mut self, u: VReg, v: VReg) {
        if u != v {
            self.containment.insert((u, v));
        }
    }

    pub(super) fn record_range_liveness(&mut self, insn: InsnId, live_out: LiveRegs) {
        self.range_liveness.insert(insn, live_out);
    }
}

/// Escapes a string for use inside a quoted DOT label.
fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}
