//! Interference graph construction.
//!
//! [`GraphBuilder::build`] walks a method twice in program order:
//!
//! 1. **Classification.** Every operand's constraints (width, encoding cap,
//!    PARAM, RANGE) are applied to its node and its type is merged into the
//!    node's [`TypeDomain`](crate::regalloc::TypeDomain). The first conflict
//!    aborts the build.
//! 2. **Edges.** Using the live-out set of each instruction:
//!    - a destination interferes with everything live after its definition,
//!    - a type-compatible copy (`move*`, `check-cast`) instead gets a
//!      coalesceable edge to its source,
//!    - a wide destination interferes with its wide sources,
//!    - at range-capable instructions, every register live across the
//!      instruction gets a containment edge to each source that dies there,
//!      and the live-out set is recorded.
//!
//! Nodes exist for every register below the initial frame size and for every
//! register the method or its liveness mentions. Registers at or above the
//! initial frame size were introduced by spilling and are flagged SPILL.

use crate::{
    ir::{InsnId, Instruction, MethodBody, RegisterType, VReg},
    regalloc::{
        InterferenceGraph, Liveness, NodeProps, RangeSet, VirtualRegisterClassifier,
    },
    Error, Result,
};

/// Builds [`InterferenceGraph`]s.
///
/// This is the only code allowed to add nodes and edges; the graph itself only
/// exposes queries plus the removal and coalescing primitives.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Builds the interference graph of `method`.
    ///
    /// # Arguments
    ///
    /// * `method` - The instructions to allocate
    /// * `initial_regs` - Register frame size before any spill round
    /// * `range_set` - Instructions selected for range encoding
    /// * `liveness` - Live-out sets for every instruction of `method`
    ///
    /// # Errors
    ///
    /// - [`Error::TypeConflict`] if a register is reached by incompatible types
    /// - [`Error::MissingLiveness`] if `liveness` does not cover an instruction
    pub fn build(
        method: &MethodBody,
        initial_regs: u16,
        range_set: &RangeSet,
        liveness: &dyn Liveness,
    ) -> Result<InterferenceGraph> {
        let mut graph = InterferenceGraph::new();

        for idx in 0..initial_regs {
            Self::register(&mut graph, VReg::new(idx), initial_regs);
        }
        for reg in method.referenced_registers() {
            Self::register(&mut graph, reg, initial_regs);
        }

        let classifier = VirtualRegisterClassifier::new(range_set);
        for (id, insn) in method.iter() {
            Self::update_node_constraints(&mut graph, &classifier, id, insn)?;
        }

        for (id, insn) in method.iter() {
            let live_out = liveness.live_out(id).ok_or(Error::MissingLiveness(id))?;
            for reg in live_out.iter() {
                Self::register(&mut graph, reg, initial_regs);
            }

            if let Some(dest) = insn.dest_reg() {
                let copy_src = Self::coalesce_source(&graph, insn)?;
                if let Some(src) = copy_src {
                    graph.add_edge(dest, src, true)?;
                }
                for reg in live_out.iter() {
                    if Some(reg) != copy_src {
                        graph.add_edge(dest, reg, false)?;
                    }
                }
                if insn.dest_is_wide() {
                    for (idx, &src) in insn.src_regs().iter().enumerate() {
                        if Some(src) != copy_src && insn.src_is_wide(idx) {
                            graph.add_edge(dest, src, false)?;
                        }
                    }
                }
            }

            if insn.opcode().has_range_form() || range_set.contains(id) {
                // Registers live across the call enclose sources that die at it
                for &src in insn.src_regs() {
                    if live_out.contains(src) {
                        continue;
                    }
                    for reg in live_out.iter() {
                        graph.add_containment_edge(reg, src);
                    }
                }
                graph.record_range_liveness(id, live_out.clone());
            }
        }

        Ok(graph)
    }

    /// Creates a graph without nodes.
    #[must_use]
    pub fn create_empty() -> InterferenceGraph {
        InterferenceGraph::new()
    }

    /// Adds or resets the node of `reg` with the given type and cap.
    ///
    /// A wide node's cap is raised to at least 1 so an isolated node keeps
    /// one start slot.
    pub fn make_node(graph: &mut InterferenceGraph, reg: VReg, ty: RegisterType, max_vreg: u16) {
        let node = graph.ensure_node(reg);
        node.type_domain = ty.into();
        node.width = ty.width();
        // A wide register needs at least one start slot
        node.max_vreg = max_vreg.max(u16::from(node.width) - 1);
    }

    /// Adds a conflicting edge between `u` and `v`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if either register has no node.
    pub fn add_edge(graph: &mut InterferenceGraph, u: VReg, v: VReg) -> Result<()> {
        graph.add_edge(u, v, false)
    }

    /// Adds a coalesceable edge between `u` and `v`. An existing conflicting
    /// edge stays conflicting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if either register has no node.
    pub fn add_coalesceable_edge(graph: &mut InterferenceGraph, u: VReg, v: VReg) -> Result<()> {
        graph.add_edge(u, v, true)
    }

    /// Adds the containment edge `(container, contained)`.
    pub fn add_containment_edge(graph: &mut InterferenceGraph, container: VReg, contained: VReg) {
        graph.add_containment_edge(container, contained);
    }

    fn register(graph: &mut InterferenceGraph, reg: VReg, initial_regs: u16) {
        let node = graph.ensure_node(reg);
        if reg.index() >= initial_regs {
            node.props |= NodeProps::SPILL;
        }
    }

    fn update_node_constraints(
        graph: &mut InterferenceGraph,
        classifier: &VirtualRegisterClassifier<'_>,
        id: InsnId,
        insn: &Instruction,
    ) -> Result<()> {
        for constraint in classifier.classify(id, insn) {
            let node = graph.node_mut(constraint.reg)?;
            node.widen(constraint.width);
            if constraint.param {
                node.props |= NodeProps::PARAM;
                node.max_vreg = constraint.max_vreg.unwrap_or(u16::MAX);
            } else if let Some(cap) = constraint.max_vreg {
                // Parameters sit at the top of the frame, uses cannot move them
                if !node.is_param() {
                    node.narrow_max_vreg(cap);
                }
            }
            if constraint.range {
                node.props |= NodeProps::RANGE;
            }
            if let Some(ty) = constraint.ty {
                let existing = node.type_domain;
                if node.type_domain.merge(ty).is_conflict() {
                    return Err(Error::TypeConflict {
                        reg: constraint.reg,
                        insn: id,
                        existing,
                        incoming: ty,
                    });
                }
            }
        }
        Ok(())
    }

    /// Source register of a copy whose endpoints may share a register.
    fn coalesce_source(graph: &InterferenceGraph, insn: &Instruction) -> Result<Option<VReg>> {
        let op = insn.opcode();
        if !(op.is_move() || op.is_check_cast()) {
            return Ok(None);
        }
        let (Some(dest), Some(&src)) = (insn.dest_reg(), insn.src_regs().first()) else {
            return Ok(None);
        };
        let dest_type = graph.get_node(dest)?.type_domain();
        let src_type = graph.get_node(src)?.type_domain();
        Ok(dest_type.is_compatible(&src_type).then_some(src))
    }
}
