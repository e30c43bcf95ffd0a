//! Register allocation interference graphs.
//!
//! This module builds the graph a Chaitin/Briggs style coloring driver works
//! on: which virtual registers can never share a slot, which may be merged
//! for free, and which take part in range-encoded instructions that need
//! contiguous operands.
//!
//! # Architecture
//!
//! - [`RangeSet`] - Instructions selected for range encoding, in insertion order
//! - [`TypeDomain`] - Per-register type lattice detecting conflicting live ranges
//! - [`VirtualRegisterClassifier`] - Width, encoding caps and flags per operand
//! - [`InterferenceGraph`] / [`Node`] - The graph and the driver-facing primitives
//! - [`GraphBuilder`] - One-pass construction from a method and its liveness
//!
//! # Usage
//!
//! ```rust
//! use regraph::{
//!     ir::{Instruction, MethodBody, Opcode, VReg},
//!     regalloc::{build_graph, live_in, LiveRegs, LivenessMap, RangeSet},
//! };
//!
//! let mut method = MethodBody::new("LFoo;.id:(I)I", 2);
//! method.push(Instruction::new(Opcode::LoadParam).dest(1u16));
//! method.push(Instruction::new(Opcode::Move).dest(0u16).src(1u16));
//! method.push(Instruction::new(Opcode::Return).src(0u16));
//!
//! // Straight-line code: live-out sets by a single backward scan
//! let mut liveness = LivenessMap::new();
//! let mut live = LiveRegs::new();
//! for (id, insn) in method.iter().rev() {
//!     liveness.set_live_out(id, live.clone());
//!     live = live_in(insn, &live);
//! }
//!
//! let mut graph = build_graph(&method, 2, &RangeSet::new(), &liveness)?;
//! assert!(graph.is_coalesceable(VReg::new(0), VReg::new(1)));
//! graph.combine(VReg::new(1), VReg::new(0))?;
//! # Ok::<(), regraph::Error>(())
//! ```

mod builder;
mod classify;
mod graph;
mod lattice;
mod liveness;
mod node;
mod rangeset;

pub use builder::GraphBuilder;
pub use classify::{OperandConstraint, VirtualRegisterClassifier};
pub use graph::{GraphStats, InterferenceGraph};
pub use lattice::{MeetSemiLattice, TypeDomain};
pub use liveness::{live_in, LiveRegs, Liveness, LivenessMap};
pub use node::{edge_weight, Node, NodeProps};
pub use rangeset::RangeSet;

use crate::{ir::MethodBody, Result};

/// Builds the interference graph of `method`, see [`GraphBuilder::build`].
///
/// # Errors
///
/// Returns [`crate::Error::TypeConflict`] or [`crate::Error::MissingLiveness`]
/// when the input violates the builder's assumptions.
pub fn build_graph(
    method: &MethodBody,
    initial_regs: u16,
    range_set: &RangeSet,
    liveness: &dyn Liveness,
) -> Result<InterferenceGraph> {
    GraphBuilder::build(method, initial_regs, range_set, liveness)
}
