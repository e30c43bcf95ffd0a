// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # regraph
//!
//! Interference graph construction for a register allocator targeting a
//! register-based bytecode with limited operand encodings.
//!
//! Given a method body, its per-instruction liveness and the set of
//! instructions selected for range encoding, `regraph` builds the graph a
//! graph-coloring allocator needs: which virtual registers interfere, which
//! pairs may still be coalesced, how far each register may be renumbered
//! before its encoding no longer fits, and which registers must end up
//! contiguous in range-encoded instructions.
//!
//! ## Features
//!
//! - **Deterministic graphs** - Ordered containers throughout, identical input gives identical output
//! - **Encoding-aware nodes** - Per-register caps derived from every operand slot that mentions it
//! - **Type checking** - Conflicting uses of one register are rejected instead of silently merged
//! - **Driver primitives** - Coalescing, node removal and colorability tests for a Briggs-style driver
//! - **Batch builds** - Many methods at once on a rayon pool with an event log
//!
//! ## Quick Start
//!
//! ```rust
//! use regraph::prelude::*;
//!
//! let mut method = MethodBody::new("LFoo;.copy:()I", 2);
//! method.push(Instruction::new(Opcode::Const).dest(0u16).literal(7));
//! method.push(Instruction::new(Opcode::Move).dest(1u16).src(0u16));
//! method.push(Instruction::new(Opcode::Return).src(1u16));
//!
//! let mut liveness = LivenessMap::new();
//! let mut live = LiveRegs::new();
//! for (id, insn) in method.iter().rev() {
//!     liveness.set_live_out(id, live.clone());
//!     live = live_in(insn, &live);
//! }
//!
//! let mut graph = build_graph(&method, 2, &RangeSet::new(), &liveness)?;
//! assert!(graph.is_coalesceable(VReg::new(0), VReg::new(1)));
//!
//! graph.combine(VReg::new(0), VReg::new(1))?;
//! assert!(!graph.get_node(VReg::new(1))?.is_active());
//! # Ok::<(), regraph::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ir`] - The register-based instruction model the allocator consumes
//! - [`regalloc`] - Classification, the type lattice, the graph and its builder
//! - [`driver`] - Batch construction over many methods
//! - [`utils`] - Supporting data structures
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Malformed input, such as a
//! register used with two incompatible types or a missing liveness entry, is
//! reported as an [`Error`] and never panics.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use regraph::prelude::*;
///
/// let graph = GraphBuilder::create_empty();
/// assert_eq!(graph.stats().nodes, 0);
/// ```
pub mod prelude;

/// The register-based instruction model.
///
/// Virtual registers, opcodes with their operand signatures and encoding
/// widths, instructions and method bodies.
pub mod ir;

/// Interference graph construction for register allocation.
pub mod regalloc;

/// Batch graph construction with configuration, events and statistics.
pub mod driver;

/// Supporting data structures.
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use regraph::{regalloc::InterferenceGraph, ir::VReg, Result};
///
/// fn weight(graph: &InterferenceGraph, reg: u16) -> Result<u32> {
///     Ok(graph.get_node(VReg::new(reg))?.weight())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `regraph` Error type
///
/// # Examples
///
/// ```rust
/// use regraph::{prelude::*, Error};
///
/// let graph = GraphBuilder::create_empty();
/// match graph.get_node(VReg::new(3)) {
///     Err(Error::NodeNotFound(reg)) => println!("no node for {reg}"),
///     Err(e) => println!("error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
pub use error::Error;
