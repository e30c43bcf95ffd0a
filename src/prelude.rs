//! # regraph Prelude
//!
//! The types needed to describe a method, build its interference graph and
//! drive a batch, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all regraph operations
pub use crate::Error;

/// The result type used throughout regraph
pub use crate::Result;

// ================================================================================================
// Instruction Model
// ================================================================================================

pub use crate::ir::{InsnId, Instruction, MethodBody, Opcode, RegisterType, VReg};

// ================================================================================================
// Graph Construction
// ================================================================================================

pub use crate::regalloc::{
    build_graph, edge_weight, live_in, GraphBuilder, GraphStats, InterferenceGraph, LiveRegs,
    Liveness, LivenessMap, MeetSemiLattice, Node, NodeProps, OperandConstraint, RangeSet,
    TypeDomain, VirtualRegisterClassifier,
};

// ================================================================================================
// Batch Driver
// ================================================================================================

pub use crate::driver::{
    BuildConfig, BuildReport, BuildSession, BuildStats, EventKind, EventLog, MethodInput,
};
