//! Minimal register-based instruction model.
//!
//! The allocator only needs to know, per instruction, which registers are
//! written and read, what storage type each operand carries, and how many bits
//! the encoding gives each register field. Everything else about the
//! instruction set is deliberately left out.
//!
//! # Key Components
//!
//! - [`VReg`] - Virtual register identifier
//! - [`RegisterType`] - Storage classification of an operand
//! - [`Opcode`] - Opcode table with operand layouts and encoding widths
//! - [`Instruction`] / [`InsnId`] - Instructions and their arena index
//! - [`MethodBody`] - An instruction arena plus frame size

mod instruction;
mod method;
mod opcode;
mod register;
mod types;

pub use instruction::{InsnId, Instruction};
pub use method::MethodBody;
pub use opcode::{max_unsigned_value, Opcode, Signature};
pub use register::VReg;
pub use types::RegisterType;
