//! Static per-operand register constraints.
//!
//! For every register an instruction touches, the classifier derives the
//! attributes that instruction imposes on the register's node:
//!
//! - **width** from the operand's storage type,
//! - **max_vreg** from the register field width of the opcode's encoding,
//! - **PARAM** for registers bound by `load-param*`,
//! - **RANGE** for sources of instructions selected for range encoding,
//! - the operand **type** to be merged into the node's [`TypeDomain`](crate::regalloc::TypeDomain).
//!
//! Range encodings address their operands through a start register and a
//! count, so sources of a range-set member carry no per-operand cap. Opcodes
//! without a range form keep their caps even when listed in the range set.

use crate::{
    ir::{InsnId, Instruction, RegisterType, VReg},
    regalloc::RangeSet,
};

/// Constraint one operand of one instruction places on its register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandConstraint {
    /// The constrained register.
    pub reg: VReg,
    /// Slots the operand occupies, 1 or 2.
    pub width: u8,
    /// Encoding cap for the register, `None` if the operand is uncapped.
    pub max_vreg: Option<u16>,
    /// The operand binds an incoming parameter.
    pub param: bool,
    /// The operand belongs to a range-encoded instruction.
    pub range: bool,
    /// Storage type the operand implies, if any.
    pub ty: Option<RegisterType>,
}

/// Derives per-register constraints from opcodes and the range set.
#[derive(Debug, Clone, Copy)]
pub struct VirtualRegisterClassifier<'a> {
    range_set: &'a RangeSet,
}

impl<'a> VirtualRegisterClassifier<'a> {
    /// Creates a classifier for a method whose range instructions are
    /// `range_set`.
    #[must_use]
    pub fn new(range_set: &'a RangeSet) -> Self {
        Self { range_set }
    }

    /// Returns the constraints of every operand of `insn`, destination first,
    /// then sources in operand order.
    #[must_use]
    pub fn classify(&self, id: InsnId, insn: &Instruction) -> Vec<OperandConstraint> {
        let mut constraints = Vec::with_capacity(insn.src_regs().len() + 1);

        if let Some(dest) = insn.dest_reg() {
            let ty = insn.dest_type();
            constraints.push(OperandConstraint {
                reg: dest,
                width: ty.map_or(1, RegisterType::width),
                max_vreg: Some(insn.dest_max_vreg()),
                param: insn.opcode().is_load_param(),
                range: false,
                ty,
            });
        }

        let in_range = insn.opcode().has_range_form() && self.range_set.contains(id);
        let src_cap = insn.src_max_vreg();
        for (idx, &src) in insn.src_regs().iter().enumerate() {
            let ty = insn.src_type(idx);
            constraints.push(OperandConstraint {
                reg: src,
                width: ty.map_or(1, RegisterType::width),
                max_vreg: (!in_range).then_some(src_cap),
                param: false,
                range: in_range,
                ty,
            });
        }

        constraints
    }
}
