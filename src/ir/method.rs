//! Method bodies as instruction arenas.

use crate::ir::{InsnId, Instruction, VReg};

/// The instruction stream of one method.
///
/// Instructions live in an arena and are addressed by [`InsnId`]. Indices are
/// assigned in push order and never change.
#[derive(Debug, Clone, Default)]
pub struct MethodBody {
    name: String,
    registers_size: u16,
    instructions: Vec<Instruction>,
}

impl MethodBody {
    /// Creates an empty method with a frame of `registers_size` registers.
    #[must_use]
    pub fn new(name: impl Into<String>, registers_size: u16) -> Self {
        Self {
            name: name.into(),
            registers_size,
            instructions: Vec::new(),
        }
    }

    /// Appends an instruction and returns its index.
    pub fn push(&mut self, insn: Instruction) -> InsnId {
        let id = InsnId::new(self.instructions.len());
        self.instructions.push(insn);
        id
    }

    /// Returns the method name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared register frame size.
    #[must_use]
    pub fn registers_size(&self) -> u16 {
        self.registers_size
    }

    /// Returns the instruction at `id`.
    #[must_use]
    pub fn get(&self, id: InsnId) -> Option<&Instruction> {
        self.instructions.get(id.index())
    }

    /// Iterates over `(id, instruction)` pairs in program order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (InsnId, &Instruction)> + '_ {
        self.instructions
            .iter()
            .enumerate()
            .map(|(idx, insn)| (InsnId::new(idx), insn))
    }

    /// Returns the number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the method has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// One past the largest register referenced by any instruction, or the
    /// declared frame size if that is larger.
    #[must_use]
    pub fn register_bound(&self) -> usize {
        self.instructions
            .iter()
            .flat_map(Instruction::registers)
            .map(|reg| reg.as_usize() + 1)
            .max()
            .unwrap_or(0)
            .max(self.registers_size as usize)
    }

    /// Iterates over the registers referenced by the method, ascending and
    /// without duplicates.
    pub fn referenced_registers(&self) -> impl Iterator<Item = VReg> {
        let mut regs: Vec<VReg> = self
            .instructions
            .iter()
            .flat_map(Instruction::registers)
            .collect();
        regs.sort_unstable();
        regs.dedup();
        regs.into_iter()
    }
}
