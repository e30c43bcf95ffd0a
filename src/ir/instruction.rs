//! Instructions and their operand views.

use std::fmt;

use crate::ir::{max_unsigned_value, Opcode, RegisterType, VReg};

/// Stable index of an instruction inside its [`MethodBody`](crate::ir::MethodBody).
///
/// Liveness snapshots and range bookkeeping are keyed by this index rather
/// than by instruction identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InsnId(usize);

impl InsnId {
    /// Creates an instruction index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single register-based instruction.
///
/// Built through a fluent API:
///
/// ```rust
/// use regraph::ir::{Instruction, Opcode, RegisterType, VReg};
///
/// let call = Instruction::new(Opcode::InvokeStatic)
///     .srcs([VReg::new(0), VReg::new(1)])
///     .arg_types([RegisterType::Object, RegisterType::Normal]);
/// assert_eq!(call.src_regs().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: Opcode,
    dest: Option<VReg>,
    srcs: Vec<VReg>,
    literal: Option<i64>,
    arg_types: Vec<RegisterType>,
}

impl Instruction {
    /// Creates an instruction without operands.
    #[must_use]
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            dest: None,
            srcs: Vec::new(),
            literal: None,
            arg_types: Vec::new(),
        }
    }

    /// Sets the destination register.
    #[must_use]
    pub fn dest(mut self, reg: impl Into<VReg>) -> Self {
        self.dest = Some(reg.into());
        self
    }

    /// Appends a source register.
    #[must_use]
    pub fn src(mut self, reg: impl Into<VReg>) -> Self {
        self.srcs.push(reg.into());
        self
    }

    /// Appends several source registers in order.
    #[must_use]
    pub fn srcs<I, R>(mut self, regs: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<VReg>,
    {
        self.srcs.extend(regs.into_iter().map(Into::into));
        self
    }

    /// Sets the literal operand.
    #[must_use]
    pub fn literal(mut self, value: i64) -> Self {
        self.literal = Some(value);
        self
    }

    /// Sets the argument types of a variadic instruction, parallel to its
    /// sources.
    #[must_use]
    pub fn arg_types(mut self, types: impl IntoIterator<Item = RegisterType>) -> Self {
        self.arg_types = types.into_iter().collect();
        self
    }

    /// Returns the opcode.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Returns the destination register, if any.
    #[must_use]
    pub fn dest_reg(&self) -> Option<VReg> {
        self.dest
    }

    /// Returns the source registers in operand order.
    #[must_use]
    pub fn src_regs(&self) -> &[VReg] {
        &self.srcs
    }

    /// Returns the literal operand, if any.
    #[must_use]
    pub fn literal_value(&self) -> Option<i64> {
        self.literal
    }

    /// Type written to the destination.
    ///
    /// A `const` of literal zero yields [`RegisterType::Zero`] so the value
    /// can later be used as either a null reference or an integer.
    #[must_use]
    pub fn dest_type(&self) -> Option<RegisterType> {
        self.dest?;
        match (self.opcode, self.literal) {
            (Opcode::Const, Some(0)) => Some(RegisterType::Zero),
            _ => self.opcode.signature().dest,
        }
    }

    /// Type implied for the source at `index`, or `None` when neither the
    /// opcode nor the instruction constrains it.
    #[must_use]
    pub fn src_type(&self, index: usize) -> Option<RegisterType> {
        if index >= self.srcs.len() {
            return None;
        }
        if self.opcode.is_variadic() {
            return self.arg_types.get(index).copied();
        }
        self.opcode.signature().srcs.get(index).copied().flatten()
    }

    /// Returns `true` if the destination holds a wide value.
    #[must_use]
    pub fn dest_is_wide(&self) -> bool {
        self.dest_type().is_some_and(RegisterType::is_wide)
    }

    /// Returns `true` if the source at `index` holds a wide value.
    #[must_use]
    pub fn src_is_wide(&self, index: usize) -> bool {
        self.src_type(index).is_some_and(RegisterType::is_wide)
    }

    /// Largest register index the destination may take without forcing a
    /// different encoding.
    #[must_use]
    pub fn dest_max_vreg(&self) -> u16 {
        max_unsigned_value(self.opcode.dest_bits())
    }

    /// Largest register index each source may take in the non-range form.
    #[must_use]
    pub fn src_max_vreg(&self) -> u16 {
        max_unsigned_value(self.opcode.src_bits())
    }

    /// Iterates over every register the instruction reads or writes, the
    /// destination first.
    pub fn registers(&self) -> impl Iterator<Item = VReg> + '_ {
        self.dest.into_iter().chain(self.srcs.iter().copied())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        let mut first = true;
        for reg in self.registers() {
            let sep = if first { " " } else { ", " };
            write!(f, "{sep}{reg}")?;
            first = false;
        }
        if let Some(lit) = self.literal {
            let sep = if first { " " } else { ", " };
            write!(f, "{sep}#{lit}")?;
        }
        Ok(())
    }
}
