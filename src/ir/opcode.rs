//! Opcode classification for register allocation.
//!
//! The opcode set follows the register-based Dalvik instruction set, but only
//! carries what the allocator cares about:
//!
//! - which operand slots exist and what [`RegisterType`] each one implies,
//! - how many bits the widest non-range encoding gives each register field,
//! - whether the instruction has a `/range` variant.
//!
//! Encoding widths are the widest available per opcode. A `move` can always be
//! emitted as `move/16`, a `const` as `const/16`, while `iget` only exists in
//! the 4-bit `22c` format.

use strum::{EnumCount, EnumIter, IntoStaticStr};

use crate::ir::RegisterType::{self, Normal as N, Object as O, Wide as W};

/// Largest register index encodable in a field of `bits` bits.
#[must_use]
pub const fn max_unsigned_value(bits: u8) -> u16 {
    if bits >= 16 {
        u16::MAX
    } else {
        (1u16 << bits) - 1
    }
}

/// Operand layout of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Type written to the destination register, if the opcode has one.
    pub dest: Option<RegisterType>,
    /// Types implied for each fixed source operand. `None` marks an operand
    /// whose type is not determined by the opcode alone.
    pub srcs: &'static [Option<RegisterType>],
}

impl Signature {
    const fn new(dest: Option<RegisterType>, srcs: &'static [Option<RegisterType>]) -> Self {
        Self { dest, srcs }
    }
}

/// Register-allocation relevant opcodes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Opcode {
    // Pseudo instructions binding incoming arguments
    LoadParam,
    LoadParamWide,
    LoadParamObject,

    // Moves
    Move,
    MoveWide,
    MoveObject,
    MoveResult,
    MoveResultWide,
    MoveResultObject,
    MoveException,

    // Returns
    ReturnVoid,
    Return,
    ReturnWide,
    ReturnObject,

    // Constants
    Const,
    ConstWide,
    ConstString,
    ConstClass,

    // Objects and arrays
    MonitorEnter,
    MonitorExit,
    CheckCast,
    InstanceOf,
    ArrayLength,
    NewInstance,
    NewArray,
    FilledNewArray,
    FillArrayData,
    Throw,

    // Control flow
    Goto,
    PackedSwitch,
    SparseSwitch,
    IfEq,
    IfNe,
    IfLt,
    IfGe,
    IfGt,
    IfLe,
    IfEqz,
    IfNez,
    IfLtz,
    IfGez,
    IfGtz,
    IfLez,

    // Comparisons
    CmplFloat,
    CmpgFloat,
    CmplDouble,
    CmpgDouble,
    CmpLong,

    // Array element access
    Aget,
    AgetWide,
    AgetObject,
    Aput,
    AputWide,
    AputObject,

    // Field access
    Iget,
    IgetWide,
    IgetObject,
    Iput,
    IputWide,
    IputObject,
    Sget,
    SgetWide,
    SgetObject,
    Sput,
    SputWide,
    SputObject,

    // Invocations
    InvokeVirtual,
    InvokeSuper,
    InvokeDirect,
    InvokeStatic,
    InvokeInterface,

    // Unary operations and conversions
    NegInt,
    NotInt,
    NegLong,
    NotLong,
    NegFloat,
    NegDouble,
    IntToLong,
    IntToFloat,
    IntToDouble,
    LongToInt,
    LongToFloat,
    LongToDouble,
    FloatToInt,
    FloatToLong,
    FloatToDouble,
    DoubleToInt,
    DoubleToLong,
    DoubleToFloat,
    IntToByte,
    IntToChar,
    IntToShort,

    // Binary operations
    AddInt,
    SubInt,
    MulInt,
    DivInt,
    RemInt,
    AndInt,
    OrInt,
    XorInt,
    ShlInt,
    ShrInt,
    UshrInt,
    AddLong,
    SubLong,
    MulLong,
    DivLong,
    RemLong,
    AndLong,
    OrLong,
    XorLong,
    ShlLong,
    ShrLong,
    UshrLong,
    AddFloat,
    SubFloat,
    MulFloat,
    DivFloat,
    RemFloat,
    AddDouble,
    SubDouble,
    MulDouble,
    DivDouble,
    RemDouble,

    // Binary operations with a literal operand
    AddIntLit16,
    RsubInt,
    MulIntLit16,
    DivIntLit16,
    RemIntLit16,
    AndIntLit16,
    OrIntLit16,
    XorIntLit16,
    AddIntLit8,
    RsubIntLit8,
    MulIntLit8,
    DivIntLit8,
    RemIntLit8,
    AndIntLit8,
    OrIntLit8,
    XorIntLit8,
    ShlIntLit8,
    ShrIntLit8,
    UshrIntLit8,
}

impl Opcode {
    /// Returns the operand layout of this opcode.
    ///
    /// Invocations and `filled-new-array` take a variable number of sources;
    /// their fixed source list is empty and argument types come from the
    /// instruction itself.
    #[must_use]
    pub const fn signature(self) -> Signature {
        use Opcode::*;

        const NONE: &[Option<RegisterType>] = &[];

        match self {
            LoadParam => Signature::new(Some(N), NONE),
            LoadParamWide => Signature::new(Some(W), NONE),
            LoadParamObject => Signature::new(Some(O), NONE),

            Move => Signature::new(Some(N), &[Some(N)]),
            MoveWide => Signature::new(Some(W), &[Some(W)]),
            MoveObject => Signature::new(Some(O), &[Some(O)]),
            MoveResult => Signature::new(Some(N), NONE),
            MoveResultWide => Signature::new(Some(W), NONE),
            MoveResultObject | MoveException => Signature::new(Some(O), NONE),

            ReturnVoid | Goto => Signature::new(None, NONE),
            Return => Signature::new(None, &[Some(N)]),
            ReturnWide => Signature::new(None, &[Some(W)]),
            ReturnObject => Signature::new(None, &[Some(O)]),

            Const => Signature::new(Some(RegisterType::Const), NONE),
            ConstWide => Signature::new(Some(W), NONE),
            ConstString | ConstClass | NewInstance => Signature::new(Some(O), NONE),

            MonitorEnter | MonitorExit | FillArrayData | Throw => {
                Signature::new(None, &[Some(O)])
            }
            CheckCast => Signature::new(Some(O), &[Some(O)]),
            InstanceOf | ArrayLength => Signature::new(Some(N), &[Some(O)]),
            NewArray => Signature::new(Some(O), &[Some(N)]),
            FilledNewArray | InvokeVirtual | InvokeSuper | InvokeDirect | InvokeStatic
            | InvokeInterface => Signature::new(None, NONE),

            PackedSwitch | SparseSwitch | IfLtz | IfGez | IfGtz | IfLez => {
                Signature::new(None, &[Some(N)])
            }
            IfEq | IfNe => Signature::new(None, &[None, None]),
            IfLt | IfGe | IfGt | IfLe => Signature::new(None, &[Some(N), Some(N)]),
            IfEqz | IfNez => Signature::new(None, &[None]),

            CmplFloat | CmpgFloat => Signature::new(Some(N), &[Some(N), Some(N)]),
            CmplDouble | CmpgDouble | CmpLong => Signature::new(Some(N), &[Some(W), Some(W)]),

            Aget => Signature::new(Some(N), &[Some(O), Some(N)]),
            AgetWide => Signature::new(Some(W), &[Some(O), Some(N)]),
            AgetObject => Signature::new(Some(O), &[Some(O), Some(N)]),
            Aput => Signature::new(None, &[Some(N), Some(O), Some(N)]),
            AputWide => Signature::new(None, &[Some(W), Some(O), Some(N)]),
            AputObject => Signature::new(None, &[Some(O), Some(O), Some(N)]),

            Iget => Signature::new(Some(N), &[Some(O)]),
            IgetWide => Signature::new(Some(W), &[Some(O)]),
            IgetObject => Signature::new(Some(O), &[Some(O)]),
            Iput => Signature::new(None, &[Some(N), Some(O)]),
            IputWide => Signature::new(None, &[Some(W), Some(O)]),
            IputObject => Signature::new(None, &[Some(O), Some(O)]),
            Sget => Signature::new(Some(N), NONE),
            SgetWide => Signature::new(Some(W), NONE),
            SgetObject => Signature::new(Some(O), NONE),
            Sput => Signature::new(None, &[Some(N)]),
            SputWide => Signature::new(None, &[Some(W)]),
            SputObject => Signature::new(None, &[Some(O)]),

            NegInt | NotInt | NegFloat | IntToFloat | FloatToInt | IntToByte | IntToChar
            | IntToShort => Signature::new(Some(N), &[Some(N)]),
            NegLong | NotLong | NegDouble | LongToDouble | DoubleToLong => {
                Signature::new(Some(W), &[Some(W)])
            }
            IntToLong | IntToDouble | FloatToLong | FloatToDouble => {
                Signature::new(Some(W), &[Some(N)])
            }
            LongToInt | LongToFloat | DoubleToInt | DoubleToFloat => {
                Signature::new(Some(N), &[Some(W)])
            }

            AddInt | SubInt | MulInt | DivInt | RemInt | AndInt | OrInt | XorInt | ShlInt
            | ShrInt | UshrInt | AddFloat | SubFloat | MulFloat | DivFloat | RemFloat => {
                Signature::new(Some(N), &[Some(N), Some(N)])
            }
            AddLong | SubLong | MulLong | DivLong | RemLong | AndLong | OrLong | XorLong
            | AddDouble | SubDouble | MulDouble | DivDouble | RemDouble => {
                Signature::new(Some(W), &[Some(W), Some(W)])
            }
            ShlLong | ShrLong | UshrLong => Signature::new(Some(W), &[Some(W), Some(N)]),

            AddIntLit16 | RsubInt | MulIntLit16 | DivIntLit16 | RemIntLit16 | AndIntLit16
            | OrIntLit16 | XorIntLit16 | AddIntLit8 | RsubIntLit8 | MulIntLit8 | DivIntLit8
            | RemIntLit8 | AndIntLit8 | OrIntLit8 | XorIntLit8 | ShlIntLit8 | ShrIntLit8
            | UshrIntLit8 => Signature::new(Some(N), &[Some(N)]),
        }
    }

    /// Bit width of the destination register field in the widest non-range
    /// encoding of this opcode.
    #[must_use]
    pub const fn dest_bits(self) -> u8 {
        use Opcode::*;

        match self {
            LoadParam | LoadParamWide | LoadParamObject | Move | MoveWide | MoveObject => 16,
            InstanceOf | ArrayLength | NewArray | Iget | IgetWide | IgetObject => 4,
            NegInt | NotInt | NegLong | NotLong | NegFloat | NegDouble | IntToLong
            | IntToFloat | IntToDouble | LongToInt | LongToFloat | LongToDouble | FloatToInt
            | FloatToLong | FloatToDouble | DoubleToInt | DoubleToLong | DoubleToFloat
            | IntToByte | IntToChar | IntToShort => 4,
            AddIntLit16 | RsubInt | MulIntLit16 | DivIntLit16 | RemIntLit16 | AndIntLit16
            | OrIntLit16 | XorIntLit16 => 4,
            _ => 8,
        }
    }

    /// Bit width of each source register field in the widest non-range
    /// encoding of this opcode.
    #[must_use]
    pub const fn src_bits(self) -> u8 {
        use Opcode::*;

        match self {
            Move | MoveWide | MoveObject => 16,
            CheckCast => 8,
            InstanceOf | ArrayLength | NewArray | FilledNewArray | InvokeVirtual | InvokeSuper
            | InvokeDirect | InvokeStatic | InvokeInterface => 4,
            IfEq | IfNe | IfLt | IfGe | IfGt | IfLe => 4,
            Iget | IgetWide | IgetObject | Iput | IputWide | IputObject => 4,
            _ => self.dest_bits(),
        }
    }

    /// Returns `true` if the opcode has a `/range` variant addressing a
    /// contiguous block of argument registers.
    #[must_use]
    pub const fn has_range_form(self) -> bool {
        matches!(
            self,
            Self::FilledNewArray
                | Self::InvokeVirtual
                | Self::InvokeSuper
                | Self::InvokeDirect
                | Self::InvokeStatic
                | Self::InvokeInterface
        )
    }

    /// Returns `true` for opcodes taking a variable number of sources.
    #[must_use]
    pub const fn is_variadic(self) -> bool {
        self.has_range_form()
    }

    /// Returns `true` for register-to-register copies.
    #[must_use]
    pub const fn is_move(self) -> bool {
        matches!(self, Self::Move | Self::MoveWide | Self::MoveObject)
    }

    /// Returns `true` for the pseudo instructions binding incoming arguments.
    #[must_use]
    pub const fn is_load_param(self) -> bool {
        matches!(
            self,
            Self::LoadParam | Self::LoadParamWide | Self::LoadParamObject
        )
    }

    /// Returns `true` for `check-cast`.
    #[must_use]
    pub const fn is_check_cast(self) -> bool {
        matches!(self, Self::CheckCast)
    }

    /// Returns `true` if the opcode writes a destination register.
    #[must_use]
    pub const fn has_dest(self) -> bool {
        self.signature().dest.is_some()
    }

    /// Returns the mnemonic of this opcode.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
