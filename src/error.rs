use thiserror::Error;

use crate::{
    ir::{InsnId, RegisterType, VReg},
    regalloc::TypeDomain,
};

macro_rules! precondition_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::PreconditionViolation {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::PreconditionViolation {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant is local to the method being processed: a failed build never leaves a
/// partially constructed graph behind, and other methods are unaffected.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::TypeConflict`] - A live range is reached by two incompatible types
/// - [`Error::MissingLiveness`] - The liveness oracle does not cover an instruction
///
/// ## Usage Errors
/// - [`Error::NodeNotFound`] - Query for a register the graph does not know
/// - [`Error::LivenessNotFound`] - Query for an instruction without a range snapshot
/// - [`Error::PreconditionViolation`] - A graph mutation was called in an invalid state
///
/// ## Reporting
/// - [`Error::Method`] - Any of the above, tagged with the method it occurred in
///
/// # Examples
///
/// ```rust
/// use regraph::{Error, ir::VReg, regalloc::GraphBuilder};
///
/// let graph = GraphBuilder::create_empty();
/// match graph.get_node(VReg::new(3)) {
///     Err(Error::NodeNotFound(reg)) => assert_eq!(reg, VReg::new(3)),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A register's merged type reached the conflict state.
    ///
    /// The allocator requires every live range to carry exactly one storage type. This
    /// error names the offending register and the instruction whose operand introduced
    /// the incompatible type.
    ///
    /// # Fields
    ///
    /// * `reg` - The register whose type conflicted
    /// * `insn` - The instruction at which the conflict was detected
    /// * `existing` - The type merged from earlier occurrences
    /// * `incoming` - The type the instruction tried to merge in
    #[error("Type conflict on {reg} at {insn}: {existing} is incompatible with {incoming}")]
    TypeConflict {
        /// The register whose type conflicted
        reg: VReg,
        /// The instruction at which the conflict was detected
        insn: InsnId,
        /// The type merged from earlier occurrences
        existing: TypeDomain,
        /// The incompatible type
        incoming: RegisterType,
    },

    /// The graph holds no node for this register.
    ///
    /// Every register referenced by the method gets a node during construction, so this
    /// points at a caller passing a register from a different method or frame.
    #[error("No node for register {0}")]
    NodeNotFound(VReg),

    /// No range liveness snapshot exists for this instruction.
    ///
    /// Snapshots are only recorded for instructions that can take a range encoding.
    #[error("No range liveness recorded for instruction {0}")]
    LivenessNotFound(InsnId),

    /// The liveness oracle returned nothing for an instruction of the method.
    #[error("Liveness oracle has no live-out set for instruction {0}")]
    MissingLiveness(InsnId),

    /// A graph operation was invoked while its precondition did not hold.
    ///
    /// Raised by [`crate::regalloc::InterferenceGraph::combine`] when the pair is not
    /// coalesceable, identical, or already inactive. Includes the source location of the
    /// check for debugging.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated precondition
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Precondition violated - {file}:{line}: {message}")]
    PreconditionViolation {
        /// The message describing the violated precondition
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An error raised while processing a specific method.
    #[error("{method}: {source}")]
    Method {
        /// Name of the method being processed
        method: String,
        /// The underlying error
        source: Box<Error>,
    },
}

impl Error {
    /// Tags this error with the method it occurred in. Already tagged errors are
    /// returned unchanged.
    #[must_use]
    pub fn in_method(self, method: impl Into<String>) -> Self {
        match self {
            Self::Method { .. } => self,
            other => Self::Method {
                method: method.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the error with any method tag stripped.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::Method { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the method name if the error is tagged with one.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Method { method, .. } => Some(method),
            _ => None,
        }
    }
}
