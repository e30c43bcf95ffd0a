//! Fixtures shared by unit tests.

use crate::{
    ir::{Instruction, MethodBody},
    regalloc::{live_in, LiveRegs, LivenessMap},
};

/// Builds a method named `test` from a frame size and instruction list.
pub fn method(registers_size: u16, insns: Vec<Instruction>) -> MethodBody {
    named_method("test", registers_size, insns)
}

/// Builds a method with the given name.
pub fn named_method(name: &str, registers_size: u16, insns: Vec<Instruction>) -> MethodBody {
    let mut body = MethodBody::new(name, registers_size);
    for insn in insns {
        body.push(insn);
    }
    body
}

/// Live-out sets of a method without branches, from one backward scan.
pub fn straight_line_liveness(body: &MethodBody) -> LivenessMap {
    let mut liveness = LivenessMap::new();
    let mut live = LiveRegs::new();
    for (id, insn) in body.iter().rev() {
        liveness.set_live_out(id, live.clone());
        live = live_in(insn, &live);
    }
    liveness
}
