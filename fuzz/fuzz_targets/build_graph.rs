#![no_main]

use libfuzzer_sys::fuzz_target;
use regraph::{
    ir::{Instruction, MethodBody, Opcode, RegisterType, VReg},
    regalloc::{live_in, GraphBuilder, LiveRegs, LivenessMap, RangeSet},
};
use strum::{EnumCount, IntoEnumIterator};

const TYPES: [RegisterType; 5] = [
    RegisterType::Zero,
    RegisterType::Const,
    RegisterType::Normal,
    RegisterType::Wide,
    RegisterType::Object,
];

// Each instruction takes 4 bytes: opcode, dest, two sources. The high bit of
// the opcode byte selects the instruction for range encoding.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let frame = u16::from(data[0] % 32);
    let mut method = MethodBody::new("fuzz", frame);
    let mut range_set = RangeSet::new();

    for chunk in data[1..].chunks_exact(4) {
        let Some(opcode) = Opcode::iter().nth(usize::from(chunk[0] & 0x7f) % Opcode::COUNT) else {
            return;
        };
        let srcs = [u16::from(chunk[2] % 40), u16::from(chunk[3] % 40)];
        let mut insn = Instruction::new(opcode).srcs(srcs).literal(i64::from(chunk[1] >> 6));
        if opcode.has_dest() {
            insn = insn.dest(u16::from(chunk[1] % 40));
        }
        if opcode.is_variadic() {
            insn = insn.arg_types(srcs.iter().map(|s| TYPES[usize::from(*s) % TYPES.len()]));
        }
        let id = method.push(insn);
        if chunk[0] & 0x80 != 0 {
            range_set.insert(id);
        }
    }

    let mut liveness = LivenessMap::new();
    let mut live = LiveRegs::new();
    for (id, insn) in method.iter().rev() {
        liveness.set_live_out(id, live.clone());
        live = live_in(insn, &live);
    }

    let Ok(mut graph) = GraphBuilder::build(&method, frame, &range_set, &liveness) else {
        return;
    };
    let _ = graph.to_dot(Some("fuzz"));

    let regs: Vec<VReg> = graph.nodes().keys().copied().collect();
    for pair in regs.windows(2) {
        if graph.is_coalesceable(pair[0], pair[1]) {
            let _ = graph.combine(pair[0], pair[1]);
        } else {
            let _ = graph.remove_node(pair[1]);
        }
    }
    for (_, node) in graph.active_nodes() {
        let _ = node.definitely_colorable();
    }
});
