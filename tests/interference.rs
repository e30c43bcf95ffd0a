//! Interference graph integration tests.
//!
//! These tests exercise the public API end to end:
//! 1. Describe a method with `Instruction` and `MethodBody`
//! 2. Compute live-out sets (straight-line scan or hand-written for branches)
//! 3. Build the graph with `GraphBuilder`
//! 4. Drive it the way a coloring allocator would (`remove_node`, `combine`)

use std::collections::HashMap;

use regraph::{
    ir::{InsnId, Instruction, MethodBody, Opcode, RegisterType, VReg},
    regalloc::{
        edge_weight, live_in, GraphBuilder, InterferenceGraph, LiveRegs, LivenessMap, RangeSet,
        TypeDomain,
    },
    Error, Result,
};

fn r(idx: u16) -> VReg {
    VReg::new(idx)
}

fn method(name: &str, registers_size: u16, insns: Vec<Instruction>) -> MethodBody {
    let mut body = MethodBody::new(name, registers_size);
    for insn in insns {
        body.push(insn);
    }
    body
}

/// Live-out sets for code without branches.
fn straight_line(body: &MethodBody) -> LivenessMap {
    let mut liveness = LivenessMap::new();
    let mut live = LiveRegs::new();
    for (id, insn) in body.iter().rev() {
        liveness.set_live_out(id, live.clone());
        live = live_in(insn, &live);
    }
    liveness
}

fn build(body: &MethodBody) -> Result<InterferenceGraph> {
    GraphBuilder::build(
        body,
        body.registers_size(),
        &RangeSet::new(),
        &straight_line(body),
    )
}

/// Small deterministic generator so the property tests need no extra crates.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, bound: u16) -> u16 {
        (self.next() % u64::from(bound)) as u16
    }
}

/// Builds a graph of `count` narrow nodes with random edges.
fn random_graph(seed: u64, count: u16, edges: usize) -> Result<InterferenceGraph> {
    let mut rng = XorShift(seed);
    let mut graph = GraphBuilder::create_empty();
    for idx in 0..count {
        GraphBuilder::make_node(&mut graph, r(idx), RegisterType::Normal, u16::MAX);
    }
    for _ in 0..edges {
        let (u, v) = (r(rng.below(count)), r(rng.below(count)));
        if rng.next() % 3 == 0 {
            GraphBuilder::add_coalesceable_edge(&mut graph, u, v)?;
        } else {
            GraphBuilder::add_edge(&mut graph, u, v)?;
        }
    }
    Ok(graph)
}

#[test]
fn test_adjacency_is_symmetric() -> Result<()> {
    for seed in 1..20 {
        let graph = random_graph(seed, 12, 40)?;
        for u in 0..12 {
            for v in 0..12 {
                assert_eq!(graph.is_adjacent(r(u), r(v)), graph.is_adjacent(r(v), r(u)));
                assert_eq!(
                    graph.is_coalesceable(r(u), r(v)),
                    graph.is_coalesceable(r(v), r(u))
                );
            }
        }
        for (reg, node) in graph.nodes() {
            for &other in node.adjacent() {
                assert!(graph.is_adjacent(*reg, other));
                assert!(graph.get_node(other)?.adjacent().contains(reg));
            }
        }
    }
    Ok(())
}

#[test]
fn test_conflict_is_never_downgraded() -> Result<()> {
    let mut graph = random_graph(7, 8, 30)?;
    let conflicting: Vec<_> = graph.edges().filter(|(_, _, c)| !c).collect();
    assert!(!conflicting.is_empty());

    for &(u, v, _) in &conflicting {
        GraphBuilder::add_coalesceable_edge(&mut graph, u, v)?;
        GraphBuilder::add_coalesceable_edge(&mut graph, v, u)?;
        assert!(!graph.is_coalesceable(u, v));
    }
    Ok(())
}

#[test]
fn test_combine_preserves_conflicts() -> Result<()> {
    for seed in 1..30 {
        let mut graph = random_graph(seed, 10, 25)?;
        let Some((u, v)) = graph
            .edges()
            .find(|&(_, _, c)| c)
            .map(|(u, v, _)| (u, v))
        else {
            continue;
        };

        let before: Vec<(VReg, bool)> = (0..10)
            .map(r)
            .filter(|&w| w != u && w != v)
            .filter(|&w| graph.is_adjacent(u, w) || graph.is_adjacent(v, w))
            .map(|w| {
                let conflict = (graph.is_adjacent(u, w) && !graph.is_coalesceable(u, w))
                    || (graph.is_adjacent(v, w) && !graph.is_coalesceable(v, w));
                (w, conflict)
            })
            .collect();

        graph.combine(u, v)?;

        for (w, conflict) in before {
            assert!(graph.is_adjacent(u, w), "seed {seed}: {u} lost {w}");
            assert_eq!(graph.is_coalesceable(u, w), !conflict, "seed {seed}: {u}-{w}");
        }
        assert!(!graph.get_node(v)?.is_active());
    }
    Ok(())
}

#[test]
fn test_remove_node_keeps_state() -> Result<()> {
    let mut graph = random_graph(3, 6, 12)?;
    let before = graph.get_node(r(2))?.clone();

    graph.remove_node(r(2))?;
    graph.remove_node(r(2))?;

    assert!(graph.active_nodes().all(|(reg, _)| reg != r(2)));
    let after = graph.get_node(r(2))?;
    assert!(!after.is_active());
    assert_eq!(after.weight(), before.weight());
    assert_eq!(after.adjacent(), before.adjacent());
    for &w in before.adjacent() {
        assert!(graph.is_adjacent(r(2), w));
    }
    Ok(())
}

#[test]
fn test_range_set_ordering() {
    let (i1, i2, i3) = (InsnId::new(4), InsnId::new(1), InsnId::new(9));
    let mut set = RangeSet::new();
    set.insert(i1);
    set.insert(i2);
    set.insert(i1);
    set.insert(i3);

    assert_eq!(set.len(), 3);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![i1, i2, i3]);
    assert!(set.contains(i2));
}

#[test]
fn test_isolated_nodes_are_colorable() -> Result<()> {
    let mut graph = GraphBuilder::create_empty();
    for (idx, ty, cap) in [
        (0, RegisterType::Normal, 0),
        (1, RegisterType::Wide, 1),
        (2, RegisterType::Object, 15),
        (3, RegisterType::Wide, u16::MAX),
    ] {
        GraphBuilder::make_node(&mut graph, r(idx), ty, cap);
    }
    for (_, node) in graph.nodes() {
        assert!(node.definitely_colorable());
    }
    Ok(())
}

#[test]
fn test_wide_and_narrow_live_together() -> Result<()> {
    let body = method(
        "LFoo;.mix:()J",
        2,
        vec![
            Instruction::new(Opcode::Const).dest(0u16).literal(5),
            Instruction::new(Opcode::ConstWide).dest(1u16).literal(9),
            Instruction::new(Opcode::IfEqz).src(0u16),
            Instruction::new(Opcode::ReturnWide).src(1u16),
        ],
    );
    let graph = build(&body)?;

    assert_eq!(graph.edges().count(), 1);
    assert!(graph.is_adjacent(r(0), r(1)));
    assert!(!graph.is_coalesceable(r(0), r(1)));
    assert_eq!(graph.get_node(r(0))?.weight(), edge_weight(1, 2));
    assert_eq!(graph.get_node(r(1))?.weight(), edge_weight(1, 2));
    assert_eq!(graph.get_node(r(1))?.width(), 2);
    Ok(())
}

#[test]
fn test_move_then_combine() -> Result<()> {
    let body = method(
        "LFoo;.copy:(I)I",
        4,
        vec![
            Instruction::new(Opcode::LoadParam).dest(3u16),
            Instruction::new(Opcode::Const).dest(2u16).literal(1),
            Instruction::new(Opcode::Move).dest(1u16).src(3u16),
            Instruction::new(Opcode::AddInt).dest(0u16).srcs([1u16, 2]),
            Instruction::new(Opcode::Return).src(0u16),
        ],
    );
    let mut graph = build(&body)?;

    assert!(graph.is_adjacent(r(1), r(3)));
    assert!(graph.is_coalesceable(r(1), r(3)));
    assert!(graph.is_adjacent(r(1), r(2)));
    assert!(!graph.is_coalesceable(r(1), r(2)));

    graph.combine(r(3), r(1))?;

    assert!(!graph.get_node(r(1))?.is_active());
    assert!(graph.is_adjacent(r(3), r(2)));
    assert!(!graph.is_coalesceable(r(3), r(2)));
    let merged = graph.get_node(r(3))?;
    assert!(merged.is_param());
    assert_eq!(merged.register_type(), Some(RegisterType::Normal));
    Ok(())
}

#[test]
fn test_combine_rejects_interfering_pair() -> Result<()> {
    let body = method(
        "LFoo;.sum:()I",
        2,
        vec![
            Instruction::new(Opcode::Const).dest(0u16).literal(1),
            Instruction::new(Opcode::Const).dest(1u16).literal(2),
            Instruction::new(Opcode::AddInt).dest(0u16).srcs([0u16, 1]),
            Instruction::new(Opcode::Return).src(0u16),
        ],
    );
    let mut graph = build(&body)?;

    let err = graph.combine(r(0), r(1)).unwrap_err();
    assert!(matches!(err, Error::PreconditionViolation { .. }));
    assert!(graph.get_node(r(1))?.is_active());
    assert!(matches!(
        graph.combine(r(0), r(7)),
        Err(Error::NodeNotFound(reg)) if reg == r(7)
    ));
    Ok(())
}

#[test]
fn test_type_conflict_across_paths() {
    // #0 load-param v2
    // #1 if-eqz v2 -> #4
    // #2 new-instance v0
    // #3 goto #5
    // #4 const v0, #1
    // #5 return v0
    let body = method(
        "LFoo;.join:(I)I",
        3,
        vec![
            Instruction::new(Opcode::LoadParam).dest(2u16),
            Instruction::new(Opcode::IfEqz).src(2u16),
            Instruction::new(Opcode::NewInstance).dest(0u16),
            Instruction::new(Opcode::Goto),
            Instruction::new(Opcode::Const).dest(0u16).literal(1),
            Instruction::new(Opcode::Return).src(0u16),
        ],
    );

    let v0: LiveRegs = [r(0)].into_iter().collect();
    let mut liveness: HashMap<InsnId, LiveRegs> = HashMap::new();
    liveness.insert(InsnId::new(0), [r(2)].into_iter().collect());
    liveness.insert(InsnId::new(1), LiveRegs::new());
    liveness.insert(InsnId::new(2), v0.clone());
    liveness.insert(InsnId::new(3), v0.clone());
    liveness.insert(InsnId::new(4), v0);
    liveness.insert(InsnId::new(5), LiveRegs::new());

    let err = GraphBuilder::build(&body, 3, &RangeSet::new(), &liveness).unwrap_err();
    match err {
        Error::TypeConflict {
            reg,
            existing,
            incoming,
            ..
        } => {
            assert_eq!(reg, r(0));
            assert_eq!(existing, TypeDomain::Type(RegisterType::Object));
            assert_eq!(incoming, RegisterType::Const);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_null_constant_joins_reference() -> Result<()> {
    let body = method(
        "LFoo;.orNull:()Ljava/lang/Object;",
        1,
        vec![
            Instruction::new(Opcode::Const).dest(0u16).literal(0),
            Instruction::new(Opcode::NewInstance).dest(0u16),
            Instruction::new(Opcode::ReturnObject).src(0u16),
        ],
    );
    let graph = build(&body)?;
    assert_eq!(
        graph.get_node(r(0))?.register_type(),
        Some(RegisterType::Object)
    );
    Ok(())
}

#[test]
fn test_range_invoke_records_liveness() -> Result<()> {
    let body = method(
        "LFoo;.call:()V",
        20,
        vec![
            Instruction::new(Opcode::NewInstance).dest(17u16),
            Instruction::new(Opcode::Const).dest(18u16).literal(4),
            Instruction::new(Opcode::Const).dest(19u16).literal(2),
            Instruction::new(Opcode::InvokeStatic)
                .srcs([17u16, 18])
                .arg_types([RegisterType::Object, RegisterType::Normal]),
            Instruction::new(Opcode::Return).src(19u16),
        ],
    );
    let invoke = InsnId::new(3);
    let mut range_set = RangeSet::new();
    range_set.insert(invoke);

    let graph = GraphBuilder::build(&body, 20, &range_set, &straight_line(&body))?;

    let snapshot = graph.get_liveness(invoke)?;
    assert_eq!(snapshot.iter().collect::<Vec<_>>(), vec![r(19)]);
    // v19 stays live across the call and encloses both dying arguments
    assert!(graph.has_containment_edge(r(19), r(17)));
    assert!(graph.has_containment_edge(r(19), r(18)));
    assert!(!graph.has_containment_edge(r(17), r(19)));
    assert!(!graph.has_containment_edge(r(17), r(18)));
    assert!(!graph.has_containment_edge(r(18), r(17)));

    for reg in [r(17), r(18)] {
        let node = graph.get_node(reg)?;
        assert!(node.is_range());
        assert!(node.max_vreg() > 15);
    }
    assert!(matches!(
        graph.get_liveness(InsnId::new(4)),
        Err(Error::LivenessNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_non_range_invoke_caps_arguments() -> Result<()> {
    let body = method(
        "LFoo;.call:()V",
        20,
        vec![
            Instruction::new(Opcode::NewInstance).dest(17u16),
            Instruction::new(Opcode::InvokeDirect)
                .src(17u16)
                .arg_types([RegisterType::Object]),
            Instruction::new(Opcode::ReturnVoid),
        ],
    );
    let graph = build(&body)?;
    let node = graph.get_node(r(17))?;
    assert_eq!(node.max_vreg(), 15);
    assert!(!node.is_range());
    Ok(())
}

#[test]
fn test_builds_are_deterministic() -> Result<()> {
    let body = method(
        "LFoo;.loop:(II)I",
        6,
        vec![
            Instruction::new(Opcode::LoadParam).dest(4u16),
            Instruction::new(Opcode::LoadParam).dest(5u16),
            Instruction::new(Opcode::AddInt).dest(0u16).srcs([4u16, 5]),
            Instruction::new(Opcode::MulInt).dest(1u16).srcs([0u16, 4]),
            Instruction::new(Opcode::Move).dest(2u16).src(1u16),
            Instruction::new(Opcode::ConstWide).dest(6u16).literal(3),
            Instruction::new(Opcode::InvokeStatic)
                .srcs([2u16, 6, 0])
                .arg_types([RegisterType::Normal, RegisterType::Wide, RegisterType::Normal]),
            Instruction::new(Opcode::Return).src(0u16),
        ],
    );
    let first = build(&body)?;
    let second = build(&body)?;

    assert_eq!(first.to_dot(None), second.to_dot(None));
    assert_eq!(
        first.edges().collect::<Vec<_>>(),
        second.edges().collect::<Vec<_>>()
    );
    assert_eq!(
        first.containment_edges().collect::<Vec<_>>(),
        second.containment_edges().collect::<Vec<_>>()
    );
    assert!(first.get_node(r(6))?.is_spilt());
    Ok(())
}

#[test]
fn test_dot_export() -> Result<()> {
    let body = method(
        "LFoo;.copy:()I",
        2,
        vec![
            Instruction::new(Opcode::Const).dest(0u16).literal(3),
            Instruction::new(Opcode::Move).dest(1u16).src(0u16),
            Instruction::new(Opcode::Return).src(1u16),
        ],
    );
    let mut graph = build(&body)?;
    graph.remove_node(r(1))?;

    let dot = graph.to_dot(Some("LFoo;.copy:()I"));
    assert!(dot.starts_with("graph Interference {"));
    assert!(dot.contains("v0 -- v1 [style=dotted];"));
    assert!(dot.contains("style=dashed"));
    assert!(dot.trim_end().ends_with('}'));
    Ok(())
}

#[test]
fn test_missing_liveness_is_reported() {
    let body = method(
        "LFoo;.bare:()V",
        1,
        vec![
            Instruction::new(Opcode::Const).dest(0u16).literal(1),
            Instruction::new(Opcode::ReturnVoid),
        ],
    );
    let mut liveness = LivenessMap::new();
    liveness.set_live_out(InsnId::new(0), LiveRegs::new());

    let err = GraphBuilder::build(&body, 1, &RangeSet::new(), &liveness).unwrap_err();
    assert!(matches!(err, Error::MissingLiveness(id) if id == InsnId::new(1)));
}
