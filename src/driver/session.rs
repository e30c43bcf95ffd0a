//! Batch construction of per-method interference graphs.
//!
//! Each method gets its own graph, built on whichever worker picks it up. No
//! state is shared between builds except the append-only [`EventLog`], so a
//! failure in one method cannot affect another. Results are always reported in
//! input order, independent of scheduling.

use std::{
    fmt,
    time::{Duration, Instant},
};

use rayon::prelude::*;

use crate::{
    driver::{BuildConfig, EventKind, EventLog},
    ir::MethodBody,
    regalloc::{GraphBuilder, GraphStats, InterferenceGraph, Liveness, RangeSet},
    Error, Result,
};

/// Everything needed to build the graph of one method.
#[derive(Clone, Copy)]
pub struct MethodInput<'a> {
    /// The method to allocate.
    pub method: &'a MethodBody,
    /// Live-out sets for every instruction of `method`.
    pub liveness: &'a (dyn Liveness + Sync),
    /// Instructions selected for range encoding.
    pub range_set: &'a RangeSet,
    /// Frame size before any spill round; registers at or above it are
    /// treated as spill temporaries.
    pub initial_regs: u16,
}

impl<'a> MethodInput<'a> {
    /// Creates an input whose initial frame is the method's declared frame.
    #[must_use]
    pub fn new(
        method: &'a MethodBody,
        liveness: &'a (dyn Liveness + Sync),
        range_set: &'a RangeSet,
    ) -> Self {
        Self {
            method,
            liveness,
            range_set,
            initial_regs: method.registers_size(),
        }
    }

    /// Overrides the initial frame size.
    #[must_use]
    pub fn with_initial_regs(mut self, initial_regs: u16) -> Self {
        self.initial_regs = initial_regs;
        self
    }
}

/// The graph built for one method.
#[derive(Debug, Clone)]
pub struct MethodGraph {
    /// Name of the method.
    pub method: String,
    /// The populated graph, ready for a coloring driver.
    pub graph: InterferenceGraph,
    /// DOT rendering, if [`BuildConfig::record_dot`] was set.
    pub dot: Option<String>,
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Methods whose graph was built.
    pub methods_built: usize,
    /// Methods whose build failed.
    pub methods_failed: usize,
    /// Total nodes over all graphs.
    pub nodes: usize,
    /// Total interference edges.
    pub edges: usize,
    /// Total coalesceable edges.
    pub coalesceable_edges: usize,
    /// Total containment edges.
    pub containment_edges: usize,
    /// Total range liveness snapshots.
    pub range_snapshots: usize,
}

impl BuildStats {
    /// Adds the counts of one built graph.
    pub fn add_graph(&mut self, stats: &GraphStats) {
        self.methods_built += 1;
        self.nodes += stats.nodes;
        self.edges += stats.edges;
        self.coalesceable_edges += stats.coalesceable_edges;
        self.containment_edges += stats.containment_edges;
        self.range_snapshots += stats.range_snapshots;
    }

    /// Adds the counts of another batch.
    pub fn merge(&mut self, other: &BuildStats) {
        self.methods_built += other.methods_built;
        self.methods_failed += other.methods_failed;
        self.nodes += other.nodes;
        self.edges += other.edges;
        self.coalesceable_edges += other.coalesceable_edges;
        self.containment_edges += other.containment_edges;
        self.range_snapshots += other.range_snapshots;
    }
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} methods built, {} failed: {} nodes, {} edges ({} coalesceable), {} containment edges, {} range snapshots",
            self.methods_built,
            self.methods_failed,
            self.nodes,
            self.edges,
            self.coalesceable_edges,
            self.containment_edges,
            self.range_snapshots
        )
    }
}

/// Outcome of [`BuildSession::run`].
#[derive(Debug)]
pub struct BuildReport {
    /// Built graphs in input order.
    pub graphs: Vec<MethodGraph>,
    /// Methods that failed, in input order, with their method-tagged error.
    pub failures: Vec<(String, Error)>,
    /// Aggregate counts.
    pub stats: BuildStats,
    /// Wall time of the batch.
    pub elapsed: Duration,
}

impl BuildReport {
    /// Returns the graph built for `method`, if any.
    #[must_use]
    pub fn graph(&self, method: &str) -> Option<&InterferenceGraph> {
        self.graphs
            .iter()
            .find(|g| g.method == method)
            .map(|g| &g.graph)
    }
}

/// Builds interference graphs for batches of methods.
#[derive(Debug, Default)]
pub struct BuildSession {
    config: BuildConfig,
    events: EventLog,
}

impl BuildSession {
    /// Creates a session with the given configuration.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            events: EventLog::new(),
        }
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Returns everything logged so far.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Builds the graph of a single method.
    ///
    /// # Errors
    ///
    /// Returns the build error tagged with the method name, see
    /// [`Error::Method`].
    pub fn build_one(&self, input: &MethodInput<'_>) -> Result<MethodGraph> {
        let name = input.method.name();
        match GraphBuilder::build(
            input.method,
            input.initial_regs,
            input.range_set,
            input.liveness,
        ) {
            Ok(graph) => {
                let stats = graph.stats();
                self.events
                    .record(EventKind::GraphBuilt)
                    .method(name)
                    .message(format!(
                        "{} nodes, {} edges, {} containment edges",
                        stats.nodes, stats.edges, stats.containment_edges
                    ));
                let dot = self.config.record_dot.then(|| graph.to_dot(Some(name)));
                Ok(MethodGraph {
                    method: name.to_string(),
                    graph,
                    dot,
                })
            }
            Err(err) => {
                self.events
                    .record(EventKind::BuildFailed)
                    .method(name)
                    .message(err.to_string());
                Err(err.in_method(name))
            }
        }
    }

    /// Builds graphs for every input.
    ///
    /// Methods are distributed across rayon workers when the configuration
    /// allows it. In strict mode the first failing method, in input order,
    /// aborts the batch; otherwise failures are logged, collected and skipped.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first method-tagged build error.
    pub fn run(&self, inputs: &[MethodInput<'_>]) -> Result<BuildReport> {
        let start = Instant::now();
        let results: Vec<Result<MethodGraph>> = if self.config.runs_parallel(inputs.len()) {
            inputs.par_iter().map(|input| self.build_one(input)).collect()
        } else {
            inputs.iter().map(|input| self.build_one(input)).collect()
        };

        let mut graphs = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        let mut stats = BuildStats::default();
        for (input, result) in inputs.iter().zip(results) {
            match result {
                Ok(built) => {
                    stats.add_graph(&built.graph.stats());
                    graphs.push(built);
                }
                Err(err) if self.config.strict => return Err(err),
                Err(err) => {
                    let name = input.method.name().to_string();
                    self.events
                        .record(EventKind::MethodSkipped)
                        .method(name.as_str());
                    stats.methods_failed += 1;
                    failures.push((name, err));
                }
            }
        }

        if failures.is_empty() {
            self.events.info(format!("built {} graphs", graphs.len()));
        } else {
            self.events.warn(format!(
                "built {} graphs, skipped {} methods",
                graphs.len(),
                failures.len()
            ));
        }

        Ok(BuildReport {
            graphs,
            failures,
            stats,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Instruction, Opcode},
        regalloc::LivenessMap,
        test::{named_method, straight_line_liveness},
    };

    fn good_method(name: &str) -> MethodBody {
        named_method(
            name,
            2,
            vec![
                Instruction::new(Opcode::Const).dest(0u16).literal(1),
                Instruction::new(Opcode::Move).dest(1u16).src(0u16),
                Instruction::new(Opcode::Return).src(1u16),
            ],
        )
    }

    fn conflicting_method(name: &str) -> MethodBody {
        named_method(
            name,
            1,
            vec![
                Instruction::new(Opcode::NewInstance).dest(0u16),
                Instruction::new(Opcode::Sget).dest(0u16),
                Instruction::new(Opcode::Return).src(0u16),
            ],
        )
    }

    struct Fixture {
        methods: Vec<MethodBody>,
        liveness: Vec<LivenessMap>,
        range_set: RangeSet,
    }

    impl Fixture {
        fn new(methods: Vec<MethodBody>) -> Self {
            let liveness = methods.iter().map(straight_line_liveness).collect();
            Self {
                methods,
                liveness,
                range_set: RangeSet::new(),
            }
        }

        fn inputs(&self) -> Vec<MethodInput<'_>> {
            self.methods
                .iter()
                .zip(&self.liveness)
                .map(|(m, l)| MethodInput::new(m, l, &self.range_set))
                .collect()
        }
    }

    #[test]
    fn test_build_one_logs() {
        let fixture = Fixture::new(vec![good_method("a")]);
        let session = BuildSession::new(BuildConfig::new().with_dot(true));

        let built = session.build_one(&fixture.inputs()[0]).unwrap();
        assert_eq!(built.method, "a");
        assert!(built.dot.as_deref().is_some_and(|d| d.contains("label=\"a\"")));
        assert_eq!(session.events().count_kind(EventKind::GraphBuilt), 1);
    }

    #[test]
    fn test_strict_aborts_with_method_name() {
        let fixture = Fixture::new(vec![
            good_method("ok"),
            conflicting_method("bad"),
            conflicting_method("worse"),
        ]);
        let session = BuildSession::new(BuildConfig::new().with_parallel(false));

        let err = session.run(&fixture.inputs()).unwrap_err();
        assert_eq!(err.method(), Some("bad"));
        assert!(matches!(err.root(), Error::TypeConflict { .. }));
    }

    #[test]
    fn test_lenient_skips_failures() {
        let fixture = Fixture::new(vec![
            good_method("a"),
            conflicting_method("bad"),
            good_method("b"),
        ]);
        let session = BuildSession::new(BuildConfig::lenient().with_parallel(false));

        let report = session.run(&fixture.inputs()).unwrap();
        assert_eq!(
            report.graphs.iter().map(|g| g.method.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "bad");
        assert_eq!(report.stats.methods_built, 2);
        assert_eq!(report.stats.methods_failed, 1);
        assert!(report.graph("a").is_some());
        assert!(report.graph("bad").is_none());

        let events = session.events();
        assert_eq!(events.count_kind(EventKind::BuildFailed), 1);
        assert_eq!(events.count_kind(EventKind::MethodSkipped), 1);
        assert_eq!(events.filter_method("bad").count(), 2);
        assert_eq!(events.warnings().count(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let methods: Vec<_> = (0..32)
            .map(|i| {
                if i % 5 == 0 {
                    conflicting_method(&format!("m{i}"))
                } else {
                    good_method(&format!("m{i}"))
                }
            })
            .collect();
        let fixture = Fixture::new(methods);

        let parallel = BuildSession::new(BuildConfig::lenient().with_min_parallel_methods(2))
            .run(&fixture.inputs())
            .unwrap();
        let sequential = BuildSession::new(BuildConfig::lenient().with_parallel(false))
            .run(&fixture.inputs())
            .unwrap();

        assert_eq!(parallel.stats, sequential.stats);
        let names = |r: &BuildReport| r.graphs.iter().map(|g| g.method.clone()).collect::<Vec<_>>();
        assert_eq!(names(&parallel), names(&sequential));
        for (p, s) in parallel.graphs.iter().zip(&sequential.graphs) {
            assert_eq!(p.graph.to_dot(None), s.graph.to_dot(None));
        }
    }

    #[test]
    fn test_stats_display_and_merge() {
        let mut a = BuildStats {
            methods_built: 1,
            nodes: 2,
            edges: 1,
            coalesceable_edges: 1,
            ..BuildStats::default()
        };
        let b = a;
        a.merge(&b);
        assert_eq!(a.methods_built, 2);
        assert_eq!(
            a.to_string(),
            "2 methods built, 0 failed: 4 nodes, 2 edges (2 coalesceable), 0 containment edges, 0 range snapshots"
        );
    }
}
