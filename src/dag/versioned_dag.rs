use std::collections::HashMap;

use daggy::Dag;

use crate::core::partitioner::PartitionerDescription;
use crate::core::processor::ProcessorDescription;
use crate::core::runtime::{DagVersion, ProcessorId};
use crate::dag::graph;
use crate::dag::DagError;

/// Immutable snapshot of the logical execution graph at one version.
///
/// A snapshot is built once from the submission topology (version 0) and
/// thereafter only derived from a prior snapshot by [`replace_processor`].
/// Graph vertices and processor-map keys correspond exactly.
///
/// [`replace_processor`]: VersionedDag::replace_processor
#[derive(Clone, Debug)]
pub struct VersionedDag {
    version: DagVersion,
    processors: HashMap<ProcessorId, ProcessorDescription>,
    graph: Dag<ProcessorId, PartitionerDescription>,
}

impl VersionedDag {
    /// Version-0 snapshot from the job-submission topology.
    pub fn from_graph(
        topology: &Dag<ProcessorDescription, PartitionerDescription>,
    ) -> Result<Self, DagError> {
        Self::with_version(DagVersion::default(), topology)
    }

    pub fn with_version(
        version: DagVersion,
        topology: &Dag<ProcessorDescription, PartitionerDescription>,
    ) -> Result<Self, DagError> {
        let mut processors = HashMap::new();
        let mut graph = Dag::new();

        // re-add in index order so edge endpoints carry over as is
        for node in topology.raw_nodes() {
            let description = node.weight.clone();
            let processor_id = description.id();
            if processors.insert(processor_id, description).is_some() {
                return Err(DagError::DuplicateProcessor(processor_id));
            }
            graph.add_node(processor_id);
        }
        for edge in topology.raw_edges() {
            graph
                .add_edge(edge.source(), edge.target(), edge.weight)
                .unwrap();
        }

        Ok(VersionedDag {
            version,
            processors,
            graph,
        })
    }

    pub fn version(&self) -> DagVersion {
        self.version
    }

    pub fn processors(&self) -> &HashMap<ProcessorId, ProcessorDescription> {
        &self.processors
    }

    pub fn processor(&self, processor_id: ProcessorId) -> Option<&ProcessorDescription> {
        self.processors.get(&processor_id)
    }

    pub fn graph(&self) -> &Dag<ProcessorId, PartitionerDescription> {
        &self.graph
    }

    /// Next snapshot with `new_processor` taking over the retiring
    /// processor's position in the topology.
    ///
    /// The retiring processor keeps its birth and dies at the replacement's
    /// birth; it stays in the snapshot with its edges so that downstream
    /// consumers still draining its output can resolve it. The replacement
    /// occupies copies of exactly the retiring vertex's edges. Everything
    /// else is untouched.
    pub fn replace_processor(
        &self,
        old_processor_id: ProcessorId,
        new_processor: ProcessorDescription,
    ) -> Result<VersionedDag, DagError> {
        let retiring = self
            .processors
            .get(&old_processor_id)
            .ok_or(DagError::ProcessorNotFound(old_processor_id))?;

        let mut processors = self.processors.clone();
        processors.insert(
            old_processor_id,
            retiring.retire(new_processor.life().birth()),
        );
        processors.insert(new_processor.id(), new_processor.clone());

        let patch = graph::replace_vertex(
            &graph::sub_graph(&self.graph, &old_processor_id),
            &old_processor_id,
            &new_processor.id(),
        );
        let graph = graph::union(&self.graph, &patch);

        Ok(VersionedDag {
            version: self.version.next(),
            processors,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Index;

    use daggy::Dag;

    use crate::core::partitioner::PartitionerDescription;
    use crate::core::processor::{LifeTime, ProcessorDescription};
    use crate::core::runtime::{DagVersion, ProcessorId};
    use crate::dag::versioned_dag::VersionedDag;
    use crate::dag::DagError;

    fn processor(id: u32, operator_name: &str) -> ProcessorDescription {
        ProcessorDescription::new(
            ProcessorId(id),
            operator_name,
            2,
            LifeTime::immortal(DagVersion(0)),
        )
    }

    /// source(1) -> map(2) -> sink(3)
    fn topology() -> Dag<ProcessorDescription, PartitionerDescription> {
        let mut topology = Dag::new();
        let source = topology.add_node(processor(1, "source"));
        let map = topology.add_node(processor(2, "map"));
        let sink = topology.add_node(processor(3, "sink"));
        topology
            .add_edge(source, map, PartitionerDescription::HashShuffle)
            .unwrap();
        topology
            .add_edge(map, sink, PartitionerDescription::Forward)
            .unwrap();
        topology
    }

    fn edge_set(dag: &VersionedDag) -> Vec<(u32, u32, PartitionerDescription)> {
        let graph = dag.graph();
        graph
            .raw_edges()
            .iter()
            .map(|edge| {
                (
                    graph.index(edge.source()).0,
                    graph.index(edge.target()).0,
                    edge.weight,
                )
            })
            .collect()
    }

    #[test]
    pub fn from_graph_builds_version_zero() {
        let dag = VersionedDag::from_graph(&topology()).unwrap();

        assert_eq!(dag.version(), DagVersion(0));
        assert_eq!(dag.processors().len(), 3);
        assert_eq!(dag.graph().node_count(), 3);
        assert_eq!(
            edge_set(&dag),
            vec![
                (1, 2, PartitionerDescription::HashShuffle),
                (2, 3, PartitionerDescription::Forward)
            ]
        );
    }

    #[test]
    pub fn duplicate_processor_is_rejected() {
        let mut topology = topology();
        topology.add_node(processor(2, "map-again"));

        match VersionedDag::from_graph(&topology) {
            Err(DagError::DuplicateProcessor(id)) => assert_eq!(id, ProcessorId(2)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    pub fn replace_bumps_version_and_bounds_life() {
        let dag = VersionedDag::from_graph(&topology()).unwrap();
        let replacement = ProcessorDescription::new(
            ProcessorId(4),
            "map-v2",
            4,
            LifeTime::immortal(DagVersion(1)),
        );

        let next = dag.replace_processor(ProcessorId(2), replacement.clone()).unwrap();

        assert_eq!(next.version(), DagVersion(1));
        assert_eq!(next.processors().len(), 4);

        let retired = next.processor(ProcessorId(2)).unwrap();
        assert_eq!(retired.life().birth(), DagVersion(0));
        assert_eq!(retired.life().death(), Some(DagVersion(1)));

        assert_eq!(next.processor(ProcessorId(4)), Some(&replacement));
    }

    #[test]
    pub fn replace_grafts_replacement_onto_old_edges() {
        let dag = VersionedDag::from_graph(&topology()).unwrap();
        let replacement = ProcessorDescription::new(
            ProcessorId(4),
            "map-v2",
            4,
            LifeTime::immortal(DagVersion(1)),
        );

        let next = dag.replace_processor(ProcessorId(2), replacement).unwrap();

        assert_eq!(next.graph().node_count(), 4);
        assert_eq!(
            edge_set(&next),
            vec![
                (1, 2, PartitionerDescription::HashShuffle),
                (2, 3, PartitionerDescription::Forward),
                (1, 4, PartitionerDescription::HashShuffle),
                (4, 3, PartitionerDescription::Forward)
            ]
        );
    }

    #[test]
    pub fn replace_does_not_mutate_the_prior_snapshot() {
        let dag = VersionedDag::from_graph(&topology()).unwrap();
        let replacement = ProcessorDescription::new(
            ProcessorId(4),
            "map-v2",
            4,
            LifeTime::immortal(DagVersion(1)),
        );

        dag.replace_processor(ProcessorId(2), replacement).unwrap();

        assert_eq!(dag.version(), DagVersion(0));
        assert_eq!(dag.processors().len(), 3);
        assert_eq!(dag.graph().edge_count(), 2);
        assert_eq!(
            dag.processor(ProcessorId(2)).unwrap().life().death(),
            None
        );
    }

    #[test]
    pub fn replace_unknown_processor_is_rejected() {
        let dag = VersionedDag::from_graph(&topology()).unwrap();
        let replacement = ProcessorDescription::new(
            ProcessorId(4),
            "map-v2",
            4,
            LifeTime::immortal(DagVersion(1)),
        );

        match dag.replace_processor(ProcessorId(9), replacement) {
            Err(DagError::ProcessorNotFound(id)) => assert_eq!(id, ProcessorId(9)),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
