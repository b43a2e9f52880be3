use std::ops::Index;

use crate::core::partitioner::PartitionerDescription;
use crate::core::processor::{LifeTime, ProcessorDescription};
use crate::core::runtime::ProcessorId;
use crate::dag::graph;
use crate::dag::versioned_dag::VersionedDag;
use crate::dag::DagError;

/// One downstream consumer of an upstream processor: which processor
/// subscribes, through which partitioner, at which parallelism.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Subscriber {
    processor_id: ProcessorId,
    partitioner: PartitionerDescription,
    parallelism: u32,
    life: LifeTime,
}

impl Subscriber {
    pub fn processor_id(&self) -> ProcessorId {
        self.processor_id
    }

    pub fn partitioner(&self) -> PartitionerDescription {
        self.partitioner
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn life(&self) -> LifeTime {
        self.life
    }
}

/// Downstream consumers of `processor_id`, in the graph's edge order. The
/// order is deterministic, it decides task wiring.
pub fn subscribers(dag: &VersionedDag, processor_id: ProcessorId) -> Vec<Subscriber> {
    let graph = dag.graph();
    let source_index = match graph::find_vertex(graph, &processor_id) {
        Some(node_index) => node_index,
        None => return Vec::new(),
    };

    graph
        .raw_edges()
        .iter()
        .filter(|edge| edge.source() == source_index)
        .map(|edge| {
            let downstream_id = *graph.index(edge.target());
            let downstream = dag
                .processor(downstream_id)
                .expect("graph vertex without processor entry");

            Subscriber {
                processor_id: downstream_id,
                partitioner: edge.weight,
                parallelism: downstream.parallelism(),
                life: downstream.life(),
            }
        })
        .collect()
}

/// Everything a worker needs to instantiate and wire one task of a
/// processor. Derived fresh per request, never cached.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct TaskLaunchData {
    processor: ProcessorDescription,
    subscribers: Vec<Subscriber>,
    context: serde_json::Value,
}

impl TaskLaunchData {
    pub fn derive(
        dag: &VersionedDag,
        processor_id: ProcessorId,
        context: serde_json::Value,
    ) -> Result<TaskLaunchData, DagError> {
        let processor = dag
            .processor(processor_id)
            .ok_or(DagError::ProcessorNotFound(processor_id))?
            .clone();
        let subscribers = subscribers(dag, processor_id);

        Ok(TaskLaunchData {
            processor,
            subscribers,
            context,
        })
    }

    pub fn processor(&self) -> &ProcessorDescription {
        &self.processor
    }

    pub fn subscribers(&self) -> &Vec<Subscriber> {
        &self.subscribers
    }

    pub fn context(&self) -> &serde_json::Value {
        &self.context
    }
}
