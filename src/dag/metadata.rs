//! Serializable view of a dag snapshot, for logging and inspection.

use daggy::Dag;

use crate::core::partitioner::PartitionerDescription;
use crate::core::processor::ProcessorDescription;
use crate::core::runtime::{DagVersion, ProcessorId};
use crate::dag::versioned_dag::VersionedDag;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct JsonNode<N> {
    id: String,
    detail: N,
}

impl<N> JsonNode<N> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn detail(&self) -> &N {
        &self.detail
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct JsonEdge<E> {
    /// source JsonNode id
    source: String,
    /// target JsonNode id
    target: String,
    detail: E,
}

impl<E> JsonEdge<E> {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn detail(&self) -> &E {
        &self.detail
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct JsonDag<N, E> {
    nodes: Vec<JsonNode<N>>,
    edges: Vec<JsonEdge<E>>,
}

impl<'a, N, E> From<&'a Dag<N, E>> for JsonDag<N, E>
where
    N: Clone,
    E: Clone,
{
    fn from(dag: &'a Dag<N, E>) -> Self {
        let nodes = dag
            .raw_nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| JsonNode {
                id: index.to_string(),
                detail: node.weight.clone(),
            })
            .collect();

        let edges = dag
            .raw_edges()
            .iter()
            .map(|edge| JsonEdge {
                source: edge.source().index().to_string(),
                target: edge.target().index().to_string(),
                detail: edge.weight.clone(),
            })
            .collect();

        JsonDag { nodes, edges }
    }
}

impl<N, E> JsonDag<N, E> {
    pub fn nodes(&self) -> &Vec<JsonNode<N>> {
        &self.nodes
    }

    pub fn edges(&self) -> &Vec<JsonEdge<E>> {
        &self.edges
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DagMetadata {
    version: DagVersion,
    processors: Vec<ProcessorDescription>,
    graph: JsonDag<ProcessorId, PartitionerDescription>,
}

impl<'a> From<&'a VersionedDag> for DagMetadata {
    fn from(dag: &'a VersionedDag) -> Self {
        let mut processors: Vec<ProcessorDescription> =
            dag.processors().values().cloned().collect();
        processors.sort_by_key(|processor| processor.id());

        DagMetadata {
            version: dag.version(),
            processors,
            graph: JsonDag::from(dag.graph()),
        }
    }
}

impl DagMetadata {
    pub fn version(&self) -> DagVersion {
        self.version
    }

    pub fn processors(&self) -> &Vec<ProcessorDescription> {
        &self.processors
    }

    pub fn graph(&self) -> &JsonDag<ProcessorId, PartitionerDescription> {
        &self.graph
    }

    pub fn to_string(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use daggy::Dag;

    use crate::core::partitioner::PartitionerDescription;
    use crate::core::processor::{LifeTime, ProcessorDescription};
    use crate::core::runtime::{DagVersion, ProcessorId};
    use crate::dag::metadata::DagMetadata;
    use crate::dag::versioned_dag::VersionedDag;

    #[test]
    pub fn metadata_round_trips_through_json() {
        let mut topology = Dag::new();
        let source = topology.add_node(ProcessorDescription::new(
            ProcessorId(1),
            "source",
            2,
            LifeTime::immortal(DagVersion(0)),
        ));
        let sink = topology.add_node(ProcessorDescription::new(
            ProcessorId(2),
            "sink",
            2,
            LifeTime::immortal(DagVersion(0)),
        ));
        topology
            .add_edge(source, sink, PartitionerDescription::Forward)
            .unwrap();
        let dag = VersionedDag::from_graph(&topology).unwrap();

        let json = DagMetadata::from(&dag).to_string();
        let metadata: DagMetadata = serde_json::from_str(json.as_str()).unwrap();

        assert_eq!(metadata.version(), DagVersion(0));
        assert_eq!(metadata.processors().len(), 2);
        assert_eq!(metadata.graph().nodes().len(), 2);
        assert_eq!(metadata.graph().edges().len(), 1);
        assert_eq!(metadata.graph().edges()[0].source(), "0");
        assert_eq!(metadata.graph().edges()[0].target(), "1");
    }
}
