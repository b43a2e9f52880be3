/// How records are distributed from an upstream processor's tasks to a
/// downstream processor's tasks. Carried along untouched during graph
/// surgery.
#[derive(Copy, Clone, Serialize, Deserialize, Debug, Eq, PartialEq, Hash)]
pub enum PartitionerDescription {
    /// one-to-one pipeline to the downstream task with the same index
    Forward,
    /// repartition by key hash across all downstream tasks
    HashShuffle,
    /// replicate every record to all downstream tasks
    Broadcast,
}

impl std::fmt::Display for PartitionerDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionerDescription::Forward => write!(f, "Forward"),
            PartitionerDescription::HashShuffle => write!(f, "HashShuffle"),
            PartitionerDescription::Broadcast => write!(f, "Broadcast"),
        }
    }
}
