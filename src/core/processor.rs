use crate::core::runtime::{DagVersion, ProcessorId};

/// Half-open interval `[birth, death)` of dag versions during which a
/// processor is the active instance for its position. `death == None` means
/// the processor is still alive.
#[derive(Copy, Clone, Serialize, Deserialize, Debug, Eq, PartialEq, Hash)]
pub struct LifeTime {
    birth: DagVersion,
    death: Option<DagVersion>,
}

impl LifeTime {
    pub fn immortal(birth: DagVersion) -> Self {
        LifeTime { birth, death: None }
    }

    pub fn new(birth: DagVersion, death: DagVersion) -> Self {
        assert!(
            birth <= death,
            "LifeTime birth {} after death {}",
            birth,
            death
        );
        LifeTime {
            birth,
            death: Some(death),
        }
    }

    pub fn birth(&self) -> DagVersion {
        self.birth
    }

    pub fn death(&self) -> Option<DagVersion> {
        self.death
    }

    /// Same birth, bounded at `death`.
    pub fn ended_at(&self, death: DagVersion) -> LifeTime {
        LifeTime::new(self.birth, death)
    }

    pub fn is_alive_at(&self, version: DagVersion) -> bool {
        version >= self.birth && self.death.map(|death| version < death).unwrap_or(true)
    }
}

/// Immutable description of one logical processing stage. Replacement never
/// mutates a description, it produces a new value with a new id while the
/// retiring one gets a bounded [`LifeTime`].
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ProcessorDescription {
    id: ProcessorId,
    operator_name: String,
    parallelism: u32,
    life: LifeTime,
}

impl ProcessorDescription {
    pub fn new(id: ProcessorId, operator_name: &str, parallelism: u32, life: LifeTime) -> Self {
        ProcessorDescription {
            id,
            operator_name: operator_name.to_string(),
            parallelism,
            life,
        }
    }

    pub fn id(&self) -> ProcessorId {
        self.id
    }

    pub fn operator_name(&self) -> &str {
        self.operator_name.as_str()
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn life(&self) -> LifeTime {
        self.life
    }

    pub(crate) fn with_id(mut self, id: ProcessorId) -> Self {
        self.id = id;
        self
    }

    pub(crate) fn retire(&self, death: DagVersion) -> Self {
        let mut retired = self.clone();
        retired.life = self.life.ended_at(death);
        retired
    }
}

#[cfg(test)]
mod tests {
    use crate::core::processor::LifeTime;
    use crate::core::runtime::DagVersion;

    #[test]
    pub fn life_time_bounds() {
        let life = LifeTime::immortal(DagVersion(3));
        assert!(!life.is_alive_at(DagVersion(2)));
        assert!(life.is_alive_at(DagVersion(3)));
        assert!(life.is_alive_at(DagVersion(100)));

        let ended = life.ended_at(DagVersion(5));
        assert_eq!(ended.birth(), DagVersion(3));
        assert_eq!(ended.death(), Some(DagVersion(5)));
        assert!(ended.is_alive_at(DagVersion(4)));
        assert!(!ended.is_alive_at(DagVersion(5)));
    }
}
