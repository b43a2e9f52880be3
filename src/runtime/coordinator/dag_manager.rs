use anyhow::anyhow;
use daggy::Dag;

use crate::channel::{bounded, reply, OneshotSender, Receiver, Sender, TrySendError};
use crate::core::partitioner::PartitionerDescription;
use crate::core::processor::ProcessorDescription;
use crate::core::runtime::{DagVersion, ProcessorId};
use crate::dag::metadata::DagMetadata;
use crate::dag::subscriber::TaskLaunchData;
use crate::dag::versioned_dag::VersionedDag;
use crate::dag::DagError;

const COMMAND_CHANNEL_SIZE: usize = 100;

/// Push notification carrying the newest dag snapshot.
#[derive(Clone, Debug)]
pub struct LatestDag(pub VersionedDag);

#[derive(Debug)]
pub enum DagCommand {
    LatestDag {
        reply: OneshotSender<VersionedDag>,
    },
    TaskLaunchData {
        version: DagVersion,
        processor_id: ProcessorId,
        context: serde_json::Value,
        reply: OneshotSender<Result<TaskLaunchData, DagError>>,
    },
    ReplaceProcessor {
        old_processor_id: ProcessorId,
        new_processor: ProcessorDescription,
        reply: OneshotSender<Result<DagVersion, DagError>>,
    },
    WatchChange {
        watcher: Sender<LatestDag>,
    },
    DagDeployed {
        version: DagVersion,
    },
}

/// Owner of the dag version history.
///
/// At most the stable snapshot plus one undeployed snapshot are retained at
/// any time; a replace request arriving while one is undeployed is rejected
/// and the caller retries after deployment is confirmed. All state
/// transitions run inside [`serve`], one command at a time, which is what
/// makes the conflict check and the version append atomic.
///
/// [`serve`]: DagManager::serve
pub struct DagManager {
    /// retained snapshots, oldest first
    dags: Vec<VersionedDag>,
    watchers: Vec<Sender<LatestDag>>,
    /// highest processor id ever allocated, ids are never reused
    max_processor_id: u32,
}

impl DagManager {
    pub fn new(initial: VersionedDag) -> Self {
        let max_processor_id = initial
            .processors()
            .keys()
            .map(|processor_id| processor_id.0)
            .max()
            .unwrap_or(0);

        DagManager {
            dags: vec![initial],
            watchers: Vec::new(),
            max_processor_id,
        }
    }

    pub fn from_graph(
        topology: &Dag<ProcessorDescription, PartitionerDescription>,
    ) -> Result<Self, DagError> {
        Ok(Self::new(VersionedDag::from_graph(topology)?))
    }

    /// Spawn the serialized command loop and return the client handle.
    pub fn start(self) -> DagManagerHandle {
        let (sender, receiver) = bounded(COMMAND_CHANNEL_SIZE);
        tokio::spawn(self.serve(receiver));

        DagManagerHandle { sender }
    }

    /// Drain commands to completion, one at a time. No other code path
    /// touches the manager state.
    pub async fn serve(mut self, mut receiver: Receiver<DagCommand>) {
        info!(
            "dag manager started at dag version {}",
            self.latest_dag().version()
        );

        while let Some(command) = receiver.recv().await {
            self.handle(command);
        }

        debug!("dag manager command channel closed");
    }

    fn handle(&mut self, command: DagCommand) {
        match command {
            DagCommand::LatestDag { reply } => {
                let _ = reply.send(self.latest_dag().clone());
            }
            DagCommand::TaskLaunchData {
                version,
                processor_id,
                context,
                reply,
            } => {
                let _ = reply.send(self.task_launch_data(version, processor_id, context));
            }
            DagCommand::ReplaceProcessor {
                old_processor_id,
                new_processor,
                reply,
            } => {
                let _ = reply.send(self.replace_processor(old_processor_id, new_processor));
            }
            DagCommand::WatchChange { watcher } => self.watch_change(watcher),
            DagCommand::DagDeployed { version } => self.dag_deployed(version),
        }
    }

    pub fn latest_dag(&self) -> &VersionedDag {
        self.dags.last().unwrap()
    }

    pub fn retained_versions(&self) -> Vec<DagVersion> {
        self.dags.iter().map(|dag| dag.version()).collect()
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    pub fn task_launch_data(
        &self,
        version: DagVersion,
        processor_id: ProcessorId,
        context: serde_json::Value,
    ) -> Result<TaskLaunchData, DagError> {
        let dag = self
            .dags
            .iter()
            .find(|dag| dag.version() == version)
            .ok_or(DagError::VersionNotFound(version))?;

        TaskLaunchData::derive(dag, processor_id, context)
    }

    pub fn replace_processor(
        &mut self,
        old_processor_id: ProcessorId,
        new_processor: ProcessorDescription,
    ) -> Result<DagVersion, DagError> {
        if self.dags.len() > 1 {
            let pending = self.latest_dag().version();
            warn!(
                "replace of processor {} rejected, dag version {} is not deployed",
                old_processor_id, pending
            );
            return Err(DagError::ReplaceConflict(format!(
                "dag version {} is not deployed, retry after deployment is confirmed",
                pending
            )));
        }

        // commit the allocation only if the surgery succeeds
        let allocated = ProcessorId(self.max_processor_id + 1);
        let new_dag = self
            .latest_dag()
            .replace_processor(old_processor_id, new_processor.with_id(allocated))?;
        self.max_processor_id = allocated.0;

        let version = new_dag.version();
        info!(
            "processor {} replaced by {} in dag version {}",
            old_processor_id, allocated, version
        );
        debug!(
            "dag version {} metadata: {}",
            version,
            DagMetadata::from(&new_dag).to_string()
        );

        self.dags.push(new_dag);
        self.notify_watchers();

        Ok(version)
    }

    /// Idempotent, re-registering a known watcher handle is a no-op.
    pub fn watch_change(&mut self, watcher: Sender<LatestDag>) {
        if self.watchers.iter().any(|w| w.same_channel(&watcher)) {
            return;
        }
        self.watchers.push(watcher);
    }

    /// Confirms `version` is fully rolled out and retires every older
    /// snapshot. The latest snapshot always survives.
    pub fn dag_deployed(&mut self, version: DagVersion) {
        let latest_version = self.latest_dag().version();
        self.dags
            .retain(|dag| dag.version() >= version || dag.version() == latest_version);

        debug!(
            "dag version {} deployed, retained versions {:?}",
            version,
            self.retained_versions()
        );
    }

    /// At-most-once delivery attempt per watcher, closed watchers are
    /// deregistered.
    fn notify_watchers(&mut self) {
        let latest = self.dags.last().unwrap().clone();

        self.watchers
            .retain(|watcher| match watcher.try_send(LatestDag(latest.clone())) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "watcher channel full, dag version {} notification dropped",
                        latest.version()
                    );
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("watcher channel closed, watcher deregistered");
                    false
                }
            });
    }
}

/// Cloneable client of a running [`DagManager`] loop.
#[derive(Clone, Debug)]
pub struct DagManagerHandle {
    sender: Sender<DagCommand>,
}

impl DagManagerHandle {
    pub async fn latest_dag(&self) -> anyhow::Result<VersionedDag> {
        let (reply_sender, reply_receiver) = reply();
        self.sender
            .send(DagCommand::LatestDag {
                reply: reply_sender,
            })
            .await
            .map_err(|_| anyhow!("dag manager is gone"))?;

        reply_receiver
            .await
            .map_err(|_| anyhow!("dag manager dropped the reply"))
    }

    pub async fn task_launch_data(
        &self,
        version: DagVersion,
        processor_id: ProcessorId,
        context: serde_json::Value,
    ) -> anyhow::Result<TaskLaunchData> {
        let (reply_sender, reply_receiver) = reply();
        self.sender
            .send(DagCommand::TaskLaunchData {
                version,
                processor_id,
                context,
                reply: reply_sender,
            })
            .await
            .map_err(|_| anyhow!("dag manager is gone"))?;

        let launch_data = reply_receiver
            .await
            .map_err(|_| anyhow!("dag manager dropped the reply"))??;
        Ok(launch_data)
    }

    pub async fn replace_processor(
        &self,
        old_processor_id: ProcessorId,
        new_processor: ProcessorDescription,
    ) -> anyhow::Result<DagVersion> {
        let (reply_sender, reply_receiver) = reply();
        self.sender
            .send(DagCommand::ReplaceProcessor {
                old_processor_id,
                new_processor,
                reply: reply_sender,
            })
            .await
            .map_err(|_| anyhow!("dag manager is gone"))?;

        let version = reply_receiver
            .await
            .map_err(|_| anyhow!("dag manager dropped the reply"))??;
        Ok(version)
    }

    /// Fire-and-forget registration for [`LatestDag`] push notifications.
    pub async fn watch_change(&self, watcher: Sender<LatestDag>) -> anyhow::Result<()> {
        self.sender
            .send(DagCommand::WatchChange { watcher })
            .await
            .map_err(|_| anyhow!("dag manager is gone"))
    }

    /// Register a fresh watcher channel and return its receiving end.
    pub async fn watch(&self, capacity: usize) -> anyhow::Result<Receiver<LatestDag>> {
        let (watcher, notifications) = bounded(capacity);
        self.watch_change(watcher).await?;
        Ok(notifications)
    }

    /// Fire-and-forget deployment confirmation.
    pub async fn dag_deployed(&self, version: DagVersion) -> anyhow::Result<()> {
        self.sender
            .send(DagCommand::DagDeployed { version })
            .await
            .map_err(|_| anyhow!("dag manager is gone"))
    }
}
