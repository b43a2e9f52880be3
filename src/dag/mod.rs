//! Versioned DAG model
//! submission graph -> version-0 snapshot -> replace_processor -> version n+1

use std::error::Error;

use crate::core::runtime::{DagVersion, ProcessorId};

pub mod graph;
pub mod metadata;
pub mod subscriber;
pub mod versioned_dag;

#[derive(Debug)]
pub enum DagError {
    ProcessorNotFound(ProcessorId),
    VersionNotFound(DagVersion),
    DuplicateProcessor(ProcessorId),
    ReplaceConflict(String),
}

impl Error for DagError {}

impl std::fmt::Display for DagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DagError::ProcessorNotFound(id) => write!(f, "ProcessorNotFound({})", id),
            DagError::VersionNotFound(version) => write!(f, "VersionNotFound({})", version),
            DagError::DuplicateProcessor(id) => write!(f, "DuplicateProcessor({})", id),
            DagError::ReplaceConflict(reason) => write!(f, "ReplaceConflict({})", reason),
        }
    }
}
