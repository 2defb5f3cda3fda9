use crate::calendar::WorkDayMask;
use crate::persistence::PersistenceResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Organization settings the engine depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub work_days: WorkDayMask,
    /// Person notified of absence changes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

impl Configuration {
    pub fn new(work_days: WorkDayMask) -> Self {
        Self {
            work_days,
            referrer: None,
        }
    }
}

pub fn load_configuration_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Configuration> {
    let file = File::open(path)?;
    let configuration = serde_json::from_reader(file)?;
    Ok(configuration)
}

pub fn save_configuration_to_json<P: AsRef<Path>>(
    configuration: &Configuration,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, configuration)?;
    Ok(())
}
