//! Output artifact locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_topology_csv() -> String {
    "topology.csv".to_string()
}

fn default_index_json() -> String {
    "workspace_datasets.json".to_string()
}

fn default_partitions_csv() -> String {
    "partitions.csv".to_string()
}

fn default_error_log() -> String {
    "errors.log".to_string()
}

fn default_error_detail_log() -> String {
    "errors.detail.jsonl".to_string()
}

fn default_checkpoint() -> String {
    "checkpoint.json".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory all artifacts are written to.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_topology_csv")]
    pub topology_csv: String,

    #[serde(default = "default_index_json")]
    pub index_json: String,

    #[serde(default = "default_partitions_csv")]
    pub partitions_csv: String,

    /// One line per error.
    #[serde(default = "default_error_log")]
    pub error_log: String,

    /// Full error detail, one JSON record per error.
    #[serde(default = "default_error_detail_log")]
    pub error_detail_log: String,

    #[serde(default = "default_checkpoint")]
    pub checkpoint: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            topology_csv: default_topology_csv(),
            index_json: default_index_json(),
            partitions_csv: default_partitions_csv(),
            error_log: default_error_log(),
            error_detail_log: default_error_detail_log(),
            checkpoint: default_checkpoint(),
        }
    }
}

impl OutputConfig {
    pub fn topology_csv_path(&self) -> PathBuf {
        self.dir.join(&self.topology_csv)
    }

    pub fn index_json_path(&self) -> PathBuf {
        self.dir.join(&self.index_json)
    }

    pub fn partitions_csv_path(&self) -> PathBuf {
        self.dir.join(&self.partitions_csv)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.dir.join(&self.error_log)
    }

    pub fn error_detail_log_path(&self) -> PathBuf {
        self.dir.join(&self.error_detail_log)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.dir.join(&self.checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_output_dir() {
        let config = OutputConfig {
            dir: PathBuf::from("/tmp/audit"),
            ..Default::default()
        };
        assert_eq!(
            config.topology_csv_path(),
            PathBuf::from("/tmp/audit/topology.csv")
        );
        assert_eq!(
            config.error_detail_log_path(),
            PathBuf::from("/tmp/audit/errors.detail.jsonl")
        );
        assert_eq!(
            config.checkpoint_path(),
            PathBuf::from("/tmp/audit/checkpoint.json")
        );
    }
}
