use serde::{Deserialize, Serialize};

/// Name used by the placeholder data source.
pub const NO_DATA_SOURCE_NAME: &str = "No Data Source";
/// Type used by the placeholder data source.
pub const NO_DATA_SOURCE_TYPE: &str = "None";

/// An upstream data source of a dataset or a dataflow.
///
/// `connection_details` holds the compact JSON of the source's connection
/// details object as returned by the tenant API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub connection_details: Option<String>,
}

impl DataSource {
    /// The placeholder emitted for an entity that has no data sources.
    #[must_use]
    pub fn none() -> Self {
        Self {
            name: NO_DATA_SOURCE_NAME.to_string(),
            kind: NO_DATA_SOURCE_TYPE.to_string(),
            connection_details: None,
        }
    }

    /// Whether this is the placeholder rather than a real source.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.name == NO_DATA_SOURCE_NAME && self.kind == NO_DATA_SOURCE_TYPE
    }

    /// Substitute the placeholder when `sources` is empty.
    #[must_use]
    pub fn or_placeholder(sources: Vec<Self>) -> Vec<Self> {
        if sources.is_empty() {
            vec![Self::none()]
        } else {
            sources
        }
    }
}
