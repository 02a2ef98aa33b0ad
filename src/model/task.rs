use super::{Alignment, Parameters, TaskType};
use serde::{Deserialize, Serialize};

/// One step of a print job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,

    #[serde(rename = "type", default)]
    pub kind: TaskType,

    #[serde(
        rename = "Param",
        alias = "param",
        alias = "PARAM",
        default,
        skip_serializing_if = "Parameters::is_empty"
    )]
    pub param: Parameters,
}

impl Task {
    pub fn new(kind: TaskType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// A `string` task printing `data`
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.param.alignment = Some(alignment);
        self
    }
}
