use crate::synth::TaskType;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown task type '{0}'")]
    UnknownTaskType(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to generate a unique '{task_type}' task after {attempts} attempts")]
    UniquenessExhausted { task_type: TaskType, attempts: u32 },
}
