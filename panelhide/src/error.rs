#[derive(Debug, thiserror::Error)]
pub enum PanelHideError {
    #[error("pressure barrier could not be created: {0}")]
    BarrierCreateFailed(String),
    #[error("unknown setting {0}")]
    UnknownSetting(String),
    #[error("invalid value {value:?} for setting {key}")]
    InvalidSettingValue { key: &'static str, value: String },
    #[error("Event Loop Error")]
    EventLoopInsertFailed(#[from] calloop::Error),
}
