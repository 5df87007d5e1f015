/// Reasons a refresh cycle is abandoned. Both are confined to the firing that hit them.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CycleError {
    #[display("content store is unavailable: {_0}")]
    StoreUnavailable(#[error(not(source))] String),
    #[display("couldn't publish the announcement: {_0}")]
    PublishFailed(#[error(not(source))] String),
}

impl CycleError {
    pub fn store_unavailable(err: anyhow::Error) -> Self {
        Self::StoreUnavailable(format!("{err:#}"))
    }

    pub fn publish_failed(err: anyhow::Error) -> Self {
        Self::PublishFailed(format!("{err:#}"))
    }
}
