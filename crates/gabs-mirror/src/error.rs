use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error(transparent)]
    Gp(#[from] gabs_gp_client::GpClientError),
}
