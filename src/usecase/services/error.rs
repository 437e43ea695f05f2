use crate::domain::entities::finance::DraftError;
use crate::usecase::ports::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Invalid(#[from] DraftError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ServiceError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Api(err) if err.is_unauthorized())
    }
}
