use crate::{
    display::DisplayError, engine::EngineError, indication::IndicationError,
    viewport::ViewportError,
};

pub type ViewResult<T> = Result<T, ViewError>;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("indication error: {0}")]
    Indication(#[from] IndicationError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    #[error("editing engine error: {0}")]
    Engine(#[from] EngineError),
}
