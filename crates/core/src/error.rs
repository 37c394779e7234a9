use thiserror::Error;

use crate::model::QuestionError;
use crate::model::SessionRecordError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionRecordError),
}
