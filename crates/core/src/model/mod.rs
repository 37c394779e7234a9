mod progress;
mod question;
mod session;

pub use progress::{
    Badge, MAX_GEMS, MAX_SESSION_HISTORY, STARTING_GEMS, StudentProgress, StudyGoals, TopicScore,
};
pub use question::{Difficulty, Question, QuestionError, QuestionId, Subject};
pub use session::{Session, SessionId, SessionRecordError};
