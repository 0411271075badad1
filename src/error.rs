use thiserror::Error;

/// Failures of the data backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Stage {0} is outside 1..=8")]
    InvalidStage(i32),

    #[error("Stage {submitted} is not the team's current stage ({current})")]
    StageOutOfTurn { current: i32, submitted: i32 },

    #[error("Team has already completed every stage")]
    AlreadyCompleted,
}
