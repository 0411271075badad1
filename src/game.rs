use crate::model::{STAGE_COUNT, TeamIdentity};

/// Outcome of checking a submitted answer against a stage's solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Empty,
    Incorrect,
    Correct,
}

impl Verdict {
    /// Inline message shown under the answer field, if any.
    pub fn message(self) -> Option<&'static str> {
        match self {
            Verdict::Empty => Some("Please enter a solution"),
            Verdict::Incorrect => Some("Incorrect solution. Try again!"),
            Verdict::Correct => None,
        }
    }
}

/// Trimmed, case-insensitive exact comparison. No fuzzy matching.
pub fn answers_match(answer: &str, solution: &str) -> bool {
    answer.trim().to_lowercase() == solution.trim().to_lowercase()
}

pub fn judge(answer: &str, solution: &str) -> Verdict {
    if answer.trim().is_empty() {
        Verdict::Empty
    } else if answers_match(answer, solution) {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

/// Where a team goes after clearing a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next(i32),
    Finished,
}

pub fn advance_from(stage_number: i32) -> Advance {
    if stage_number >= STAGE_COUNT {
        Advance::Finished
    } else {
        Advance::Next(stage_number + 1)
    }
}

pub fn is_valid_stage(stage_number: i32) -> bool {
    (1..=STAGE_COUNT).contains(&stage_number)
}

/// State of one dot in the eight-stage progress strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Done,
    Current,
    Locked,
}

impl DotState {
    pub fn class(self) -> &'static str {
        match self {
            DotState::Done => "stage-dot done",
            DotState::Current => "stage-dot current",
            DotState::Locked => "stage-dot locked",
        }
    }
}

pub fn dot_state(dot: i32, current_stage: i32, completed: bool) -> DotState {
    if completed || dot < current_stage {
        DotState::Done
    } else if dot == current_stage {
        DotState::Current
    } else {
        DotState::Locked
    }
}

pub fn progress_dots(current_stage: i32, completed: bool) -> Vec<(i32, DotState)> {
    (1..=STAGE_COUNT)
        .map(|n| (n, dot_state(n, current_stage, completed)))
        .collect()
}

pub fn progress_caption(current_stage: i32, completed: bool) -> String {
    if completed {
        "Completed All Stages!".to_string()
    } else {
        format!("Currently at Stage {}", current_stage)
    }
}

/// Screen a logged-in team belongs on.
pub fn team_landing(team: &TeamIdentity) -> &'static str {
    if team.completed {
        "/completion"
    } else {
        "/game"
    }
}
