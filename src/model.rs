use chrono::NaiveDateTime;
#[cfg(feature = "ssr")]
use diesel::prelude::*;
#[cfg(feature = "ssr")]
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

/// Number of stages every team has to clear.
pub const STAGE_COUNT: i32 = 8;
pub const FIRST_STAGE: i32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::teams))]
#[cfg_attr(feature = "ssr", diesel(check_for_backend(Sqlite)))]
pub struct Team {
    pub id: i32,
    pub team_name: String,
    pub username: String,
    pub password: String,
    pub current_stage: i32,
    pub completed: bool,
}

impl Team {
    /// The public part of the row, as kept in the browser session.
    pub fn identity(&self) -> TeamIdentity {
        TeamIdentity {
            id: self.id,
            team_name: self.team_name.clone(),
            username: self.username.clone(),
            current_stage: self.current_stage,
            completed: self.completed,
        }
    }
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::teams)]
pub struct NewTeam<'a> {
    pub team_name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    // current_stage and completed use defaults
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::admins))]
#[cfg_attr(feature = "ssr", diesel(check_for_backend(Sqlite)))]
pub struct Admin {
    pub id: i32,
    pub admin_name: String,
    pub username: String,
    pub password: String,
}

impl Admin {
    pub fn identity(&self) -> AdminIdentity {
        AdminIdentity {
            id: self.id,
            admin_name: self.admin_name.clone(),
            username: self.username.clone(),
        }
    }
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::admins)]
pub struct NewAdmin<'a> {
    pub admin_name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::team_stages))]
#[cfg_attr(feature = "ssr", diesel(check_for_backend(Sqlite)))]
pub struct Stage {
    pub id: i32,
    pub team_id: i32,
    pub stage_number: i32,
    pub location_name: String,
    pub solution: String,
    pub is_completed: bool,
    pub completed_at: Option<NaiveDateTime>,
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::team_stages)]
pub struct NewStage<'a> {
    pub team_id: i32,
    pub stage_number: i32,
    pub location_name: &'a str,
    pub solution: &'a str,
    // is_completed defaults to false, completed_at to NULL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::site_settings))]
#[cfg_attr(feature = "ssr", diesel(check_for_backend(Sqlite)))]
pub struct SiteSetting {
    pub id: i32,
    pub setting_key: String,
    pub setting_value: String,
    pub updated_at: NaiveDateTime,
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::site_settings)]
pub struct NewSiteSetting<'a> {
    pub setting_key: &'a str,
    pub setting_value: &'a str,
    pub updated_at: NaiveDateTime,
}

/// Team snapshot held by the session. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub id: i32,
    pub team_name: String,
    pub username: String,
    pub current_stage: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub id: i32,
    pub admin_name: String,
    pub username: String,
}

/// Team columns the dashboard may edit. Progress only moves through stage completion and resets,
/// so `completed` always comes with `current_stage == 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamField {
    TeamName,
    Username,
    Password,
}

impl TeamField {
    pub fn label(self) -> &'static str {
        match self {
            TeamField::TeamName => "Team Name",
            TeamField::Username => "Username",
            TeamField::Password => "Password",
        }
    }

    pub fn value(self, team: &Team) -> &str {
        match self {
            TeamField::TeamName => &team.team_name,
            TeamField::Username => &team.username,
            TeamField::Password => &team.password,
        }
    }

    /// Mirrors a saved edit onto a row already held in memory.
    pub fn apply(self, team: &mut Team, value: String) {
        match self {
            TeamField::TeamName => team.team_name = value,
            TeamField::Username => team.username = value,
            TeamField::Password => team.password = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminField {
    AdminName,
    Username,
    Password,
}

impl AdminField {
    pub fn label(self) -> &'static str {
        match self {
            AdminField::AdminName => "Admin Name",
            AdminField::Username => "Username",
            AdminField::Password => "Password",
        }
    }

    pub fn value(self, admin: &Admin) -> &str {
        match self {
            AdminField::AdminName => &admin.admin_name,
            AdminField::Username => &admin.username,
            AdminField::Password => &admin.password,
        }
    }

    pub fn apply(self, admin: &mut Admin, value: String) {
        match self {
            AdminField::AdminName => admin.admin_name = value,
            AdminField::Username => admin.username = value,
            AdminField::Password => admin.password = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageField {
    LocationName,
    Solution,
}

impl StageField {
    pub fn label(self) -> &'static str {
        match self {
            StageField::LocationName => "Location Name",
            StageField::Solution => "Solution",
        }
    }

    pub fn value(self, stage: &Stage) -> &str {
        match self {
            StageField::LocationName => &stage.location_name,
            StageField::Solution => &stage.solution,
        }
    }

    pub fn apply(self, stage: &mut Stage, value: String) {
        match self {
            StageField::LocationName => stage.location_name = value,
            StageField::Solution => stage.solution = value,
        }
    }
}

/// Site copy is grouped by key prefix, one group per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingGroup {
    Landing,
    Completion,
}

impl SettingGroup {
    pub const ALL: [SettingGroup; 2] = [SettingGroup::Landing, SettingGroup::Completion];

    pub fn prefix(self) -> &'static str {
        match self {
            SettingGroup::Landing => "landing_",
            SettingGroup::Completion => "completion_",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            SettingGroup::Landing => "Landing Page Lines",
            SettingGroup::Completion => "Completion Screen",
        }
    }

    pub fn contains(self, key: &str) -> bool {
        key.starts_with(self.prefix())
    }

    /// Editor label for a key: the group prefix is dropped and the first remaining underscore
    /// becomes a space, so `landing_line_1` reads "line 1".
    pub fn label(self, key: &str) -> String {
        key.strip_prefix(self.prefix())
            .unwrap_or(key)
            .replacen('_', " ", 1)
    }
}

/// Copy shipped with the event, used when a key is missing or blank.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("landing_line_1", "Welcome to the ultimate treasure hunt!"),
    ("landing_line_2", "Test your skills across 8 challenging stages."),
    (
        "landing_line_3",
        "Work as a team to decode locations and find solutions.",
    ),
    ("landing_line_4", "May the best team win!"),
    ("completion_title", "Congratulations"),
    (
        "completion_line_1",
        "You Have Successfully Completed ALL Stages.",
    ),
    ("completion_line_2", "Go And meet the Event Coordinator"),
    ("completion_line_3", "raeN dnuorg roolf kcolb TEF moorssalC r"),
    ("completion_line_4", "To Win The Competition"),
];

fn default_value(key: &str) -> String {
    DEFAULT_SETTINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_default()
}

fn resolve(settings: &[SiteSetting], key: &str) -> String {
    settings
        .iter()
        .find(|s| s.setting_key == key && !s.setting_value.is_empty())
        .map(|s| s.setting_value.clone())
        .unwrap_or_else(|| default_value(key))
}

/// The four lines on the landing page.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingCopy {
    pub lines: [String; 4],
}

impl LandingCopy {
    pub fn from_settings(settings: &[SiteSetting]) -> Self {
        Self {
            lines: std::array::from_fn(|i| resolve(settings, &format!("landing_line_{}", i + 1))),
        }
    }
}

impl Default for LandingCopy {
    fn default() -> Self {
        Self::from_settings(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCopy {
    pub title: String,
    pub lines: [String; 4],
}

impl CompletionCopy {
    pub fn from_settings(settings: &[SiteSetting]) -> Self {
        Self {
            title: resolve(settings, "completion_title"),
            lines: std::array::from_fn(|i| {
                resolve(settings, &format!("completion_line_{}", i + 1))
            }),
        }
    }
}

impl Default for CompletionCopy {
    fn default() -> Self {
        Self::from_settings(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, value: &str) -> SiteSetting {
        SiteSetting {
            id: 1,
            setting_key: key.to_string(),
            setting_value: value.to_string(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_landing_copy_defaults() {
        let copy = LandingCopy::default();
        assert_eq!(copy.lines[0], "Welcome to the ultimate treasure hunt!");
        assert_eq!(copy.lines[3], "May the best team win!");
    }

    #[test]
    fn test_landing_copy_overrides_and_blank_fallback() {
        let settings = vec![
            setting("landing_line_2", "Eight stages. One winner."),
            setting("landing_line_3", ""),
        ];
        let copy = LandingCopy::from_settings(&settings);
        assert_eq!(copy.lines[1], "Eight stages. One winner.");
        // Blank values fall back to the shipped copy.
        assert_eq!(
            copy.lines[2],
            "Work as a team to decode locations and find solutions."
        );
    }

    #[test]
    fn test_completion_copy() {
        let settings = vec![
            setting("completion_title", "Well Done"),
            setting("landing_line_1", "ignored here"),
        ];
        let copy = CompletionCopy::from_settings(&settings);
        assert_eq!(copy.title, "Well Done");
        assert_eq!(copy.lines[1], "Go And meet the Event Coordinator");
    }

    #[test]
    fn test_setting_labels() {
        assert_eq!(SettingGroup::Landing.label("landing_line_1"), "line 1");
        assert_eq!(SettingGroup::Completion.label("completion_title"), "title");
        // Only the first underscore after the prefix is replaced.
        assert_eq!(
            SettingGroup::Completion.label("completion_line_4_extra"),
            "line 4_extra"
        );
        assert!(SettingGroup::Landing.contains("landing_line_4"));
        assert!(!SettingGroup::Landing.contains("completion_title"));
    }

    #[test]
    fn test_identity_drops_password() {
        let team = Team {
            id: 3,
            team_name: "Alpha".to_string(),
            username: "teamA".to_string(),
            password: "pw1".to_string(),
            current_stage: 3,
            completed: false,
        };
        let identity = team.identity();
        assert_eq!(identity.id, 3);
        assert_eq!(identity.current_stage, 3);
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("pw1"));
    }

    #[test]
    fn test_field_apply_touches_one_column() {
        let mut team = Team {
            id: 3,
            team_name: "Alpha".to_string(),
            username: "teamA".to_string(),
            password: "pw1".to_string(),
            current_stage: 5,
            completed: false,
        };
        TeamField::Password.apply(&mut team, "pw2".to_string());
        assert_eq!(TeamField::Password.value(&team), "pw2");
        assert_eq!(team.username, "teamA");
        assert_eq!(team.current_stage, 5);

        let mut stage = Stage {
            id: 9,
            team_id: 3,
            stage_number: 2,
            location_name: "Library".to_string(),
            solution: "Books".to_string(),
            is_completed: true,
            completed_at: None,
        };
        StageField::Solution.apply(&mut stage, "Shelves".to_string());
        assert_eq!(StageField::Solution.value(&stage), "Shelves");
        assert_eq!(StageField::LocationName.value(&stage), "Library");
        assert!(stage.is_completed);
    }
}
