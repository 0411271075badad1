//! The admin control panel: live progress, credential editors, stage configuration, site copy.

use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{
    get_admins, get_settings, get_stages, get_teams, reset_all_progress, reset_team_progress,
    update_admin_field, update_setting, update_stage_field, update_team_field,
};
use crate::components::{
    use_notices, ButtonSize, ButtonVariant, CyberButton, CyberCard, CyberInput, GlowColor,
    LevelTitle, Notices, Page, Spinner,
};
use crate::game::{progress_caption, progress_dots, DotState};
use crate::model::{
    Admin, AdminField, SettingGroup, SiteSetting, Stage, StageField, Team, TeamField, STAGE_COUNT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tab {
    #[default]
    Progress,
    Teams,
    Admins,
    Stages,
    Settings,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Progress,
        Tab::Teams,
        Tab::Admins,
        Tab::Stages,
        Tab::Settings,
    ];

    fn label(self) -> &'static str {
        match self {
            Tab::Progress => "Progress",
            Tab::Teams => "Teams",
            Tab::Admins => "Admins",
            Tab::Stages => "Stages",
            Tab::Settings => "Settings",
        }
    }
}

/// Stages of one team, in stage order.
fn stages_of(stages: &[Stage], team_id: i32) -> Vec<Stage> {
    let mut rows: Vec<Stage> = stages
        .iter()
        .filter(|s| s.team_id == team_id)
        .cloned()
        .collect();
    rows.sort_by_key(|s| s.stage_number);
    rows
}

/// Settings belonging to one editor group, in key order.
fn settings_in(settings: &[SiteSetting], group: SettingGroup) -> Vec<SiteSetting> {
    let mut rows: Vec<SiteSetting> = settings
        .iter()
        .filter(|s| group.contains(&s.setting_key))
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.setting_key.cmp(&b.setting_key));
    rows
}

/// Keeps the current team selection if that team still exists, otherwise picks the first team.
fn reselect(teams: &[Team], current: Option<i32>) -> Option<i32> {
    current
        .filter(|id| teams.iter().any(|t| t.id == *id))
        .or_else(|| teams.first().map(|t| t.id))
}

const RESET_ALL_PROMPT: &str =
    "Are you sure you want to reset ALL teams progress? This cannot be undone.";

/// Dashboard state: the four tables as last fetched, patched in place after each saved edit.
#[derive(Debug, Clone, Copy)]
struct Tables {
    teams: RwSignal<Vec<Team>>,
    admins: RwSignal<Vec<Admin>>,
    stages: RwSignal<Vec<Stage>>,
    settings: RwSignal<Vec<SiteSetting>>,
    selected_team: RwSignal<Option<i32>>,
    loading: RwSignal<bool>,
    saving: RwSignal<bool>,
    resetting_all: RwSignal<bool>,
    notices: Notices,
}

impl Tables {
    fn new(notices: Notices) -> Self {
        Tables {
            teams: RwSignal::new(Vec::new()),
            admins: RwSignal::new(Vec::new()),
            stages: RwSignal::new(Vec::new()),
            settings: RwSignal::new(Vec::new()),
            selected_team: RwSignal::new(None),
            loading: RwSignal::new(true),
            saving: RwSignal::new(false),
            resetting_all: RwSignal::new(false),
            notices,
        }
    }

    async fn reload(self) {
        match get_teams().await {
            Ok(teams) => {
                self.selected_team
                    .set(reselect(&teams, self.selected_team.get_untracked()));
                self.teams.set(teams);
            }
            Err(e) => self.load_failed("teams", e),
        }
        match get_admins().await {
            Ok(admins) => self.admins.set(admins),
            Err(e) => self.load_failed("admins", e),
        }
        match get_stages().await {
            Ok(stages) => self.stages.set(stages),
            Err(e) => self.load_failed("stages", e),
        }
        match get_settings().await {
            Ok(settings) => self.settings.set(settings),
            Err(e) => self.load_failed("settings", e),
        }
        self.loading.set(false);
    }

    fn load_failed(self, table: &str, e: impl std::fmt::Display) {
        log!("Failed to load {}: {}", table, e);
        self.notices.error(format!("Failed to load {table}"));
    }

    fn team(self, team_id: i32) -> Option<Team> {
        self.teams
            .with(|teams| teams.iter().find(|t| t.id == team_id).cloned())
    }

    fn team_value(self, team_id: i32, field: TeamField) -> Signal<String> {
        Signal::derive(move || {
            self.teams.with(|teams| {
                teams
                    .iter()
                    .find(|t| t.id == team_id)
                    .map(|t| field.value(t).to_string())
                    .unwrap_or_default()
            })
        })
    }

    fn admin_value(self, admin_id: i32, field: AdminField) -> Signal<String> {
        Signal::derive(move || {
            self.admins.with(|admins| {
                admins
                    .iter()
                    .find(|a| a.id == admin_id)
                    .map(|a| field.value(a).to_string())
                    .unwrap_or_default()
            })
        })
    }

    fn stage_value(self, stage_id: i32, field: StageField) -> Signal<String> {
        Signal::derive(move || {
            self.stages.with(|stages| {
                stages
                    .iter()
                    .find(|s| s.id == stage_id)
                    .map(|s| field.value(s).to_string())
                    .unwrap_or_default()
            })
        })
    }

    fn setting_value(self, setting_id: i32) -> Signal<String> {
        Signal::derive(move || {
            self.settings.with(|settings| {
                settings
                    .iter()
                    .find(|s| s.id == setting_id)
                    .map(|s| s.setting_value.clone())
                    .unwrap_or_default()
            })
        })
    }

    fn save_team(self, team_id: i32, field: TeamField, value: String) {
        spawn_local(async move {
            match update_team_field(team_id, field, value.clone()).await {
                Ok(()) => {
                    self.teams.update(|teams| {
                        if let Some(team) = teams.iter_mut().find(|t| t.id == team_id) {
                            field.apply(team, value);
                        }
                    });
                    self.notices.success("Team updated");
                }
                Err(e) => {
                    log!("Failed to update team {}: {}", team_id, e);
                    self.notices.error("Failed to update team");
                }
            }
        });
    }

    fn save_admin(self, admin_id: i32, field: AdminField, value: String) {
        spawn_local(async move {
            match update_admin_field(admin_id, field, value.clone()).await {
                Ok(()) => {
                    self.admins.update(|admins| {
                        if let Some(admin) = admins.iter_mut().find(|a| a.id == admin_id) {
                            field.apply(admin, value);
                        }
                    });
                    self.notices.success("Admin updated");
                }
                Err(e) => {
                    log!("Failed to update admin {}: {}", admin_id, e);
                    self.notices.error("Failed to update admin");
                }
            }
        });
    }

    fn save_stage(self, stage_id: i32, field: StageField, value: String) {
        spawn_local(async move {
            match update_stage_field(stage_id, field, value.clone()).await {
                Ok(()) => {
                    self.stages.update(|stages| {
                        if let Some(stage) = stages.iter_mut().find(|s| s.id == stage_id) {
                            field.apply(stage, value);
                        }
                    });
                    self.notices.success("Stage updated");
                }
                Err(e) => {
                    log!("Failed to update stage {}: {}", stage_id, e);
                    self.notices.error("Failed to update stage");
                }
            }
        });
    }

    fn save_setting(self, setting_id: i32, value: String) {
        spawn_local(async move {
            match update_setting(setting_id, value.clone()).await {
                Ok(()) => {
                    self.settings.update(|settings| {
                        if let Some(setting) = settings.iter_mut().find(|s| s.id == setting_id) {
                            setting.setting_value = value;
                        }
                    });
                    self.notices.success("Setting updated");
                }
                Err(e) => {
                    log!("Failed to update setting {}: {}", setting_id, e);
                    self.notices.error("Failed to update setting");
                }
            }
        });
    }

    fn reset_team(self, team_id: i32) {
        self.saving.set(true);
        spawn_local(async move {
            match reset_team_progress(team_id).await {
                Ok(()) => {
                    self.reload().await;
                    self.notices.success("Team progress reset");
                }
                Err(e) => {
                    log!("Failed to reset team {}: {}", team_id, e);
                    self.notices.error("Failed to reset team progress");
                }
            }
            self.saving.set(false);
        });
    }

    fn reset_all(self) {
        let confirmed = leptos::leptos_dom::helpers::window()
            .confirm_with_message(RESET_ALL_PROMPT)
            .unwrap_or(false);
        self.reset_all_with(confirmed);
    }

    /// Starts the global reset if the admin confirmed it. Returns whether anything was sent.
    fn reset_all_with(self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }

        self.resetting_all.set(true);
        spawn_local(async move {
            match reset_all_progress().await {
                Ok(()) => {
                    self.reload().await;
                    self.notices.success("All teams progress reset");
                }
                Err(e) => {
                    log!("Failed to reset all teams: {}", e);
                    self.notices.error("Failed to reset all teams");
                }
            }
            self.resetting_all.set(false);
        });
        true
    }
}

#[component]
pub fn AdminDashboard() -> impl IntoView {
    let tables = Tables::new(use_notices());
    let tab = RwSignal::new(Tab::default());

    // The dashboard only renders in the browser, behind the admin guard.
    Effect::new(move || {
        spawn_local(tables.reload());
    });

    view! {
        <Page show_logout=true>
            <LevelTitle />
            <h1 class="admin-title">"Admin Control Panel"</h1>
            {move || {
                if tables.loading.get() {
                    return view! { <Spinner /> }.into_any();
                }
                view! {
                    <div class="admin-tabs">
                        {Tab::ALL
                            .into_iter()
                            .map(|t| {
                                let class = move || {
                                    if tab.get() == t { "admin-tab active" } else { "admin-tab" }
                                };
                                view! {
                                    <button class=class on:click=move |_| tab.set(t)>
                                        {t.label()}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                    {move || match tab.get() {
                        Tab::Progress => view! { <ProgressTab tables=tables /> }.into_any(),
                        Tab::Teams => view! { <TeamsTab tables=tables /> }.into_any(),
                        Tab::Admins => view! { <AdminsTab tables=tables /> }.into_any(),
                        Tab::Stages => view! { <StagesTab tables=tables /> }.into_any(),
                        Tab::Settings => view! { <SettingsTab tables=tables /> }.into_any(),
                    }}
                }
                    .into_any()
            }}
        </Page>
    }
}

#[component]
fn ProgressTab(tables: Tables) -> impl IntoView {
    view! {
        <CyberCard glow=GlowColor::Primary>
            <div class="admin-card-head">
                <h2>"Team Progress"</h2>
                <CyberButton
                    variant=ButtonVariant::Destructive
                    size=ButtonSize::Sm
                    disabled=tables.resetting_all
                    on_click=move |_: ()| tables.reset_all()
                >
                    {move || {
                        if tables.resetting_all.get() { "Resetting..." } else { "Reset All Teams" }
                    }}
                </CyberButton>
            </div>
            <div class="admin-list">
                <For
                    each=move || tables.teams.get()
                    key=|team| team.id
                    children=move |team: Team| {
                        let team_id = team.id;
                        let row = move || tables.team(team_id);
                        view! {
                            <div class=move || {
                                if row().is_some_and(|t| t.completed) {
                                    "admin-row completed"
                                } else {
                                    "admin-row"
                                }
                            }>
                                <div class="admin-row-main">
                                    <span class="team-name">
                                        {move || row().map(|t| t.team_name).unwrap_or_default()}
                                        {move || row().filter(|t| t.completed).map(|_| " ✓")}
                                    </span>
                                    <div class="mini-dots">
                                        {move || {
                                            row()
                                                .map(|t| {
                                                    progress_dots(t.current_stage, t.completed)
                                                        .into_iter()
                                                        .map(|(n, state)| {
                                                            let class = match state {
                                                                DotState::Done => "mini-dot done",
                                                                DotState::Current => "mini-dot current",
                                                                DotState::Locked => "mini-dot",
                                                            };
                                                            view! { <div class=class>{n}</div> }
                                                        })
                                                        .collect_view()
                                                })
                                        }}
                                    </div>
                                    <p class="caption">
                                        {move || {
                                            row()
                                                .map(|t| progress_caption(t.current_stage, t.completed))
                                                .unwrap_or_default()
                                        }}
                                    </p>
                                </div>
                                <CyberButton
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    disabled=tables.saving
                                    on_click=move |_: ()| tables.reset_team(team_id)
                                >
                                    "Reset"
                                </CyberButton>
                            </div>
                        }
                    }
                />
            </div>
        </CyberCard>
    }
}

#[component]
fn TeamsTab(tables: Tables) -> impl IntoView {
    view! {
        <CyberCard glow=GlowColor::Secondary>
            <h2>"Team Credentials"</h2>
            <div class="admin-list">
                <For
                    each=move || tables.teams.get()
                    key=|team| team.id
                    children=move |team: Team| {
                        let team_id = team.id;
                        let editors = [TeamField::TeamName, TeamField::Username, TeamField::Password]
                            .into_iter()
                            .map(|field| {
                                view! {
                                    <CyberInput
                                        label=field.label()
                                        value=tables.team_value(team_id, field)
                                        on_change=move |value: String| {
                                            tables.save_team(team_id, field, value)
                                        }
                                    />
                                }
                            })
                            .collect_view();
                        view! {
                            <div class="admin-row editor-grid">
                                {editors}
                                <div class="team-status">
                                    <p>
                                        {move || {
                                            tables
                                                .team(team_id)
                                                .map(|t| format!("Stage: {}/{}", t.current_stage, STAGE_COUNT))
                                        }}
                                    </p>
                                    <p>
                                        {move || {
                                            tables
                                                .team(team_id)
                                                .map(|t| {
                                                    if t.completed {
                                                        "Status: Completed"
                                                    } else {
                                                        "Status: In Progress"
                                                    }
                                                })
                                        }}
                                    </p>
                                    <CyberButton
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Sm
                                        disabled=tables.saving
                                        on_click=move |_: ()| tables.reset_team(team_id)
                                    >
                                        "↻"
                                    </CyberButton>
                                </div>
                            </div>
                        }
                    }
                />
            </div>
        </CyberCard>
    }
}

#[component]
fn AdminsTab(tables: Tables) -> impl IntoView {
    view! {
        <CyberCard glow=GlowColor::Secondary>
            <h2>"Admin Credentials"</h2>
            <div class="admin-list">
                <For
                    each=move || tables.admins.get()
                    key=|admin| admin.id
                    children=move |admin: Admin| {
                        let admin_id = admin.id;
                        view! {
                            <div class="admin-row editor-grid">
                                {[AdminField::AdminName, AdminField::Username, AdminField::Password]
                                    .into_iter()
                                    .map(|field| {
                                        view! {
                                            <CyberInput
                                                label=field.label()
                                                value=tables.admin_value(admin_id, field)
                                                on_change=move |value: String| {
                                                    tables.save_admin(admin_id, field, value)
                                                }
                                            />
                                        }
                                    })
                                    .collect_view()}
                            </div>
                        }
                    }
                />
            </div>
        </CyberCard>
    }
}

#[component]
fn StagesTab(tables: Tables) -> impl IntoView {
    let on_select = move |ev| {
        let id = event_target_value(&ev).parse::<i32>().ok();
        tables.selected_team.set(id);
    };

    view! {
        <CyberCard glow=GlowColor::Primary>
            <h2>"Stage Configuration"</h2>
            <div class="cyber-field">
                <label class="cyber-label">"Select Team"</label>
                <select class="cyber-input" on:change=on_select>
                    <For
                        each=move || tables.teams.get()
                        key=|team| team.id
                        children=move |team: Team| {
                            let team_id = team.id;
                            view! {
                                <option
                                    value=team_id.to_string()
                                    selected=move || tables.selected_team.get() == Some(team_id)
                                >
                                    {move || tables.team(team_id).map(|t| t.team_name)}
                                </option>
                            }
                        }
                    />
                </select>
            </div>
            <p class="caption">
                {move || {
                    tables
                        .selected_team
                        .get()
                        .and_then(|id| tables.team(id))
                        .map(|t| {
                            format!(
                                "Current Progress: Stage {} | Status: {}",
                                t.current_stage,
                                if t.completed { "✅ Completed" } else { "🔄 In Progress" },
                            )
                        })
                }}
            </p>
            <div class="admin-list">
                <For
                    each=move || {
                        match tables.selected_team.get() {
                            Some(team_id) => tables.stages.with(|stages| stages_of(stages, team_id)),
                            None => Vec::new(),
                        }
                    }
                    key=|stage| (stage.id, stage.is_completed)
                    children=move |stage: Stage| {
                        let stage_id = stage.id;
                        let class = if stage.is_completed {
                            "admin-row completed"
                        } else {
                            "admin-row"
                        };
                        view! {
                            <div class=class>
                                <div class="stage-head">
                                    <span class="stage-number">"Stage " {stage.stage_number}</span>
                                    {stage
                                        .is_completed
                                        .then(|| view! { <span class="stage-done">"✓ Completed"</span> })}
                                </div>
                                <div class="editor-grid two">
                                    {[StageField::LocationName, StageField::Solution]
                                        .into_iter()
                                        .map(|field| {
                                            view! {
                                                <CyberInput
                                                    label=field.label()
                                                    value=tables.stage_value(stage_id, field)
                                                    on_change=move |value: String| {
                                                        tables.save_stage(stage_id, field, value)
                                                    }
                                                />
                                            }
                                        })
                                        .collect_view()}
                                </div>
                            </div>
                        }
                    }
                />
            </div>
        </CyberCard>
    }
}

#[component]
fn SettingsTab(tables: Tables) -> impl IntoView {
    view! {
        <CyberCard glow=GlowColor::Accent>
            <h2>"Site Settings"</h2>
            {SettingGroup::ALL
                .into_iter()
                .map(|group| {
                    view! {
                        <div class="settings-group">
                            <h3>{group.heading()}</h3>
                            <For
                                each=move || tables.settings.with(|settings| settings_in(settings, group))
                                key=|setting| setting.id
                                children=move |setting: SiteSetting| {
                                    let setting_id = setting.id;
                                    view! {
                                        <CyberInput
                                            label=group.label(&setting.setting_key)
                                            value=tables.setting_value(setting_id)
                                            on_change=move |value: String| {
                                                tables.save_setting(setting_id, value)
                                            }
                                        />
                                    }
                                }
                            />
                        </div>
                    }
                })
                .collect_view()}
        </CyberCard>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn team(id: i32, name: &str) -> Team {
        Team {
            id,
            team_name: name.to_string(),
            username: format!("user{id}"),
            password: "pw".to_string(),
            current_stage: 1,
            completed: false,
        }
    }

    fn stage(id: i32, team_id: i32, stage_number: i32) -> Stage {
        Stage {
            id,
            team_id,
            stage_number,
            location_name: format!("Location {stage_number}"),
            solution: "answer".to_string(),
            is_completed: false,
            completed_at: None,
        }
    }

    fn setting(id: i32, key: &str) -> SiteSetting {
        SiteSetting {
            id,
            setting_key: key.to_string(),
            setting_value: String::new(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_stages_of_filters_and_orders() {
        let stages = vec![stage(1, 10, 3), stage(2, 20, 1), stage(3, 10, 1), stage(4, 10, 2)];
        let rows = stages_of(&stages, 10);
        assert_eq!(
            rows.iter().map(|s| s.stage_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(rows.iter().all(|s| s.team_id == 10));
        assert!(stages_of(&stages, 99).is_empty());
    }

    #[test]
    fn test_settings_in_group() {
        let settings = vec![
            setting(1, "completion_title"),
            setting(2, "landing_line_2"),
            setting(3, "landing_line_1"),
            setting(4, "unrelated"),
        ];
        let landing = settings_in(&settings, SettingGroup::Landing);
        assert_eq!(
            landing.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![3, 2]
        );
        let completion = settings_in(&settings, SettingGroup::Completion);
        assert_eq!(completion.len(), 1);
        assert_eq!(completion[0].setting_key, "completion_title");
    }

    #[test]
    fn test_reselect_keeps_existing_choice() {
        let teams = vec![team(1, "Alpha"), team(2, "Bravo")];
        assert_eq!(reselect(&teams, None), Some(1));
        assert_eq!(reselect(&teams, Some(2)), Some(2));
        assert_eq!(reselect(&teams, Some(7)), Some(1));
        assert_eq!(reselect(&[], Some(2)), None);
    }

    #[test]
    fn test_declined_reset_all_changes_nothing() {
        let owner = Owner::new();
        owner.with(|| {
            let tables = Tables::new(Notices::new());
            tables.teams.set(vec![team(1, "Alpha")]);

            assert!(!tables.reset_all_with(false));
            assert!(!tables.resetting_all.get_untracked());
            assert!(tables.notices.current().is_empty());
            assert_eq!(tables.teams.get_untracked(), vec![team(1, "Alpha")]);
        });
    }

    #[test]
    fn test_tab_labels() {
        let labels: Vec<_> = Tab::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            vec!["Progress", "Teams", "Admins", "Stages", "Settings"]
        );
        assert_eq!(Tab::default(), Tab::Progress);
    }
}
