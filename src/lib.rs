pub mod admin;
pub mod api;
pub mod app;
pub mod components;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod error;
pub mod game;
pub mod model;
#[cfg(feature = "ssr")]
pub mod schema;
pub mod session;

#[cfg(feature = "ssr")]
use chrono::{NaiveDateTime, Utc};
#[cfg(feature = "ssr")]
use diesel::connection::SimpleConnection;
#[cfg(feature = "ssr")]
use diesel::prelude::*;
#[cfg(feature = "ssr")]
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
#[cfg(feature = "ssr")]
use diesel::SqliteConnection;

#[cfg(feature = "ssr")]
use crate::config::Config;
#[cfg(feature = "ssr")]
use crate::error::StoreError;
#[cfg(feature = "ssr")]
use crate::game::{advance_from, is_valid_stage, Advance};
#[cfg(feature = "ssr")]
use crate::model::{
    Admin, AdminField, NewSiteSetting, SettingGroup, SiteSetting, Stage, StageField, Team,
    TeamField, DEFAULT_SETTINGS, FIRST_STAGE, STAGE_COUNT,
};
#[cfg(feature = "ssr")]
use crate::schema::{admins, site_settings, team_stages, teams};

#[cfg(feature = "ssr")]
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}

/// Schema for a fresh database, shared by `init_database` and the tests.
#[cfg(feature = "ssr")]
pub const SCHEMA_SQL: &str =
    include_str!("../migrations/2025-11-20-000000_create_datahunt/up.sql");

// Enable WAL mode to allow concurrent reads during writes, and a timeout to retry locked
// operations.
#[cfg(feature = "ssr")]
const SQLITE_PRAGMAS: &str = "PRAGMA foreign_keys = ON; \
    PRAGMA journal_mode = WAL; \
    PRAGMA synchronous = NORMAL; \
    PRAGMA busy_timeout = 10000;";

#[cfg(feature = "ssr")]
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

#[cfg(feature = "ssr")]
impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(SQLITE_PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[cfg(feature = "ssr")]
pub fn build_pool(config: &Config) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
    Pool::builder()
        .max_size(config.pool_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
}

/// Opens a single connection for the maintenance binaries.
#[cfg(feature = "ssr")]
pub fn establish_connection() -> SqliteConnection {
    let config = Config::load();
    let mut conn = SqliteConnection::establish(&config.database_url)
        .unwrap_or_else(|_| panic!("Error connecting to {}", config.database_url));
    conn.batch_execute(SQLITE_PRAGMAS)
        .expect("Failed to set SQLite PRAGMAs");
    conn
}

/// Creates any missing tables.
#[cfg(feature = "ssr")]
pub fn apply_schema(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    conn.batch_execute(SCHEMA_SQL)?;
    Ok(())
}

/// Inserts the shipped landing and completion copy, leaving existing keys untouched.
/// Returns the number of settings inserted.
#[cfg(feature = "ssr")]
pub fn seed_default_settings(conn: &mut SqliteConnection) -> Result<usize, StoreError> {
    let now = Utc::now().naive_utc();
    let rows: Vec<NewSiteSetting> = DEFAULT_SETTINGS
        .iter()
        .map(|(key, value)| NewSiteSetting {
            setting_key: key,
            setting_value: value,
            updated_at: now,
        })
        .collect();
    let mut inserted = 0;
    for row in &rows {
        inserted += diesel::insert_or_ignore_into(site_settings::table)
            .values(row)
            .execute(conn)?;
    }
    Ok(inserted)
}

/// Looks a team up by exact username and password. Anything other than exactly one matching row
/// is treated as invalid credentials.
#[cfg(feature = "ssr")]
pub fn find_team_by_credentials(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> Result<Option<Team>, StoreError> {
    let mut rows: Vec<Team> = teams::table
        .filter(teams::username.eq(username))
        .filter(teams::password.eq(password))
        .select(Team::as_select())
        .limit(2)
        .load(conn)?;
    Ok(if rows.len() == 1 { rows.pop() } else { None })
}

#[cfg(feature = "ssr")]
pub fn find_admin_by_credentials(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> Result<Option<Admin>, StoreError> {
    let mut rows: Vec<Admin> = admins::table
        .filter(admins::username.eq(username))
        .filter(admins::password.eq(password))
        .select(Admin::as_select())
        .limit(2)
        .load(conn)?;
    Ok(if rows.len() == 1 { rows.pop() } else { None })
}

#[cfg(feature = "ssr")]
pub fn get_team(conn: &mut SqliteConnection, team_id: i32) -> Result<Team, StoreError> {
    teams::table
        .filter(teams::id.eq(team_id))
        .select(Team::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound("team"))
}

/// Fetches the stage row for `(team_id, stage_number)`. Nothing enforces one row per pair; the
/// oldest row wins.
#[cfg(feature = "ssr")]
pub fn get_team_stage(
    conn: &mut SqliteConnection,
    team_id: i32,
    stage_number: i32,
) -> Result<Stage, StoreError> {
    team_stages::table
        .filter(team_stages::team_id.eq(team_id))
        .filter(team_stages::stage_number.eq(stage_number))
        .order(team_stages::id.asc())
        .select(Stage::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound("stage"))
}

/// Marks a stage row completed at `at`. Returns number of affected rows.
#[cfg(feature = "ssr")]
pub fn complete_stage(
    conn: &mut SqliteConnection,
    stage_id: i32,
    at: NaiveDateTime,
) -> Result<usize, StoreError> {
    Ok(
        diesel::update(team_stages::table.filter(team_stages::id.eq(stage_id)))
            .set((
                team_stages::is_completed.eq(true),
                team_stages::completed_at.eq(Some(at)),
            ))
            .execute(conn)?,
    )
}

/// Moves a team to `next_stage`.
#[cfg(feature = "ssr")]
pub fn advance_team(
    conn: &mut SqliteConnection,
    team_id: i32,
    next_stage: i32,
) -> Result<usize, StoreError> {
    if !is_valid_stage(next_stage) {
        return Err(StoreError::InvalidStage(next_stage));
    }
    Ok(diesel::update(teams::table.filter(teams::id.eq(team_id)))
        .set(teams::current_stage.eq(next_stage))
        .execute(conn)?)
}

/// Marks a team as having cleared the final stage.
#[cfg(feature = "ssr")]
pub fn finish_team(conn: &mut SqliteConnection, team_id: i32) -> Result<usize, StoreError> {
    Ok(diesel::update(teams::table.filter(teams::id.eq(team_id)))
        .set((
            teams::completed.eq(true),
            teams::current_stage.eq(STAGE_COUNT),
        ))
        .execute(conn)?)
}

/// Records a correct answer: marks the stage completed, then either moves the team to the next
/// stage or, after the last one, marks the team completed. Both writes share one transaction.
/// Returns the updated team and where it went.
///
/// Only the team's current stage can be recorded, and nothing once the team has finished. A stale
/// submission writes nothing.
#[cfg(feature = "ssr")]
pub fn record_stage_completion(
    conn: &mut SqliteConnection,
    team_id: i32,
    stage_id: i32,
) -> Result<(Team, Advance), StoreError> {
    conn.transaction(|conn| {
        let stage: Stage = team_stages::table
            .filter(team_stages::id.eq(stage_id))
            .filter(team_stages::team_id.eq(team_id))
            .select(Stage::as_select())
            .first(conn)
            .optional()?
            .ok_or(StoreError::NotFound("stage"))?;
        if !is_valid_stage(stage.stage_number) {
            return Err(StoreError::InvalidStage(stage.stage_number));
        }

        let team = get_team(conn, team_id)?;
        if team.completed {
            return Err(StoreError::AlreadyCompleted);
        }
        if stage.stage_number != team.current_stage {
            return Err(StoreError::StageOutOfTurn {
                current: team.current_stage,
                submitted: stage.stage_number,
            });
        }

        complete_stage(conn, stage.id, Utc::now().naive_utc())?;

        let advance = advance_from(stage.stage_number);
        match advance {
            Advance::Next(next_stage) => advance_team(conn, team_id, next_stage)?,
            Advance::Finished => finish_team(conn, team_id)?,
        };

        let team = get_team(conn, team_id)?;
        Ok((team, advance))
    })
}

/// Fetches all teams, ordered by name.
#[cfg(feature = "ssr")]
pub fn get_all_teams(conn: &mut SqliteConnection) -> Result<Vec<Team>, StoreError> {
    Ok(teams::table
        .order(teams::team_name.asc())
        .select(Team::as_select())
        .load(conn)?)
}

#[cfg(feature = "ssr")]
pub fn get_all_admins(conn: &mut SqliteConnection) -> Result<Vec<Admin>, StoreError> {
    Ok(admins::table
        .order(admins::admin_name.asc())
        .select(Admin::as_select())
        .load(conn)?)
}

/// Fetches every stage row of every team, ordered by stage number.
#[cfg(feature = "ssr")]
pub fn get_all_stages(conn: &mut SqliteConnection) -> Result<Vec<Stage>, StoreError> {
    Ok(team_stages::table
        .order((team_stages::stage_number.asc(), team_stages::id.asc()))
        .select(Stage::as_select())
        .load(conn)?)
}

#[cfg(feature = "ssr")]
pub fn get_all_settings(conn: &mut SqliteConnection) -> Result<Vec<SiteSetting>, StoreError> {
    Ok(site_settings::table
        .order(site_settings::setting_key.asc())
        .select(SiteSetting::as_select())
        .load(conn)?)
}

/// Settings whose key starts with the group's prefix.
#[cfg(feature = "ssr")]
pub fn get_settings_in_group(
    conn: &mut SqliteConnection,
    group: SettingGroup,
) -> Result<Vec<SiteSetting>, StoreError> {
    // Filtered here rather than with LIKE, where '_' is a wildcard.
    let mut settings = get_all_settings(conn)?;
    settings.retain(|s| group.contains(&s.setting_key));
    Ok(settings)
}

/// Updates one credential column of a team. Returns number of affected rows.
#[cfg(feature = "ssr")]
pub fn update_team_field(
    conn: &mut SqliteConnection,
    team_id: i32,
    field: TeamField,
    value: &str,
) -> Result<usize, StoreError> {
    let target = teams::table.filter(teams::id.eq(team_id));
    let affected = match field {
        TeamField::TeamName => diesel::update(target)
            .set(teams::team_name.eq(value))
            .execute(conn)?,
        TeamField::Username => diesel::update(target)
            .set(teams::username.eq(value))
            .execute(conn)?,
        TeamField::Password => diesel::update(target)
            .set(teams::password.eq(value))
            .execute(conn)?,
    };
    Ok(affected)
}

#[cfg(feature = "ssr")]
pub fn update_admin_field(
    conn: &mut SqliteConnection,
    admin_id: i32,
    field: AdminField,
    value: &str,
) -> Result<usize, StoreError> {
    let target = admins::table.filter(admins::id.eq(admin_id));
    let affected = match field {
        AdminField::AdminName => diesel::update(target)
            .set(admins::admin_name.eq(value))
            .execute(conn)?,
        AdminField::Username => diesel::update(target)
            .set(admins::username.eq(value))
            .execute(conn)?,
        AdminField::Password => diesel::update(target)
            .set(admins::password.eq(value))
            .execute(conn)?,
    };
    Ok(affected)
}

#[cfg(feature = "ssr")]
pub fn update_stage_field(
    conn: &mut SqliteConnection,
    stage_id: i32,
    field: StageField,
    value: &str,
) -> Result<usize, StoreError> {
    let target = team_stages::table.filter(team_stages::id.eq(stage_id));
    let affected = match field {
        StageField::LocationName => diesel::update(target)
            .set(team_stages::location_name.eq(value))
            .execute(conn)?,
        StageField::Solution => diesel::update(target)
            .set(team_stages::solution.eq(value))
            .execute(conn)?,
    };
    Ok(affected)
}

/// Updates a setting's value and stamps `updated_at`.
#[cfg(feature = "ssr")]
pub fn update_setting(
    conn: &mut SqliteConnection,
    setting_id: i32,
    value: &str,
) -> Result<usize, StoreError> {
    Ok(
        diesel::update(site_settings::table.filter(site_settings::id.eq(setting_id)))
            .set((
                site_settings::setting_value.eq(value),
                site_settings::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?,
    )
}

/// Rows touched by a progress reset.
#[cfg(feature = "ssr")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSummary {
    pub teams: usize,
    pub stages: usize,
}

/// Puts one team back on stage 1 and clears completion on its stages.
#[cfg(feature = "ssr")]
pub fn reset_team_progress(
    conn: &mut SqliteConnection,
    team_id: i32,
) -> Result<ResetSummary, StoreError> {
    conn.transaction(|conn| {
        let team_rows = diesel::update(teams::table.filter(teams::id.eq(team_id)))
            .set((
                teams::current_stage.eq(FIRST_STAGE),
                teams::completed.eq(false),
            ))
            .execute(conn)?;
        let stage_rows = diesel::update(team_stages::table.filter(team_stages::team_id.eq(team_id)))
            .set((
                team_stages::is_completed.eq(false),
                team_stages::completed_at.eq(None::<NaiveDateTime>),
            ))
            .execute(conn)?;
        Ok(ResetSummary {
            teams: team_rows,
            stages: stage_rows,
        })
    })
}

/// Puts every team back on stage 1 and clears completion on every stage row.
#[cfg(feature = "ssr")]
pub fn reset_all_progress(conn: &mut SqliteConnection) -> Result<ResetSummary, StoreError> {
    conn.transaction(|conn| {
        let team_rows = diesel::update(teams::table)
            .set((
                teams::current_stage.eq(FIRST_STAGE),
                teams::completed.eq(false),
            ))
            .execute(conn)?;
        let stage_rows = diesel::update(team_stages::table)
            .set((
                team_stages::is_completed.eq(false),
                team_stages::completed_at.eq(None::<NaiveDateTime>),
            ))
            .execute(conn)?;
        Ok(ResetSummary {
            teams: team_rows,
            stages: stage_rows,
        })
    })
}

#[cfg(all(test, feature = "ssr"))]
mod tests {
    use super::*;
    use crate::model::{NewAdmin, NewStage, NewTeam};

    const SOLUTIONS: [&str; 8] = [
        "Lantern", "Compass", "River", "Anchor", "Beacon", "Cipher", "Summit", "Harbor",
    ];

    // Helper to run a test against a fresh in-memory database with the schema applied.
    fn run_test<F>(test_fn: F)
    where
        F: FnOnce(&mut SqliteConnection) -> Result<(), StoreError>,
    {
        let mut conn =
            SqliteConnection::establish(":memory:").expect("Failed to open in-memory database");
        conn.batch_execute("PRAGMA foreign_keys = ON;")
            .expect("Failed to enable foreign keys");
        apply_schema(&mut conn).expect("Failed to apply schema");
        test_fn(&mut conn).expect("Test returned an error");
    }

    // Inserts a team with its eight stages, as done out-of-band before the event.
    fn insert_team(
        conn: &mut SqliteConnection,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<Team, StoreError> {
        let team_id: i32 = diesel::insert_into(teams::table)
            .values(&NewTeam {
                team_name: name,
                username,
                password,
            })
            .returning(teams::id)
            .get_result(conn)?;
        for (i, solution) in SOLUTIONS.iter().enumerate() {
            let location = format!("Location {}", i + 1);
            diesel::insert_into(team_stages::table)
                .values(&NewStage {
                    team_id,
                    stage_number: i as i32 + 1,
                    location_name: &location,
                    solution,
                })
                .execute(conn)?;
        }
        get_team(conn, team_id)
    }

    fn insert_admin(
        conn: &mut SqliteConnection,
        username: &str,
        password: &str,
    ) -> Result<Admin, StoreError> {
        Ok(diesel::insert_into(admins::table)
            .values(&NewAdmin {
                admin_name: "Coordinator",
                username,
                password,
            })
            .returning(Admin::as_returning())
            .get_result(conn)?)
    }

    #[test]
    fn test_schema_is_idempotent() {
        run_test(|conn| {
            apply_schema(conn)?;
            let count: i64 = teams::table.count().get_result(conn)?;
            assert_eq!(count, 0);
            Ok(())
        });
    }

    #[test]
    fn test_seed_default_settings() {
        run_test(|conn| {
            assert_eq!(seed_default_settings(conn)?, DEFAULT_SETTINGS.len());
            // Seeding again leaves the existing rows alone.
            assert_eq!(seed_default_settings(conn)?, 0);

            let landing = get_settings_in_group(conn, SettingGroup::Landing)?;
            assert_eq!(landing.len(), 4);
            assert!(landing
                .iter()
                .all(|s| s.setting_key.starts_with("landing_")));

            let completion = get_settings_in_group(conn, SettingGroup::Completion)?;
            assert_eq!(completion.len(), 5);
            Ok(())
        });
    }

    #[test]
    fn test_find_team_by_credentials() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            insert_team(conn, "Bravo", "teamB", "pw2")?;

            let found = find_team_by_credentials(conn, "teamA", "pw1")?.expect("Team not found");
            assert_eq!(found.id, team.id);
            assert_eq!(found.current_stage, 1);
            assert!(!found.completed);

            // Wrong password, unknown user, and a password belonging to another team.
            assert!(find_team_by_credentials(conn, "teamA", "nope")?.is_none());
            assert!(find_team_by_credentials(conn, "ghost", "pw1")?.is_none());
            assert!(find_team_by_credentials(conn, "teamA", "pw2")?.is_none());

            // Credentials are exact: no trimming or case folding at this layer.
            assert!(find_team_by_credentials(conn, "TEAMA", "pw1")?.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_duplicate_credentials_are_invalid() {
        run_test(|conn| {
            insert_team(conn, "Alpha", "shared", "pw")?;
            insert_team(conn, "Alpha Two", "shared", "pw")?;
            assert!(find_team_by_credentials(conn, "shared", "pw")?.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_find_admin_by_credentials() {
        run_test(|conn| {
            let admin = insert_admin(conn, "root", "hunter2")?;
            let found = find_admin_by_credentials(conn, "root", "hunter2")?.expect("Admin");
            assert_eq!(found.id, admin.id);
            assert_eq!(found.admin_name, "Coordinator");
            assert!(find_admin_by_credentials(conn, "root", "hunter3")?.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_get_team_stage() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            let stage = get_team_stage(conn, team.id, 3)?;
            assert_eq!(stage.stage_number, 3);
            assert_eq!(stage.solution, "River");
            assert_eq!(stage.location_name, "Location 3");
            assert!(!stage.is_completed);
            assert!(stage.completed_at.is_none());

            let err = get_team_stage(conn, team.id, 9).expect_err("Stage 9 should not exist");
            assert!(matches!(err, StoreError::NotFound("stage")));
            Ok(())
        });
    }

    #[test]
    fn test_record_stage_completion_advances() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            advance_team(conn, team.id, 3)?;
            let stage = get_team_stage(conn, team.id, 3)?;

            let (updated, advance) = record_stage_completion(conn, team.id, stage.id)?;
            assert_eq!(advance, Advance::Next(4));
            assert_eq!(updated.current_stage, 4);
            assert!(!updated.completed);

            let stage = get_team_stage(conn, team.id, 3)?;
            assert!(stage.is_completed);
            assert!(stage.completed_at.is_some());

            // The next stage is untouched.
            assert!(!get_team_stage(conn, team.id, 4)?.is_completed);
            Ok(())
        });
    }

    #[test]
    fn test_record_final_stage_completes_team() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            advance_team(conn, team.id, 8)?;
            let stage = get_team_stage(conn, team.id, 8)?;

            let (updated, advance) = record_stage_completion(conn, team.id, stage.id)?;
            assert_eq!(advance, Advance::Finished);
            assert!(updated.completed);
            assert_eq!(updated.current_stage, 8);
            assert!(get_team_stage(conn, team.id, 8)?.is_completed);
            Ok(())
        });
    }

    #[test]
    fn test_record_stage_completion_rejects_foreign_stage() {
        run_test(|conn| {
            let alpha = insert_team(conn, "Alpha", "teamA", "pw1")?;
            let bravo = insert_team(conn, "Bravo", "teamB", "pw2")?;
            let bravo_stage = get_team_stage(conn, bravo.id, 1)?;

            let err = record_stage_completion(conn, alpha.id, bravo_stage.id)
                .expect_err("Stage belongs to another team");
            assert!(matches!(err, StoreError::NotFound("stage")));

            // Nothing changed for either team.
            assert_eq!(get_team(conn, alpha.id)?.current_stage, 1);
            assert!(!get_team_stage(conn, bravo.id, 1)?.is_completed);
            Ok(())
        });
    }

    #[test]
    fn test_full_run_keeps_completed_invariant() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            for n in 1..=STAGE_COUNT {
                let before = get_team(conn, team.id)?;
                assert_eq!(before.current_stage, n);
                assert!(!before.completed);
                let stage = get_team_stage(conn, team.id, n)?;
                let (after, _) = record_stage_completion(conn, team.id, stage.id)?;
                assert!(!after.completed || after.current_stage == STAGE_COUNT);
            }
            let done = get_team(conn, team.id)?;
            assert!(done.completed);
            assert_eq!(done.current_stage, STAGE_COUNT);

            let completed: i64 = team_stages::table
                .filter(team_stages::team_id.eq(team.id))
                .filter(team_stages::is_completed.eq(true))
                .count()
                .get_result(conn)?;
            assert_eq!(completed, 8);
            Ok(())
        });
    }

    #[test]
    fn test_stale_submission_writes_nothing() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            let stage_three = get_team_stage(conn, team.id, 3)?;

            // Submitting ahead of the current stage is refused.
            let err = record_stage_completion(conn, team.id, stage_three.id)
                .expect_err("Stage 3 is not current");
            assert!(matches!(
                err,
                StoreError::StageOutOfTurn {
                    current: 1,
                    submitted: 3
                }
            ));
            assert!(!get_team_stage(conn, team.id, 3)?.is_completed);

            for n in 1..=5 {
                let stage = get_team_stage(conn, team.id, n)?;
                record_stage_completion(conn, team.id, stage.id)?;
            }

            // A second device still showing stage 3 cannot move the team backwards.
            let err = record_stage_completion(conn, team.id, stage_three.id)
                .expect_err("Stage 3 is already behind");
            assert!(matches!(
                err,
                StoreError::StageOutOfTurn {
                    current: 6,
                    submitted: 3
                }
            ));
            assert_eq!(get_team(conn, team.id)?.current_stage, 6);

            for n in 6..=STAGE_COUNT {
                let stage = get_team_stage(conn, team.id, n)?;
                record_stage_completion(conn, team.id, stage.id)?;
            }

            // Once finished, no stage can be recorded again.
            let completed_at = get_team_stage(conn, team.id, 3)?.completed_at;
            let err = record_stage_completion(conn, team.id, stage_three.id)
                .expect_err("Team already finished");
            assert!(matches!(err, StoreError::AlreadyCompleted));

            let done = get_team(conn, team.id)?;
            assert!(done.completed);
            assert_eq!(done.current_stage, STAGE_COUNT);
            assert_eq!(get_team_stage(conn, team.id, 3)?.completed_at, completed_at);
            Ok(())
        });
    }

    #[test]
    fn test_advance_team_rejects_out_of_range() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            let err = advance_team(conn, team.id, 9).expect_err("Stage 9 is out of range");
            assert!(matches!(err, StoreError::InvalidStage(9)));
            assert_eq!(get_team(conn, team.id)?.current_stage, 1);
            Ok(())
        });
    }

    #[test]
    fn test_reset_team_progress() {
        run_test(|conn| {
            let alpha = insert_team(conn, "Alpha", "teamA", "pw1")?;
            let bravo = insert_team(conn, "Bravo", "teamB", "pw2")?;
            for team in [&alpha, &bravo] {
                for n in 1..=2 {
                    let stage = get_team_stage(conn, team.id, n)?;
                    record_stage_completion(conn, team.id, stage.id)?;
                }
            }

            let summary = reset_team_progress(conn, alpha.id)?;
            assert_eq!(summary, ResetSummary { teams: 1, stages: 8 });

            let alpha = get_team(conn, alpha.id)?;
            assert_eq!(alpha.current_stage, 1);
            assert!(!alpha.completed);
            let stage = get_team_stage(conn, alpha.id, 1)?;
            assert!(!stage.is_completed);
            assert!(stage.completed_at.is_none());

            // The other team keeps its progress.
            assert_eq!(get_team(conn, bravo.id)?.current_stage, 3);
            assert!(get_team_stage(conn, bravo.id, 2)?.is_completed);
            Ok(())
        });
    }

    #[test]
    fn test_reset_all_progress() {
        run_test(|conn| {
            let alpha = insert_team(conn, "Alpha", "teamA", "pw1")?;
            let bravo = insert_team(conn, "Bravo", "teamB", "pw2")?;
            for n in 1..=STAGE_COUNT {
                let stage = get_team_stage(conn, alpha.id, n)?;
                record_stage_completion(conn, alpha.id, stage.id)?;
            }
            let stage = get_team_stage(conn, bravo.id, 1)?;
            record_stage_completion(conn, bravo.id, stage.id)?;

            let summary = reset_all_progress(conn)?;
            assert_eq!(summary, ResetSummary { teams: 2, stages: 16 });

            for team in get_all_teams(conn)? {
                assert_eq!(team.current_stage, 1);
                assert!(!team.completed);
            }
            for stage in get_all_stages(conn)? {
                assert!(!stage.is_completed);
                assert!(stage.completed_at.is_none());
            }
            Ok(())
        });
    }

    #[test]
    fn test_update_team_field() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            assert_eq!(update_team_field(conn, team.id, TeamField::Password, "pw9")?, 1);
            update_team_field(conn, team.id, TeamField::TeamName, "Alpha Prime")?;

            assert!(find_team_by_credentials(conn, "teamA", "pw1")?.is_none());
            let found = find_team_by_credentials(conn, "teamA", "pw9")?.expect("Team");
            assert_eq!(found.team_name, "Alpha Prime");
            // Progress is not touched by credential edits.
            assert_eq!(found.current_stage, 1);

            assert_eq!(update_team_field(conn, 999, TeamField::Username, "x")?, 0);
            Ok(())
        });
    }

    #[test]
    fn test_update_admin_field() {
        run_test(|conn| {
            let admin = insert_admin(conn, "root", "hunter2")?;
            update_admin_field(conn, admin.id, AdminField::Username, "boss")?;
            update_admin_field(conn, admin.id, AdminField::AdminName, "Head Judge")?;
            let found = find_admin_by_credentials(conn, "boss", "hunter2")?.expect("Admin");
            assert_eq!(found.admin_name, "Head Judge");
            Ok(())
        });
    }

    #[test]
    fn test_update_stage_field() {
        run_test(|conn| {
            let team = insert_team(conn, "Alpha", "teamA", "pw1")?;
            let stage = get_team_stage(conn, team.id, 5)?;
            update_stage_field(conn, stage.id, StageField::Solution, "Lighthouse")?;
            update_stage_field(conn, stage.id, StageField::LocationName, "Old pier")?;

            let stage = get_team_stage(conn, team.id, 5)?;
            assert_eq!(stage.solution, "Lighthouse");
            assert_eq!(stage.location_name, "Old pier");
            Ok(())
        });
    }

    #[test]
    fn test_update_setting() {
        run_test(|conn| {
            seed_default_settings(conn)?;
            let before = get_settings_in_group(conn, SettingGroup::Completion)?;
            let title = before
                .iter()
                .find(|s| s.setting_key == "completion_title")
                .expect("Title setting");

            update_setting(conn, title.id, "You Did It")?;

            let after = get_settings_in_group(conn, SettingGroup::Completion)?;
            let updated = after
                .iter()
                .find(|s| s.id == title.id)
                .expect("Title setting");
            assert_eq!(updated.setting_value, "You Did It");
            assert!(updated.updated_at >= title.updated_at);
            Ok(())
        });
    }

    #[test]
    fn test_listings_are_ordered() {
        run_test(|conn| {
            insert_team(conn, "Charlie", "teamC", "pw3")?;
            insert_team(conn, "Alpha", "teamA", "pw1")?;
            let names: Vec<String> = get_all_teams(conn)?
                .into_iter()
                .map(|t| t.team_name)
                .collect();
            assert_eq!(names, vec!["Alpha", "Charlie"]);

            let stages = get_all_stages(conn)?;
            assert_eq!(stages.len(), 16);
            assert!(stages
                .windows(2)
                .all(|w| w[0].stage_number <= w[1].stage_number));
            Ok(())
        });
    }
}
