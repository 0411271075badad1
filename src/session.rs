//! Client-side identity: at most one of team or admin, kept in tab-scoped browser storage.
//!
//! The session is never re-validated against the backend. Whoever holds a snapshot in
//! `sessionStorage` is treated as logged in until they log out.

use leptos::prelude::*;
use leptos_router::components::Redirect;

use crate::components::Spinner;
use crate::model::{AdminIdentity, TeamIdentity};

/// Storage key for the team snapshot.
pub const TEAM_KEY: &str = "datahunt_team";
/// Storage key for the admin snapshot.
pub const ADMIN_KEY: &str = "datahunt_admin";

/// Who is using this tab.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Team(TeamIdentity),
    Admin(AdminIdentity),
}

/// Access level a protected view requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Team,
    Admin,
}

impl Role {
    pub fn login_path(self) -> &'static str {
        match self {
            Role::Team => "/login",
            Role::Admin => "/admin-login",
        }
    }

    pub fn home_path(self) -> &'static str {
        match self {
            Role::Team => "/game",
            Role::Admin => "/admin",
        }
    }
}

impl Session {
    pub fn team(&self) -> Option<&TeamIdentity> {
        match self {
            Session::Team(team) => Some(team),
            _ => None,
        }
    }

    pub fn admin(&self) -> Option<&AdminIdentity> {
        match self {
            Session::Admin(admin) => Some(admin),
            _ => None,
        }
    }

    pub fn admits(&self, role: Role) -> bool {
        match role {
            Role::Team => matches!(self, Session::Team(_)),
            Role::Admin => matches!(self, Session::Admin(_)),
        }
    }

    /// Rebuilds a session from the two storage entries. Malformed entries are ignored; if both
    /// identities are present the storage is inconsistent and nobody is logged in.
    pub fn restore(team_json: Option<&str>, admin_json: Option<&str>) -> Self {
        let team = team_json.and_then(|raw| serde_json::from_str::<TeamIdentity>(raw).ok());
        let admin = admin_json.and_then(|raw| serde_json::from_str::<AdminIdentity>(raw).ok());
        match (team, admin) {
            (Some(team), None) => Session::Team(team),
            (None, Some(admin)) => Session::Admin(admin),
            _ => Session::Anonymous,
        }
    }

    /// Values to store under `TEAM_KEY` and `ADMIN_KEY`; `None` means the key is removed.
    pub fn storage_entries(&self) -> (Option<String>, Option<String>) {
        match self {
            Session::Anonymous => (None, None),
            Session::Team(team) => (serde_json::to_string(team).ok(), None),
            Session::Admin(admin) => (None, serde_json::to_string(admin).ok()),
        }
    }
}

/// The session context, provided once by the root component.
#[derive(Debug, Clone, Copy)]
pub struct SessionStore {
    session: RwSignal<Session>,
    restored: RwSignal<bool>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            session: RwSignal::new(Session::Anonymous),
            restored: RwSignal::new(false),
        }
    }

    /// Creates the store, provides it as context, and schedules the one-time read of browser
    /// storage. Effects only run in the browser, so the server always renders an unrestored
    /// session.
    pub fn provide() -> Self {
        let store = Self::new();
        provide_context(store);
        Effect::new(move || {
            store.session.set(load());
            store.restored.set(true);
        });
        store
    }

    pub fn get(&self) -> Session {
        self.session.get()
    }

    pub fn team(&self) -> Option<TeamIdentity> {
        self.session.with(|s| s.team().cloned())
    }

    pub fn admin(&self) -> Option<AdminIdentity> {
        self.session.with(|s| s.admin().cloned())
    }

    /// Current team without subscribing, for event handlers.
    pub fn team_untracked(&self) -> Option<TeamIdentity> {
        self.session.with_untracked(|s| s.team().cloned())
    }

    pub fn is_restored(&self) -> bool {
        self.restored.get()
    }

    pub fn login_team(&self, team: TeamIdentity) {
        self.replace(Session::Team(team));
    }

    pub fn login_admin(&self, admin: AdminIdentity) {
        self.replace(Session::Admin(admin));
    }

    pub fn logout(&self) {
        self.replace(Session::Anonymous);
    }

    /// Replaces the team snapshot after a progress change. No-op unless a team is logged in.
    pub fn update_team(&self, f: impl FnOnce(&TeamIdentity) -> TeamIdentity) {
        let next = self.session.with_untracked(|s| s.team().map(f));
        if let Some(team) = next {
            self.replace(Session::Team(team));
        }
    }

    fn replace(&self, next: Session) {
        persist(&next);
        self.session.set(next);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_session() -> SessionStore {
    expect_context()
}

#[cfg(feature = "hydrate")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.session_storage().ok()?
}

#[cfg(feature = "hydrate")]
fn load() -> Session {
    let Some(storage) = storage() else {
        return Session::Anonymous;
    };
    let team = storage.get_item(TEAM_KEY).ok().flatten();
    let admin = storage.get_item(ADMIN_KEY).ok().flatten();
    Session::restore(team.as_deref(), admin.as_deref())
}

#[cfg(not(feature = "hydrate"))]
fn load() -> Session {
    Session::Anonymous
}

#[cfg(feature = "hydrate")]
fn persist(session: &Session) {
    let Some(storage) = storage() else {
        return;
    };
    let (team, admin) = session.storage_entries();
    for (key, value) in [(TEAM_KEY, team), (ADMIN_KEY, admin)] {
        let result = match value {
            Some(raw) => storage.set_item(key, &raw),
            None => storage.remove_item(key),
        };
        if let Err(e) = result {
            // The in-memory session still changes; it just won't survive a reload.
            leptos::logging::warn!("Failed to write session key {}: {:?}", key, e);
        }
    }
}

#[cfg(not(feature = "hydrate"))]
fn persist(_session: &Session) {}

/// Renders `children` only for a session holding `role`; anyone else is sent to that role's
/// login page. Shows a spinner until browser storage has been read.
#[component]
pub fn Protected(role: Role, children: ChildrenFn) -> impl IntoView {
    let store = use_session();
    // Only re-render when access flips, not on every snapshot update.
    let access = Memo::new(move |_| store.is_restored().then(|| store.get().admits(role)));

    move || match access.get() {
        None => view! { <Spinner /> }.into_any(),
        Some(true) => children().into_any(),
        Some(false) => view! { <Redirect path=role.login_path() /> }.into_any(),
    }
}
