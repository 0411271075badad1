use leptos::ev::SubmitEvent;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::{use_location, use_navigate},
    path, NavigateOptions,
};
use rand::prelude::*;
use rand::rng;

use crate::admin::AdminDashboard;
use crate::api::{get_site_copy, get_team_stage, login_admin, login_team, record_stage_completion};
use crate::components::{
    ButtonSize, ButtonVariant, CyberButton, CyberCard, CyberInput, GlowColor, LevelTitle, Notices,
    Page, Spinner, Toaster, use_notices,
};
use crate::game::{judge, progress_dots, team_landing, DotState};
use crate::model::{CompletionCopy, LandingCopy, SettingGroup, STAGE_COUNT};
use crate::session::{use_session, Protected, Role, SessionStore};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();
    SessionStore::provide();
    Notices::provide();

    view! {
        // injects a stylesheet into the document <head>
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/datahunt.css" />

        <Title text="Data Hunt | IGNITRON 2K25" />

        <Toaster />
        <Router>
            <Routes fallback=|| view! { <NotFound /> }>
                <Route path=path!("/") view=Landing />
                <Route path=path!("/login") view=TeamLogin />
                <Route path=path!("/admin-login") view=AdminLogin />
                <Route
                    path=path!("/game")
                    view=|| {
                        view! {
                            <Protected role=Role::Team>
                                <Game />
                            </Protected>
                        }
                    }
                />
                <Route
                    path=path!("/completion")
                    view=|| {
                        view! {
                            <Protected role=Role::Team>
                                <Completion />
                            </Protected>
                        }
                    }
                />
                <Route
                    path=path!("/admin")
                    view=|| {
                        view! {
                            <Protected role=Role::Admin>
                                <AdminDashboard />
                            </Protected>
                        }
                    }
                />
            </Routes>
        </Router>
    }
}

fn replace() -> NavigateOptions {
    NavigateOptions {
        replace: true,
        ..Default::default()
    }
}

#[component]
fn Landing() -> impl IntoView {
    let copy = Resource::new(|| (), |_| get_site_copy(SettingGroup::Landing));

    view! {
        <Page>
            <LevelTitle />
            <CyberCard class="landing-card">
                <Suspense fallback=|| {
                    view! { <Spinner small=true /> }
                }>
                    {move || {
                        copy.with(|maybe_result| {
                            // Missing or unreadable settings fall back to the shipped copy.
                            let copy = match maybe_result {
                                Some(Ok(settings)) => LandingCopy::from_settings(settings),
                                _ => LandingCopy::default(),
                            };
                            let [line1, line2, line3, line4] = copy.lines;
                            view! {
                                <div class="landing-lines">
                                    <p>{line1}</p>
                                    <p>{line2}</p>
                                    <p>{line3}</p>
                                    <p class="accent">{line4}</p>
                                </div>
                            }
                        })
                    }}
                </Suspense>
            </CyberCard>
            <div class="landing-actions">
                <a href="/login" class="cyber-btn cyber-btn-primary cyber-btn-lg cyber-btn-glow">
                    "Start Hunt"
                </a>
                <a href="/admin-login" class="cyber-btn cyber-btn-ghost cyber-btn-lg cyber-btn-glow">
                    "Admin Panel"
                </a>
            </div>
        </Page>
    }
}

/// Shared body of the two login screens.
#[component]
fn LoginCard(
    title: &'static str,
    subtitle: &'static str,
    footer: &'static str,
    glow: GlowColor,
    username: RwSignal<String>,
    password: RwSignal<String>,
    error: RwSignal<String>,
    loading: RwSignal<bool>,
    on_submit: impl FnMut(SubmitEvent) + Send + 'static,
) -> impl IntoView {
    view! {
        <a href="/" class="back-link">
            "← Back"
        </a>
        <LevelTitle />
        <CyberCard glow=glow class="login-card">
            <h2 class="login-title">{title}</h2>
            <p class="login-subtitle">{subtitle}</p>
            <form class="login-form" on:submit=on_submit>
                <CyberInput
                    label="Username"
                    value=username
                    placeholder="Enter username"
                    autocomplete="username"
                    on_input=move |value: String| username.set(value)
                />
                <CyberInput
                    label="Password"
                    value=password
                    input_type="password"
                    placeholder="Enter password"
                    autocomplete="current-password"
                    on_input=move |value: String| password.set(value)
                />
                {move || {
                    let message = error.get();
                    (!message.is_empty())
                        .then(|| view! { <div class="form-error">{message}</div> })
                }}
                <CyberButton
                    button_type="submit"
                    size=ButtonSize::Lg
                    class="full-width"
                    disabled=loading
                >
                    {move || if loading.get() { "Authenticating..." } else { "Secure Login" }}
                </CyberButton>
            </form>
            <p class="login-footer">{footer}</p>
        </CyberCard>
    }
}

/// Trims both credentials, or returns the message for an empty field.
fn read_credentials(
    username: RwSignal<String>,
    password: RwSignal<String>,
) -> Result<(String, String), &'static str> {
    let username = username.get_untracked().trim().to_string();
    let password = password.get_untracked().trim().to_string();
    if username.is_empty() || password.is_empty() {
        Err("Please enter both username and password")
    } else {
        Ok((username, password))
    }
}

#[component]
fn TeamLogin() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let loading = RwSignal::new(false);

    // Already logged in, or just logged in: go to the team's screen.
    let navigate = use_navigate();
    Effect::new(move || {
        if let Some(team) = session.team() {
            navigate(team_landing(&team), replace());
        }
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(String::new());
        let (u, p) = match read_credentials(username, password) {
            Ok(credentials) => credentials,
            Err(message) => {
                error.set(message.to_string());
                return;
            }
        };
        loading.set(true);
        spawn_local(async move {
            match login_team(u, p).await {
                Ok(Some(team)) => {
                    notices.success(format!("Welcome, {}!", team.team_name));
                    session.login_team(team);
                }
                Ok(None) => error.set("Invalid credentials. No new registrations allowed.".to_string()),
                Err(e) => {
                    log!("Team login failed: {}", e);
                    notices.error("Login failed. Please try again.");
                }
            }
            loading.set(false);
        });
    };

    view! {
        <Page>
            <LoginCard
                title="Team Login"
                subtitle="Secure Access Only — No Sign Up"
                footer="Only Selected Teams Can Access"
                glow=GlowColor::Primary
                username=username
                password=password
                error=error
                loading=loading
                on_submit=submit
            />
        </Page>
    }
}

#[component]
fn AdminLogin() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let loading = RwSignal::new(false);

    let navigate = use_navigate();
    Effect::new(move || {
        if session.admin().is_some() {
            navigate(Role::Admin.home_path(), replace());
        }
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(String::new());
        let (u, p) = match read_credentials(username, password) {
            Ok(credentials) => credentials,
            Err(message) => {
                error.set(message.to_string());
                return;
            }
        };
        loading.set(true);
        spawn_local(async move {
            match login_admin(u, p).await {
                Ok(Some(admin)) => {
                    notices.success(format!("Welcome, {}!", admin.admin_name));
                    session.login_admin(admin);
                }
                Ok(None) => error.set("Invalid admin credentials".to_string()),
                Err(e) => {
                    log!("Admin login failed: {}", e);
                    notices.error("Login failed. Please try again.");
                }
            }
            loading.set(false);
        });
    };

    view! {
        <Page>
            <LoginCard
                title="Admin Login"
                subtitle="Authorized Personnel Only"
                footer="Event Coordinators Only"
                glow=GlowColor::Secondary
                username=username
                password=password
                error=error
                loading=loading
                on_submit=submit
            />
        </Page>
    }
}

/// The eight-dot progress strip.
#[component]
fn StageStrip(#[prop(into)] current_stage: Signal<i32>, #[prop(into)] completed: Signal<bool>) -> impl IntoView {
    view! {
        <div class="stage-strip">
            {move || {
                progress_dots(current_stage.get(), completed.get())
                    .into_iter()
                    .map(|(n, state)| {
                        let label = match state {
                            DotState::Done => "✓".to_string(),
                            DotState::Current => n.to_string(),
                            DotState::Locked => "🔒".to_string(),
                        };
                        view! { <div class=state.class()>{label}</div> }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[component]
fn Game() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let answer = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);

    // (team id, current stage, completed); a change refetches the stage.
    let progress = Memo::new(move |_| {
        session
            .team()
            .map(|t| (t.id, t.current_stage, t.completed))
    });

    let navigate = use_navigate();
    Effect::new(move || {
        if let Some((_, _, true)) = progress.get() {
            navigate("/completion", NavigateOptions::default());
        }
    });

    let stage = Resource::new(
        move || progress.get(),
        |progress| async move {
            match progress {
                Some((team_id, stage_number, false)) => {
                    get_team_stage(team_id, stage_number).await.map(Some)
                }
                _ => Ok(None),
            }
        },
    );

    Effect::new(move || {
        if let Some(Err(e)) = stage.get() {
            log!("Failed to load stage: {}", e);
            notices.error("Failed to load stage");
        }
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        error.set(String::new());
        let Some(current) = stage.get_untracked().and_then(Result::ok).flatten() else {
            return;
        };
        let Some(team) = session.team_untracked() else {
            return;
        };
        if let Some(message) = judge(&answer.get_untracked(), &current.solution).message() {
            error.set(message.to_string());
            return;
        }

        submitting.set(true);
        spawn_local(async move {
            match record_stage_completion(team.id, current.id).await {
                Ok(updated) => {
                    if updated.completed {
                        notices.success("Congratulations! You completed all stages!");
                    } else {
                        notices.success(format!(
                            "Stage {} completed! Moving to Stage {}",
                            current.stage_number, updated.current_stage
                        ));
                        answer.set(String::new());
                    }
                    session.update_team(move |_| updated);
                }
                Err(e) => {
                    log!("Failed to record stage {}: {}", current.stage_number, e);
                    notices.error("Failed to save progress. Please try again.");
                }
            }
            submitting.set(false);
        });
    };

    let current_stage = Signal::derive(move || progress.get().map(|p| p.1).unwrap_or(1));

    view! {
        <Page>
            <LevelTitle />
            <StageStrip current_stage=current_stage completed=false />
            <Suspense fallback=|| view! { <Spinner /> }>
                {move || match stage.get() {
                    Some(Ok(Some(stage))) => {
                        let is_last = stage.stage_number == STAGE_COUNT;
                        let variant = if is_last {
                            ButtonVariant::Accent
                        } else {
                            ButtonVariant::Primary
                        };
                        view! {
                            <CyberCard class="stage-card">
                                <h2 class="stage-title">"Stage " {stage.stage_number}</h2>
                                <div class="stage-location">
                                    <span class="pin">"📍"</span>
                                    <span>{stage.location_name}</span>
                                </div>
                                <form class="stage-form" on:submit=submit>
                                    <CyberInput
                                        label="Enter Solution"
                                        value=answer
                                        placeholder="Type your answer here..."
                                        error=error
                                        on_input=move |value: String| answer.set(value)
                                    />
                                    <CyberButton
                                        button_type="submit"
                                        variant=variant
                                        size=ButtonSize::Lg
                                        class="full-width"
                                        disabled=submitting
                                    >
                                        {move || {
                                            if submitting.get() {
                                                "Verifying..."
                                            } else if is_last {
                                                "SUBMIT"
                                            } else {
                                                "NEXT STAGE"
                                            }
                                        }}
                                    </CyberButton>
                                </form>
                            </CyberCard>
                        }
                            .into_any()
                    }
                    _ => view! { <Spinner /> }.into_any(),
                }}
            </Suspense>
        </Page>
    }
}

/// Position and look of one decorative sparkle on the completion screen.
#[derive(Debug, Clone)]
struct Sparkle {
    style: String,
}

impl Sparkle {
    fn random(rng: &mut impl Rng) -> Self {
        let size = rng.random_range(10.0..30.0);
        Sparkle {
            style: format!(
                "left: {:.1}%; top: {:.1}%; animation-delay: {:.2}s; opacity: {:.2}; width: {:.0}px; height: {:.0}px;",
                rng.random_range(0.0..100.0),
                rng.random_range(0.0..100.0),
                rng.random_range(0.0..2.0),
                rng.random_range(0.2..0.7),
                size,
                size,
            ),
        }
    }
}

#[component]
fn Completion() -> impl IntoView {
    let session = use_session();

    // Only teams that finished belong here.
    let navigate = use_navigate();
    Effect::new(move || {
        if !session.team().is_some_and(|t| t.completed) {
            navigate("/", replace());
        }
    });

    let copy = Resource::new(|| (), |_| get_site_copy(SettingGroup::Completion));

    // Positions are random, so they are only generated in the browser.
    let sparkles = RwSignal::new(Vec::<Sparkle>::new());
    Effect::new(move || {
        let mut rng = rng();
        sparkles.set((0..20).map(|_| Sparkle::random(&mut rng)).collect());
    });

    view! {
        <Page>
            <LevelTitle />
            <div class="sparkles">
                {move || {
                    sparkles
                        .get()
                        .into_iter()
                        .map(|sparkle| view! { <span class="sparkle" style=sparkle.style>"✦"</span> })
                        .collect_view()
                }}
            </div>
            <CyberCard glow=GlowColor::Accent animate=true class="completion-card">
                <div class="trophy">"🏆"</div>
                <Suspense fallback=|| view! { <Spinner small=true /> }>
                    {move || {
                        copy.with(|maybe_result| {
                            let copy = match maybe_result {
                                Some(Ok(settings)) => CompletionCopy::from_settings(settings),
                                _ => CompletionCopy::default(),
                            };
                            let [line1, line2, line3, line4] = copy.lines;
                            view! {
                                <div class="completion-copy">
                                    <h1>{copy.title}</h1>
                                    <p class="lead">{line1}</p>
                                    <p class="muted">{line2}</p>
                                    <p class="cipher">{line3}</p>
                                    <p class="accent">{line4}</p>
                                </div>
                            }
                        })
                    }}
                </Suspense>
            </CyberCard>
        </Page>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    let location = use_location();
    Effect::new(move || {
        log!(
            "404 Error: User attempted to access non-existent route: {}",
            location.pathname.get()
        );
    });

    #[cfg(feature = "ssr")]
    {
        if let Some(resp) = use_context::<leptos_axum::ResponseOptions>() {
            resp.set_status(axum::http::StatusCode::NOT_FOUND);
        }
    }

    view! {
        <Page>
            <div class="not-found">
                <h1>"404"</h1>
                <p>"Oops! Page not found"</p>
                <a href="/">"Return to Home"</a>
            </div>
        </Page>
    }
}
