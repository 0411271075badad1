use leptos::prelude::*;
use leptos_router::{hooks::use_navigate, NavigateOptions};

use crate::session::use_session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Accent,
    Ghost,
    Destructive,
}

impl ButtonVariant {
    fn class(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "cyber-btn-primary",
            ButtonVariant::Secondary => "cyber-btn-secondary",
            ButtonVariant::Accent => "cyber-btn-accent",
            ButtonVariant::Ghost => "cyber-btn-ghost",
            ButtonVariant::Destructive => "cyber-btn-destructive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl ButtonSize {
    fn class(self) -> &'static str {
        match self {
            ButtonSize::Sm => "cyber-btn-sm",
            ButtonSize::Md => "cyber-btn-md",
            ButtonSize::Lg => "cyber-btn-lg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlowColor {
    #[default]
    Primary,
    Secondary,
    Accent,
}

impl GlowColor {
    fn class(self) -> &'static str {
        match self {
            GlowColor::Primary => "glow-primary",
            GlowColor::Secondary => "glow-secondary",
            GlowColor::Accent => "glow-accent",
        }
    }
}

#[component]
pub fn CyberButton(
    #[prop(optional)] variant: ButtonVariant,
    #[prop(optional)] size: ButtonSize,
    #[prop(default = true)] glow: bool,
    #[prop(into, default = Signal::stored(false))] disabled: Signal<bool>,
    #[prop(default = "button")] button_type: &'static str,
    #[prop(into, optional)] class: String,
    #[prop(optional, into)] on_click: Option<Callback<()>>,
    children: Children,
) -> impl IntoView {
    let class = format!(
        "cyber-btn {} {}{} {}",
        variant.class(),
        size.class(),
        if glow { " cyber-btn-glow" } else { "" },
        class
    );

    view! {
        <button
            type=button_type
            class=class
            disabled=move || disabled.get()
            on:click=move |_| {
                if let Some(on_click) = on_click {
                    on_click.run(());
                }
            }
        >
            <span class="cyber-btn-label">{children()}</span>
        </button>
    }
}

#[component]
pub fn CyberCard(
    #[prop(optional)] glow: GlowColor,
    #[prop(optional)] animate: bool,
    #[prop(into, optional)] class: String,
    children: Children,
) -> impl IntoView {
    let class = format!(
        "cyber-card {}{} {}",
        glow.class(),
        if animate { " cyber-card-pulse" } else { "" },
        class
    );

    view! {
        <div class=class>
            <div class="corner corner-tl"></div>
            <div class="corner corner-tr"></div>
            <div class="corner corner-bl"></div>
            <div class="corner corner-br"></div>
            {children()}
        </div>
    }
}

/// A labelled text input. `on_input` fires per keystroke, `on_change` once the edit is committed.
#[component]
pub fn CyberInput(
    #[prop(into, optional)] label: Option<String>,
    #[prop(into)] value: Signal<String>,
    #[prop(default = "text")] input_type: &'static str,
    #[prop(optional)] placeholder: &'static str,
    #[prop(optional)] autocomplete: &'static str,
    #[prop(into, default = Signal::stored(String::new()))] error: Signal<String>,
    #[prop(optional, into)] on_input: Option<Callback<String>>,
    #[prop(optional, into)] on_change: Option<Callback<String>>,
) -> impl IntoView {
    let input_class = move || {
        if error.with(|e| e.is_empty()) {
            "cyber-input"
        } else {
            "cyber-input cyber-input-invalid"
        }
    };

    view! {
        <div class="cyber-field">
            {label.map(|label| view! { <label class="cyber-label">{label}</label> })}
            <input
                class=input_class
                type=input_type
                placeholder=placeholder
                autocomplete=autocomplete
                prop:value=move || value.get()
                on:input=move |ev| {
                    if let Some(on_input) = on_input {
                        on_input.run(event_target_value(&ev));
                    }
                }
                on:change=move |ev| {
                    if let Some(on_change) = on_change {
                        on_change.run(event_target_value(&ev));
                    }
                }
            />
            {move || {
                let message = error.get();
                (!message.is_empty())
                    .then(|| view! { <p class="cyber-input-error">{message}</p> })
            }}
        </div>
    }
}

#[component]
pub fn Spinner(#[prop(optional)] small: bool) -> impl IntoView {
    let class = if small { "spinner spinner-sm" } else { "spinner" };
    view! {
        <div class="spinner-wrap">
            <div class=class></div>
        </div>
    }
}

#[component]
pub fn LevelTitle() -> impl IntoView {
    view! {
        <div class="level-title">
            <h2>"LEVEL 3 - DATA HUNT"</h2>
        </div>
    }
}

#[component]
pub fn Watermark() -> impl IntoView {
    view! { <div class="watermark">"Engineer's Eye"</div> }
}

/// Event banner. With `show_logout` and an admin logged in, adds a row naming the admin with a
/// logout button.
#[component]
pub fn Header(#[prop(optional)] show_logout: bool) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let logout = move |_| {
        session.logout();
        navigate("/", NavigateOptions::default());
    };

    view! {
        <header class="site-header">
            <div class="site-header-row">
                <div class="logo-frame">
                    <img src="/gmu_logo.png" alt="GMU Logo" />
                </div>
                <div class="site-title">
                    <h1>"IGNITRON 2K25"</h1>
                    <p>"Engineer's Eye"</p>
                </div>
                <div class="logo-frame">
                    <img src="/sa_logo.png" alt="SA Logo" />
                </div>
            </div>
            {move || {
                session
                    .admin()
                    .filter(|_| show_logout)
                    .map(|admin| {
                        let logout = logout.clone();
                        view! {
                            <div class="site-header-admin">
                                <span>"Admin: " {admin.admin_name}</span>
                                <button class="btn-logout" on:click=logout>
                                    "Logout"
                                </button>
                            </div>
                        }
                    })
            }}
        </header>
    }
}

/// Page frame shared by every screen: header, grid background, watermark.
#[component]
pub fn Page(#[prop(optional)] show_logout: bool, children: Children) -> impl IntoView {
    view! {
        <div class="page cyber-grid">
            <Header show_logout=show_logout />
            <main class="page-main">{children()}</main>
            <Watermark />
        </div>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[cfg(feature = "hydrate")]
const NOTICE_MILLIS: u32 = 4000;

/// Transient messages shown in the corner of the screen.
#[derive(Debug, Clone, Copy)]
pub struct Notices {
    items: RwSignal<Vec<Notice>>,
    next_id: StoredValue<u64>,
}

impl Notices {
    pub fn new() -> Self {
        Notices {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn provide() -> Self {
        let notices = Self::new();
        provide_context(notices);
        notices
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    pub fn dismiss(&self, id: u64) {
        self.items.update(|items| items.retain(|n| n.id != id));
    }

    pub fn current(&self) -> Vec<Notice> {
        self.items.get()
    }

    fn push(&self, kind: NoticeKind, message: String) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.items.update(|items| items.push(Notice { id, kind, message }));

        #[cfg(feature = "hydrate")]
        {
            let notices = *self;
            leptos::task::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(NOTICE_MILLIS).await;
                notices.dismiss(id);
            });
        }
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_notices() -> Notices {
    expect_context()
}

#[component]
pub fn Toaster() -> impl IntoView {
    let notices = use_notices();

    view! {
        <div class="toaster">
            <For
                each=move || notices.current()
                key=|notice| notice.id
                children=move |notice: Notice| {
                    let class = match notice.kind {
                        NoticeKind::Success => "toast toast-success",
                        NoticeKind::Error => "toast toast-error",
                    };
                    let id = notice.id;
                    view! {
                        <div class=class on:click=move |_| notices.dismiss(id)>
                            {notice.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
