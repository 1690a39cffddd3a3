//! Server-rendered pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages are static markup rendered with Leptos in SSR mode. There is no
//! hydration bundle: the landing page has nothing interactive and the reset
//! form is a plain HTML form, so the HTML is produced once per request and
//! returned as-is.

pub mod email;
pub mod home;
pub mod reset;
pub mod shell;

use leptos::prelude::*;

use home::HomePage;
use reset::{ResetCompletePage, ResetPasswordPage};
use shell::Shell;

/// Render the full landing document (shell + home page).
#[must_use]
pub fn render_home() -> String {
    let owner = Owner::new();
    owner.with(|| {
        view! {
            <Shell>
                <HomePage/>
            </Shell>
        }
        .to_html()
    })
}

/// Render the reset form for `token`, optionally with an error message.
#[must_use]
pub fn render_reset_password(token: &str, error: Option<&str>) -> String {
    let token = token.to_owned();
    let error = error.map(str::to_owned);
    let owner = Owner::new();
    owner.with(|| {
        view! {
            <Shell>
                <ResetPasswordPage token=token error=error/>
            </Shell>
        }
        .to_html()
    })
}

/// Render the confirmation shown after a successful form reset.
#[must_use]
pub fn render_reset_complete() -> String {
    let owner = Owner::new();
    owner.with(|| {
        view! {
            <Shell>
                <ResetCompletePage/>
            </Shell>
        }
        .to_html()
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
