//! Transactional email bodies.
//!
//! Rendered through the same SSR path as the pages, so addresses and links are
//! escaped by the view layer. Styles are inline because mail clients drop
//! `<link>` stylesheets.

use leptos::prelude::*;

pub const PASSWORD_RESET_SUBJECT: &str = "Reset your LimpopoConnect password";

#[component]
fn PasswordResetEmail(email: String, link: String) -> impl IntoView {
    let href = link.clone();
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <title>{PASSWORD_RESET_SUBJECT}</title>
            </head>
            <body style="margin:0;padding:32px 0;background:#f9fafb;font-family:Inter,Arial,sans-serif;color:#111827;">
                <div style="max-width:480px;margin:0 auto;background:#ffffff;border-radius:8px;padding:32px;">
                    <h1 style="font-size:22px;margin:0 0 16px;">"LimpopoConnect 2.0"</h1>
                    <p style="margin:0 0 16px;">
                        "A password reset was requested for " <strong>{email}</strong> "."
                    </p>
                    <p style="margin:0 0 24px;">
                        <a
                            href=href
                            style="background:#4f46e5;color:#ffffff;padding:12px 20px;border-radius:6px;text-decoration:none;"
                        >
                            "Reset your password"
                        </a>
                    </p>
                    <p style="margin:0 0 16px;font-size:13px;color:#6b7280;">
                        "If the button does not work, open this address: " {link}
                    </p>
                    <p style="margin:0;font-size:13px;color:#6b7280;">
                        "If you did not ask for this, you can ignore this email. The link expires soon and works once."
                    </p>
                </div>
            </body>
        </html>
    }
}

/// Render the password reset email for `email` pointing at `link`.
#[must_use]
pub fn render_password_reset_email(email: &str, link: &str) -> String {
    let email = email.to_owned();
    let link = link.to_owned();
    let owner = Owner::new();
    owner.with(|| view! { <PasswordResetEmail email=email link=link/> }.to_html())
}
