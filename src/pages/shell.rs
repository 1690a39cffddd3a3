//! Document shell shared by every rendered page.

use leptos::prelude::*;

pub const SITE_TITLE: &str = "LimpopoConnect 2.0";
pub const SITE_DESCRIPTION: &str = "Secure dating and classifieds platform for Limpopo province";

/// `<html>` wrapper that owns document-level metadata.
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <meta name="description" content=SITE_DESCRIPTION/>
                <title>{SITE_TITLE}</title>
                <link rel="stylesheet" href="/style/site.css"/>
            </head>
            <body class="antialiased bg-gray-50 text-gray-900">{children()}</body>
        </html>
    }
}
