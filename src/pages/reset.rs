//! Password reset form reached from the emailed link.
//!
//! The form posts `application/x-www-form-urlencoded` back to
//! `/reset-password`, so it works without any client-side script.

use leptos::prelude::*;

#[component]
fn ResetFrame(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-gradient-to-br from-blue-50 to-indigo-100">
            <header class="bg-white shadow-sm">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-4">
                    <a href="/" class="text-2xl font-bold text-gray-900">"LimpopoConnect 2.0"</a>
                </div>
            </header>
            <main class="max-w-md mx-auto px-4 py-12">
                <div class="bg-white p-6 rounded-lg shadow-md">{children()}</div>
            </main>
        </div>
    }
}

/// Form for choosing a new password. `error` is shown above the form after a
/// rejected submission.
#[component]
pub fn ResetPasswordPage(token: String, error: Option<String>) -> impl IntoView {
    view! {
        <ResetFrame>
            <h2 class="text-xl font-semibold text-gray-900">"Choose a new password"</h2>
            {error.map(|message| view! { <p class="mt-4 text-sm text-red-600" role="alert">{message}</p> })}
            <form method="post" action="/reset-password" class="mt-4 space-y-4">
                <input type="hidden" name="token" value=token/>
                <label class="block text-sm font-medium text-gray-600" for="new_password">
                    "New password"
                </label>
                <input
                    id="new_password"
                    name="new_password"
                    type="password"
                    required=true
                    minlength="8"
                    autocomplete="new-password"
                    class="block w-full mt-1 px-3 py-2 border border-gray-300 rounded-md"
                />
                <button type="submit" class="w-full bg-indigo-600 text-white px-4 py-2 rounded-md hover:bg-indigo-700">
                    "Reset password"
                </button>
            </form>
        </ResetFrame>
    }
}

#[component]
pub fn ResetCompletePage() -> impl IntoView {
    view! {
        <ResetFrame>
            <h2 class="text-xl font-semibold text-gray-900">"Password updated"</h2>
            <p class="mt-2 text-gray-600">
                "Your password has been changed and all existing sessions were signed out."
            </p>
        </ResetFrame>
    }
}
