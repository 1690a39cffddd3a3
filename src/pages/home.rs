//! Landing page for visitors who are not signed in.

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-gradient-to-br from-blue-50 to-indigo-100">
            <header class="bg-white shadow-sm">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                    <div class="flex justify-between items-center py-4">
                        <h1 class="text-2xl font-bold text-gray-900">"LimpopoConnect 2.0"</h1>
                        <nav class="space-x-4">
                            <a href="/login" class="text-gray-600 hover:text-gray-900">"Login"</a>
                            <a
                                href="/register"
                                class="bg-indigo-600 text-white px-4 py-2 rounded-md hover:bg-indigo-700"
                            >
                                "Register"
                            </a>
                        </nav>
                    </div>
                </div>
            </header>

            <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-12">
                <div class="text-center">
                    <h2 class="text-4xl font-extrabold text-gray-900 sm:text-5xl">"Connect in Limpopo"</h2>
                    <p class="mt-4 text-xl text-gray-600">
                        "Safe, secure dating and classifieds platform for meaningful connections."
                    </p>
                    <div class="mt-8">
                        <a
                            href="/ads"
                            class="bg-indigo-600 text-white px-6 py-3 rounded-md text-lg hover:bg-indigo-700"
                        >
                            "Browse Ads"
                        </a>
                    </div>
                </div>

                <div class="mt-16 grid grid-cols-1 md:grid-cols-3 gap-8">
                    <FeatureCard title="Dating" blurb="Find meaningful relationships in your community."/>
                    <FeatureCard title="Classifieds" blurb="Buy, sell, and trade with locals."/>
                    <FeatureCard title="Community" blurb="Connect with people in Limpopo province."/>
                </div>
            </main>

            <footer class="bg-gray-800 text-white py-8">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 text-center">
                    <p>"© 2024 LimpopoConnect 2.0. All rights reserved."</p>
                </div>
            </footer>
        </div>
    }
}

#[component]
fn FeatureCard(title: &'static str, blurb: &'static str) -> impl IntoView {
    view! {
        <div class="bg-white p-6 rounded-lg shadow-md">
            <h3 class="text-xl font-semibold text-gray-900">{title}</h3>
            <p class="mt-2 text-gray-600">{blurb}</p>
        </div>
    }
}
