//! Leptos client-side app wiring and routes, plus the force-directed graph
//! component they host.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod pages;

// Top-Level pages
use crate::components::force_layout::LayoutMode;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router with one route per layout variant and a 404 fallback.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Force Layout" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=|| view! { <Home /> } />
				<Route
					path=path!("/static")
					view=|| view! { <Home mode=LayoutMode::Settled /> }
				/>
				<Route
					path=path!("/bundled")
					view=|| view! { <Home mode=LayoutMode::Settled bundled=true /> }
				/>
			</Routes>
		</Router>
	}
}
