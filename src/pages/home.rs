use leptos::prelude::*;
use log::info;

use crate::components::force_layout::{
	ContextAction, ForceLayout, GraphData, GraphLink, GraphNode, LayoutMode,
};

/// Generate sample graph data (random tree, deterministic per size).
fn generate_sample_data(n: usize) -> GraphData {
	let mut data = GraphData::default();
	append_synthetic(&mut data, n);
	data
}

/// Append `count` nodes, each linked to an earlier one.
fn append_synthetic(data: &mut GraphData, count: usize) {
	let start = data.nodes.len();
	for i in start..start + count {
		data.nodes.push(GraphNode::new(i.to_string()));
		if i > 0 {
			let target = (rand_simple(i) * (i as f64)) as usize;
			data.links.push(GraphLink::new(i.to_string(), target.to_string()));
		}
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Graph page; the route picks the layout variant.
#[component]
pub fn Home(
	#[prop(default = LayoutMode::Animated)] mode: LayoutMode,
	#[prop(default = false)] bundled: bool,
) -> impl IntoView {
	let graph = RwSignal::new(generate_sample_data(60));
	let on_mutate = Callback::new(move |()| {
		graph.update(|data| append_synthetic(data, 5));
	});
	let on_option = Callback::new(|action: ContextAction| {
		info!(
			"you've clicked {} for node: {}",
			action.option.name(),
			action.node_id
		);
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceLayout
					data=graph
					fullscreen=true
					mode=mode
					bundled=bundled
					on_option=on_option
					on_mutate=on_mutate
				/>
				<div class="graph-overlay">
					<h1>"Force-Directed Graph"</h1>
					<p class="subtitle">
						"Hover to highlight neighbours. Click a node for its menu. Scroll to zoom. Drag background to pan."
					</p>
					<nav>
						<a href="/">"Live"</a>
						" | "
						<a href="/static">"Static"</a>
						" | "
						<a href="/bundled">"Bundled"</a>
					</nav>
				</div>
			</div>
		</ErrorBoundary>
	}
}
