//! Browser entry point: mounts the demo app.

use force_layout::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
