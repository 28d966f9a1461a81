use helpdesk::ClientConfig;
use helpdesk_frontend::{App, init_logger};
use leptos::prelude::*;

// Use lol_alloc as the global allocator for smaller WASM size
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

pub fn main() {
    console_error_panic_hook::set_once();

    let config = ClientConfig::from_build_env();
    init_logger(config.log_level);
    log::info!("[App] starting helpdesk frontend against {}", config.base_url);

    mount_to_body(move || view! { <App config=config.clone() /> });
}
