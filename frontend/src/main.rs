use std::rc::Rc;

use log::info;
use yew::prelude::*;

mod config;
mod error;
mod engine {
    pub mod signal;
    pub mod scroll;
    pub mod nav;
    pub mod header;
    pub mod visibility;
    pub mod reveal;
    pub mod counter;
}
mod host {
    pub mod dom;
    pub mod observer;
    pub mod frames;
    pub mod focus;
    pub mod images;
    pub mod session;
}
mod components {
    pub mod faq;
    pub mod contact_form;
    pub mod live_region;
    pub mod floating_contact;
}
mod pages {
    pub mod landing;
}

use components::floating_contact::FloatingContact;
use components::live_region::LiveRegion;
use config::PageConfig;
use engine::visibility::MotionPreference;
use pages::landing::Landing;

#[function_component]
fn App() -> Html {
    // Both are read once per visit; later changes need a reload
    let config = use_state(|| {
        let document = web_sys::window().and_then(|w| w.document());
        Rc::new(PageConfig::load(document.as_ref()))
    });
    let reduced_motion = use_state(|| {
        host::dom::window()
            .map(|w| host::dom::motion_preference(&w) == MotionPreference::Reduced)
            .unwrap_or(false)
    });
    let announcement = use_state(|| None::<String>);
    // stable across renders so a new message doesn't re-render the page
    let announce = use_callback(
        |message: String, setter: &yew::functional::UseStateSetter<Option<String>>| {
            setter.set(Some(message))
        },
        announcement.setter(),
    );

    html! {
        <>
            <Landing
                config={(*config).clone()}
                reduced_motion={*reduced_motion}
                announce={announce}
            />
            <FloatingContact href={config.contact_url.clone()} />
            <LiveRegion message={(*announcement).clone()} />
        </>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting landing page");
    yew::Renderer::<App>::new().render();
}
