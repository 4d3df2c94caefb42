use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LiveRegionProps {
    #[prop_or_default]
    pub message: Option<String>,
}

/// The page's one polite screen-reader region. `App` owns the message and
/// hands an announce callback to whatever needs to speak.
#[function_component(LiveRegion)]
pub fn live_region(props: &LiveRegionProps) -> Html {
    html! {
        <div class="sr-only" role="status" aria-live="polite">
            { props.message.clone().unwrap_or_default() }
        </div>
    }
}
