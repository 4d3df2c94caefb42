use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FloatingContactProps {
    pub href: String,
}

#[function_component(FloatingContact)]
pub fn floating_contact(props: &FloatingContactProps) -> Html {
    let hovered = use_state(|| false);

    let onmouseenter = {
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| hovered.set(true))
    };
    let onmouseleave = {
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| hovered.set(false))
    };

    // in-page anchors stay in the tab, anything else opens a new one
    let external = !props.href.starts_with('#');

    html! {
        <a
            href={props.href.clone()}
            class="contact-float"
            aria-label="Quick contact"
            target={external.then(|| "_blank")}
            rel={external.then(|| "noopener")}
            style={if *hovered { "transform: scale(1.05)" } else { "" }}
            onmouseenter={onmouseenter}
            onmouseleave={onmouseleave}
        >
            {"💬"}
            <style>
                {r#"
                .contact-float {
                    position: fixed;
                    bottom: 1.5rem;
                    right: 1.5rem;
                    width: 3.5rem;
                    height: 3.5rem;
                    border-radius: 50%;
                    display: flex;
                    align-items: center;
                    justify-content: center;
                    background: #25d366;
                    color: #fff;
                    font-size: 1.7rem;
                    text-decoration: none;
                    box-shadow: 0 8px 14px rgb(0 0 0 / .15);
                    z-index: 90;
                    transition: transform .25s ease;
                }
                "#}
            </style>
        </a>
    }
}
