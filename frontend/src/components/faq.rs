use yew::prelude::*;
use web_sys::MouseEvent;
use yew::{Children, Properties};

#[derive(Properties, PartialEq)]
pub struct FaqItemProps {
    pub question: String,
    #[prop_or_default]
    pub reduced_motion: bool,
    pub children: Children,
}

#[function_component(FaqItem)]
pub fn faq_item(props: &FaqItemProps) -> Html {
    let is_open = use_state(|| false);

    let toggle = {
        let is_open = is_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            is_open.set(!*is_open);
        })
    };

    // slide only when opening, and never for reduced motion
    let answer_style = if *is_open && !props.reduced_motion {
        "animation: slideUp .3s ease forwards"
    } else {
        ""
    };

    html! {
        <div class={classes!("faq-item", (*is_open).then(|| "active"))}>
            <button
                class="faq-question"
                onclick={toggle}
                aria-expanded={if *is_open { "true" } else { "false" }}
            >
                <span class="question-text">{&props.question}</span>
                <span class="toggle-icon">{if *is_open { "−" } else { "+" }}</span>
            </button>
            <div class="faq-answer" style={answer_style}>
                { for props.children.iter() }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FaqProps {
    #[prop_or_default]
    pub reduced_motion: bool,
}

#[function_component(Faq)]
pub fn faq(props: &FaqProps) -> Html {
    let reduced_motion = props.reduced_motion;
    html! {
        <div class="faq-list">
            <FaqItem question="How long does an installation take?" reduced_motion={reduced_motion}>
                <p>{"Most home systems are mounted and connected within two days. Larger commercial roofs are scheduled after a site survey."}</p>
            </FaqItem>
            <FaqItem question="Do panels still work on cloudy days?" reduced_motion={reduced_motion}>
                <p>{"Yes. Output drops under heavy cloud, but modern panels keep producing from diffuse light, and the battery covers the evening peak."}</p>
            </FaqItem>
            <FaqItem question="What maintenance is needed?" reduced_motion={reduced_motion}>
                <p>{"A yearly inspection and an occasional rinse. Every system includes remote monitoring, so we usually spot problems before you do."}</p>
            </FaqItem>
            <FaqItem question="Is financing available?" reduced_motion={reduced_motion}>
                <p>{"We offer fixed-rate plans over five or ten years. The request form below is the quickest way to get a quote."}</p>
            </FaqItem>
            <style>
                {r#"
                .faq-list {
                    max-width: 760px;
                    margin: 0 auto;
                }
                .faq-item {
                    border-bottom: 1px solid rgba(255, 255, 255, 0.12);
                }
                .faq-question {
                    width: 100%;
                    display: flex;
                    justify-content: space-between;
                    align-items: center;
                    padding: 1.2rem 0;
                    background: none;
                    border: none;
                    color: inherit;
                    font-size: 1.1rem;
                    text-align: left;
                    cursor: pointer;
                }
                .faq-answer {
                    display: none;
                    padding-bottom: 1.2rem;
                    color: #c8c8c8;
                }
                .faq-item.active .faq-answer {
                    display: block;
                }
                @keyframes slideUp {
                    from { opacity: 0; transform: translateY(8px); }
                    to { opacity: 1; transform: translateY(0); }
                }
                "#}
            </style>
        </div>
    }
}
