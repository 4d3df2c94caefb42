use std::rc::Rc;

use log::error;
use yew::prelude::*;

use crate::components::contact_form::ContactForm;
use crate::components::faq::Faq;
use crate::config::PageConfig;
use crate::host::session::PageSession;

#[derive(Properties, PartialEq)]
pub struct LandingProps {
    pub config: Rc<PageConfig>,
    #[prop_or_default]
    pub reduced_motion: bool,
    /// Hands messages to the page's live region.
    pub announce: Callback<String>,
}

#[function_component(Landing)]
pub fn landing(props: &LandingProps) -> Html {
    // Scroll effects hook into the markup below once it is in the DOM, and
    // are torn down with the page.
    {
        let config = props.config.clone();
        use_effect_with_deps(
            move |_| {
                let session = match PageSession::mount(&config) {
                    Ok(session) => Some(session),
                    Err(e) => {
                        error!("scroll effects disabled: {}", e);
                        None
                    }
                };
                move || drop(session)
            },
            (), // mount once, the section layout is measured a single time
        );
    }

    html! {
        <div class="landing-page">
            <header class="site-header">
                <div class="header-content">
                    <a href="#hero" class="brand">{"SolarCrest"}</a>
                    <nav>
                        <a href="#hero">{"Home"}</a>
                        <a href="#about">{"About"}</a>
                        <a href="#services">{"Services"}</a>
                        <a href="#results">{"Results"}</a>
                        <a href="#faq">{"FAQ"}</a>
                        <a href="#contact">{"Contact"}</a>
                    </nav>
                </div>
            </header>

            <main>
                <section id="hero" class="hero">
                    <div class="hero-content animate-on-scroll">
                        <h1>{"Clean power, installed right."}</h1>
                        <p class="hero-subtitle">
                            {"Rooftop solar and home batteries, designed for your roof and your bills."}
                        </p>
                        <a href="#contact" class="hero-cta">{"Get a free quote"}</a>
                    </div>
                </section>

                <section id="about" class="about">
                    <div class="section-inner animate-on-scroll">
                        <h2>{"Who we are"}</h2>
                        <p>{"A small team of electricians and engineers who have been putting panels on roofs for over a decade. We survey, design, install and monitor every system ourselves."}</p>
                        <img src="/assets/team.jpg" loading="lazy" alt="Installation crew on a rooftop" />
                    </div>
                </section>

                <section id="services" class="services">
                    <div class="section-inner">
                        <h2 class="animate-on-scroll">{"What we do"}</h2>
                        <div class="service-grid">
                            <div class="service-card animate-on-scroll">
                                <h3>{"Residential"}</h3>
                                <p>{"Panels, inverters and batteries sized to how your household actually uses power."}</p>
                            </div>
                            <div class="service-card animate-on-scroll">
                                <h3>{"Commercial"}</h3>
                                <p>{"Flat-roof and carport systems with load analysis and grid paperwork handled."}</p>
                            </div>
                            <div class="service-card animate-on-scroll">
                                <h3>{"Maintenance"}</h3>
                                <p>{"Remote monitoring, yearly inspections and fast repairs for any installer's system."}</p>
                            </div>
                        </div>
                    </div>
                </section>

                <section id="results" class="results">
                    <div class="section-inner">
                        <h2 class="animate-on-scroll">{"Results so far"}</h2>
                        <div class="stat-grid">
                            <div class="stat animate-on-scroll">
                                <span class="stat-number" data-unit="+">{"2500"}</span>
                                <span class="stat-label">{"systems installed"}</span>
                            </div>
                            <div class="stat animate-on-scroll">
                                <span class="stat-number" data-unit=" MW">{"38"}</span>
                                <span class="stat-label">{"capacity on the grid"}</span>
                            </div>
                            <div class="stat animate-on-scroll">
                                <span class="stat-number" data-unit="%">{"98"}</span>
                                <span class="stat-label">{"would recommend us"}</span>
                            </div>
                        </div>
                    </div>
                </section>

                <section id="faq" class="faq">
                    <div class="section-inner">
                        <h2 class="animate-on-scroll">{"Frequently asked questions"}</h2>
                        <Faq reduced_motion={props.reduced_motion} />
                    </div>
                </section>

                <section id="contact" class="contact">
                    <div class="section-inner animate-on-scroll">
                        <h2>{"Request a quote"}</h2>
                        <ContactForm announce={props.announce.clone()} />
                    </div>
                </section>
            </main>

            <style>{LANDING_CSS}</style>
        </div>
    }
}

// Unrevealed blocks are only hidden under `.reveal-ready`, which the page
// session sets once it is actually watching them.
const LANDING_CSS: &str = r#"
.landing-page {
    color: #f4f4f4;
    background: #0f1418;
    font-family: system-ui, sans-serif;
}
.site-header {
    position: fixed;
    top: 0;
    left: 0;
    right: 0;
    z-index: 50;
    background: rgba(15, 20, 24, 0.92);
    backdrop-filter: blur(6px);
    transition: transform .3s ease;
}
.site-header.header-hide {
    transform: translateY(-100%);
}
.header-content {
    max-width: 1200px;
    margin: 0 auto;
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 1rem 1.5rem;
}
.brand {
    color: #ffd166;
    font-weight: 700;
    text-decoration: none;
}
.site-header nav a {
    color: #c8c8c8;
    margin-left: 1.2rem;
    text-decoration: none;
    border-bottom: 2px solid transparent;
}
.site-header nav a.active {
    color: #ffffff;
    border-bottom-color: #ffd166;
}
main section {
    min-height: 80vh;
    padding: 6rem 1.5rem 4rem;
}
.section-inner {
    max-width: 1100px;
    margin: 0 auto;
}
.hero {
    display: flex;
    align-items: center;
    justify-content: center;
    min-height: 100vh;
    text-align: center;
}
.hero-cta {
    display: inline-block;
    margin-top: 2rem;
    padding: 0.9rem 2rem;
    border-radius: 999px;
    background: #ffd166;
    color: #0f1418;
    font-weight: 600;
    text-decoration: none;
}
.service-grid, .stat-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
    gap: 1.5rem;
}
.service-card {
    padding: 1.5rem;
    border-radius: 12px;
    background: rgba(255, 255, 255, 0.04);
}
.stat {
    text-align: center;
}
.stat-number {
    display: block;
    font-size: 3rem;
    font-weight: 700;
    color: #ffd166;
    font-variant-numeric: tabular-nums;
}
.animate-on-scroll {
    transition: opacity .6s ease, transform .6s ease;
}
.reveal-ready .animate-on-scroll:not(.in-view) {
    opacity: 0;
    transform: translateY(24px);
}
.contact-form {
    display: grid;
    gap: 1rem;
    max-width: 560px;
}
.form-field {
    width: 100%;
    padding: 0.7rem;
    border-radius: 8px;
    border: 1px solid #3a444c;
    background: #1a2228;
    color: inherit;
}
.form-field.invalid {
    border-color: #ef476f;
}
.error-message {
    color: #ef476f;
    font-size: 0.85rem;
    margin-top: 0.3rem;
}
.form-submit:disabled {
    opacity: 0.6;
    cursor: default;
}
.sr-only {
    position: absolute;
    width: 1px;
    height: 1px;
    overflow: hidden;
    clip: rect(0 0 0 0);
    white-space: nowrap;
}
body:not(.show-focus-outline) :focus {
    outline: none;
}
@media (prefers-reduced-motion: reduce) {
    .site-header, .animate-on-scroll {
        transition: none;
    }
}
"#;
