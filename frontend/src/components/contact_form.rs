use log::{debug, info};
use web_sys::{HtmlElement, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

pub const REQUIRED_MESSAGE: &str = "Required field";
pub const SENDING_MESSAGE: &str = "Thank you! Sending your request…";

#[derive(Clone, Copy, PartialEq)]
enum FieldKind {
    Text,
    Email,
    Tel,
    TextArea,
}

impl FieldKind {
    fn input_type(self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Text | FieldKind::TextArea => "text",
        }
    }
}

struct FieldSpec {
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
}

const FIELDS: [FieldSpec; 4] = [
    FieldSpec { name: "name", label: "Name", kind: FieldKind::Text, required: true },
    FieldSpec { name: "email", label: "Email", kind: FieldKind::Email, required: true },
    FieldSpec { name: "phone", label: "Phone (optional)", kind: FieldKind::Tel, required: false },
    FieldSpec { name: "message", label: "Tell us about your roof", kind: FieldKind::TextArea, required: true },
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: String,
    pub invalid: bool,
}

/// Flags every required field that is blank after trimming and returns the
/// first one, which gets focus. Fields that are already flagged stay flagged
/// so the error message isn't duplicated.
pub fn validate(fields: &mut [FieldState], required: &[bool]) -> Option<usize> {
    let mut first = None;
    for (index, (field, required)) in fields.iter_mut().zip(required).enumerate() {
        if *required && field.value.trim().is_empty() {
            field.invalid = true;
            first.get_or_insert(index);
        }
    }
    first
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitOutcome {
    /// Index of the first field to fix, which takes focus.
    Focus(usize),
    /// Everything filled in; the message for the live region.
    Announce(&'static str),
}

/// Validates every field and says what the form should do next.
pub fn submit(fields: &mut [FieldState], required: &[bool]) -> SubmitOutcome {
    match validate(fields, required) {
        Some(index) => SubmitOutcome::Focus(index),
        None => SubmitOutcome::Announce(SENDING_MESSAGE),
    }
}

#[derive(Properties, PartialEq)]
pub struct ContactFormProps {
    pub announce: Callback<String>,
}

fn input_value(e: &InputEvent) -> String {
    e.target_dyn_into::<HtmlInputElement>()
        .map(|input| input.value())
        .or_else(|| e.target_dyn_into::<HtmlTextAreaElement>().map(|area| area.value()))
        .unwrap_or_default()
}

#[function_component(ContactForm)]
pub fn contact_form(props: &ContactFormProps) -> Html {
    let fields = use_state(|| vec![FieldState::default(); FIELDS.len()]);
    let refs = use_state(|| (0..FIELDS.len()).map(|_| NodeRef::default()).collect::<Vec<_>>());
    let submitted = use_state(|| false);

    let oninput = |index: usize| {
        let fields = fields.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*fields).clone();
            // typing clears the error right away
            next[index] = FieldState {
                value: input_value(&e),
                invalid: false,
            };
            fields.set(next);
        })
    };

    let onsubmit = {
        let fields = fields.clone();
        let refs = refs.clone();
        let submitted = submitted.clone();
        let announce = props.announce.clone();
        Callback::from(move |e: SubmitEvent| {
            // nothing leaves the page from here
            e.prevent_default();

            let required: Vec<bool> = FIELDS.iter().map(|spec| spec.required).collect();
            let mut next = (*fields).clone();
            let outcome = submit(&mut next, &required);
            fields.set(next);

            match outcome {
                SubmitOutcome::Focus(index) => {
                    if let Some(element) = refs[index].cast::<HtmlElement>() {
                        if element.focus().is_err() {
                            debug!("could not focus field {}", FIELDS[index].name);
                        }
                    }
                }
                SubmitOutcome::Announce(message) => {
                    info!("contact form complete");
                    submitted.set(true);
                    announce.emit(message.to_string());
                }
            }
        })
    };

    html! {
        <form class="contact-form" novalidate={true} onsubmit={onsubmit}>
            {
                for FIELDS.iter().enumerate().map(|(index, spec)| {
                    let field = &fields[index];
                    let class = classes!("form-field", field.invalid.then(|| "invalid"));
                    let control = if spec.kind == FieldKind::TextArea {
                        html! {
                            <textarea
                                id={spec.name}
                                name={spec.name}
                                rows="5"
                                class={class}
                                required={spec.required}
                                ref={refs[index].clone()}
                                value={field.value.clone()}
                                oninput={oninput(index)}
                            />
                        }
                    } else {
                        html! {
                            <input
                                type={spec.kind.input_type()}
                                id={spec.name}
                                name={spec.name}
                                class={class}
                                required={spec.required}
                                ref={refs[index].clone()}
                                value={field.value.clone()}
                                oninput={oninput(index)}
                            />
                        }
                    };

                    html! {
                        <div class="form-row">
                            <label for={spec.name}>{spec.label}</label>
                            {control}
                            {
                                if field.invalid {
                                    html! { <div class="error-message">{REQUIRED_MESSAGE}</div> }
                                } else {
                                    html! {}
                                }
                            }
                        </div>
                    }
                })
            }
            <button type="submit" class="form-submit" disabled={*submitted}>
                {"Request a quote"}
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<FieldState> {
        values
            .iter()
            .map(|value| FieldState {
                value: value.to_string(),
                invalid: false,
            })
            .collect()
    }

    #[test]
    fn blank_required_fields_are_flagged() {
        let mut state = fields(&["Ana", "   ", "", "\n"]);
        let first = validate(&mut state, &[true, true, false, true]);

        assert_eq!(first, Some(1));
        let flagged: Vec<bool> = state.iter().map(|f| f.invalid).collect();
        assert_eq!(flagged, [false, true, false, true]);
    }

    #[test]
    fn complete_form_passes() {
        let mut state = fields(&["Ana", "ana@example.com", "", "Flat roof, 60m²"]);
        assert_eq!(validate(&mut state, &[true, true, false, true]), None);
        assert!(state.iter().all(|f| !f.invalid));
    }

    #[test]
    fn revalidating_keeps_a_single_flag() {
        let mut state = fields(&[""]);
        validate(&mut state, &[true]);
        validate(&mut state, &[true]);
        assert_eq!(state, [FieldState { value: String::new(), invalid: true }]);
    }

    #[test]
    fn submit_focuses_first_blank_field() {
        let mut state = fields(&["Ana", "", "", ""]);
        assert_eq!(submit(&mut state, &[true, true, false, true]), SubmitOutcome::Focus(1));
    }

    #[test]
    fn complete_submit_announces_sending() {
        let mut state = fields(&["Ana", "ana@example.com", "", "South-facing roof"]);
        assert_eq!(
            submit(&mut state, &[true, true, false, true]),
            SubmitOutcome::Announce(SENDING_MESSAGE)
        );
    }

    #[test]
    fn phone_is_the_only_optional_field() {
        let required: Vec<&str> = FIELDS.iter().filter(|f| f.required).map(|f| f.name).collect();
        assert_eq!(required, ["name", "email", "message"]);
    }
}
