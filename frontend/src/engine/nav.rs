use log::warn;

use super::scroll::ScrollSample;

/// Share of the viewport added to the scroll offset so a section lights up
/// a bit before its top edge reaches the top of the window.
pub const DEFAULT_LOOKAHEAD_RATIO: f64 = 0.33;

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub top_offset: f64,
    pub height: f64,
}

impl Section {
    pub fn new(id: impl Into<String>, top_offset: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top_offset,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top_offset + self.height
    }

    pub fn contains(&self, y: f64) -> bool {
        y >= self.top_offset && y < self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub target_section_id: String,
    pub active: bool,
}

/// Sections measured once at startup, kept sorted and disjoint.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    pub fn new(mut sections: Vec<Section>) -> Self {
        sections.retain(|s| s.top_offset.is_finite() && s.height.is_finite() && s.height > 0.0);
        sections.sort_by(|a, b| a.top_offset.total_cmp(&b.top_offset));

        for i in 1..sections.len() {
            let next_top = sections[i].top_offset;
            let prev = &mut sections[i - 1];
            if prev.bottom() > next_top {
                warn!(
                    "section #{} overlaps the next section, clipping it at {}px",
                    prev.id, next_top
                );
                prev.height = next_top - prev.top_offset;
            }
        }
        sections.retain(|s| s.height > 0.0);

        Self { sections }
    }

    /// Index of the section containing `y`, if any.
    pub fn section_at(&self, y: f64) -> Option<usize> {
        let after = self.sections.partition_point(|s| s.top_offset <= y);
        after
            .checked_sub(1)
            .filter(|&index| self.sections[index].contains(y))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// The `#id` part of a link href, e.g. `"/#about"` -> `"about"`.
pub fn hash_target(href: &str) -> Option<&str> {
    href.split_once('#')
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty())
}

pub struct NavHighlighter {
    registry: SectionRegistry,
    links: Vec<NavLink>,
    // registry index each link points at, resolved once
    link_sections: Vec<Option<usize>>,
    lookahead_ratio: f64,
    active: Option<usize>,
}

impl NavHighlighter {
    pub fn new<I, S>(registry: SectionRegistry, link_targets: I, lookahead_ratio: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let links: Vec<NavLink> = link_targets
            .into_iter()
            .map(|target| NavLink {
                target_section_id: target.into(),
                active: false,
            })
            .collect();
        let link_sections = links
            .iter()
            .map(|link| registry.position(&link.target_section_id))
            .collect();

        Self {
            registry,
            links,
            link_sections,
            lookahead_ratio,
            active: None,
        }
    }

    pub fn effective_offset(&self, sample: &ScrollSample) -> f64 {
        sample.offset + sample.viewport_height * self.lookahead_ratio
    }

    /// Recomputes link state from `sample`. Returns true when the active
    /// section changed, which is the only time the DOM needs touching.
    pub fn update(&mut self, sample: &ScrollSample) -> bool {
        let current = self.registry.section_at(self.effective_offset(sample));
        let changed = current != self.active;
        self.active = current;

        for (link, section) in self.links.iter_mut().zip(&self.link_sections) {
            link.active = current.is_some() && *section == current;
        }
        changed
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.active.and_then(|index| self.registry.get(index))
    }

    /// Section a clicked link should scroll to. `None` means the click is
    /// left to the browser.
    pub fn scroll_target(&self, href: &str) -> Option<&Section> {
        let id = hash_target(href)?;
        self.registry
            .position(id)
            .and_then(|index| self.registry.get(index))
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    // (gap above, height) per section, laid out top to bottom
    fn layout() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((0.0_f64..400.0, 10.0_f64..2_000.0), 1..12)
    }

    fn registry(layout: &[(f64, f64)]) -> Vec<Section> {
        let mut top = 0.0;
        layout
            .iter()
            .enumerate()
            .map(|(i, &(gap, height))| {
                top += gap;
                let section = Section::new(format!("s{i}"), top, height);
                top += height;
                section
            })
            .collect()
    }

    proptest! {
        #[test]
        fn exactly_one_link_for_offsets_inside_a_section(
            layout in layout(),
            pick in any::<prop::sample::Index>(),
            depth in 0.01_f64..0.99,
            viewport_height in 0.0_f64..2_000.0
        ) {
            let sections = registry(&layout);
            let target = pick.get(&sections).clone();
            let ids: Vec<String> = sections.iter().map(|s| s.id.clone()).collect();
            let mut nav = NavHighlighter::new(SectionRegistry::new(sections), ids, DEFAULT_LOOKAHEAD_RATIO);

            let effective = target.top_offset + target.height * depth;
            let sample = ScrollSample {
                offset: effective - viewport_height * DEFAULT_LOOKAHEAD_RATIO,
                viewport_height,
                timestamp_ms: 0.0,
            };
            nav.update(&sample);

            let active: Vec<&str> = nav
                .links()
                .iter()
                .filter(|link| link.active)
                .map(|link| link.target_section_id.as_str())
                .collect();
            prop_assert_eq!(active, vec![target.id.as_str()]);
        }

        #[test]
        fn update_is_idempotent_for_any_sample(
            layout in layout(),
            offset in 0.0_f64..20_000.0,
            viewport_height in 0.0_f64..2_000.0
        ) {
            let sections = registry(&layout);
            let ids: Vec<String> = sections.iter().map(|s| s.id.clone()).collect();
            let mut nav = NavHighlighter::new(SectionRegistry::new(sections), ids, DEFAULT_LOOKAHEAD_RATIO);
            let sample = ScrollSample { offset, viewport_height, timestamp_ms: 0.0 };

            nav.update(&sample);
            let first = nav.links().to_vec();
            prop_assert!(!nav.update(&sample));
            prop_assert_eq!(nav.links(), first.as_slice());
            prop_assert!(nav.links().iter().filter(|link| link.active).count() <= 1);
        }
    }
}
