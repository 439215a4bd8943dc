use crate::internal::filters::{self, FILTER_SECTIONS, FilterSection, Filters};

/// Bottom-sheet style filter picker.
///
/// Edits happen on a draft copy of the active filters; nothing reaches the feed
/// until the caller takes the draft and applies it.
#[derive(Debug, Clone, Default)]
pub struct FilterModal {
    visible: bool,
    draft: Option<Filters>,
    /// Active filters the draft was copied from.
    baseline: Filters,
    section: usize,
    option: usize,
}

impl FilterModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the modal. A draft kept by [`FilterModal::close`] is resumed only
    /// while `active` is still the set it was copied from, otherwise editing
    /// starts over from `active`.
    pub fn present(&mut self, active: &Filters) {
        if self.draft.is_some() && &self.baseline != active {
            tracing::debug!("active filters changed since close, dropping draft");
            self.draft = None;
        }
        if self.draft.is_none() {
            self.draft = Some(active.clone());
            self.baseline = active.clone();
            self.section = 0;
            self.option = 0;
        }
        self.visible = true;
    }

    /// Hide the modal, keeping the draft for the next `present`.
    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Hide the modal and throw the draft away.
    pub fn dismiss(&mut self) {
        self.visible = false;
        self.draft = None;
    }

    /// Hide the modal and hand over the draft for applying.
    pub fn take_draft(&mut self) -> Filters {
        self.visible = false;
        self.draft.take().unwrap_or_default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn draft(&self) -> Option<&Filters> {
        self.draft.as_ref()
    }

    pub fn current_section(&self) -> &'static FilterSection {
        &FILTER_SECTIONS[self.section]
    }

    /// Cursor position as (section index, option index).
    pub fn cursor(&self) -> (usize, usize) {
        (self.section, self.option)
    }

    pub fn next_section(&mut self) {
        self.section = (self.section + 1) % FILTER_SECTIONS.len();
        self.option = 0;
    }

    pub fn prev_section(&mut self) {
        self.section = self
            .section
            .checked_sub(1)
            .unwrap_or(FILTER_SECTIONS.len() - 1);
        self.option = 0;
    }

    pub fn next_option(&mut self) {
        let len = self.current_section().options.len();
        self.option = (self.option + 1) % len;
    }

    pub fn prev_option(&mut self) {
        let len = self.current_section().options.len();
        self.option = self.option.checked_sub(1).unwrap_or(len - 1);
    }

    /// Select (or deselect) the option under the cursor in the draft.
    pub fn toggle_selected(&mut self) {
        let section = self.current_section();
        let option = section.options[self.option];
        if let Some(draft) = self.draft.as_mut() {
            filters::toggle(draft, section, option);
        }
    }
}
