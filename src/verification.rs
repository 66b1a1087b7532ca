//! Six-slot verification code input. Tracks slot values and the focused slot,
//! and reports when the code becomes complete so the page can submit it.
//!
//! Every mutating event returns `Some(code)` exactly when the slots go from
//! "some slot empty" to "all slots filled". Editing a full code does not
//! submit again; emptying any slot re-arms the auto-submit.

/// Number of characters in a verification code.
pub const CODE_LENGTH: usize = 6;
const LAST_SLOT: usize = CODE_LENGTH - 1;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationCode {
    slots: [String; CODE_LENGTH],
    focus: usize,
    submitted: bool,
}

impl VerificationCode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[String; CODE_LENGTH] {
        &self.slots
    }

    /// Index of the slot that currently has focus.
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_empty())
    }

    /// The slots joined into one string.
    pub fn code(&self) -> String {
        self.slots.concat()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self, is_loading: bool) -> bool {
        !is_loading && self.is_complete()
    }

    /// Handles a change event on slot `index`. Only the last character of
    /// `value` is kept; a non-empty value moves focus to the next slot.
    pub fn input(&mut self, index: usize, value: &str) -> Option<String> {
        if index >= CODE_LENGTH {
            return None;
        }

        self.slots[index] = value.chars().last().map(String::from).unwrap_or_default();
        self.focus = if !value.is_empty() && index < LAST_SLOT {
            index + 1
        } else {
            index
        };

        self.poll_complete()
    }

    /// Handles backspace on slot `index`: an empty slot hands focus back to
    /// the previous one. Values never change here.
    pub fn backspace(&mut self, index: usize) {
        if index >= CODE_LENGTH {
            return;
        }

        self.focus = if self.slots[index].is_empty() && index > 0 {
            index - 1
        } else {
            index
        };
    }

    /// Spreads up to six pasted characters over all slots, clearing the rest,
    /// and focuses the slot after the last filled one (or the last slot).
    pub fn paste(&mut self, text: &str) -> Option<String> {
        let mut pasted = text.chars();
        for slot in &mut self.slots {
            *slot = pasted.next().map(String::from).unwrap_or_default();
        }

        self.focus = match self.slots.iter().rposition(|slot| !slot.is_empty()) {
            Some(last) if last < LAST_SLOT => last + 1,
            Some(_) => LAST_SLOT,
            None => 0,
        };

        self.poll_complete()
    }

    /// Clears every slot and re-arms auto-submit.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn poll_complete(&mut self) -> Option<String> {
        if !self.is_complete() {
            self.submitted = false;
            return None;
        }
        if self.submitted {
            return None;
        }

        self.submitted = true;
        Some(self.code())
    }
}
