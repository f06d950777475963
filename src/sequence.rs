//! Sequential output identifiers.
//!
//! Output files are named `1.png`, `2.png`, … in the order items finish
//! successfully. The [`OutputSequencer`] is an owned value passed to the
//! pipeline rather than ambient state, and a fresh one starts every run at 1.
//!
//! Ids are handed out in two steps: [`peek_id`](OutputSequencer::peek_id)
//! names the file about to be written, [`next_id`](OutputSequencer::next_id)
//! commits it once the write succeeded. A failed write never advances the
//! counter, so issued ids are always exactly `1..=issued()`.

/// Gapless counter for output file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSequencer {
    next: u32,
}

impl OutputSequencer {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// The id the next successful item will receive.
    pub fn peek_id(&self) -> u32 {
        self.next
    }

    /// Return the current id and advance.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids committed so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for OutputSequencer {
    fn default() -> Self {
        Self::new()
    }
}
