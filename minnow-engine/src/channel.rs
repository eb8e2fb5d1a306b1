//! Channels, their bounded backlogs, and the insertion-ordered store.

use std::collections::VecDeque;

/// Display lines kept per channel before the oldest are evicted.
pub const BACKLOG_LINES: usize = 30;

/// Name of the reserved channel that receives server-origin traffic.
/// It exists for the lifetime of the connection and is never removed by
/// protocol traffic.
pub const STATUS_CHANNEL: &str = "Status";

/// A named conversation context: a bounded backlog of display-ready lines
/// plus the input buffer the user is editing for this channel.
#[derive(Debug)]
pub struct Channel {
    name: String,
    backlog: VecDeque<String>,
    input: String,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            backlog: VecDeque::new(),
            input: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display-ready lines, oldest first.
    pub fn backlog(&self) -> impl Iterator<Item = &str> {
        self.backlog.iter().map(String::as_str)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Wrap `text` into `columns`-wide segments and append each, evicting
    /// from the front once the backlog exceeds capacity.
    ///
    /// Segments are cut on `char` boundaries; byte slicing would split
    /// multi-byte sequences.
    pub fn append_line(&mut self, text: &str, columns: usize) {
        if text.is_empty() {
            return;
        }
        let chars: Vec<char> = text.chars().collect();
        for segment in chars.chunks(columns.max(1)) {
            self.backlog.push_back(segment.iter().collect());
            while self.backlog.len() > BACKLOG_LINES {
                self.backlog.pop_front();
            }
        }
    }

    pub fn input_push(&mut self, c: char) {
        self.input.push(c);
    }

    /// No-op when the buffer is already empty.
    pub fn input_backspace(&mut self) {
        self.input.pop();
    }

    pub fn input_clear(&mut self) {
        self.input.clear();
    }

    /// Take the buffer contents, leaving it empty.
    pub fn input_take(&mut self) -> String {
        std::mem::take(&mut self.input)
    }
}

/// Insertion-ordered collection of channels plus the active cursor.
///
/// The active index is always a valid position into the order whenever the
/// store is non-empty.
#[derive(Debug, Default)]
pub struct ChannelStore {
    channels: Vec<Channel>,
    active: usize,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(self.position(name)?)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Channel> {
        let idx = self.position(name)?;
        Some(&mut self.channels[idx])
    }

    /// Insert a channel at the end of the order if absent. Returns whether
    /// it was created.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.channels.push(Channel::new(name));
        true
    }

    /// Remove a channel, clamping the active index into the remaining
    /// valid range. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(idx) = self.position(name) else {
            return false;
        };
        self.channels.remove(idx);
        if idx < self.active {
            self.active -= 1;
        }
        self.active = self.active.min(self.channels.len().saturating_sub(1));
        true
    }

    /// Move the active cursor by `step`, wrapping in both directions.
    pub fn navigate(&mut self, step: isize) {
        if self.channels.is_empty() {
            return;
        }
        let len = self.channels.len() as isize;
        self.active = (self.active as isize + step).rem_euclid(len) as usize;
    }

    pub fn active(&self) -> Option<&Channel> {
        self.channels.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut Channel> {
        self.channels.get_mut(self.active)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active().is_some_and(|c| c.name() == name)
    }

    /// Channel names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(Channel::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> ChannelStore {
        let mut store = ChannelStore::new();
        for name in names {
            store.insert(name);
        }
        store
    }

    #[test]
    fn backlog_evicts_oldest_beyond_capacity() {
        let mut ch = Channel::new("#x");
        for i in 0..40 {
            ch.append_line(&format!("line-{i}"), 80);
        }
        let lines: Vec<&str> = ch.backlog().collect();
        assert_eq!(lines.len(), BACKLOG_LINES);
        assert_eq!(lines[0], "line-10");
        assert_eq!(lines[BACKLOG_LINES - 1], "line-39");
    }

    #[test]
    fn append_wraps_to_column_width() {
        let mut ch = Channel::new("#x");
        ch.append_line("abcdefgh", 3);
        assert_eq!(ch.backlog().collect::<Vec<_>>(), ["abc", "def", "gh"]);
    }

    #[test]
    fn wrap_cuts_on_char_boundaries() {
        let mut ch = Channel::new("#x");
        ch.append_line("héllo", 2);
        assert_eq!(ch.backlog().collect::<Vec<_>>(), ["hé", "ll", "o"]);
    }

    #[test]
    fn single_oversized_append_keeps_the_tail() {
        let mut ch = Channel::new("#x");
        ch.append_line(&"ab".repeat(40), 2);
        assert_eq!(ch.backlog().count(), BACKLOG_LINES);
        assert!(ch.backlog().all(|l| l == "ab"));
    }

    #[test]
    fn empty_append_adds_nothing() {
        let mut ch = Channel::new("#x");
        ch.append_line("", 10);
        assert_eq!(ch.backlog().count(), 0);
    }

    #[test]
    fn backspace_on_empty_input_is_a_noop() {
        let mut ch = Channel::new("#x");
        ch.input_backspace();
        assert_eq!(ch.input(), "");
        ch.input_push('a');
        ch.input_backspace();
        assert_eq!(ch.input(), "");
    }

    #[test]
    fn insert_is_idempotent_per_name() {
        let mut store = store_with(&["Status"]);
        assert!(store.insert("#a"));
        assert!(!store.insert("#a"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn navigate_wraps_both_directions() {
        let mut store = store_with(&["Status", "#a", "#b"]);
        store.navigate(-1);
        assert_eq!(store.active().unwrap().name(), "#b");
        store.navigate(1);
        assert_eq!(store.active().unwrap().name(), "Status");
    }

    #[test]
    fn remove_before_active_keeps_the_same_channel_active() {
        let mut store = store_with(&["Status", "#a", "#b"]);
        store.navigate(2);
        store.remove("#a");
        assert_eq!(store.active().unwrap().name(), "#b");
    }

    #[test]
    fn removing_the_active_last_channel_clamps_backward() {
        let mut store = store_with(&["Status", "#a", "#b"]);
        store.navigate(2);
        store.remove("#b");
        assert_eq!(store.active().unwrap().name(), "#a");
    }

    #[test]
    fn active_index_stays_valid_under_mixed_operations() {
        let mut store = store_with(&["Status"]);
        for i in 0..8 {
            store.insert(&format!("#c{i}"));
        }
        let removals = ["#c3", "#c0", "#c7", "#c5", "#c1", "#c6", "#c2", "#c4"];
        for (i, name) in removals.iter().enumerate() {
            store.navigate(if i % 2 == 0 { 1 } else { -3 });
            store.remove(name);
            assert!(store.active_index() < store.len(), "after removing {name}");
        }
        assert_eq!(store.active().unwrap().name(), "Status");
    }
}
