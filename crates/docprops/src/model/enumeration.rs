//! Enumeration value: a selected index into a label set.

/// Label storage of an [`Enumeration`].
#[derive(Debug, Clone, PartialEq)]
enum Labels {
    /// Labels from a process-lifetime table, supplied by code.
    Static(&'static [&'static str]),
    /// Labels set at runtime, saved alongside the index.
    Custom(Vec<String>),
}

/// A selected index into an ordered label set.
///
/// The index is valid when it lies in `0..len`. An enumeration without labels
/// is never valid. Labels either come from a static table or are custom,
/// in which case they are persisted with the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    labels: Labels,
    index: i64,
}

impl Default for Enumeration {
    fn default() -> Self {
        Self {
            labels: Labels::Static(&[]),
            index: 0,
        }
    }
}

impl Enumeration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an enumeration over a static label table, selecting `index`.
    pub fn from_static(labels: &'static [&'static str], index: i64) -> Self {
        let mut e = Self {
            labels: Labels::Static(labels),
            index: 0,
        };
        e.set_index(index);
        e
    }

    /// Creates a custom enumeration over runtime labels, selecting `index`.
    pub fn from_labels(labels: Vec<String>, index: i64) -> Self {
        let mut e = Self {
            labels: Labels::Custom(labels),
            index: 0,
        };
        e.set_index(index);
        e
    }

    /// Replaces the labels with a static table.
    pub fn set_static_labels(&mut self, labels: &'static [&'static str]) {
        self.replace_labels(Labels::Static(labels));
    }

    /// Replaces the labels with runtime labels and marks the enumeration custom.
    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.replace_labels(Labels::Custom(labels));
    }

    // Keeps the selected label when it survives the swap. Otherwise the
    // index is pulled back into range.
    fn replace_labels(&mut self, labels: Labels) {
        let old = if self.is_valid() {
            self.value_str().map(str::to_owned)
        } else {
            None
        };
        self.labels = labels;
        let len = self.len() as i64;
        match old {
            Some(old) if len > 0 => {
                self.index = self.position(&old).map_or(0, |i| i as i64);
            }
            _ => {
                if self.index >= len {
                    self.index = len - 1;
                }
            }
        }
    }

    /// Returns true if labels are set at runtime rather than from a table.
    pub fn is_custom(&self) -> bool {
        matches!(self.labels, Labels::Custom(_))
    }

    pub fn len(&self) -> usize {
        match &self.labels {
            Labels::Static(l) => l.len(),
            Labels::Custom(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if any labels are set.
    pub fn has_labels(&self) -> bool {
        !self.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        match &self.labels {
            Labels::Static(l) => l.get(index).copied(),
            Labels::Custom(l) => l.get(index).map(String::as_str),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).filter_map(|i| self.label(i))
    }

    /// Returns the labels as owned strings.
    pub fn label_vec(&self) -> Vec<String> {
        self.labels().map(str::to_owned).collect()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels().position(|l| l == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn is_valid(&self) -> bool {
        self.index >= 0 && (self.index as u64) < self.len() as u64
    }

    /// Selects `index` if it lies in `-1..len`. Returns false and leaves the
    /// value unchanged otherwise.
    pub fn set_index(&mut self, index: i64) -> bool {
        if index == -1 || (index >= 0 && (index as u64) < self.len() as u64) {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Selects `label`. Returns false and leaves the value unchanged when
    /// the label is not part of the enumeration.
    pub fn set_value(&mut self, label: &str) -> bool {
        match self.position(label) {
            Some(i) => {
                self.index = i as i64;
                true
            }
            None => false,
        }
    }

    /// Returns the selected label, or `None` when invalid.
    pub fn value_str(&self) -> Option<&str> {
        if self.is_valid() {
            self.label(self.index as usize)
        } else {
            None
        }
    }

    /// Returns true if the selected label equals `label`.
    pub fn is_value(&self, label: &str) -> bool {
        self.value_str() == Some(label)
    }

    /// Highest selectable index, or -1 when there are no labels.
    pub fn max_value(&self) -> i64 {
        self.len() as i64 - 1
    }

    /// Approximate heap and inline size in bytes.
    pub fn mem_size(&self) -> usize {
        let labels = match &self.labels {
            Labels::Static(_) => 0,
            Labels::Custom(l) => l.iter().map(|s| s.capacity() + std::mem::size_of::<String>()).sum(),
        };
        std::mem::size_of::<Self>() + labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: &[&str] = &["Red", "Green", "Blue"];

    fn labels(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_is_invalid() {
        let e = Enumeration::new();
        assert!(!e.is_valid());
        assert!(!e.has_labels());
        assert_eq!(e.value_str(), None);
        assert!(!e.is_custom());
    }

    #[test]
    fn test_static_labels() {
        let e = Enumeration::from_static(COLORS, 1);
        assert!(e.is_valid());
        assert!(!e.is_custom());
        assert_eq!(e.value_str(), Some("Green"));
        assert_eq!(e.max_value(), 2);
    }

    #[test]
    fn test_swap_preserves_selected_label() {
        let mut e = Enumeration::from_labels(labels(&["A", "B", "C"]), 1);
        e.set_labels(labels(&["X", "B"]));
        assert_eq!(e.index(), 1);
        assert_eq!(e.value_str(), Some("B"));

        e.set_labels(labels(&["B", "Y", "Z"]));
        assert_eq!(e.index(), 0);
        assert_eq!(e.value_str(), Some("B"));
    }

    #[test]
    fn test_swap_drops_missing_label_to_first() {
        let mut e = Enumeration::from_labels(labels(&["A", "B", "C"]), 2);
        e.set_labels(labels(&["X", "Y", "Z"]));
        assert_eq!(e.index(), 0);
    }

    #[test]
    fn test_swap_to_empty_invalidates() {
        let mut e = Enumeration::from_labels(labels(&["A"]), 0);
        e.set_labels(Vec::new());
        assert_eq!(e.index(), -1);
        assert!(!e.is_valid());
    }

    #[test]
    fn test_set_index_range() {
        let mut e = Enumeration::from_static(COLORS, 0);
        assert!(e.set_index(2));
        assert!(e.set_index(-1));
        assert!(!e.is_valid());
        assert!(!e.set_index(3));
        assert!(!e.set_index(-2));
        assert_eq!(e.index(), -1);
    }

    #[test]
    fn test_set_value_by_label() {
        let mut e = Enumeration::from_static(COLORS, 0);
        assert!(e.set_value("Blue"));
        assert!(e.is_value("Blue"));
        assert!(!e.set_value("Purple"));
        assert_eq!(e.index(), 2);
    }
}
