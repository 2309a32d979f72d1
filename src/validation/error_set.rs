use std::fmt;

/// Insertion-ordered `(attribute, message)` pairs produced by a validation pass.
///
/// Several messages per attribute are allowed and kept in the order added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorSet {
    entries: Vec<(String, String)>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.entries.push((attribute.into(), message.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages recorded for `attribute`, oldest first. Empty if none.
    pub fn on(&self, attribute: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(name, _)| name == attribute)
            .map(|(_, message)| message.as_str())
            .collect()
    }

    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &str),
    {
        for (attribute, message) in &self.entries {
            f(attribute, message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(attribute, message)| (attribute.as_str(), message.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (attribute, message) in &self.entries {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", attribute, message)?;
            first = false;
        }
        Ok(())
    }
}
