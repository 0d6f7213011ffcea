/// Model identifiers last reported by the server.
///
/// Each refresh replaces the whole list; entries are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDirectory {
    names: Vec<String>,
}

impl ModelDirectory {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn replace(&mut self, names: Vec<String>) {
        self.names = names;
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.names.iter().any(|name| name == model)
    }

    /// Keep `current` if the server knows it, otherwise fall back to the first
    /// listed model. `None` means leave the selection alone.
    pub fn preferred(&self, current: &str) -> Option<String> {
        if self.contains(current) {
            Some(current.to_string())
        } else {
            self.names.first().cloned()
        }
    }
}
