//! Ordered attribute list for elements.

/// A single `name="value"` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as produced by the parser.
    pub name: String,
    /// Raw attribute value.
    pub value: String,
}

/// Attributes of one element, kept in source order.
///
/// Lookups compare names ASCII case-insensitively, matching how HTML treats
/// attribute names. Elements rarely carry more than a handful of attributes,
/// so a linear scan beats hashing here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    list: Vec<Attribute>,
}

impl Attributes {
    /// An empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Value of the attribute called `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    /// Whether an attribute called `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set `name` to `value`. An existing attribute keeps its position and
    /// has its value replaced; a new one is appended.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .list
            .iter_mut()
            .find(|attr| attr.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.list.push(Attribute { name, value }),
        }
    }

    /// Iterate over the attributes in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.list.iter()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}
