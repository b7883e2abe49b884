use std::collections::HashMap;

/// Decoded form submission. A field may carry several values; they are kept
/// in the order they were submitted. Blank values are dropped, so `name=`
/// reads the same as a missing `name`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormFields {
    fields: HashMap<String, Vec<String>>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` payload. Query strings
    /// use the same encoding.
    pub fn parse(input: &[u8]) -> Self {
        let mut fields = Self::new();
        fields.extend_from(input);
        fields
    }

    /// Appends the fields of another url-encoded payload after the existing
    /// values.
    pub fn extend_from(&mut self, input: &[u8]) {
        for (key, value) in form_urlencoded::parse(input) {
            self.insert(key.into_owned(), value.into_owned());
        }
    }

    pub fn insert(&mut self, key: String, value: String) {
        if value.is_empty() {
            return;
        }
        self.fields.entry(key).or_insert_with(Vec::new).push(value);
    }

    /// First submitted value of `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key.into(), value.into());
        }
        fields
    }
}
