//! Query parameters for API requests.

use std::collections::BTreeMap;

use url::Url;

/// A multi-valued query parameter mapping.
///
/// Keys are kept sorted so the encoded query string is stable. Each key
/// maps to one or more values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    inner: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse parameters from a raw query string (without the leading `?`).
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.add(key, value);
        }
        params
    }

    /// Set `key` to a single value, replacing any existing values.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.inner.insert(key.into(), vec![value.into()]);
        self
    }

    /// Append a value for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.inner.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.inner.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Remove `key` and all of its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.inner.remove(key)
    }

    /// Overlay `other` onto `self`. Keys present in `other` replace the
    /// values stored here.
    pub fn merge(&mut self, other: &QueryParams) {
        for (key, values) in &other.inner {
            self.inner.insert(key.clone(), values.clone());
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate over `(key, value)` pairs, repeating the key for each value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Replace the query string of `url` with these parameters.
    pub fn apply_to(&self, url: &mut Url) {
        url.set_query(None);
        url.query_pairs_mut().extend_pairs(self.pairs());
    }

    /// Encode as an `application/x-www-form-urlencoded` string.
    #[must_use]
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_and_add_appends() {
        let mut params = QueryParams::new();
        params.add("tag", "a").add("tag", "b");
        assert_eq!(params.get_all("tag"), ["a", "b"]);

        params.set("tag", "c");
        assert_eq!(params.get_all("tag"), ["c"]);
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = QueryParams::new().with("version", "v1").with("limit", "100");
        let caller = QueryParams::new().with("limit", "10").with("slug", "acme");
        base.merge(&caller);

        assert_eq!(base.get("version"), Some("v1"));
        assert_eq!(base.get("limit"), Some("10"));
        assert_eq!(base.get("slug"), Some("acme"));
    }

    #[test]
    fn test_from_query_roundtrips_pairs() {
        let params = QueryParams::from_query("version=2024-01-23~beta&starting_after=abc%3D");
        assert_eq!(params.get("version"), Some("2024-01-23~beta"));
        assert_eq!(params.get("starting_after"), Some("abc="));
    }

    #[test]
    fn test_apply_to_replaces_existing_query() {
        let mut url = Url::parse("https://api.snyk.io/rest/orgs?version=old&x=1").unwrap();
        QueryParams::new().with("version", "new").apply_to(&mut url);

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("version".to_string(), "new".to_string())]);
    }
}
