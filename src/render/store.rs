use std::collections::HashMap;

use crate::log::Error;

use serde::Serialize;
use serde_json::{to_value, Map, Value};

/// Provides storage for data that a [`Template`][`crate::Template`] can be
/// rendered with.
///
/// Values are held as [`Value`], so a `Store` may contain strings, numbers,
/// nested mappings and sequences.
#[derive(Debug, Clone, Default)]
pub struct Store {
    data: HashMap<String, Value>,
}

impl Store {
    /// Create a new [`Store`].
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Store;
    ///
    /// let store = Store::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Create a [`Store`] from any value that serializes to a mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails, or the value is not
    /// a mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Store;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Shipping {
    ///     carrier: &'static str,
    ///     tracking_number: &'static str,
    /// }
    ///
    /// let store = Store::from_serialize(Shipping {
    ///     carrier: "DPD",
    ///     tracking_number: "DPD123456789LT",
    /// });
    ///
    /// assert_eq!(store.unwrap().get("carrier").unwrap(), "DPD");
    /// ```
    pub fn from_serialize<T>(value: T) -> Result<Self, Error>
    where
        T: Serialize,
    {
        match serialize(value)? {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(Error::build("invalid store").with_help(format!(
                "a store must be built from a mapping, found `{other}`"
            ))),
        }
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Store;
    ///
    /// let mut store = Store::new();
    /// let result = store.insert("orderNumber", "YW-2025-001");
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data.insert(key.into(), serialize(value)?);

        Ok(())
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data.insert(
            key.into(),
            to_value(value).expect("value must be serializable"),
        );
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    #[inline]
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Store;
    ///
    /// let store = Store::new()
    ///     .with_must("orderNumber", "YW-2025-001")
    ///     .with_must("totalAmount", 289.99);
    /// ```
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Returns a reference to the [`Value`] corresponding to the key.
    #[inline]
    pub fn get(&self, index: &str) -> Option<&Value> {
        self.data.get(index)
    }

    /// Returns a reference to the [`Value`] at the given dotted path.
    ///
    /// Returns `None` when any segment is missing, any intermediate value
    /// is not a mapping, or the path contains an empty segment. Sequences are
    /// never indexed.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Store;
    /// use serde_json::json;
    ///
    /// let store = Store::new().with_must("order", json!({ "total": "289.99" }));
    ///
    /// assert_eq!(store.resolve("order.total").unwrap(), "289.99");
    /// assert!(store.resolve("order.total.amount").is_none());
    /// ```
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut keys = split(path)?;
        let first = keys.next()?;

        descend(self.get(first)?, keys)
    }
}

impl From<Map<String, Value>> for Store {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            data: map.into_iter().collect(),
        }
    }
}

/// Returns a reference to the [`Value`] at the given dotted path within
/// a nested mapping.
///
/// Follows the same rules as [`Store::resolve`].
///
/// # Examples
///
/// ```
/// use missive::resolve;
/// use serde_json::json;
///
/// let value = json!({ "order": { "items": [{ "name": "Deck" }] } });
///
/// assert!(resolve(&value, "order.items").unwrap().is_array());
/// assert!(resolve(&value, "order.items.0").is_none());
/// ```
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    descend(value, split(path)?)
}

/// Split a dotted path into its segments, or return None if any segment
/// is empty.
fn split(path: &str) -> Option<std::str::Split<'_, char>> {
    if path.split('.').any(str::is_empty) {
        return None;
    }

    Some(path.split('.'))
}

/// Follow the keys through nested mappings, beginning at the given value.
fn descend<'a, 'path, I>(value: &'a Value, keys: I) -> Option<&'a Value>
where
    I: IntoIterator<Item = &'path str>,
{
    keys.into_iter().try_fold(value, |current, key| match key {
        "" => None,
        key => current.as_object()?.get(key),
    })
}

/// Serialize the value, describing any failure with an [`Error`].
fn serialize<T>(value: T) -> Result<Value, Error>
where
    T: Serialize,
{
    to_value(value).map_err(|error| {
        Error::build("unserializable value").with_help(format!("serialization failed: {error}"))
    })
}

// Wrapper for [`Store`] that provides mutable storage for shadowed values.
//
// Each frame holds the bindings of one iteration of a repetition block,
// innermost frame last. Bindings borrow from the Store, so pushing a frame
// never copies a value.
#[derive(Debug)]
pub struct Shadow<'store> {
    pub store: &'store Store,
    data: Vec<HashMap<&'store str, &'store Value>>,
}

impl<'store> Shadow<'store> {
    /// Create a new [`Shadow`] over the given [`Store`].
    #[inline]
    pub fn new(store: &'store Store) -> Self {
        Self {
            store,
            data: vec![HashMap::new()],
        }
    }

    /// Push a new frame onto the [`Shadow`].
    #[inline]
    pub fn push(&mut self) {
        self.data.push(HashMap::new());
    }

    /// Remove the top frame from the [`Shadow`].
    #[inline]
    pub fn pop(&mut self) {
        if self.data.len() == 1 {
            panic!("last scope must never be removed");
        }
        self.data.pop();
    }

    /// Bind the value to the key in the top frame of the [`Shadow`].
    #[inline]
    pub fn insert(&mut self, key: &'store str, value: &'store Value) {
        self.data
            .last_mut()
            .expect("stack must not be empty when shadowing value")
            .insert(key, value);
    }

    /// Get the [`Value`] of the given key.
    ///
    /// If the key is not found within the [`Shadow`], the store will be
    /// searched.
    #[inline]
    pub fn get(&self, index: &str) -> Option<&'store Value> {
        self.data
            .iter()
            .rev()
            .find_map(|frame| frame.get(index).copied())
            .or_else(|| self.store.get(index))
    }

    /// Returns a reference to the [`Value`] at the path made of the given keys.
    ///
    /// Only the first key is looked up through the frames, the rest descend
    /// into whatever value that first key found. An empty key never resolves.
    pub fn resolve<'path, I>(&self, keys: I) -> Option<&'store Value>
    where
        I: IntoIterator<Item = &'path str>,
    {
        let mut keys = keys.into_iter();
        let first = keys.next().filter(|key| !key.is_empty())?;

        descend(self.get(first)?, keys)
    }
}
