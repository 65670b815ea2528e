use crate::fields::{
    Stored,
    Value,
};
use derive_new::new;
use indexmap::IndexMap;
use std::{
    fmt,
    sync::Arc,
};

/// Values saved by one test, in the declaration order of the fields that
/// produced them. Keeping the order makes diagnostics show every layer from
/// the same test type in the same shape.
#[derive(Debug, Clone, Default)]
pub struct LayerData(IndexMap<&'static str, Stored>);

impl LayerData {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(
        &mut self,
        name: &'static str,
        value: Stored,
    ) {
        self.0.insert(name, value);
    }
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&dyn Value> {
        self.0.get(name).map(|value| &**value)
    }
    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.0.contains_key(name)
    }
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &dyn Value)> {
        self.0.iter().map(|(name, value)| (*name, &**value))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(&'static str, Stored)> for LayerData {
    fn from_iter<I: IntoIterator<Item = (&'static str, Stored)>>(
        iter: I
    ) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for LayerData {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{}={:?}]", name, value)?;
        }
        write!(f, "}}")
    }
}

/// One immutable link of the environment chain.
#[derive(Debug, new)]
#[new(visibility = "pub(crate)")]
pub struct Layer {
    origin: Option<String>,
    data: Arc<LayerData>,
    parent: Option<Arc<Layer>>,
}

impl Layer {
    /// Label of the execution node that saved this layer, if known.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
    pub fn data(&self) -> &LayerData {
        &self.data
    }
    pub(crate) fn shared_data(&self) -> &Arc<LayerData> {
        &self.data
    }
    pub fn parent(&self) -> Option<&Layer> {
        self.parent.as_deref()
    }
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&dyn Value> {
        self.data.get(name)
    }
}
