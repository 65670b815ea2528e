//! The environment chain.
//!
//! Every test that declares `save` fields adds one immutable [`Layer`] on top
//! of the layers of its ancestors. Descendants read from the chain with
//! `load`, optionally narrowed to the layer of one specific ancestor with
//! `match` fields.

use crate::{
    error::{
        Error,
        PlanError,
    },
    fields::{
        Classification,
        Fields,
        Value,
    },
};
use layer::{
    Layer,
    LayerData,
};
use std::{
    fmt,
    sync::Arc,
};
use tracing::{
    debug,
    trace,
};

pub mod layer;
pub mod matching;

/// Persistent chain of saved layers. Cloning an `Env` only clones the handle
/// to its head layer.
#[derive(Debug, Clone, Default)]
pub struct Env {
    head: Option<Arc<Layer>>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }
    /// Starts a chain from the save fields of a single test.
    pub fn from_test(test: &(impl Fields + ?Sized)) -> Result<Self, PlanError> {
        Self::new().save(test)
    }
    pub(crate) fn from_head(head: Option<Arc<Layer>>) -> Self {
        Self { head }
    }
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
    pub fn head(&self) -> Option<&Layer> {
        self.head.as_deref()
    }
    /// Number of layers in the chain.
    pub fn depth(&self) -> usize {
        self.layers().count()
    }
    /// Layers from the head towards the root.
    pub fn layers(&self) -> Layers<'_> {
        Layers {
            next: self.head.as_deref(),
        }
    }
    /// Nearest value saved under `name`, regardless of its type.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&dyn Value> {
        self.layers().find_map(|layer| layer.get(name))
    }

    /// Adds a layer holding the `save` fields of `test`. A test without save
    /// fields leaves the chain unchanged.
    pub fn save(
        &self,
        test: &(impl Fields + ?Sized),
    ) -> Result<Self, PlanError> {
        self.save_layer(test, None)
    }
    /// Like [`Env::save`], recording `origin` as the label of the saving node.
    pub fn save_from(
        &self,
        test: &(impl Fields + ?Sized),
        origin: impl Into<String>,
    ) -> Result<Self, PlanError> {
        self.save_layer(test, Some(origin.into()))
    }
    fn save_layer(
        &self,
        test: &(impl Fields + ?Sized),
        origin: Option<String>,
    ) -> Result<Self, PlanError> {
        let class = Classification::of(test)?;
        let data: LayerData = class
            .save_fields()
            .filter_map(|name| test.save_value(name).map(|v| (name, v)))
            .collect();
        if data.is_empty() {
            return Ok(self.clone());
        }
        trace!(type_name = class.type_name(), layer = %data, "save");
        Ok(Self::from_head(Some(Arc::new(Layer::new(
            origin,
            Arc::new(data),
            self.head.clone(),
        )))))
    }

    /// Fills the vacant `load` fields of `test` from the chain, after
    /// narrowing the chain with the `match` fields of `test`.
    ///
    /// For every field the nearest layer holding a value of exactly the
    /// field's type wins.
    pub fn load(
        &self,
        test: &mut (impl Fields + ?Sized),
    ) -> Result<(), Error> {
        let class = Classification::of(&*test)?;
        let env = self.matching(&*test)?;
        for name in class.load_fields() {
            if !test.is_vacant(name) {
                trace!(field = name, "load field is preset, keeping it");
                continue;
            }
            let set = env.layers().any(|layer| {
                layer
                    .get(name)
                    .is_some_and(|value| test.load_value(name, value))
            });
            if !set {
                debug!(field = name, env = %self, "load failed");
                return Err(PlanError::Unset(name.to_string()).into());
            }
        }
        Ok(())
    }
}

/// Iterator over the layers of an [`Env`], nearest first.
#[derive(Debug, Clone)]
pub struct Layers<'a> {
    next: Option<&'a Layer>,
}

impl<'a> Iterator for Layers<'a> {
    type Item = &'a Layer;
    fn next(&mut self) -> Option<Self::Item> {
        let layer = self.next?;
        self.next = layer.parent();
        Some(layer)
    }
}

impl fmt::Display for Env {
    /// Root layer first.
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut layers: Vec<_> = self.layers().collect();
        layers.reverse();
        for (i, layer) in layers.into_iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", layer.data())?;
        }
        Ok(())
    }
}
