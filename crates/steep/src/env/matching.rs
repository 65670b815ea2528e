//! Narrowing the chain to the layer saved by one specific ancestor.
//!
//! A test may carry several `match` fields. A layer satisfies them only when
//! all of them were saved together (same layer, same types) with values equal
//! to the ones the test asks for. The first such layer from the head becomes
//! the head of a filtered chain; rootward layers stay in the filtered chain
//! unless they carry the complete set of match fields with other values,
//! which would belong to a sibling path.

use super::{
    Env,
    layer::Layer,
};
use crate::{
    error::{
        Error,
        PlanError,
        RunError,
    },
    fields::{
        Classification,
        Fields,
        Value,
    },
};
use std::{
    collections::HashSet,
    sync::Arc,
};
use tracing::{
    debug,
    trace,
};

/// What was observed about the match fields while scanning the chain.
#[derive(Debug, Default)]
struct Sightings {
    right_type: HashSet<&'static str>,
    wrong_type: HashSet<&'static str>,
    right_value: HashSet<&'static str>,
    wrong_value: HashSet<&'static str>,
}

impl Sightings {
    /// Explains why no layer satisfied every field in `required`.
    fn into_error(
        self,
        required: &[&'static str],
    ) -> Error {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| {
                !self.right_type.contains(*name)
                    && !self.wrong_type.contains(*name)
            })
            .map(|name| name.to_string())
            .collect();
        match missing.len() {
            0 => {},
            1 =>
                return PlanError::MissingField(missing[0].clone()).into(),
            _ => return PlanError::MissingFields(missing).into(),
        }
        if let Some(name) = required.iter().find(|name| {
            self.wrong_type.contains(*name) && !self.right_type.contains(*name)
        }) {
            return PlanError::WrongType(name.to_string()).into();
        }
        if let Some(name) = required.iter().find(|name| {
            self.wrong_value.contains(*name)
                && !self.right_value.contains(*name)
        }) {
            return RunError::UnmatchedValue(name.to_string()).into();
        }
        RunError::NotCoResident.into()
    }
}

impl Env {
    /// Resolves the `match` fields of `test` against the chain.
    ///
    /// Returns the chain unchanged when `test` has no match fields.
    pub fn matching(
        &self,
        test: &(impl Fields + ?Sized),
    ) -> Result<Env, Error> {
        let class = Classification::of(test)?;
        let required: Vec<&'static str> = class.match_fields().collect();
        if required.is_empty() {
            return Ok(self.clone());
        }

        let mut seen = Sightings::default();
        let mut kept: Vec<&Layer> = Vec::new();
        let mut found = false;
        for layer in self.layers() {
            let present: Vec<(&'static str, &dyn Value)> = required
                .iter()
                .filter_map(|&name| {
                    let value = layer.get(name)?;
                    if test.accepts(name, value) {
                        seen.right_type.insert(name);
                        Some((name, value))
                    } else {
                        seen.wrong_type.insert(name);
                        None
                    }
                })
                .collect();

            if present.len() == required.len() {
                let mut conflict = false;
                for (name, value) in present {
                    if test.match_value(name, value) == Some(true) {
                        seen.right_value.insert(name);
                    } else {
                        seen.wrong_value.insert(name);
                        conflict = true;
                    }
                }
                if conflict {
                    trace!(origin = ?layer.origin(), "match rejected layer");
                    continue;
                }
                found = true;
                kept.push(layer);
            } else if found {
                // saved by an ancestor of the matching layer
                kept.push(layer);
            }
        }

        if !found {
            let err = seen.into_error(&required);
            debug!(
                type_name = class.type_name(),
                env = %self,
                %err,
                "match failed"
            );
            return Err(err);
        }

        let head = kept.into_iter().rev().fold(None, |parent, layer| {
            Some(Arc::new(Layer::new(
                layer.origin().map(str::to_string),
                Arc::clone(layer.shared_data()),
                parent,
            )))
        });
        Ok(Env::from_head(head))
    }
}
