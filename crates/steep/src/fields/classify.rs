use crate::{
    error::{
        HiddenRole,
        PlanError,
    },
    fields::{
        FieldSpec,
        Fields,
    },
};

/// Validated role table of one test type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    type_name: &'static str,
    specs: &'static [FieldSpec],
}

impl Classification {
    /// Classifies the fields of `fields`, failing when a role is attached to
    /// a field that is not visible. Every offending field is reported.
    pub fn of(fields: &(impl Fields + ?Sized)) -> Result<Self, PlanError> {
        let type_name = fields.type_name();
        let specs = fields.field_specs();
        let mut hidden: Vec<HiddenRole> = specs
            .iter()
            .filter(|spec| !spec.visible && !spec.roles.is_empty())
            .map(|spec| HiddenRole {
                field: spec.name,
                roles: spec.roles.to_string(),
            })
            .collect();
        match hidden.len() {
            0 => Ok(Self { type_name, specs }),
            1 => Err(PlanError::HiddenField {
                type_name,
                hidden: hidden.remove(0),
            }),
            _ => Err(PlanError::HiddenFields { type_name, hidden }),
        }
    }
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
    pub fn specs(&self) -> &'static [FieldSpec] {
        self.specs
    }
    pub fn save_fields(&self) -> impl Iterator<Item = &'static str> + use<> {
        self.with_role(|spec| spec.roles.save)
    }
    pub fn load_fields(&self) -> impl Iterator<Item = &'static str> + use<> {
        self.with_role(|spec| spec.roles.load)
    }
    pub fn match_fields(&self) -> impl Iterator<Item = &'static str> + use<> {
        self.with_role(|spec| spec.roles.matches)
    }
    fn with_role(
        &self,
        role: fn(&FieldSpec) -> bool,
    ) -> impl Iterator<Item = &'static str> + use<> {
        self.specs
            .iter()
            .filter(move |spec| spec.visible && role(spec))
            .map(|spec| spec.name)
    }
}
