use std::collections::HashMap;

/// One field of a registered schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub optional: bool,
}

impl FieldSpec {
    pub fn mandatory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            optional: false,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            optional: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl TypeSchema {
    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Schema storage consulted by the heap on every mandatoriness query.
/// Redefinition replaces the prior schema wholesale; objects created under
/// the old schema are untouched, and later writes are checked against the
/// latest definition.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeSchema>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    pub fn define_type(&mut self, name: &str, fields: Vec<FieldSpec>) {
        self.types.insert(
            name.to_string(),
            TypeSchema {
                name: name.to_string(),
                fields,
            },
        );
    }

    pub fn schema(&self, name: &str) -> Option<&TypeSchema> {
        self.types.get(name)
    }

    pub fn is_field_mandatory(&self, type_name: &str, field: &str) -> bool {
        self.types
            .get(type_name)
            .and_then(|schema| schema.field(field))
            .map(|spec| !spec.optional)
            .unwrap_or(false)
    }
}
