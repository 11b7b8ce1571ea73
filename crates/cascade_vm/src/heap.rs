//! The owning store for all objects and arrays, the reverse-reference index,
//! and the cascade-delete algorithm.
//!
//! Every object is named by an [`ObjectId`] and owned by the forward map. For
//! each object-valued field `parent.field = child` the reverse index of
//! `child` holds the back-edge `(parent, field)`. Writing null into a
//! mandatory field does not store the null: it destroys the holder, and the
//! destruction propagates through mandatory back-edges.

use crate::types::{FieldSpec, TypeRegistry};
use crate::value::{ObjectId, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Reserved type name for array objects. Never registered in the type
/// registry, so array element slots are never mandatory.
pub const ARRAY_TYPE_NAME: &str = "__array__";

/// Field holding an array's element count.
pub const LENGTH_FIELD: &str = "length";

#[derive(Debug, Clone)]
pub struct ObjectRecord {
    id: ObjectId,
    type_name: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl ObjectRecord {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn is_array(&self) -> bool {
        self.type_name.as_deref() == Some(ARRAY_TYPE_NAME)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub alloc_count: usize,
    pub live_count: usize,
    pub cascade_runs: usize,
    pub last_deleted: usize,
}

#[derive(Debug, Default)]
pub struct Heap {
    objects: HashMap<ObjectId, ObjectRecord>,
    // Back-edges per target object, ordered by (parent id, field name) so
    // cascade propagation is deterministic for any insertion history.
    back_edges: HashMap<ObjectId, BTreeSet<(ObjectId, String)>>,
    registry: TypeRegistry,
    next_id: u64,
    stats: HeapStats,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            back_edges: HashMap::new(),
            registry: TypeRegistry::new(),
            next_id: 1,
            stats: HeapStats::default(),
        }
    }

    pub fn define_type(&mut self, name: &str, fields: Vec<FieldSpec>) {
        self.registry.define_type(name, fields);
    }

    pub fn is_type_defined(&self, name: &str) -> bool {
        self.registry.schema(name).is_some()
    }

    pub fn is_field_mandatory(&self, type_name: &str, field: &str) -> bool {
        self.registry.is_field_mandatory(type_name, field)
    }

    /// Allocates a new object. Initial fields are installed without any
    /// mandatoriness validation: incomplete objects are legal until a later
    /// explicit null write to a mandatory field.
    pub fn create_object(
        &mut self,
        type_name: Option<&str>,
        fields: Vec<(String, Value)>,
    ) -> ObjectId {
        let id = self.alloc(type_name);
        for (name, value) in fields {
            self.install(id, name, value);
        }
        id
    }

    /// Allocates an array object with element slots at decimal field names
    /// and a `length` field.
    pub fn create_array(&mut self, elements: Vec<Value>) -> ObjectId {
        let id = self.alloc(Some(ARRAY_TYPE_NAME));
        let length = elements.len();
        for (index, value) in elements.into_iter().enumerate() {
            self.install(id, index.to_string(), value);
        }
        self.install(id, LENGTH_FIELD.to_string(), Value::Number(length as f64));
        id
    }

    /// Field value, or null if the field is absent or the holder is dead.
    pub fn get_field(&self, id: ObjectId, name: &str) -> Value {
        self.objects
            .get(&id)
            .and_then(|record| record.fields.get(name))
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(&id)
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn array_length(&self, id: ObjectId) -> usize {
        match self.get_field(id, LENGTH_FIELD) {
            Value::Number(length) if length >= 0.0 => length as usize,
            _ => 0,
        }
    }

    pub fn stats(&self) -> HeapStats {
        let mut stats = self.stats;
        stats.live_count = self.objects.len();
        stats
    }

    /// Back-edges currently recorded for `id`, in enumeration order.
    pub fn back_edges_of(&self, id: ObjectId) -> Vec<(ObjectId, String)> {
        self.back_edges
            .get(&id)
            .map(|edges| edges.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn live_objects(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.objects.values()
    }

    /// The single mutating entry point for fields.
    ///
    /// Writing to a dead object is a silent no-op. Writing null into a
    /// mandatory slot never installs the null: the holder is cascade-deleted
    /// instead. Otherwise the forward map and the reverse index are updated
    /// together so the two stay symmetric.
    pub fn set_field(&mut self, parent: ObjectId, name: &str, value: Value, is_mandatory: bool) {
        if !self.objects.contains_key(&parent) {
            return;
        }

        let prev = self
            .objects
            .get(&parent)
            .and_then(|record| record.fields.get(name))
            .cloned();
        if let Some(Value::Object(prev_child)) = prev {
            self.remove_back_edge(prev_child, parent, name);
        }

        if value.is_null() && is_mandatory {
            self.delete_cascade(parent);
            return;
        }

        self.install(parent, name.to_string(), value);
    }

    /// Appends at index `length` and bumps `length`. Array slots are never
    /// mandatory, so a null push is a plain write.
    pub fn array_push(&mut self, id: ObjectId, value: Value) {
        if !self.objects.contains_key(&id) {
            return;
        }
        let length = self.array_length(id);
        self.set_field(id, &length.to_string(), value, false);
        self.set_field(
            id,
            LENGTH_FIELD,
            Value::Number((length + 1) as f64),
            false,
        );
    }

    /// Deletes `root` and every object transitively reachable from it
    /// through mandatory back-edges. Work-stack traversal with a visited set,
    /// so cycles of mandatory references are destroyed without looping.
    pub fn delete_cascade(&mut self, root: ObjectId) {
        let mut stack = vec![root];
        let mut visited = HashSet::new();
        let mut deleted = 0;

        while let Some(cur) = stack.pop() {
            if !visited.insert(cur) {
                continue;
            }
            if !self.objects.contains_key(&cur) {
                continue;
            }

            // Null out every parent's forward link directly; going through
            // set_field here would re-enter the cascade.
            let incoming: Vec<(ObjectId, String)> = self.back_edges_of(cur);
            for (parent, field) in incoming {
                let mut parent_is_mandatory = false;
                if let Some(record) = self.objects.get_mut(&parent) {
                    record.fields.insert(field.clone(), Value::Null);
                    if let Some(type_name) = &record.type_name {
                        parent_is_mandatory = self.registry.is_field_mandatory(type_name, &field);
                    }
                }
                self.remove_back_edge(cur, parent, &field);
                if parent_is_mandatory {
                    stack.push(parent);
                }
            }

            // Sever outgoing links so children no longer record a back-edge
            // from a dead parent.
            let record = match self.objects.remove(&cur) {
                Some(record) => record,
                None => continue,
            };
            for (field, value) in &record.fields {
                if let Value::Object(child) = value {
                    self.remove_back_edge(*child, cur, field);
                }
            }
            self.back_edges.remove(&cur);
            deleted += 1;
        }

        self.stats.cascade_runs += 1;
        self.stats.last_deleted = deleted;
    }

    fn alloc(&mut self, type_name: Option<&str>) -> ObjectId {
        let id = ObjectId::from_u64(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            ObjectRecord {
                id,
                type_name: type_name.map(|name| name.to_string()),
                fields: BTreeMap::new(),
            },
        );
        self.stats.alloc_count += 1;
        id
    }

    // Installs a forward field and keeps the reverse index symmetric. A dead
    // identifier is normalized to null so no live field ever dangles.
    fn install(&mut self, parent: ObjectId, name: String, value: Value) {
        let value = match value {
            Value::Object(child) if !self.objects.contains_key(&child) => Value::Null,
            other => other,
        };
        if let Value::Object(child) = &value {
            self.back_edges
                .entry(*child)
                .or_default()
                .insert((parent, name.clone()));
        }
        if let Some(record) = self.objects.get_mut(&parent) {
            record.fields.insert(name, value);
        }
    }

    fn remove_back_edge(&mut self, target: ObjectId, parent: ObjectId, field: &str) {
        if let Some(edges) = self.back_edges.get_mut(&target) {
            edges.remove(&(parent, field.to_string()));
            if edges.is_empty() {
                self.back_edges.remove(&target);
            }
        }
    }
}
