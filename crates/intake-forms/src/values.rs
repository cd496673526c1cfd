//! Controller-local value trees.
//!
//! Each form owns one [`FormValues`]: the defaults it was built with, the
//! current values, the set of fields the user changed, and the observers
//! subscribed to field changes.

use std::collections::BTreeSet;
use std::rc::Rc;

use intake_core::validation::{FieldValue, RawValues};

static EMPTY: FieldValue = FieldValue::Empty;

/// Callback run after a field changes.
pub type Observer = Rc<dyn Fn(&str, &FieldValue)>;

/// Handle returned by [`FormValues::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Field changes waiting to reach observers.
///
/// Returned by [`FormValues::set`] and [`FormValues::reset`] so the owner can
/// release any borrow of the tree before observers run. Observers are free
/// to read the form they watch.
#[must_use = "observers only run when the changes are delivered"]
pub struct Changes {
    fields: Vec<(String, FieldValue)>,
    observers: Vec<Observer>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn deliver(self) {
        for (field, value) in &self.fields {
            for observer in &self.observers {
                observer(field, value);
            }
        }
    }
}

pub struct FormValues {
    defaults: RawValues,
    current: RawValues,
    dirty: BTreeSet<String>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl FormValues {
    pub fn new(defaults: RawValues) -> Self {
        Self {
            current: defaults.clone(),
            defaults,
            dirty: BTreeSet::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current value of a field, `Empty` when unset.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.current.get(field).unwrap_or(&EMPTY)
    }

    pub fn defaults(&self) -> &RawValues {
        &self.defaults
    }

    /// Set a field. A field set back to its default is no longer dirty.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Changes {
        let value = value.into();
        let default = self.defaults.get(field).unwrap_or(&EMPTY);
        if &value == default {
            self.dirty.remove(field);
        } else {
            self.dirty.insert(field.to_string());
        }
        self.current.insert(field.to_string(), value);
        self.changes(vec![field.to_string()])
    }

    /// Whether the user changed a field since the last reset.
    pub fn is_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Copy of the current tree, for validation.
    pub fn snapshot(&self) -> RawValues {
        self.current.clone()
    }

    /// Restore the defaults. Observers hear about every field that changed.
    pub fn reset(&mut self) -> Changes {
        let changed: Vec<String> = self.dirty.iter().cloned().collect();
        self.current = self.defaults.clone();
        self.dirty.clear();
        self.changes(changed)
    }

    pub fn subscribe(&mut self, observer: impl Fn(&str, &FieldValue) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Rc::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn changes(&self, fields: Vec<String>) -> Changes {
        Changes {
            fields: fields
                .into_iter()
                .map(|field| {
                    let value = self.get(&field).clone();
                    (field, value)
                })
                .collect(),
            observers: self.observers.iter().map(|(_, o)| Rc::clone(o)).collect(),
        }
    }
}

impl std::fmt::Debug for FormValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValues")
            .field("current", &self.current)
            .field("dirty", &self.dirty)
            .field("observers", &self.observers.len())
            .finish()
    }
}
