//! The variable store.

use rustc_hash::FxHashMap;

use formel_common::{Error, Result};

use crate::builtins;
use crate::value::Value;
use crate::watcher::{Event, Informer};

/// A mapping from variable names to values that reports every access
/// through an [`Informer`].
///
/// The evaluator is the sole mutator for the duration of one
/// evaluation; the namespace itself survives it, so a caller can seed
/// variables, run a script, and read the results back.
#[derive(Debug, Clone)]
pub struct Namespace {
    contents: FxHashMap<String, Value>,
}

impl Namespace {
    /// An empty namespace: no built-ins, no constants.
    pub fn new() -> Self {
        Self {
            contents: FxHashMap::default(),
        }
    }

    /// A namespace preseeded with ЛОЖЬ, ИСТИНА, and every built-in
    /// function.
    pub fn with_builtins() -> Self {
        Self {
            contents: builtins::default_names(),
        }
    }

    /// A namespace seeded from the given pairs.
    pub fn with_contents<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self {
            contents: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    /// Look a name up, reporting the access.
    pub fn get(&self, informer: &mut dyn Informer, caller: &str, key: &str) -> Option<Value> {
        let output = self.contents.get(key).cloned();
        informer.inform(Event::NamespaceGet {
            key: key.to_string(),
            value: output.as_ref().map(|value| value.to_string()),
            caller: caller.to_string(),
        });
        output
    }

    /// Bind a name, reporting whether the binding is new or replaces an
    /// existing value. Names may not start with a digit.
    pub fn set(
        &mut self,
        informer: &mut dyn Informer,
        caller: &str,
        key: &str,
        value: Value,
    ) -> Result<()> {
        match self.contents.get(key) {
            None => informer.inform(Event::NamespaceAssign {
                key: key.to_string(),
                value: value.to_string(),
                caller: caller.to_string(),
            }),
            Some(existing) => informer.inform(Event::NamespaceOverwrite {
                key: key.to_string(),
                previous: existing.to_string(),
                value: value.to_string(),
                caller: caller.to_string(),
            }),
        }

        if key.chars().next().is_some_and(|c| c.is_numeric()) {
            return Err(Error::syntax(format!(
                "Для переменных допускаются только имена, \
                 начинающиеся не с цифры. {key} не подойдёт."
            )));
        }

        self.contents.insert(key.to_string(), value);
        Ok(())
    }

    /// Snapshot copy of the contents.
    pub fn dict(&self) -> FxHashMap<String, Value> {
        self.contents.clone()
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.contents.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}
