use std::collections::BTreeMap;

use wasmi::{Func, Instance, Store};

use crate::error::BridgeError;

/// The callable surface of an instantiated module, keyed by export name.
///
/// Built once right after instantiation and never modified.
#[derive(Clone, Debug, Default)]
pub struct Exports {
    funcs: BTreeMap<String, Func>,
}

impl Exports {
    pub(crate) fn from_instance<T>(store: &Store<T>, instance: &Instance) -> Self {
        let funcs = instance
            .exports(store)
            .filter_map(|export| {
                let name = export.name().to_string();
                export.into_func().map(|func| (name, func))
            })
            .collect();
        Self { funcs }
    }

    pub fn get(&self, name: &str) -> Option<Func> {
        self.funcs.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.funcs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Call a zero-argument export that returns nothing.
    pub fn call_unit<T>(&self, store: &mut Store<T>, name: &str) -> Result<(), BridgeError> {
        let func = self
            .get(name)
            .ok_or_else(|| BridgeError::MissingExport(name.to_string()))?;
        let typed = func
            .typed::<(), ()>(&*store)
            .map_err(|e| BridgeError::ExportSignature {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        typed
            .call(store, ())
            .map_err(|e| BridgeError::trap(name, e))
    }
}
