use wasmi::{Engine, Extern, Instance, Linker, Memory, Module, Store};

use crate::error::BridgeError;
use crate::exports::Exports;
use crate::imports::{self, HostState};
use crate::page::Page;

/// Name of the optional zero-argument initializer a module may export.
pub const START_EXPORT: &str = "_start";

/// Hook for registering host functions beyond the built-in `env` and `dom` sets.
pub type ExtraImports<P> = Box<dyn FnOnce(&mut Linker<HostState<P>>) -> Result<(), wasmi::Error>>;

/// Optional knobs for [`run_wasm`](crate::run_wasm). The page passes none.
pub struct RunOptions<P> {
    /// Element id that collects the module's stdout/stderr writes.
    pub console: Option<String>,
    pub extra_imports: Option<ExtraImports<P>>,
}

impl<P> Default for RunOptions<P> {
    fn default() -> Self {
        Self {
            console: None,
            extra_imports: None,
        }
    }
}

/// Host-side handle on a module's linear memory and import/export surface.
///
/// Created empty, instantiated exactly once, and owned by the bridge for the
/// rest of the page session. The bridge never writes module memory itself.
///
/// An interface whose instantiation failed past compilation stays unusable:
/// the store and linker may already carry state from that attempt.
pub struct MemoryInterface<P: Page> {
    engine: Engine,
    store: Store<HostState<P>>,
    linker: Linker<HostState<P>>,
    memory: Option<Memory>,
    exports: Option<Exports>,
    consumed: bool,
}

impl<P: Page> MemoryInterface<P> {
    pub fn new(page: P) -> Result<Self, BridgeError> {
        let engine = Engine::default();
        let store = Store::new(&engine, HostState::new(page));
        let mut linker = Linker::new(&engine);
        imports::define(&mut linker)?;

        Ok(Self {
            engine,
            store,
            linker,
            memory: None,
            exports: None,
            consumed: false,
        })
    }

    /// The export mapping, `None` until instantiation has completed.
    pub fn exports(&self) -> Option<&Exports> {
        self.exports.as_ref()
    }

    pub fn is_instantiated(&self) -> bool {
        self.exports.is_some()
    }

    /// The module's exported linear memory, if it has one.
    pub fn memory(&self) -> Option<Memory> {
        self.memory
    }

    /// Current size of the module's linear memory in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory
            .map_or(0, |memory| memory.data(&self.store).len())
    }

    pub fn page(&self) -> &P {
        self.store.data().page()
    }

    pub fn page_mut(&mut self) -> &mut P {
        self.store.data_mut().page_mut()
    }

    /// Call a zero-argument, no-result export.
    pub fn call(&mut self, name: &str) -> Result<(), BridgeError> {
        let exports = self
            .exports
            .as_ref()
            .ok_or_else(|| BridgeError::MissingExport(name.to_string()))?;
        exports.call_unit(&mut self.store, name)
    }

    #[cfg(test)]
    pub(crate) fn call_i32(&mut self, name: &str) -> i32 {
        let func = self.exports().and_then(|e| e.get(name)).unwrap();
        let typed = func.typed::<(), i32>(&self.store).unwrap();
        typed.call(&mut self.store, ()).unwrap()
    }

    /// Compile `bytes`, link against the host imports and instantiate.
    pub(crate) fn instantiate(
        &mut self,
        bytes: &[u8],
        options: RunOptions<P>,
    ) -> Result<(), BridgeError> {
        if self.consumed {
            return Err(BridgeError::AlreadyInstantiated);
        }

        validate_wasm(bytes)?;
        let module = Module::new(&self.engine, bytes)
            .map_err(|e| BridgeError::InvalidModule(format!("WASM parse failed: {}", e)))?;

        // From here on the linker and store are touched.
        self.consumed = true;

        if let Some(extra) = options.extra_imports {
            extra(&mut self.linker).map_err(|e| BridgeError::Link(e.to_string()))?;
        }
        self.store.data_mut().console = options.console;

        let instance = self
            .linker
            .instantiate_and_start(&mut self.store, &module)
            .map_err(|e| BridgeError::Instantiate(e.to_string()))?;

        let exports = Exports::from_instance(&self.store, &instance);
        log::debug!(
            "module exports: {}",
            exports.names().collect::<Vec<_>>().join(", ")
        );

        run_start(&mut self.store, &instance, &exports)?;
        self.memory = instance
            .get_export(&self.store, "memory")
            .and_then(Extern::into_memory);
        self.exports = Some(exports);
        Ok(())
    }
}

fn validate_wasm(bytes: &[u8]) -> Result<(), BridgeError> {
    if bytes.len() < 4 || &bytes[0..4] != b"\0asm" {
        return Err(BridgeError::InvalidModule(
            "not a WASM binary (missing magic number)".to_string(),
        ));
    }
    Ok(())
}

fn run_start<P: Page>(
    store: &mut Store<HostState<P>>,
    instance: &Instance,
    exports: &Exports,
) -> Result<(), BridgeError> {
    if !exports.contains(START_EXPORT) {
        return Ok(());
    }
    let start = instance
        .get_typed_func::<(), ()>(&*store, START_EXPORT)
        .map_err(|e| BridgeError::Instantiate(format!("`{START_EXPORT}` is not callable: {e}")))?;
    start
        .call(store, ())
        .map_err(|e| BridgeError::Instantiate(format!("`{START_EXPORT}` trapped: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    fn interface() -> MemoryInterface<MemoryPage> {
        MemoryInterface::new(MemoryPage::new()).unwrap()
    }

    #[test]
    fn test_validate_wasm_magic() {
        assert!(validate_wasm(b"\0asm\x01\0\0\0").is_ok());
        assert!(validate_wasm(b"\0as").is_err());
        assert!(validate_wasm(b"<!doctype html>").is_err());
    }

    #[test]
    fn test_new_interface_has_no_exports() {
        let memory = interface();
        assert!(!memory.is_instantiated());
        assert!(memory.exports().is_none());
        assert_eq!(memory.memory_size(), 0);
    }

    #[test]
    fn test_call_before_instantiation_is_missing_export() {
        let mut memory = interface();
        let err = memory.call("tick").unwrap_err();
        assert!(matches!(err, BridgeError::MissingExport(name) if name == "tick"));
    }

    #[test]
    fn test_instantiate_collects_function_exports_only() {
        let wasm = wat::parse_str(
            r#"(module
                (memory (export "memory") 1)
                (global (export "g") i32 (i32.const 0))
                (func (export "tick"))
                (func (export "other") (param i32) (result i32) local.get 0))"#,
        )
        .unwrap();
        let mut memory = interface();
        memory.instantiate(&wasm, RunOptions::default()).unwrap();

        let exports = memory.exports().unwrap();
        assert_eq!(exports.names().collect::<Vec<_>>(), vec!["other", "tick"]);
        assert_eq!(memory.memory_size(), 65536);
    }

    #[test]
    fn test_instantiate_twice_is_rejected() {
        let wasm = wat::parse_str(r#"(module (func (export "tick")))"#).unwrap();
        let mut memory = interface();
        memory.instantiate(&wasm, RunOptions::default()).unwrap();
        let err = memory
            .instantiate(&wasm, RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyInstantiated));
    }

    #[test]
    fn test_start_export_runs_once() {
        let wasm = wat::parse_str(
            r#"(module
                (global $started (mut i32) (i32.const 0))
                (func (export "_start")
                    global.get $started
                    i32.const 1
                    i32.add
                    global.set $started)
                (func (export "started") (result i32) global.get $started))"#,
        )
        .unwrap();
        let mut memory = interface();
        memory.instantiate(&wasm, RunOptions::default()).unwrap();

        assert_eq!(memory.call_i32("started"), 1);
    }

    #[test]
    fn test_trapping_start_export_fails_instantiation() {
        let wasm = wat::parse_str(r#"(module (func (export "_start") unreachable))"#).unwrap();
        let mut memory = interface();
        let err = memory
            .instantiate(&wasm, RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::Instantiate(_)));
        assert!(!memory.is_instantiated());
    }

    #[test]
    fn test_failed_instantiation_cannot_be_retried() {
        let trapping = wat::parse_str(
            r#"(module (memory (export "memory") 1) (func (export "_start") unreachable))"#,
        )
        .unwrap();
        let valid = wat::parse_str(r#"(module (func (export "tick")))"#).unwrap();
        let mut memory = interface();

        memory
            .instantiate(&trapping, RunOptions::default())
            .unwrap_err();
        assert!(memory.memory().is_none());
        assert_eq!(memory.memory_size(), 0);

        let err = memory.instantiate(&valid, RunOptions::default()).unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyInstantiated));
        assert!(memory.exports().is_none());
    }

    #[test]
    fn test_invalid_bytes_leave_interface_usable() {
        let valid = wat::parse_str(r#"(module (func (export "tick")))"#).unwrap();
        let mut memory = interface();

        let err = memory
            .instantiate(b"not wasm", RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidModule(_)));

        memory.instantiate(&valid, RunOptions::default()).unwrap();
        assert!(memory.is_instantiated());
    }

    #[test]
    fn test_unresolved_import_fails_instantiation() {
        let wasm = wat::parse_str(
            r#"(module (import "env" "missing" (func)) (func (export "tick")))"#,
        )
        .unwrap();
        let mut memory = interface();
        let err = memory
            .instantiate(&wasm, RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::Instantiate(_)));
    }

    #[test]
    fn test_extra_imports_are_linked() {
        let wasm = wat::parse_str(
            r#"(module
                (import "extra" "answer" (func $answer (result i32)))
                (func (export "read") (result i32) call $answer))"#,
        )
        .unwrap();
        let options = RunOptions {
            console: None,
            extra_imports: Some(Box::new(|linker: &mut Linker<HostState<MemoryPage>>| {
                linker
                    .func_wrap("extra", "answer", || -> i32 { 42 })
                    .map_err(|e| wasmi::Error::new(e.to_string()))?;
                Ok(())
            }) as ExtraImports<MemoryPage>),
        };
        let mut memory = interface();
        memory.instantiate(&wasm, options).unwrap();

        assert_eq!(memory.call_i32("read"), 42);
    }
}
