//! Host functions handed to the module at instantiation.
//!
//! Two namespaces are provided. `env` covers console output, traps and the
//! clock. `dom` lets the module read input values and write element text on
//! the [`Page`]. Strings cross the boundary as `(ptr, len)` pairs into the
//! module's exported `memory`.

use wasmi::{Caller, Extern, Linker, Memory};

use crate::error::BridgeError;
use crate::page::Page;

/// Store data for a bridged module: the page plus where console output goes.
pub struct HostState<P> {
    pub(crate) page: P,
    pub(crate) console: Option<String>,
}

impl<P: Page> HostState<P> {
    pub(crate) fn new(page: P) -> Self {
        Self {
            page,
            console: None,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    fn write_console(&mut self, fd: i32, text: &str) {
        if !matches!(fd, 1 | 2) {
            log::warn!("module wrote {} bytes to unsupported fd {}", text.len(), fd);
            return;
        }

        if let Some(console) = &self.console {
            let mut current = self.page.element_text(console).unwrap_or_default();
            current.push_str(text);
            self.page.set_element_text(console, &current);
            return;
        }

        let line = text.trim_end_matches('\n');
        if fd == 1 {
            log::info!(target: "module", "{}", line);
        } else {
            log::error!(target: "module", "{}", line);
        }
    }
}

/// Parse an element value the way a numeric input reports it.
///
/// A missing element or a blank value reads as zero, anything else that is
/// not a number reads as NaN.
pub(crate) fn parse_element_number(value: Option<&str>) -> f64 {
    match value.map(str::trim) {
        None | Some("") => 0.0,
        Some(text) => text.parse::<f64>().unwrap_or(f64::NAN),
    }
}

fn memory_of<P>(caller: &Caller<'_, HostState<P>>) -> Result<Memory, wasmi::Error> {
    caller
        .get_export("memory")
        .and_then(Extern::into_memory)
        .ok_or_else(|| wasmi::Error::new("module does not export `memory`"))
}

fn span(ptr: i32, len: i32) -> Result<(usize, usize), wasmi::Error> {
    let len = usize::try_from(len)
        .map_err(|_| wasmi::Error::new(format!("negative length {len} passed to host")))?;
    Ok((ptr as u32 as usize, len))
}

fn read_string<P>(
    caller: &Caller<'_, HostState<P>>,
    ptr: i32,
    len: i32,
) -> Result<String, wasmi::Error> {
    let memory = memory_of(caller)?;
    let (offset, len) = span(ptr, len)?;
    // Bounds are checked against linear memory before anything is copied.
    let bytes = offset
        .checked_add(len)
        .and_then(|end| memory.data(caller).get(offset..end))
        .ok_or_else(|| wasmi::Error::new(format!("{len} bytes at {offset} out of bounds")))?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn link_err(err: impl std::fmt::Display) -> BridgeError {
    BridgeError::Link(err.to_string())
}

/// Register the `env` and `dom` namespaces on `linker`.
pub(crate) fn define<P: Page>(linker: &mut Linker<HostState<P>>) -> Result<(), BridgeError> {
    linker
        .func_wrap(
            "env",
            "write",
            |mut caller: Caller<'_, HostState<P>>, fd: i32, ptr: i32, len: i32| {
                let text = read_string(&caller, ptr, len)?;
                caller.data_mut().write_console(fd, &text);
                Ok::<(), wasmi::Error>(())
            },
        )
        .map_err(link_err)?;

    linker
        .func_wrap("env", "trap", || -> Result<(), wasmi::Error> {
            Err(wasmi::Error::new("module called trap"))
        })
        .map_err(link_err)?;

    linker
        .func_wrap("env", "abort", || -> Result<(), wasmi::Error> {
            Err(wasmi::Error::new("module called abort"))
        })
        .map_err(link_err)?;

    linker
        .func_wrap("env", "time_now", |caller: Caller<'_, HostState<P>>| -> i64 {
            (caller.data().page.now_millis() * 1_000_000.0) as i64
        })
        .map_err(link_err)?;

    linker
        .func_wrap(
            "dom",
            "get_element_value_f64",
            |caller: Caller<'_, HostState<P>>, id_ptr: i32, id_len: i32| {
                let id = read_string(&caller, id_ptr, id_len)?;
                let value = caller.data().page.element_value(&id);
                Ok::<f64, wasmi::Error>(parse_element_number(value.as_deref()))
            },
        )
        .map_err(link_err)?;

    linker
        .func_wrap(
            "dom",
            "get_element_value_string_length",
            |caller: Caller<'_, HostState<P>>, id_ptr: i32, id_len: i32| {
                let id = read_string(&caller, id_ptr, id_len)?;
                let len = caller
                    .data()
                    .page
                    .element_value(&id)
                    .map_or(0, |value| value.len());
                Ok::<i32, wasmi::Error>(i32::try_from(len).unwrap_or(i32::MAX))
            },
        )
        .map_err(link_err)?;

    linker
        .func_wrap(
            "dom",
            "get_element_value_string",
            |mut caller: Caller<'_, HostState<P>>,
             id_ptr: i32,
             id_len: i32,
             buf_ptr: i32,
             buf_len: i32| {
                let id = read_string(&caller, id_ptr, id_len)?;
                let (offset, capacity) = span(buf_ptr, buf_len)?;
                let value = caller.data().page.element_value(&id).unwrap_or_default();
                let bytes = &value.as_bytes()[..value.len().min(capacity)];
                let memory = memory_of(&caller)?;
                memory.write(&mut caller, offset, bytes).map_err(|e| {
                    wasmi::Error::new(format!("writing {} bytes at {offset}: {e}", bytes.len()))
                })?;
                Ok::<i32, wasmi::Error>(bytes.len() as i32)
            },
        )
        .map_err(link_err)?;

    linker
        .func_wrap(
            "dom",
            "set_element_text_string",
            |mut caller: Caller<'_, HostState<P>>,
             id_ptr: i32,
             id_len: i32,
             text_ptr: i32,
             text_len: i32| {
                let id = read_string(&caller, id_ptr, id_len)?;
                let text = read_string(&caller, text_ptr, text_len)?;
                caller.data_mut().page.set_element_text(&id, &text);
                Ok::<(), wasmi::Error>(())
            },
        )
        .map_err(link_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_element_number() {
        assert_eq!(parse_element_number(None), 0.0);
        assert_eq!(parse_element_number(Some("")), 0.0);
        assert_eq!(parse_element_number(Some("   ")), 0.0);
        assert_eq!(parse_element_number(Some("42")), 42.0);
        assert_eq!(parse_element_number(Some(" 2.5 ")), 2.5);
        assert!(parse_element_number(Some("abc")).is_nan());
    }

    #[test]
    fn test_span_rejects_negative_length() {
        assert!(span(0, -1).is_err());
        assert_eq!(span(16, 4).unwrap(), (16, 4));
        // Pointers are unsigned on the wasm side.
        assert_eq!(span(-1, 0).unwrap(), (u32::MAX as usize, 0));
    }
}
