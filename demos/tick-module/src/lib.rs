// Module loaded by the page as `index.wasm`. Build with
// `cargo build -p tick-module --target wasm32-unknown-unknown --release`.

const NUMBER1: &str = "number1";
const NUMBER2: &str = "number2";

#[cfg(target_arch = "wasm32")]
mod host {
    #[link(wasm_import_module = "env")]
    extern "C" {
        #[link_name = "write"]
        fn host_write(fd: i32, ptr: *const u8, len: usize);
    }

    #[link(wasm_import_module = "dom")]
    extern "C" {
        #[link_name = "get_element_value_f64"]
        fn host_element_value_f64(id_ptr: *const u8, id_len: usize) -> f64;
    }

    pub fn element_value(id: &str) -> f64 {
        unsafe { host_element_value_f64(id.as_ptr(), id.len()) }
    }

    pub fn print(text: &str) {
        unsafe { host_write(1, text.as_ptr(), text.len()) }
    }
}

// Native stand-in so the logic can be unit tested off-target.
#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::cell::RefCell;
    use std::collections::HashMap;

    thread_local! {
        pub static VALUES: RefCell<HashMap<String, f64>> = RefCell::new(HashMap::new());
        pub static OUTPUT: RefCell<String> = RefCell::new(String::new());
    }

    pub fn element_value(id: &str) -> f64 {
        VALUES.with(|values| values.borrow().get(id).copied().unwrap_or(0.0))
    }

    pub fn print(text: &str) {
        OUTPUT.with(|output| output.borrow_mut().push_str(text));
    }
}

pub fn describe_sum(a: f64, b: f64) -> String {
    format!("{} + {} = {}\n", a, b, a + b)
}

#[no_mangle]
pub extern "C" fn tick() {
    let a = host::element_value(NUMBER1);
    let b = host::element_value(NUMBER2);
    host::print(&describe_sum(a, b));
}
