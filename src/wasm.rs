//! WebAssembly bindings for apexgen
//!
//! ```javascript
//! import init, { generateApex, resolveImports } from 'apexgen';
//!
//! await init();
//!
//! const result = generateApex(`public class A { void run() { System.debug(1); } }`);
//! if (result.success) {
//!   console.log(result.imports); // ["com.freedom_man.system.System"]
//!   console.log(result.code);
//! } else {
//!   console.error(result.error);
//! }
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::generate::Generator;
use crate::imports::{resolve_imports, ImportRegistry};
use crate::parser;

/// Helper to serialize values as plain JS objects (not Maps)
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).unwrap_or(JsValue::NULL)
}

fn failure(error: impl std::fmt::Display) -> JsValue {
    to_js_value(&serde_json::json!({
        "success": false,
        "error": error.to_string(),
    }))
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Parse Apex source and return `{ success, imports, code }` or
/// `{ success: false, error }`
#[wasm_bindgen(js_name = generateApex)]
pub fn generate_apex(source: &str) -> JsValue {
    let unit = match parser::parse(source) {
        Ok(unit) => unit,
        Err(e) => return failure(e),
    };
    let imports = match resolve_imports(&unit, &ImportRegistry::default()) {
        Ok(imports) => imports,
        Err(e) => return failure(e),
    };
    match Generator::new().render(&unit) {
        Ok(code) => to_js_value(&serde_json::json!({
            "success": true,
            "imports": imports,
            "code": code,
        })),
        Err(e) => failure(e),
    }
}

/// Parse Apex source and return `{ success, imports }` only
#[wasm_bindgen(js_name = resolveImports)]
pub fn resolve_apex_imports(source: &str) -> JsValue {
    let result = parser::parse(source)
        .map_err(|e| e.to_string())
        .and_then(|unit| {
            resolve_imports(&unit, &ImportRegistry::default()).map_err(|e| e.to_string())
        });
    match result {
        Ok(imports) => to_js_value(&serde_json::json!({
            "success": true,
            "imports": imports,
        })),
        Err(e) => failure(e),
    }
}
