#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use serde_json::{json, Value as JsonValue};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::wasm_bindgen_test;

use xlgrid::XlGrid;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn to_js(value: &JsonValue) -> JsValue {
    use serde::Serialize;
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

#[wasm_bindgen_test]
fn edits_recalculate_through_bindings() {
    let grid = XlGrid::new(JsValue::UNDEFINED).unwrap();
    grid.set_cell_text(0, 0, "5").unwrap();
    grid.set_cell_text(1, 0, "=A1*2").unwrap();
    assert_eq!(grid.cell_text(1, 0), "10");
    assert!(grid.undo());
    assert_eq!(grid.cell_text(1, 0), "");
}

#[wasm_bindgen_test]
fn settings_object_is_partial() {
    let grid = XlGrid::new(to_js(&json!({"newSheetBaseName": "Hoja1"}))).unwrap();
    assert_eq!(grid.sheet_names(), vec!["Hoja1".to_string()]);
    grid.add_sheet();
    assert_eq!(grid.sheet_names(), vec!["Hoja1".to_string(), "Hoja2".to_string()]);
}

#[wasm_bindgen_test]
fn export_is_a_plain_object() {
    let grid = XlGrid::new(JsValue::UNDEFINED).unwrap();
    grid.set_cell_text(0, 0, "hi").unwrap();
    let exported: JsonValue = serde_wasm_bindgen::from_value(grid.export_workbook().unwrap()).unwrap();
    assert_eq!(exported["SheetNames"], json!(["Sheet1"]));
    assert_eq!(exported["Sheets"]["Sheet1"]["A1"], json!({"v": "hi", "t": "s"}));
    assert_eq!(exported["Sheets"]["Sheet1"]["!ref"], json!("A1"));
}

#[wasm_bindgen_test]
fn handle_key_accepts_plain_objects() {
    let grid = XlGrid::new(JsValue::UNDEFINED).unwrap();
    grid.select_cell(0, 0).unwrap();
    assert!(grid.handle_key(to_js(&json!({"key": "ArrowDown"}))).unwrap());
    let selection: JsonValue = serde_wasm_bindgen::from_value(grid.selection().unwrap()).unwrap();
    assert_eq!(selection, json!({"state": "cellSelected", "cell": {"row": 1, "col": 0}}));
}

#[wasm_bindgen_test]
async fn async_load_adopts_decoded_workbook() {
    let grid = XlGrid::new(JsValue::UNDEFINED).unwrap();
    let workbook = to_js(&json!({
        "SheetNames": ["Data"],
        "Sheets": {"Data": {"!ref": "A1", "A1": {"v": 3, "t": "n"}}}
    }));
    let decoded = js_sys::Promise::resolve(&workbook);
    let pending = grid.load_file("data.xlsx", decoded).unwrap();
    assert!(grid.is_loading());
    assert!(grid.load_file("other.xlsx", js_sys::Promise::resolve(&JsValue::NULL)).is_err());
    JsFuture::from(pending).await.unwrap();
    assert!(!grid.is_loading());
    assert_eq!(grid.file_name(), "data.xlsx");
    assert_eq!(grid.cell_text(0, 0), "3");
}
