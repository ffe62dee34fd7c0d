//! JavaScript surface of the grid engine.
//!
//! `XlGrid` wraps one [`EditorSession`] behind `Rc<RefCell<_>>` so the window
//! key listener and in-flight loads can reach it. The host owns rendering:
//! it asks for the visible rows, draws them, and reports scroll and measured
//! sizes back.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::codec::ExternalWorkbook;
use crate::dispatch::{Handled, InputDispatcher, Subscription, WindowKeyListener};
use crate::editor::{EditorSession, KeyInput, Shortcut};
use crate::error::GridError;
use crate::settings::EditorSettings;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn workbook_from_js(value: JsValue) -> Result<ExternalWorkbook, GridError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| GridError::Decode(e.to_string()))
}

fn count_to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

type ShortcutCallback = Rc<RefCell<Option<js_sys::Function>>>;

/// Hand a handled shortcut to the host callback. The callback is cloned out
/// of its slot first, so it may call `setOnShortcut` itself.
fn notify_shortcut(on_shortcut: &ShortcutCallback, shortcut: Shortcut) {
    let callback = on_shortcut.borrow().clone();
    let Some(callback) = callback else {
        return;
    };
    if let Ok(value) = to_js(&shortcut) {
        callback.call1(&JsValue::NULL, &value).ok();
    }
}

#[wasm_bindgen]
pub struct XlGrid {
    session: Rc<RefCell<EditorSession>>,
    dispatcher: InputDispatcher<KeyInput>,
    on_shortcut: ShortcutCallback,
    _session_keys: Subscription<KeyInput>,
    listener: Option<WindowKeyListener>,
}

#[wasm_bindgen]
impl XlGrid {
    /// Create a grid on a blank workbook. `settings` is a partial
    /// `EditorSettings` object; omitted fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<XlGrid, JsValue> {
        console_error_panic_hook::set_once();

        let settings: EditorSettings = if settings.is_undefined() || settings.is_null() {
            EditorSettings::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| JsValue::from_str(&format!("Invalid settings: {e}")))?
        };
        let session = Rc::new(RefCell::new(EditorSession::new(settings)));
        let on_shortcut: ShortcutCallback = Rc::new(RefCell::new(None));
        let dispatcher = InputDispatcher::new();

        let session_keys = {
            let session = Rc::clone(&session);
            let on_shortcut = Rc::clone(&on_shortcut);
            dispatcher.subscribe(move |event: &KeyInput| {
                let Ok(mut session) = session.try_borrow_mut() else {
                    return Handled::Pass;
                };
                let Some(shortcut) = session.handle_key(event) else {
                    return Handled::Pass;
                };
                drop(session);
                notify_shortcut(&on_shortcut, shortcut);
                Handled::Consumed
            })
        };

        Ok(XlGrid {
            session,
            dispatcher,
            on_shortcut,
            _session_keys: session_keys,
            listener: None,
        })
    }

    // ---- keyboard ----------------------------------------------------

    /// Start listening for keydown on the window. Idempotent.
    #[wasm_bindgen(js_name = "attachKeyboard")]
    pub fn attach_keyboard(&mut self) -> bool {
        if self.listener.is_none() {
            self.listener = WindowKeyListener::attach(&self.dispatcher);
        }
        self.listener.is_some()
    }

    #[wasm_bindgen(js_name = "detachKeyboard")]
    pub fn detach_keyboard(&mut self) {
        self.listener = None;
    }

    /// Called with each shortcut the grid handled, e.g. to focus the find
    /// field on `FocusFind` or re-render after a move.
    #[wasm_bindgen(js_name = "setOnShortcut")]
    pub fn set_on_shortcut(&self, callback: Option<js_sys::Function>) {
        *self.on_shortcut.borrow_mut() = callback;
    }

    /// Feed a key event manually. Returns true when it was consumed.
    #[wasm_bindgen(js_name = "handleKey")]
    pub fn handle_key(&self, event: JsValue) -> Result<bool, JsValue> {
        let input: KeyInput = serde_wasm_bindgen::from_value(event)
            .map_err(|e| JsValue::from_str(&format!("Invalid key event: {e}")))?;
        Ok(self.dispatcher.dispatch(&input) == Handled::Consumed)
    }

    // ---- workbook ----------------------------------------------------

    /// Load a workbook the host is decoding. `decoded` resolves to the
    /// codec's workbook object. Rejects immediately for unsupported files
    /// or while another load is running.
    #[wasm_bindgen(js_name = "loadFile")]
    pub fn load_file(&self, file_name: &str, decoded: js_sys::Promise) -> Result<js_sys::Promise, JsValue> {
        let ticket = self.session.borrow_mut().begin_load(file_name)?;
        let session = Rc::clone(&self.session);
        Ok(future_to_promise(async move {
            let result = match JsFuture::from(decoded).await {
                Ok(value) => workbook_from_js(value),
                Err(e) => Err(GridError::Decode(
                    e.as_string().unwrap_or_else(|| format!("{e:?}")),
                )),
            };
            session.borrow_mut().complete_load(&ticket, result)?;
            Ok(JsValue::UNDEFINED)
        }))
    }

    /// Load an already decoded workbook.
    #[wasm_bindgen(js_name = "loadWorkbook")]
    pub fn load_workbook(&self, file_name: &str, workbook: JsValue) -> Result<(), JsValue> {
        let workbook = workbook_from_js(workbook)?;
        Ok(self.session.borrow_mut().load_workbook(file_name, workbook)?)
    }

    #[wasm_bindgen(js_name = "isLoading")]
    pub fn is_loading(&self) -> bool {
        self.session.borrow().load_in_progress()
    }

    #[wasm_bindgen(js_name = "newWorkbook")]
    pub fn new_workbook(&self) {
        self.session.borrow_mut().new_workbook();
    }

    /// The codec workbook with all edits written back.
    #[wasm_bindgen(js_name = "exportWorkbook")]
    pub fn export_workbook(&self) -> Result<JsValue, JsValue> {
        let workbook = self.session.borrow_mut().export_workbook()?;
        to_js(&workbook)
    }

    #[wasm_bindgen(js_name = "fileName")]
    pub fn file_name(&self) -> String {
        self.session.borrow().file_name().to_string()
    }

    #[wasm_bindgen(js_name = "renameFile")]
    pub fn rename_file(&self, base: &str) -> Result<String, JsValue> {
        let mut session = self.session.borrow_mut();
        Ok(session.rename_file(base)?.to_string())
    }

    // ---- cells -------------------------------------------------------

    /// Display text of a cell in the active sheet.
    #[wasm_bindgen(js_name = "cellText")]
    pub fn cell_text(&self, row: u32, col: u32) -> String {
        self.session.borrow().display_text(row, col)
    }

    /// The full cell object (`kind`, value, type, formula source).
    pub fn cell(&self, row: u32, col: u32) -> Result<JsValue, JsValue> {
        to_js(self.session.borrow().cell(row, col))
    }

    /// Commit text as if typed into the cell editor.
    #[wasm_bindgen(js_name = "setCellText")]
    pub fn set_cell_text(&self, row: u32, col: u32, text: &str) -> Result<(), JsValue> {
        Ok(self.session.borrow_mut().commit_text(row, col, text)?)
    }

    pub fn undo(&self) -> bool {
        self.session.borrow_mut().undo().is_some()
    }

    pub fn redo(&self) -> bool {
        self.session.borrow_mut().redo().is_some()
    }

    #[wasm_bindgen(js_name = "canUndo")]
    pub fn can_undo(&self) -> bool {
        self.session.borrow().can_undo()
    }

    #[wasm_bindgen(js_name = "canRedo")]
    pub fn can_redo(&self) -> bool {
        self.session.borrow().can_redo()
    }

    // ---- selection and editing ---------------------------------------

    /// Current selection state (`{ state: "noSelection" | "cellSelected" | "editing", ... }`).
    pub fn selection(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.borrow().selection())
    }

    #[wasm_bindgen(js_name = "selectCell")]
    pub fn select_cell(&self, row: i32, col: i32) -> Result<JsValue, JsValue> {
        let cell = self
            .session
            .borrow_mut()
            .select_cell(i64::from(row), i64::from(col));
        to_js(&cell)
    }

    #[wasm_bindgen(js_name = "clearSelection")]
    pub fn clear_selection(&self) {
        self.session.borrow_mut().clear_selection();
    }

    /// Open the editor on the selected cell; returns its initial text.
    #[wasm_bindgen(js_name = "beginEdit")]
    pub fn begin_edit(&self) -> Option<String> {
        self.session.borrow_mut().begin_edit()
    }

    #[wasm_bindgen(js_name = "updateDraft")]
    pub fn update_draft(&self, text: &str) -> bool {
        self.session.borrow_mut().update_draft(text)
    }

    #[wasm_bindgen(js_name = "commitEdit")]
    pub fn commit_edit(&self) -> Result<(), JsValue> {
        self.session.borrow_mut().commit_edit()?;
        Ok(())
    }

    #[wasm_bindgen(js_name = "cancelEdit")]
    pub fn cancel_edit(&self) -> bool {
        self.session.borrow_mut().cancel_edit()
    }

    // ---- find --------------------------------------------------------

    #[wasm_bindgen(js_name = "setFindQuery")]
    pub fn set_find_query(&self, query: &str) -> u32 {
        count_to_u32(self.session.borrow_mut().set_find_query(query))
    }

    #[wasm_bindgen(js_name = "findNext")]
    pub fn find_next(&self) -> Result<JsValue, JsValue> {
        let cell = self.session.borrow_mut().find_next();
        to_js(&cell)
    }

    #[wasm_bindgen(js_name = "findPrev")]
    pub fn find_prev(&self) -> Result<JsValue, JsValue> {
        let cell = self.session.borrow_mut().find_prev();
        to_js(&cell)
    }

    /// `[current, total]`, with `current` 1-based and 0 when nothing matches.
    #[wasm_bindgen(js_name = "findStatus")]
    pub fn find_status(&self) -> Vec<u32> {
        let session = self.session.borrow();
        let find = session.find();
        let total = count_to_u32(find.match_count());
        let current = if total == 0 {
            0
        } else {
            count_to_u32(find.cursor()).saturating_add(1)
        };
        vec![current, total]
    }

    // ---- sheets ------------------------------------------------------

    #[wasm_bindgen(js_name = "sheetNames")]
    pub fn sheet_names(&self) -> Vec<String> {
        self.session
            .borrow()
            .sheets()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    #[wasm_bindgen(js_name = "activeSheet")]
    pub fn active_sheet(&self) -> usize {
        self.session.borrow().active_sheet_index()
    }

    #[wasm_bindgen(js_name = "setActiveSheet")]
    pub fn set_active_sheet(&self, index: usize) -> bool {
        self.session.borrow_mut().set_active_sheet(index)
    }

    #[wasm_bindgen(js_name = "addSheet")]
    pub fn add_sheet(&self) -> usize {
        self.session.borrow_mut().add_sheet()
    }

    #[wasm_bindgen(js_name = "renameSheet")]
    pub fn rename_sheet(&self, index: usize, name: &str) -> Result<(), JsValue> {
        Ok(self.session.borrow_mut().rename_sheet(index, name)?)
    }

    #[wasm_bindgen(js_name = "deleteSheet")]
    pub fn delete_sheet(&self, index: usize) -> Result<(), JsValue> {
        Ok(self.session.borrow_mut().delete_sheet(index)?)
    }

    // ---- UI state ----------------------------------------------------

    #[wasm_bindgen(js_name = "toggleFullscreen")]
    pub fn toggle_fullscreen(&self) -> bool {
        self.session.borrow_mut().toggle_fullscreen()
    }

    #[wasm_bindgen(js_name = "isFullscreen")]
    pub fn is_fullscreen(&self) -> bool {
        self.session.borrow().is_fullscreen()
    }

    #[wasm_bindgen(js_name = "darkMode")]
    pub fn dark_mode(&self) -> bool {
        self.session.borrow().dark_mode()
    }

    #[wasm_bindgen(js_name = "setDarkMode")]
    pub fn set_dark_mode(&self, enabled: bool) {
        self.session.borrow_mut().set_dark_mode(enabled);
    }

    // ---- viewport ----------------------------------------------------

    /// `{ rowCount, colCount }` the user can navigate.
    pub fn extent(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().extent())
    }

    /// Rows to render and the spacer heights around them.
    #[wasm_bindgen(js_name = "visibleRows")]
    pub fn visible_rows(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().visible_rows())
    }

    #[wasm_bindgen(js_name = "renderMode")]
    pub fn render_mode(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().render_mode())
    }

    #[wasm_bindgen(js_name = "totalHeight")]
    pub fn total_height(&self) -> f64 {
        self.session.borrow().virtualizer().total_height()
    }

    #[wasm_bindgen(js_name = "totalWidth")]
    pub fn total_width(&self) -> f64 {
        self.session.borrow().virtualizer().total_width()
    }

    /// Scroll position the grid wants after a selection change.
    #[wasm_bindgen(js_name = "scrollPosition")]
    pub fn scroll_position(&self) -> Vec<f64> {
        let session = self.session.borrow();
        let viewport = session.virtualizer().viewport();
        vec![viewport.scroll_left, viewport.scroll_top]
    }

    #[wasm_bindgen(js_name = "setScroll")]
    pub fn set_scroll(&self, left: f64, top: f64) {
        self.session.borrow_mut().set_scroll(left, top);
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.session.borrow_mut().resize_viewport(width, height);
    }

    #[wasm_bindgen(js_name = "measureRow")]
    pub fn measure_row(&self, row: u32, height: f64) -> bool {
        self.session.borrow_mut().measure_row(row, height)
    }

    #[wasm_bindgen(js_name = "measureCol")]
    pub fn measure_col(&self, col: u32, width: f64) -> bool {
        self.session.borrow_mut().measure_col(col, width)
    }

    #[wasm_bindgen(js_name = "scrollSpanIntoView")]
    pub fn scroll_span_into_view(&self, left: f64, width: f64) -> bool {
        self.session.borrow_mut().scroll_span_into_view(left, width)
    }
}
