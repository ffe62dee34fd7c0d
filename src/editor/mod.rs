//! One editor session: the loaded workbook and everything keyed to it.
//!
//! `EditorSession` owns the sheet collection, the codec workbook it was
//! loaded from, and the per-active-sheet state (bounds, virtualizer,
//! selection, undo history, find matches). Every mutation runs the same
//! pipeline synchronously:
//!
//! edit -> cell store -> undo log -> recalculation -> bounds -> virtualizer
//! extent -> sheet marked for write-back to the codec workbook.
//!
//! Switching, adding or deleting sheets resets the per-sheet state.

pub mod input;
pub mod keyboard;
pub mod loader;

pub use input::{coerce_input, editable_text, parse_date_input};
pub use keyboard::{resolve_shortcut, KeyInput, Shortcut};
pub use loader::{
    check_extension, rename_keeping_extension, split_extension, LoadGate, LoadTicket,
    ACCEPTED_EXTENSIONS,
};

use std::collections::HashSet;

use crate::cell_ref::is_valid_cell;
use crate::codec::{read_workbook, write_sheet, ExternalWorkbook};
use crate::display::display_cell;
use crate::error::Result;
use crate::find::FindIndex;
use crate::history::{UndoEntry, UndoRedoLog};
use crate::layout::{RenderMode, ViewportVirtualizer, VirtualRange};
use crate::navigator::{EscapeOutcome, SelectionNavigator, SelectionState};
use crate::recalc::{recalculate_sheet, FormulaEngine, WorkbookEngine};
use crate::settings::EditorSettings;
use crate::sheets::SheetCollection;
use crate::store::{Bounds, BoundsTracker};
use crate::types::{Cell, CellPosition, GridExtent, SheetData};

/// File name given to workbooks created from scratch.
pub const DEFAULT_FILE_NAME: &str = "Untitled.xlsx";

pub struct EditorSession {
    settings: EditorSettings,
    engine: Box<dyn FormulaEngine>,
    file_name: String,
    workbook: ExternalWorkbook,
    sheets: SheetCollection,
    /// Ids of sheets edited since the last write-back.
    dirty_sheets: HashSet<u32>,
    history: UndoRedoLog,
    bounds: BoundsTracker,
    virtualizer: ViewportVirtualizer,
    navigator: SelectionNavigator,
    find: FindIndex,
    loads: LoadGate,
    fullscreen: bool,
}

impl EditorSession {
    /// A session on a blank workbook, using the default formula engine.
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_engine(settings, Box::new(WorkbookEngine))
    }

    /// A session on a blank workbook with a host-provided formula engine.
    pub fn with_engine(settings: EditorSettings, engine: Box<dyn FormulaEngine>) -> Self {
        let sheets = SheetCollection::blank(&settings.new_sheet_base_name);
        let workbook = ExternalWorkbook::blank(&settings.new_sheet_base_name);
        let virtualizer = ViewportVirtualizer::new(&settings);
        let mut session = Self {
            settings,
            engine,
            file_name: DEFAULT_FILE_NAME.to_string(),
            workbook,
            sheets,
            dirty_sheets: HashSet::new(),
            history: UndoRedoLog::new(),
            bounds: BoundsTracker::default(),
            virtualizer,
            navigator: SelectionNavigator::new(),
            find: FindIndex::new(),
            loads: LoadGate::new(),
            fullscreen: false,
        };
        session.reset_sheet_view();
        session
    }

    // ------------------------------------------------------------------
    // Workbook lifecycle
    // ------------------------------------------------------------------

    /// Replace the workbook with one blank sheet.
    pub fn new_workbook(&mut self) {
        let base = self.settings.new_sheet_base_name.clone();
        self.adopt(ExternalWorkbook::blank(&base), DEFAULT_FILE_NAME.to_string());
    }

    /// Admit a load. The host decodes the file and reports back through
    /// [`EditorSession::complete_load`].
    pub fn begin_load(&mut self, file_name: &str) -> Result<LoadTicket> {
        self.loads.begin(file_name)
    }

    pub fn load_in_progress(&self) -> bool {
        self.loads.is_busy()
    }

    /// Finish an admitted load. A decode failure leaves the current
    /// workbook untouched; success replaces it wholesale.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        decoded: Result<ExternalWorkbook>,
    ) -> Result<()> {
        self.loads.finish(ticket)?;
        match decoded {
            Ok(workbook) => {
                self.adopt(workbook, ticket.file_name().to_string());
                Ok(())
            }
            Err(e) => {
                log::warn!("load of {:?} failed: {e}", ticket.file_name());
                Err(e)
            }
        }
    }

    /// Gate, then adopt an already decoded workbook.
    pub fn load_workbook(&mut self, file_name: &str, workbook: ExternalWorkbook) -> Result<()> {
        let ticket = self.begin_load(file_name)?;
        self.complete_load(&ticket, Ok(workbook))
    }

    fn adopt(&mut self, mut workbook: ExternalWorkbook, file_name: String) {
        let base = self.settings.new_sheet_base_name.clone();
        if workbook.sheet_names.is_empty() {
            workbook.add_sheet(&base);
        }
        let sheets = read_workbook(&workbook);
        log::info!(
            "adopted workbook {file_name:?} with {} sheet(s)",
            sheets.len()
        );
        self.sheets = SheetCollection::from_sheets(sheets, &base);
        self.workbook = workbook;
        self.file_name = file_name;
        self.dirty_sheets.clear();
        self.find.clear();
        self.reset_sheet_view();
    }

    /// The codec workbook with every edited sheet written back, ready for
    /// the host codec to serialize.
    pub fn export_workbook(&mut self) -> Result<ExternalWorkbook> {
        self.flush_dirty_sheets()?;
        Ok(self.workbook.clone())
    }

    fn flush_dirty_sheets(&mut self) -> Result<()> {
        for sheet in self.sheets.sheets() {
            if !self.dirty_sheets.contains(&sheet.id) {
                continue;
            }
            let target = self.workbook.sheets.entry(sheet.name.clone()).or_default();
            write_sheet(target, sheet)?;
        }
        self.dirty_sheets.clear();
        Ok(())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Rename the file, keeping its extension. A blank name keeps the old one.
    pub fn rename_file(&mut self, new_base: &str) -> Result<&str> {
        self.file_name = rename_keeping_extension(&self.file_name, new_base)?;
        Ok(&self.file_name)
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn dark_mode(&self) -> bool {
        self.settings.dark_mode
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.settings.dark_mode = enabled;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    // ------------------------------------------------------------------
    // Sheets
    // ------------------------------------------------------------------

    pub fn sheets(&self) -> &[SheetData] {
        self.sheets.sheets()
    }

    pub fn active_sheet_index(&self) -> usize {
        self.sheets.active_index()
    }

    pub fn active_sheet(&self) -> Option<&SheetData> {
        self.sheets.active()
    }

    pub fn is_sheet_name_taken(&self, name: &str, except: Option<usize>) -> bool {
        self.sheets.is_name_taken(name, except)
    }

    /// Switch tabs; returns false when nothing changed.
    pub fn set_active_sheet(&mut self, index: usize) -> bool {
        if !self.sheets.set_active(index) {
            return false;
        }
        self.reset_sheet_view();
        true
    }

    /// Append a blank sheet, make it active and return its index.
    pub fn add_sheet(&mut self) -> usize {
        let index = self.sheets.add_sheet(&self.settings.new_sheet_base_name);
        if let Some(sheet) = self.sheets.get(index) {
            self.workbook.add_sheet(&sheet.name);
        }
        self.reset_sheet_view();
        index
    }

    pub fn rename_sheet(&mut self, index: usize, name: &str) -> Result<()> {
        let old = self.sheets.rename_sheet(index, name)?;
        let new = self
            .sheets
            .get(index)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        self.workbook.rename_sheet(index, &new)?;
        log::info!("renamed sheet {old:?} to {new:?}");
        Ok(())
    }

    pub fn delete_sheet(&mut self, index: usize) -> Result<()> {
        let removed = self.sheets.delete_sheet(index)?;
        self.dirty_sheets.remove(&removed.id);
        self.workbook.remove_sheet(index)?;
        self.reset_sheet_view();
        Ok(())
    }

    /// Reset everything keyed to the active sheet.
    fn reset_sheet_view(&mut self) {
        self.history.reset();
        self.navigator.clear();
        let bounds = match self.sheets.active() {
            Some(sheet) => {
                self.find.rescan(&sheet.data);
                BoundsTracker::new(&sheet.data)
            }
            None => BoundsTracker::default(),
        };
        self.virtualizer.reset(bounds.bounds());
        self.bounds = bounds;
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    /// Cell in the active sheet; empty outside the data.
    pub fn cell(&self, row: u32, col: u32) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.sheets
            .active()
            .map_or(&EMPTY, |sheet| sheet.get_cell(row, col))
    }

    /// What the grid shows for a cell of the active sheet.
    pub fn display_text(&self, row: u32, col: u32) -> String {
        display_cell(self.cell(row, col))
    }

    /// Write a cell in the active sheet and run the edit pipeline. Writes
    /// past the last addressable row or column are ignored.
    pub fn update_cell(&mut self, row: u32, col: u32, cell: Cell) {
        if !is_valid_cell(row, col) {
            log::debug!("ignoring write outside the sheet at ({row}, {col})");
            return;
        }
        let sheet_index = self.sheets.active_index();
        let Some(sheet) = self.sheets.active_mut() else {
            return;
        };
        let prev_cell = sheet.set_cell(row, col, cell);
        self.history.record(UndoEntry {
            sheet_index,
            row,
            col,
            prev_cell,
        });
        self.after_mutation(sheet_index);
    }

    /// Commit editor text for a cell. Text that cannot be coerced to the
    /// cell's type is rejected without touching the sheet.
    pub fn commit_text(&mut self, row: u32, col: u32, text: &str) -> Result<()> {
        let current = self.cell(row, col);
        let cell = match coerce_input(text, current.cell_type()) {
            Ok(cell) => cell,
            Err(e) => {
                log::warn!("rejected edit at ({row}, {col}): {e}");
                return Err(e);
            }
        };
        if same_content(current, &cell) {
            return Ok(());
        }
        self.update_cell(row, col, cell);
        Ok(())
    }

    /// Recalculate, refresh bounds and extent, and queue write-back for the
    /// sheet at `sheet_index`.
    fn after_mutation(&mut self, sheet_index: usize) {
        let is_active = sheet_index == self.sheets.active_index();
        let Some(sheet) = self.sheets.get_mut(sheet_index) else {
            return;
        };
        recalculate_sheet(&mut sheet.data, self.engine.as_ref());
        self.dirty_sheets.insert(sheet.id);
        if is_active {
            if self.bounds.refresh(&sheet.data) {
                self.virtualizer.update_extent(self.bounds.bounds());
            }
            self.find.rescan(&sheet.data);
        }
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Revert the last edit, recalculate and select the reverted cell.
    /// Returns the reverted cell even when it lies outside the shrunken
    /// extent and so cannot be selected.
    pub fn undo(&mut self) -> Option<CellPosition> {
        let applied = self.history.undo(self.sheets.sheets_mut())?;
        self.after_mutation(applied.sheet_index);
        self.select_position(applied.cell);
        Some(applied.cell)
    }

    /// Re-apply the last undone edit, recalculate and select the cell.
    pub fn redo(&mut self) -> Option<CellPosition> {
        let applied = self.history.redo(self.sheets.sheets_mut())?;
        self.after_mutation(applied.sheet_index);
        self.select_position(applied.cell);
        Some(applied.cell)
    }

    // ------------------------------------------------------------------
    // Selection and editing
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &SelectionState {
        self.navigator.state()
    }

    pub fn selected_cell(&self) -> Option<CellPosition> {
        self.navigator.selected()
    }

    /// Select with wraparound and scroll the cell into view. Targets outside
    /// the navigable extent are ignored.
    pub fn select_cell(&mut self, row: i64, col: i64) -> Option<CellPosition> {
        let Some(cell) = self.navigator.select_cell(row, col, self.extent()) else {
            log::debug!("ignoring selection of ({row}, {col})");
            return None;
        };
        self.virtualizer.scroll_to_index(cell.row);
        self.virtualizer.scroll_col_into_view(cell.col);
        Some(cell)
    }

    fn select_position(&mut self, cell: CellPosition) -> Option<CellPosition> {
        self.select_cell(i64::from(cell.row), i64::from(cell.col))
    }

    /// Move relative to the selected cell; no-op without a selection.
    pub fn move_selection(&mut self, d_row: i64, d_col: i64) -> Option<CellPosition> {
        let current = self.navigator.selected()?;
        self.select_cell(
            i64::from(current.row) + d_row,
            i64::from(current.col) + d_col,
        )
    }

    pub fn clear_selection(&mut self) {
        self.navigator.clear();
    }

    /// Open the cell editor on the selected cell. Returns the initial text.
    pub fn begin_edit(&mut self) -> Option<String> {
        let cell = self.navigator.selected()?;
        let text = editable_text(self.cell(cell.row, cell.col));
        self.navigator.begin_edit(text.clone()).then_some(text)
    }

    pub fn update_draft(&mut self, text: &str) -> bool {
        self.navigator.update_draft(text)
    }

    pub fn draft(&self) -> Option<&str> {
        self.navigator.draft()
    }

    /// Commit the open editor. The editor closes either way; on rejection
    /// the cell keeps its previous content.
    pub fn commit_edit(&mut self) -> Result<Option<CellPosition>> {
        let Some((cell, draft)) = self.navigator.finish_edit() else {
            return Ok(None);
        };
        self.commit_text(cell.row, cell.col, &draft)?;
        Ok(Some(cell))
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.navigator.cancel_edit()
    }

    /// Window-level Escape.
    pub fn escape(&mut self) -> EscapeOutcome {
        let outcome = self.navigator.escape(self.fullscreen);
        if outcome == EscapeOutcome::ExitedFullscreen {
            self.fullscreen = false;
        }
        outcome
    }

    // ------------------------------------------------------------------
    // Find
    // ------------------------------------------------------------------

    pub fn find(&self) -> &FindIndex {
        &self.find
    }

    /// Change the find query; returns the match count.
    pub fn set_find_query(&mut self, query: &str) -> usize {
        let Some(sheet) = self.sheets.active() else {
            self.find.clear();
            return 0;
        };
        self.find.set_query(query, &sheet.data);
        self.find.match_count()
    }

    pub fn find_next(&mut self) -> Option<CellPosition> {
        let cell = self.find.next()?;
        self.select_position(cell)
    }

    pub fn find_prev(&mut self) -> Option<CellPosition> {
        let cell = self.find.prev()?;
        self.select_position(cell)
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Apply a window keydown. Returns the shortcut when it did something;
    /// the host should then prevent the browser default. `FocusFind` and
    /// `BeginEdit` also ask the host to focus its find field / editor.
    pub fn handle_key(&mut self, event: &KeyInput) -> Option<Shortcut> {
        let shortcut = resolve_shortcut(event, self.settings.is_mac)?;
        let applied = match shortcut {
            Shortcut::FocusFind => true,
            Shortcut::Undo => self.undo().is_some(),
            Shortcut::Redo => self.redo().is_some(),
            Shortcut::FindNext => self.find_next().is_some(),
            Shortcut::FindPrev => self.find_prev().is_some(),
            Shortcut::Escape => self.escape() != EscapeOutcome::Ignored,
            Shortcut::Move { d_row, d_col } => {
                // Arrows are swallowed with a selection even at the edge.
                let selected = self.navigator.selected().is_some();
                self.move_selection(d_row, d_col);
                selected
            }
            Shortcut::BeginEdit => self.begin_edit().is_some(),
            Shortcut::ToggleFullscreen => {
                self.toggle_fullscreen();
                true
            }
        };
        applied.then_some(shortcut)
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    pub fn bounds(&self) -> Bounds {
        self.bounds.bounds()
    }

    /// Navigable rows/columns of the active sheet.
    pub fn extent(&self) -> GridExtent {
        self.virtualizer.extent()
    }

    pub fn virtualizer(&self) -> &ViewportVirtualizer {
        &self.virtualizer
    }

    pub fn render_mode(&self) -> RenderMode {
        self.virtualizer.mode()
    }

    pub fn visible_rows(&self) -> VirtualRange {
        self.virtualizer.visible_rows()
    }

    pub fn set_scroll(&mut self, left: f64, top: f64) {
        self.virtualizer.set_scroll(left, top);
    }

    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.virtualizer.resize(width, height);
    }

    pub fn measure_row(&mut self, row: u32, height: f64) -> bool {
        self.virtualizer.measure_row(row, height)
    }

    pub fn measure_col(&mut self, col: u32, width: f64) -> bool {
        self.virtualizer.measure_col(col, width)
    }

    /// Scroll horizontally to a measured element span.
    pub fn scroll_span_into_view(&mut self, left: f64, width: f64) -> bool {
        self.virtualizer.scroll_span_into_view(left, width)
    }
}

/// Whether committing `next` over `current` would change nothing visible
/// to the user. Formulas compare by source, ignoring their cache.
fn same_content(current: &Cell, next: &Cell) -> bool {
    match (current, next) {
        (Cell::Formula { source: a, .. }, Cell::Formula { source: b, .. }) => a == b,
        (a, b) => (!a.has_content() && !b.has_content()) || a == b,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::types::CellValue;

    fn session() -> EditorSession {
        EditorSession::new(EditorSettings::default())
    }

    fn two_sheet_workbook() -> ExternalWorkbook {
        ExternalWorkbook::from_json(
            r#"{
                "SheetNames": ["Data", "Notes"],
                "Sheets": {
                    "Data": {"!ref": "A1:A2", "A1": {"v": 5, "t": "n"}, "A2": {"f": "A1*2", "v": 10, "t": "n"}},
                    "Notes": {"!ref": "A1", "A1": {"v": "hello", "t": "s"}}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_is_blank() {
        let s = session();
        assert_eq!(s.file_name(), DEFAULT_FILE_NAME);
        assert_eq!(s.sheets().len(), 1);
        assert_eq!(s.sheets()[0].name, "Sheet1");
        assert_eq!(s.bounds(), Bounds::default());
        assert_eq!(s.extent().row_count, 100);
        assert_eq!(s.selection(), &SelectionState::NoSelection);
    }

    #[test]
    fn test_edit_recalculates_dependents() {
        let mut s = session();
        s.commit_text(0, 0, "5").unwrap();
        s.commit_text(1, 0, "=A1*2").unwrap();
        assert_eq!(s.cell(1, 0).value(), Some(&CellValue::Number(10.0)));
        s.commit_text(0, 0, "7").unwrap();
        assert_eq!(s.display_text(1, 0), "14");
    }

    #[test]
    fn test_far_write_grows_bounds_and_extent() {
        let mut s = session();
        s.commit_text(500, 0, "x").unwrap();
        assert_eq!(s.bounds().rows, 501);
        assert_eq!(s.extent().row_count, 601);
    }

    #[test]
    fn test_undo_redo_selects_cell() {
        let mut s = session();
        s.commit_text(2, 3, "a").unwrap();
        s.commit_text(2, 3, "b").unwrap();
        assert_eq!(s.undo(), Some(CellPosition::new(2, 3)));
        assert_eq!(s.display_text(2, 3), "a");
        assert_eq!(s.selected_cell(), Some(CellPosition::new(2, 3)));
        s.redo();
        assert_eq!(s.display_text(2, 3), "b");
        s.undo();
        s.undo();
        assert_eq!(s.cell(2, 3), &Cell::Empty);
        assert!(!s.can_undo());
        assert_eq!(s.undo(), None);
    }

    #[test]
    fn test_unchanged_commit_is_not_recorded() {
        let mut s = session();
        s.commit_text(0, 0, "=1+1").unwrap();
        s.commit_text(0, 0, "=1+1").unwrap();
        s.commit_text(0, 1, "").unwrap();
        s.undo();
        assert!(!s.can_undo());
    }

    #[test]
    fn test_rejected_date_keeps_cell() {
        let mut s = session();
        let date = parse_date_input("2024-01-01").unwrap();
        s.update_cell(0, 0, Cell::literal(date));
        assert!(matches!(
            s.commit_text(0, 0, "soon"),
            Err(GridError::InvalidInput(_))
        ));
        assert_eq!(s.cell(0, 0), &Cell::literal(date));
    }

    #[test]
    fn test_edit_lifecycle() {
        let mut s = session();
        assert_eq!(s.begin_edit(), None);
        s.select_cell(0, 0);
        assert_eq!(s.begin_edit().as_deref(), Some(""));
        assert!(s.update_draft("=2*3"));
        assert_eq!(s.commit_edit().unwrap(), Some(CellPosition::new(0, 0)));
        assert_eq!(s.display_text(0, 0), "6");
        assert_eq!(s.begin_edit().as_deref(), Some("=2*3"));
        assert_eq!(s.escape(), EscapeOutcome::CancelledEdit);
        assert_eq!(s.escape(), EscapeOutcome::ClearedSelection);
        assert_eq!(s.escape(), EscapeOutcome::Ignored);
    }

    #[test]
    fn test_escape_exits_fullscreen_first() {
        let mut s = session();
        s.select_cell(1, 1);
        s.toggle_fullscreen();
        assert_eq!(s.escape(), EscapeOutcome::ExitedFullscreen);
        assert!(!s.is_fullscreen());
        assert_eq!(s.selected_cell(), Some(CellPosition::new(1, 1)));
    }

    #[test]
    fn test_selection_wraps_rows() {
        let mut s = session();
        let cols = i64::from(s.extent().col_count);
        assert_eq!(s.select_cell(0, cols), Some(CellPosition::new(1, 0)));
        assert_eq!(
            s.move_selection(0, -1),
            Some(CellPosition::new(0, s.extent().col_count - 1))
        );
        assert_eq!(s.select_cell(-1, 0), None);
        assert_eq!(s.selected_cell(), Some(CellPosition::new(0, s.extent().col_count - 1)));
    }

    #[test]
    fn test_load_replaces_workbook() {
        let mut s = session();
        s.commit_text(0, 0, "old").unwrap();
        s.load_workbook("book.xlsx", two_sheet_workbook()).unwrap();
        assert_eq!(s.file_name(), "book.xlsx");
        assert_eq!(s.sheets().len(), 2);
        assert_eq!(s.display_text(1, 0), "10");
        assert!(!s.can_undo());
    }

    #[test]
    fn test_failed_load_keeps_session() {
        let mut s = session();
        s.commit_text(0, 0, "keep").unwrap();
        let ticket = s.begin_load("next.xlsx").unwrap();
        assert!(matches!(s.begin_load("other.xlsx"), Err(GridError::LoadInProgress)));
        let result = s.complete_load(&ticket, Err(GridError::Decode("corrupt".into())));
        assert!(matches!(result, Err(GridError::Decode(_))));
        assert!(!s.load_in_progress());
        assert_eq!(s.display_text(0, 0), "keep");
        assert_eq!(s.file_name(), DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_sheet_switch_resets_view() {
        let mut s = session();
        s.load_workbook("book.xlsx", two_sheet_workbook()).unwrap();
        s.commit_text(3, 0, "x").unwrap();
        s.select_cell(3, 0);
        assert!(s.set_active_sheet(1));
        assert!(!s.can_undo());
        assert_eq!(s.selected_cell(), None);
        assert_eq!(s.display_text(0, 0), "hello");
        assert!(!s.set_active_sheet(1));
        assert!(!s.set_active_sheet(9));
    }

    #[test]
    fn test_sheet_lifecycle_syncs_export() {
        let mut s = session();
        assert_eq!(s.add_sheet(), 1);
        assert_eq!(s.sheets()[1].name, "Sheet2");
        s.commit_text(0, 0, "on two").unwrap();
        s.rename_sheet(1, "Second").unwrap();
        assert!(matches!(
            s.rename_sheet(0, "Second"),
            Err(GridError::DuplicateSheetName(_))
        ));
        let wb = s.export_workbook().unwrap();
        assert_eq!(wb.sheet_names, vec!["Sheet1", "Second"]);
        assert!(wb.sheet("Second").unwrap().entries.contains_key("A1"));

        s.delete_sheet(1).unwrap();
        assert_eq!(s.active_sheet_index(), 0);
        assert!(matches!(s.delete_sheet(0), Err(GridError::LastSheet)));
        let wb = s.export_workbook().unwrap();
        assert_eq!(wb.sheet_names, vec!["Sheet1"]);
        assert!(wb.sheet("Second").is_none());
    }

    #[test]
    fn test_find_cycles_and_selects() {
        let mut s = session();
        s.commit_text(0, 1, "apple").unwrap();
        s.commit_text(4, 0, "Apple pie").unwrap();
        assert_eq!(s.set_find_query("APPLE"), 2);
        assert_eq!(s.find_next(), Some(CellPosition::new(4, 0)));
        assert_eq!(s.find_next(), Some(CellPosition::new(0, 1)));
        assert_eq!(s.find_prev(), Some(CellPosition::new(4, 0)));
        assert_eq!(s.selected_cell(), Some(CellPosition::new(4, 0)));
        s.commit_text(9, 9, "crab apple").unwrap();
        assert_eq!(s.find().match_count(), 3);
    }

    #[test]
    fn test_handle_key() {
        let mut s = session();
        assert_eq!(s.handle_key(&KeyInput::new("ArrowDown")), None);
        s.select_cell(0, 0);
        assert_eq!(
            s.handle_key(&KeyInput::new("ArrowDown")),
            Some(Shortcut::Move { d_row: 1, d_col: 0 })
        );
        assert_eq!(s.selected_cell(), Some(CellPosition::new(1, 0)));
        assert_eq!(s.handle_key(&KeyInput::new("Enter")), Some(Shortcut::BeginEdit));
        assert!(s.selection() != &SelectionState::NoSelection);
        assert_eq!(
            s.handle_key(&KeyInput::new("Escape").in_input()),
            Some(Shortcut::Escape)
        );
        assert_eq!(s.handle_key(&KeyInput::new("z").with_command(false)), None);
        assert_eq!(s.handle_key(&KeyInput::new("f")), Some(Shortcut::ToggleFullscreen));
        assert!(s.is_fullscreen());
    }

    #[test]
    fn test_rename_file_keeps_extension() {
        let mut s = session();
        assert_eq!(s.rename_file("budget").unwrap(), "budget.xlsx");
        assert!(s.rename_file("   ").is_err());
        assert_eq!(s.file_name(), "budget.xlsx");
    }

    #[test]
    fn test_new_workbook_after_load() {
        let mut s = session();
        s.load_workbook("book.xlsx", two_sheet_workbook()).unwrap();
        s.new_workbook();
        assert_eq!(s.sheets().len(), 1);
        assert_eq!(s.file_name(), DEFAULT_FILE_NAME);
        assert_eq!(s.export_workbook().unwrap().sheet_names, vec!["Sheet1"]);
    }
}
