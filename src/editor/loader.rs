//! Workbook load gating and file naming.
//!
//! Decoding happens in the host; the gate only decides whether a file may be
//! loaded and makes sure one load completes before the next begins.

use crate::error::{GridError, Result};

/// File extensions the host codec can read.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

/// Split `name` into base and extension (with the dot). A leading dot does
/// not start an extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

/// Reject files the codec cannot read, case-insensitively.
pub fn check_extension(file_name: &str) -> Result<()> {
    let (_, ext) = split_extension(file_name);
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(GridError::UnsupportedFileType(file_name.to_string()))
    }
}

/// New file name from an edited base, keeping the current extension.
///
/// A blank base is rejected so the caller keeps the old name.
pub fn rename_keeping_extension(current: &str, new_base: &str) -> Result<String> {
    let base = new_base.trim();
    if base.is_empty() {
        return Err(GridError::InvalidInput("file name cannot be blank".to_string()));
    }
    let (_, ext) = split_extension(current);
    Ok(format!("{base}{ext}"))
}

/// Proof that a load was admitted by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    file_name: String,
}

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Admits at most one load at a time.
#[derive(Debug, Default)]
pub struct LoadGate {
    next_id: u64,
    in_flight: Option<u64>,
}

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Admit a load of `file_name`. Fails on a bad extension or while
    /// another load is in flight.
    pub fn begin(&mut self, file_name: &str) -> Result<LoadTicket> {
        if self.in_flight.is_some() {
            log::warn!("rejecting load of {file_name:?}: another load is in progress");
            return Err(GridError::LoadInProgress);
        }
        check_extension(file_name)?;
        self.next_id += 1;
        self.in_flight = Some(self.next_id);
        log::info!("loading {file_name:?} (ticket {})", self.next_id);
        Ok(LoadTicket {
            id: self.next_id,
            file_name: file_name.to_string(),
        })
    }

    /// Release the gate for `ticket`, whatever the outcome of the load.
    pub fn finish(&mut self, ticket: &LoadTicket) -> Result<()> {
        if self.in_flight != Some(ticket.id) {
            return Err(GridError::StaleLoad(ticket.id));
        }
        self.in_flight = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("report.xlsx", true ; "xlsx")]
    #[test_case("OLD.XLS", true ; "uppercase xls")]
    #[test_case("data.csv", true ; "csv")]
    #[test_case("notes.txt", false ; "text")]
    #[test_case("xlsx", false ; "no extension")]
    #[test_case(".csv", false ; "dotfile")]
    fn test_check_extension(name: &str, ok: bool) {
        assert_eq!(check_extension(name).is_ok(), ok);
    }

    #[test]
    fn test_rename_keeps_extension() {
        assert_eq!(rename_keeping_extension("q1.xlsx", " q2 ").unwrap(), "q2.xlsx");
        assert_eq!(rename_keeping_extension("a.b.csv", "c").unwrap(), "c.csv");
        assert_eq!(rename_keeping_extension("untitled", "x").unwrap(), "x");
        assert!(rename_keeping_extension("q1.xlsx", "  ").is_err());
    }

    #[test]
    fn test_gate_rejects_overlapping_loads() {
        let mut gate = LoadGate::new();
        let first = gate.begin("a.xlsx").unwrap();
        assert!(matches!(gate.begin("b.xlsx"), Err(GridError::LoadInProgress)));
        gate.finish(&first).unwrap();
        assert!(!gate.is_busy());
        assert!(matches!(gate.finish(&first), Err(GridError::StaleLoad(_))));
        let second = gate.begin("b.csv").unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_bad_extension_does_not_occupy_gate() {
        let mut gate = LoadGate::new();
        assert!(matches!(
            gate.begin("a.pdf"),
            Err(GridError::UnsupportedFileType(_))
        ));
        assert!(!gate.is_busy());
    }
}
