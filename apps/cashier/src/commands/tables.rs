//! # Table Commands
//!
//! Which tables have a cuenta to settle.

use std::path::Path;

use mesa_core::occupied_tables;
use tracing::debug;

use crate::error::AppError;
use crate::gateway::{BillGateway, FileGateway};

/// `tables`: one line per table, occupied ones only unless `all`.
pub fn list(file: &Path, all: bool) -> Result<String, AppError> {
    let tables = FileGateway::new().with_tables(file).list_tables()?;
    let shown = if all { tables.clone() } else { occupied_tables(&tables) };
    debug!(total = tables.len(), shown = shown.len(), "Tables listed");

    if shown.is_empty() {
        return Ok("No hay mesas ocupadas".to_string());
    }

    Ok(shown
        .iter()
        .map(|t| format!("Mesa {:<4} id={:<6} {:?}", t.number, t.id, t.status))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tables_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 10, "numero": 1, "estado": "disponible"}},
                {{"id": 11, "numero": 2, "estado": "ocupada"}},
                {{"id": 12, "numero": 3, "estado": "espera"}},
                {{"id": 13, "numero": 4, "estado": "ocupada"}}
            ]"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_lists_only_occupied() {
        let file = tables_file();
        let out = list(file.path(), false).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Mesa 2"));
        assert!(lines[1].starts_with("Mesa 4"));
    }

    #[test]
    fn test_lists_all() {
        let file = tables_file();
        assert_eq!(list(file.path(), true).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_no_occupied_tables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 1, "numero": 1, "estado": "disponible"}}]"#).unwrap();
        assert_eq!(list(file.path(), false).unwrap(), "No hay mesas ocupadas");
    }
}
