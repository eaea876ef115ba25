use policy_grid_core::RowUid;
use policy_grid_core::backend::TableBackend;
use std::io::Write;

/// Write used columns of `rows` as CSV, header row first. Missing cells are written empty.
pub fn export_csv<W: Write>(
    table: &impl TableBackend,
    rows: &[RowUid],
    writer: W,
) -> Result<(), csv::Error> {
    let mut column_names = vec![];
    for col_uid in table.used_columns() {
        let Some(col) = table.column_info(col_uid) else {
            continue;
        };
        column_names.push(col.name.as_str());
    }
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(column_names)?;
    for row_uid in rows {
        let record: Vec<&str> = table
            .used_columns()
            .map(|col_uid| table.get((*row_uid, col_uid).into()).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Ask for a destination file and export `rows` there. Returns the chosen path, None if the
/// dialog was cancelled.
#[cfg(not(target_arch = "wasm32"))]
pub fn export_csv_dialog(
    table: &impl TableBackend,
    rows: &[RowUid],
) -> Result<Option<std::path::PathBuf>, csv::Error> {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return Ok(None);
    };
    let file = std::fs::File::create(&path).inspect_err(|e| log::warn!("{path:?}: {e}"))?;
    export_csv(table, rows, file)?;
    log::debug!("exported {} rows to {path:?}", rows.len());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::string::StringBackend;

    #[test]
    fn exports_given_rows_only() {
        let mut backend = StringBackend::new([("Rule", "rule_name"), ("Service", "services")]);
        backend.insert_row([Some("allow-web"), Some("https")]);
        backend.insert_row([Some("allow-ssh"), None]);
        backend.insert_row([Some("deny, all"), Some("any")]);

        let mut out = Vec::new();
        export_csv(&backend, &[RowUid(1), RowUid(2)], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Rule,Service\nallow-ssh,\n\"deny, all\",any\n"
        );
    }
}
