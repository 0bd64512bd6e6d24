//! Human-readable run report, written to stderr.

use std::fmt::Display;
use std::io::{self, Write};

use dexsync_recon::SyncResult;

pub fn print_report(result: &SyncResult) {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    // A closed stderr is not worth failing the run over.
    let _ = write_report(&mut out, result);
}

pub fn write_report(out: &mut impl Write, result: &SyncResult) -> io::Result<()> {
    let d = &result.diagnostics;
    let domain = result.meta.domain;

    section(
        out,
        "Species file found, but ignored:",
        &d.ignored_files,
    )?;
    section(
        out,
        &format!("No {domain} specified for forms in the sheet, even though form entries exist in species files:"),
        &d.no_source_forms,
    )?;
    section(
        out,
        &format!("Removed {domain} for Pokémon with blank rows in the sheet:"),
        &d.removed,
    )?;
    section(
        out,
        &format!("No form entry found in the species file, but form {domain} was specified in the sheet:"),
        &d.no_form_entry,
    )?;
    section(
        out,
        "Sheet rows with no species file:",
        &d.rows_without_file,
    )?;
    section(
        out,
        "Species files whose name matches no sheet row:",
        &d.unmatched_records,
    )?;
    section(
        out,
        "Skipped sheet rows:",
        d.skipped_rows
            .iter()
            .map(|row| format!("line {}: {}", row.line, row.reason)),
    )?;

    let s = &result.summary;
    writeln!(
        out,
        "\n{domain} sync: {} rows, {} species, {} files {}, {} unchanged{}",
        result.meta.rows,
        result.meta.entities,
        s.changed_files,
        if result.meta.dry_run { "would change" } else { "changed" },
        s.unchanged_files,
        if d.is_clean() { "" } else { " (see report above)" },
    )
}

fn section<T: Display>(
    out: &mut impl Write,
    title: &str,
    items: impl IntoIterator<Item = T>,
) -> io::Result<()> {
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return Ok(());
    }
    writeln!(out, "\n{title}")?;
    for item in items {
        writeln!(out, "  - {item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexsync_recon::{Diagnostics, Domain, EntityKey, FormName, SyncMeta};

    fn result(diagnostics: Diagnostics, dry_run: bool) -> SyncResult {
        SyncResult {
            meta: SyncMeta {
                domain: Domain::Behaviour,
                engine_version: "0.0.0".into(),
                run_at: "2026-01-01T00:00:00+00:00".into(),
                dry_run,
                data_dir: "species".into(),
                rows: 3,
                entities: 2,
                files_scanned: 4,
            },
            summary: diagnostics.summary(),
            diagnostics,
        }
    }

    fn render(result: &SyncResult) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn clean_run_prints_only_the_summary() {
        let text = render(&result(Diagnostics::new(), false));
        assert_eq!(
            text,
            "\nbehaviour sync: 3 rows, 2 species, 0 files changed, 0 unchanged\n"
        );
    }

    #[test]
    fn categories_are_listed_with_their_entries() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.no_source_form(
            &EntityKey::from_display("Pikachu"),
            &FormName::Named("Partner".into()),
        );
        diagnostics.ignored_files.insert("generation1/bulbasaur.json".into());
        let text = render(&result(diagnostics, true));

        assert!(text.contains("Species file found, but ignored:\n  - generation1/bulbasaur.json\n"));
        assert!(text.contains("  - pikachu [Partner]\n"));
        assert!(text.contains("files would change"));
        assert!(text.contains("(see report above)"));
        assert!(!text.contains("Skipped sheet rows"));
    }
}
