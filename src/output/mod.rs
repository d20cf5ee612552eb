use crate::rename::RenameResult;
use std::io::{self, Write};

/// Display dry run results in a formatted output
pub fn display_dry_run(result: &RenameResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "========================================")?;
    writeln!(writer, "              DRY RUN")?;
    writeln!(writer, "========================================")?;
    writeln!(writer)?;
    writeln!(writer, "Source:     {}", result.source)?;
    writeln!(writer, "Operations: {}", result.operations.len())?;
    writeln!(writer)?;

    if result.operations.is_empty() {
        writeln!(writer, "No files to rename.")?;
        write_skips(result, writer)?;
        return Ok(());
    }

    writeln!(writer, "Planned changes:")?;
    writeln!(writer)?;

    for (i, op) in result.operations.iter().enumerate() {
        writeln!(writer, "  {}. {}", i + 1, op.source_name)?;
        writeln!(writer, "     To:   {}", op.destination_path.display())?;

        if let Some(counter) = op.counter {
            writeln!(writer, "     [!] Name taken, counter {} added", counter)?;
        }

        writeln!(writer)?;
    }

    // Summary
    writeln!(writer, "----------------------------------------")?;
    writeln!(writer, "Summary:")?;
    writeln!(writer, "  {} files would be renamed", result.operations.len())?;

    let disambiguated = result.disambiguated_count();
    if disambiguated > 0 {
        writeln!(writer, "  {} names would get a counter", disambiguated)?;
    }

    write_skips(result, writer)?;

    writeln!(writer)?;
    writeln!(writer, "Run without --dry to apply these changes.")?;

    Ok(())
}

/// Display execution results (non-dry-run)
pub fn display_execution_result(result: &RenameResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "Successfully renamed {} files.",
        result.operations.len()
    )?;

    let disambiguated = result.disambiguated_count();
    if disambiguated > 0 {
        writeln!(writer, "  {} names got a counter.", disambiguated)?;
    }

    write_skips(result, writer)?;

    Ok(())
}

fn write_skips(result: &RenameResult, writer: &mut impl Write) -> io::Result<()> {
    if result.unchanged > 0 {
        writeln!(writer, "  {} already named", result.unchanged)?;
    }
    if result.skipped_missing > 0 {
        writeln!(writer, "  {} sources not found", result.skipped_missing)?;
    }
    if result.skipped_unlabeled > 0 {
        writeln!(writer, "  {} skipped without a name", result.skipped_unlabeled)?;
    }
    Ok(())
}
