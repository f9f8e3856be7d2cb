//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod formatters;
pub mod json;
pub mod table;

/// Print rows as a table, or as a JSON envelope around `data`
pub fn print_rows<R, D>(rows: &[R], data: &D, format: OutputFormat) -> Result<()>
where
    R: Tabled,
    D: Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => println!("{}", json::format_json(data)?),
        OutputFormat::Table => println!("{}", table::format_table(rows)),
    }
    Ok(())
}
