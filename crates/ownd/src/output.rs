//! Output formatting: one text line per item, or JSON.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Render a serializable item. `text` is used for [`OutputFormat::Text`].
pub fn render<T: Serialize>(
    format: OutputFormat,
    item: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Text => text(item),
        OutputFormat::Json => serde_json::to_string_pretty(item)?,
        OutputFormat::JsonCompact => serde_json::to_string(item)?,
    })
}

/// Write a line to stdout unless `--quiet`.
///
/// Flushes so `listen` output reaches pipes as it arrives.
pub fn print_output(output: &str, quiet: bool) -> Result<(), CliError> {
    if quiet || output.is_empty() {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        frame: &'static str,
    }

    #[test]
    fn text_uses_the_formatter() {
        let out = render(OutputFormat::Text, &Row { frame: "*1*1*12##" }, |r| {
            format!("-> {}", r.frame)
        });
        assert_eq!(out.expect("renders"), "-> *1*1*12##");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render(OutputFormat::JsonCompact, &Row { frame: "*1*1*12##" }, |_| {
            String::new()
        });
        assert_eq!(out.expect("renders"), r#"{"frame":"*1*1*12##"}"#);
    }
}
