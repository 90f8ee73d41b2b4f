use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;

/// Serializes JSON records as CSV.
///
/// The header row is the first record's keys, in order. Later records are
/// projected onto that header; missing or null fields become empty cells.
/// Cells are quoted only when they hold a comma, quote or line break, and
/// the output has no trailing newline.
pub fn json_to_csv(rows: &[Value]) -> Result<String, csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(String::new());
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(
            headers
                .iter()
                .map(|header| render_cell(row.get(header.as_str()))),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let mut output = String::from_utf8_lossy(&bytes).into_owned();
    if output.ends_with('\n') {
        output.pop();
    }
    Ok(output)
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
