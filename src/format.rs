//! CSV serialization of aggregated rows.

use crate::engine::ERROR_PREFIX;
use crate::record::{AggregatedRecord, InputRecord};
use crate::schema::Schema;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;

fn writer<W: Write>(out: W, quote_style: QuoteStyle) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(quote_style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out)
}

fn output_fields(row: &AggregatedRecord, schema: &Schema) -> Vec<String> {
    vec![
        row.key.recipient_name.clone(),
        row.key.provider_name.clone(),
        schema.output_categories.label(row.key.category).to_string(),
        row.total_paid.to_string(),
        row.total_refunded.to_string(),
        row.payment_date(),
    ]
}

/// Writes the target document: one line per row, each `\n`-terminated.
///
/// Column order: recipient, provider, category label, total paid,
/// total refunded, payment date (`MM/01/YYYY`).
///
/// A document never starts with the error marker: if the first field of
/// the first line would, that line is written fully quoted.
pub fn write_output<W: Write>(
    rows: &[AggregatedRecord],
    schema: &Schema,
    mut out: W,
) -> Result<(), csv::Error> {
    let header = schema.output_header.iter().cloned();
    let body = rows.iter().map(|row| output_fields(row, schema));
    let mut records = header.chain(body);

    if let Some(first) = records.next() {
        let style = match first.first() {
            Some(field) if field.starts_with(ERROR_PREFIX) => QuoteStyle::Always,
            _ => QuoteStyle::Necessary,
        };
        let mut first_writer = writer(&mut out, style);
        first_writer.write_record(&first)?;
        first_writer.flush()?;
    }

    let mut csv_writer = writer(&mut out, QuoteStyle::Necessary);
    for record in records {
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes records back in the source layout, header first.
///
/// Parsing the result with the same schema yields the same records.
pub fn write_source_document<W: Write>(
    records: &[InputRecord],
    schema: &Schema,
    out: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = writer(out, QuoteStyle::Necessary);
    csv_writer.write_record(&schema.input_header)?;

    for record in records {
        let amount_paid = record.amount_paid.to_string();
        let amount_refunded = record.amount_refunded.to_string();
        let period = record.period.to_string();
        csv_writer.write_record([
            record.recipient_name.as_str(),
            record.provider_name.as_str(),
            schema.input_categories.label(record.category),
            amount_paid.as_str(),
            amount_refunded.as_str(),
            period.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Number of non-empty lines in an output document.
pub fn line_count(output: &str) -> usize {
    output.lines().filter(|line| !line.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Amount;
    use crate::record::{Category, GroupKey, YearMonth};

    fn row(recipient: &str, provider: &str, paid: u64) -> AggregatedRecord {
        AggregatedRecord {
            key: GroupKey {
                recipient_name: recipient.to_string(),
                provider_name: provider.to_string(),
                category: Category::Medical,
            },
            total_paid: Amount::new(paid),
            total_refunded: Amount::new(200),
            payment_month: YearMonth::new(2023, 5).unwrap(),
        }
    }

    fn render(rows: &[AggregatedRecord], schema: &Schema) -> String {
        let mut output = Vec::new();
        write_output(rows, schema, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_output_format() {
        let output = render(&[row("A", "ClinicX", 1500)], &Schema::default());
        assert_eq!(output, "A,ClinicX,medical,1500,200,05/01/2023\n");
    }

    #[test]
    fn test_quotes_names_when_needed() {
        let output = render(
            &[row("Doe, Jane", "Clinic \"Sun\"", 1)],
            &Schema::default(),
        );
        assert_eq!(
            output,
            "\"Doe, Jane\",\"Clinic \"\"Sun\"\"\",medical,1,200,05/01/2023\n"
        );
    }

    #[test]
    fn test_leading_error_marker_is_quoted() {
        let output = render(
            &[row("ERROR: none", "ClinicX", 1), row("ERROR: two", "ClinicY", 2)],
            &Schema::default(),
        );
        assert_eq!(
            output,
            "\"ERROR: none\",\"ClinicX\",\"medical\",\"1\",\"200\",\"05/01/2023\"\n\
             ERROR: two,ClinicY,medical,2,200,05/01/2023\n"
        );
    }

    #[test]
    fn test_no_rows_is_empty_document() {
        assert_eq!(render(&[], &Schema::default()), "");
    }

    #[test]
    fn test_optional_header_and_labels() {
        let mut schema = Schema::default();
        schema.output_categories.medical = "診療・治療".to_string();
        schema.output_header = Some(
            ["name", "provider", "kind", "paid", "refunded", "date"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        let output = render(&[row("A", "B", 3)], &schema);
        assert_eq!(
            output,
            "name,provider,kind,paid,refunded,date\nA,B,診療・治療,3,200,05/01/2023\n"
        );
    }

    #[test]
    fn test_source_document_layout() {
        let records = vec![row("A", "ClinicX", 1500).to_input_record()];
        let mut output = Vec::new();
        write_source_document(&records, &Schema::default(), &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "recipient_name,provider_name,category,amount_paid,amount_refunded,period\n\
             A,ClinicX,medical,1500,200,2023-05\n"
        );
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("a\nb\n"), 2);
        assert_eq!(line_count("a\r\n\r\nb"), 2);
    }
}
