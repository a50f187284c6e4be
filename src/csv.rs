use ::csv::ReaderBuilder;
use serde_json::Value;
use vault_types::import::ImportRow;

use crate::parser::ParseError;

/// Reads delimited text with a header row into rows keyed by header.
///
/// Every value stays a string and empty cells are left out of the row, as
/// an empty spreadsheet cell is. Rows whose values are all blank (including
/// the trailing line most exporters emit) are dropped.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<ImportRow>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = rdr.headers().map_err(ParseError::Csv)?.clone();
    let mut rows = vec![];
    for record in rdr.records() {
        let record = record.map_err(ParseError::Csv)?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let mut row = ImportRow::default();
        for (header, value) in headers.iter().zip(record.iter()) {
            if header.is_empty() || value.is_empty() {
                continue;
            }
            row.insert(header, Value::String(value.to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_rows_by_header() {
        let input = "productName,category,price,colors\n\
                     Air Runner,Sneakers,120,\"red, blue\"\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        assert_eq!(1, rows.len());
        assert_eq!(Some(&json!("Air Runner")), rows[0].get("productName"));
        assert_eq!(Some(&json!("120")), rows[0].get("price"));
        assert_eq!(Some(&json!("red, blue")), rows[0].get("colors"));
    }

    #[test]
    fn leaves_out_empty_cells() {
        let input = "productName,category,price,colors\nAir Runner,,,\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        assert_eq!(
            ImportRow(
                json!({ "productName": "Air Runner" })
                    .as_object()
                    .unwrap()
                    .clone()
            ),
            rows[0]
        );
    }

    #[test]
    fn drops_blank_rows() {
        let input = "productName,price\nA,1\n,\n  ,  \nB,2\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.get("productName")).collect();
        assert_eq!(vec![&json!("A"), &json!("B")], names);
    }

    #[test]
    fn keeps_short_rows() {
        let input = "productName,price,inventory\nA,1\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        assert_eq!(1, rows.len());
        assert!(rows[0].get("inventory").is_none());
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut input = b"productName\n".to_vec();
        input.extend_from_slice(&[0xc3, 0x28, b'\n']);
        assert!(matches!(read_rows(&input), Err(ParseError::Csv(_))));
    }
}
