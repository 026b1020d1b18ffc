use crate::error::{Result, TribarrierError};
use crate::types::Observation;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: &[&str] = &["timestamp", "price"];
const OPTIONAL_COLUMNS: &[&str] = &["open", "high", "low", "close", "volume"];

/// CSV loader for raw observation rows.
///
/// Contract: a header row is required and names match case-insensitively
/// after trimming; `timestamp` and `price` are mandatory; a data row with
/// fewer fields than the header is fatal; empty optional fields are absent;
/// a non-numeric `price` is fatal.
pub struct CsvLoader;

impl CsvLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let file = std::fs::File::open(path)?;
        Self::load_from_reader(file)
    }

    pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<Observation>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = Self::discover_columns(&headers)?;
        let header_len = headers.len();

        let timestamp_idx = columns["timestamp"];
        let price_idx = columns["price"];

        let mut observations = Vec::new();

        for (i, record) in rdr.records().enumerate() {
            let row = i + 1;
            let record = record?;

            if record.len() < header_len {
                return Err(TribarrierError::Parse {
                    row,
                    message: format!(
                        "row has {} fields, header has {}",
                        record.len(),
                        header_len
                    ),
                });
            }

            let timestamp = record.get(timestamp_idx).unwrap_or("").to_string();

            let price_raw = record.get(price_idx).unwrap_or("");
            let price = price_raw.parse::<f64>().map_err(|_| TribarrierError::Parse {
                row,
                message: format!("non-numeric price '{}'", price_raw),
            })?;

            let mut obs = Observation::new(timestamp, price);
            obs.open = Self::optional_field(&record, &columns, "open", row);
            obs.high = Self::optional_field(&record, &columns, "high", row);
            obs.low = Self::optional_field(&record, &columns, "low", row);
            obs.close = Self::optional_field(&record, &columns, "close", row);
            obs.volume = Self::optional_field(&record, &columns, "volume", row);

            observations.push(obs);
        }

        if observations.is_empty() {
            return Err(TribarrierError::InsufficientData(
                "CSV contained no data rows".to_string(),
            ));
        }

        log::info!("loaded {} observation rows", observations.len());
        Ok(observations)
    }

    /// Map known column names to header positions, case-insensitively.
    fn discover_columns(headers: &csv::StringRecord) -> Result<HashMap<&'static str, usize>> {
        let mut columns = HashMap::new();

        for (idx, header) in headers.iter().enumerate() {
            let lowered = header.trim().to_lowercase();
            for known in REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS) {
                if lowered == *known && !columns.contains_key(known) {
                    columns.insert(*known, idx);
                }
            }
        }

        for required in REQUIRED_COLUMNS {
            if !columns.contains_key(required) {
                return Err(TribarrierError::Parse {
                    row: 0,
                    message: format!("missing required column '{}'", required),
                });
            }
        }

        Ok(columns)
    }

    /// Empty optional fields are absent; unparseable non-empty values are
    /// dropped with a warning rather than failing the load.
    fn optional_field(
        record: &csv::StringRecord,
        columns: &HashMap<&'static str, usize>,
        name: &'static str,
        row: usize,
    ) -> Option<f64> {
        let idx = *columns.get(name)?;
        let raw = record.get(idx)?;
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("row {}: ignoring non-numeric {} value '{}'", row, name, raw);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_columns() {
        let data = "timestamp,price\n2023-01-02,100.0\n2023-01-03,101.5\n";
        let rows = CsvLoader::load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, 100.0);
        assert!(rows[0].volume.is_none());
    }

    #[test]
    fn header_match_is_case_insensitive_and_trimmed() {
        let data = " Timestamp , PRICE ,Volume\n2023-01-02,100.0,5000\n";
        let rows = CsvLoader::load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows[0].volume, Some(5000.0));
    }

    #[test]
    fn values_are_trimmed() {
        let data = "timestamp,price\n 2023-01-02 , 100.25 \n";
        let rows = CsvLoader::load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows[0].timestamp, "2023-01-02");
        assert_eq!(rows[0].price, 100.25);
    }

    #[test]
    fn short_row_is_fatal() {
        let data = "timestamp,price,volume\n2023-01-02,100.0,10\n2023-01-03,101.0\n";
        let err = CsvLoader::load_from_reader(data.as_bytes()).unwrap_err();
        match err {
            TribarrierError::Parse { row, .. } => assert_eq!(row, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn empty_optional_field_is_absent() {
        let data = "timestamp,price,volume\n2023-01-02,100.0,\n2023-01-03,101.0,250\n";
        let rows = CsvLoader::load_from_reader(data.as_bytes()).unwrap();
        assert!(rows[0].volume.is_none());
        assert_eq!(rows[1].volume, Some(250.0));
    }

    #[test]
    fn non_numeric_price_is_fatal() {
        let data = "timestamp,price\n2023-01-02,abc\n";
        let err = CsvLoader::load_from_reader(data.as_bytes()).unwrap_err();
        match err {
            TribarrierError::Parse { row, message } => {
                assert_eq!(row, 1);
                assert!(message.contains("price"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn missing_price_column_is_fatal() {
        let data = "timestamp,close\n2023-01-02,100.0\n";
        assert!(CsvLoader::load_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn empty_file_reports_insufficient_data() {
        let data = "timestamp,price\n";
        let err = CsvLoader::load_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, TribarrierError::InsufficientData(_)));
    }
}
