//! Company dataset loader with encoding and delimiter auto-detection.
//!
//! The company file is a small CSV exported from a spreadsheet. It may be
//! EUC-KR or UTF-8, comma or semicolon separated, and may carry an unnamed
//! leading index column; all of that is handled here.

use std::path::Path;

use crate::error::{CompanyError, CompanyResult};
use crate::models::CompanyRecord;

/// Columns the company file must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Company", "Sector", "Industry", "Market_Cap", "Revenue"];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed companies, in file order
    pub records: Vec<CompanyRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "euc-kr" | "cp949" | "uhc" => "euc-kr".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding label.
///
/// Unknown labels fall back to lossy UTF-8. A leading BOM is stripped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let codec = encoding_rs::Encoding::for_label(encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    let (decoded, _, _) = codec.decode(bytes);
    decoded.into_owned()
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse company CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use tradeboard::parse_companies;
///
/// let csv = "Company,Symbol,Sector,Industry,Market_Cap,Revenue\nSamsung,005930,Tech,Semis,400,300";
/// let companies = parse_companies(csv, ',').unwrap();
/// assert_eq!(companies[0].company, "Samsung");
/// ```
pub fn parse_companies(content: &str, delimiter: char) -> CompanyResult<Vec<CompanyRecord>> {
    parse_with_headers(content, delimiter).map(|(records, _)| records)
}

fn parse_with_headers(
    content: &str,
    delimiter: char,
) -> CompanyResult<(Vec<CompanyRecord>, Vec<String>)> {
    if content.trim().is_empty() {
        return Err(CompanyError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(&e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(CompanyError::MissingColumn(missing.to_string()));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<CompanyRecord>() {
        records.push(row.map_err(|e| parse_error(&e))?);
    }

    Ok((records, headers))
}

fn parse_error(e: &csv::Error) -> CompanyError {
    CompanyError::Parse {
        line: e.position().map(|p| p.line()).unwrap_or(0),
        message: e.to_string(),
    }
}

/// Parse a company file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = load_companies("skcompany.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Companies: {}", result.records.len());
/// ```
pub fn load_companies<P: AsRef<Path>>(path: P) -> CompanyResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse company bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CompanyResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let (records, headers) = parse_with_headers(&content, delimiter)?;

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
,Company,Symbol,Sector,Industry,Market_Cap,Revenue
0,Samsung Electronics,005930,Technology,Semiconductors,420.5,302.2
1,SK Hynix,000660,Technology,Semiconductors,120.1,44.6
2,Hyundai Motor,005380,Consumer Cyclical,Auto Manufacturers,45.3,142.5
";

    #[test]
    fn test_parse_with_index_column() {
        let companies = parse_companies(SAMPLE, ',').unwrap();

        assert_eq!(companies.len(), 3);
        assert_eq!(companies[0].company, "Samsung Electronics");
        assert_eq!(companies[0].symbol, "005930");
        assert_eq!(companies[0].sector, "Technology");
        assert_eq!(companies[2].industry, "Auto Manufacturers");
        assert_eq!(companies[1].market_cap, 120.1);
        assert_eq!(companies[1].revenue, 44.6);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = "Company;Symbol;Sector;Industry;Market_Cap;Revenue\nPOSCO;005490;Materials;Steel;25;77";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.records[0].company, "POSCO");
        assert_eq!(result.headers.len(), 6);
    }

    #[test]
    fn test_missing_column() {
        let csv = "Company,Sector,Industry,Revenue\nPOSCO,Materials,Steel,77";
        let err = parse_companies(csv, ',').unwrap_err();
        assert!(matches!(err, CompanyError::MissingColumn(ref c) if c == "Market_Cap"));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let csv = "Company,Symbol,Sector,Industry,Market_Cap,Revenue\nPOSCO,005490,Materials,Steel,lots,77";
        let err = parse_companies(csv, ',').unwrap_err();
        match err {
            CompanyError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_companies("  \n", ','), Err(CompanyError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_euc_kr_decoding() {
        // "조" in EUC-KR
        let bytes: &[u8] = &[0xC1, 0xB6];
        assert_eq!(decode_content(bytes, "euc-kr"), "조");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let result = load_companies(file.path()).unwrap();
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.records.len(), 3);
    }
}
