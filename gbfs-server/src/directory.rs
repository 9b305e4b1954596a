//! Provider directory CSV parsing.
//!
//! The public directory is a CSV with a header row; columns are matched by
//! name, unknown columns are ignored, and missing columns leave the
//! corresponding provider fields empty.

use crate::domain::Provider;
use crate::gbfs::DecodeError;

/// Published location of the public provider directory.
pub const DEFAULT_DIRECTORY_URL: &str =
    "https://raw.githubusercontent.com/NABSA/gbfs/master/systems.csv";

/// Parse the provider directory CSV.
///
/// Every parsed provider starts out enabled; the enabled flag is only ever
/// flipped off later through the store.
pub fn parse_directory(data: &str) -> Result<Vec<Provider>, DecodeError> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DecodeError::MalformedCsv {
            message: e.to_string(),
        })?
        .clone();

    let mut providers = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| DecodeError::MalformedCsv {
            message: e.to_string(),
        })?;

        let mut provider = Provider {
            enabled: true,
            ..Provider::default()
        };

        for (i, column) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or_default().to_string();
            match column {
                "System ID" => provider.id = value,
                "Name" => provider.name = value,
                "Country Code" => provider.country_code = value,
                "Location" => provider.location = value,
                "URL" => provider.url = value,
                "Auto-Discovery URL" => provider.discovery_url = value,
                _ => {}
            }
        }

        providers.push(provider);
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_directory() {
        let csv = "\
Country Code,Name,Location,System ID,URL,Auto-Discovery URL
US,Austin B-cycle,\"Austin, TX\",bcycle_austin,https://austin.bcycle.com,https://gbfs.bcycle.com/bcycle_austin/gbfs.json
NO,Oslo Bysykkel,\"Oslo, NO\",oslobysykkel,https://oslobysykkel.no,https://gbfs.urbansharing.com/oslobysykkel.no/gbfs.json
";

        let providers = parse_directory(csv).unwrap();
        assert_eq!(providers.len(), 2);

        let austin = &providers[0];
        assert_eq!(austin.id, "bcycle_austin");
        assert_eq!(austin.name, "Austin B-cycle");
        assert_eq!(austin.country_code, "US");
        assert_eq!(austin.location, "Austin, TX");
        assert_eq!(
            austin.discovery_url,
            "https://gbfs.bcycle.com/bcycle_austin/gbfs.json"
        );
        assert!(austin.enabled);
    }

    #[test]
    fn unknown_columns_ignored() {
        let csv = "\
System ID,Name,Supported Versions,Authentication Info
demo,Demo System,2.3,
";

        let providers = parse_directory(csv).unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].id, "demo");
        assert_eq!(providers[0].name, "Demo System");
    }

    #[test]
    fn missing_columns_leave_fields_empty() {
        let csv = "\
System ID,Name
demo,Demo System
";

        let providers = parse_directory(csv).unwrap();
        let provider = &providers[0];
        assert_eq!(provider.id, "demo");
        assert!(provider.country_code.is_empty());
        assert!(provider.location.is_empty());
        assert!(provider.url.is_empty());
        assert!(provider.discovery_url.is_empty());
    }

    #[test]
    fn empty_directory_yields_no_providers() {
        let providers = parse_directory("System ID,Name\n").unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn ragged_rows_rejected() {
        let csv = "\
System ID,Name,Country Code
demo,Demo System
";
        assert!(matches!(
            parse_directory(csv),
            Err(DecodeError::MalformedCsv { .. })
        ));
    }
}
