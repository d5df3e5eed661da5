//! Per-row CSV validation.
//!
//! Pure function from a raw CSV row to either a typed record or the full
//! list of violations. Every rule is checked independently so a submitter
//! gets one complete diagnostic per row instead of fixing errors one at a
//! time.

use std::collections::BTreeMap;

use crate::models::report::{MONTH_NAMES, Month, ReportRecord, current_year};

/// Normalized names of the six expected columns.
const NGO_ID: &str = "ngoid";
const MONTH: &str = "month";
const YEAR: &str = "year";
const PEOPLE_HELPED: &str = "peoplehelped";
const EVENTS_CONDUCTED: &str = "eventsconducted";
const FUNDS_UTILIZED: &str = "fundsutilized";

/// Collapse header spelling variants: "NGO ID", "ngoId" and "NGO_ID" all
/// normalize to "ngoid".
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase()
}

/// Validate one raw row (original header name -> value).
///
/// Returns the typed record, or a non-empty error list; never both.
pub fn validate_row(row: &BTreeMap<String, String>) -> Result<ReportRecord, Vec<String>> {
    let lookup: BTreeMap<String, &str> = row
        .iter()
        .map(|(k, v)| (normalize_header(k), v.as_str()))
        .collect();
    let field = |key: &str| {
        lookup
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let mut errors = Vec::new();

    let ngo_id = field(NGO_ID);
    if ngo_id.is_none() {
        errors.push("NGO ID is required".to_string());
    }

    let month = match field(MONTH) {
        None => {
            errors.push("Month is required".to_string());
            None
        }
        Some(m) => match Month::parse(m) {
            Some(month) => Some(month),
            None => {
                errors.push(format!(
                    "Invalid month: \"{}\". Must be one of: {}",
                    m,
                    MONTH_NAMES.join(", ")
                ));
                None
            }
        },
    };

    let max_year = current_year();
    let year = match field(YEAR) {
        None => {
            errors.push("Year is required".to_string());
            None
        }
        Some(s) => match s.parse::<i32>() {
            Err(_) => {
                errors.push(format!("Invalid year: \"{}\". Must be a valid number", s));
                None
            }
            Ok(y) if !(2020..=max_year).contains(&y) => {
                errors.push(format!(
                    "Invalid year: {}. Must be between 2020 and {}",
                    y, max_year
                ));
                None
            }
            Ok(y) => Some(y),
        },
    };

    let people_helped = parse_positive_int(field(PEOPLE_HELPED), "People Helped", &mut errors);
    let events_conducted =
        parse_positive_int(field(EVENTS_CONDUCTED), "Events Conducted", &mut errors);
    let funds_utilized = parse_positive_real(field(FUNDS_UTILIZED), "Funds Utilized", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ReportRecord {
        ngo_id: ngo_id.expect("checked above").to_string(),
        month: month.expect("checked above"),
        year: year.expect("checked above"),
        people_helped: people_helped.expect("checked above"),
        events_conducted: events_conducted.expect("checked above"),
        funds_utilized: funds_utilized.expect("checked above"),
    })
}

fn parse_positive_int(value: Option<&str>, label: &str, errors: &mut Vec<String>) -> Option<i32> {
    match value {
        None => {
            errors.push(format!("{} is required", label));
            None
        }
        Some(s) => match s.parse::<i32>() {
            Err(_) => {
                errors.push(format!("Invalid {}: \"{}\". Must be a valid number", label, s));
                None
            }
            Ok(n) if n <= 0 => {
                errors.push(format!("{} must be greater than 0, got: {}", label, n));
                None
            }
            Ok(n) => Some(n),
        },
    }
}

fn parse_positive_real(value: Option<&str>, label: &str, errors: &mut Vec<String>) -> Option<f64> {
    match value {
        None => {
            errors.push(format!("{} is required", label));
            None
        }
        Some(s) => match s.parse::<f64>() {
            Err(_) => {
                errors.push(format!("Invalid {}: \"{}\". Must be a valid number", label, s));
                None
            }
            Ok(n) if n <= 0.0 => {
                errors.push(format!("{} must be greater than 0, got: {}", label, n));
                None
            }
            Ok(n) => Some(n),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_row() -> BTreeMap<String, String> {
        row(&[
            ("NGO ID", "NGO001"),
            ("Month", "January"),
            ("Year", "2024"),
            ("People Helped", "150"),
            ("Events Conducted", "5"),
            ("Funds Utilized", "25000"),
        ])
    }

    #[test]
    fn test_valid_row_produces_record() {
        let record = validate_row(&valid_row()).expect("should validate");
        assert_eq!(record.ngo_id, "NGO001");
        assert_eq!(record.month, Month::January);
        assert_eq!(record.year, 2024);
        assert_eq!(record.people_helped, 150);
        assert_eq!(record.events_conducted, 5);
        assert_eq!(record.funds_utilized, 25000.0);
    }

    #[test]
    fn test_header_aliases_are_equivalent() {
        for headers in [
            ["ngoId", "month", "year", "peopleHelped", "eventsConducted", "fundsUtilized"],
            ["NGO_ID", "MONTH", "YEAR", "PEOPLE_HELPED", "EVENTS_CONDUCTED", "FUNDS_UTILIZED"],
        ] {
            let r = row(&[
                (headers[0], "NGO002"),
                (headers[1], "March"),
                (headers[2], "2023"),
                (headers[3], "10"),
                (headers[4], "2"),
                (headers[5], "99.5"),
            ]);
            let record = validate_row(&r).expect("aliases should match");
            assert_eq!(record.ngo_id, "NGO002");
            assert_eq!(record.funds_utilized, 99.5);
        }
    }

    #[test]
    fn test_values_are_trimmed() {
        let mut r = valid_row();
        r.insert("NGO ID".to_string(), "  NGO001  ".to_string());
        let record = validate_row(&r).expect("should validate");
        assert_eq!(record.ngo_id, "NGO001");
    }

    #[test]
    fn test_invalid_month_reported() {
        let mut r = valid_row();
        r.insert("Month".to_string(), "Marchh".to_string());
        let errors = validate_row(&r).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Invalid month: \"Marchh\""));
        assert!(errors[0].contains("January"));
    }

    #[test]
    fn test_year_out_of_range_reported() {
        let mut r = valid_row();
        r.insert("Year".to_string(), "2019".to_string());
        let errors = validate_row(&r).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Invalid year: 2019."));
    }

    #[test]
    fn test_non_numeric_year_reported() {
        let mut r = valid_row();
        r.insert("Year".to_string(), "20x4".to_string());
        let errors = validate_row(&r).unwrap_err();
        assert_eq!(errors, vec!["Invalid year: \"20x4\". Must be a valid number"]);
    }

    #[test]
    fn test_zero_and_negative_numbers_rejected() {
        let mut r = valid_row();
        r.insert("People Helped".to_string(), "0".to_string());
        r.insert("Events Conducted".to_string(), "-3".to_string());
        r.insert("Funds Utilized".to_string(), "0.0".to_string());
        let errors = validate_row(&r).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("People Helped must be greater than 0, got: 0"));
        assert!(errors[1].contains("Events Conducted must be greater than 0, got: -3"));
        assert!(errors[2].contains("Funds Utilized must be greater than 0, got: 0"));
    }

    #[test]
    fn test_all_violations_collected_not_short_circuited() {
        let errors = validate_row(&row(&[])).unwrap_err();
        // one entry per violated rule, all six fields missing
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&"NGO ID is required".to_string()));
        assert!(errors.contains(&"Month is required".to_string()));
        assert!(errors.contains(&"Year is required".to_string()));
        assert!(errors.contains(&"People Helped is required".to_string()));
        assert!(errors.contains(&"Events Conducted is required".to_string()));
        assert!(errors.contains(&"Funds Utilized is required".to_string()));
    }

    #[test]
    fn test_whitespace_only_value_counts_as_missing() {
        let mut r = valid_row();
        r.insert("NGO ID".to_string(), "   ".to_string());
        let errors = validate_row(&r).unwrap_err();
        assert_eq!(errors, vec!["NGO ID is required"]);
    }

    #[test]
    fn test_fractional_integer_field_rejected() {
        // Integer fields must parse fully; "150.5" is invalid, not truncated
        let mut r = valid_row();
        r.insert("People Helped".to_string(), "150.5".to_string());
        let errors = validate_row(&r).unwrap_err();
        assert_eq!(
            errors,
            vec!["Invalid People Helped: \"150.5\". Must be a valid number"]
        );
    }
}
