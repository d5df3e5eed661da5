//! Report domain models and DTOs.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::report;

/// Canonical English month names, in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar month. Serialized as the capitalized English name ("January").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }

    /// Parse an exact canonical month name. No case folding: CSV and API
    /// clients must send the capitalized English name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "January" => Some(Self::January),
            "February" => Some(Self::February),
            "March" => Some(Self::March),
            "April" => Some(Self::April),
            "May" => Some(Self::May),
            "June" => Some(Self::June),
            "July" => Some(Self::July),
            "August" => Some(Self::August),
            "September" => Some(Self::September),
            "October" => Some(Self::October),
            "November" => Some(Self::November),
            "December" => Some(Self::December),
            _ => None,
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current calendar year, the upper bound for report years.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// A validated report record, ready to be upserted.
///
/// Produced by the row validator (bulk path) or by request validation
/// (single-submission path). Carries trimmed strings and parsed numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub ngo_id: String,
    pub month: Month,
    pub year: i32,
    pub people_helped: i32,
    pub events_conducted: i32,
    pub funds_utilized: f64,
}

impl ReportRecord {
    /// Display name derived from the NGO id. Not independently settable.
    pub fn ngo_name(&self) -> String {
        format!("NGO {}", self.ngo_id)
    }
}

/// Request body for single report submission.
///
/// Every field is optional at the serde layer so that missing values surface
/// as accumulated validation errors rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub ngo_id: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    /// Defaults to the current calendar year when omitted.
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub people_helped: Option<i32>,
    #[serde(default)]
    pub events_conducted: Option<i32>,
    #[serde(default)]
    pub funds_utilized: Option<f64>,
}

impl SubmitReportRequest {
    /// Validate the request, collecting every violation.
    ///
    /// The numeric fields must be strictly positive, the same rule the bulk
    /// CSV path applies.
    pub fn validate(&self) -> Result<ReportRecord, Vec<String>> {
        let mut errors = Vec::new();

        let ngo_id = self.ngo_id.as_deref().map(str::trim).unwrap_or("");
        if ngo_id.is_empty() {
            errors.push("NGO ID is required".to_string());
        } else if ngo_id.len() > 50 {
            errors.push("NGO ID must be between 1 and 50 characters".to_string());
        }

        let month = match self.month.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Month is required".to_string());
                None
            }
            Some(m) => match Month::parse(m) {
                Some(month) => Some(month),
                None => {
                    errors.push("Invalid month".to_string());
                    None
                }
            },
        };

        let max_year = current_year();
        let year = self.year.unwrap_or(max_year);
        if !(2020..=max_year).contains(&year) {
            errors.push(format!(
                "Invalid year: {}. Must be between 2020 and {}",
                year, max_year
            ));
        }

        match self.people_helped {
            None => errors.push("People Helped is required".to_string()),
            Some(n) if n <= 0 => {
                errors.push("People helped must be a positive integer".to_string())
            }
            Some(_) => {}
        }

        match self.events_conducted {
            None => errors.push("Events Conducted is required".to_string()),
            Some(n) if n <= 0 => {
                errors.push("Events conducted must be a positive integer".to_string())
            }
            Some(_) => {}
        }

        match self.funds_utilized {
            None => errors.push("Funds Utilized is required".to_string()),
            Some(n) if n <= 0.0 => {
                errors.push("Funds utilized must be a positive number".to_string())
            }
            Some(_) => {}
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ReportRecord {
            ngo_id: ngo_id.to_string(),
            month: month.expect("month present when no errors"),
            year,
            people_helped: self.people_helped.expect("checked above"),
            events_conducted: self.events_conducted.expect("checked above"),
            funds_utilized: self.funds_utilized.expect("checked above"),
        })
    }
}

/// Persisted report, as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportResponse {
    pub id: Uuid,
    pub ngo_id: String,
    pub ngo_name: String,
    pub month: String,
    pub year: i32,
    pub people_helped: i32,
    pub events_conducted: i32,
    pub funds_utilized: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<report::Model> for ReportResponse {
    fn from(m: report::Model) -> Self {
        ReportResponse {
            id: m.id,
            ngo_id: m.ngo_id,
            ngo_name: m.ngo_name,
            month: m.month,
            year: m.year,
            people_helped: m.people_helped,
            events_conducted: m.events_conducted,
            funds_utilized: m.funds_utilized,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Query parameters for the admin report listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ListReportsQuery {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Query parameters for the dashboard.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DashboardQuery {
    pub month: String,
    /// Defaults to the current calendar year when omitted.
    #[serde(default)]
    pub year: Option<i32>,
}

/// One NGO's totals within a monthly summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NgoReportSummary {
    pub ngo_id: String,
    pub ngo_name: String,
    pub people_helped: i32,
    pub events_conducted: i32,
    pub funds_utilized: f64,
}

/// Aggregated dashboard data for one month.
///
/// The per-NGO list is returned whole; pagination is a client concern.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub month: Month,
    pub year: i32,
    pub total_ngos_reporting: u64,
    pub total_people_helped: i64,
    pub total_events_conducted: i64,
    pub total_funds_utilized: f64,
    pub ngo_reports: Vec<NgoReportSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SubmitReportRequest {
        SubmitReportRequest {
            ngo_id: Some("NGO001".to_string()),
            month: Some("January".to_string()),
            year: Some(2024),
            people_helped: Some(150),
            events_conducted: Some(5),
            funds_utilized: Some(25000.0),
        }
    }

    #[test]
    fn test_month_parse_exact() {
        assert_eq!(Month::parse("March"), Some(Month::March));
        assert_eq!(Month::parse("march"), None);
        assert_eq!(Month::parse("Marchh"), None);
        assert_eq!(Month::parse(""), None);
    }

    #[test]
    fn test_valid_request_passes() {
        let record = valid_request().validate().expect("should validate");
        assert_eq!(record.ngo_id, "NGO001");
        assert_eq!(record.month, Month::January);
        assert_eq!(record.ngo_name(), "NGO NGO001");
    }

    #[test]
    fn test_zero_people_helped_rejected() {
        let req = SubmitReportRequest {
            people_helped: Some(0),
            ..valid_request()
        };
        let errors = req.validate().unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.contains("People helped must be a positive integer"))
        );
    }

    #[test]
    fn test_missing_fields_accumulate() {
        let req = SubmitReportRequest {
            ngo_id: None,
            month: None,
            year: None,
            people_helped: None,
            events_conducted: None,
            funds_utilized: None,
        };
        let errors = req.validate().unwrap_err();
        // year defaults to the current year, the other five are required
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_year_defaults_to_current() {
        let req = SubmitReportRequest {
            year: None,
            ..valid_request()
        };
        let record = req.validate().expect("should validate");
        assert_eq!(record.year, current_year());
    }

    #[test]
    fn test_year_out_of_range() {
        let req = SubmitReportRequest {
            year: Some(2019),
            ..valid_request()
        };
        let errors = req.validate().unwrap_err();
        assert!(errors[0].contains("Invalid year: 2019"));
    }
}
