use crate::core::FeatureRecord;
use crate::utils::error::{PestError, Result};
use crate::utils::validation::Validate;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// POST /predict 的原始表單欄位，全部先以字串接收再轉型
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictForm {
    pub crop_type: Option<String>,
    pub temperature: Option<String>,
    pub date: Option<String>,
    pub rainfall: Option<String>,
    pub humidity: Option<String>,
    pub wind_speed: Option<String>,
    pub soil_moisture: Option<String>,
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PestError::InvalidInputError {
            field: field.to_string(),
            value: String::new(),
            reason: "this field is required".to_string(),
        }),
    }
}

fn parse_number(field: &str, value: &Option<String>) -> Result<f64> {
    let raw = required(field, value)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PestError::InvalidInputError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "expected a number".to_string(),
        }),
    }
}

/// 接受 2024-05-01、2024-05-01T08:30、2024-05-01 08:30:00 與 05/01/2024
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Ok(date);
    }
    Err(PestError::InvalidInputError {
        field: field.to_string(),
        value: raw.to_string(),
        reason: "expected a date such as 2024-05-01".to_string(),
    })
}

impl PredictForm {
    /// 欄位依表單順序逐一解析，回報第一個錯誤
    pub fn into_record(self) -> Result<FeatureRecord> {
        let crop_type = required("crop_type", &self.crop_type)?.to_string();
        let temperature = parse_number("temperature", &self.temperature)?;
        let date = parse_date("date", required("date", &self.date)?)?;
        let rainfall = parse_number("rainfall", &self.rainfall)?;
        let humidity = parse_number("humidity", &self.humidity)?;
        let wind_speed = parse_number("wind_speed", &self.wind_speed)?;
        let soil_moisture = parse_number("soil_moisture", &self.soil_moisture)?;

        let record = FeatureRecord {
            crop_type,
            date,
            temperature,
            humidity,
            rainfall,
            wind_speed,
            soil_moisture,
        };
        record.validate()?;
        Ok(record)
    }
}

impl Validate for FeatureRecord {
    fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.humidity) {
            return Err(PestError::InvalidInputError {
                field: "humidity".to_string(),
                value: self.humidity.to_string(),
                reason: "humidity is a percentage between 0 and 100".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PredictForm {
        PredictForm {
            crop_type: Some("maize".to_string()),
            temperature: Some("31.5".to_string()),
            date: Some("2024-05-01".to_string()),
            rainfall: Some("12".to_string()),
            humidity: Some(" 80 ".to_string()),
            wind_speed: Some("3.2".to_string()),
            soil_moisture: Some("41".to_string()),
        }
    }

    #[test]
    fn test_valid_form_converts() {
        let record = form().into_record().unwrap();
        assert_eq!(record.crop_type, "maize");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(record.temperature, 31.5);
        assert_eq!(record.humidity, 80.0);
        assert_eq!(record.soil_moisture, 41.0);
    }

    #[test]
    fn test_missing_field() {
        let err = PredictForm {
            rainfall: None,
            ..form()
        }
        .into_record()
        .unwrap_err();
        assert!(matches!(err, PestError::InvalidInputError { ref field, .. } if field == "rainfall"));
    }

    #[test]
    fn test_non_numeric_field() {
        let err = PredictForm {
            temperature: Some("warm".to_string()),
            ..form()
        }
        .into_record()
        .unwrap_err();
        assert!(matches!(err, PestError::InvalidInputError { ref value, .. } if value == "warm"));

        let err = PredictForm {
            wind_speed: Some("NaN".to_string()),
            ..form()
        }
        .into_record()
        .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_humidity_out_of_range() {
        let err = PredictForm {
            humidity: Some("140".to_string()),
            ..form()
        }
        .into_record()
        .unwrap_err();
        assert!(matches!(err, PestError::InvalidInputError { ref field, .. } if field == "humidity"));

        let edge = PredictForm {
            humidity: Some("100".to_string()),
            ..form()
        };
        assert_eq!(edge.into_record().unwrap().humidity, 100.0);
    }

    #[test]
    fn test_first_bad_field_is_reported() {
        let err = PredictForm {
            temperature: Some("warm".to_string()),
            soil_moisture: None,
            ..form()
        }
        .into_record()
        .unwrap_err();
        assert!(matches!(err, PestError::InvalidInputError { ref field, .. } if field == "temperature"));
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_date("date", "2024-05-01").unwrap(), expected);
        assert_eq!(parse_date("date", "2024-05-01T08:30").unwrap(), expected);
        assert_eq!(parse_date("date", "2024-05-01 08:30:00").unwrap(), expected);
        assert_eq!(parse_date("date", "05/01/2024").unwrap(), expected);
        assert!(parse_date("date", "yesterday").is_err());
        assert!(parse_date("date", "2024-13-01").is_err());
    }
}
