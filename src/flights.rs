use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::airlines::AirlineId;
use crate::airports::AirportId;
use crate::gates::GateId;

pub type FlightId = i64;

/// Format used by the edit form (minute precision, no timezone)
pub const FORM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Direction of a flight relative to the airport it is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightType {
    Arrival,
    Departure,
}

impl FlightType {
    pub const ALL: [FlightType; 2] = [FlightType::Arrival, FlightType::Departure];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightType::Arrival => "ARRIVAL",
            FlightType::Departure => "DEPARTURE",
        }
    }
}

impl fmt::Display for FlightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ARRIVAL" => Ok(FlightType::Arrival),
            "DEPARTURE" => Ok(FlightType::Departure),
            other => Err(format!(
                "unknown flight type '{}' (expected ARRIVAL or DEPARTURE)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    OnTime,
    Delayed,
    Boarding,
    Cancelled,
    Landed,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 5] = [
        FlightStatus::OnTime,
        FlightStatus::Delayed,
        FlightStatus::Boarding,
        FlightStatus::Cancelled,
        FlightStatus::Landed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::OnTime => "ON_TIME",
            FlightStatus::Delayed => "DELAYED",
            FlightStatus::Boarding => "BOARDING",
            FlightStatus::Cancelled => "CANCELLED",
            FlightStatus::Landed => "LANDED",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown flight status '{}'", s.trim()))
    }
}

/// Flight record as returned by the list/create/update endpoints.
///
/// `airport_code`, `airline_name` and `gate_name` are denormalized display fields that only
/// appear on read responses; they are never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: FlightId,
    pub flight_number: String,
    #[serde(rename = "type")]
    pub flight_type: FlightType,
    pub status: FlightStatus,
    #[serde(with = "local_time")]
    pub scheduled_time: NaiveDateTime,
    #[serde(default, with = "local_time::option")]
    pub estimated_time: Option<NaiveDateTime>,
    pub origin: String,
    pub destination: String,
    pub airport_id: AirportId,
    pub airline_id: AirlineId,
    pub gate_id: GateId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_name: Option<String>,
}

impl Flight {
    /// The writable fields of this record, as they would be sent back unchanged
    pub fn to_payload(&self) -> FlightPayload {
        FlightPayload {
            flight_number: self.flight_number.clone(),
            flight_type: self.flight_type,
            status: self.status,
            scheduled_time: self.scheduled_time,
            estimated_time: self.estimated_time,
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            airport_id: self.airport_id,
            airline_id: self.airline_id,
            gate_id: self.gate_id,
        }
    }
}

/// Body of `POST /api/flights` and `PUT /api/flights/{id}`: every flight field except the id.
///
/// `estimatedTime` is always present on the wire; "not estimated" is an explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPayload {
    pub flight_number: String,
    #[serde(rename = "type")]
    pub flight_type: FlightType,
    pub status: FlightStatus,
    #[serde(with = "local_time")]
    pub scheduled_time: NaiveDateTime,
    #[serde(default, with = "local_time::option")]
    pub estimated_time: Option<NaiveDateTime>,
    pub origin: String,
    pub destination: String,
    pub airport_id: AirportId,
    pub airline_id: AirlineId,
    pub gate_id: GateId,
}

/// Parse a timezone-less timestamp ("2026-01-11T18:30", "2026-01-11T18:30:00",
/// "2026-01-11T18:30:00.000"). A trailing offset is tolerated and dropped.
pub fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, FORM_TIME_FORMAT))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Truncate to minute precision for display in the edit form
pub fn format_for_form(time: &NaiveDateTime) -> String {
    time.format(FORM_TIME_FORMAT).to_string()
}

/// Wire representation: minute precision when that loses nothing, seconds otherwise
pub fn format_for_wire(time: &NaiveDateTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format(FORM_TIME_FORMAT).to_string()
    } else {
        time.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Serde adapter for the API's timezone-less timestamps
pub mod local_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{format_for_wire, parse_local_time};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_for_wire(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_local_time(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    /// Optional variant: `null`, absent, and `""` all read as `None`; `None` writes `null`
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        use super::super::{format_for_wire, parse_local_time};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.serialize_str(&format_for_wire(t)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(value) => parse_local_time(value)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", value))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 11)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_flight_deserializes_list_response() {
        let json = r#"{
            "id": 1,
            "flightNumber": "AC101",
            "type": "ARRIVAL",
            "status": "ON_TIME",
            "scheduledTime": "2026-01-11T18:30:00",
            "estimatedTime": null,
            "origin": "Toronto",
            "destination": "St. John's",
            "airportId": 7,
            "airlineId": 2,
            "gateId": 5,
            "airportCode": "YYT",
            "airlineName": "Air Canada",
            "gateName": "A3"
        }"#;

        let flight: Flight = serde_json::from_str(json).unwrap();
        assert_eq!(flight.id, 1);
        assert_eq!(flight.flight_type, FlightType::Arrival);
        assert_eq!(flight.status, FlightStatus::OnTime);
        assert_eq!(flight.scheduled_time, at(18, 30, 0));
        assert_eq!(flight.estimated_time, None);
        assert_eq!(flight.airport_code.as_deref(), Some("YYT"));
    }

    #[test]
    fn test_empty_estimated_time_reads_as_none() {
        let json = r#"{"id":2,"flightNumber":"WS202","type":"DEPARTURE","status":"DELAYED",
            "scheduledTime":"2026-01-11T09:15","estimatedTime":"","origin":"Halifax",
            "destination":"Calgary","airportId":1,"airlineId":3,"gateId":9}"#;
        let flight: Flight = serde_json::from_str(json).unwrap();
        assert_eq!(flight.estimated_time, None);
        assert_eq!(flight.gate_name, None);
    }

    #[test]
    fn test_payload_writes_explicit_null_estimate() {
        let payload = FlightPayload {
            flight_number: "AC101".to_string(),
            flight_type: FlightType::Arrival,
            status: FlightStatus::Boarding,
            scheduled_time: at(18, 30, 0),
            estimated_time: None,
            origin: "Toronto".to_string(),
            destination: "St. John's".to_string(),
            airport_id: 7,
            airline_id: 2,
            gate_id: 5,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "ARRIVAL");
        assert_eq!(value["status"], "BOARDING");
        assert_eq!(value["scheduledTime"], "2026-01-11T18:30");
        assert!(value.get("estimatedTime").unwrap().is_null());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_parse_local_time_variants() {
        assert_eq!(parse_local_time("2026-01-11T18:30"), Some(at(18, 30, 0)));
        assert_eq!(parse_local_time("2026-01-11T18:30:45"), Some(at(18, 30, 45)));
        assert_eq!(
            parse_local_time("2026-01-11T18:30:00.000").map(|t| t.second()),
            Some(0)
        );
        assert_eq!(parse_local_time("2026-01-11T18:30:00Z"), Some(at(18, 30, 0)));
        assert_eq!(parse_local_time(""), None);
        assert_eq!(parse_local_time("tomorrow"), None);
    }

    #[test]
    fn test_form_and_wire_formats() {
        assert_eq!(format_for_form(&at(18, 30, 45)), "2026-01-11T18:30");
        assert_eq!(format_for_wire(&at(18, 30, 0)), "2026-01-11T18:30");
        assert_eq!(format_for_wire(&at(18, 30, 45)), "2026-01-11T18:30:45");
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("arrival".parse::<FlightType>(), Ok(FlightType::Arrival));
        assert!("sideways".parse::<FlightType>().is_err());
        assert_eq!("on-time".parse::<FlightStatus>(), Ok(FlightStatus::OnTime));
        assert_eq!("CANCELLED".parse::<FlightStatus>(), Ok(FlightStatus::Cancelled));
        assert!("lost".parse::<FlightStatus>().is_err());
    }
}
