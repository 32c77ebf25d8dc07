use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// How badly the plant is affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Faible",
            Severity::Moderate => "Modérée",
            Severity::High => "Élevée",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatmentStatus {
    Treated,
    InProgress,
    Untreated,
}

impl TreatmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TreatmentStatus::Treated => "Traité",
            TreatmentStatus::InProgress => "En cours",
            TreatmentStatus::Untreated => "Non traité",
        }
    }
}

/// One past diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub date: NaiveDate,
    #[serde(with = "hour_minute")]
    pub time: NaiveTime,
    pub plant_type: String,
    pub disease: String,
    pub severity: Severity,
    pub status: TreatmentStatus,
    pub image_uri: String,
    pub confidence_percent: u8,
}

impl AnalysisRecord {
    pub fn recorded_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Single-line summary as shown in the history list
    pub fn summary(&self) -> String {
        format!(
            "{} {} - {} : {} ({}, {}) {}%",
            self.date.format("%Y-%m-%d"),
            self.time.format("%H:%M"),
            self.plant_type,
            self.disease,
            self.severity.label(),
            self.status.label(),
            self.confidence_percent
        )
    }
}

mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Where past diagnoses come from
pub trait HistorySource: Send + Sync {
    /// All records, newest first
    fn records(&self) -> Vec<AnalysisRecord>;
}

/// In-memory history, kept sorted newest first
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    records: Vec<AnalysisRecord>,
}

impl StaticHistory {
    pub fn new(mut records: Vec<AnalysisRecord>) -> Self {
        records.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistorySource for StaticHistory {
    fn records(&self) -> Vec<AnalysisRecord> {
        self.records.clone()
    }
}

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    (year, month, day): (i32, u32, u32),
    (hour, minute): (u32, u32),
    plant_type: &str,
    disease: &str,
    severity: Severity,
    status: TreatmentStatus,
    image_uri: &str,
    confidence_percent: u8,
) -> Option<AnalysisRecord> {
    Some(AnalysisRecord {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day)?,
        time: NaiveTime::from_hms_opt(hour, minute, 0)?,
        plant_type: plant_type.to_string(),
        disease: disease.to_string(),
        severity,
        status,
        image_uri: image_uri.to_string(),
        confidence_percent,
    })
}

/// Demo history shown before any real diagnosis exists
pub fn sample_history() -> StaticHistory {
    let records = [
        record(
            "1",
            (2024, 1, 15),
            (14, 32),
            "Tomate",
            "Mildiou",
            Severity::Moderate,
            TreatmentStatus::Treated,
            "https://images.pexels.com/photos/1327838/pexels-photo-1327838.jpeg",
            94,
        ),
        record(
            "2",
            (2024, 1, 14),
            (9, 15),
            "Pomme de terre",
            "Doryphore",
            Severity::High,
            TreatmentStatus::InProgress,
            "https://images.pexels.com/photos/144248/potatoes-vegetables-erdfrucht-bio-144248.jpeg",
            89,
        ),
        record(
            "3",
            (2024, 1, 13),
            (16, 45),
            "Laitue",
            "Pucerons",
            Severity::Low,
            TreatmentStatus::Treated,
            "https://images.pexels.com/photos/1656663/pexels-photo-1656663.jpeg",
            92,
        ),
        record(
            "4",
            (2024, 1, 12),
            (11, 20),
            "Rosier",
            "Oïdium",
            Severity::Moderate,
            TreatmentStatus::Untreated,
            "https://images.pexels.com/photos/56866/garden-rose-red-pink-56866.jpeg",
            87,
        ),
    ];

    StaticHistory::new(records.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_history_newest_first() {
        let history = sample_history();
        let records = history.records();

        assert_eq!(history.len(), 4);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].recorded_at() > pair[1].recorded_at()));
    }

    #[test]
    fn test_static_history_sorts_input() {
        let mut records = sample_history().records();
        records.reverse();

        let history = StaticHistory::new(records);
        assert_eq!(history.records()[0].plant_type, "Tomate");
        assert_eq!(history.records()[3].plant_type, "Rosier");
    }

    #[test]
    fn test_french_labels() {
        assert_eq!(Severity::Low.label(), "Faible");
        assert_eq!(Severity::Moderate.label(), "Modérée");
        assert_eq!(Severity::High.label(), "Élevée");
        assert_eq!(TreatmentStatus::Treated.label(), "Traité");
        assert_eq!(TreatmentStatus::InProgress.label(), "En cours");
        assert_eq!(TreatmentStatus::Untreated.label(), "Non traité");
    }

    #[test]
    fn test_record_summary() {
        let records = sample_history().records();
        assert_eq!(
            records[1].summary(),
            "2024-01-14 09:15 - Pomme de terre : Doryphore (Élevée, En cours) 89%"
        );
    }

    #[test]
    fn test_record_json_shape() {
        let records = sample_history().records();
        let json = serde_json::to_value(&records[0]).unwrap();

        assert_eq!(json["plantType"], "Tomate");
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["time"], "14:32");
        assert_eq!(json["confidencePercent"], 94);

        let parsed: AnalysisRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, records[0]);
    }

    #[test]
    fn test_empty_history() {
        let history = StaticHistory::default();
        assert!(history.is_empty());
        assert!(history.records().is_empty());
    }
}
