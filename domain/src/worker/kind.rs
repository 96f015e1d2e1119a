//! The fixed roster of specialist workers

use crate::intake::keys;
use serde::{Deserialize, Serialize};

/// One of the three specialist workers dispatched per run.
///
/// The roster is fixed by domain: every run dispatches exactly these three,
/// and each owns the context keys under its [`namespace`](Self::namespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    /// Transcription-and-coding worker (audio/notes → coded conditions)
    Scribe,
    /// Imaging analysis worker
    Radiology,
    /// History retrieval worker
    Records,
}

impl WorkerKind {
    /// The full roster, in dispatch order.
    pub const ALL: [WorkerKind; 3] = [
        WorkerKind::Scribe,
        WorkerKind::Radiology,
        WorkerKind::Records,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Scribe => "scribe",
            WorkerKind::Radiology => "radiology",
            WorkerKind::Records => "records",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkerKind::Scribe => "Clinical Scribe",
            WorkerKind::Radiology => "Radiology Analyst",
            WorkerKind::Records => "Records Analyst",
        }
    }

    /// Key prefix reserved for this worker (e.g. `scribe.`).
    pub fn namespace(&self) -> &'static str {
        match self {
            WorkerKind::Scribe => "scribe.",
            WorkerKind::Radiology => "radiology.",
            WorkerKind::Records => "records.",
        }
    }

    /// Builds a key inside this worker's namespace.
    pub fn key(&self, field: &str) -> String {
        format!("{}{}", self.namespace(), field)
    }

    /// Context key under which the worker's report is folded after fan-in.
    pub fn report_key(&self) -> String {
        self.key("report")
    }

    /// Returns the worker whose namespace contains `key`, if any.
    pub fn owner_of(key: &str) -> Option<WorkerKind> {
        Self::ALL
            .into_iter()
            .find(|kind| key.starts_with(kind.namespace()))
    }

    /// Input keys the worker reads.
    ///
    /// The scribe needs *at least one* of its keys; the others need all.
    pub fn input_keys(&self) -> &'static [&'static str] {
        match self {
            WorkerKind::Scribe => &[keys::AUDIO_REF, keys::CLINICAL_NOTES],
            WorkerKind::Radiology => &[keys::IMAGE_REF],
            WorkerKind::Records => &[keys::SUBJECT_ID],
        }
    }

    /// Flag attached to a decision when this worker produced no evidence.
    pub fn unavailable_flag(&self) -> String {
        format!("{} evidence unavailable", self.as_str())
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scribe" => Ok(WorkerKind::Scribe),
            "radiology" => Ok(WorkerKind::Radiology),
            "records" => Ok(WorkerKind::Records),
            other => Err(format!("unknown worker: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_of_namespaced_keys() {
        assert_eq!(WorkerKind::owner_of("scribe.report"), Some(WorkerKind::Scribe));
        assert_eq!(
            WorkerKind::owner_of("radiology.findings"),
            Some(WorkerKind::Radiology)
        );
        assert_eq!(WorkerKind::owner_of("records.report"), Some(WorkerKind::Records));
        assert_eq!(WorkerKind::owner_of("subject_id"), None);
        // Prefix must include the dot
        assert_eq!(WorkerKind::owner_of("scribes"), None);
    }

    #[test]
    fn test_report_key() {
        assert_eq!(WorkerKind::Radiology.report_key(), "radiology.report");
    }

    #[test]
    fn test_unavailable_flag() {
        assert_eq!(
            WorkerKind::Scribe.unavailable_flag(),
            "scribe evidence unavailable"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        for kind in WorkerKind::ALL {
            assert_eq!(kind.as_str().parse::<WorkerKind>().unwrap(), kind);
        }
        assert!("oracle".parse::<WorkerKind>().is_err());
    }
}
