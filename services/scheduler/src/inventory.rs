//! Loading the initial sessions and rooms.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use classroom_reconcile::{Inventory, Schedule};
use tracing::info;

/// Reads a JSON inventory from `path` and validates it into a [`Schedule`]
/// with session statuses evaluated at `now`.
pub fn load_schedule(path: &Path, now: DateTime<Utc>) -> Result<Schedule> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read inventory {}", path.display()))?;
    let schedule = parse_schedule(&raw, now)
        .with_context(|| format!("invalid inventory {}", path.display()))?;

    info!(
        path = %path.display(),
        sessions = schedule.sessions().count(),
        rooms = schedule.rooms().count(),
        "Inventory loaded"
    );
    Ok(schedule)
}

/// Parses and validates a JSON inventory document.
pub fn parse_schedule(raw: &str, now: DateTime<Utc>) -> Result<Schedule> {
    let inventory: Inventory = serde_json::from_str(raw).context("malformed inventory JSON")?;
    Ok(Schedule::from_inventory(inventory, now)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let schedule = parse_schedule("{}", Utc::now()).unwrap();
        assert_eq!(schedule.sessions().count(), 0);
        assert_eq!(schedule.rooms().count(), 0);
    }

    #[test]
    fn test_rejects_inconsistent_occupancy() {
        let raw = r#"{
            "rooms": [
                {"id": "room_01HV4Z3MXNKPQR9HSTZ7WCMD4E", "name": "Room A",
                 "url": "https://meet.example.com/a", "status": "in_use"}
            ]
        }"#;
        let err = parse_schedule(raw, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("no occupant"), "{err}");
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = parse_schedule("{\"rooms\": [", Utc::now()).unwrap_err();
        assert!(err.to_string().contains("malformed"), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/inventory.json");
        let err = load_schedule(path, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("failed to read inventory"));
    }
}
