//! Licence expiry alerts and maintenance schedule views

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use garage_types::{MaintenanceRecord, Vehicle};
use serde::Serialize;

/// Licences expiring within this many days raise an alert
pub const LICENCE_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LicenceStatus {
    Expired,
    ExpiringSoon,
}

impl LicenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LicenceStatus::Expired => "EXPIRED",
            LicenceStatus::ExpiringSoon => "expiring soon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenceAlert {
    pub vehicle_id: String,
    pub model: String,
    pub license_plate: String,
    pub expires_on: NaiveDate,
    /// Negative when already expired
    pub days_remaining: i64,
    pub status: LicenceStatus,
}

/// A maintenance record in the future, with its vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledService {
    pub vehicle_id: String,
    pub model: String,
    pub record: MaintenanceRecord,
}

/// A maintenance record due today or tomorrow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceReminder {
    pub vehicle_id: String,
    pub model: String,
    pub service_type: String,
    pub due_at: DateTime<Utc>,
    pub is_today: bool,
}

/// Licence alerts: expired first, then by days remaining
pub fn licence_alerts<'a>(
    vehicles: impl IntoIterator<Item = &'a Vehicle>,
    today: NaiveDate,
) -> Vec<LicenceAlert> {
    let mut alerts: Vec<LicenceAlert> = vehicles
        .into_iter()
        .filter_map(|v| {
            let expires_on = v.license_expiry?;
            let days_remaining = (expires_on - today).num_days();
            let status = if days_remaining < 0 {
                LicenceStatus::Expired
            } else if days_remaining <= LICENCE_WARNING_DAYS {
                LicenceStatus::ExpiringSoon
            } else {
                return None;
            };
            Some(LicenceAlert {
                vehicle_id: v.id.clone(),
                model: v.model.clone(),
                license_plate: v.license_plate.clone(),
                expires_on,
                days_remaining,
                status,
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then(a.days_remaining.cmp(&b.days_remaining))
    });
    alerts
}

/// All maintenance records strictly after `now`, soonest first
pub fn upcoming_maintenance<'a>(
    vehicles: impl IntoIterator<Item = &'a Vehicle>,
    now: DateTime<Utc>,
) -> Vec<ScheduledService> {
    let mut scheduled: Vec<ScheduledService> = vehicles
        .into_iter()
        .flat_map(|v| {
            v.maintenance
                .iter()
                .filter(move |m| m.timestamp > now)
                .map(move |m| ScheduledService {
                    vehicle_id: v.id.clone(),
                    model: v.model.clone(),
                    record: m.clone(),
                })
        })
        .collect();

    scheduled.sort_by_key(|s| s.record.timestamp);
    scheduled
}

/// Records due on today's or tomorrow's calendar date in `now`'s time zone.
/// Today's reminders come first, then by time.
pub fn maintenance_reminders<'a, Tz: TimeZone>(
    vehicles: impl IntoIterator<Item = &'a Vehicle>,
    now: &DateTime<Tz>,
) -> Vec<MaintenanceReminder> {
    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);

    let mut reminders: Vec<MaintenanceReminder> = Vec::new();
    for v in vehicles {
        for m in &v.maintenance {
            let local_day = m.timestamp.with_timezone(&tz).date_naive();
            if local_day == today || local_day == tomorrow {
                reminders.push(MaintenanceReminder {
                    vehicle_id: v.id.clone(),
                    model: v.model.clone(),
                    service_type: m.service_type.clone(),
                    due_at: m.timestamp,
                    is_today: local_day == today,
                });
            }
        }
    }

    reminders.sort_by(|a, b| b.is_today.cmp(&a.is_today).then(a.due_at.cmp(&b.due_at)));
    reminders
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_types::VehicleKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vehicle_with_expiry(id: &str, expiry: Option<NaiveDate>) -> Vehicle {
        let mut v = Vehicle::new(id, format!("Model {}", id), VehicleKind::Car);
        v.license_expiry = expiry;
        v
    }

    fn record(ts: DateTime<Utc>, kind: &str) -> MaintenanceRecord {
        MaintenanceRecord::new(ts, kind, None, None).unwrap()
    }

    #[test]
    fn test_licence_alerts_classification_and_order() {
        let today = date(2024, 6, 1);
        let vehicles = vec![
            vehicle_with_expiry("soon", Some(date(2024, 6, 20))),
            vehicle_with_expiry("far", Some(date(2025, 1, 1))),
            vehicle_with_expiry("old", Some(date(2023, 1, 10))),
            vehicle_with_expiry("none", None),
            vehicle_with_expiry("recent", Some(date(2024, 5, 30))),
            vehicle_with_expiry("today", Some(today)),
        ];

        let alerts = licence_alerts(&vehicles, today);
        let ids: Vec<_> = alerts.iter().map(|a| a.vehicle_id.as_str()).collect();
        assert_eq!(ids, vec!["old", "recent", "today", "soon"]);
        assert_eq!(alerts[0].status, LicenceStatus::Expired);
        assert_eq!(alerts[1].days_remaining, -2);
        assert_eq!(alerts[2].status, LicenceStatus::ExpiringSoon);
        assert_eq!(alerts[3].days_remaining, 19);
    }

    #[test]
    fn test_licence_warning_boundary() {
        let today = date(2024, 6, 1);
        let at_limit = vehicle_with_expiry("a", Some(today + Duration::days(30)));
        let past_limit = vehicle_with_expiry("b", Some(today + Duration::days(31)));
        let alerts = licence_alerts([&at_limit, &past_limit], today);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].vehicle_id, "a");
    }

    #[test]
    fn test_upcoming_maintenance_sorted_and_future_only() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut a = Vehicle::new("a", "Fusca", VehicleKind::Car);
        a.add_maintenance(record(now - Duration::days(3), "Past"));
        a.add_maintenance(record(now + Duration::days(10), "Later"));
        let mut b = Vehicle::new("b", "Scania", VehicleKind::truck(100.0));
        b.add_maintenance(record(now + Duration::days(2), "Sooner"));
        b.add_maintenance(record(now, "Exactly now"));

        let upcoming = upcoming_maintenance([&a, &b], now);
        let kinds: Vec<_> = upcoming.iter().map(|s| s.record.service_type.as_str()).collect();
        assert_eq!(kinds, vec!["Sooner", "Later"]);
        assert_eq!(upcoming[0].vehicle_id, "b");
    }

    #[test]
    fn test_reminders_today_first() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let mut v = Vehicle::new("a", "Fusca", VehicleKind::Car);
        v.add_maintenance(record(Utc.with_ymd_and_hms(2024, 6, 2, 7, 0, 0).unwrap(), "Tomorrow"));
        v.add_maintenance(record(Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap(), "Tonight"));
        v.add_maintenance(record(Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap(), "Earlier"));
        v.add_maintenance(record(Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(), "Too far"));
        v.add_maintenance(record(Utc.with_ymd_and_hms(2024, 5, 31, 23, 0, 0).unwrap(), "Yesterday"));

        let reminders = maintenance_reminders([&v], &now);
        let kinds: Vec<_> = reminders.iter().map(|r| r.service_type.as_str()).collect();
        assert_eq!(kinds, vec!["Earlier", "Tonight", "Tomorrow"]);
        assert!(reminders[0].is_today);
        assert!(!reminders[2].is_today);
    }

    #[test]
    fn test_reminders_use_callers_time_zone() {
        let tz = chrono::FixedOffset::west_opt(3 * 3600).unwrap();
        // 2024-06-01 22:00 at UTC-3
        let now = tz.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap();
        let mut v = Vehicle::new("a", "Fusca", VehicleKind::Car);
        // 2024-06-03 02:00 UTC is 2024-06-02 23:00 local: tomorrow
        v.add_maintenance(record(Utc.with_ymd_and_hms(2024, 6, 3, 2, 0, 0).unwrap(), "Late"));

        let reminders = maintenance_reminders([&v], &now);
        assert_eq!(reminders.len(), 1);
        assert!(!reminders[0].is_today);
    }
}
