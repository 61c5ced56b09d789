//! Gate appointment slot domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::errors::{DomainError, DomainResult};

/// Physical gate kind a slot is reserved at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateType {
    Inbound,
    Outbound,
    Weighing,
    Inspection,
}

impl GateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "Inbound",
            Self::Outbound => "Outbound",
            Self::Weighing => "Weighing",
            Self::Inspection => "Inspection",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Inbound" => Some(Self::Inbound),
            "Outbound" => Some(Self::Outbound),
            "Weighing" => Some(Self::Weighing),
            "Inspection" => Some(Self::Inspection),
            _ => None,
        }
    }
}

impl std::fmt::Display for GateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Slot lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// Reserved, vehicle not yet on site
    Scheduled,
    /// Vehicle passed the gate
    Entered,
    /// Vehicle left the site (terminal)
    Exited,
    /// Reservation withdrawn (terminal)
    Cancelled,
    /// Window elapsed without arrival (terminal)
    NoShow,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Entered => "Entered",
            Self::Exited => "Exited",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "NoShow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Scheduled" => Some(Self::Scheduled),
            "Entered" => Some(Self::Entered),
            "Exited" => Some(Self::Exited),
            "Cancelled" => Some(Self::Cancelled),
            "NoShow" => Some(Self::NoShow),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited | Self::Cancelled | Self::NoShow)
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reserved arrival window at a gate.
///
/// All time-based behaviour (overdue detection, dwell metrics) is evaluated
/// at query time against a caller-supplied clock; the slot owns no timer.
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: Uuid,
    pub tenant_id: String,
    pub gate_id: String,
    pub gate_type: GateType,
    pub window_from: DateTime<Utc>,
    pub window_to: DateTime<Utc>,
    /// 1 = highest, 10 = lowest
    pub priority: u8,
    pub status: SlotStatus,
    pub vehicle_id: Option<String>,
    pub license_plate: Option<String>,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub commodity: Option<String>,
    pub expected_weight: Option<f64>,
    pub entered_at: Option<DateTime<Utc>>,
    pub exited_at: Option<DateTime<Utc>>,
    pub service_started_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    /// Optimistic concurrency counter, incremented on every mutation
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    const ENTITY: &'static str = "Slot";

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: impl Into<String>,
        gate_id: impl Into<String>,
        gate_type: GateType,
        window_from: DateTime<Utc>,
        window_to: DateTime<Utc>,
        priority: u8,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if window_to <= window_from {
            return Err(DomainError::Validation(format!(
                "appointment window end {} must be after start {}",
                window_to, window_from
            )));
        }
        if !(1..=10).contains(&priority) {
            return Err(DomainError::Validation(format!(
                "priority must be in 1..=10, got {}",
                priority
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            gate_id: gate_id.into(),
            gate_type,
            window_from,
            window_to,
            priority,
            status: SlotStatus::Scheduled,
            vehicle_id: None,
            license_plate: None,
            contract_id: None,
            order_id: None,
            commodity: None,
            expected_weight: None,
            entered_at: None,
            exited_at: None,
            service_started_at: None,
            notes: None,
            cancel_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attach a vehicle to the reservation; Scheduled only.
    pub fn assign_vehicle(
        &mut self,
        vehicle_id: Option<String>,
        license_plate: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != SlotStatus::Scheduled {
            return Err(self.transition_error("assign_vehicle"));
        }
        if vehicle_id.is_none() && license_plate.is_none() {
            return Err(DomainError::Validation(
                "assign_vehicle requires a vehicle id or a license plate".to_string(),
            ));
        }
        self.vehicle_id = vehicle_id;
        self.license_plate = license_plate;
        self.touch(now);
        Ok(())
    }

    /// Single-phase entry: stamps both `entered_at` and `service_started_at`.
    pub fn mark_entered(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != SlotStatus::Scheduled {
            return Err(self.transition_error("mark_entered"));
        }
        self.status = SlotStatus::Entered;
        self.entered_at = Some(now);
        self.service_started_at = Some(now);
        self.touch(now);
        Ok(())
    }

    pub fn mark_exited(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != SlotStatus::Entered {
            return Err(self.transition_error("mark_exited"));
        }
        self.status = SlotStatus::Exited;
        self.exited_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Allowed from Scheduled and Entered; Exited/Cancelled/NoShow are final.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(self.transition_error("cancel"));
        }
        self.status = SlotStatus::Cancelled;
        self.cancel_reason = reason;
        self.touch(now);
        Ok(())
    }

    pub fn mark_no_show(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != SlotStatus::Scheduled {
            return Err(self.transition_error("mark_no_show"));
        }
        self.status = SlotStatus::NoShow;
        self.touch(now);
        Ok(())
    }

    /// Query-time only; an external sweep converts overdue slots to NoShow.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == SlotStatus::Scheduled && now > self.window_to
    }

    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_from && now <= self.window_to
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority <= 3
    }

    /// Entry to service start; zero under the single-phase entry model.
    pub fn wait_time_minutes(&self) -> Option<i64> {
        match (self.entered_at, self.service_started_at) {
            (Some(entered), Some(started)) => Some((started - entered).num_minutes()),
            _ => None,
        }
    }

    pub fn service_time_minutes(&self) -> Option<i64> {
        match (self.service_started_at, self.exited_at) {
            (Some(started), Some(exited)) => Some((exited - started).num_minutes()),
            _ => None,
        }
    }

    pub fn total_time_minutes(&self) -> Option<i64> {
        match (self.entered_at, self.exited_at) {
            (Some(entered), Some(exited)) => Some((exited - entered).num_minutes()),
            _ => None,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    fn transition_error(&self, operation: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            entity: Self::ENTITY,
            operation,
            from: self.status.to_string(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_slot(now: DateTime<Utc>) -> Slot {
        Slot::new(
            "tenant-a",
            "GATE-1",
            GateType::Weighing,
            now - Duration::minutes(10),
            now + Duration::minutes(10),
            2,
            now,
        )
        .unwrap()
    }

    #[test]
    fn new_slot_is_scheduled() {
        let now = Utc::now();
        let s = sample_slot(now);
        assert_eq!(s.status, SlotStatus::Scheduled);
        assert!(s.is_high_priority());
        assert!(s.is_within_window(now));
        assert!(!s.is_overdue(now));
        assert_eq!(s.version, 1);
    }

    #[test]
    fn invalid_window_rejected() {
        let now = Utc::now();
        let err = Slot::new(
            "tenant-a",
            "GATE-1",
            GateType::Inbound,
            now,
            now - Duration::minutes(5),
            2,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn priority_out_of_range_rejected() {
        let now = Utc::now();
        for bad in [0u8, 11] {
            let err = Slot::new(
                "tenant-a",
                "GATE-1",
                GateType::Inbound,
                now,
                now + Duration::minutes(30),
                bad,
                now,
            )
            .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn full_journey_scenario() {
        // Priority-2 slot, window now−10m..now+10m: assign, enter, exit after
        // 5 minutes, total dwell ≈ 5 minutes.
        let now = Utc::now();
        let mut s = sample_slot(now);
        s.assign_vehicle(None, Some("AB-123-CD".into()), now).unwrap();
        assert!(s.is_high_priority());
        s.mark_entered(now).unwrap();
        assert_eq!(s.entered_at, Some(now));
        assert_eq!(s.service_started_at, Some(now));

        let exit = now + Duration::minutes(5);
        s.mark_exited(exit).unwrap();
        assert_eq!(s.status, SlotStatus::Exited);
        assert_eq!(s.total_time_minutes(), Some(5));
        assert_eq!(s.service_time_minutes(), Some(5));
        assert_eq!(s.wait_time_minutes(), Some(0));
    }

    #[test]
    fn invalid_transitions_rejected() {
        let now = Utc::now();

        // Exit without entry
        let mut s = sample_slot(now);
        assert!(matches!(
            s.mark_exited(now),
            Err(DomainError::InvalidTransition { .. })
        ));

        // Re-entry after entering
        let mut s = sample_slot(now);
        s.mark_entered(now).unwrap();
        assert!(matches!(
            s.mark_entered(now),
            Err(DomainError::InvalidTransition { .. })
        ));
        // No-show only applies before arrival
        assert!(matches!(
            s.mark_no_show(now),
            Err(DomainError::InvalidTransition { .. })
        ));
        // Assigning a vehicle after entry is too late
        assert!(matches!(
            s.assign_vehicle(Some("V1".into()), None, now),
            Err(DomainError::InvalidTransition { .. })
        ));

        // Cancel after exit
        let mut s = sample_slot(now);
        s.mark_entered(now).unwrap();
        s.mark_exited(now).unwrap();
        assert!(matches!(
            s.cancel(None, now),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_from_entered_is_allowed() {
        let now = Utc::now();
        let mut s = sample_slot(now);
        s.mark_entered(now).unwrap();
        assert!(s.cancel(Some("turned away at inspection".into()), now).is_ok());
        assert_eq!(s.status, SlotStatus::Cancelled);
    }

    #[test]
    fn no_show_and_cancelled_are_terminal() {
        let now = Utc::now();
        let mut s = sample_slot(now);
        s.mark_no_show(now).unwrap();
        assert!(matches!(
            s.mark_entered(now),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(matches!(
            s.cancel(None, now),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn overdue_is_query_time_only() {
        let now = Utc::now();
        let s = sample_slot(now);
        assert!(!s.is_overdue(now));
        assert!(s.is_overdue(now + Duration::minutes(11)));
        // Still Scheduled; nothing mutated by the query.
        assert_eq!(s.status, SlotStatus::Scheduled);
        assert_eq!(s.version, 1);
    }

    #[test]
    fn entered_slot_is_never_overdue() {
        let now = Utc::now();
        let mut s = sample_slot(now);
        s.mark_entered(now).unwrap();
        assert!(!s.is_overdue(now + Duration::hours(2)));
    }

    #[test]
    fn assign_vehicle_requires_identity() {
        let now = Utc::now();
        let mut s = sample_slot(now);
        assert!(matches!(
            s.assign_vehicle(None, None, now),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn version_increments_on_every_mutation() {
        let now = Utc::now();
        let mut s = sample_slot(now);
        s.assign_vehicle(None, Some("AB-123-CD".into()), now).unwrap();
        s.mark_entered(now).unwrap();
        s.mark_exited(now + Duration::minutes(5)).unwrap();
        assert_eq!(s.version, 4);
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            SlotStatus::Scheduled,
            SlotStatus::Entered,
            SlotStatus::Exited,
            SlotStatus::Cancelled,
            SlotStatus::NoShow,
        ] {
            assert_eq!(&SlotStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(SlotStatus::from_str("Parked").is_none());
    }
}
