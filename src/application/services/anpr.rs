//! ANPR reconciliation business logic service

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::application::dto::{check, CreateAnprRequest};
use crate::domain::anpr::{AnprFilter, AnprRecord};
use crate::domain::{Clock, DomainError, DomainResult, RepositoryProvider, VehicleLookup};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Orchestrates plate detections: ingestion, master-data reconciliation,
/// ticket assignment and the retry cycle.
pub struct AnprService {
    repos: Arc<dyn RepositoryProvider>,
    lookup: Arc<dyn VehicleLookup>,
    clock: Arc<dyn Clock>,
}

impl AnprService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        lookup: Arc<dyn VehicleLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repos,
            lookup,
            clock,
        }
    }

    pub async fn ingest_detection(&self, req: CreateAnprRequest) -> DomainResult<AnprRecord> {
        check(&req)?;
        let now = self.clock.now();
        let record = AnprRecord::new(
            req.tenant_id,
            req.license_plate,
            req.confidence,
            req.captured_at,
            req.camera_id,
            req.gate_id,
            req.image_ref,
            now,
        )?;
        self.repos.anpr_records().create(record.clone()).await?;
        info!(
            record_id = %record.id,
            plate = %record.license_plate,
            confidence = record.confidence,
            level = record.confidence_level().as_str(),
            camera = %record.camera_id,
            "Plate detection ingested"
        );
        Ok(record)
    }

    /// Reconcile a detection against vehicle master data. A failing lookup
    /// is recorded on the entity via `mark_error` so the retry cycle can
    /// pick it up.
    pub async fn process_record(&self, record_id: Uuid) -> DomainResult<AnprRecord> {
        let mut record = self.load(record_id).await?;
        let expected_version = record.version;
        let now = self.clock.now();

        let matched = match self
            .lookup
            .lookup_by_plate(&record.tenant_id, &record.license_plate)
            .await
        {
            Ok(matched) => matched,
            Err(err) => {
                warn!(record_id = %record.id, error = %err, "Vehicle lookup failed");
                record.mark_error(err.to_string(), now);
                self.repos
                    .anpr_records()
                    .update(record, expected_version)
                    .await?;
                return Err(err);
            }
        };

        record.process(matched, now)?;
        self.repos
            .anpr_records()
            .update(record.clone(), expected_version)
            .await?;
        info!(
            record_id = %record.id,
            plate = %record.license_plate,
            vehicle = ?record.vehicle_id,
            "Plate detection processed"
        );
        Ok(record)
    }

    pub async fn assign_ticket(
        &self,
        record_id: Uuid,
        ticket_id: &str,
    ) -> DomainResult<AnprRecord> {
        let mut record = self.load(record_id).await?;
        let expected_version = record.version;
        record.assign_ticket(ticket_id, self.clock.now())?;
        self.repos
            .anpr_records()
            .update(record.clone(), expected_version)
            .await?;
        info!(record_id = %record.id, ticket = ticket_id, "Detection assigned to ticket");
        Ok(record)
    }

    pub async fn reject_record(
        &self,
        record_id: Uuid,
        reason: Option<String>,
    ) -> DomainResult<AnprRecord> {
        let mut record = self.load(record_id).await?;
        let expected_version = record.version;
        record.reject(reason, self.clock.now())?;
        self.repos
            .anpr_records()
            .update(record.clone(), expected_version)
            .await?;
        Ok(record)
    }

    pub async fn mark_error(
        &self,
        record_id: Uuid,
        message: &str,
    ) -> DomainResult<AnprRecord> {
        let mut record = self.load(record_id).await?;
        let expected_version = record.version;
        record.mark_error(message, self.clock.now());
        self.repos
            .anpr_records()
            .update(record.clone(), expected_version)
            .await?;
        Ok(record)
    }

    /// Reset an errored record for another pass; bounded by the hard
    /// retry ceiling on the entity.
    pub async fn retry_record(&self, record_id: Uuid) -> DomainResult<AnprRecord> {
        let mut record = self.load(record_id).await?;
        let expected_version = record.version;
        record.retry(self.clock.now())?;
        self.repos
            .anpr_records()
            .update(record.clone(), expected_version)
            .await?;
        info!(
            record_id = %record.id,
            retry_count = record.retry_count,
            "Detection queued for reprocessing"
        );
        Ok(record)
    }

    pub async fn get_record(&self, record_id: Uuid) -> DomainResult<AnprRecord> {
        self.load(record_id).await
    }

    pub async fn list_records(
        &self,
        filter: AnprFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<AnprRecord>> {
        self.repos.anpr_records().find_many(filter, pagination).await
    }

    async fn load(&self, record_id: Uuid) -> DomainResult<AnprRecord> {
        self.repos
            .anpr_records()
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "AnprRecord",
                field: "id",
                value: record_id.to_string(),
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::anpr::{AnprStatus, ConfidenceLevel};
    use crate::domain::{SystemClock, VehicleMatch};
    use crate::infrastructure::storage::{InMemoryRepositoryProvider, StaticVehicleLookup};

    fn service_with_lookup() -> (AnprService, Arc<StaticVehicleLookup>) {
        let lookup = Arc::new(StaticVehicleLookup::new());
        let svc = AnprService::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            lookup.clone(),
            Arc::new(SystemClock),
        );
        (svc, lookup)
    }

    fn detection(confidence: f64) -> CreateAnprRequest {
        CreateAnprRequest {
            tenant_id: "tenant-a".into(),
            license_plate: "AB-123-CD".into(),
            confidence,
            captured_at: Utc::now(),
            camera_id: "CAM-1".into(),
            gate_id: Some("GATE-1".into()),
            image_ref: None,
        }
    }

    #[tokio::test]
    async fn detection_to_assignment() {
        let (svc, lookup) = service_with_lookup();
        lookup.insert(
            "tenant-a",
            "AB-123-CD",
            VehicleMatch {
                vehicle_id: "V-1".into(),
                contract_id: Some("C-7".into()),
                order_id: None,
                commodity: Some("gravel".into()),
            },
        );

        let record = svc.ingest_detection(detection(95.0)).await.unwrap();
        assert_eq!(record.status, AnprStatus::Detected);
        assert_eq!(record.confidence_level(), ConfidenceLevel::High);

        let record = svc.process_record(record.id).await.unwrap();
        assert_eq!(record.status, AnprStatus::Processed);
        assert_eq!(record.vehicle_id.as_deref(), Some("V-1"));
        assert_eq!(record.contract_id.as_deref(), Some("C-7"));

        let record = svc.assign_ticket(record.id, "T-1").await.unwrap();
        assert_eq!(record.status, AnprStatus::Assigned);
        assert_eq!(record.assigned_ticket_id.as_deref(), Some("T-1"));

        // An assigned detection is committed; rejection is too late.
        let err = svc.reject_record(record.id, None).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn unmatched_plate_still_processes() {
        let (svc, _lookup) = service_with_lookup();
        let record = svc.ingest_detection(detection(75.0)).await.unwrap();
        let record = svc.process_record(record.id).await.unwrap();
        assert_eq!(record.status, AnprStatus::Processed);
        assert!(record.vehicle_id.is_none());
    }

    #[tokio::test]
    async fn error_retry_cycle_hits_the_ceiling() {
        let (svc, _lookup) = service_with_lookup();
        let record = svc.ingest_detection(detection(80.0)).await.unwrap();

        svc.mark_error(record.id, "camera feed glitch").await.unwrap();
        let record = svc.retry_record(record.id).await.unwrap();
        assert_eq!(record.status, AnprStatus::Detected);
        assert_eq!(record.retry_count, 2);

        svc.mark_error(record.id, "camera feed glitch").await.unwrap();
        let err = svc.retry_record(record.id).await.unwrap_err();
        assert!(matches!(err, DomainError::RetryLimitExceeded { .. }));

        // The ceiling is permanent; a later retry fails the same way.
        let err = svc.retry_record(record.id).await.unwrap_err();
        assert!(matches!(err, DomainError::RetryLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn confidence_out_of_range_rejected() {
        let (svc, _lookup) = service_with_lookup();
        let err = svc.ingest_detection(detection(101.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
