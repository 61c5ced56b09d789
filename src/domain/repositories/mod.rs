//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` — unified access to all per-aggregate repositories
//! - `DomainResult` — standard result type for domain operations

use super::anpr::AnprRecordRepository;
use super::slot::SlotRepository;
use super::ticket::WeighingTicketRepository;
use super::wait_log::WaitLogRepository;

pub use crate::shared::errors::DomainResult;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let ticket = repos.tickets().find_by_id(id).await?;
///     let slot = repos.slots().find_by_id(slot_id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn tickets(&self) -> &dyn WeighingTicketRepository;
    fn slots(&self) -> &dyn SlotRepository;
    fn anpr_records(&self) -> &dyn AnprRecordRepository;
    fn wait_logs(&self) -> &dyn WaitLogRepository;
}
