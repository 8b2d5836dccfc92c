//! Transaction recording for the settlement tracker.
use tracing::{error, info, warn};

use crate::backend::domain::commands::transactions::{CreateTransactionCommand, TransactionRecorded};
use crate::backend::domain::cost_allocator::{compute_derived, AllocationError, CostAllocator};
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::breakdown::NewTypeBreakdown;
use crate::backend::domain::models::transaction::NewTransaction;
use crate::backend::storage::{BreakdownRepository, TransactionRepository};

#[derive(Clone)]
pub struct TransactionService {
    transaction_repository: TransactionRepository,
    breakdown_repository: BreakdownRepository,
    cost_allocator: CostAllocator,
}

impl TransactionService {
    pub fn new(
        transaction_repository: TransactionRepository,
        breakdown_repository: BreakdownRepository,
        cost_allocator: CostAllocator,
    ) -> Self {
        Self {
            transaction_repository,
            breakdown_repository,
            cost_allocator,
        }
    }

    /// Record a transaction with its breakdown lines, then reconcile every
    /// group so siblings pick up the new group size.
    ///
    /// Nothing is written when validation fails. Only the transaction insert
    /// itself must succeed; breakdown lines and reconciliation degrade to
    /// logged failures.
    pub async fn create_transaction(
        &self,
        command: CreateTransactionCommand,
    ) -> Result<TransactionRecorded, DomainError> {
        info!(
            "Recording transaction: date={}, partner_id={}, quantity={}",
            command.date, command.partner_id, command.quantity
        );
        Self::validate(&command)?;

        let existing = self
            .transaction_repository
            .count_in_group(command.date, command.partner_id)
            .await?;
        let group_size = existing + 1;

        let derived = compute_derived(
            command.total_weight_kg,
            command.price_per_kg,
            command.freight_cost,
            command.quantity,
            group_size,
        )
        .map_err(|e| match e {
            AllocationError::ZeroQuantity => DomainError::validation("La cantidad debe ser mayor que cero"),
            other => DomainError::validation(other.to_string()),
        })?;

        let new_transaction = NewTransaction {
            date: command.date,
            partner_id: command.partner_id,
            quantity: command.quantity,
            total_weight_kg: command.total_weight_kg,
            price_per_kg: command.price_per_kg,
            freight_cost: command.freight_cost,
            commission: command.commission,
            value_per_unit: derived.value_per_unit,
            total: derived.total,
        };
        let transaction_id = self
            .transaction_repository
            .store_transaction(&new_transaction)
            .await?;
        info!("Stored transaction id={} (group size {})", transaction_id, group_size);

        let mut breakdown_saved = 0;
        let mut breakdown_skipped = 0;
        let mut breakdown_failed = 0;
        for entry in &command.breakdown {
            let (Some(type_id), Some(quantity)) = (entry.type_id, entry.quantity) else {
                breakdown_skipped += 1;
                continue;
            };
            let breakdown = NewTypeBreakdown {
                transaction_id,
                partner_id: command.partner_id,
                type_id,
                quantity,
                notes: entry.notes.clone().filter(|n| !n.trim().is_empty()),
            };
            match self.breakdown_repository.store_breakdown(&breakdown).await {
                Ok(_) => breakdown_saved += 1,
                Err(e) => {
                    error!("Failed to store breakdown type={} for transaction id={}: {}", type_id, transaction_id, e);
                    breakdown_failed += 1;
                }
            }
        }

        let reconcile = match self.cost_allocator.reconcile_all().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Transaction id={} stored but reconciliation failed: {}", transaction_id, e);
                None
            }
        };

        Ok(TransactionRecorded {
            transaction: new_transaction.into_stored(transaction_id),
            breakdown_saved,
            breakdown_skipped,
            breakdown_failed,
            reconcile,
        })
    }

    fn validate(command: &CreateTransactionCommand) -> Result<(), DomainError> {
        if command.quantity <= 0 {
            return Err(DomainError::validation("La cantidad debe ser mayor que cero"));
        }
        let amounts = [
            ("kg_totales", command.total_weight_kg),
            ("vr_kilo", command.price_per_kg),
            ("fletes", command.freight_cost),
            ("comision", command.commission),
        ];
        for (field, value) in amounts {
            if !value.is_finite() {
                return Err(DomainError::validation(format!("Valor inválido para {}", field)));
            }
        }
        Ok(())
    }
}
