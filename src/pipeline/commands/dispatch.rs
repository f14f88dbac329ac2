use std::sync::Arc;

use crate::collaborators::{LogisticsGateway, PaymentGateway};
use crate::config::CompanyIdentity;
use crate::domain::{OrderStatus, PurchaseOrder};
use crate::store::PurchaseOrderStore;

use super::{
    FulfillmentCommand, LogisticsPaymentCommand, NoOpCommand, ShippingRequestCommand,
    SupplierPaymentCommand,
};

// ============================================================================
// Command Dispatch Table
// ============================================================================
//
// Maps an order's current status to the command that advances it. Built once
// with bound collaborator handles; resolving a command is a plain function
// of the order. Total by construction: anything the pipeline does not drive
// falls through to the no-op arm, so a status added to the vocabulary later
// can never make dispatch fail.
//
// ============================================================================

pub struct CommandDispatch {
    store: Arc<dyn PurchaseOrderStore>,
    payments: Arc<dyn PaymentGateway>,
    logistics: Arc<dyn LogisticsGateway>,
    identity: CompanyIdentity,
}

impl CommandDispatch {
    pub fn new(
        store: Arc<dyn PurchaseOrderStore>,
        payments: Arc<dyn PaymentGateway>,
        logistics: Arc<dyn LogisticsGateway>,
        identity: CompanyIdentity,
    ) -> Self {
        Self {
            store,
            payments,
            logistics,
            identity,
        }
    }

    pub fn command_for(&self, order: &PurchaseOrder) -> Box<dyn FulfillmentCommand> {
        match order.status {
            OrderStatus::RequiresPaymentToSupplier => Box::new(SupplierPaymentCommand::new(
                order.clone(),
                self.store.clone(),
                self.payments.clone(),
                self.identity.payer_bank_name.clone(),
            )),
            OrderStatus::RequiresDelivery => Box::new(ShippingRequestCommand::new(
                order.clone(),
                self.store.clone(),
                self.logistics.clone(),
                self.identity.origin_company.clone(),
                self.identity.company_id.clone(),
            )),
            OrderStatus::RequiresPaymentToLogistics => Box::new(LogisticsPaymentCommand::new(
                order.clone(),
                self.store.clone(),
                self.payments.clone(),
                self.identity.payer_bank_name.clone(),
            )),
            // Everything else, terminal or belonging to another lifecycle,
            // is not ours to drive
            other => Box::new(NoOpCommand::new(other)),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
