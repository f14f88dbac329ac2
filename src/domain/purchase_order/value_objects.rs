use serde::{Deserialize, Serialize};

// ============================================================================
// Purchase Order Value Objects
// ============================================================================

/// Lifecycle states shared by the whole status vocabulary.
///
/// The procurement pipeline drives exactly four of these:
/// `RequiresPaymentToSupplier → RequiresDelivery → RequiresPaymentToLogistics
/// → WaitingForDelivery`. Everything else (terminal states and the sibling
/// screen-order states) resolves to a no-op in the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    RequiresPaymentToSupplier,
    RequiresDelivery,
    RequiresPaymentToLogistics,
    WaitingForDelivery,
    Delivered,
    Abandoned,
    // Screen-order lifecycle; same vocabulary, not driven by this pipeline
    WaitingForPayment,
    WaitingForCollection,
    Collected,
}

impl OrderStatus {
    /// Terminal states are retained for audit and never re-enter the queue.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Abandoned)
    }

    /// States the fulfillment pipeline advances.
    pub fn is_actionable(self) -> bool {
        matches!(
            self,
            OrderStatus::RequiresPaymentToSupplier
                | OrderStatus::RequiresDelivery
                | OrderStatus::RequiresPaymentToLogistics
                | OrderStatus::WaitingForDelivery
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            OrderStatus::RequiresPaymentToSupplier => "RequiresPaymentToSupplier",
            OrderStatus::RequiresDelivery => "RequiresDelivery",
            OrderStatus::RequiresPaymentToLogistics => "RequiresPaymentToLogistics",
            OrderStatus::WaitingForDelivery => "WaitingForDelivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Abandoned => "Abandoned",
            OrderStatus::WaitingForPayment => "WaitingForPayment",
            OrderStatus::WaitingForCollection => "WaitingForCollection",
            OrderStatus::Collected => "Collected",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw materials the plant consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Sand,
    Copper,
}

impl Material {
    /// Name used on pickup manifests and inventory lookups.
    pub fn name(self) -> &'static str {
        match self {
            Material::Sand => "sand",
            Material::Copper => "copper",
        }
    }
}

/// What a purchase order procures. Exactly one classification per order;
/// the tagged union makes "both" and "neither" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Material(Material),
    Equipment,
}

impl OrderKind {
    pub fn resource(self) -> Resource {
        match self {
            OrderKind::Material(Material::Sand) => Resource::Sand,
            OrderKind::Material(Material::Copper) => Resource::Copper,
            OrderKind::Equipment => Resource::Equipment,
        }
    }
}

/// Everything the reorder monitor tracks a stock level for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Sand,
    Copper,
    Equipment,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Sand, Resource::Copper, Resource::Equipment];

    pub fn order_kind(self) -> OrderKind {
        match self {
            Resource::Sand => OrderKind::Material(Material::Sand),
            Resource::Copper => OrderKind::Material(Material::Copper),
            Resource::Equipment => OrderKind::Equipment,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Sand => "sand",
            Resource::Copper => "copper",
            Resource::Equipment => "equipment",
        }
    }
}

/// Shipment weight data for equipment orders, served by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentParameters {
    /// Weight of one unit of equipment in kilograms.
    pub weight: i64,
}

// ============================================================================
// Unit Tests
// ============================================================================
