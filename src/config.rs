use std::env;
use std::time::Duration;

use crate::domain::Resource;

// ============================================================================
// Configuration
// ============================================================================
//
// Everything is environment-derived and everything has a default, so the
// simulation starts with no setup. Parsing goes through a lookup closure so
// tests never have to mutate process-global environment state.
//
// ============================================================================

/// Who we are on payment and pickup requests.
#[derive(Debug, Clone)]
pub struct CompanyIdentity {
    pub company_id: String,
    pub origin_company: String,
    /// Fixed payer bank quoted on every outgoing payment.
    pub payer_bank_name: String,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sleep between background dispatch passes.
    pub process_interval: Duration,
    /// Transient failures tolerated per queue item before exhaustion.
    pub max_retries: u32,
    /// Master switch for the background dispatch loop.
    pub background_enabled: bool,
    /// Exhausted items flag their order `Abandoned` when true; retry
    /// forever when false.
    pub abandon_on_exhaustion: bool,
    /// Upper bound on any single collaborator call. Kept below the process
    /// interval so a stalled service cannot eat a whole tick.
    pub collaborator_timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct ResourcePolicy {
    pub target: i64,
    pub reorder_point: i64,
    pub order_quantity: i64,
}

#[derive(Debug, Clone)]
pub struct ReorderConfig {
    pub auto_reorder: bool,
    /// Supplier terms pending a real supplier-selection integration.
    pub placeholder_seller_account: String,
    pub placeholder_unit_price_cents: i64,
    pub sand: ResourcePolicy,
    pub copper: ResourcePolicy,
    pub equipment: ResourcePolicy,
}

impl ReorderConfig {
    pub fn policy(&self, resource: Resource) -> ResourcePolicy {
        match resource {
            Resource::Sand => self.sand,
            Resource::Copper => self.copper,
            Resource::Equipment => self.equipment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_port: u16,
    /// Banking service base URL; unset selects the simulated gateway.
    pub banking_url: Option<String>,
    /// Logistics service base URL; unset selects the simulated gateway.
    pub logistics_url: Option<String>,
    pub identity: CompanyIdentity,
    pub pipeline: PipelineConfig,
    pub reorder: ReorderConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let process_interval =
            Duration::from_secs(parse(&lookup, "PIPELINE_PROCESS_INTERVAL_SECS", 30));
        let mut collaborator_timeout =
            Duration::from_secs(parse(&lookup, "COLLABORATOR_TIMEOUT_SECS", 10));

        if collaborator_timeout >= process_interval {
            let clamped = (process_interval / 2).max(Duration::from_secs(1));
            tracing::warn!(
                configured_secs = collaborator_timeout.as_secs(),
                interval_secs = process_interval.as_secs(),
                clamped_secs = clamped.as_secs(),
                "Collaborator timeout must stay below the process interval, clamping"
            );
            collaborator_timeout = clamped;
        }

        Self {
            http_port: parse(&lookup, "HTTP_PORT", 8080),
            banking_url: lookup("BANKING_URL").filter(|v| !v.is_empty()),
            logistics_url: lookup("LOGISTICS_URL").filter(|v| !v.is_empty()),
            identity: CompanyIdentity {
                company_id: string(&lookup, "COMPANY_ID", "plant-1"),
                origin_company: string(&lookup, "ORIGIN_COMPANY", "supplier-co"),
                payer_bank_name: string(&lookup, "PAYER_BANK_NAME", "manufacturer-bank"),
            },
            pipeline: PipelineConfig {
                process_interval,
                max_retries: parse(&lookup, "PIPELINE_MAX_RETRIES", 3),
                background_enabled: parse_bool(&lookup, "PIPELINE_BACKGROUND_ENABLED", true),
                abandon_on_exhaustion: parse_bool(&lookup, "PIPELINE_ABANDON_ON_EXHAUSTION", true),
                collaborator_timeout,
            },
            reorder: ReorderConfig {
                auto_reorder: parse_bool(&lookup, "REORDER_AUTO_ENABLED", true),
                placeholder_seller_account: string(
                    &lookup,
                    "REORDER_SELLER_ACCOUNT",
                    "SUPPLIER-ACC-PENDING",
                ),
                placeholder_unit_price_cents: parse(&lookup, "REORDER_UNIT_PRICE_CENTS", 50),
                sand: resource_policy(&lookup, "SAND", 1_000, 150, 500),
                copper: resource_policy(&lookup, "COPPER", 500, 100, 250),
                equipment: resource_policy(&lookup, "EQUIPMENT", 10, 2, 5),
            },
        }
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = key, value = %raw, "Unparseable config value, using default");
            default
        }),
        None => default,
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("TRUE") | Some("True") => true,
        Some("0") | Some("false") | Some("FALSE") | Some("False") => false,
        Some(other) => {
            tracing::warn!(key = key, value = other, "Unparseable boolean, using default");
            default
        }
        None => default,
    }
}

fn string(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn resource_policy(
    lookup: &impl Fn(&str) -> Option<String>,
    prefix: &str,
    target: i64,
    reorder_point: i64,
    order_quantity: i64,
) -> ResourcePolicy {
    ResourcePolicy {
        target: parse(lookup, &format!("REORDER_{}_TARGET", prefix), target),
        reorder_point: parse(
            lookup,
            &format!("REORDER_{}_REORDER_POINT", prefix),
            reorder_point,
        ),
        order_quantity: parse(
            lookup,
            &format!("REORDER_{}_ORDER_QUANTITY", prefix),
            order_quantity,
        ),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.pipeline.process_interval, Duration::from_secs(30));
        assert_eq!(config.pipeline.max_retries, 3);
        assert!(config.pipeline.background_enabled);
        assert!(config.pipeline.abandon_on_exhaustion);
        assert_eq!(config.pipeline.collaborator_timeout, Duration::from_secs(10));
        assert!(config.reorder.auto_reorder);
        assert_eq!(config.reorder.sand.target, 1_000);
        assert_eq!(config.reorder.sand.reorder_point, 150);
        assert_eq!(config.reorder.sand.order_quantity, 500);
        assert_eq!(config.http_port, 8080);
        assert!(config.banking_url.is_none());
        assert_eq!(config.identity.payer_bank_name, "manufacturer-bank");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PIPELINE_PROCESS_INTERVAL_SECS", "60"),
            ("PIPELINE_MAX_RETRIES", "5"),
            ("PIPELINE_BACKGROUND_ENABLED", "false"),
            ("REORDER_AUTO_ENABLED", "0"),
            ("REORDER_SAND_ORDER_QUANTITY", "750"),
            ("BANKING_URL", "http://localhost:9001"),
        ]);

        assert_eq!(config.pipeline.process_interval, Duration::from_secs(60));
        assert_eq!(config.pipeline.max_retries, 5);
        assert!(!config.pipeline.background_enabled);
        assert!(!config.reorder.auto_reorder);
        assert_eq!(config.reorder.sand.order_quantity, 750);
        assert_eq!(config.banking_url.as_deref(), Some("http://localhost:9001"));
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("PIPELINE_MAX_RETRIES", "lots"),
            ("PIPELINE_BACKGROUND_ENABLED", "maybe"),
        ]);

        assert_eq!(config.pipeline.max_retries, 3);
        assert!(config.pipeline.background_enabled);
    }

    #[test]
    fn test_collaborator_timeout_clamped_below_interval() {
        let config = config_from(&[
            ("PIPELINE_PROCESS_INTERVAL_SECS", "10"),
            ("COLLABORATOR_TIMEOUT_SECS", "30"),
        ]);

        assert!(config.pipeline.collaborator_timeout < config.pipeline.process_interval);
        assert_eq!(config.pipeline.collaborator_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_policy_lookup_by_resource() {
        let config = config_from(&[]);
        assert_eq!(config.reorder.policy(Resource::Copper).target, 500);
        assert_eq!(config.reorder.policy(Resource::Equipment).order_quantity, 5);
    }
}
