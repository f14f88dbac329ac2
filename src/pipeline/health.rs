use std::collections::HashMap;

use actix::prelude::*;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::BreakerState;

// ============================================================================
// Health Actor - Tracks component health
// ============================================================================
//
// Components (dispatcher, banking, logistics) push status updates; the
// boundary's /health endpoint asks for the aggregate. The coordinator
// refreshes collaborator entries from circuit-breaker state on an interval.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn from_breaker(state: BreakerState) -> Self {
        match state {
            BreakerState::Closed => HealthStatus::Healthy,
            BreakerState::HalfOpen => {
                HealthStatus::Degraded("circuit breaker half-open".to_string())
            }
            BreakerState::Open => HealthStatus::Unhealthy("circuit breaker open".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateHealth {
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

// ============================================================================
// Health Actor
// ============================================================================

#[derive(Default)]
pub struct HealthActor {
    components: HashMap<String, ComponentHealth>,
}

impl HealthActor {
    pub fn new() -> Self {
        Self::default()
    }

    fn compute_overall_status(&self) -> HealthStatus {
        let mut degraded = false;
        let mut unhealthy = Vec::new();

        for (name, health) in &self.components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => unhealthy.push(format!("{}: {}", name, msg)),
                HealthStatus::Degraded(_) => degraded = true,
                HealthStatus::Healthy => {}
            }
        }

        if !unhealthy.is_empty() {
            HealthStatus::Unhealthy(unhealthy.join(", "))
        } else if degraded {
            HealthStatus::Degraded("some components degraded".to_string())
        } else {
            HealthStatus::Healthy
        }
    }
}

impl Actor for HealthActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("HealthActor started");
    }
}

impl Handler<UpdateHealth> for HealthActor {
    type Result = ();

    fn handle(&mut self, msg: UpdateHealth, _: &mut Self::Context) {
        tracing::debug!(
            component = %msg.component,
            status = ?msg.status,
            "Updated component health"
        );

        let health = ComponentHealth {
            name: msg.component.clone(),
            status: msg.status,
            last_check: Utc::now(),
            details: msg.details,
        };
        self.components.insert(msg.component, health);
    }
}

impl Handler<GetSystemHealth> for HealthActor {
    type Result = MessageResult<GetSystemHealth>;

    fn handle(&mut self, _msg: GetSystemHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(SystemHealth {
            overall_status: self.compute_overall_status(),
            components: self.components.clone(),
            check_time: Utc::now(),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
