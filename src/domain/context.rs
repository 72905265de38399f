//! Operation Context
//!
//! Contains metadata about the current operation for tracing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// Context for an operation: who is acting and under which correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Authenticated account acting in this request
    pub actor_id: Uuid,

    /// Role carried by the actor's token
    pub role: Role,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a context for an authenticated actor
    pub fn new(actor_id: Uuid, role: Role) -> Self {
        Self {
            actor_id,
            role,
            correlation_id: None,
        }
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let actor = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let context = OperationContext::new(actor, Role::User).with_correlation_id(correlation_id);

        assert_eq!(context.actor_id, actor);
        assert_eq!(context.correlation_id, Some(correlation_id));
        assert!(!context.is_admin());
    }

    #[test]
    fn test_ensure_correlation_id() {
        let mut context = OperationContext::new(Uuid::new_v4(), Role::Admin);
        assert!(context.correlation_id.is_none());

        let id = context.ensure_correlation_id();
        assert_eq!(context.correlation_id, Some(id));
        assert_eq!(context.ensure_correlation_id(), id);
        assert!(context.is_admin());
    }
}
