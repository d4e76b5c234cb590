use crate::domain::{error::DomainError, operation::Operation};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_operation(op: &Operation) -> Result<(), DomainError> {
        op.validate()
    }

    /// Validate a whole batch, stopping at the first invalid operation.
    pub fn validate_batch<'a>(
        ops: impl IntoIterator<Item = &'a Operation>,
    ) -> Result<(), DomainError> {
        ops.into_iter().try_for_each(Self::validate_operation)
    }
}
