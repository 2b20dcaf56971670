//! Role gate: which roles may perform which operation.

use crate::models::Role;
use crate::services::ServiceError;

/// Operations guarded by the role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Use of the admin account-creation route, whatever role is requested.
    CreateAccount,
    CreateEmployee,
    CreateUser,
    CreateAdmin,
    EmployeeCreateUser,
    SubmitPayment,
    ListOwnPayments,
    ViewSession,
    ListAllPayments,
    DecidePayment,
}

impl Operation {
    /// Operation for creating an account of `target` role through the admin route.
    pub fn create_account(target: Role) -> Self {
        match target {
            Role::Admin => Operation::CreateAdmin,
            Role::Employee => Operation::CreateEmployee,
            Role::User => Operation::CreateUser,
        }
    }

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::CreateAccount | Operation::CreateEmployee | Operation::CreateUser => {
                &[Role::Admin]
            }
            Operation::CreateAdmin => &[],
            Operation::EmployeeCreateUser => &[Role::Employee],
            Operation::SubmitPayment | Operation::ListOwnPayments | Operation::ViewSession => {
                &Role::ALL
            }
            Operation::ListAllPayments | Operation::DecidePayment => {
                &[Role::Admin, Role::Employee]
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Operation::CreateAccount => "create accounts",
            Operation::CreateEmployee => "create employee accounts",
            Operation::CreateUser => "create user accounts",
            Operation::CreateAdmin => "create admin accounts",
            Operation::EmployeeCreateUser => "create customer accounts",
            Operation::SubmitPayment => "submit payments",
            Operation::ListOwnPayments => "list payments",
            Operation::ViewSession => "view the session",
            Operation::ListAllPayments => "list all payments",
            Operation::DecidePayment => "approve or deny payments",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Policy;

impl Policy {
    pub fn authorize(&self, operation: Operation, role: Role) -> Result<(), ServiceError> {
        if operation.allowed_roles().contains(&role) {
            Ok(())
        } else {
            tracing::warn!(
                role = %role,
                operation = ?operation,
                "Role gate denied operation"
            );
            Err(ServiceError::PermissionDenied(operation))
        }
    }
}
