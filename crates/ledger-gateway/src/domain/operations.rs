//! Static operation table.
//!
//! Each domain operation maps to a fixed call kind, contract role and
//! contract function. Channel and contract names are resolved against
//! configuration at dispatch time.

use crate::domain::types::CallKind;
use std::fmt;

/// Which deployed contract an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractRole {
    /// User registry and permission checks
    AccessControl,
    /// Append-only security event log
    SecurityAudit,
}

/// Domain operations exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateUser,
    CheckAccess,
    RecordEvent,
}

/// Fixed dispatch parameters of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub kind: OperationKind,
    /// Name used in logs, e.g. "create-user"
    pub name: &'static str,
    pub call: CallKind,
    pub contract: ContractRole,
    pub function: &'static str,
    /// Number of positional arguments the contract function takes
    pub arity: usize,
}

/// Every supported operation.
pub static OPERATIONS: [OperationDescriptor; 3] = [
    OperationDescriptor {
        kind: OperationKind::CreateUser,
        name: "create-user",
        call: CallKind::Submit,
        contract: ContractRole::AccessControl,
        function: "CreateUser",
        arity: 4,
    },
    OperationDescriptor {
        kind: OperationKind::CheckAccess,
        name: "check-access",
        call: CallKind::Evaluate,
        contract: ContractRole::AccessControl,
        function: "CheckAccess",
        arity: 2,
    },
    OperationDescriptor {
        kind: OperationKind::RecordEvent,
        name: "record-event",
        call: CallKind::Submit,
        contract: ContractRole::SecurityAudit,
        function: "RecordEvent",
        arity: 6,
    },
];

impl OperationKind {
    pub fn descriptor(&self) -> &'static OperationDescriptor {
        match self {
            OperationKind::CreateUser => &OPERATIONS[0],
            OperationKind::CheckAccess => &OPERATIONS[1],
            OperationKind::RecordEvent => &OPERATIONS[2],
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
