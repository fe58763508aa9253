use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::model::{ComponentId, WireId};
use crate::terminal::TerminalKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningCode {
    /// Wire endpoint had no terminal within tolerance.
    MatchingError,
    UnsupportedComponentType,
    ValueFormatError,
    /// Lead count does not fit the element type.
    TerminalCountError,
    IsolatedComponentWarning,
    /// Ground markers span disconnected nodes. Fatal.
    AmbiguousGroundError,
    InvalidMarker,
    DuplicateId,
    /// No usable ground marker; node 0 taken as ground.
    DefaultGround,
    InvalidConfig,
}

impl WarningCode {
    pub const fn severity(self) -> Severity {
        match self {
            WarningCode::AmbiguousGroundError | WarningCode::InvalidConfig => Severity::Error,
            WarningCode::IsolatedComponentWarning | WarningCode::DefaultGround => Severity::Info,
            WarningCode::MatchingError
            | WarningCode::UnsupportedComponentType
            | WarningCode::ValueFormatError
            | WarningCode::TerminalCountError
            | WarningCode::InvalidMarker
            | WarningCode::DuplicateId => Severity::Warning,
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub code: WarningCode,
    pub severity: Severity,
    pub message: String,
    pub related_entity_ids: Vec<String>,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>, related: Vec<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            related_entity_ids: related,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Ordered collector threaded through the pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    pub fn push(&mut self, code: WarningCode, message: impl Into<String>, related: Vec<String>) {
        let warning = Warning::new(code, message, related);
        match warning.severity {
            Severity::Info => info!("{warning}"),
            Severity::Warning => warn!("{warning}"),
            Severity::Error => error!("{warning}"),
        }
        self.0.push(warning);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.0
    }
}

pub fn component_ref(id: ComponentId) -> String {
    format!("component:{id}")
}

pub fn wire_ref(id: WireId) -> String {
    format!("wire:{id}")
}

pub fn terminal_ref(key: TerminalKey) -> String {
    match key {
        TerminalKey::Real { .. } => format!("terminal:{key}"),
        TerminalKey::Junction { .. } => format!("junction:{key}"),
    }
}
