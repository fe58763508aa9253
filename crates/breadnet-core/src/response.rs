use serde::Serialize;

use crate::emit::ComponentReport;
use crate::ground::PowerNet;
use crate::warnings::Warning;
use crate::{Resolution, ResolveError, ResolvedNode};

/// JSON body returned to an HTTP caller.
///
/// Recoverable problems still yield a netlist with status 200; the fatal
/// case yields no netlist, status 422, and the fatal entry in `warnings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub netlist: Option<String>,
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<ResolvedNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub power: Vec<PowerNet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentReport>,
}

impl ResolveResponse {
    pub fn from_result(result: Result<Resolution, ResolveError>) -> Self {
        match result {
            Ok(resolution) => Self {
                netlist: Some(resolution.netlist_text()),
                warnings: resolution.warnings,
                nodes: resolution.nodes,
                power: resolution.power,
                components: resolution.components,
            },
            Err(err) => Self {
                netlist: None,
                warnings: err.warnings(),
                nodes: Vec::new(),
                power: Vec::new(),
                components: Vec::new(),
            },
        }
    }

    pub fn status(&self) -> u16 {
        if self.netlist.is_some() {
            200
        } else {
            422
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.warnings.iter().any(Warning::is_fatal)
    }
}

impl From<Result<Resolution, ResolveError>> for ResolveResponse {
    fn from(result: Result<Resolution, ResolveError>) -> Self {
        Self::from_result(result)
    }
}
