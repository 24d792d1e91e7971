//! Machine instance lifecycle. Every call here carries a resolved machine ID.

use serde_json::json;

use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmAction {
    Spawn,
    Reset,
    Terminate,
    Extend,
}

impl VmAction {
    pub fn path(self) -> &'static str {
        match self {
            VmAction::Spawn => "/vm/spawn",
            VmAction::Reset => "/vm/reset",
            VmAction::Terminate => "/vm/terminate",
            VmAction::Extend => "/vm/extend",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            VmAction::Spawn => "spawn",
            VmAction::Reset => "reset",
            VmAction::Terminate => "terminate",
            VmAction::Extend => "extend",
        }
    }
}

pub fn request(action: VmAction, machine_id: u64) -> ApiRequest {
    ApiRequest::post(action.path()).json(json!({ "machine_id": machine_id }))
}

pub fn perform(client: &HtbClient, action: VmAction, machine_id: u64) -> Result<ApiResponse> {
    log::info!("{} machine {machine_id}", action.verb());
    client.execute(&request(action, machine_id))
}
