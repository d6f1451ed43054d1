//! Snapshot of the entities the host lets the conversation agent see.

use homevertex_core::{CONVERSATION_DOMAIN, Host};
use serde::Serialize;

/// One exposed entity as handed to the prompt template.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExposedEntity {
    pub entity_id: String,
    pub name: String,
    pub state: String,
    pub aliases: Vec<String>,
}

/// Collect exposed entities in host enumeration order.
///
/// Entities that disappear between enumeration and the state lookup are
/// skipped.
pub fn collect_exposed_entities(host: &dyn Host) -> Vec<ExposedEntity> {
    host.states()
        .into_iter()
        .filter(|state| host.should_expose(CONVERSATION_DOMAIN, &state.entity_id))
        .filter_map(|listed| {
            let current = host.state(&listed.entity_id)?;
            Some(ExposedEntity {
                aliases: host
                    .entity_aliases(&listed.entity_id)
                    .into_iter()
                    .collect(),
                entity_id: listed.entity_id,
                name: current.name,
                state: current.state,
            })
        })
        .collect()
}
