//! `resolveGameId` (§4.4): exact id match first, then a linear scan for a
//! descriptor whose `target` equals the input. Lets the agent address a
//! game by its Steam app id interchangeably with its configured id.

use crate::GameDescriptor;

pub fn resolve_game_id<'a>(descriptors: &'a [GameDescriptor], input: &str) -> Option<&'a GameDescriptor> {
    descriptors
        .iter()
        .find(|d| d.id == input)
        .or_else(|| descriptors.iter().find(|d| d.target == input))
}
