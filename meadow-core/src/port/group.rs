//! All-or-nothing claims over several pins

use heapless::Vec;

use super::claim::ChannelClaim;
use super::PortError;
use crate::channel::{ChannelKind, ChannelTable, PinId};
use crate::config::ChannelAssignment;

/// Most pins a single port can claim (SPI clock, data in, data out, select)
pub const MAX_PORT_CHANNELS: usize = 4;

/// Claims on every pin a port needs
///
/// Either all assignments are reserved or none are: a reservation that
/// fails part-way drops the claims already taken, which releases them.
#[derive(Debug)]
pub struct ClaimGroup<'r> {
    claims: Vec<ChannelClaim<'r>, MAX_PORT_CHANNELS>,
}

impl<'r> ClaimGroup<'r> {
    /// Reserve every assignment, in order
    ///
    /// An empty request fails with [`PortError::NoChannels`] and one longer
    /// than [`MAX_PORT_CHANNELS`] with [`PortError::TooManyChannels`]; the
    /// table is not touched in either case.
    pub fn acquire(
        table: &'r dyn ChannelTable,
        assignments: &[ChannelAssignment],
    ) -> Result<Self, PortError> {
        if assignments.is_empty() {
            return Err(PortError::NoChannels);
        }
        if assignments.len() > MAX_PORT_CHANNELS {
            return Err(PortError::TooManyChannels {
                requested: assignments.len(),
            });
        }

        let mut claims = Vec::new();
        for assignment in assignments {
            let claim = ChannelClaim::acquire(table, assignment.pin, assignment.kind)?;
            // Capacity checked above; a rejected claim drops and releases
            let _ = claims.push(claim);
        }
        Ok(Self { claims })
    }

    /// Claimed pins, in assignment order
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.claims.iter().map(ChannelClaim::pin)
    }

    /// Kind `pin` was claimed for, if it is in the group
    pub fn kind_of(&self, pin: PinId) -> Option<ChannelKind> {
        self.claims
            .iter()
            .find(|claim| claim.pin() == pin)
            .map(ChannelClaim::kind)
    }

    /// Individual claims
    pub fn claims(&self) -> &[ChannelClaim<'r>] {
        &self.claims
    }

    /// Number of claimed pins
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether the group claims no pin
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Whether any claim still holds its reservation
    pub fn is_held(&self) -> bool {
        self.claims.iter().any(ChannelClaim::is_held)
    }

    /// Release every claim, last acquired first
    pub fn release(&mut self) {
        for claim in self.claims.iter_mut().rev() {
            claim.release();
        }
    }
}
