//! Generation tags for outstanding fetches.
//!
//! Responses may land out of issue order. Each channel keeps the generation
//! of the newest request issued on it; a response is applied only while its
//! ticket is still that newest one.

/// Independent fetch streams. A newer map fetch never invalidates an
/// outstanding parcel fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
	Map,
	Parcels,
	Agents,
	Simulation,
}

impl Channel {
	const COUNT: usize = 4;

	fn slot(self) -> usize {
		match self {
			Channel::Map => 0,
			Channel::Parcels => 1,
			Channel::Agents => 2,
			Channel::Simulation => 3,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
	pub channel: Channel,
	pub generation: u64,
}

impl RequestTicket {
	/// A ticket that no ledger will accept.
	pub fn detached(channel: Channel) -> Self {
		Self {
			channel,
			generation: 0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct RequestLedger {
	latest: [u64; Channel::COUNT],
}

impl RequestLedger {
	pub fn issue(&mut self, channel: Channel) -> RequestTicket {
		let slot = &mut self.latest[channel.slot()];
		*slot += 1;
		RequestTicket {
			channel,
			generation: *slot,
		}
	}

	/// Generation 0 is never issued, so a detached ticket is never current.
	pub fn is_current(&self, ticket: RequestTicket) -> bool {
		ticket.generation > 0 && self.latest[ticket.channel.slot()] == ticket.generation
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_newest_ticket_is_current() {
		let mut ledger = RequestLedger::default();
		let first = ledger.issue(Channel::Map);
		assert!(ledger.is_current(first));
		let second = ledger.issue(Channel::Map);
		assert!(!ledger.is_current(first));
		assert!(ledger.is_current(second));
	}

	#[test]
	fn test_channels_are_independent() {
		let mut ledger = RequestLedger::default();
		let map = ledger.issue(Channel::Map);
		let parcels = ledger.issue(Channel::Parcels);
		ledger.issue(Channel::Simulation);
		assert!(ledger.is_current(map));
		assert!(ledger.is_current(parcels));
	}

	#[test]
	fn test_detached_ticket_is_never_current() {
		let ledger = RequestLedger::default();
		assert!(!ledger.is_current(RequestTicket::detached(Channel::Map)));
	}

	#[test]
	fn test_generations_increase() {
		let mut ledger = RequestLedger::default();
		let a = ledger.issue(Channel::Agents);
		let b = ledger.issue(Channel::Agents);
		assert!(b.generation > a.generation);
	}
}
