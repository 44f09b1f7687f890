use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::{Network, NetworkError, PartyId};

#[derive(Debug, Clone)]
struct Link {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

/// An in-process [`Network`] backed by unbounded channels.
///
/// Each endpoint holds one channel pair per peer. Cloning an endpoint yields a
/// handle to the same channels, so clones must not be read from concurrently.
#[derive(Debug, Clone)]
pub struct MemoryNetwork {
    id: PartyId,
    links: HashMap<PartyId, Link>,
    timeout: Option<Duration>,
    sent: Arc<AtomicUsize>,
}

impl MemoryNetwork {
    /// Creates a fully connected mesh, returning one endpoint per party in the
    /// order given.
    pub fn mesh(ids: &[PartyId]) -> Vec<Self> {
        let mut links: Vec<HashMap<PartyId, Link>> = vec![HashMap::new(); ids.len()];

        for (i, &a) in ids.iter().enumerate() {
            for (j, &b) in ids.iter().enumerate().skip(i + 1) {
                let (a_tx, b_rx) = unbounded();
                let (b_tx, a_rx) = unbounded();

                links[i].insert(b, Link { tx: a_tx, rx: a_rx });
                links[j].insert(a, Link { tx: b_tx, rx: b_rx });
            }
        }

        ids.iter()
            .zip(links)
            .map(|(&id, links)| Self::new(id, links))
            .collect()
    }

    /// Creates a connected pair of endpoints.
    pub fn pair(a: PartyId, b: PartyId) -> (Self, Self) {
        let (a_tx, b_rx) = unbounded();
        let (b_tx, a_rx) = unbounded();

        (
            Self::new(a, HashMap::from([(b, Link { tx: a_tx, rx: a_rx })])),
            Self::new(b, HashMap::from([(a, Link { tx: b_tx, rx: b_rx })])),
        )
    }

    fn new(id: PartyId, links: HashMap<PartyId, Link>) -> Self {
        Self {
            id,
            links,
            timeout: None,
            sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sets a timeout for receiving messages.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the number of messages sent from this endpoint and its clones.
    pub fn messages_sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    fn link(&self, peer: PartyId) -> Result<&Link, NetworkError> {
        self.links.get(&peer).ok_or(NetworkError::UnknownParty(peer))
    }
}

impl Network for MemoryNetwork {
    fn id(&self) -> PartyId {
        self.id
    }

    fn send(&mut self, to: PartyId, bytes: Vec<u8>) -> Result<(), NetworkError> {
        self.link(to)?
            .tx
            .send(bytes)
            .map_err(|_| NetworkError::Closed(to))?;
        self.sent.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    fn receive(&mut self, from: PartyId) -> Result<Vec<u8>, NetworkError> {
        let link = self.link(from)?;

        match self.timeout {
            Some(timeout) => link.rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => NetworkError::Timeout(timeout),
                RecvTimeoutError::Disconnected => NetworkError::Closed(from),
            }),
            None => link.rx.recv().map_err(|_| NetworkError::Closed(from)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IoExt;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const ALICE: PartyId = PartyId::new(0);
    const BOB: PartyId = PartyId::new(1);
    const CAROL: PartyId = PartyId::new(2);

    #[test]
    fn test_pair_delivers_in_order() {
        let (mut alice, mut bob) = MemoryNetwork::pair(ALICE, BOB);

        alice.send_msg(BOB, &1u32).unwrap();
        alice.send_msg(BOB, &vec![2u8, 3]).unwrap();

        assert_eq!(bob.expect_next::<u32>(ALICE).unwrap(), 1);
        assert_eq!(bob.expect_next::<Vec<u8>>(ALICE).unwrap(), vec![2, 3]);
        assert_eq!(alice.messages_sent(), 2);
        assert_eq!(bob.messages_sent(), 0);
    }

    #[test]
    fn test_mesh_routes_by_party() {
        let mut mesh = MemoryNetwork::mesh(&[ALICE, BOB, CAROL]);
        let mut carol = mesh.pop().unwrap();
        let mut bob = mesh.pop().unwrap();
        let mut alice = mesh.pop().unwrap();

        alice.send(CAROL, vec![1]).unwrap();
        bob.send(CAROL, vec![2]).unwrap();

        assert_eq!(carol.receive(BOB).unwrap(), vec![2]);
        assert_eq!(carol.receive(ALICE).unwrap(), vec![1]);
        assert_eq!(alice.id(), ALICE);
    }

    #[test]
    fn test_unknown_party() {
        let (mut alice, _bob) = MemoryNetwork::pair(ALICE, BOB);

        assert!(matches!(
            alice.send(CAROL, vec![]),
            Err(NetworkError::UnknownParty(id)) if id == CAROL
        ));
    }

    #[test]
    fn test_closed_channel() {
        let (mut alice, bob) = MemoryNetwork::pair(ALICE, BOB);
        drop(bob);

        assert!(matches!(alice.receive(BOB), Err(NetworkError::Closed(_))));
        assert!(matches!(alice.send(BOB, vec![]), Err(NetworkError::Closed(_))));
    }

    #[rstest]
    #[case::short(Duration::from_millis(1))]
    #[case::long(Duration::from_millis(20))]
    fn test_receive_timeout(#[case] timeout: Duration) {
        let (alice, _bob) = MemoryNetwork::pair(ALICE, BOB);
        let mut alice = alice.with_timeout(timeout);

        assert!(matches!(
            alice.receive(BOB),
            Err(NetworkError::Timeout(t)) if t == timeout
        ));
    }

    #[test]
    fn test_codec_error() {
        let (mut alice, mut bob) = MemoryNetwork::pair(ALICE, BOB);

        alice.send(BOB, vec![1]).unwrap();

        assert!(matches!(
            bob.expect_next::<u64>(ALICE),
            Err(NetworkError::Codec(_))
        ));
    }
}
