use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rotx_common::{MemoryNetwork, Network, NetworkError, PartyId};
use rotx_ot::{
    kos::{self, Rot},
    BatchRot, BitVector, OTError, RoleState, RotConfig, RotReceiver, RotSender,
};
use rotx_ot_core::kos::msgs::Extend;
use rstest::*;
use tracing_subscriber::EnvFilter;

const ALICE: PartyId = PartyId::new(0);
const BOB: PartyId = PartyId::new(1);

type KosBatch<N> = BatchRot<kos::Sender<N>, kos::Receiver<N>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn batch<N: Network + Clone>(me: PartyId, peer: PartyId, seed: u64, net: N) -> KosBatch<N> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    BatchRot::from_network(me, peer, 128, 40, &mut rng, net).unwrap()
}

fn choices(count: usize) -> BitVector {
    let mut rng = ChaCha12Rng::seed_from_u64(42);
    BitVector::random(&mut rng, count)
}

/// Flips every byte of the extension matrix in the `target`-th message it sends.
#[derive(Debug, Clone)]
struct TamperingNetwork {
    inner: MemoryNetwork,
    sent: Arc<AtomicUsize>,
    target: usize,
}

impl Network for TamperingNetwork {
    fn id(&self) -> PartyId {
        self.inner.id()
    }

    fn send(&mut self, to: PartyId, bytes: Vec<u8>) -> Result<(), NetworkError> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        if n != self.target {
            return self.inner.send(to, bytes);
        }

        let mut extend: Extend = bincode::deserialize(&bytes).unwrap();
        extend.us.iter_mut().for_each(|u| *u = !*u);
        self.inner.send(to, bincode::serialize(&extend).unwrap())
    }

    fn receive(&mut self, from: PartyId) -> Result<Vec<u8>, NetworkError> {
        self.inner.receive(from)
    }
}

#[rstest]
#[case::single(1, 1)]
#[case::bytes(100, 8)]
#[case::seed_sized(256, 128)]
#[case::long(10, 1000)]
fn test_batch_rot_kos(#[case] count: usize, #[case] len: usize) {
    init_tracing();

    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(ALICE, BOB, 0, alice_net);
    let mut bob = batch(BOB, ALICE, 1, bob_net);
    let choices = choices(count);

    let sender = thread::spawn(move || alice.send(count, len).unwrap());
    let received = bob.receive(&choices, len).unwrap();
    let pairs = sender.join().unwrap();

    assert_eq!(pairs.len(), count);
    assert_eq!(received.len(), count);
    for ((pair, msg), choice) in pairs.iter().zip(&received).zip(choices.iter()) {
        assert_eq!(pair.zero.len(), len);
        assert_eq!(pair.one.len(), len);
        if len >= 64 {
            assert_ne!(pair.zero, pair.one);
        }
        assert_eq!(msg, pair.get(choice));
    }
}

#[test]
fn test_batch_rot_kos_both_directions() {
    init_tracing();

    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(ALICE, BOB, 0, alice_net);
    let mut bob = batch(BOB, ALICE, 1, bob_net);
    let alice_choices = choices(50);

    let handle = thread::spawn(move || {
        let pairs = alice.send(30, 64).unwrap();
        let received = alice.receive(&alice_choices, 16).unwrap();
        (pairs, received, alice_choices)
    });

    let bob_choices = choices(30);
    let bob_received = bob.receive(&bob_choices, 64).unwrap();
    let bob_pairs = bob.send(50, 16).unwrap();

    let (alice_pairs, alice_received, alice_choices) = handle.join().unwrap();

    for ((pair, msg), choice) in alice_pairs.iter().zip(&bob_received).zip(bob_choices.iter()) {
        assert_eq!(msg, pair.get(choice));
    }
    for ((pair, msg), choice) in bob_pairs.iter().zip(&alice_received).zip(alice_choices.iter()) {
        assert_eq!(msg, pair.get(choice));
    }
}

#[test]
fn test_batch_rot_kos_initializes_once() {
    init_tracing();

    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(ALICE, BOB, 0, alice_net);
    let mut bob = batch(BOB, ALICE, 1, bob_net);
    let choices = choices(16);

    let sender = thread::spawn(move || {
        let first = alice.send(16, 32).unwrap();
        let second = alice.send(16, 32).unwrap();
        (first, second)
    });

    let first = bob.receive(&choices, 32).unwrap();
    let after_first = bob.receiver().network().messages_sent();
    assert_eq!(bob.receiver().state(), RoleState::Initialized);

    let second = bob.receive(&choices, 32).unwrap();
    let after_second = bob.receiver().network().messages_sent();

    let (sent_first, sent_second) = sender.join().unwrap();

    // Base OT and session coin toss, then one extension.
    assert_eq!(after_first, 3 + 4);
    // The second batch only extends.
    assert_eq!(after_second - after_first, 4);

    assert_ne!(sent_first, sent_second);
    for (i, choice) in choices.iter().enumerate() {
        assert_eq!(&first[i], sent_first[i].get(choice));
        assert_eq!(&second[i], sent_second[i].get(choice));
    }
}

#[test]
fn test_batch_rot_kos_empty_batch_sends_nothing() {
    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(ALICE, BOB, 0, alice_net);
    let mut bob = batch(BOB, ALICE, 1, bob_net);

    assert!(alice.send(0, 32).unwrap().is_empty());
    assert!(bob.receive(&BitVector::zeros(0), 32).unwrap().is_empty());

    assert_eq!(alice.sender().state(), RoleState::Uninitialized);
    assert_eq!(alice.sender().network().messages_sent(), 0);
    assert_eq!(bob.receiver().network().messages_sent(), 0);
}

#[test]
fn test_batch_rot_kos_tampered_extension() {
    init_tracing();

    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(ALICE, BOB, 0, alice_net);
    // Base OT setup, base OT payload, coin-toss seeds, then the extension matrix.
    let bob_net = TamperingNetwork {
        inner: bob_net,
        sent: Arc::new(AtomicUsize::new(0)),
        target: 4,
    };
    let mut bob = batch(BOB, ALICE, 1, bob_net);

    let sender = thread::spawn(move || alice.send(64, 32));
    bob.receive(&choices(64), 32).unwrap();
    let err = sender.join().unwrap().unwrap_err();

    assert!(matches!(err, OTError::MaliciousBehavior(_)), "{err}");
}

#[test]
fn test_batch_rot_kos_timeout() {
    let (alice_net, _bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(
        ALICE,
        BOB,
        0,
        alice_net.with_timeout(Duration::from_millis(50)),
    );

    let err = alice.send(8, 32).unwrap_err();

    assert!(matches!(err, OTError::OperationFailed(_)), "{err}");
}

#[test]
fn test_batch_rot_kos_peer_gone() {
    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(ALICE, BOB, 0, alice_net);
    drop(bob_net);

    let err = alice.send(8, 32).unwrap_err();

    assert!(matches!(err, OTError::OperationFailed(_)));
    // The failed setup is not retried.
    assert!(matches!(
        alice.send(8, 32).unwrap_err(),
        OTError::OperationFailed(_)
    ));
}

#[test]
fn test_batch_rot_kos_failed_extension_stays_initialized() {
    init_tracing();

    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut alice = batch(ALICE, BOB, 0, alice_net);
    let mut bob = batch(BOB, ALICE, 1, bob_net);

    let sender = thread::spawn(move || {
        alice.send(8, 32).unwrap();
        alice
    });
    bob.receive(&choices(8), 32).unwrap();
    let mut alice = sender.join().unwrap();
    drop(bob);

    let err = alice.send(8, 32).unwrap_err();

    assert!(matches!(err, OTError::OperationFailed(_)), "{err}");
    assert_eq!(alice.sender().state(), RoleState::Initialized);
    // The role is not set up again.
    assert!(matches!(
        alice.send(8, 32).unwrap_err(),
        OTError::OperationFailed(_)
    ));
}

#[rstest]
#[case::zero(0)]
#[case::above_computational(129)]
#[case::overflowing(usize::MAX)]
fn test_batch_rot_rejects_statistical_security(#[case] lambda: usize) {
    let (alice_net, _bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut rng = ChaCha12Rng::seed_from_u64(0);

    let err = KosBatch::from_network(ALICE, BOB, 128, lambda, &mut rng, alice_net).unwrap_err();

    assert!(matches!(err, OTError::OperationFailed(_)), "{err}");
}

#[test]
fn test_batch_rot_from_rot() {
    let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let config = RotConfig::builder().statistical_security(80).build().unwrap();

    let alice = Rot::new(ALICE, BOB, config.clone(), &mut rng, alice_net).unwrap();
    let bob = Rot::new(BOB, ALICE, config, &mut rng, bob_net).unwrap();
    assert_eq!(bob.receiver().peer(), ALICE);

    let mut alice = BatchRot::from_rot(alice);
    let mut bob = BatchRot::from_rot(bob);
    let choices = choices(20);

    let sender = thread::spawn(move || alice.send(20, 200).unwrap());
    let received = bob.receive(&choices, 200).unwrap();
    let pairs = sender.join().unwrap();

    for ((pair, msg), choice) in pairs.iter().zip(&received).zip(choices.iter()) {
        assert_eq!(msg, pair.get(choice));
    }
}
