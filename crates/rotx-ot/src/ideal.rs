//! Ideal random OT roles, for testing.
//!
//! The roles draw their seeds from the ideal ROT functionality instead of running a
//! protocol. Faults of every kind the networked roles can produce can be injected at
//! a chosen stage.

use rotx_cointoss::{CointossError, CoreError};
use rotx_core::{commit::CommitmentError, BitVector, Block};
use rotx_ot_core::{ideal::rot::IdealROT, ROTReceiverOutput, ROTSenderOutput};

use crate::{ExtensionError, RoleState, RotReceiver, RotSender, SeedPairs, SeedSourceError};

/// Returns an ideal random OT sender and receiver.
///
/// Roles created with the same seed are correlated, so each party of a test can hold
/// its own copy.
pub fn ideal_rot(seed: Block) -> (IdealRotSender, IdealRotReceiver) {
    (
        IdealRotSender(IdealRole::new(seed)),
        IdealRotReceiver(IdealRole::new(seed)),
    )
}

/// The stage at which an injected fault fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// During the one-time setup.
    Initialize,
    /// During every extension.
    Extend,
}

/// A fault injected into an ideal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The extension detects a cheating peer.
    MaliciousExtension,
    /// The extension fails without evidence of cheating.
    FailedExtension,
    /// A commitment opening does not match.
    MaliciousCommitment,
    /// A commitment can not be computed.
    FailedCommitment,
    /// A coin toss fails.
    FailedCointoss,
}

impl Fault {
    fn into_error(self) -> SeedSourceError {
        match self {
            Fault::MaliciousExtension => SeedSourceError::Extension(ExtensionError::malicious(
                "injected malicious extension",
            )),
            Fault::FailedExtension => {
                SeedSourceError::Extension(ExtensionError::failed("injected extension failure"))
            }
            Fault::MaliciousCommitment => {
                SeedSourceError::Commitment(CommitmentError::malicious("injected opening mismatch"))
            }
            Fault::FailedCommitment => {
                SeedSourceError::Commitment(CommitmentError::failed("injected encoding failure"))
            }
            Fault::FailedCointoss => {
                SeedSourceError::Cointoss(CointossError::Core(CoreError::CountMismatch {
                    expected: 1,
                    actual: 0,
                }))
            }
        }
    }
}

#[derive(Debug)]
struct IdealRole {
    rot: IdealROT,
    state: RoleState,
    initializations: usize,
    fault: Option<(Stage, Fault)>,
}

impl IdealRole {
    fn new(seed: Block) -> Self {
        Self {
            rot: IdealROT::new(seed),
            state: RoleState::Uninitialized,
            initializations: 0,
            fault: None,
        }
    }

    fn fail_at(&self, stage: Stage) -> Result<(), SeedSourceError> {
        match self.fault {
            Some((at, fault)) if at == stage => Err(fault.into_error()),
            _ => Ok(()),
        }
    }

    fn initialize(&mut self) -> Result<(), SeedSourceError> {
        if self.state == RoleState::Initialized {
            return Ok(());
        }

        self.fail_at(Stage::Initialize)?;
        self.initializations += 1;
        self.state = RoleState::Initialized;

        Ok(())
    }

    fn check_extend(&self) -> Result<(), SeedSourceError> {
        if self.state == RoleState::Uninitialized {
            return Err(ExtensionError::state("an initialized role").into());
        }

        self.fail_at(Stage::Extend)
    }
}

/// Ideal random OT sender.
#[derive(Debug)]
pub struct IdealRotSender(IdealRole);

impl IdealRotSender {
    /// Makes the role fail with `fault` at `stage`.
    pub fn with_fault(mut self, stage: Stage, fault: Fault) -> Self {
        self.0.fault = Some((stage, fault));
        self
    }

    /// Returns how many times the one-time setup ran.
    pub fn initializations(&self) -> usize {
        self.0.initializations
    }
}

impl RotSender for IdealRotSender {
    fn state(&self) -> RoleState {
        self.0.state
    }

    fn initialize(&mut self) -> Result<(), SeedSourceError> {
        self.0.initialize()
    }

    fn extend(&mut self, count: usize) -> Result<SeedPairs, SeedSourceError> {
        if count == 0 {
            return Ok(SeedPairs::default());
        }

        self.0.check_extend()?;

        let ROTSenderOutput { msgs, .. } = self.0.rot.send_random::<Block>(count);
        let (zero, one) = msgs
            .into_iter()
            .map(|[zero, one]| (BitVector::from(zero), BitVector::from(one)))
            .unzip();

        Ok(SeedPairs { zero, one })
    }
}

/// Ideal random OT receiver.
#[derive(Debug)]
pub struct IdealRotReceiver(IdealRole);

impl IdealRotReceiver {
    /// Makes the role fail with `fault` at `stage`.
    pub fn with_fault(mut self, stage: Stage, fault: Fault) -> Self {
        self.0.fault = Some((stage, fault));
        self
    }

    /// Returns how many times the one-time setup ran.
    pub fn initializations(&self) -> usize {
        self.0.initializations
    }
}

impl RotReceiver for IdealRotReceiver {
    fn state(&self) -> RoleState {
        self.0.state
    }

    fn initialize(&mut self) -> Result<(), SeedSourceError> {
        self.0.initialize()
    }

    fn extend(&mut self, choices: &BitVector) -> Result<Vec<BitVector>, SeedSourceError> {
        if choices.is_empty() {
            return Ok(Vec::new());
        }

        self.0.check_extend()?;

        let (_, ROTReceiverOutput { msgs, .. }) =
            self.0.rot.random_with_choices::<Block>(choices.to_bools());

        Ok(msgs.into_iter().map(BitVector::from).collect())
    }
}
