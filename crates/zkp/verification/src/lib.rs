//! Verifiable computation attestation.
//!
//! The pipeline commits to a computation's input, builds a [`Proof`] binding
//! that commitment to the output, verifies it, and hands out an
//! [`Attestation`] that names the computation without exposing its data.
//! Every stage is written to the audit [`Ledger`](audit_ledger::Ledger).
//!
//! The primitives are integrity checks, not a zero-knowledge scheme:
//!
//! - commitments store their nonce next to the value, so they bind but do not hide
//! - range proofs carry three digests per numeric field and encode no bound
//! - the signature is an unkeyed digest of the proof's public fields
//!
//! ```text
//! CommitmentStore ──► ProofEngine ──► VerificationEngine
//!        ▲                                   │
//!        └──────── AttestationCoordinator ◄──┘
//! ```

#![deny(unsafe_code)]

mod attestation;
mod commitment;
mod config;
mod error;
pub mod merkle;
mod proof;
pub mod range;
mod verify;

pub use attestation::{
    Attestation, AttestationCoordinator, AttestedComputation, ComputationDescriptor, OutputSummary,
};
pub use commitment::{Commitment, CommitmentMetadata, CommitmentReceipt, CommitmentStore};
pub use config::ZkpConfig;
pub use error::{ZkpError, ZkpResult};
pub use merkle::merkle_root;
pub use proof::{
    sign, ComputationRequest, ComputationStep, ComputationSteps, ExportedProof, Proof,
    ProofComponents, ProofEngine, ProofMetadata, ProofReceipt, ProofType, PublicInputs,
    VerificationStatus, WitnessCommitment,
};
pub use range::RangeProof;
pub use verify::{VerificationChecks, VerificationEngine, VerificationResult};
