#![allow(clippy::too_many_arguments)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::{
    envelope::Envelope,
    estimator::{estimate_commit, estimate_reveal, RevealEstimate},
    plan::{Assembly, Funding},
    signer::{sign_funding_input, Signer},
  },
  bitcoin::{
    absolute::LockTime,
    address::NetworkUnchecked,
    consensus,
    constants::MAX_SCRIPT_ELEMENT_SIZE,
    ecdsa,
    hashes::Hash,
    key::{Keypair, TapTweak},
    script::{self, PushBytes, PushBytesBuf},
    secp256k1::{
      constants::SCHNORR_SIGNATURE_SIZE,
      rand::{self, Rng},
      All, Message, Secp256k1,
    },
    sighash::{EcdsaSighashType, Prevouts, SighashCache, TapSighashType},
    taproot::{self, ControlBlock, LeafVersion, TapLeafHash, TaprootBuilder},
    transaction::Version,
    Address, Amount, CompressedPublicKey, Network, OutPoint, PrivateKey, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Txid, Witness, XOnlyPublicKey,
  },
  serde::{Deserialize, Serialize},
  std::{
    cmp,
    fmt::{self, Display, Formatter},
    str::FromStr,
  },
};

pub use self::{
  chain::Chain,
  entry::{FundingUtxo, InscriptionEntry},
  error::{Error, Result},
  fee_rate::FeeRate,
  output::{ChainInfo, LastTxInfo, Output, ScriptValue, TransactionInfo},
  plan::{Plan, DEFAULT_MIN_CHANGE, DEFAULT_POSTAGE, MAX_TRANSACTIONS_PER_CHAIN},
};


#[cfg(test)]
use self::test::*;

mod chain;
mod entry;
mod envelope;
mod error;
mod estimator;
mod fee_rate;
mod output;
mod plan;
mod signer;
