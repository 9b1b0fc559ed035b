//! Inscription chains are built one transaction at a time, and every
//! decision cascades.
//!
//! A chain starts with a commit transaction locking a funding output to
//! the first inscription's taproot commitment. One reveal per
//! inscription follows, each spending its predecessor's change output
//! and forwarding what remains, either to the next inscription's commit
//! address or, on the final reveal, to the caller's change address.
//! Fees are settled during assembly: the estimator sizes every
//! candidate under a plausible witness, so by the time a transaction's
//! txid is referenced by its successor, every output value is final.
//!
//! `Plan` is the external interface. Populate its fields and call
//! [`Plan::inscribe`], which drives assembly and signing and returns
//! the packaged result, collapsing any failure into an error envelope
//! instead of partial progress.

use super::*;

/// Mempool ancestor limit: one commit plus at most 24 reveals.
pub const MAX_TRANSACTIONS_PER_CHAIN: usize = 25;

pub const DEFAULT_POSTAGE: Amount = Amount::from_sat(546);

pub const DEFAULT_MIN_CHANGE: Amount = Amount::from_sat(546);

#[derive(Debug)]
pub struct Plan {
  pub aux_rand_seed: Option<[u8; 32]>,
  pub chain: Chain,
  pub change_address: Address<NetworkUnchecked>,
  pub commit_fee_rate: FeeRate,
  pub funding: Vec<FundingUtxo>,
  pub inscriptions: Vec<InscriptionEntry>,
  pub min_change: Amount,
  pub postage: Amount,
  pub reveal_fee_rate: FeeRate,
}

/// A funding output with its key and script resolved, ready to sign.
#[derive(Debug)]
pub(crate) struct Funding {
  pub(crate) address: Address,
  pub(crate) amount: Amount,
  pub(crate) key: PrivateKey,
  pub(crate) outpoint: OutPoint,
  pub(crate) script_pubkey: ScriptBuf,
}

/// One assembled transaction with its estimated fee and, for reveals,
/// the index of the inscription it publishes. Position in the chain
/// keys both records.
#[derive(Debug)]
pub(crate) struct Link {
  pub(crate) fee: Amount,
  pub(crate) inscription: Option<usize>,
  pub(crate) tx: Transaction,
}

#[derive(Debug)]
pub(crate) struct TxChain {
  pub(crate) funding: usize,
  pub(crate) links: Vec<Link>,
}

#[derive(Debug)]
pub(crate) struct Assembly {
  pub(crate) chains: Vec<TxChain>,
  pub(crate) envelopes: Vec<Envelope>,
}

/// Everything `inscribe` produces before signing.
#[derive(Debug)]
pub(crate) struct Draft {
  pub(crate) assembly: Assembly,
  pub(crate) change_address: Address,
  pub(crate) funding: Vec<Funding>,
  pub(crate) primary: Keypair,
}

impl Plan {
  /// Build, sign, and package every chain. Failures come back inside
  /// the envelope with `success` unset and the collections empty.
  pub fn inscribe(&self) -> Output {
    let secp = Secp256k1::new();

    match self.execute(&secp) {
      Ok(output) => output,
      Err(error) => {
        log::info!("inscription build failed: {error}");
        Output::failure(self.chain, &error)
      }
    }
  }

  fn execute(&self, secp: &Secp256k1<All>) -> Result<Output> {
    let mut draft = self.draft(secp)?;

    Signer::new(secp, &draft.funding, draft.primary, self.aux_rand_seed)
      .sign(&mut draft.assembly)?;

    Ok(self.package(&draft))
  }

  pub(crate) fn draft(&self, secp: &Secp256k1<All>) -> Result<Draft> {
    let funding = self.validate()?;

    let change_address = self
      .change_address
      .clone()
      .require_network(self.chain.network())?;

    let primary = Keypair::from_secret_key(secp, &funding[0].key.inner);
    let (internal_key, _parity) = primary.x_only_public_key();

    let envelopes = self
      .inscriptions
      .iter()
      .map(|entry| Envelope::compile(secp, entry, internal_key, self.chain))
      .collect::<Result<Vec<Envelope>>>()?;

    for (index, envelope) in envelopes.iter().enumerate() {
      log::debug!("inscription {index} commits to {}", envelope.commit_address);
    }

    let assembly = self.assemble(secp, &funding, envelopes, &change_address.script_pubkey())?;

    Ok(Draft {
      assembly,
      change_address,
      funding,
      primary,
    })
  }

  fn validate(&self) -> Result<Vec<Funding>> {
    if self.funding.is_empty() {
      return Err(Error::NoFunding);
    }

    if self.inscriptions.is_empty() {
      return Err(Error::NoInscriptions);
    }

    let mut funding = Vec::new();

    for (index, utxo) in self.funding.iter().enumerate() {
      if utxo.private_key.is_empty() {
        return Err(Error::MissingPrivateKey { index });
      }

      let key = PrivateKey::from_wif(&utxo.private_key)
        .map_err(|source| Error::InvalidPrivateKey { index, source })?;

      let address = utxo.address.clone().require_network(self.chain.network())?;

      funding.push(Funding {
        amount: utxo.amount,
        key,
        outpoint: utxo.outpoint(),
        script_pubkey: address.script_pubkey(),
        address,
      });
    }

    Ok(funding)
  }

  /// Sequential fill: walk the inscriptions in order, packing up to 24
  /// onto the current funding output before moving to the next. The
  /// mapping from inscription order to chain layout is therefore
  /// deterministic given deterministic inputs.
  fn assemble(
    &self,
    secp: &Secp256k1<All>,
    funding: &[Funding],
    envelopes: Vec<Envelope>,
    change_script: &ScriptBuf,
  ) -> Result<Assembly> {
    let mut chains = Vec::new();
    let mut inscription_cursor = 0;
    let mut utxo_cursor = 0;

    while inscription_cursor < envelopes.len() {
      if utxo_cursor >= funding.len() {
        return Err(Error::UtxoShortage {
          utxos: funding.len(),
          inscriptions: envelopes.len(),
        });
      }

      let take = cmp::min(
        envelopes.len() - inscription_cursor,
        MAX_TRANSACTIONS_PER_CHAIN - 1,
      );

      let chain = self.assemble_chain(
        secp,
        chains.len(),
        &funding[utxo_cursor],
        utxo_cursor,
        &envelopes,
        inscription_cursor,
        take,
        change_script,
      )?;

      log::debug!(
        "assembled chain {} with {} transactions",
        chains.len(),
        chain.links.len(),
      );

      chains.push(chain);
      inscription_cursor += take;
      utxo_cursor += 1;
    }

    Ok(Assembly { chains, envelopes })
  }

  fn assemble_chain(
    &self,
    secp: &Secp256k1<All>,
    chain_index: usize,
    funding: &Funding,
    funding_index: usize,
    envelopes: &[Envelope],
    start: usize,
    take: usize,
    final_change_script: &ScriptBuf,
  ) -> Result<TxChain> {
    assert!(take > 0, "invariant: a chain carries at least one inscription");
    assert!(
      start + take <= envelopes.len(),
      "invariant: envelope range in bounds"
    );

    let mut commit = Transaction {
      version: Version(2),
      lock_time: LockTime::ZERO,
      input: vec![TxIn {
        previous_output: funding.outpoint,
        script_sig: ScriptBuf::new(),
        sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
        witness: Witness::new(),
      }],
      output: vec![TxOut {
        value: Amount::ZERO,
        script_pubkey: envelopes[start].commit_script.clone(),
      }],
    };

    let (fee, value) = estimate_commit(secp, &commit, funding, self.commit_fee_rate)?;
    commit.output[0].value = value;

    let mut links = vec![Link {
      fee,
      inscription: None,
      tx: commit,
    }];

    let mut available = value;

    for i in 0..take {
      let inscription = start + i;
      let envelope = &envelopes[inscription];
      let is_last = i == take - 1;

      let prev = links.last().expect("invariant: chain begins with a commit");
      let prev_vout = if links.len() == 1 { 0 } else { 1 };

      let change_script = if is_last {
        final_change_script.clone()
      } else {
        envelopes[inscription + 1].commit_script.clone()
      };

      let mut reveal = Transaction {
        version: Version(2),
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
          previous_output: OutPoint {
            txid: prev.tx.compute_txid(),
            vout: prev_vout,
          },
          script_sig: ScriptBuf::new(),
          sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
          witness: Witness::new(),
        }],
        output: vec![
          TxOut {
            value: self.postage,
            script_pubkey: envelope.destination_script.clone(),
          },
          TxOut {
            value: Amount::ZERO,
            script_pubkey: change_script,
          },
        ],
      };

      let fee = match estimate_reveal(
        &reveal,
        envelope,
        self.reveal_fee_rate,
        available,
        self.postage,
        self.min_change,
      ) {
        RevealEstimate::Keep { fee, change } => {
          reveal.output[1].value = change;
          available = change;
          fee
        }
        RevealEstimate::Drop { fee } => {
          if !is_last {
            return Err(Error::PrematureChangeDrop {
              chain: chain_index,
              index: links.len(),
            });
          }

          reveal.output.truncate(1);
          available = Amount::ZERO;
          fee
        }
        RevealEstimate::Short { fee } => {
          return Err(Error::ChainBroken {
            balance: available,
            fee,
            postage: self.postage,
          });
        }
      };

      links.push(Link {
        fee,
        inscription: Some(inscription),
        tx: reveal,
      });
    }

    Ok(TxChain {
      funding: funding_index,
      links,
    })
  }

  fn package(&self, draft: &Draft) -> Output {
    let network_type = self.chain.to_string();
    let mut chains = Vec::new();
    let mut last_tx_details = Vec::new();
    let mut total = Amount::ZERO;

    for chain in &draft.assembly.chains {
      let transactions = chain
        .links
        .iter()
        .map(|link| TransactionInfo {
          txid: link.tx.compute_txid(),
          hex: consensus::encode::serialize_hex(&link.tx),
          fee: link.fee.to_sat(),
        })
        .collect::<Vec<TransactionInfo>>();

      let fee = chain.links.iter().map(|link| link.fee).sum::<Amount>();
      total += fee;

      let last = chain.links.last().expect("invariant: chain is never empty");
      let prev = &chain.links[chain.links.len() - 2];
      let prev_vout = if chain.links.len() == 2 { 0 } else { 1 };

      let envelope = last
        .inscription
        .and_then(|inscription| draft.assembly.envelopes.get(inscription))
        .expect("invariant: final link reveals an inscription");

      last_tx_details.push(LastTxInfo {
        txid: last.tx.compute_txid(),
        hex: consensus::encode::serialize_hex(&last.tx),
        fee: last.fee.to_sat(),
        input_txid: prev.tx.compute_txid(),
        input_vout: prev_vout.try_into().unwrap(),
        input_value: prev.tx.output[prev_vout].value.to_sat(),
        outputs: last
          .tx
          .output
          .iter()
          .map(|output| ScriptValue {
            pk_script: output.script_pubkey.to_hex_string(),
            value: output.value.to_sat(),
          })
          .collect(),
        signing_private_key_wif: draft.funding[0].key.to_wif(),
        change_address: draft.change_address.to_string(),
        network_type: network_type.clone(),
        postage: self.postage.to_sat(),
        min_change: self.min_change.to_sat(),
        prev_input_pk_script: envelope.commit_script.to_hex_string(),
        reveal_pk_script: envelope.destination_script.to_hex_string(),
        change_pk_script: draft.change_address.script_pubkey().to_hex_string(),
        leaf_hash: hex::encode(envelope.leaf_hash.to_byte_array()),
      });

      chains.push(ChainInfo {
        fee: fee.to_sat(),
        transactions,
      });
    }

    log::info!(
      "packaged {} chains, total fee {} sat",
      chains.len(),
      total.to_sat(),
    );

    Output {
      success: true,
      error: None,
      network_type,
      total_estimated_fee: total.to_sat(),
      chains,
      last_tx_details,
    }
  }
}
