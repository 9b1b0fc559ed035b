use super::*;

/// Source of the 32 auxiliary bytes mixed into each Schnorr signature.
/// `Seed` pins them so repeated runs produce byte-identical witnesses.
pub(crate) enum AuxRand {
  Entropy,
  Seed([u8; 32]),
}

impl AuxRand {
  fn draw(&mut self) -> [u8; 32] {
    match self {
      Self::Entropy => rand::thread_rng().gen(),
      Self::Seed(seed) => *seed,
    }
  }
}

pub(crate) struct Signer<'a> {
  aux: AuxRand,
  funding: &'a [Funding],
  primary: Keypair,
  secp: &'a Secp256k1<All>,
}

impl<'a> Signer<'a> {
  pub(crate) fn new(
    secp: &'a Secp256k1<All>,
    funding: &'a [Funding],
    primary: Keypair,
    aux_rand_seed: Option<[u8; 32]>,
  ) -> Self {
    Self {
      aux: match aux_rand_seed {
        Some(seed) => AuxRand::Seed(seed),
        None => AuxRand::Entropy,
      },
      funding,
      primary,
      secp,
    }
  }

  /// Sign every input of every assembled chain: the funding input of
  /// each commit by its address's scheme, and each reveal by script
  /// path with the untweaked primary key.
  pub(crate) fn sign(&mut self, assembly: &mut Assembly) -> Result<()> {
    let Assembly { envelopes, chains } = assembly;

    for (chain_index, chain) in chains.iter_mut().enumerate() {
      let funding = &self.funding[chain.funding];
      let aux = self.aux.draw();
      sign_funding_input(self.secp, &mut chain.links[0].tx, funding, &aux)?;

      for index in 1..chain.links.len() {
        let prev_vout = if index == 1 { 0 } else { 1 };
        let prevout = chain.links[index - 1].tx.output[prev_vout].clone();

        let link = &mut chain.links[index];

        let envelope = link
          .inscription
          .and_then(|inscription| envelopes.get(inscription))
          .ok_or(Error::MissingContext {
            chain: chain_index,
            index,
          })?;

        if envelope.commit_script != prevout.script_pubkey {
          return Err(Error::ScriptMismatch {
            chain: chain_index,
            index,
          });
        }

        let mut sighash_cache = SighashCache::new(&link.tx);

        let sighash = sighash_cache
          .taproot_script_spend_signature_hash(
            0,
            &Prevouts::All(&[prevout]),
            envelope.leaf_hash,
            TapSighashType::Default,
          )
          .expect("signature hash should compute");

        let aux = self.aux.draw();
        let signature = self.secp.sign_schnorr_with_aux_rand(
          &Message::from_digest(sighash.to_byte_array()),
          &self.primary,
          &aux,
        );

        let mut witness = Witness::new();
        witness.push(
          taproot::Signature {
            signature,
            sighash_type: TapSighashType::Default,
          }
          .to_vec(),
        );
        witness.push(&envelope.script);
        witness.push(envelope.control_block.serialize());

        link.tx.input[0].witness = witness;
      }
    }

    Ok(())
  }
}

/// Sign a transaction's single funding input in place, dispatching on
/// the funding address's script form. Also used by the estimator to
/// dry-run a realistic signature onto a sizing clone.
pub(crate) fn sign_funding_input(
  secp: &Secp256k1<All>,
  tx: &mut Transaction,
  funding: &Funding,
  aux_rand: &[u8; 32],
) -> Result<()> {
  let key = &funding.key;
  let script_pubkey = &funding.script_pubkey;

  if script_pubkey.is_p2pkh() {
    let sighash = SighashCache::new(&*tx)
      .legacy_signature_hash(0, script_pubkey, EcdsaSighashType::All.to_u32())
      .expect("signature hash should compute");

    let signature = ecdsa::Signature {
      signature: secp.sign_ecdsa(&Message::from_digest(sighash.to_byte_array()), &key.inner),
      sighash_type: EcdsaSighashType::All,
    };

    tx.input[0].script_sig = script::Builder::new()
      .push_slice(PushBytesBuf::try_from(signature.to_vec()).expect("signature fits in a push"))
      .push_slice(
        PushBytesBuf::try_from(key.public_key(secp).to_bytes()).expect("public key fits in a push"),
      )
      .into_script();
  } else if script_pubkey.is_p2wpkh() {
    let sighash = SighashCache::new(&*tx)
      .p2wpkh_signature_hash(0, script_pubkey, funding.amount, EcdsaSighashType::All)
      .expect("signature hash should compute");

    let signature = ecdsa::Signature {
      signature: secp.sign_ecdsa(&Message::from_digest(sighash.to_byte_array()), &key.inner),
      sighash_type: EcdsaSighashType::All,
    };

    tx.input[0].witness = Witness::p2wpkh(&signature, &key.public_key(secp).inner);
  } else if script_pubkey.is_p2sh() {
    // The only nested form accepted for funding is p2sh-wrapped p2wpkh.
    if !key.compressed {
      return Err(Error::UnsupportedAddress {
        address: funding.address.clone(),
      });
    }

    let public_key = CompressedPublicKey::from_private_key(secp, key).expect("key is compressed");
    let redeem_script = ScriptBuf::new_p2wpkh(&public_key.wpubkey_hash());

    let sighash = SighashCache::new(&*tx)
      .p2wpkh_signature_hash(0, &redeem_script, funding.amount, EcdsaSighashType::All)
      .expect("signature hash should compute");

    let signature = ecdsa::Signature {
      signature: secp.sign_ecdsa(&Message::from_digest(sighash.to_byte_array()), &key.inner),
      sighash_type: EcdsaSighashType::All,
    };

    tx.input[0].script_sig = script::Builder::new()
      .push_slice(
        PushBytesBuf::try_from(redeem_script.into_bytes()).expect("redeem script fits in a push"),
      )
      .into_script();
    tx.input[0].witness = Witness::p2wpkh(&signature, &public_key.0);
  } else if script_pubkey.is_p2tr() {
    let keypair = Keypair::from_secret_key(secp, &key.inner);
    let tweaked = keypair.tap_tweak(secp, None);

    let prevouts = [TxOut {
      value: funding.amount,
      script_pubkey: script_pubkey.clone(),
    }];

    let sighash = SighashCache::new(&*tx)
      .taproot_key_spend_signature_hash(0, &Prevouts::All(&prevouts), TapSighashType::Default)
      .expect("signature hash should compute");

    let signature = secp.sign_schnorr_with_aux_rand(
      &Message::from_digest(sighash.to_byte_array()),
      &tweaked.to_inner(),
      aux_rand,
    );

    tx.input[0].witness = Witness::p2tr_key_spend(&taproot::Signature {
      signature,
      sighash_type: TapSighashType::Default,
    });
  } else {
    return Err(Error::UnsupportedAddress {
      address: funding.address.clone(),
    });
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use {super::*, bitcoin::NetworkKind};

  fn spend(funding: &Funding) -> Transaction {
    Transaction {
      version: Version(2),
      lock_time: LockTime::ZERO,
      input: vec![TxIn {
        previous_output: funding.outpoint,
        script_sig: ScriptBuf::new(),
        sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
        witness: Witness::new(),
      }],
      output: vec![TxOut {
        value: Amount::from_sat(1_000),
        script_pubkey: p2wpkh_address(9).script_pubkey(),
      }],
    }
  }

  fn funding_for(address: Address) -> Funding {
    Funding {
      address: address.clone(),
      amount: Amount::from_sat(10_000),
      key: test_key(1),
      outpoint: OutPoint {
        txid: test_txid(9),
        vout: 0,
      },
      script_pubkey: address.script_pubkey(),
    }
  }

  #[test]
  fn p2pkh_funding_is_signed_in_script_sig() {
    let secp = Secp256k1::new();
    let funding = funding_for(Address::p2pkh(
      test_key(1).public_key(&secp),
      NetworkKind::Test,
    ));

    let mut tx = spend(&funding);
    sign_funding_input(&secp, &mut tx, &funding, &[0; 32]).unwrap();

    assert!(tx.input[0].witness.is_empty());
    // signature push + 33 byte public key push
    assert!(tx.input[0].script_sig.len() >= 100);
  }

  #[test]
  fn p2wpkh_funding_is_signed_in_witness() {
    let secp = Secp256k1::new();
    let funding = funding_for(p2wpkh_address(1));

    let mut tx = spend(&funding);
    sign_funding_input(&secp, &mut tx, &funding, &[0; 32]).unwrap();

    assert!(tx.input[0].script_sig.is_empty());
    assert_eq!(tx.input[0].witness.len(), 2);
    assert_eq!(tx.input[0].witness.nth(1).unwrap().len(), 33);
  }

  #[test]
  fn nested_segwit_funding_carries_redeem_script() {
    let secp = Secp256k1::new();
    let public_key = CompressedPublicKey::from_private_key(&secp, &test_key(1)).unwrap();
    let funding = funding_for(Address::p2shwpkh(&public_key, NetworkKind::Test));

    let mut tx = spend(&funding);
    sign_funding_input(&secp, &mut tx, &funding, &[0; 32]).unwrap();

    // one push of the 22 byte p2wpkh redeem script
    assert_eq!(tx.input[0].script_sig.len(), 23);
    assert_eq!(tx.input[0].witness.len(), 2);
  }

  #[test]
  fn taproot_funding_is_signed_by_key_path() {
    let secp = Secp256k1::new();
    let keypair = Keypair::from_secret_key(&secp, &test_key(1).inner);
    let (internal_key, _parity) = keypair.x_only_public_key();
    let funding = funding_for(Address::p2tr(&secp, internal_key, None, Network::Testnet));

    let mut tx = spend(&funding);
    sign_funding_input(&secp, &mut tx, &funding, &[7; 32]).unwrap();

    assert!(tx.input[0].script_sig.is_empty());
    assert_eq!(tx.input[0].witness.len(), 1);
    assert_eq!(tx.input[0].witness.nth(0).unwrap().len(), 64);
  }

  #[test]
  fn other_script_forms_are_rejected() {
    let secp = Secp256k1::new();
    let funding = funding_for(Address::p2wsh(&ScriptBuf::new(), Network::Testnet));

    let mut tx = spend(&funding);

    let error = sign_funding_input(&secp, &mut tx, &funding, &[0; 32]).unwrap_err();

    assert_regex_match!(error.to_string(), "unsupported funding address type.*");
  }
}
