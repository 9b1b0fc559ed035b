use {super::*, bitcoin::opcodes};

pub(crate) const PROTOCOL_ID: [u8; 3] = *b"ord";
pub(crate) const BODY_TAG: [u8; 0] = [];
pub(crate) const CONTENT_TYPE_TAG: [u8; 1] = [1];

/// One inscription compiled to its taproot leaf, carrying everything
/// later stages need to commit to it, reveal it, and sign the reveal.
///
/// Every envelope is keyed to the same internal key, so the commit
/// address is a pure function of that key and the inscription content.
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
  pub(crate) commit_address: Address,
  pub(crate) commit_script: ScriptBuf,
  pub(crate) control_block: ControlBlock,
  pub(crate) destination_script: ScriptBuf,
  pub(crate) leaf_hash: TapLeafHash,
  pub(crate) script: ScriptBuf,
}

impl Envelope {
  pub(crate) fn compile(
    secp: &Secp256k1<All>,
    entry: &InscriptionEntry,
    internal_key: XOnlyPublicKey,
    chain: Chain,
  ) -> Result<Self> {
    let destination_script = entry
      .destination
      .clone()
      .require_network(chain.network())?
      .script_pubkey();

    if entry.content_type.len() > MAX_SCRIPT_ELEMENT_SIZE {
      return Err(Error::ContentTypeTooLarge {
        bytes: entry.content_type.len(),
      });
    }

    let mut builder = script::Builder::new()
      .push_slice(internal_key.serialize())
      .push_opcode(opcodes::all::OP_CHECKSIG)
      .push_opcode(opcodes::OP_FALSE)
      .push_opcode(opcodes::all::OP_IF)
      .push_slice(PROTOCOL_ID)
      .push_slice(CONTENT_TYPE_TAG)
      .push_slice::<&PushBytes>(
        entry
          .content_type
          .as_bytes()
          .try_into()
          .expect("content type length checked above"),
      )
      .push_slice(BODY_TAG);

    for chunk in entry.body.chunks(MAX_SCRIPT_ELEMENT_SIZE) {
      builder = builder.push_slice::<&PushBytes>(chunk.try_into().unwrap());
    }

    let script = builder.push_opcode(opcodes::all::OP_ENDIF).into_script();

    let taproot_spend_info = TaprootBuilder::new()
      .add_leaf(0, script.clone())
      .expect("adding leaf should work")
      .finalize(secp, internal_key)
      .expect("finalizing taproot builder should work");

    let control_block = taproot_spend_info
      .control_block(&(script.clone(), LeafVersion::TapScript))
      .expect("should compute control block");

    let commit_address = Address::p2tr_tweaked(taproot_spend_info.output_key(), chain.network());

    Ok(Self {
      commit_script: commit_address.script_pubkey(),
      commit_address,
      control_block,
      destination_script,
      leaf_hash: TapLeafHash::from_script(&script, LeafVersion::TapScript),
      script,
    })
  }

  /// The witness a reveal input will carry, with a zeroed signature
  /// standing in so fee estimation sees the final byte count.
  pub(crate) fn placeholder_witness(&self) -> Witness {
    let mut witness = Witness::new();
    witness.push([0; SCHNORR_SIGNATURE_SIZE]);
    witness.push(&self.script);
    witness.push(self.control_block.serialize());
    witness
  }
}

#[cfg(test)]
mod tests {
  use {super::*, bitcoin::script::Instruction};

  fn compile(entry: &InscriptionEntry) -> Envelope {
    let secp = Secp256k1::new();
    let keypair = Keypair::from_secret_key(&secp, &test_key(1).inner);
    let (internal_key, _parity) = keypair.x_only_public_key();
    Envelope::compile(&secp, entry, internal_key, Chain::Testnet).unwrap()
  }

  #[test]
  fn script_matches_ordinals_encoding() {
    let secp = Secp256k1::new();
    let keypair = Keypair::from_secret_key(&secp, &test_key(1).inner);
    let (internal_key, _parity) = keypair.x_only_public_key();

    let envelope = Envelope::compile(
      &secp,
      &InscriptionEntry {
        content_type: "text/plain".into(),
        body: b"hello".to_vec(),
        destination: p2wpkh_address(2).into_unchecked(),
      },
      internal_key,
      Chain::Testnet,
    )
    .unwrap();

    let mut expected = vec![32];
    expected.extend(internal_key.serialize());
    expected.push(0xac); // OP_CHECKSIG
    expected.push(0x00); // OP_FALSE
    expected.push(0x63); // OP_IF
    expected.extend([3, b'o', b'r', b'd']);
    expected.extend([1, 1]); // content type tag
    expected.push(10);
    expected.extend(b"text/plain");
    expected.push(0x00); // body tag
    expected.push(5);
    expected.extend(b"hello");
    expected.push(0x68); // OP_ENDIF

    assert_eq!(envelope.script.as_bytes(), expected.as_slice());
  }

  #[test]
  fn body_is_chunked_at_push_limit() {
    let envelope = compile(&InscriptionEntry {
      content_type: "application/octet-stream".into(),
      body: vec![0xab; 1100],
      destination: p2wpkh_address(2).into_unchecked(),
    });

    let pushes = envelope
      .script
      .instructions()
      .flatten()
      .filter_map(|instruction| match instruction {
        Instruction::PushBytes(push) => Some(push.len()),
        Instruction::Op(_) => None,
      })
      .collect::<Vec<usize>>();

    assert_eq!(pushes, vec![32, 0, 3, 1, 24, 0, 520, 520, 60]);
  }

  #[test]
  fn control_block_is_single_leaf_sized() {
    let envelope = compile(&inscription(0));

    assert_eq!(envelope.control_block.serialize().len(), 33);
  }

  #[test]
  fn commit_address_is_deterministic_in_key_and_content() {
    let first = compile(&inscription(0));
    let second = compile(&inscription(0));
    let third = compile(&inscription(1));

    assert_eq!(first.commit_address, second.commit_address);
    assert_ne!(first.commit_address, third.commit_address);
    assert_eq!(first.commit_script, first.commit_address.script_pubkey());
  }

  #[test]
  fn placeholder_witness_has_reveal_shape() {
    let envelope = compile(&inscription(0));

    let witness = envelope.placeholder_witness();

    assert_eq!(witness.len(), 3);
    assert_eq!(witness.nth(0).unwrap().len(), 64);
    assert_eq!(witness.nth(1).unwrap(), envelope.script.as_bytes());
    assert_eq!(witness.nth(2).unwrap().len(), 33);
  }

  #[test]
  fn oversized_content_type_is_rejected() {
    let secp = Secp256k1::new();
    let keypair = Keypair::from_secret_key(&secp, &test_key(1).inner);
    let (internal_key, _parity) = keypair.x_only_public_key();

    let error = Envelope::compile(
      &secp,
      &InscriptionEntry {
        content_type: "x".repeat(521),
        body: Vec::new(),
        destination: p2wpkh_address(2).into_unchecked(),
      },
      internal_key,
      Chain::Testnet,
    )
    .unwrap_err();

    assert_regex_match!(error.to_string(), "content type of 521 bytes exceeds.*");
  }
}
