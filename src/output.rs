use super::*;

/// Result envelope for a whole build. Failures land here too, with
/// `success` unset, the message in `error`, and every collection empty;
/// partially built chains are never exposed.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
  pub success: bool,
  pub error: Option<String>,
  pub network_type: String,
  pub total_estimated_fee: u64,
  pub chains: Vec<ChainInfo>,
  pub last_tx_details: Vec<LastTxInfo>,
}

impl Output {
  pub(crate) fn failure(chain: Chain, error: &Error) -> Self {
    Self {
      success: false,
      error: Some(error.to_string()),
      network_type: chain.to_string(),
      total_estimated_fee: 0,
      chains: Vec::new(),
      last_tx_details: Vec::new(),
    }
  }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
  pub fee: u64,
  pub transactions: Vec<TransactionInfo>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
  pub txid: Txid,
  pub hex: String,
  pub fee: u64,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptValue {
  pub pk_script: String,
  pub value: u64,
}

/// Everything an external fee-bump module needs to rebuild and re-sign
/// a chain's final reveal without re-deriving the plan.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTxInfo {
  pub txid: Txid,
  pub hex: String,
  pub fee: u64,
  pub input_txid: Txid,
  pub input_vout: u32,
  pub input_value: u64,
  pub outputs: Vec<ScriptValue>,
  pub signing_private_key_wif: String,
  pub change_address: String,
  pub network_type: String,
  pub postage: u64,
  pub min_change: u64,
  pub prev_input_pk_script: String,
  pub reveal_pk_script: String,
  pub change_pk_script: String,
  pub leaf_hash: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failure_envelope_is_empty() {
    let output = Output::failure(
      Chain::Testnet,
      &Error::UtxoShortage {
        utxos: 1,
        inscriptions: 30,
      },
    );

    assert!(!output.success);
    assert_eq!(output.network_type, "testnet");
    assert_eq!(output.total_estimated_fee, 0);
    assert!(output.chains.is_empty());
    assert!(output.last_tx_details.is_empty());
    assert_regex_match!(output.error.unwrap(), "UTXO count 1 insufficient.*");
  }

  #[test]
  fn output_serde_round_trips() {
    let output = plan(vec![funding(1, 50_000, 10)], 2).inscribe();

    assert!(output.success, "{:?}", output.error);

    let json = serde_json::to_string(&output).unwrap();

    assert_eq!(serde_json::from_str::<Output>(&json).unwrap(), output);
  }
}
