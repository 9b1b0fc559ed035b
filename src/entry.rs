use super::*;

/// A funding output seeding one chain. The private key is the WIF
/// encoding of the key that can spend `address`; watch-only entries are
/// rejected at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingUtxo {
  pub txid: Txid,
  pub vout: u32,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub amount: Amount,
  pub address: Address<NetworkUnchecked>,
  pub private_key: String,
}

impl FundingUtxo {
  pub(crate) fn outpoint(&self) -> OutPoint {
    OutPoint {
      txid: self.txid,
      vout: self.vout,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InscriptionEntry {
  pub content_type: String,
  pub body: Vec<u8>,
  pub destination: Address<NetworkUnchecked>,
}
