use super::*;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
  ChainBroken {
    balance: Amount,
    fee: Amount,
    postage: Amount,
  },
  CommitShortfall {
    value: Amount,
    fee: Amount,
  },
  ContentTypeTooLarge {
    bytes: usize,
  },
  InvalidAddress(bitcoin::address::ParseError),
  InvalidChain {
    chain: String,
  },
  InvalidFeeRate {
    value: String,
  },
  InvalidPrivateKey {
    index: usize,
    source: bitcoin::key::FromWifError,
  },
  MissingContext {
    chain: usize,
    index: usize,
  },
  MissingPrivateKey {
    index: usize,
  },
  NoFunding,
  NoInscriptions,
  PrematureChangeDrop {
    chain: usize,
    index: usize,
  },
  ScriptMismatch {
    chain: usize,
    index: usize,
  },
  UnsupportedAddress {
    address: Address,
  },
  UtxoShortage {
    utxos: usize,
    inscriptions: usize,
  },
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::ChainBroken {
        balance,
        fee,
        postage,
      } => write!(
        f,
        "chain broken: balance {} sat cannot cover reveal fee {} sat + postage {} sat",
        balance.to_sat(),
        fee.to_sat(),
        postage.to_sat(),
      ),
      Self::CommitShortfall { value, fee } => write!(
        f,
        "funding value {} sat cannot cover commit fee {} sat",
        value.to_sat(),
        fee.to_sat(),
      ),
      Self::ContentTypeTooLarge { bytes } => write!(
        f,
        "content type of {bytes} bytes exceeds {MAX_SCRIPT_ELEMENT_SIZE} byte push limit"
      ),
      Self::InvalidAddress(source) => write!(f, "invalid address: {source}"),
      Self::InvalidChain { chain } => write!(f, "invalid chain `{chain}`"),
      Self::InvalidFeeRate { value } => write!(f, "invalid fee rate `{value}`"),
      Self::InvalidPrivateKey { index, source } => {
        write!(f, "invalid private key for funding output {index}: {source}")
      }
      Self::MissingContext { chain, index } => write!(
        f,
        "no inscription context for chain {chain} transaction {index}"
      ),
      Self::MissingPrivateKey { index } => {
        write!(f, "funding output {index} is missing its private key")
      }
      Self::NoFunding => write!(f, "funding output list is empty"),
      Self::NoInscriptions => write!(f, "inscription list is empty"),
      Self::PrematureChangeDrop { chain, index } => write!(
        f,
        "non-final reveal must carry change (chain {chain}, transaction {index})"
      ),
      Self::ScriptMismatch { chain, index } => write!(
        f,
        "commit script mismatch between chain {chain} transaction {index} and its inscription"
      ),
      Self::UnsupportedAddress { address } => {
        write!(f, "unsupported funding address type: {address}")
      }
      Self::UtxoShortage {
        utxos,
        inscriptions,
      } => write!(
        f,
        "UTXO count {utxos} insufficient for {inscriptions} inscriptions"
      ),
    }
  }
}

impl std::error::Error for Error {}

impl From<bitcoin::address::ParseError> for Error {
  fn from(source: bitcoin::address::ParseError) -> Self {
    Self::InvalidAddress(source)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn utxo_shortage_names_both_counts() {
    assert_eq!(
      Error::UtxoShortage {
        utxos: 1,
        inscriptions: 30
      }
      .to_string(),
      "UTXO count 1 insufficient for 30 inscriptions"
    );
  }

  #[test]
  fn chain_broken_names_the_balance() {
    assert_eq!(
      Error::ChainBroken {
        balance: Amount::from_sat(756),
        fee: Amount::from_sat(350),
        postage: Amount::from_sat(546),
      }
      .to_string(),
      "chain broken: balance 756 sat cannot cover reveal fee 350 sat + postage 546 sat"
    );
  }

  #[test]
  fn premature_change_drop_is_explicit() {
    assert_regex_match!(
      Error::PrematureChangeDrop { chain: 0, index: 3 }.to_string(),
      "non-final reveal must carry change.*"
    );
  }
}
