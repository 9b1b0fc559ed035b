use super::*;

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
  #[default]
  Mainnet,
  Testnet,
}

impl Chain {
  pub(crate) fn network(self) -> Network {
    self.into()
  }
}

impl From<Chain> for Network {
  fn from(chain: Chain) -> Network {
    match chain {
      Chain::Mainnet => Network::Bitcoin,
      Chain::Testnet => Network::Testnet,
    }
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Mainnet => "mainnet",
        Self::Testnet => "testnet",
      }
    )
  }
}

impl FromStr for Chain {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "mainnet" => Ok(Self::Mainnet),
      "testnet" => Ok(Self::Testnet),
      _ => Err(Error::InvalidChain {
        chain: s.to_string(),
      }),
    }
  }
}
