//! # Account Formatting
//!
//! Derivation yields raw bytes; how they are shown to an operator is a
//! separate, swappable stage. [`Ss58Format`] produces the checksummed base58
//! addresses wallets and explorers use; [`HexFormat`] the `0x`-prefixed hex
//! that storage keys and logs use.
//!
//! ## SS58 layout
//!
//! ```text
//! base58( prefix[1 or 2] ++ account[32] ++ blake2b_512("SS58PRE" ++ prefix ++ account)[..2] )
//! ```
//!
//! Prefixes below 64 take one byte. Prefixes 64..=16383 take two, with the
//! bit interleaving used by every SS58 implementation. Larger prefixes are
//! rejected at construction.

use blake2::{Blake2b512, Digest};
use xcb_core::{SovereignAccount, MAX_SS58_PREFIX};

use crate::error::DeriveError;

const SS58_PREFIX: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;

/// Generic Substrate prefix.
pub const DEFAULT_SS58_PREFIX: u16 = 42;

/// A reversible textual rendering of an account.
pub trait AccountFormat: Send + Sync {
    /// Short name for logs and CLI output.
    fn name(&self) -> &'static str;

    fn encode(&self, account: &SovereignAccount) -> String;

    fn decode(&self, address: &str) -> Result<SovereignAccount, DeriveError>;
}

/// SS58 with a fixed network prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ss58Format {
    prefix: u16,
}

impl Default for Ss58Format {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_SS58_PREFIX,
        }
    }
}

impl Ss58Format {
    pub fn new(prefix: u16) -> Result<Self, DeriveError> {
        if prefix > MAX_SS58_PREFIX {
            return Err(DeriveError::InvalidPrefix { prefix });
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    fn prefix_bytes(&self) -> Vec<u8> {
        let ident = self.prefix;
        match ident {
            0..=63 => vec![ident as u8],
            _ => {
                let first = ((ident & 0b0000_0000_1111_1100) as u8 >> 2) | 0b0100_0000;
                let second = ((ident >> 8) as u8) | (((ident & 0b0000_0000_0000_0011) as u8) << 6);
                vec![first, second]
            }
        }
    }
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_PREFIX);
    hasher.update(data);
    let digest = hasher.finalize();
    [digest[0], digest[1]]
}

impl AccountFormat for Ss58Format {
    fn name(&self) -> &'static str {
        "ss58"
    }

    fn encode(&self, account: &SovereignAccount) -> String {
        let mut data = self.prefix_bytes();
        data.extend_from_slice(account.as_bytes());
        let sum = checksum(&data);
        data.extend_from_slice(&sum);
        bs58::encode(data).into_string()
    }

    fn decode(&self, address: &str) -> Result<SovereignAccount, DeriveError> {
        let data = bs58::decode(address)
            .into_vec()
            .map_err(|e| DeriveError::invalid_address(address, e.to_string()))?;
        let (prefix, prefix_len) = match data.first() {
            Some(&b) if b < 64 => (u16::from(b), 1),
            Some(&b) if b < 128 => {
                let second = *data
                    .get(1)
                    .ok_or_else(|| DeriveError::invalid_address(address, "truncated prefix"))?;
                let lower = (b << 2) | (second >> 6);
                let upper = second & 0b0011_1111;
                (u16::from(lower) | (u16::from(upper) << 8), 2)
            }
            Some(_) => return Err(DeriveError::invalid_address(address, "reserved prefix byte")),
            None => return Err(DeriveError::invalid_address(address, "empty")),
        };
        if data.len() != prefix_len + 32 + CHECKSUM_LEN {
            return Err(DeriveError::invalid_address(
                address,
                format!("expected {} bytes, got {}", prefix_len + 32 + CHECKSUM_LEN, data.len()),
            ));
        }
        let body_len = prefix_len + 32;
        if checksum(&data[..body_len]) != data[body_len..] {
            return Err(DeriveError::invalid_address(address, "checksum mismatch"));
        }
        if prefix != self.prefix {
            return Err(DeriveError::invalid_address(
                address,
                format!("prefix {prefix}, expected {}", self.prefix),
            ));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&data[prefix_len..body_len]);
        Ok(SovereignAccount::from_bytes(bytes))
    }
}

/// `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexFormat;

impl AccountFormat for HexFormat {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn encode(&self, account: &SovereignAccount) -> String {
        account.to_hex()
    }

    fn decode(&self, address: &str) -> Result<SovereignAccount, DeriveError> {
        address
            .parse()
            .map_err(|e: xcb_core::IdentifierError| DeriveError::invalid_address(address, e.reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // //Alice
    const ALICE: &str = "d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    fn alice() -> SovereignAccount {
        ALICE.parse().unwrap()
    }

    #[test]
    fn alice_generic_prefix() {
        assert_eq!(
            Ss58Format::default().encode(&alice()),
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        );
    }

    #[test]
    fn alice_polkadot_prefix() {
        assert_eq!(
            Ss58Format::new(0).unwrap().encode(&alice()),
            "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5"
        );
    }

    #[test]
    fn two_byte_prefix_decodes_back() {
        let format = Ss58Format::new(1284).unwrap();
        let address = format.encode(&alice());
        assert_eq!(format.decode(&address).unwrap(), alice());
    }

    #[test]
    fn prefix_beyond_fourteen_bits_is_rejected() {
        assert!(Ss58Format::new(16_383).is_ok());
        assert_eq!(
            Ss58Format::new(20_000).unwrap_err(),
            DeriveError::InvalidPrefix { prefix: 20_000 }
        );
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        let mut address = Ss58Format::default().encode(&alice()).into_bytes();
        let last = address.len() - 1;
        address[last] = if address[last] == b'Y' { b'Z' } else { b'Y' };
        let address = String::from_utf8(address).unwrap();
        assert!(matches!(
            Ss58Format::default().decode(&address),
            Err(DeriveError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn decode_rejects_wrong_prefix() {
        let polkadot = Ss58Format::new(0).unwrap().encode(&alice());
        let err = Ss58Format::default().decode(&polkadot).unwrap_err();
        assert!(format!("{err}").contains("expected 42"));
    }

    #[test]
    fn hex_format() {
        let format = HexFormat;
        assert_eq!(format.encode(&alice()), format!("0x{ALICE}"));
        assert_eq!(format.decode(&format!("0x{ALICE}")).unwrap(), alice());
        assert!(format.decode("0x1234").is_err());
    }
}
