// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::config::SIGNATURE_SIZE_BYTES;
use crate::error::ModelsError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Opaque signature container.
///
/// The core never verifies signatures; it only carries them into the
/// directory-block signature list. Key handling and verification live with
/// the signing stage.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE_BYTES]);

impl Signature {
    /// Wrap raw signature bytes
    pub fn from_bytes(data: [u8; SIGNATURE_SIZE_BYTES]) -> Self {
        Signature(data)
    }

    /// Raw signature bytes
    pub fn to_bytes(&self) -> &[u8; SIGNATURE_SIZE_BYTES] {
        &self.0
    }

    /// bs58 checked representation
    pub fn to_bs58_check(&self) -> String {
        bs58::encode(self.0).with_check().into_string()
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Signature {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|err| ModelsError::SignatureParseError(format!("{}", err)))?;
        let data: [u8; SIGNATURE_SIZE_BYTES] = decoded
            .try_into()
            .map_err(|_| ModelsError::SignatureParseError("bad signature length".into()))?;
        Ok(Signature(data))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&self.to_bs58_check())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Signature, D::Error> {
        let repr = String::deserialize(d)?;
        Signature::from_str(&repr).map_err(de::Error::custom)
    }
}
