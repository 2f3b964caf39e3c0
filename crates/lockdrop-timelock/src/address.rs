//! Network selection, address validation and public-key recovery for the
//! source chain.

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network, PublicKey};
use lockdrop_core::constants::LOCK_MESSAGE;
use lockdrop_core::error::LockdropError;
use lockdrop_core::types::{CompressedPublicKey, LockNetwork};
use lockdrop_crypto::keys::parse_public_key;
use lockdrop_crypto::message::recover_public_key;

pub fn bitcoin_network(network: LockNetwork) -> Network {
    match network {
        LockNetwork::Mainnet => Network::Bitcoin,
        LockNetwork::Testnet => Network::Testnet,
        LockNetwork::Regtest => Network::Regtest,
    }
}

/// Parse `address` and require that it belongs to `network`.
pub fn parse_address(address: &str, network: LockNetwork) -> Result<Address, LockdropError> {
    parse_unchecked(address)?
        .require_network(bitcoin_network(network))
        .map_err(|e| LockdropError::InvalidAddress(e.to_string()))
}

pub fn validate_address(address: &str, network: LockNetwork) -> bool {
    parse_address(address, network).is_ok()
}

/// Mainnet if the address is valid there, otherwise testnet. Regtest is only
/// reported for addresses no other network accepts (`bcrt1…`), since base58
/// testnet and regtest addresses are indistinguishable.
pub fn network_from_address(address: &str) -> Result<LockNetwork, LockdropError> {
    let unchecked = parse_unchecked(address)?;
    if unchecked.is_valid_for_network(Network::Bitcoin) {
        Ok(LockNetwork::Mainnet)
    } else if unchecked.is_valid_for_network(Network::Testnet) {
        Ok(LockNetwork::Testnet)
    } else {
        Ok(LockNetwork::Regtest)
    }
}

/// True when `public_key` is a curve point whose P2PKH address is well formed
/// under `network`.
pub fn validate_public_key(public_key: &[u8], network: LockNetwork) -> bool {
    let Ok(inner) = parse_public_key(public_key) else {
        return false;
    };
    let address = p2pkh_address(&PublicKey::new(inner), network);
    validate_address(&address.to_string(), network)
}

pub fn p2pkh_address(key: &PublicKey, network: LockNetwork) -> Address {
    Address::p2pkh(key.pubkey_hash(), bitcoin_network(network))
}

/// Recover the locker's key from a signed-message signature over the lock
/// message and check it against the P2PKH `address` it was signed with.
/// Returns the compressed form, ready for `compile_lock`.
pub fn recover_locker_key(
    address: &str,
    signature_base64: &str,
) -> Result<CompressedPublicKey, LockdropError> {
    let network = network_from_address(address)?;
    let recovered = recover_public_key(LOCK_MESSAGE, signature_base64)?;
    let derived = p2pkh_address(&recovered, network).to_string();
    if derived != address.trim() {
        return Err(LockdropError::InvalidSignature(format!(
            "signature recovers key for {derived}, not {}",
            address.trim()
        )));
    }
    Ok(CompressedPublicKey::from_bytes(recovered.inner.serialize()))
}

fn parse_unchecked(address: &str) -> Result<Address<NetworkUnchecked>, LockdropError> {
    address
        .trim()
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| LockdropError::InvalidAddress(format!("{}: {e}", address.trim())))
}
