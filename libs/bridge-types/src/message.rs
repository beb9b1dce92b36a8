use crate::{Error, MessengerProtocol, MAX_CHAIN_ID};
use soroban_sdk::{Address, Bytes, BytesN, Env, U256};

/// Length of a Stellar strkey for an account or contract address
const STRKEY_LEN: usize = 56;
/// version byte + 32 byte payload + 2 byte checksum
const STRKEY_DECODED_LEN: usize = 35;

const STRKEY_VERSION_ACCOUNT: u8 = 6 << 3;
const STRKEY_VERSION_CONTRACT: u8 = 2 << 3;

/// Identifier of a cross-chain transfer.
///
/// keccak256 over
/// `amount(32) || recipient(32) || source_chain_id(32) || receive_token(32) || nonce(32) || messenger(1)`
/// with byte 0 replaced by the source chain id and byte 1 by the destination chain id.
#[allow(clippy::too_many_arguments)]
pub fn hash_message(
    env: &Env,
    amount: u128,
    recipient: &BytesN<32>,
    source_chain_id: u32,
    destination_chain_id: u32,
    receive_token: &BytesN<32>,
    nonce: &U256,
    messenger: MessengerProtocol,
) -> Result<BytesN<32>, Error> {
    let source = chain_id_byte(source_chain_id)?;
    let destination = chain_id_byte(destination_chain_id)?;

    let mut data = Bytes::new(env);
    data.extend_from_array(&u128_to_word(amount));
    data.extend_from_array(&recipient.to_array());
    data.extend_from_array(&u128_to_word(source_chain_id as u128));
    data.extend_from_array(&receive_token.to_array());
    data.append(&nonce.to_be_bytes());
    data.push_back(messenger.tag());

    let mut hash = env.crypto().keccak256(&data).to_array();
    hash[0] = source;
    hash[1] = destination;
    Ok(BytesN::from_array(env, &hash))
}

/// Binds a message to the contract that sent it. The chain id bytes are kept.
pub fn hash_with_sender(env: &Env, message: &BytesN<32>, sender: &BytesN<32>) -> BytesN<32> {
    let message = message.to_array();

    let mut data = Bytes::from_array(env, &message);
    data.extend_from_array(&sender.to_array());

    let mut hash = env.crypto().keccak256(&data).to_array();
    hash[0] = message[0];
    hash[1] = message[1];
    BytesN::from_array(env, &hash)
}

/// 32-byte payload of an account (ed25519 key) or contract (contract hash) address
pub fn address_to_bytes(env: &Env, address: &Address) -> Result<BytesN<32>, Error> {
    let strkey = address.to_string();
    if strkey.len() as usize != STRKEY_LEN {
        return Err(Error::UnsupportedAddress);
    }
    let mut encoded = [0u8; STRKEY_LEN];
    strkey.copy_into_slice(&mut encoded);

    let decoded = base32_decode(&encoded)?;
    if decoded[0] != STRKEY_VERSION_ACCOUNT && decoded[0] != STRKEY_VERSION_CONTRACT {
        return Err(Error::UnsupportedAddress);
    }

    let mut payload = [0u8; 32];
    payload.copy_from_slice(&decoded[1..33]);
    Ok(BytesN::from_array(env, &payload))
}

/// RFC 4648 base32 without padding
fn base32_decode(encoded: &[u8; STRKEY_LEN]) -> Result<[u8; STRKEY_DECODED_LEN], Error> {
    let mut decoded = [0u8; STRKEY_DECODED_LEN];
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut index = 0;

    for c in encoded.iter() {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return Err(Error::UnsupportedAddress),
        };
        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            decoded[index] = (buffer >> bits) as u8;
            buffer &= (1 << bits) - 1;
            index += 1;
        }
    }

    Ok(decoded)
}

fn chain_id_byte(chain_id: u32) -> Result<u8, Error> {
    if chain_id > MAX_CHAIN_ID {
        return Err(Error::InvalidChainId);
    }
    Ok(chain_id as u8)
}

fn u128_to_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::{Address, Env, String};

    const EXPECTED_MESSAGE: [u8; 32] = [
        1, 2, 0, 137, 115, 140, 85, 25, 213, 171, 31, 115, 152, 114, 253, 147, 171, 102, 146,
        29, 162, 192, 88, 117, 76, 220, 61, 65, 221, 90, 127, 176,
    ];

    fn sample_message(env: &Env) -> BytesN<32> {
        hash_message(
            env,
            1_000_000,
            &BytesN::from_array(env, &[0x11; 32]),
            1,
            2,
            &BytesN::from_array(env, &[0x22; 32]),
            &U256::from_u32(env, 7),
            MessengerProtocol::Allbridge,
        )
        .unwrap()
    }

    #[test]
    fn test_hash_message_vector() {
        let env = Env::default();
        let message = sample_message(&env);
        assert_eq!(message.to_array(), EXPECTED_MESSAGE);
    }

    #[test]
    fn test_hash_message_depends_on_nonce_and_messenger() {
        let env = Env::default();
        let base = sample_message(&env);

        let other_nonce = hash_message(
            &env,
            1_000_000,
            &BytesN::from_array(&env, &[0x11; 32]),
            1,
            2,
            &BytesN::from_array(&env, &[0x22; 32]),
            &U256::from_u32(&env, 8),
            MessengerProtocol::Allbridge,
        )
        .unwrap();
        let other_messenger = hash_message(
            &env,
            1_000_000,
            &BytesN::from_array(&env, &[0x11; 32]),
            1,
            2,
            &BytesN::from_array(&env, &[0x22; 32]),
            &U256::from_u32(&env, 7),
            MessengerProtocol::Wormhole,
        )
        .unwrap();

        assert_ne!(base, other_nonce);
        assert_ne!(base, other_messenger);
        assert_eq!(other_messenger.to_array()[0], 1);
        assert_eq!(other_messenger.to_array()[1], 2);
    }

    #[test]
    fn test_hash_message_rejects_wide_chain_id() {
        let env = Env::default();
        let result = hash_message(
            &env,
            1,
            &BytesN::from_array(&env, &[0x11; 32]),
            256,
            2,
            &BytesN::from_array(&env, &[0x22; 32]),
            &U256::from_u32(&env, 1),
            MessengerProtocol::Allbridge,
        );
        assert_eq!(result, Err(Error::InvalidChainId));
    }

    #[test]
    fn test_hash_with_sender_vector() {
        let env = Env::default();
        let message = sample_message(&env);
        let sender = BytesN::from_array(&env, &[0x33; 32]);

        let hash = hash_with_sender(&env, &message, &sender);
        assert_eq!(
            hash.to_array(),
            [
                1, 2, 242, 97, 10, 73, 192, 192, 193, 205, 133, 28, 78, 247, 133, 199, 106, 89,
                251, 105, 237, 66, 35, 96, 247, 185, 109, 112, 127, 82, 116, 6,
            ]
        );
    }

    #[test]
    fn test_address_to_bytes_account() {
        let env = Env::default();
        let address = Address::from_string(&String::from_str(
            &env,
            "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF",
        ));
        let bytes = address_to_bytes(&env, &address).unwrap();
        assert_eq!(bytes.to_array(), [0u8; 32]);
    }

    #[test]
    fn test_address_to_bytes_contract() {
        let env = Env::default();
        let address = Address::from_string(&String::from_str(
            &env,
            "CAAACAQDAQCQMBYIBEFAWDANBYHRAEISCMKBKFQXDAMRUGY4DUPB6N4O",
        ));
        let bytes = address_to_bytes(&env, &address).unwrap();

        let mut expected = [0u8; 32];
        for (i, b) in expected.iter_mut().enumerate() {
            *b = i as u8;
        }
        assert_eq!(bytes.to_array(), expected);
    }

    #[test]
    fn test_address_to_bytes_distinct() {
        let env = Env::default();
        let a = Address::generate(&env);
        let b = Address::generate(&env);
        assert_ne!(
            address_to_bytes(&env, &a).unwrap(),
            address_to_bytes(&env, &b).unwrap()
        );
    }
}
