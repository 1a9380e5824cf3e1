//! Minimal Solidity ABI codec for the round contract and the stake token.
//!
//! Only the handful of static types the contract uses are supported:
//! `uint256`, `address`, `bool`, `bytes32` and a single dynamic `string`
//! argument. Integers wider than the client's native types are rejected
//! instead of truncated.

use client_blockchain_core::{Address, ContractEvent, LogEntry, PlayerRecord, RoundId};
use game_core::{ProfileId, TokenAmount};
use sha3::{Digest, Keccak256};

pub type Word = [u8; 32];

const WORD: usize = 32;

// ============================================================================
// Signatures
// ============================================================================

pub mod signatures {
    // ERC-20
    pub const APPROVE: &str = "approve(address,uint256)";

    // Round contract: writes
    pub const START_GAME: &str = "startGame(uint256)";
    pub const SUBMIT_GUESS: &str = "submitGuess(string)";
    pub const CLAIM_REWARD: &str = "claimReward(uint256)";

    // Round contract: reads
    pub const CURRENT_GAME_ID: &str = "currentGameId()";
    pub const DAILY_PLAYER_DATA: &str = "dailyPlayerData(uint256,address)";
    pub const IS_FINALIZED: &str = "isFinalized(uint256)";
    pub const DAILY_WINNINGS: &str = "dailyWinnings(uint256,address)";

    // Events
    pub const GAME_STARTED: &str = "GameStarted(uint256,address,bytes32)";
    pub const GUESS_SUBMITTED: &str = "GuessSubmitted(uint256,address,uint256)";
    pub const GAME_FINALIZED: &str = "GameFinalized(uint256,uint256,address)";
    pub const REWARD_CLAIMED: &str = "RewardClaimed(uint256,address,uint256)";
}

/// Decoding failures. Surface as `ContractError::Decode`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("{0} does not fit the client's integer type")]
    Overflow(&'static str),

    #[error("invalid {0} encoding")]
    Invalid(&'static str),
}

pub fn keccak(bytes: &[u8]) -> Word {
    Keccak256::digest(bytes).into()
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `topic0` of an event.
pub fn event_topic(signature: &str) -> Word {
    keccak(signature.as_bytes())
}

// ============================================================================
// Encoding
// ============================================================================

/// A call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Uint(u128),
    Address(Address),
    String(&'a str),
}

/// Encode `signature(args...)` calldata.
pub fn encode_call(signature: &str, args: &[Token<'_>]) -> Vec<u8> {
    let head_len = args.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        match arg {
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::Address(address) => head.extend_from_slice(&address_word(address)),
            Token::String(text) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                tail.extend_from_slice(&uint_word(text.len() as u128));
                tail.extend_from_slice(text.as_bytes());
                let padding = (WORD - text.len() % WORD) % WORD;
                tail.resize(tail.len() + padding, 0);
            }
        }
    }

    let mut data = Vec::with_capacity(4 + head.len() + tail.len());
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&head);
    data.extend_from_slice(&tail);
    data
}

pub fn uint_word(value: u128) -> Word {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn address_word(address: &Address) -> Word {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

// Calldata builders for the calls the client makes.

pub fn approve(spender: Address, amount: TokenAmount) -> Vec<u8> {
    encode_call(
        signatures::APPROVE,
        &[Token::Address(spender), Token::Uint(amount.units())],
    )
}

pub fn start_game(amount: TokenAmount) -> Vec<u8> {
    encode_call(signatures::START_GAME, &[Token::Uint(amount.units())])
}

pub fn submit_guess(guess: &str) -> Vec<u8> {
    encode_call(signatures::SUBMIT_GUESS, &[Token::String(guess)])
}

pub fn claim_reward(round: RoundId) -> Vec<u8> {
    encode_call(signatures::CLAIM_REWARD, &[Token::Uint(u128::from(round))])
}

pub fn current_game_id() -> Vec<u8> {
    encode_call(signatures::CURRENT_GAME_ID, &[])
}

pub fn daily_player_data(round: RoundId, player: Address) -> Vec<u8> {
    encode_call(
        signatures::DAILY_PLAYER_DATA,
        &[Token::Uint(u128::from(round)), Token::Address(player)],
    )
}

pub fn is_finalized(round: RoundId) -> Vec<u8> {
    encode_call(signatures::IS_FINALIZED, &[Token::Uint(u128::from(round))])
}

pub fn daily_winnings(round: RoundId, player: Address) -> Vec<u8> {
    encode_call(
        signatures::DAILY_WINNINGS,
        &[Token::Uint(u128::from(round)), Token::Address(player)],
    )
}

// ============================================================================
// Decoding
// ============================================================================

/// Split return data into exactly `count` leading words.
pub fn words(data: &[u8], count: usize) -> Result<Vec<Word>, AbiError> {
    let expected = count * WORD;
    if data.len() < expected {
        return Err(AbiError::Truncated {
            expected,
            actual: data.len(),
        });
    }
    Ok(data[..expected]
        .chunks_exact(WORD)
        .map(|chunk| {
            let mut word = [0u8; WORD];
            word.copy_from_slice(chunk);
            word
        })
        .collect())
}

pub fn decode_u128(word: &Word, what: &'static str) -> Result<u128, AbiError> {
    if word[..16].iter().any(|&b| b != 0) {
        return Err(AbiError::Overflow(what));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

pub fn decode_u64(word: &Word, what: &'static str) -> Result<u64, AbiError> {
    u64::try_from(decode_u128(word, what)?).map_err(|_| AbiError::Overflow(what))
}

pub fn decode_u8(word: &Word, what: &'static str) -> Result<u8, AbiError> {
    u8::try_from(decode_u128(word, what)?).map_err(|_| AbiError::Overflow(what))
}

pub fn decode_bool(word: &Word) -> Result<bool, AbiError> {
    match decode_u128(word, "bool")? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(AbiError::Invalid("bool")),
    }
}

pub fn decode_address(word: &Word) -> Result<Address, AbiError> {
    if word[..12].iter().any(|&b| b != 0) {
        return Err(AbiError::Invalid("address"));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address(bytes))
}

/// Decode the `dailyPlayerData` tuple:
/// `(uint8 status, bytes32 assignedKOLHash, uint256 depositAmount,
///   uint256 startTime, uint256 endTime, uint256 attempts, uint256 finalScore)`.
pub fn decode_player_record(data: &[u8]) -> Result<PlayerRecord, AbiError> {
    let w = words(data, 7)?;
    Ok(PlayerRecord {
        status_code: decode_u8(&w[0], "status")?,
        assigned_target: ProfileId(w[1]),
        deposit_amount: TokenAmount(decode_u128(&w[2], "depositAmount")?),
        start_time: decode_u64(&w[3], "startTime")?,
        end_time: decode_u64(&w[4], "endTime")?,
        attempts: decode_u64(&w[5], "attempts")?,
        final_score: decode_u64(&w[6], "finalScore")?,
    })
}

/// Decode a contract log. Logs with an unknown `topic0` yield `None`.
pub fn decode_event(log: &LogEntry) -> Result<Option<ContractEvent>, AbiError> {
    let Some(topic0) = log.topics.first() else {
        return Ok(None);
    };

    let indexed = |index: usize| -> Result<&Word, AbiError> {
        log.topics.get(index).ok_or(AbiError::Invalid("indexed topics"))
    };

    let event = if *topic0 == event_topic(signatures::GAME_STARTED) {
        let data = words(&log.data, 1)?;
        ContractEvent::GameStarted {
            round: decode_u64(indexed(1)?, "gameId")?,
            player: decode_address(indexed(2)?)?,
            assigned_target: ProfileId(data[0]),
        }
    } else if *topic0 == event_topic(signatures::GUESS_SUBMITTED) {
        let data = words(&log.data, 1)?;
        ContractEvent::GuessSubmitted {
            round: decode_u64(indexed(1)?, "gameId")?,
            player: decode_address(indexed(2)?)?,
            attempts: decode_u64(&data[0], "attempts")?,
        }
    } else if *topic0 == event_topic(signatures::GAME_FINALIZED) {
        let data = words(&log.data, 2)?;
        ContractEvent::GameFinalized {
            round: decode_u64(indexed(1)?, "gameId")?,
            prize_pool: TokenAmount(decode_u128(&data[0], "prizePool")?),
            finalizer: decode_address(&data[1])?,
        }
    } else if *topic0 == event_topic(signatures::REWARD_CLAIMED) {
        let data = words(&log.data, 1)?;
        ContractEvent::RewardClaimed {
            round: decode_u64(indexed(1)?, "gameId")?,
            player: decode_address(indexed(2)?)?,
            amount: TokenAmount(decode_u128(&data[0], "amount")?),
        }
    } else {
        return Ok(None);
    };

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Address {
        Address([0xab; 20])
    }

    #[test]
    fn selectors_match_known_values() {
        assert_eq!(hex::encode(selector(signatures::APPROVE)), "095ea7b3");
        assert_eq!(
            hex::encode(selector("transfer(address,uint256)")),
            "a9059cbb"
        );
        assert_eq!(
            hex::encode(event_topic("Transfer(address,address,uint256)")),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn ten_usdc_stake_encodes_ten_million_units() {
        let data = start_game(TokenAmount(10_000_000));
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &selector(signatures::START_GAME));
        assert_eq!(decode_u128(&words(&data[4..], 1).unwrap()[0], "amount").unwrap(), 10_000_000);

        let data = approve(player(), TokenAmount(10_000_000));
        let w = words(&data[4..], 2).unwrap();
        assert_eq!(decode_address(&w[0]).unwrap(), player());
        assert_eq!(hex::encode(&w[1][29..]), "989680");
    }

    #[test]
    fn string_argument_uses_offset_length_and_padding() {
        let data = submit_guess("Jesse Pollak");
        let body = &data[4..];
        assert_eq!(body.len(), 3 * 32);

        let w = words(body, 3).unwrap();
        assert_eq!(decode_u128(&w[0], "offset").unwrap(), 32);
        assert_eq!(decode_u128(&w[1], "length").unwrap(), 12);
        assert_eq!(&w[2][..12], b"Jesse Pollak");
        assert!(w[2][12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn player_record_decodes_all_fields() {
        let target = ProfileId::from_name("Jesse Pollak");
        let mut data = Vec::new();
        data.extend_from_slice(&uint_word(1));
        data.extend_from_slice(target.as_bytes());
        data.extend_from_slice(&uint_word(10_000_000));
        data.extend_from_slice(&uint_word(1_700_000_000));
        data.extend_from_slice(&uint_word(0));
        data.extend_from_slice(&uint_word(3));
        data.extend_from_slice(&uint_word(0));

        let record = decode_player_record(&data).unwrap();
        assert_eq!(record.status_code, 1);
        assert_eq!(record.assigned_target(), Some(target));
        assert_eq!(record.deposit_amount, TokenAmount(10_000_000));
        assert_eq!(record.attempts, 3);

        assert!(matches!(
            decode_player_record(&data[..64]),
            Err(AbiError::Truncated { expected: 224, actual: 64 })
        ));
    }

    #[test]
    fn oversized_integers_are_rejected() {
        let mut word = [0u8; 32];
        word[0] = 1;
        assert_eq!(decode_u128(&word, "amount"), Err(AbiError::Overflow("amount")));

        let word = uint_word(u128::from(u64::MAX) + 1);
        assert_eq!(decode_u64(&word, "attempts"), Err(AbiError::Overflow("attempts")));
        assert_eq!(decode_u8(&uint_word(256), "status"), Err(AbiError::Overflow("status")));
        assert_eq!(decode_bool(&uint_word(2)), Err(AbiError::Invalid("bool")));
    }

    #[test]
    fn logs_decode_into_events() {
        let log = LogEntry {
            address: Address::ZERO,
            topics: vec![
                event_topic(signatures::GUESS_SUBMITTED),
                uint_word(4),
                address_word(&player()),
            ],
            data: uint_word(2).to_vec(),
            block_number: 10,
        };
        assert_eq!(
            decode_event(&log).unwrap(),
            Some(ContractEvent::GuessSubmitted {
                round: 4,
                player: player(),
                attempts: 2,
            })
        );

        let mut data = uint_word(50_000_000).to_vec();
        data.extend_from_slice(&address_word(&player()));
        let log = LogEntry {
            topics: vec![event_topic(signatures::GAME_FINALIZED), uint_word(4)],
            data,
            ..log
        };
        assert!(matches!(
            decode_event(&log).unwrap(),
            Some(ContractEvent::GameFinalized { round: 4, prize_pool, .. }) if prize_pool == TokenAmount(50_000_000)
        ));

        let unknown = LogEntry {
            topics: vec![event_topic("Other()")],
            data: Vec::new(),
            address: Address::ZERO,
            block_number: 1,
        };
        assert_eq!(decode_event(&unknown).unwrap(), None);
    }
}
