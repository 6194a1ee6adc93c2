//! Builtin contracts at fixed addresses

use mazze_primitives::Address;

use super::Contract;
use crate::SdkError;

/// Name, address and ABI of every builtin contract
pub const INTERNAL_CONTRACTS: &[(&str, [u8; 20], &[&str])] = &[
    ("AdminControl", builtin(0x00), ADMIN_CONTROL),
    ("SponsorWhitelistControl", builtin(0x01), SPONSOR_WHITELIST_CONTROL),
    ("CrossSpaceCall", builtin(0x06), CROSS_SPACE_CALL),
    ("ParamsControl", builtin(0x07), PARAMS_CONTROL),
];

const fn builtin(last: u8) -> [u8; 20] {
    let mut bytes = [0u8; 20];
    bytes[0] = 0x08;
    bytes[1] = 0x88;
    bytes[19] = last;
    bytes
}

const ADMIN_CONTROL: &[&str] = &[
    "function setAdmin(address contractAddr, address newAdmin)",
    "function destroy(address contractAddr)",
    "function getAdmin(address contractAddr) view returns (address)",
];

const SPONSOR_WHITELIST_CONTROL: &[&str] = &[
    "function getSponsorForGas(address contractAddr) view returns (address)",
    "function getSponsoredBalanceForGas(address contractAddr) view returns (uint256)",
    "function getSponsoredGasFeeUpperBound(address contractAddr) view returns (uint256)",
    "function getSponsorForCollateral(address contractAddr) view returns (address)",
    "function getSponsoredBalanceForCollateral(address contractAddr) view returns (uint256)",
    "function isWhitelisted(address contractAddr, address user) view returns (bool)",
    "function isAllWhitelisted(address contractAddr) view returns (bool)",
    "function addPrivilegeByAdmin(address contractAddr, address[] addresses)",
    "function removePrivilegeByAdmin(address contractAddr, address[] addresses)",
    "function setSponsorForGas(address contractAddr, uint256 upperBound) payable",
    "function setSponsorForCollateral(address contractAddr) payable",
    "function getAvailableStoragePoints(address contractAddr) view returns (uint256)",
];

const CROSS_SPACE_CALL: &[&str] = &[
    "event Call(bytes20 indexed sender, bytes20 indexed receiver, uint256 value, uint256 nonce, bytes data)",
    "event Create(bytes20 indexed sender, bytes20 indexed contract_address, uint256 value, uint256 nonce, bytes init)",
    "event Withdraw(bytes20 indexed sender, address indexed receiver, uint256 value, uint256 nonce)",
    "event Outcome(bool success)",
    "function createEVM(bytes init) payable returns (bytes20)",
    "function transferEVM(bytes20 to) payable returns (bytes output)",
    "function callEVM(bytes20 to, bytes data) payable returns (bytes output)",
    "function staticCallEVM(bytes20 to, bytes data) view returns (bytes output)",
    "function withdrawFromMapped(uint256 value)",
    "function mappedBalance(address addr) view returns (uint256)",
    "function mappedNonce(address addr) view returns (uint256)",
];

const PARAMS_CONTROL: &[&str] = &[
    "function castVote(uint64 vote_round, tuple(uint16 topic_index, uint256[3] votes)[] vote_data)",
    "function readVote(address addr) view returns (tuple(uint16 topic_index, uint256[3] votes)[])",
    "function currentRound() view returns (uint64)",
    "function totalVotes(uint64 vote_round) view returns (tuple(uint16 topic_index, uint256[3] votes)[])",
    "event CastVote(uint64 indexed vote_round, address indexed addr, uint16 indexed topic_index, uint256[3] votes)",
    "event RevokeVote(uint64 indexed vote_round, address indexed addr, uint16 indexed topic_index, uint256[3] votes)",
];

/// Builtin contract by name, with its address attached
pub fn internal_contract(name: &str) -> Result<Contract, SdkError> {
    let (_, address, abi) = INTERNAL_CONTRACTS
        .iter()
        .find(|(n, _, _)| *n == name)
        .ok_or_else(|| SdkError::Abi(format!("can not find internal contract {}", name)))?;
    Ok(Contract::from_human_readable(abi)?.at(Address::from_bytes(*address)))
}
