//! Chain parameters: gas schedule and limits

use serde::{Deserialize, Serialize};

/// Gas costs and limits.
///
/// Deserializes from JSON with PascalCase keys; missing keys keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Params {
    /// Free instructions
    pub zero_gas: u64,
    /// Base tier
    pub base_gas: u64,
    /// Very low tier
    pub very_low_gas: u64,
    /// Low tier
    pub low_gas: u64,
    /// Mid tier
    pub mid_gas: u64,
    /// High tier
    pub high_gas: u64,
    /// Ext tier (BLOCKHASH)
    pub ext_gas: u64,
    /// EXP base
    pub exp_gas: u64,
    /// EXP per exponent byte
    pub exp_byte_gas: u64,
    /// SLOAD
    pub sload_gas: u64,
    /// SSTORE zero to non-zero
    pub sstore_set_gas: u64,
    /// SSTORE other changes
    pub sstore_reset_gas: u64,
    /// SSTORE non-zero to zero
    pub sstore_clear_gas: u64,
    /// Refund for clearing a slot
    pub sstore_refund_gas: u64,
    /// Quadratic memory cost divisor
    pub quad_coeff_div: u64,
    /// Memory per word
    pub memory_gas: u64,
    /// JUMPDEST
    pub jumpdest_gas: u64,
    /// SHA3 base
    pub sha3_gas: u64,
    /// SHA3 per word
    pub sha3_word_gas: u64,
    /// Copy per word
    pub copy_gas: u64,
    /// LOG base
    pub log_gas: u64,
    /// LOG per topic
    pub log_topic_gas: u64,
    /// LOG per data byte
    pub log_data_gas: u64,
    /// BALANCE
    pub balance_gas: u64,
    /// EXTCODESIZE
    pub extcode_size_gas: u64,
    /// EXTCODECOPY base
    pub extcode_copy_base: u64,
    /// EXTCODEHASH
    pub extcode_hash_gas: u64,
    /// CALL family base
    pub call_gas: u64,
    /// Value-bearing call surcharge
    pub call_value_transfer_gas: u64,
    /// Call creating a new account
    pub call_new_account_gas: u64,
    /// Free gas given to value-bearing callees
    pub call_stipend: u64,
    /// CREATE
    pub create_gas: u64,
    /// CREATE2 base
    pub create2_gas: u64,
    /// Per byte of deployed code
    pub create_data_gas: u64,
    /// SELFDESTRUCT
    pub selfdestruct_gas: u64,
    /// SELFDESTRUCT funding a new account
    pub create_by_selfdestruct_gas: u64,
    /// Refund for self-destructing
    pub selfdestruct_refund_gas: u64,
    /// Transaction base
    pub tx_gas: u64,
    /// Contract-creating transaction base
    pub tx_gas_contract_creation: u64,
    /// Per zero byte of transaction data
    pub tx_data_zero_gas: u64,
    /// Per non-zero byte of transaction data
    pub tx_data_non_zero_gas: u64,
    /// ecrecover precompile
    pub ecrecover_gas: u64,
    /// sha256 precompile base
    pub sha256_base_gas: u64,
    /// sha256 precompile per word
    pub sha256_per_word_gas: u64,
    /// ripemd160 precompile base
    pub ripemd160_base_gas: u64,
    /// ripemd160 precompile per word
    pub ripemd160_per_word_gas: u64,
    /// identity precompile base
    pub identity_base_gas: u64,
    /// identity precompile per word
    pub identity_per_word_gas: u64,
    /// modexp complexity divisor
    pub mod_exp_quad_coeff_div: u64,
    /// Maximum call depth
    pub call_create_depth: usize,
    /// Maximum stack depth
    pub stack_limit: usize,
    /// Maximum deployed code size (EIP-170)
    pub max_code_size: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            zero_gas: 0,
            base_gas: 2,
            very_low_gas: 3,
            low_gas: 5,
            mid_gas: 8,
            high_gas: 10,
            ext_gas: 20,
            exp_gas: 10,
            exp_byte_gas: 50,
            sload_gas: 200,
            sstore_set_gas: 20_000,
            sstore_reset_gas: 5000,
            sstore_clear_gas: 5000,
            sstore_refund_gas: 15_000,
            quad_coeff_div: 512,
            memory_gas: 3,
            jumpdest_gas: 1,
            sha3_gas: 30,
            sha3_word_gas: 6,
            copy_gas: 3,
            log_gas: 375,
            log_topic_gas: 375,
            log_data_gas: 8,
            balance_gas: 400,
            extcode_size_gas: 700,
            extcode_copy_base: 700,
            extcode_hash_gas: 400,
            call_gas: 700,
            call_value_transfer_gas: 9000,
            call_new_account_gas: 25_000,
            call_stipend: 2300,
            create_gas: 32_000,
            create2_gas: 32_000,
            create_data_gas: 200,
            selfdestruct_gas: 5000,
            create_by_selfdestruct_gas: 25_000,
            selfdestruct_refund_gas: 24_000,
            tx_gas: 21_000,
            tx_gas_contract_creation: 53_000,
            tx_data_zero_gas: 4,
            tx_data_non_zero_gas: 68,
            ecrecover_gas: 3000,
            sha256_base_gas: 60,
            sha256_per_word_gas: 12,
            ripemd160_base_gas: 600,
            ripemd160_per_word_gas: 120,
            identity_base_gas: 15,
            identity_per_word_gas: 3,
            mod_exp_quad_coeff_div: 20,
            call_create_depth: 1024,
            stack_limit: 1024,
            max_code_size: 24_576,
        }
    }
}

impl Params {
    /// Parse from JSON, filling missing keys from the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let params = Params::default();
        assert_eq!(params.very_low_gas, 3);
        assert_eq!(params.sstore_set_gas, 20_000);
        assert_eq!(params.call_stipend, 2300);
        assert_eq!(params.tx_data_non_zero_gas, 68);
        assert_eq!(params.call_create_depth, 1024);
        assert_eq!(params.max_code_size, 24_576);
    }

    #[test]
    fn test_partial_override_from_json() {
        let params = Params::from_json(r#"{"SstoreSetGas": 1, "MaxCodeSize": 10}"#).unwrap();
        assert_eq!(params.sstore_set_gas, 1);
        assert_eq!(params.max_code_size, 10);
        // untouched keys keep defaults
        assert_eq!(params.sload_gas, 200);
    }

    #[test]
    fn test_json_keys_are_pascal_case() {
        let json = Params::default().to_json().unwrap();
        assert!(json.contains("\"TxGasContractCreation\": 53000"));
        assert!(json.contains("\"Ripemd160PerWordGas\": 120"));
        assert!(json.contains("\"ModExpQuadCoeffDiv\": 20"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Params::from_json(r#"{"TxGas": "lots"}"#).is_err());
    }
}
