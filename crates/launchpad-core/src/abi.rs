//! ABI parsing and constructor argument encoding
//!
//! Provides the [`Abi`] struct for declarative access to the constructor of a
//! compiled contract, and the conversion of loosely typed arguments (JSON
//! values or CLI strings) into ABI-encoded constructor calldata.

use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::{JsonAbi, Param, StateMutability as AlloyStateMutability};
use alloy::primitives::{I256, U256};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::StateMutability;

// =============================================================================
// Abi Struct
// =============================================================================

/// Wrapper around alloy's JsonAbi
#[derive(Debug, Clone, Default)]
pub struct Abi(JsonAbi);

impl Abi {
    /// Parse a JSON ABI string into an Abi struct
    pub fn parse(json: &str) -> Result<Self, Error> {
        let abi: JsonAbi = serde_json::from_str(json)
            .map_err(|e| Error::Abi(format!("Failed to parse ABI: {}", e)))?;
        Ok(Self(abi))
    }

    /// Parse from a serde_json::Value
    pub fn from_value(value: &serde_json::Value) -> Result<Self, Error> {
        let abi: JsonAbi = serde_json::from_value(value.clone())
            .map_err(|e| Error::Abi(format!("Failed to parse ABI: {}", e)))?;
        Ok(Self(abi))
    }

    // -------------------------------------------------------------------------
    // Constructor
    // -------------------------------------------------------------------------

    /// Get constructor information if present
    pub fn constructor(&self) -> Option<ConstructorInfo> {
        self.0.constructor.as_ref().map(|c| ConstructorInfo {
            inputs: c.inputs.iter().map(ParamInfo::from_abi_param).collect(),
            state_mutability: convert_state_mutability(c.state_mutability),
        })
    }

    /// Number of constructor inputs (0 when the ABI declares no constructor)
    pub fn constructor_arity(&self) -> usize {
        self.0.constructor.as_ref().map_or(0, |c| c.inputs.len())
    }

    /// Check if value can be sent with the creation transaction
    pub fn is_constructor_payable(&self) -> bool {
        self.constructor().is_some_and(|c| c.is_payable())
    }

    /// Signature of the constructor, `constructor()` when none is declared
    pub fn constructor_signature(&self) -> String {
        self.constructor()
            .map(|c| c.signature())
            .unwrap_or_else(|| "constructor()".to_string())
    }

    /// Validate `args` against the constructor and ABI-encode them.
    ///
    /// Returns the bytes to append to the creation bytecode. An ABI without a
    /// constructor accepts only an empty argument list.
    pub fn encode_constructor_args(&self, args: &[serde_json::Value]) -> Result<Vec<u8>, Error> {
        let expected = self.constructor_arity();
        if args.len() != expected {
            return Err(Error::validation(format!(
                "Expected {} constructor argument(s) for {}, got {}",
                expected,
                self.constructor_signature(),
                args.len()
            )));
        }

        let Some(constructor) = &self.0.constructor else {
            return Ok(Vec::new());
        };

        let values = constructor
            .inputs
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (input, arg))| {
                let ty = resolve_param(input)?;
                json_to_sol_value(&ty, arg).map_err(|e| {
                    Error::validation(format!(
                        "Argument {} ({} {}): {}",
                        i,
                        input.ty,
                        display_name(&input.name),
                        e
                    ))
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        constructor
            .abi_encode_input(&values)
            .map_err(|e| Error::validation(format!("Failed to encode constructor args: {}", e)))
    }
}

// =============================================================================
// Constructor Types
// =============================================================================

/// Constructor information extracted from ABI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorInfo {
    pub inputs: Vec<ParamInfo>,
    pub state_mutability: StateMutability,
}

impl ConstructorInfo {
    /// Check if this constructor can receive ETH
    pub fn is_payable(&self) -> bool {
        self.state_mutability.is_payable()
    }

    /// Human readable signature, e.g. `constructor(string name, uint256 cap) payable`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .inputs
            .iter()
            .map(|p| {
                if p.name.is_empty() {
                    p.param_type.clone()
                } else {
                    format!("{} {}", p.param_type, p.name)
                }
            })
            .collect();
        if self.is_payable() {
            format!("constructor({}) {}", params.join(", "), self.state_mutability.as_str())
        } else {
            format!("constructor({})", params.join(", "))
        }
    }
}

/// Information about a constructor parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    pub param_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ParamInfo>>,
}

impl ParamInfo {
    /// Create ParamInfo from an alloy Param
    pub fn from_abi_param(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            param_type: param.ty.to_string(),
            components: if param.components.is_empty() {
                None
            } else {
                Some(param.components.iter().map(Self::from_abi_param).collect())
            },
        }
    }
}

// =============================================================================
// Value Conversion
// =============================================================================

/// Convert a JSON value into a Solidity value of the given type.
///
/// Strings are coerced with alloy's Solidity literal parser, so CLI input such
/// as `"true"`, `"1000"`, `"0xabc..."` or `"[1,2,3]"` works for every type.
pub fn json_to_sol_value(ty: &DynSolType, value: &serde_json::Value) -> Result<DynSolValue, String> {
    if let serde_json::Value::String(s) = value {
        return ty
            .coerce_str(s)
            .map_err(|e| format!("Cannot parse '{}' as {}: {}", s, ty, e));
    }

    match ty {
        DynSolType::Bool => value
            .as_bool()
            .map(DynSolValue::Bool)
            .ok_or_else(|| "Expected boolean".to_string()),
        DynSolType::Uint(bits) => {
            let n = parse_uint(value)?;
            if n.bit_len() > *bits {
                return Err(format!("Value {} does not fit in uint{}", n, bits));
            }
            Ok(DynSolValue::Uint(n, *bits))
        }
        DynSolType::Int(bits) => {
            let n = parse_int(value)?;
            if !fits_int(n, *bits) {
                return Err(format!("Value {} does not fit in int{}", n, bits));
            }
            Ok(DynSolValue::Int(n, *bits))
        }
        DynSolType::Array(inner) => {
            let arr = value.as_array().ok_or("Expected array")?;
            let values = arr
                .iter()
                .map(|v| json_to_sol_value(inner, v))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Array(values))
        }
        DynSolType::FixedArray(inner, size) => {
            let arr = value.as_array().ok_or("Expected array")?;
            if arr.len() != *size {
                return Err(format!("Expected {} elements, got {}", size, arr.len()));
            }
            let values = arr
                .iter()
                .map(|v| json_to_sol_value(inner, v))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::FixedArray(values))
        }
        DynSolType::Tuple(types) => {
            let arr = value.as_array().ok_or("Expected array for tuple")?;
            if arr.len() != types.len() {
                return Err(format!(
                    "Expected {} tuple fields, got {}",
                    types.len(),
                    arr.len()
                ));
            }
            let values = types
                .iter()
                .zip(arr)
                .map(|(t, v)| json_to_sol_value(t, v))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Tuple(values))
        }
        DynSolType::FixedBytes(size) => Err(format!("Expected hex string for bytes{}", size)),
        _ => Err(format!("Expected string for {}", ty)),
    }
}

/// Parse an unsigned integer from a JSON number. Strings never reach here;
/// they are coerced by type first.
fn parse_uint(value: &serde_json::Value) -> Result<U256, String> {
    match value {
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(u) => Ok(U256::from(u)),
            None if n.as_i64().is_some() => {
                Err("Negative number not allowed for uint".to_string())
            }
            None => Err("Number too large, pass it as a string".to_string()),
        },
        _ => Err("Expected number for uint".to_string()),
    }
}

/// Parse a signed integer from a JSON number
fn parse_int(value: &serde_json::Value) -> Result<I256, String> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|i| I256::try_from(i).ok())
            .ok_or_else(|| "Number out of range, pass it as a string".to_string()),
        _ => Err("Expected number for int".to_string()),
    }
}

/// Two's complement range check for `int<bits>`
fn fits_int(n: I256, bits: usize) -> bool {
    let magnitude = if n.is_negative() {
        (n + I256::ONE).unsigned_abs()
    } else {
        n.unsigned_abs()
    };
    magnitude.bit_len() < bits
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve_param(param: &Param) -> Result<DynSolType, Error> {
    param
        .resolve()
        .map_err(|e| Error::Abi(format!("Unsupported parameter type '{}': {}", param.ty, e)))
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "<unnamed>"
    } else {
        name
    }
}

fn convert_state_mutability(sm: AlloyStateMutability) -> StateMutability {
    match sm {
        AlloyStateMutability::Pure => StateMutability::Pure,
        AlloyStateMutability::View => StateMutability::View,
        AlloyStateMutability::NonPayable => StateMutability::NonPayable,
        AlloyStateMutability::Payable => StateMutability::Payable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    const TOKEN_ABI: &str = r#"[
        {
            "type": "constructor",
            "inputs": [
                {"name": "name", "type": "string"},
                {"name": "cap", "type": "uint256"},
                {"name": "owner", "type": "address"}
            ],
            "stateMutability": "payable"
        },
        {
            "type": "function",
            "name": "balanceOf",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        }
    ]"#;

    const NO_CONSTRUCTOR_ABI: &str = r#"[
        {"type": "function", "name": "foo", "inputs": [], "outputs": [], "stateMutability": "view"}
    ]"#;

    #[test]
    fn test_constructor() {
        let abi = Abi::parse(TOKEN_ABI).unwrap();
        let constructor = abi.constructor().unwrap();

        assert_eq!(constructor.inputs.len(), 3);
        assert_eq!(constructor.inputs[1].name, "cap");
        assert_eq!(constructor.inputs[1].param_type, "uint256");
        assert!(constructor.is_payable());
        assert!(abi.is_constructor_payable());
        assert_eq!(
            constructor.signature(),
            "constructor(string name, uint256 cap, address owner) payable"
        );
    }

    #[test]
    fn test_arity_without_constructor() {
        let abi = Abi::parse(NO_CONSTRUCTOR_ABI).unwrap();
        assert!(abi.constructor().is_none());
        assert_eq!(abi.constructor_arity(), 0);
        assert!(!abi.is_constructor_payable());
        assert_eq!(abi.constructor_signature(), "constructor()");
        assert!(abi.encode_constructor_args(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_args_for_contract_without_constructor() {
        let abi = Abi::parse(NO_CONSTRUCTOR_ABI).unwrap();
        let err = abi.encode_constructor_args(&[json!("1")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_arity_mismatch() {
        let abi = Abi::parse(TOKEN_ABI).unwrap();
        let err = abi
            .encode_constructor_args(&[json!("Token"), json!("100")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains(
            "Expected 3 constructor argument(s) for constructor(string name, uint256 cap, address owner) payable, got 2"
        ));
    }

    #[test]
    fn test_encode_string_args() {
        let abi = Abi::parse(TOKEN_ABI).unwrap();
        let encoded = abi
            .encode_constructor_args(&[
                json!("Token"),
                json!("1000"),
                json!("0x000000000000000000000000000000000000dEaD"),
            ])
            .unwrap();

        // head: string offset, uint256, address; tail: length + padded data
        assert_eq!(encoded.len(), 32 * 5);
        assert_eq!(encoded[32 * 2 - 2..32 * 2], [0x03, 0xe8]);
        assert_eq!(encoded[32 * 3 - 2..32 * 3], [0xde, 0xad]);
    }

    #[test]
    fn test_encode_json_number() {
        let abi = Abi::parse(TOKEN_ABI).unwrap();
        let from_number = abi
            .encode_constructor_args(&[
                json!("Token"),
                json!(1000),
                json!("0x000000000000000000000000000000000000dEaD"),
            ])
            .unwrap();
        let from_string = abi
            .encode_constructor_args(&[
                json!("Token"),
                json!("1000"),
                json!("0x000000000000000000000000000000000000dEaD"),
            ])
            .unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_type_mismatch() {
        let abi = Abi::parse(TOKEN_ABI).unwrap();
        let err = abi
            .encode_constructor_args(&[json!("Token"), json!("1000"), json!("not-an-address")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Argument 2 (address owner)"));
    }

    #[test]
    fn test_json_to_sol_value() {
        assert_eq!(
            json_to_sol_value(&DynSolType::Bool, &json!("true")).unwrap(),
            DynSolValue::Bool(true)
        );
        assert_eq!(
            json_to_sol_value(&DynSolType::Bool, &json!(false)).unwrap(),
            DynSolValue::Bool(false)
        );
        assert_eq!(
            json_to_sol_value(&DynSolType::Uint(8), &json!(255)).unwrap(),
            DynSolValue::Uint(U256::from(255), 8)
        );
        assert!(json_to_sol_value(&DynSolType::Uint(8), &json!(256)).is_err());
        assert!(json_to_sol_value(&DynSolType::Uint(256), &json!(-1)).is_err());
        assert_eq!(
            json_to_sol_value(&DynSolType::Int(256), &json!(-5)).unwrap(),
            DynSolValue::Int(I256::try_from(-5i64).unwrap(), 256)
        );

        let arr = DynSolType::Array(Box::new(DynSolType::Uint(256)));
        assert_eq!(
            json_to_sol_value(&arr, &json!([1, "2"])).unwrap(),
            DynSolValue::Array(vec![
                DynSolValue::Uint(U256::from(1), 256),
                DynSolValue::Uint(U256::from(2), 256)
            ])
        );
        assert_eq!(
            json_to_sol_value(&arr, &json!("[1,2]")).unwrap(),
            DynSolValue::Array(vec![
                DynSolValue::Uint(U256::from(1), 256),
                DynSolValue::Uint(U256::from(2), 256)
            ])
        );
    }

    #[test]
    fn test_constructor_with_tuple() {
        let abi_json = r#"[{
            "type": "constructor",
            "inputs": [{
                "name": "config",
                "type": "tuple",
                "components": [
                    {"name": "value", "type": "uint256"},
                    {"name": "enabled", "type": "bool"}
                ]
            }],
            "stateMutability": "nonpayable"
        }]"#;

        let abi = Abi::parse(abi_json).unwrap();
        let constructor = abi.constructor().unwrap();
        let components = constructor.inputs[0].components.as_ref().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[1].param_type, "bool");
        assert!(!constructor.is_payable());

        let encoded = abi.encode_constructor_args(&[json!([7, true])]).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 7);
        assert_eq!(encoded[63], 1);
    }

    #[test]
    fn test_int_width_enforced_for_numbers() {
        let abi = Abi::parse(
            r#"[{"type": "constructor", "inputs": [
                {"name": "x", "type": "int8"},
                {"name": "xs", "type": "int8[]"}
            ], "stateMutability": "nonpayable"}]"#,
        )
        .unwrap();

        for (x, xs) in [
            (json!(300), json!([1])),
            (json!(-200), json!([1])),
            (json!(1), json!([300])),
            (json!("300"), json!([1])),
        ] {
            let err = abi.encode_constructor_args(&[x, xs]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        assert!(abi
            .encode_constructor_args(&[json!(127), json!([-128, 0])])
            .is_ok());
    }

    #[test]
    fn test_fits_int() {
        assert!(fits_int(I256::try_from(127i64).unwrap(), 8));
        assert!(!fits_int(I256::try_from(128i64).unwrap(), 8));
        assert!(fits_int(I256::try_from(-128i64).unwrap(), 8));
        assert!(!fits_int(I256::try_from(-129i64).unwrap(), 8));
        assert!(fits_int(I256::MIN, 256));
        assert!(fits_int(I256::MAX, 256));
    }

    #[test]
    fn test_parse_uint_and_int() {
        assert_eq!(parse_uint(&json!(42)).unwrap(), U256::from(42));
        assert!(parse_uint(&json!(true)).is_err());
        assert_eq!(parse_int(&json!(-7)).unwrap(), I256::try_from(-7i64).unwrap());
        assert!(parse_int(&json!(null)).is_err());
    }
}
