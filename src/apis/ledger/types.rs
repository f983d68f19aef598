/// Solana JSON-RPC `getAccountInfo` response types
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoResult {
    /// `null` when the account does not exist
    pub value: Option<AccountValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountValue {
    /// `[payload, encoding]`
    #[serde(default)]
    pub data: Vec<String>,
}

impl AccountValue {
    /// Encoded payload, `None` when absent or empty
    pub fn payload(&self) -> Option<&str> {
        self.data
            .first()
            .map(String::as_str)
            .filter(|payload| !payload.is_empty())
    }

    /// Raw account bytes, `None` when the payload is missing or not base64
    pub fn decode_data(&self) -> Option<Vec<u8>> {
        let payload = self.payload()?;
        if let Some(encoding) = self.data.get(1) {
            if encoding != "base64" {
                return None;
            }
        }
        BASE64.decode(payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_account_value() {
        let json = r#"{
            "context": {"slot": 1},
            "value": {
                "data": ["AAECAw==", "base64"],
                "executable": false,
                "lamports": 2039280,
                "owner": "namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX",
                "rentEpoch": 0
            }
        }"#;
        let result: AccountInfoResult = serde_json::from_str(json).unwrap();
        let value = result.value.unwrap();
        assert_eq!(value.decode_data(), Some(vec![0, 1, 2, 3]));
    }

    #[test]
    fn test_missing_account() {
        let result: AccountInfoResult =
            serde_json::from_str(r#"{"context":{"slot":1},"value":null}"#).unwrap();
        assert!(result.value.is_none());
    }

    #[test]
    fn test_unexpected_encoding() {
        let value = AccountValue {
            data: vec!["abc".to_string(), "base58".to_string()],
        };
        assert_eq!(value.decode_data(), None);
    }

    #[test]
    fn test_absent_or_empty_data_has_no_payload() {
        let result: AccountInfoResult =
            serde_json::from_str(r#"{"value":{"lamports":1}}"#).unwrap();
        let value = result.value.unwrap();
        assert!(value.data.is_empty());
        assert_eq!(value.payload(), None);

        let empty = AccountValue {
            data: vec![String::new(), "base64".to_string()],
        };
        assert_eq!(empty.payload(), None);
    }
}
