//! 查询串编解码
//!
//! `a=1&b` 中的 `b` 是一个没有值的标记参数，用 [`QueryValue::Flag`] 表示，
//! 与显式空值 `b=` (`QueryValue::Value("")`) 严格区分。

use std::collections::HashMap;
use thiserror::Error;

/// 百分号解码失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("URI malformed: invalid percent escape in '{0}'")]
    MalformedEscape(String),

    #[error("URI malformed: '{0}' does not decode to UTF-8")]
    InvalidUtf8(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Key present without `=`.
    Flag,
    Value(String),
}

/// 解码后的查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    params: HashMap<String, QueryValue>,
}

impl QueryParameters {
    /// 解码查询串，重复的 key 以最后一次出现为准
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let mut params = HashMap::new();
        if raw.is_empty() {
            return Ok(Self { params });
        }

        for segment in raw.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key, QueryValue::Value(percent_decode(value)?)),
                None => (segment, QueryValue::Flag),
            };
            params.insert(percent_decode(key)?, value);
        }

        Ok(Self { params })
    }

    /// Encodes back to `key=value&flag` form. Keys are sorted so output is stable.
    pub fn encode(&self) -> String {
        let mut keys: Vec<&String> = self.params.keys().collect();
        keys.sort();

        keys.into_iter()
            .map(|key| match &self.params[key] {
                QueryValue::Flag => urlencoding::encode(key).into_owned(),
                QueryValue::Value(value) => format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                ),
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// Returns the value only when the key carried one; flags yield `None`.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(QueryValue::Value(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_flag(&self, key: &str) -> bool {
        matches!(self.params.get(key), Some(QueryValue::Flag))
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, key: impl Into<String>, value: QueryValue) {
        self.params.insert(key.into(), value);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.params.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// 严格的百分号解码：`%` 后必须跟两位十六进制，结果必须是合法 UTF-8。
/// `+` 不会被当成空格。
pub fn percent_decode(input: &str) -> Result<String, DecodeError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() >= i + 3
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(DecodeError::MalformedEscape(input.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(input)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flag_and_value() {
        let params = QueryParameters::decode("a=1&b").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some(&QueryValue::Value("1".to_string())));
        assert_eq!(params.get("b"), Some(&QueryValue::Flag));
        assert!(params.is_flag("b"));
        assert_eq!(params.value("b"), None);
    }

    #[test]
    fn test_flag_and_empty_value_stay_distinct() {
        let flag = QueryParameters::decode("b").unwrap();
        let empty = QueryParameters::decode("b=").unwrap();
        assert_ne!(flag, empty);
        assert_eq!(flag.encode(), "b");
        assert_eq!(empty.encode(), "b=");
        assert_eq!(empty.value("b"), Some(""));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let params = QueryParameters::decode("a=1&a=2").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.value("a"), Some("2"));

        let params = QueryParameters::decode("a=1&a").unwrap();
        assert!(params.is_flag("a"));
    }

    #[test]
    fn test_empty_input() {
        assert!(QueryParameters::decode("").unwrap().is_empty());
        assert!(QueryParameters::decode("&&").unwrap().is_empty());
    }

    #[test]
    fn test_percent_decoding_of_keys_and_values() {
        let params =
            QueryParameters::decode("url%4ASON=%22http%3A%2F%2Fx.com%2Fp%22&q=a+b").unwrap();
        assert_eq!(params.value("urlJSON"), Some("\"http://x.com/p\""));
        // '+' is literal
        assert_eq!(params.value("q"), Some("a+b"));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let params = QueryParameters::decode("expr=a=b").unwrap();
        assert_eq!(params.value("expr"), Some("a=b"));
    }

    #[test]
    fn test_malformed_escapes_fail() {
        assert_eq!(
            QueryParameters::decode("a=%zz"),
            Err(DecodeError::MalformedEscape("%zz".to_string()))
        );
        assert!(matches!(
            QueryParameters::decode("a=%"),
            Err(DecodeError::MalformedEscape(_))
        ));
        assert!(matches!(
            QueryParameters::decode("%FF=1"),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let mut params = QueryParameters::default();
        params.insert("urlJSON", QueryValue::Value("\"http://x.com/p?a=1&b\"".to_string()));
        params.insert("debug", QueryValue::Flag);

        let encoded = params.encode();
        assert_eq!(
            encoded,
            "debug&urlJSON=%22http%3A%2F%2Fx.com%2Fp%3Fa%3D1%26b%22"
        );
        assert_eq!(QueryParameters::decode(&encoded).unwrap(), params);
    }

    #[test]
    fn test_multibyte_values() {
        let params = QueryParameters::decode("name=%E4%BD%A0%E5%A5%BD").unwrap();
        assert_eq!(params.value("name"), Some("你好"));
    }
}
