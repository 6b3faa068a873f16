use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

// Response envelope as sent by the keystore server
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

impl Envelope {
    // Turn an error envelope into an Err, otherwise decode the nested `data` payload
    pub fn into_data(self) -> Result<Option<Value>> {
        if self.status != "ok" {
            let message = self.error.unwrap_or_else(|| "unknown error".to_string());
            bail!("server error: {message}");
        }
        self.data
            .map(|data| serde_json::from_str(&data).context("server sent malformed data"))
            .transpose()
    }
}

pub struct KeyClient {
    base: String,
    http: Client,
}

impl KeyClient {
    pub fn new(server: &str) -> Self {
        KeyClient {
            base: server.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn keys_url(&self) -> String {
        format!("{}/keys", self.base)
    }

    // The key goes in as a single path segment, so '/', '?', '#' and '%' are escaped
    fn key_url(&self, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.keys_url())?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("server URL {} cannot take a path", self.base))?
            .push(key);
        Ok(url)
    }

    pub async fn put(&self, entries: Map<String, Value>) -> Result<()> {
        let envelope: Envelope = self
            .http
            .put(self.keys_url())
            .json(&json!({ "keys": entries }))
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data().map(|_| ())
    }

    pub async fn get(&self, key: &str) -> Result<Value> {
        let envelope: Envelope = self.http.get(self.key_url(key)?).send().await?.json().await?;
        envelope
            .into_data()?
            .ok_or_else(|| anyhow!("server returned no data for {key}"))
    }

    pub async fn list(&self) -> Result<HashMap<String, Value>> {
        let envelope: Envelope = self.http.get(self.keys_url()).send().await?.json().await?;
        let data = envelope
            .into_data()?
            .ok_or_else(|| anyhow!("server returned no data for listing"))?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let envelope: Envelope = self.http.delete(self.key_url(key)?).send().await?.json().await?;
        envelope.into_data().map(|_| ())
    }
}

// Split "key=value" arguments into a batch; a value that isn't valid JSON is sent as a string
pub fn parse_entries(args: &[String]) -> Result<Map<String, Value>> {
    let mut entries = Map::new();
    for arg in args {
        let Some((key, raw)) = arg.split_once('=') else {
            bail!("expected KEY=VALUE, got {arg:?}");
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        entries.insert(key.to_string(), value);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        let args = vec![
            "a=1".to_string(),
            "b=hello".to_string(),
            r#"c={"x":[true,null]}"#.to_string(),
            "d=".to_string(),
            "e=x=y".to_string(),
        ];
        let entries = parse_entries(&args).unwrap();
        assert_eq!(entries["a"], json!(1));
        assert_eq!(entries["b"], json!("hello"));
        assert_eq!(entries["c"], json!({"x": [true, null]}));
        assert_eq!(entries["d"], json!(""));
        assert_eq!(entries["e"], json!("x=y"));
    }

    #[test]
    fn test_parse_entries_requires_separator() {
        assert!(parse_entries(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_envelope_data() {
        let ok: Envelope = serde_json::from_str(r#"{"status":"ok","data":"{\"a\":1}"}"#).unwrap();
        assert_eq!(ok.into_data().unwrap(), Some(json!({"a": 1})));

        let empty: Envelope = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(empty.into_data().unwrap(), None);

        let err: Envelope =
            serde_json::from_str(r#"{"status":"error","error":"Cannot find key"}"#).unwrap();
        let message = err.into_data().unwrap_err().to_string();
        assert_eq!(message, "server error: Cannot find key");
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = KeyClient::new("http://localhost:8080/");
        assert_eq!(client.keys_url(), "http://localhost:8080/keys");
        assert_eq!(client.key_url("a").unwrap().as_str(), "http://localhost:8080/keys/a");
    }

    #[test]
    fn test_key_url_escapes_reserved_characters() {
        let client = KeyClient::new("http://localhost:8080");

        let url = client.key_url("a?b#c").unwrap();
        assert_eq!(url.path(), "/keys/a%3Fb%23c");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        assert_eq!(client.key_url("a/b").unwrap().path(), "/keys/a%2Fb");
        assert_eq!(client.key_url("a b").unwrap().path(), "/keys/a%20b");
        assert_eq!(client.key_url("100%").unwrap().path(), "/keys/100%25");
    }
}
